//! Shared inputs for the Wisp benchmarks.
//!
//! - [`fragments`]: deterministic append workloads
//! - [`filled`]: a buffer pre-loaded with `len` bytes

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use wisp_buf::{WispBuf, WispError};

/// `count` fragments of `size` bytes each, cycling through lowercase ASCII.
pub fn fragments(count: usize, size: usize) -> Vec<Vec<u8>> {
    (0..count)
        .map(|i| vec![b'a' + (i % 26) as u8; size])
        .collect()
}

/// Total bytes across `fragments`.
pub fn total_len(fragments: &[Vec<u8>]) -> usize {
    fragments.iter().map(Vec::len).sum()
}

/// A buffer holding exactly `len` bytes of `fill`.
pub fn filled(len: usize, fill: u8) -> Result<WispBuf, WispError> {
    let mut s = WispBuf::with_capacity(len)?;
    s.put(&vec![fill; len])?;
    Ok(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fragments_are_sized() {
        let f = fragments(30, 7);
        assert_eq!(f.len(), 30);
        assert_eq!(total_len(&f), 210);
        assert_eq!(f[26][0], b'a');
    }

    #[test]
    fn filled_is_exact() {
        let s = filled(100, b'z').unwrap();
        assert_eq!(s.len_cap(), (100, 100));
        assert!(s.iter().all(|&b| b == b'z'));
    }
}
