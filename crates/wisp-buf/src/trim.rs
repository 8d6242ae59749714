//! In-place trimming by byte set.

use crate::alloc::BufAlloc;
use crate::buffer::WispBuf;

impl<A: BufAlloc> WispBuf<A> {
    /// Strip every leading and trailing byte that appears in `cut_set`,
    /// shifting the remainder to offset 0.
    ///
    /// Membership is per byte, not a pattern: `b" \t"` removes any run of
    /// spaces and tabs. Capacity is unchanged. Null and zero-length handles
    /// are left alone.
    pub fn trim(&mut self, cut_set: &[u8]) {
        if self.is_empty() {
            return;
        }
        let mut cut = [false; 256];
        for &b in cut_set {
            cut[usize::from(b)] = true;
        }
        let keep = |b: &u8| !cut[usize::from(*b)];

        let bytes = self.as_mut_slice();
        let Some(start) = bytes.iter().position(keep) else {
            self.commit_len(0);
            return;
        };
        // A kept byte exists, so rposition finds one at or after `start`.
        let end = bytes.iter().rposition(keep).map_or(start, |i| i + 1);
        if start > 0 {
            bytes.copy_within(start..end, 0);
        }
        self.commit_len(end - start);
    }
}

#[cfg(test)]
mod tests {
    use crate::WispBuf;

    fn trimmed(input: &str, cut: &str) -> WispBuf {
        let mut s = WispBuf::try_from(input).unwrap();
        s.trim(cut.as_bytes());
        s
    }

    #[test]
    fn trims_both_ends() {
        let s = trimmed("  hello  ", " ");
        assert_eq!(s, "hello");
        assert_eq!(s.len(), 5);
        assert_eq!(s.as_bytes_with_nul(), b"hello\0");
    }

    #[test]
    fn keeps_interior_cut_bytes() {
        assert_eq!(trimmed("--a-b--", "-"), "a-b");
    }

    #[test]
    fn mixed_cut_set_in_any_order() {
        assert_eq!(trimmed("\t \n x y\n\t ", " \t\n"), "x y");
    }

    #[test]
    fn all_cut_bytes_yields_empty() {
        let s = trimmed("xxxx", "x");
        assert_eq!(s.len(), 0);
        assert_eq!(s.capacity(), 4);
        assert_eq!(s.as_bytes_with_nul(), b"\0");
    }

    #[test]
    fn repeated_cut_bytes_are_harmless() {
        assert_eq!(trimmed("aaXaa", "aaaa"), "X");
    }

    #[test]
    fn empty_cut_set_changes_nothing() {
        assert_eq!(trimmed("  keep  ", ""), "  keep  ");
    }

    #[test]
    fn only_leading_or_only_trailing() {
        assert_eq!(trimmed("...lead", "."), "lead");
        assert_eq!(trimmed("trail...", "."), "trail");
    }

    #[test]
    fn single_kept_byte() {
        assert_eq!(trimmed(" z ", " "), "z");
    }

    #[test]
    fn null_and_zero_length_are_no_ops() {
        let mut null = WispBuf::new();
        null.trim(b" ");
        assert!(null.is_null());

        let mut empty = WispBuf::with_capacity(8).unwrap();
        empty.trim(b" ");
        assert_eq!(empty.len_cap(), (0, 8));
    }

    #[test]
    fn capacity_is_untouched() {
        let mut s = WispBuf::with_capacity(64).unwrap();
        s.put(b"  pad  ").unwrap();
        s.trim(b" ");
        assert_eq!(s.len_cap(), (3, 64));
    }
}
