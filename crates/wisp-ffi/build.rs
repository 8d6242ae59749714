use std::env;
use std::path::PathBuf;

fn main() {
    let crate_dir =
        env::var("CARGO_MANIFEST_DIR").expect("wisp-ffi build: CARGO_MANIFEST_DIR is not set");
    let crate_path = PathBuf::from(&crate_dir);

    println!("cargo:rerun-if-changed=src");
    println!("cargo:rerun-if-changed=cbindgen.toml");

    let config = cbindgen::Config::from_file(crate_path.join("cbindgen.toml"))
        .expect("wisp-ffi build: cannot read cbindgen.toml");

    let include = crate_path.join("include");
    std::fs::create_dir_all(&include).expect("wisp-ffi build: cannot create include/");

    cbindgen::Builder::new()
        .with_crate(&crate_dir)
        .with_config(config)
        .generate()
        .expect("wisp-ffi build: cbindgen could not generate wisp.h")
        .write_to_file(include.join("wisp.h"));
}
