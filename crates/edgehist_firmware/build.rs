/// Build script for the edgehist_firmware crate.
///
/// Passes the linker script to rustc when building the bare-metal image and
/// registers the assembly entry point so edits to it trigger a rebuild.
use std::env;

fn main() {
    let manifest_dir = env::var("CARGO_MANIFEST_DIR").unwrap();
    println!("cargo:rerun-if-changed=link.x");
    println!("cargo:rerun-if-changed=src/entry.S");

    // Host builds of the workspace never link the firmware image.
    if env::var("CARGO_CFG_TARGET_ARCH").as_deref() == Ok("riscv64") {
        println!("cargo:rustc-link-arg=-T{}/link.x", manifest_dir);
    }
}
