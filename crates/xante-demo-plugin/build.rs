// build.rs - Let the plugin's toolkit imports resolve at load time
//
// libxante exports the toolkit functions from the host process. Linux
// shared objects may leave them undefined; macOS needs to be told.

use std::env;

fn main() {
    let target_os = env::var("CARGO_CFG_TARGET_OS").unwrap_or_default();

    if target_os == "macos" {
        println!("cargo:rustc-cdylib-link-arg=-undefined");
        println!("cargo:rustc-cdylib-link-arg=dynamic_lookup");
    }

    println!("cargo:rerun-if-changed=build.rs");
}
