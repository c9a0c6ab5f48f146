// build.rs — Platform detection for the core-count probe.
//
// Emits `cargo:rustc-cfg=has_nprocessors_onln` on targets where
// `sysconf(_SC_NPROCESSORS_ONLN)` is available through `nix`. Other targets
// fall back to `num_cpus::get()` for the online-processor count.
fn main() {
    let target_os = std::env::var("CARGO_CFG_TARGET_OS").unwrap_or_default();
    let sysconf_targets = [
        "linux",
        "android",
        "macos",
        "ios",
        "freebsd",
        "dragonfly",
        "netbsd",
        "openbsd",
    ];
    if sysconf_targets.contains(&target_os.as_str()) {
        println!("cargo:rustc-cfg=has_nprocessors_onln");
    }
    println!("cargo:rerun-if-changed=build.rs");
}
