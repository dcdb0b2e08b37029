fn has_feature(name: &str) -> bool {
    let name = name.to_uppercase().replace('-', "_");
    std::env::var_os(format!("CARGO_FEATURE_{name}")).is_some()
}

fn cfg(name: &str) -> String {
    std::env::var(format!("CARGO_CFG_{}", name.to_uppercase())).unwrap_or_default()
}

fn make_overridable_cfg(name: &str, logic: impl FnOnce() -> &'static str) -> String {
    let env_name = format!("WRAPEXCEPT_{}", name.to_uppercase());
    println!("cargo::rerun-if-env-changed={env_name}");
    let value = std::env::var(env_name).unwrap_or_else(|_| logic().to_string());
    println!("cargo::rustc-cfg={name}=\"{value}\"");
    value
}

fn main() {
    println!("cargo::rerun-if-changed=build.rs");

    // The `std` feature is on by default, but targets without a prebuilt std (e.g. bare-metal
    // thumb targets) still have it enabled unless the user opts out. Unwinding needs std, so fall
    // back to forwarding to the embedder's handler instead of failing to link.
    let has_std = has_feature("std") && {
        let ac = autocfg::new();
        let found = ac.probe_sysroot_crate("std");
        if !found {
            println!(
                "cargo::warning=wrapexcept: `std` is not available for this target, exceptions are disabled"
            );
        }
        found
    };

    make_overridable_cfg("mode", || {
        if !has_std || has_feature("no-exceptions") || cfg("panic") == "abort" {
            "no-exceptions"
        } else if has_feature("disable-wrap") {
            "unwrapped"
        } else {
            "wrapped"
        }
    });
}
