use std::process::Command;

fn git(args: &[&str]) -> Option<String> {
    Command::new("git")
        .args(args)
        .output()
        .ok()
        .filter(|o| o.status.success())
        .map(|o| String::from_utf8_lossy(&o.stdout).trim().to_string())
}

/// `--version` shows the package version on a release tag and
/// `<version>-dev@<hash>` anywhere else.
fn main() {
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/");

    let version = std::env::var("CARGO_PKG_VERSION").unwrap_or_default();
    let on_tag = git(&["describe", "--exact-match", "--tags", "HEAD"]).is_some();
    let display = match git(&["rev-parse", "--short", "HEAD"]) {
        _ if on_tag => version,
        Some(hash) if !hash.is_empty() => format!("{version}-dev@{hash}"),
        _ => format!("{version}-dev"),
    };
    println!("cargo:rustc-env=EXIF_FRAME_VERSION={display}");
}
