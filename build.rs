/// Hearth build script.
///
/// The native backend links GTK 3, GDK-X11 and Xlib, which only exist on
/// X11-capable Unix targets. The portable core (lifecycle, error trap logic,
/// options) builds everywhere.
fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    // Hard gate: the `gtk3` feature is Linux-only. Fail loudly on any other
    // target rather than producing a link error deep inside gtk-sys.
    let native = std::env::var_os("CARGO_FEATURE_GTK3").is_some();
    let target_os = std::env::var("CARGO_CFG_TARGET_OS").unwrap_or_default();
    if native && target_os != "linux" {
        panic!(
            "the `gtk3` feature requires a Linux target \
             (CARGO_CFG_TARGET_OS = {target_os:?})"
        );
    }
}
