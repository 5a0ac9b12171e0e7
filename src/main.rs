// Hearth demo host: opens the configured window and runs the GTK loop
// without a browser engine attached.
//
//   hearth [--debug] [OPTIONS.json]
//
// `--debug` (or HEARTH_DEBUG=1) turns on display-error reporting.
#![deny(unsafe_code)]

use std::path::PathBuf;

use log::{debug, error, info};

use hearth::platform::gtk3::{GtkMainLoop, GtkToolkit};
use hearth::{Host, WindowOptions};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut debugging = std::env::var_os("HEARTH_DEBUG").is_some_and(|v| v == "1");
    let mut options_path: Option<PathBuf> = None;
    for arg in std::env::args_os().skip(1) {
        if arg == "--debug" {
            debugging = true;
        } else {
            options_path = Some(PathBuf::from(arg));
        }
    }

    let options = match options_path.as_deref() {
        Some(path) => match WindowOptions::from_json_file(path) {
            Ok(options) => options,
            Err(e) => {
                error!("cannot load {}: {e}", path.display());
                std::process::exit(1);
            }
        },
        None => WindowOptions::default(),
    };

    // Startup milestone: time from launch to the window being realized.
    let t0 = std::time::Instant::now();

    let host = Host::new(GtkToolkit::new(), GtkMainLoop::new());
    host.events().on_created(move |created| {
        info!(
            "window realized in {:.1} ms (xid {:#x})",
            t0.elapsed().as_secs_f64() * 1000.0,
            created.native_id.0
        );
    });
    host.events().on_size_changed(|size| debug!("size changed to {}x{}", size.width, size.height));
    host.events().on_moving(|| debug!("window moved"));
    host.events().on_close(|| info!("window closed"));

    host.create_window(&options, debugging);
    host.run();
}
