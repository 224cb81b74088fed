//! Entry point for the **gridclick** daemon.
//!
//! Spawns the key-event listener on a background thread and feeds its
//! events, one at a time, into the selection controller on the main thread.
//!
//! When the `visualizer-gtk` feature is enabled the main thread runs the
//! GLib main loop, which draws the overlay and polls the key channel.
//! Without the feature, a blocking loop is used and the overlay is only
//! logged.
//!
//! `--dry-run` replaces the Hyprland pointer with one that only logs, and
//! uses the configured screen size instead of querying the compositor.

use gridclick::config::Config;
use gridclick::event::KeyEvent;
use gridclick::hyprland::pointer::{focused_screen, HyprlandPointer, Screen};
use gridclick::ipc::listener::UnixSocketListener;
use gridclick::label::{GridSpec, LabelGrid};
#[cfg(not(feature = "visualizer-gtk"))]
use gridclick::overlay::{ChannelOverlay, OverlayEvent};
#[cfg(not(feature = "visualizer-gtk"))]
use gridclick::selector::SelectionController;
use gridclick::traits::{KeySource, Pointer};
#[cfg(not(feature = "visualizer-gtk"))]
use log::debug;
use log::{error, info, warn};
use std::path::PathBuf;
use std::sync::mpsc;

fn default_socket_path() -> PathBuf {
    let runtime = std::env::var("XDG_RUNTIME_DIR").unwrap_or_else(|_| "/tmp".into());
    PathBuf::from(runtime).join("gridclick.sock")
}

/// Resolve the config directory (`$XDG_CONFIG_HOME/gridclick`).
fn config_dir() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME").unwrap_or_else(|_| {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
        format!("{}/.config", home)
    });
    PathBuf::from(base).join("gridclick")
}

/// Try to load `config.json` from the config directory, falling back to
/// compiled-in defaults.
fn load_config() -> Config {
    let path = config_dir().join("config.json");
    match Config::load(&path) {
        Ok(cfg) => {
            info!("loaded config from {}", path.display());
            cfg
        }
        Err(e) => {
            info!("no config file ({}), using defaults", e);
            Config::default()
        }
    }
}

/// Resolve the user stylesheet path for the overlay window.
#[cfg(feature = "visualizer-gtk")]
fn css_path() -> PathBuf {
    config_dir().join("style.css")
}

//  Logging pointer (--dry-run)

mod log_pointer {
    use gridclick::event::MouseButton;
    use gridclick::label::Point;
    use gridclick::traits::Pointer;
    use log::info;
    use std::convert::Infallible;

    pub struct LogPointer;

    impl Pointer for LogPointer {
        type Error = Infallible;

        fn move_to(&self, point: Point) -> Result<(), Infallible> {
            info!("[dry-run] move pointer to ({}, {})", point.x, point.y);
            Ok(())
        }

        fn click(&self, button: MouseButton) -> Result<(), Infallible> {
            info!("[dry-run] {} click", button);
            Ok(())
        }
    }
}

use log_pointer::LogPointer;

//  Main

fn main() {
    env_logger::init();

    let dry_run = std::env::args().any(|a| a == "--dry-run");
    let config = load_config();

    if dry_run {
        info!("dry run: pointer actions are only logged");
        let (width, height) = (config.screen.width, config.screen.height);
        run(LogPointer, width, height, config);
    } else {
        let screen = match focused_screen() {
            Ok(s) => {
                info!("focused screen {}x{} at ({}, {})", s.width, s.height, s.x, s.y);
                s
            }
            Err(e) => {
                warn!("{}; falling back to configured screen size", e);
                Screen {
                    width: config.screen.width,
                    height: config.screen.height,
                    x: 0,
                    y: 0,
                }
            }
        };
        run(HyprlandPointer::new(screen), screen.width, screen.height, config);
    }
}

/// Build the grid, then process key events until every source has closed.
fn run<P: Pointer + 'static>(pointer: P, width: u32, height: u32, config: Config) {
    let spec = match GridSpec::new(width, height, config.grid.size) {
        Ok(spec) => spec,
        Err(e) => {
            error!("invalid grid: {}", e);
            std::process::exit(1);
        }
    };
    let grid = LabelGrid::new(spec);
    info!(
        "{}x{} grid over {}x{}, {} labels",
        spec.size(),
        spec.size(),
        width,
        height,
        grid.len()
    );

    let (key_tx, key_rx) = mpsc::channel::<KeyEvent>();
    let socket = config.socket_path.clone().unwrap_or_else(default_socket_path);
    spawn_key_sources(key_tx, socket);

    start_event_loop(grid, pointer, key_rx, config);
}

//  Event loops

#[cfg(feature = "visualizer-gtk")]
fn start_event_loop<P: Pointer + 'static>(
    grid: LabelGrid,
    pointer: P,
    key_rx: mpsc::Receiver<KeyEvent>,
    config: Config,
) {
    if let Err(e) = gridclick::visualizer::gtk::run_main_loop(
        grid,
        pointer,
        key_rx,
        config.overlay,
        Some(css_path()),
    ) {
        error!("failed to start GTK: {}", e);
        std::process::exit(1);
    }
}

/// Headless loop: overlay requests go to a channel whose receiver only
/// logs them, so the grid is never drawn.
#[cfg(not(feature = "visualizer-gtk"))]
fn start_event_loop<P: Pointer>(
    grid: LabelGrid,
    pointer: P,
    key_rx: mpsc::Receiver<KeyEvent>,
    config: Config,
) {
    let (overlay_tx, overlay_rx) = mpsc::channel::<OverlayEvent>();
    spawn_overlay_logger(overlay_rx);
    let overlay = ChannelOverlay::new(&grid, config.overlay, overlay_tx);
    let mut controller = SelectionController::new(grid, pointer, overlay);

    info!("gridclick running without a visualizer");
    for event in key_rx {
        match controller.handle(event) {
            Ok(Some(action)) => debug!("{:?}", action),
            Ok(None) => {}
            Err(e) => error!("{} failed: {}", event, e),
        }
    }
    info!("all key sources closed, exiting");
}

//  Helpers

fn spawn_key_sources(tx: mpsc::Sender<KeyEvent>, socket: PathBuf) {
    std::thread::spawn(move || {
        let mut source = UnixSocketListener::new(&socket);
        if let Err(e) = source.run(tx) {
            error!("socket listener error: {}", e);
        }
    });
}

#[cfg(not(feature = "visualizer-gtk"))]
fn spawn_overlay_logger(rx: mpsc::Receiver<OverlayEvent>) {
    std::thread::spawn(move || {
        for event in rx {
            match event {
                OverlayEvent::Show(payload) => {
                    debug!("overlay show: {} cells", payload.cells.len())
                }
                OverlayEvent::Hide => debug!("overlay hide"),
            }
        }
    });
}
