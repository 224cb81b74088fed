//! GTK4 + layer-shell overlay that runs on the **main thread**.
//!
//! A transparent, fullscreen layer-shell window on the `Overlay` layer holds
//! a single `DrawingArea` that paints the grid from
//! [`cell_layout`](crate::overlay::cell_layout): cell outlines plus the two
//! label letters of every cell, in the colours and font from
//! [`OverlayConfig`].  The window never takes keyboard focus; keys reach the
//! controller through the key-event socket.
//!
//! [`GtkOverlay`] is the [`Overlay`] the controller drives.  Hiding unmaps
//! the window and waits for the compositor round-trip, so the click that
//! follows lands on the application underneath.

use crate::config::OverlayConfig;
use crate::event::KeyEvent;
use crate::label::{LabelGrid, Point};
use crate::overlay::{cell_layout, CellLabel};
use crate::selector::SelectionController;
use crate::traits::{Overlay, Pointer};
use gtk4::prelude::*;
use gtk4::{cairo, gdk, glib};
use gtk4_layer_shell::{Edge, LayerShell};
use log::{debug, error, info, warn};
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::mpsc;
use std::time::Duration;

//  Default CSS

const DEFAULT_CSS: &str = r#"
window,
window.background {
    background-color: transparent;
    background: none;
}
"#;

//  Appearance

/// An RGB colour with components in `[0.0, 1.0]`.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Rgb(f64, f64, f64);

/// Parse a CSS colour name or hex string, falling back to `fallback`.
fn parse_color(name: &str, fallback: Rgb) -> Rgb {
    match gdk::RGBA::parse(name) {
        Ok(c) => Rgb(c.red() as f64, c.green() as f64, c.blue() as f64),
        Err(_) => {
            warn!("unknown colour {:?}, using default", name);
            fallback
        }
    }
}

/// [`OverlayConfig`] resolved into drawing parameters.
#[derive(Debug, Clone)]
struct Look {
    background: Rgb,
    grid: Rgb,
    font: String,
    /// Font size in pixels (config is in points at 96 dpi).
    font_px: f64,
    alpha: f64,
}

impl Look {
    fn from_config(config: &OverlayConfig) -> Self {
        Self {
            background: parse_color(&config.background, Rgb(0.0, 0.0, 0.0)),
            grid: parse_color(&config.grid_color, Rgb(1.0, 1.0, 1.0)),
            font: config.font.clone(),
            font_px: config.font_size as f64 * 96.0 / 72.0,
            alpha: config.alpha.clamp(0.0, 1.0),
        }
    }
}

//  Drawing

fn draw_grid(cr: &cairo::Context, cells: &[CellLabel], look: &Look) -> Result<(), cairo::Error> {
    let Rgb(r, g, b) = look.background;
    cr.set_source_rgb(r, g, b);
    cr.paint()?;

    let Rgb(r, g, b) = look.grid;
    cr.set_source_rgb(r, g, b);
    cr.set_line_width(1.0);
    cr.select_font_face(&look.font, cairo::FontSlant::Normal, cairo::FontWeight::Normal);
    cr.set_font_size(look.font_px);

    let mut buf = [0u8; 4];
    for cell in cells {
        let rect = cell.rect;
        cr.rectangle(
            rect.x1 as f64 + 0.5,
            rect.y1 as f64 + 0.5,
            (rect.x2 - rect.x1) as f64,
            (rect.y2 - rect.y1) as f64,
        );
        cr.stroke()?;
        centered_text(cr, cell.left.encode_utf8(&mut buf), cell.left_anchor)?;
        centered_text(cr, cell.right.encode_utf8(&mut buf), cell.right_anchor)?;
    }
    Ok(())
}

/// Draw `text` with its ink box centred on `at`.
fn centered_text(cr: &cairo::Context, text: &str, at: Point) -> Result<(), cairo::Error> {
    let ext = cr.text_extents(text)?;
    cr.move_to(
        at.x as f64 - ext.width() / 2.0 - ext.x_bearing(),
        at.y as f64 - ext.height() / 2.0 - ext.y_bearing(),
    );
    cr.show_text(text)
}

//  Overlay

/// No GDK display to synchronise with.
#[derive(Debug, thiserror::Error)]
#[error("no GDK display")]
pub struct NoDisplay;

/// [`Overlay`] backed by the layer-shell window.
pub struct GtkOverlay {
    window: gtk4::Window,
}

impl Overlay for GtkOverlay {
    type Error = NoDisplay;

    fn show(&self) -> Result<(), NoDisplay> {
        self.window.set_visible(true);
        self.window.present();
        Ok(())
    }

    fn hide(&self) -> Result<(), NoDisplay> {
        self.window.set_visible(false);
        let display = gdk::Display::default().ok_or(NoDisplay)?;
        display.sync();
        Ok(())
    }
}

fn build_window(grid: &LabelGrid, look: Look) -> gtk4::Window {
    let window = gtk4::Window::new();
    window.init_layer_shell();
    window.set_layer(gtk4_layer_shell::Layer::Overlay);
    window.set_namespace("gridclick");
    window.set_keyboard_mode(gtk4_layer_shell::KeyboardMode::None);
    for edge in [Edge::Top, Edge::Bottom, Edge::Left, Edge::Right] {
        window.set_anchor(edge, true);
    }
    window.set_exclusive_zone(-1);
    window.set_decorated(false);
    window.remove_css_class("background");
    window.set_opacity(look.alpha);

    let cells: Rc<[CellLabel]> = cell_layout(grid).into();
    let area = gtk4::DrawingArea::new();
    area.set_hexpand(true);
    area.set_vexpand(true);
    area.set_draw_func(move |_, cr, _, _| {
        if let Err(e) = draw_grid(cr, &cells, &look) {
            error!("drawing grid failed: {}", e);
        }
    });
    window.set_child(Some(&area));
    window
}

//  Public API

/// Run the GTK4 main loop on the **current** (main) thread.
///
/// Builds the overlay window, wires it into a [`SelectionController`] and
/// feeds it key events from `key_rx` until every key source has closed.
pub fn run_main_loop<P: Pointer + 'static>(
    grid: LabelGrid,
    pointer: P,
    key_rx: mpsc::Receiver<KeyEvent>,
    appearance: OverlayConfig,
    css_path: Option<PathBuf>,
) -> Result<(), glib::BoolError> {
    gtk4::init()?;
    info!("GTK4 initialised on main thread");

    load_css(&css_path);

    let look = Look::from_config(&appearance);
    info!(
        "overlay: background {:?}, grid {:?}, font {} {}px, alpha {:.2}",
        appearance.background, appearance.grid_color, look.font, look.font_px, look.alpha
    );
    let window = build_window(&grid, look);

    // Map the surface once so later shows are immediate.
    window.present();
    window.set_visible(false);

    let mut controller = SelectionController::new(grid, pointer, GtkOverlay { window });
    let main_loop = glib::MainLoop::new(None, false);

    //  Key event loop (~60 fps)
    let quit = main_loop.clone();
    glib::timeout_add_local(Duration::from_millis(16), move || {
        loop {
            match key_rx.try_recv() {
                Ok(event) => match controller.handle(event) {
                    Ok(Some(action)) => debug!("{:?}", action),
                    Ok(None) => {}
                    Err(e) => error!("{} failed: {}", event, e),
                },
                Err(mpsc::TryRecvError::Empty) => break,
                Err(mpsc::TryRecvError::Disconnected) => {
                    info!("all key sources closed, exiting");
                    quit.quit();
                    return glib::ControlFlow::Break;
                }
            }
        }
        glib::ControlFlow::Continue
    });

    info!("entering GLib main loop");
    main_loop.run();
    info!("GLib main loop exited");
    Ok(())
}

//  CSS loading

fn load_css(css_path: &Option<PathBuf>) {
    let provider = gtk4::CssProvider::new();

    let css_content = match css_path.as_ref().filter(|p| p.exists()) {
        Some(p) => match std::fs::read_to_string(p) {
            Ok(content) => {
                info!("user CSS: {} ({} bytes)", p.display(), content.len());
                content
            }
            Err(e) => {
                warn!("CSS read failed ({}): {}, using built-in", p.display(), e);
                DEFAULT_CSS.to_string()
            }
        },
        None => DEFAULT_CSS.to_string(),
    };

    #[allow(deprecated)]
    provider.load_from_data(&css_content);

    if let Some(display) = gdk::Display::default() {
        gtk4::style_context_add_provider_for_display(
            &display,
            &provider,
            gtk4::STYLE_PROVIDER_PRIORITY_APPLICATION,
        );
    } else {
        warn!("no GDK display, CSS will not be applied");
    }
}
