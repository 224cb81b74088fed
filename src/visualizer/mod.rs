//! Overlay renderers.
//!
//! When the `visualizer-gtk` feature is enabled, [`gtk::run_main_loop`]
//! takes over the main thread and drives both key handling and overlay
//! rendering through the GLib main loop.

#[cfg(feature = "visualizer-gtk")]
pub mod gtk;
