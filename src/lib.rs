//! **gridclick** — keyboard-driven pointer positioning.
//!
//! A hotkey shows a fullscreen overlay divided into a grid of labeled cells.
//! Typing a cell's two-letter label warps the pointer there; a third key
//! clicks the left half, the right half, or the center of the cell.
//!
//! # Architecture
//!
//! * [`label::LabelGrid`] maps labels to cells and cells to pixels.
//! * [`selector::SelectionController`] is the state machine that turns
//!   [`event::KeyEvent`]s into pointer moves and clicks.
//!
//! The controller talks to the outside world only through the collaborator
//! traits in [`traits`]: a [`traits::Pointer`], an [`traits::Overlay`], and
//! any number of [`traits::KeySource`]s.  Concrete implementations live in
//! [`hyprland`] (Hyprland IPC pointer), [`visualizer`] (GTK layer-shell
//! overlay), [`overlay`] (cell layout and a channel-backed overlay) and
//! [`ipc`] (Unix-socket key listener).

pub mod config;
pub mod event;
pub mod hyprland;
pub mod ipc;
pub mod label;
pub mod overlay;
pub mod selector;
pub mod traits;
pub mod visualizer;
