//! Collaborator traits that decouple the selection logic from any specific
//! pointer backend, overlay renderer, or input hook.
//!
//! The [`SelectionController`](crate::selector::SelectionController) only
//! depends on these abstractions.  Concrete implementations live in
//! [`hyprland`](crate::hyprland), [`overlay`](crate::overlay) and
//! [`ipc`](crate::ipc).

use crate::event::{KeyEvent, MouseButton};
use crate::label::Point;
use std::sync::mpsc;

/// Moves and clicks the system pointer.
pub trait Pointer {
    /// The error type produced by this backend.
    type Error: std::error::Error + Send + 'static;

    /// Warp the pointer to `point` (screen pixels, relative to the screen
    /// the grid covers).
    fn move_to(&self, point: Point) -> Result<(), Self::Error>;

    /// Press and release `button` once at the current pointer position.
    fn click(&self, button: MouseButton) -> Result<(), Self::Error>;
}

/// Shows and hides the grid overlay.
///
/// The controller calls [`hide`](Overlay::hide) before every click so the
/// click reaches the application underneath.
pub trait Overlay {
    /// The error type produced by this overlay.
    type Error: std::error::Error + Send + 'static;

    fn show(&self) -> Result<(), Self::Error>;

    fn hide(&self) -> Result<(), Self::Error>;
}

/// A source of [`KeyEvent`]s.
///
/// # Contract
///
/// * [`run`](KeySource::run) **blocks** until the source is exhausted, the
///   sink is closed, or an unrecoverable error occurs.
/// * Events are sent in the order the keys were pressed.
/// * Implementations must be [`Send`] so they can run on a dedicated thread;
///   the receiving end of `sink` is the single consumer that serializes
///   events into the controller.
pub trait KeySource: Send {
    /// The error type produced by this source.
    type Error: std::error::Error + Send + 'static;

    /// Start listening and forward every key event into `sink`.
    fn run(&mut self, sink: mpsc::Sender<KeyEvent>) -> Result<(), Self::Error>;
}
