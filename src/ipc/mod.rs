//! IPC listener that accepts key events over a Unix socket.
//!
//! Whatever captures the keyboard (a compositor keybind, keyd, a small
//! helper script) connects to the socket and sends newline-delimited JSON
//! key events.

pub mod listener;
