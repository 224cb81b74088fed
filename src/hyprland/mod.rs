//! Hyprland-specific implementations.
//!
//! This module provides the concrete [`Pointer`](crate::traits::Pointer)
//! backend and the focused-screen query, powered by Hyprland's IPC socket.
//!
//! Nothing outside this module should reference Hyprland directly.

pub mod pointer;
