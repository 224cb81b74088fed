//! [`Pointer`] implementation backed by Hyprland IPC.
//!
//! Cursor warps and the screen query go straight to Hyprland's command
//! socket at `$XDG_RUNTIME_DIR/hypr/$HYPRLAND_INSTANCE_SIGNATURE/.socket.sock`.
//! Hyprland has no dispatcher that synthesises a button press, so clicks are
//! delegated to `ydotool`.

use crate::event::MouseButton;
use crate::label::Point;
use crate::traits::Pointer;
use log::debug;
use serde::Deserialize;
use std::io::{Read, Write};
use std::os::unix::net::UnixStream;
use std::path::PathBuf;
use std::process::Command;

/// Errors that can occur when talking to Hyprland or `ydotool`.
#[derive(Debug, thiserror::Error)]
#[error("hyprland pointer error: {0}")]
pub struct HyprlandError(String);

/// Size and layout position of the focused monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Screen {
    pub width: u32,
    pub height: u32,
    /// Position of the monitor's top-left corner in the global layout.
    pub x: i32,
    pub y: i32,
}

/// Hyprland-backed pointer.
///
/// Points handed to [`move_to`](Pointer::move_to) are relative to the
/// screen given at construction and are offset by its origin before being
/// dispatched.
pub struct HyprlandPointer {
    origin: (i32, i32),
}

impl HyprlandPointer {
    /// Create a pointer for `screen`.  No connection is opened eagerly.
    pub fn new(screen: Screen) -> Self {
        Self {
            origin: (screen.x, screen.y),
        }
    }
}

//  Direct Hyprland IPC helpers

fn socket_path() -> Result<PathBuf, HyprlandError> {
    let runtime_dir = std::env::var("XDG_RUNTIME_DIR")
        .map_err(|_| HyprlandError("XDG_RUNTIME_DIR not set".into()))?;
    let his = std::env::var("HYPRLAND_INSTANCE_SIGNATURE")
        .map_err(|_| HyprlandError("HYPRLAND_INSTANCE_SIGNATURE not set".into()))?;
    Ok(PathBuf::from(format!(
        "{}/hypr/{}/.socket.sock",
        runtime_dir, his
    )))
}

fn ipc_request(command: &str) -> Result<String, HyprlandError> {
    let path = socket_path()?;
    let mut stream = UnixStream::connect(&path)
        .map_err(|e| HyprlandError(format!("connect to {}: {}", path.display(), e)))?;

    stream
        .write_all(command.as_bytes())
        .map_err(|e| HyprlandError(format!("write: {}", e)))?;

    let mut response = Vec::new();
    stream
        .read_to_end(&mut response)
        .map_err(|e| HyprlandError(format!("read: {}", e)))?;

    String::from_utf8(response).map_err(|e| HyprlandError(format!("utf-8: {}", e)))
}

/// Send a dispatch command and check for `"ok"`.
fn ipc_dispatch(args: &str) -> Result<(), HyprlandError> {
    let response = ipc_request(&format!("/dispatch {}", args))?;
    if response.trim() == "ok" {
        Ok(())
    } else {
        Err(HyprlandError(format!("dispatch error: {}", response)))
    }
}

/// Subset of the JSON object returned by `j/monitors`.
#[derive(Deserialize)]
struct MonitorJson {
    width: u32,
    height: u32,
    x: i32,
    y: i32,
    #[serde(default)]
    focused: bool,
}

/// Pick the focused monitor out of a `j/monitors` response, or the first
/// one if none reports focus.
fn focused_from_json(json: &str) -> Result<Screen, HyprlandError> {
    let monitors: Vec<MonitorJson> =
        serde_json::from_str(json).map_err(|e| HyprlandError(format!("parse: {}", e)))?;
    let m = monitors
        .iter()
        .find(|m| m.focused)
        .or_else(|| monitors.first())
        .ok_or_else(|| HyprlandError("no monitors".into()))?;
    Ok(Screen {
        width: m.width,
        height: m.height,
        x: m.x,
        y: m.y,
    })
}

/// Query Hyprland for the currently focused monitor.
pub fn focused_screen() -> Result<Screen, HyprlandError> {
    focused_from_json(&ipc_request("j/monitors")?)
}

/// `ydotool click` code: button id with the down (0x40) and up (0x80) bits.
fn ydotool_code(button: MouseButton) -> &'static str {
    match button {
        MouseButton::Left => "0xC0",
        MouseButton::Right => "0xC1",
    }
}

//  Pointer implementation

impl Pointer for HyprlandPointer {
    type Error = HyprlandError;

    fn move_to(&self, point: Point) -> Result<(), Self::Error> {
        let x = self.origin.0 + point.x as i32;
        let y = self.origin.1 + point.y as i32;
        ipc_dispatch(&format!("movecursor {} {}", x, y))
    }

    fn click(&self, button: MouseButton) -> Result<(), Self::Error> {
        let code = ydotool_code(button);
        debug!("ydotool click {}", code);
        let status = Command::new("ydotool")
            .args(["click", code])
            .status()
            .map_err(|e| HyprlandError(format!("spawn ydotool: {}", e)))?;
        if status.success() {
            Ok(())
        } else {
            Err(HyprlandError(format!("ydotool exited with {}", status)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_focused_monitor() {
        let json = r#"[
            {"id":0,"name":"DP-1","width":2560,"height":1440,"x":0,"y":0,"focused":false},
            {"id":1,"name":"HDMI-A-1","width":1920,"height":1080,"x":2560,"y":0,"focused":true}
        ]"#;
        assert_eq!(
            focused_from_json(json).unwrap(),
            Screen { width: 1920, height: 1080, x: 2560, y: 0 }
        );
    }

    #[test]
    fn falls_back_to_first_monitor() {
        let json = r#"[{"width":1920,"height":1080,"x":0,"y":0}]"#;
        assert_eq!(focused_from_json(json).unwrap().width, 1920);
    }

    #[test]
    fn no_monitors_is_an_error() {
        assert!(focused_from_json("[]").is_err());
        assert!(focused_from_json("not json").is_err());
    }

    #[test]
    fn click_codes() {
        assert_eq!(ydotool_code(MouseButton::Left), "0xC0");
        assert_eq!(ydotool_code(MouseButton::Right), "0xC1");
    }
}
