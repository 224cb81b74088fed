//! Key events and actions shared by all components.
//!
//! [`KeyEvent`] is the closed set of inputs the selection controller
//! understands; input adapters translate whatever their hook reports into
//! one of these.  [`Action`] describes what the controller did in response.
//!
//! On the wire a key event is a single JSON value.  The parser is lenient:
//! `"Toggle"`, `"toggle-hotkey"`, `"Space"`, `" "`, a one-letter string such
//! as `"a"`, and the tagged form `{"Character":"a"}` are all accepted.

use crate::label::{Bias, Point};
use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// A key input delivered by the input hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum KeyEvent {
    /// The overlay hotkey (modifier + shift) was pressed.
    Toggle,
    /// A printable key was pressed.  Not yet case-normalised or filtered.
    Character(char),
    /// The space bar was pressed.
    Space,
}

impl fmt::Display for KeyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyEvent::Toggle => write!(f, "toggle"),
            KeyEvent::Character(c) => write!(f, "'{}'", c),
            KeyEvent::Space => write!(f, "space"),
        }
    }
}

/// Parse the string form of a key event.
fn parse_key(s: &str) -> Option<KeyEvent> {
    if s == " " {
        return Some(KeyEvent::Space);
    }
    let mut chars = s.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return Some(KeyEvent::Character(c));
    }
    let normalized: String = s
        .trim()
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
        .flat_map(|c| c.to_lowercase())
        .collect();
    match normalized.as_str() {
        "toggle" | "togglehotkey" | "toggleoverlay" => Some(KeyEvent::Toggle),
        "space" => Some(KeyEvent::Space),
        _ => None,
    }
}

impl<'de> Deserialize<'de> for KeyEvent {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::Visitor;
        struct V;
        impl<'de> Visitor<'de> for V {
            type Value = KeyEvent;
            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "key name string or {{\"Character\": \"<c>\"}}")
            }
            fn visit_str<E>(self, s: &str) -> Result<KeyEvent, E>
            where
                E: DeError,
            {
                parse_key(s).ok_or_else(|| DeError::custom(format!("invalid key event: {:?}", s)))
            }
            fn visit_map<A>(self, mut map: A) -> Result<KeyEvent, A::Error>
            where
                A: serde::de::MapAccess<'de>,
            {
                let mut event = None;
                while let Some(k) = map.next_key::<String>()? {
                    match k.as_str() {
                        "Character" => {
                            let c: char = map.next_value()?;
                            event = Some(KeyEvent::Character(c));
                        }
                        _ => {
                            let _: serde::de::IgnoredAny = map.next_value()?;
                        }
                    }
                }
                event.ok_or_else(|| DeError::missing_field("Character"))
            }
        }
        deserializer.deserialize_any(V)
    }
}

/// Mouse button to click.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MouseButton {
    #[default]
    Left,
    /// Never chosen by the key grammar; available to pointer backends.
    Right,
}

impl fmt::Display for MouseButton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MouseButton::Left => write!(f, "left"),
            MouseButton::Right => write!(f, "right"),
        }
    }
}

/// What the selection controller did in response to a [`KeyEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// The overlay was shown (`true`) or hidden (`false`).
    SetOverlay(bool),
    /// The pointer was moved to a pre-selected cell without clicking.
    MoveOnly { col: usize, row: usize, point: Point },
    /// The pointer was moved into a cell, the overlay hidden, and a click
    /// performed.
    MoveAndClick {
        col: usize,
        row: usize,
        bias: Bias,
        button: MouseButton,
        point: Point,
    },
}
