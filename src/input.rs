//! Per-frame input snapshot
//!
//! The host collects key and pointer events between frames and hands the
//! simulation one `FrameInput`. Nothing here talks to a browser.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Keys the game reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    /// A letter key, stored uppercase
    Letter(char),
    /// A number-row digit
    Digit(u8),
    Up,
    Down,
    Left,
    Right,
    Space,
    Enter,
    Shift,
}

impl Key {
    /// Build a letter key, normalising case
    pub fn letter(c: char) -> Self {
        Key::Letter(c.to_ascii_uppercase())
    }

    /// Map a DOM `KeyboardEvent.key` value
    pub fn from_dom(key: &str) -> Option<Self> {
        match key {
            "ArrowUp" => Some(Key::Up),
            "ArrowDown" => Some(Key::Down),
            "ArrowLeft" => Some(Key::Left),
            "ArrowRight" => Some(Key::Right),
            " " | "Spacebar" => Some(Key::Space),
            "Enter" => Some(Key::Enter),
            "Shift" => Some(Key::Shift),
            _ => {
                let mut chars = key.chars();
                let c = chars.next()?;
                if chars.next().is_some() {
                    return None;
                }
                if c.is_ascii_alphabetic() {
                    Some(Key::letter(c))
                } else {
                    c.to_digit(10).map(|d| Key::Digit(d as u8))
                }
            }
        }
    }

    /// The alphabet symbol this key types, if it is a letter
    pub fn symbol(&self) -> Option<char> {
        match self {
            Key::Letter(c) => Some(*c),
            _ => None,
        }
    }
}

/// On-screen touch buttons: element id and the key each one holds down
pub const TOUCH_BUTTONS: [(&str, Key); 6] = [
    ("touch-left", Key::Left),
    ("touch-right", Key::Right),
    ("touch-up", Key::Up),
    ("touch-down", Key::Down),
    ("touch-drink", Key::Letter('G')),
    ("touch-skip", Key::Enter),
];

/// Pointer (mouse/finger) state in world coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pointer {
    pub world: Vec2,
    pub down: bool,
}

/// Everything the simulation needs to know about input for one frame
#[derive(Debug, Clone, Default)]
pub struct FrameInput {
    /// Keys currently held
    pub held: Vec<Key>,
    /// Keys that went down since the previous frame, in event order
    pub pressed: Vec<Key>,
    /// Pointer, if the host tracks one
    pub pointer: Option<Pointer>,
}

impl FrameInput {
    pub fn is_held(&self, key: Key) -> bool {
        self.held.contains(&key)
    }

    pub fn just_pressed(&self, key: Key) -> bool {
        self.pressed.contains(&key)
    }

    /// Either of two keys held (arrows + WASD)
    pub fn either_held(&self, a: Key, b: Key) -> bool {
        self.is_held(a) || self.is_held(b)
    }

    /// Record a key-down event
    pub fn press(&mut self, key: Key) {
        if !self.held.contains(&key) {
            self.held.push(key);
        }
        self.pressed.push(key);
    }

    /// Record a key-up event
    pub fn release(&mut self, key: Key) {
        self.held.retain(|k| *k != key);
    }

    /// Clear one-shot state after a frame has consumed it
    pub fn end_frame(&mut self) {
        self.pressed.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_touch_buttons_match_keyboard() {
        for (i, (id, key)) in TOUCH_BUTTONS.iter().enumerate() {
            assert!(TOUCH_BUTTONS[..i].iter().all(|(other, _)| other != id));
            assert!(TOUCH_BUTTONS[..i].iter().all(|(_, other)| other != key));
        }
        let drink = TOUCH_BUTTONS.iter().find(|(id, _)| *id == "touch-drink").unwrap().1;
        assert_eq!(drink, Key::letter('g'));

        // A held button behaves like a held key
        let mut input = FrameInput::default();
        input.press(TOUCH_BUTTONS[1].1);
        assert!(input.is_held(Key::Right) && input.just_pressed(Key::Right));
        input.end_frame();
        input.release(TOUCH_BUTTONS[1].1);
        assert!(!input.is_held(Key::Right));
    }

    #[test]
    fn test_from_dom() {
        assert_eq!(Key::from_dom("a"), Some(Key::Letter('A')));
        assert_eq!(Key::from_dom("G"), Some(Key::Letter('G')));
        assert_eq!(Key::from_dom("3"), Some(Key::Digit(3)));
        assert_eq!(Key::from_dom("ArrowLeft"), Some(Key::Left));
        assert_eq!(Key::from_dom(" "), Some(Key::Space));
        assert_eq!(Key::from_dom("Escape"), None);
        assert_eq!(Key::from_dom("é"), None);
    }

    #[test]
    fn test_press_release_cycle() {
        let mut input = FrameInput::default();
        input.press(Key::Left);
        input.press(Key::Left);
        assert!(input.is_held(Key::Left));
        assert!(input.just_pressed(Key::Left));
        assert_eq!(input.held.len(), 1);

        input.end_frame();
        assert!(input.is_held(Key::Left));
        assert!(!input.just_pressed(Key::Left));

        input.release(Key::Left);
        assert!(!input.is_held(Key::Left));
    }
}
