use serde::{Deserialize, Serialize};

/// Keyboard keys the driving controls are bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    /// Accelerate.
    W,
    /// Brake.
    S,
    /// Steer left.
    A,
    /// Steer right.
    D,
    /// Boost modifier while accelerating.
    Shift,
    /// Cruise control toggle.
    Q,
}

impl Key {
    /// Parse a host key name, case-insensitively. Unbound keys yield `None`.
    pub fn from_name(name: &str) -> Option<Self> {
        let key = match name.to_ascii_lowercase().as_str() {
            "w" => Key::W,
            "s" => Key::S,
            "a" => Key::A,
            "d" => Key::D,
            "shift" | "shiftleft" | "shiftright" => Key::Shift,
            "q" => Key::Q,
            _ => return None,
        };
        Some(key)
    }
}

/// Which driving controls are held during one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputSnapshot {
    pub forward: bool,
    pub brake: bool,
    pub boost: bool,
    pub left: bool,
    pub right: bool,
    pub cruise_toggle: bool,
}

impl InputSnapshot {
    /// Nothing held.
    pub fn idle() -> Self {
        Self::default()
    }

    pub fn forward() -> Self {
        Self {
            forward: true,
            ..Self::default()
        }
    }

    pub fn boosted() -> Self {
        Self {
            forward: true,
            boost: true,
            ..Self::default()
        }
    }

    pub fn braking() -> Self {
        Self {
            brake: true,
            ..Self::default()
        }
    }

    /// Build a snapshot from the set of keys currently held.
    pub fn from_keys<'a>(held: impl IntoIterator<Item = &'a Key>) -> Self {
        let mut snapshot = Self::default();
        for key in held {
            match key {
                Key::W => snapshot.forward = true,
                Key::S => snapshot.brake = true,
                Key::A => snapshot.left = true,
                Key::D => snapshot.right = true,
                Key::Shift => snapshot.boost = true,
                Key::Q => snapshot.cruise_toggle = true,
            }
        }
        snapshot
    }

    /// Net steering: `+1` left, `-1` right, `0` when both or neither are held.
    pub fn steer(&self) -> f32 {
        match (self.left, self.right) {
            (true, false) => 1.0,
            (false, true) => -1.0,
            _ => 0.0,
        }
    }
}

/// Turns a held toggle key into a single flip.
#[derive(Debug, Clone, Copy, Default)]
pub struct CruiseToggle {
    was_held: bool,
}

impl CruiseToggle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed this tick's key state; true on the press edge only.
    pub fn update(&mut self, held: bool) -> bool {
        let pressed = held && !self.was_held;
        self.was_held = held;
        if pressed {
            tracing::trace!("cruise toggle pressed");
        }
        pressed
    }
}
