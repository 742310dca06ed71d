//! Input events handed to the editor core by the host.

use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    #[default]
    Left,
    Right,
    Middle,
}

/// Modifier keys state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const SHIFT: Self = Self {
        shift: true,
        ctrl: false,
        alt: false,
        meta: false,
    };
}

/// Pointer event in world coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PointerEvent {
    Down {
        position: Point,
        #[serde(default)]
        button: MouseButton,
        #[serde(default)]
        modifiers: Modifiers,
    },
    Up {
        position: Point,
        #[serde(default)]
        button: MouseButton,
        #[serde(default)]
        modifiers: Modifiers,
    },
    Move {
        position: Point,
        #[serde(default)]
        modifiers: Modifiers,
    },
}

impl PointerEvent {
    pub fn position(&self) -> Point {
        match *self {
            PointerEvent::Down { position, .. }
            | PointerEvent::Up { position, .. }
            | PointerEvent::Move { position, .. } => position,
        }
    }

    pub fn modifiers(&self) -> Modifiers {
        match *self {
            PointerEvent::Down { modifiers, .. }
            | PointerEvent::Up { modifiers, .. }
            | PointerEvent::Move { modifiers, .. } => modifiers,
        }
    }

    /// Left-button press without modifiers.
    pub fn down(position: Point) -> Self {
        PointerEvent::Down {
            position,
            button: MouseButton::Left,
            modifiers: Modifiers::default(),
        }
    }

    pub fn up(position: Point) -> Self {
        PointerEvent::Up {
            position,
            button: MouseButton::Left,
            modifiers: Modifiers::default(),
        }
    }

    pub fn moved(position: Point) -> Self {
        PointerEvent::Move {
            position,
            modifiers: Modifiers::default(),
        }
    }

    /// Same event with different modifiers.
    pub fn with_modifiers(mut self, mods: Modifiers) -> Self {
        match &mut self {
            PointerEvent::Down { modifiers, .. }
            | PointerEvent::Up { modifiers, .. }
            | PointerEvent::Move { modifiers, .. } => *modifiers = mods,
        }
        self
    }
}

/// Keyboard event type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyEvent {
    Pressed(String),
    Released(String),
}

impl KeyEvent {
    pub fn is_escape(&self) -> bool {
        matches!(self, KeyEvent::Pressed(key) if key == "Escape")
    }
}

/// Any event the editor consumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputEvent {
    Pointer(PointerEvent),
    Key(KeyEvent),
}

impl From<PointerEvent> for InputEvent {
    fn from(event: PointerEvent) -> Self {
        InputEvent::Pointer(event)
    }
}

impl From<KeyEvent> for InputEvent {
    fn from(event: KeyEvent) -> Self {
        InputEvent::Key(event)
    }
}
