//! Pointer control
//!
//! The replay engine only needs two primitives from the platform: read the
//! live cursor position and warp the cursor to an absolute position.

/// Failures reported by a pointer backend
#[derive(Debug, thiserror::Error)]
pub enum PointerError {
    #[error("Failed to read cursor position: {0}")]
    Position(String),
    #[error("Failed to move cursor to ({x}, {y}): {reason}")]
    Move { x: i32, y: i32, reason: String },
    #[error("Pointer backend unavailable: {0}")]
    Unavailable(String),
}

/// Synchronous pointer-control primitive
pub trait Pointer {
    /// Current absolute cursor position
    fn position(&mut self) -> Result<(i32, i32), PointerError>;

    /// Move the cursor to an absolute position
    fn move_to(&mut self, x: i32, y: i32) -> Result<(), PointerError>;
}

impl<P: Pointer + ?Sized> Pointer for Box<P> {
    fn position(&mut self) -> Result<(i32, i32), PointerError> {
        (**self).position()
    }

    fn move_to(&mut self, x: i32, y: i32) -> Result<(), PointerError> {
        (**self).move_to(x, y)
    }
}

/// In-memory pointer that remembers every position it was moved to
///
/// Used for planning without a display and as a test double.
#[derive(Debug, Clone, Default)]
pub struct VirtualPointer {
    position: (i32, i32),
    history: Vec<(i32, i32)>,
}

impl VirtualPointer {
    /// Create a pointer resting at the given position
    pub fn at(x: i32, y: i32) -> Self {
        Self {
            position: (x, y),
            history: Vec::new(),
        }
    }

    /// Every position moved to, oldest first
    pub fn history(&self) -> &[(i32, i32)] {
        &self.history
    }

    /// Forget recorded moves, keeping the current position
    pub fn clear_history(&mut self) {
        self.history.clear();
    }
}

impl Pointer for VirtualPointer {
    fn position(&mut self) -> Result<(i32, i32), PointerError> {
        Ok(self.position)
    }

    fn move_to(&mut self, x: i32, y: i32) -> Result<(), PointerError> {
        self.position = (x, y);
        self.history.push((x, y));
        Ok(())
    }
}

#[cfg(feature = "desktop")]
pub use desktop::DesktopPointer;

#[cfg(feature = "desktop")]
mod desktop {
    use enigo::{Coordinate, Enigo, Mouse, Settings as EnigoSettings};

    use super::{Pointer, PointerError};

    /// Pointer backed by the OS input APIs
    pub struct DesktopPointer {
        enigo: Enigo,
    }

    impl DesktopPointer {
        /// Connect to the desktop session
        pub fn new() -> Result<Self, PointerError> {
            let enigo = Enigo::new(&EnigoSettings::default())
                .map_err(|e| PointerError::Unavailable(e.to_string()))?;
            Ok(Self { enigo })
        }
    }

    impl Pointer for DesktopPointer {
        fn position(&mut self) -> Result<(i32, i32), PointerError> {
            self.enigo
                .location()
                .map_err(|e| PointerError::Position(e.to_string()))
        }

        fn move_to(&mut self, x: i32, y: i32) -> Result<(), PointerError> {
            self.enigo
                .move_mouse(x, y, Coordinate::Abs)
                .map_err(|e| PointerError::Move {
                    x,
                    y,
                    reason: e.to_string(),
                })
        }
    }
}
