// src/mode.rs - Left hand picks the active command module and can end the run
use std::fmt;

use serde::Serialize;
use tracing::info;

use crate::error::{GestureError, Result};
use crate::gesture::{Finger, FingerTransition, GestureBank, Transition};
use crate::landmarks::{HandFrame, Side};
use crate::tilt::TiltContext;

pub const MODE_COUNT: usize = 5;

/// Index of the command module the right hand drives, always in `0..=4`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct Mode(usize);

impl Mode {
    pub fn new(value: usize) -> Result<Self> {
        if value < MODE_COUNT {
            Ok(Self(value))
        } else {
            Err(GestureError::InvalidMode(value))
        }
    }

    pub fn index(self) -> usize {
        self.0
    }

    pub fn all() -> impl Iterator<Item = Mode> {
        (0..MODE_COUNT).map(Mode)
    }
}

impl From<Finger> for Mode {
    fn from(finger: Finger) -> Self {
        Mode(finger.index())
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What the left hand decided this tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    /// Each transition with the mode in effect right after it was applied.
    pub transitions: Vec<(FingerTransition, Mode)>,
    /// Thumb and ring finger are both folded.
    pub shutdown: bool,
}

/// Left-hand gesture bank plus the current mode.
#[derive(Debug, Clone)]
pub struct ModeSelector {
    bank: GestureBank,
    mode: Mode,
}

impl Default for ModeSelector {
    fn default() -> Self {
        Self::new()
    }
}

impl ModeSelector {
    pub fn new() -> Self {
        Self {
            bank: GestureBank::new(Side::Left),
            mode: Mode::default(),
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn bank(&self) -> &GestureBank {
        &self.bank
    }

    /// Runs the left-hand machines. Every finger that folds selects its own
    /// mode; fingers are visited thumb first, so the highest one wins.
    pub fn update(&mut self, frame: &HandFrame) -> anyhow::Result<Selection> {
        let mut transitions = Vec::new();
        let mode = &mut self.mode;

        self.bank.evaluate(frame, TiltContext::None, |t| {
            if t.transition == Transition::Activated {
                *mode = Mode::from(t.finger);
                info!("set mode to {}", mode);
            }
            transitions.push((t, *mode));
            Ok(())
        })?;

        let shutdown = self.bank.is_activated(Finger::Thumb, TiltContext::None)
            && self.bank.is_activated(Finger::Ring, TiltContext::None);

        Ok(Selection {
            transitions,
            shutdown,
        })
    }
}
