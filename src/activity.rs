// src/activity.rs - Decides whether a hand is being held up as a controller
use tracing::info;

use crate::landmarks::{
    HandFrame, HandPresence, Side, INDEX_DIP, INDEX_MCP, INDEX_TIP, MIDDLE_DIP, MIDDLE_TIP,
    PINKY_MCP, WRIST,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActivityThresholds {
    /// Hand becomes active when `width * activation_ratio < height`.
    pub activation_ratio: f64,
    /// Hand becomes inactive when `width * deactivation_ratio >= height`.
    pub deactivation_ratio: f64,
}

impl Default for ActivityThresholds {
    fn default() -> Self {
        Self {
            activation_ratio: 1.5,
            deactivation_ratio: 1.0,
        }
    }
}

/// Persistent active flag for one hand.
#[derive(Debug, Clone)]
pub struct HandActivity {
    side: Side,
    active: bool,
    thresholds: ActivityThresholds,
}

impl HandActivity {
    pub fn new(side: Side, thresholds: ActivityThresholds) -> Self {
        Self {
            side,
            active: false,
            thresholds,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Updates the flag from this tick's landmarks and returns the frame to
    /// classify, if any.
    ///
    /// An absent hand deactivates at once. A present hand with neither index
    /// nor middle finger raised carries no shape signal: the flag is left
    /// alone and nothing is classified.
    pub fn update<'a>(&mut self, presence: &'a HandPresence) -> Option<&'a HandFrame> {
        let frame = match presence {
            HandPresence::Present(frame) => frame,
            HandPresence::Absent => {
                if self.active {
                    info!("{} hand deactivated", self.side.as_str());
                    self.active = false;
                }
                return None;
            }
        };

        if !has_raised_finger(frame) {
            return None;
        }

        let (width, height) = palm_extent(frame);
        if width * self.thresholds.activation_ratio < height && !self.active {
            info!("{} hand activated", self.side.as_str());
            self.active = true;
        } else if width * self.thresholds.deactivation_ratio >= height && self.active {
            info!("{} hand deactivated", self.side.as_str());
            self.active = false;
        }

        self.active.then_some(frame)
    }
}

fn has_raised_finger(frame: &HandFrame) -> bool {
    frame.y(MIDDLE_TIP) < frame.y(MIDDLE_DIP) || frame.y(INDEX_TIP) < frame.y(INDEX_DIP)
}

/// Knuckle-line width and wrist-to-index-knuckle height.
fn palm_extent(frame: &HandFrame) -> (f64, f64) {
    let width = (frame.x(INDEX_MCP) - frame.x(PINKY_MCP)).abs();
    let height = frame.y(WRIST) - frame.y(INDEX_MCP);
    (width, height)
}
