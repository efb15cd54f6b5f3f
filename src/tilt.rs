// src/tilt.rs
use serde::Serialize;

use crate::landmarks::{HandFrame, INDEX_MCP, PINKY_MCP, WRIST};

/// Orientation of the right hand, selecting which rule set is live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TiltContext {
    None,
    Right,
    Left,
}

impl TiltContext {
    pub const ALL: [TiltContext; 3] = [TiltContext::None, TiltContext::Right, TiltContext::Left];

    pub fn index(self) -> usize {
        match self {
            TiltContext::None => 0,
            TiltContext::Right => 1,
            TiltContext::Left => 2,
        }
    }

    /// Suffix used in callback slot names.
    pub fn slot_suffix(self) -> &'static str {
        match self {
            TiltContext::None => "without_tilt",
            TiltContext::Right => "tilted_right",
            TiltContext::Left => "tilted_left",
        }
    }

    pub fn describe(self) -> &'static str {
        match self {
            TiltContext::None => "hand not tilted",
            TiltContext::Right => "hand tilted right",
            TiltContext::Left => "hand tilted left",
        }
    }

    /// Classifies a frame. The index-knuckle test wins over the pinky one.
    pub fn classify(frame: &HandFrame) -> Self {
        if frame.x(INDEX_MCP) < frame.x(WRIST) {
            TiltContext::Right
        } else if frame.x(PINKY_MCP) > frame.x(WRIST) {
            TiltContext::Left
        } else {
            TiltContext::None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::fixtures::{open_hand, tilted_left, tilted_right};

    #[test]
    fn test_upright_hand_is_untilted() {
        assert_eq!(TiltContext::classify(&open_hand()), TiltContext::None);
    }

    #[test]
    fn test_tilt_directions() {
        assert_eq!(TiltContext::classify(&tilted_right(open_hand())), TiltContext::Right);
        assert_eq!(TiltContext::classify(&tilted_left(open_hand())), TiltContext::Left);
    }

    #[test]
    fn test_right_takes_priority() {
        // Index knuckle left of the wrist and pinky knuckle right of it.
        let mut frame = open_hand();
        frame.set(INDEX_MCP, 0.40, 0.60);
        frame.set(PINKY_MCP, 0.60, 0.62);
        assert_eq!(TiltContext::classify(&frame), TiltContext::Right);
    }
}
