// src/gesture.rs - Per-finger hysteresis machines driven by a static rule table
//
// Every (finger, tilt context) pair owns one two-state machine. A finger moves
// Deactivated -> Activated when its fold condition holds and back when its
// unfold condition holds. The two conditions compare different landmarks, so
// there is a band where neither holds and the state is simply kept.
use serde::Serialize;
use tracing::debug;

use crate::landmarks::Axis::{X, Y};
use crate::landmarks::*;
use crate::tilt::TiltContext;
use self::Cmp::{Greater, Less};

pub const FINGER_COUNT: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Finger {
    Thumb,
    Index,
    Middle,
    Ring,
    Pinky,
}

impl Finger {
    pub const ALL: [Finger; FINGER_COUNT] = [
        Finger::Thumb,
        Finger::Index,
        Finger::Middle,
        Finger::Ring,
        Finger::Pinky,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Transition {
    Activated,
    Deactivated,
}

impl Transition {
    pub const ALL: [Transition; 2] = [Transition::Activated, Transition::Deactivated];

    pub fn index(self) -> usize {
        match self {
            Transition::Activated => 0,
            Transition::Deactivated => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Transition::Activated => "activated",
            Transition::Deactivated => "deactivated",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cmp {
    Less,
    Greater,
}

/// `coord(lhs) <cmp> coord(rhs)` along one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Condition {
    pub lhs: usize,
    pub axis: Axis,
    pub cmp: Cmp,
    pub rhs: usize,
}

impl Condition {
    const fn new(lhs: usize, axis: Axis, cmp: Cmp, rhs: usize) -> Self {
        Self { lhs, axis, cmp, rhs }
    }

    pub fn holds(&self, frame: &HandFrame) -> bool {
        let a = frame.coord(self.lhs, self.axis);
        let b = frame.coord(self.rhs, self.axis);
        match self.cmp {
            Cmp::Less => a < b,
            Cmp::Greater => a > b,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FingerRule {
    pub finger: Finger,
    pub fold: Condition,
    pub unfold: Condition,
}

const fn rule(finger: Finger, fold: Condition, unfold: Condition) -> FingerRule {
    FingerRule { finger, fold, unfold }
}

const INDEX: FingerRule = rule(
    Finger::Index,
    Condition::new(INDEX_TIP, Y, Greater, INDEX_MCP),
    Condition::new(INDEX_DIP, Y, Less, INDEX_PIP),
);

const MIDDLE: FingerRule = rule(
    Finger::Middle,
    Condition::new(MIDDLE_TIP, Y, Greater, MIDDLE_MCP),
    Condition::new(MIDDLE_DIP, Y, Less, MIDDLE_PIP),
);

// Both ring and pinky release on the DIP-above-PIP test, like the other
// long fingers, in every context.
const RING: FingerRule = rule(
    Finger::Ring,
    Condition::new(RING_TIP, Y, Greater, RING_MCP),
    Condition::new(RING_DIP, Y, Less, RING_PIP),
);

const PINKY: FingerRule = rule(
    Finger::Pinky,
    Condition::new(PINKY_TIP, Y, Greater, PINKY_MCP),
    Condition::new(PINKY_DIP, Y, Less, PINKY_PIP),
);

const fn with_thumb(thumb: FingerRule) -> [FingerRule; FINGER_COUNT] {
    [thumb, INDEX, MIDDLE, RING, PINKY]
}

const LEFT_RULES: [FingerRule; FINGER_COUNT] = with_thumb(rule(
    Finger::Thumb,
    Condition::new(THUMB_IP, X, Greater, INDEX_MCP),
    Condition::new(THUMB_TIP, X, Less, INDEX_MCP),
));

const RIGHT_UNTILTED_RULES: [FingerRule; FINGER_COUNT] = with_thumb(rule(
    Finger::Thumb,
    Condition::new(THUMB_IP, X, Less, INDEX_MCP),
    Condition::new(THUMB_TIP, X, Greater, INDEX_MCP),
));

// Tilted right, the knuckle line passes the wrist, so the thumb folds against
// the wrist instead of the index knuckle.
const RIGHT_TILTED_RIGHT_RULES: [FingerRule; FINGER_COUNT] = with_thumb(rule(
    Finger::Thumb,
    Condition::new(THUMB_IP, X, Less, WRIST),
    Condition::new(THUMB_IP, X, Greater, THUMB_MCP),
));

const RIGHT_TILTED_LEFT_RULES: [FingerRule; FINGER_COUNT] = with_thumb(rule(
    Finger::Thumb,
    Condition::new(THUMB_TIP, X, Less, MIDDLE_MCP),
    Condition::new(THUMB_TIP, X, Greater, INDEX_MCP),
));

/// Rule set for one hand in one tilt context. The left hand has a single set.
pub fn rules(side: Side, tilt: TiltContext) -> &'static [FingerRule; FINGER_COUNT] {
    match (side, tilt) {
        (Side::Left, _) => &LEFT_RULES,
        (Side::Right, TiltContext::None) => &RIGHT_UNTILTED_RULES,
        (Side::Right, TiltContext::Right) => &RIGHT_TILTED_RIGHT_RULES,
        (Side::Right, TiltContext::Left) => &RIGHT_TILTED_LEFT_RULES,
    }
}

/// Which transition, if any, a rule fires for a finger in the given state.
pub fn step(rule: &FingerRule, activated: bool, frame: &HandFrame) -> Option<Transition> {
    if !activated && rule.fold.holds(frame) {
        Some(Transition::Activated)
    } else if activated && rule.unfold.holds(frame) {
        Some(Transition::Deactivated)
    } else {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FingerTransition {
    pub finger: Finger,
    pub tilt: TiltContext,
    pub transition: Transition,
}

/// All gesture states for one hand: five fingers in each of three contexts.
/// The left hand only ever uses the untilted row.
#[derive(Debug, Clone)]
pub struct GestureBank {
    side: Side,
    activated: [[bool; FINGER_COUNT]; 3],
}

impl GestureBank {
    pub fn new(side: Side) -> Self {
        Self {
            side,
            activated: [[false; FINGER_COUNT]; 3],
        }
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn is_activated(&self, finger: Finger, tilt: TiltContext) -> bool {
        self.activated[tilt.index()][finger.index()]
    }

    /// Evaluates the five machines of `tilt` against `frame`, thumb first.
    ///
    /// `on_transition` runs for each firing finger before that finger's state
    /// is written. If it fails, the finger keeps its old state, later fingers
    /// are not evaluated and the error is returned.
    pub fn evaluate<F>(
        &mut self,
        frame: &HandFrame,
        tilt: TiltContext,
        mut on_transition: F,
    ) -> anyhow::Result<()>
    where
        F: FnMut(FingerTransition) -> anyhow::Result<()>,
    {
        let tilt = match self.side {
            Side::Left => TiltContext::None,
            Side::Right => tilt,
        };

        for rule in rules(self.side, tilt) {
            let slot = &mut self.activated[tilt.index()][rule.finger.index()];
            let Some(transition) = step(rule, *slot, frame) else {
                continue;
            };

            debug!(
                "{} {:?} {} ({})",
                self.side.as_str(),
                rule.finger,
                transition.as_str(),
                tilt.describe()
            );
            on_transition(FingerTransition {
                finger: rule.finger,
                tilt,
                transition,
            })?;
            *slot = transition == Transition::Activated;
        }

        Ok(())
    }
}
