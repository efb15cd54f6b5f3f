// src/landmarks.rs - Hand skeleton types shared by every stage of the pipeline
use nalgebra::Vector3;
use serde::Serialize;

use crate::error::{GestureError, Result};

/// Number of points in one hand skeleton.
pub const LANDMARK_COUNT: usize = 21;

// MediaPipe hand landmark indices
pub const WRIST: usize = 0;
pub const THUMB_CMC: usize = 1;
pub const THUMB_MCP: usize = 2;
pub const THUMB_IP: usize = 3;
pub const THUMB_TIP: usize = 4;
pub const INDEX_MCP: usize = 5;
pub const INDEX_PIP: usize = 6;
pub const INDEX_DIP: usize = 7;
pub const INDEX_TIP: usize = 8;
pub const MIDDLE_MCP: usize = 9;
pub const MIDDLE_PIP: usize = 10;
pub const MIDDLE_DIP: usize = 11;
pub const MIDDLE_TIP: usize = 12;
pub const RING_MCP: usize = 13;
pub const RING_PIP: usize = 14;
pub const RING_DIP: usize = 15;
pub const RING_TIP: usize = 16;
pub const PINKY_MCP: usize = 17;
pub const PINKY_PIP: usize = 18;
pub const PINKY_DIP: usize = 19;
pub const PINKY_TIP: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
        }
    }
}

/// Image-space axis. `x` grows rightward, `y` grows downward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

/// The 21 normalized landmarks of one detected hand.
#[derive(Debug, Clone, PartialEq)]
pub struct HandFrame {
    points: [Vector3<f64>; LANDMARK_COUNT],
}

impl HandFrame {
    pub fn new(points: Vec<Vector3<f64>>) -> Result<Self> {
        let points: [Vector3<f64>; LANDMARK_COUNT] = points
            .try_into()
            .map_err(|rejected: Vec<Vector3<f64>>| GestureError::LandmarkCount(rejected.len()))?;
        Ok(Self { points })
    }

    /// Builds a frame from raw `[x, y]` or `[x, y, z]` coordinate lists.
    pub fn from_coords(coords: &[Vec<f64>]) -> Result<Self> {
        if coords.len() != LANDMARK_COUNT {
            return Err(GestureError::LandmarkCount(coords.len()));
        }

        let points = coords
            .iter()
            .enumerate()
            .map(|(index, c)| match c.as_slice() {
                [x, y] => Ok(Vector3::new(*x, *y, 0.0)),
                [x, y, z] => Ok(Vector3::new(*x, *y, *z)),
                other => Err(GestureError::LandmarkArity {
                    index,
                    len: other.len(),
                }),
            })
            .collect::<Result<Vec<_>>>()?;

        Self::new(points)
    }

    pub fn point(&self, index: usize) -> &Vector3<f64> {
        &self.points[index]
    }

    pub fn x(&self, index: usize) -> f64 {
        self.points[index].x
    }

    pub fn y(&self, index: usize) -> f64 {
        self.points[index].y
    }

    pub fn coord(&self, index: usize, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.x(index),
            Axis::Y => self.y(index),
        }
    }

    pub fn set(&mut self, index: usize, x: f64, y: f64) {
        self.points[index].x = x;
        self.points[index].y = y;
    }
}

/// Whether the landmark estimator found a hand on one side this tick.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum HandPresence {
    Present(HandFrame),
    #[default]
    Absent,
}

impl HandPresence {
    pub fn frame(&self) -> Option<&HandFrame> {
        match self {
            HandPresence::Present(frame) => Some(frame),
            HandPresence::Absent => None,
        }
    }

    pub fn is_present(&self) -> bool {
        matches!(self, HandPresence::Present(_))
    }
}

impl From<Option<HandFrame>> for HandPresence {
    fn from(frame: Option<HandFrame>) -> Self {
        frame.map_or(HandPresence::Absent, HandPresence::Present)
    }
}

/// One tick of landmark-source output.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HandsSample {
    pub left: HandPresence,
    pub right: HandPresence,
    /// Set when the display loop saw the quit key.
    pub quit: bool,
}

impl HandsSample {
    pub fn hand(&self, side: Side) -> &HandPresence {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }
}

/// Synthetic hands for unit tests.
///
/// `open_hand()` is an upright, active-shaped hand with no tilt where every
/// finger sits between its fold and unfold boundaries, so a test only has to
/// move the landmarks it cares about.
#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn open_hand() -> HandFrame {
        let mut coords = vec![vec![0.0, 0.0]; LANDMARK_COUNT];
        let mut put = |i: usize, x: f64, y: f64| coords[i] = vec![x, y];

        put(WRIST, 0.50, 0.90);

        put(THUMB_CMC, 0.60, 0.85);
        put(THUMB_MCP, 0.62, 0.80);
        put(THUMB_IP, 0.55, 0.75);
        put(THUMB_TIP, 0.55, 0.70);

        put(INDEX_MCP, 0.55, 0.60);
        put(INDEX_PIP, 0.55, 0.50);
        put(INDEX_DIP, 0.55, 0.50);
        put(INDEX_TIP, 0.55, 0.45);

        put(MIDDLE_MCP, 0.52, 0.58);
        put(MIDDLE_PIP, 0.52, 0.48);
        put(MIDDLE_DIP, 0.52, 0.48);
        put(MIDDLE_TIP, 0.52, 0.43);

        put(RING_MCP, 0.48, 0.60);
        put(RING_PIP, 0.48, 0.50);
        put(RING_DIP, 0.48, 0.50);
        put(RING_TIP, 0.48, 0.45);

        put(PINKY_MCP, 0.45, 0.62);
        put(PINKY_PIP, 0.45, 0.55);
        put(PINKY_DIP, 0.45, 0.55);
        put(PINKY_TIP, 0.45, 0.50);

        HandFrame::from_coords(&coords).expect("fixture has 21 points")
    }

    /// Wrist moved right of the index knuckle.
    pub fn tilted_right(mut frame: HandFrame) -> HandFrame {
        frame.set(WRIST, 0.60, 0.90);
        frame
    }

    /// Wrist moved left of the pinky knuckle.
    pub fn tilted_left(mut frame: HandFrame) -> HandFrame {
        frame.set(WRIST, 0.40, 0.90);
        frame
    }

    /// Index tip dropped below its knuckle.
    pub fn index_folded(mut frame: HandFrame) -> HandFrame {
        frame.set(INDEX_TIP, 0.55, 0.80);
        frame
    }

    /// Index middle segment pointing back up.
    pub fn index_unfolded(mut frame: HandFrame) -> HandFrame {
        frame.set(INDEX_DIP, 0.55, 0.20);
        frame.set(INDEX_PIP, 0.55, 0.40);
        frame
    }

    pub fn sample(left: Option<HandFrame>, right: Option<HandFrame>) -> HandsSample {
        HandsSample {
            left: left.into(),
            right: right.into(),
            quit: false,
        }
    }
}
