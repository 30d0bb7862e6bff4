//! Hand landmark data supplied by the external hand tracker.
//!
//! A hand is 21 joints in normalized image coordinates (x, y in 0..1,
//! z relative depth), indexed the way common hand-landmark models emit
//! them. Frames hold at most one hand per side.

use serde::{Deserialize, Serialize};

/// Number of joints in one hand landmark set.
pub const JOINT_COUNT: usize = 21;

/// Anatomical joints of a hand, in landmark index order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandJoint {
    Wrist,
    ThumbCmc,
    ThumbMcp,
    ThumbIp,
    ThumbTip,
    IndexMcp,
    IndexPip,
    IndexDip,
    IndexTip,
    MiddleMcp,
    MiddlePip,
    MiddleDip,
    MiddleTip,
    RingMcp,
    RingPip,
    RingDip,
    RingTip,
    PinkyMcp,
    PinkyPip,
    PinkyDip,
    PinkyTip,
}

impl HandJoint {
    /// Landmark index (0-20)
    pub fn index(self) -> usize {
        self as usize
    }
}

/// A single landmark in normalized coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub z: f32,
}

impl Landmark {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y, z: 0.0 }
    }
}

/// Which side of the instrument a hand plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandSide {
    Left,
    Right,
}

impl HandSide {
    /// Side assignment from the wrist position in the (mirrored) frame.
    pub fn from_wrist_x(wrist_x: f32, left_max_x: f32) -> Self {
        if wrist_x < left_max_x {
            HandSide::Left
        } else {
            HandSide::Right
        }
    }
}

/// All 21 landmarks of one detected hand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandLandmarkSet {
    pub landmarks: [Landmark; JOINT_COUNT],
}

impl HandLandmarkSet {
    pub fn new(landmarks: [Landmark; JOINT_COUNT]) -> Self {
        Self { landmarks }
    }

    pub fn get(&self, joint: HandJoint) -> Landmark {
        self.landmarks[joint.index()]
    }

    pub fn set(&mut self, joint: HandJoint, landmark: Landmark) {
        self.landmarks[joint.index()] = landmark;
    }

    pub fn wrist(&self) -> Landmark {
        self.get(HandJoint::Wrist)
    }

    /// Euclidean distance between two joints in the image plane.
    pub fn planar_distance(&self, a: HandJoint, b: HandJoint) -> f32 {
        let a = self.get(a);
        let b = self.get(b);
        (a.x - b.x).hypot(a.y - b.y)
    }
}

/// Landmarks for one camera frame, split by side.
///
/// Either side may be absent; a frame with no hands at all is a meaningful
/// "hands lost" signal to the session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HandFrame {
    #[serde(default)]
    pub left: Option<HandLandmarkSet>,
    #[serde(default)]
    pub right: Option<HandLandmarkSet>,
}

impl HandFrame {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Assign raw detections to sides by wrist x position.
    ///
    /// Two detections on the same side keep the later one.
    pub fn from_detections<I>(detections: I, left_max_x: f32) -> Self
    where
        I: IntoIterator<Item = HandLandmarkSet>,
    {
        let mut frame = Self::default();
        for hand in detections {
            match HandSide::from_wrist_x(hand.wrist().x, left_max_x) {
                HandSide::Left => frame.left = Some(hand),
                HandSide::Right => frame.right = Some(hand),
            }
        }
        frame
    }

    pub fn hand_count(&self) -> usize {
        usize::from(self.left.is_some()) + usize::from(self.right.is_some())
    }

    pub fn both(&self) -> Option<(&HandLandmarkSet, &HandLandmarkSet)> {
        match (&self.left, &self.right) {
            (Some(left), Some(right)) => Some((left, right)),
            _ => None,
        }
    }
}
