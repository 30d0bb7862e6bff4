// Tracking module - from hand landmarks to smoothed finger states
//
// Landmark frames arrive from an external hand tracker already split into
// left and right hands. This module names the eight tracked fingers,
// derives a raw "finger down" observation per finger, and smooths those
// observations over time.

pub mod landmarks;
pub mod smoothing;
pub mod synthetic;

pub use landmarks::{HandFrame, HandJoint, HandLandmarkSet, HandSide, Landmark};
pub use smoothing::{FingerHistory, FingerStateTracker};

/// Number of tracked fingers (four per hand, thumbs excluded)
pub const FINGER_COUNT: usize = 8;

/// The four non-thumb digits of one hand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Digit {
    Index,
    Middle,
    Ring,
    Pinky,
}

impl Digit {
    pub const ALL: [Digit; 4] = [Digit::Index, Digit::Middle, Digit::Ring, Digit::Pinky];

    /// Fingertip joint
    pub fn tip(self) -> HandJoint {
        match self {
            Digit::Index => HandJoint::IndexTip,
            Digit::Middle => HandJoint::MiddleTip,
            Digit::Ring => HandJoint::RingTip,
            Digit::Pinky => HandJoint::PinkyTip,
        }
    }

    /// Knuckle joint nearest the palm (MCP), the reference for "down"
    pub fn base(self) -> HandJoint {
        match self {
            Digit::Index => HandJoint::IndexMcp,
            Digit::Middle => HandJoint::MiddleMcp,
            Digit::Ring => HandJoint::RingMcp,
            Digit::Pinky => HandJoint::PinkyMcp,
        }
    }
}

/// One of the eight tracked fingers
///
/// Declaration order is significant: it is the bit position of the finger
/// in every fingering vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FingerId {
    LeftIndex,
    LeftMiddle,
    LeftRing,
    LeftPinky,
    RightIndex,
    RightMiddle,
    RightRing,
    RightPinky,
}

impl FingerId {
    pub const ALL: [FingerId; FINGER_COUNT] = [
        FingerId::LeftIndex,
        FingerId::LeftMiddle,
        FingerId::LeftRing,
        FingerId::LeftPinky,
        FingerId::RightIndex,
        FingerId::RightMiddle,
        FingerId::RightRing,
        FingerId::RightPinky,
    ];

    /// Bit position in a fingering vector (0-7)
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn hand(self) -> HandSide {
        if self.index() < 4 {
            HandSide::Left
        } else {
            HandSide::Right
        }
    }

    pub fn digit(self) -> Digit {
        Digit::ALL[self.index() % 4]
    }
}

/// Raw per-frame observation: is the fingertip close to its MCP joint?
///
/// Distance is the 2D Euclidean distance in normalized image coordinates;
/// depth is ignored because monocular depth estimates are too noisy.
pub fn finger_is_down(hand: &HandLandmarkSet, digit: Digit, threshold: f32) -> bool {
    hand.planar_distance(digit.tip(), digit.base()) < threshold
}

/// Raw observations for all eight fingers, in [`FingerId`] order
///
/// Returns `None` unless both hands are present; classification must not
/// score a missing hand as all-up or all-down.
pub fn observe_fingers(frame: &HandFrame, threshold: f32) -> Option<[bool; FINGER_COUNT]> {
    let (left, right) = frame.both()?;
    let mut raw = [false; FINGER_COUNT];
    for finger in FingerId::ALL {
        let hand = match finger.hand() {
            HandSide::Left => left,
            HandSide::Right => right,
        };
        raw[finger.index()] = finger_is_down(hand, finger.digit(), threshold);
    }
    Some(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracking::synthetic::synthetic_hand;

    #[test]
    fn finger_order_matches_bit_positions() {
        for (i, finger) in FingerId::ALL.iter().enumerate() {
            assert_eq!(finger.index(), i);
        }
        assert_eq!(FingerId::LeftPinky.hand(), HandSide::Left);
        assert_eq!(FingerId::RightIndex.hand(), HandSide::Right);
        assert_eq!(FingerId::RightRing.digit(), Digit::Ring);
    }

    #[test]
    fn down_is_strictly_below_threshold() {
        let mut hand = synthetic_hand(HandSide::Left, [true; 4]);
        let base = hand.get(HandJoint::IndexMcp);
        hand.set(
            HandJoint::IndexTip,
            Landmark::new(base.x + 0.03, base.y + 0.04),
        );
        let distance = hand.planar_distance(HandJoint::IndexTip, HandJoint::IndexMcp);
        assert!(!finger_is_down(&hand, Digit::Index, distance));
        assert!(finger_is_down(&hand, Digit::Index, distance + 0.001));
        assert!(!finger_is_down(&hand, Digit::Index, 0.045));
    }

    #[test]
    fn observe_requires_both_hands() {
        let frame = HandFrame {
            left: Some(synthetic_hand(HandSide::Left, [true; 4])),
            right: None,
        };
        assert!(observe_fingers(&frame, 0.05).is_none());
    }

    #[test]
    fn observe_maps_hands_to_finger_order() {
        let frame = HandFrame {
            left: Some(synthetic_hand(HandSide::Left, [true, false, true, false])),
            right: Some(synthetic_hand(HandSide::Right, [false, false, false, true])),
        };
        let raw = observe_fingers(&frame, 0.05).unwrap();
        assert_eq!(raw, [true, false, true, false, false, false, false, true]);
    }
}
