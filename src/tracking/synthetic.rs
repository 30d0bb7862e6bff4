//! Synthetic hand poses for fixtures and tests.
//!
//! Builds a plausible upright hand whose fingertips either rest on their
//! MCP joints (down) or extend well away from them (up). Geometry is only
//! as detailed as the "finger down" test needs.

use crate::tracking::landmarks::{HandJoint, HandLandmarkSet, HandSide, Landmark, JOINT_COUNT};
use crate::tracking::Digit;

const WRIST_Y: f32 = 0.8;
const MCP_Y: f32 = 0.6;
const FINGER_SPACING: f32 = 0.04;
const DOWN_TIP_OFFSET: f32 = 0.02;
const UP_TIP_LENGTH: f32 = 0.2;

/// Build a hand on `side` with each digit down or up.
///
/// `down` is ordered index, middle, ring, pinky.
pub fn synthetic_hand(side: HandSide, down: [bool; 4]) -> HandLandmarkSet {
    let wrist_x = match side {
        HandSide::Left => 0.3,
        HandSide::Right => 0.7,
    };
    let mut hand = HandLandmarkSet::new([Landmark::new(wrist_x, WRIST_Y); JOINT_COUNT]);

    hand.set(HandJoint::ThumbCmc, Landmark::new(wrist_x - 0.05, 0.75));
    hand.set(HandJoint::ThumbMcp, Landmark::new(wrist_x - 0.08, 0.7));
    hand.set(HandJoint::ThumbIp, Landmark::new(wrist_x - 0.1, 0.66));
    hand.set(HandJoint::ThumbTip, Landmark::new(wrist_x - 0.12, 0.62));

    for (slot, digit) in Digit::ALL.into_iter().enumerate() {
        let x = wrist_x - 0.06 + FINGER_SPACING * slot as f32;
        let (pip, dip, tip) = if down[slot] {
            (
                Landmark::new(x, MCP_Y - 0.05),
                Landmark::new(x, MCP_Y - 0.02),
                Landmark::new(x, MCP_Y + DOWN_TIP_OFFSET),
            )
        } else {
            (
                Landmark::new(x, MCP_Y - UP_TIP_LENGTH * 0.4),
                Landmark::new(x, MCP_Y - UP_TIP_LENGTH * 0.7),
                Landmark::new(x, MCP_Y - UP_TIP_LENGTH),
            )
        };
        let (pip_joint, dip_joint) = match digit {
            Digit::Index => (HandJoint::IndexPip, HandJoint::IndexDip),
            Digit::Middle => (HandJoint::MiddlePip, HandJoint::MiddleDip),
            Digit::Ring => (HandJoint::RingPip, HandJoint::RingDip),
            Digit::Pinky => (HandJoint::PinkyPip, HandJoint::PinkyDip),
        };
        hand.set(digit.base(), Landmark::new(x, MCP_Y));
        hand.set(pip_joint, pip);
        hand.set(dip_joint, dip);
        hand.set(digit.tip(), tip);
    }

    hand
}

/// Build a hand from finger-up flags (1 = up / hole open), as used in
/// fixture scripts.
pub fn hand_from_up_bits(side: HandSide, up: [u8; 4]) -> HandLandmarkSet {
    synthetic_hand(side, up.map(|bit| bit == 0))
}
