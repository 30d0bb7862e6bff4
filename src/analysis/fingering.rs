//! Notes and their fixed fingering table.
//!
//! A fingering is an 8-bit vector, one bit per tracked finger in
//! [`FingerId`] order, where a set bit means the finger is lifted and its
//! hole is open. The table is a compile-time constant; its declaration
//! order is the tie-break order for classification.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::tracking::{FingerId, FINGER_COUNT};

/// The eight playable notes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Note {
    C4,
    D4,
    E4,
    F4,
    G4,
    A4,
    B4,
    C5,
}

impl Note {
    pub const ALL: [Note; 8] = [
        Note::C4,
        Note::D4,
        Note::E4,
        Note::F4,
        Note::G4,
        Note::A4,
        Note::B4,
        Note::C5,
    ];

    /// Position in the note table
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Note::C4 => "C4",
            Note::D4 => "D4",
            Note::E4 => "E4",
            Note::F4 => "F4",
            Note::G4 => "G4",
            Note::A4 => "A4",
            Note::B4 => "B4",
            Note::C5 => "C5",
        }
    }

    /// Fundamental frequency in Hz (equal temperament, A4 = 440 Hz)
    pub fn frequency_hz(self) -> f32 {
        match self {
            Note::C4 => 261.63,
            Note::D4 => 293.66,
            Note::E4 => 329.63,
            Note::F4 => 349.23,
            Note::G4 => 392.00,
            Note::A4 => 440.00,
            Note::B4 => 493.88,
            Note::C5 => 523.25,
        }
    }

    /// This note's fingering from the fixed table
    pub fn fingering(self) -> FingeringVector {
        NOTE_TABLE[self.index()].1
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Note {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Note::ALL
            .into_iter()
            .find(|note| note.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown note '{}'", s))
    }
}

/// Eight finger-up bits, bit `i` belonging to `FingerId::ALL[i]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FingeringVector(u8);

impl FingeringVector {
    /// Build from 0/1 flags in finger order; any non-zero value counts as up.
    pub const fn from_bits(bits: [u8; FINGER_COUNT]) -> Self {
        let mut mask = 0u8;
        let mut i = 0;
        while i < FINGER_COUNT {
            if bits[i] != 0 {
                mask |= 1 << i;
            }
            i += 1;
        }
        Self(mask)
    }

    /// Build from smoothed "finger down" states: a lifted finger opens its hole.
    pub fn from_down_states(down: [bool; FINGER_COUNT]) -> Self {
        Self::from_bits(down.map(|is_down| u8::from(!is_down)))
    }

    pub fn is_up(self, finger: FingerId) -> bool {
        self.0 & (1 << finger.index()) != 0
    }

    pub fn to_bits(self) -> [u8; FINGER_COUNT] {
        std::array::from_fn(|i| (self.0 >> i) & 1)
    }

    /// Number of positions where both vectors agree (0-8)
    pub fn similarity(self, other: FingeringVector) -> u8 {
        FINGER_COUNT as u8 - (self.0 ^ other.0).count_ones() as u8
    }

    /// Copy with one finger's bit flipped
    pub fn toggled(self, finger: FingerId) -> Self {
        Self(self.0 ^ (1 << finger.index()))
    }
}

impl fmt::Display for FingeringVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for bit in self.to_bits() {
            write!(f, "{}", bit)?;
        }
        Ok(())
    }
}

impl Serialize for FingeringVector {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_bits().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for FingeringVector {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let bits = <[u8; FINGER_COUNT]>::deserialize(deserializer)?;
        Ok(Self::from_bits(bits))
    }
}

/// Fingering for every note, in tie-break order.
///
/// Holes open from the bottom of the instrument upward: each step up the
/// scale lifts one more finger, starting with the right pinky.
pub const NOTE_TABLE: [(Note, FingeringVector); 8] = [
    (Note::C4, FingeringVector::from_bits([0, 0, 0, 0, 0, 0, 0, 0])),
    (Note::D4, FingeringVector::from_bits([0, 0, 0, 0, 0, 0, 0, 1])),
    (Note::E4, FingeringVector::from_bits([0, 0, 0, 0, 0, 0, 1, 1])),
    (Note::F4, FingeringVector::from_bits([0, 0, 0, 0, 0, 1, 1, 1])),
    (Note::G4, FingeringVector::from_bits([0, 0, 0, 0, 1, 1, 1, 1])),
    (Note::A4, FingeringVector::from_bits([0, 0, 0, 1, 1, 1, 1, 1])),
    (Note::B4, FingeringVector::from_bits([0, 0, 1, 1, 1, 1, 1, 1])),
    (Note::C5, FingeringVector::from_bits([0, 1, 1, 1, 1, 1, 1, 1])),
];
