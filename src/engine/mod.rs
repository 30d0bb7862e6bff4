//! Engine module housing the frame pipeline and its time sources.
//!
//! `core` wires tracking, classification, and playback into a
//! `FluteSession`; `clock` abstracts time so replays are deterministic.

pub mod clock;
pub mod core;

pub use clock::{ManualTimeSource, SystemTimeSource, TimeSource};
pub use core::{FluteSession, FrameOutcome, FrameSnapshot, HoleState};
