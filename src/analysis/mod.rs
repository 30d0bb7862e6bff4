// Analysis module - fingering vectors to notes
//
// The fingering table and the nearest-pattern classifier. Both are pure:
// the only state lives in the finger tracker upstream and the playback
// controller downstream.

pub mod classifier;
pub mod fingering;

pub use classifier::FingeringClassifier;
pub use fingering::{FingeringVector, Note, NOTE_TABLE};
