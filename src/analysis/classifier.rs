// Classifier - nearest-fingering note classification
//
// Scores the smoothed fingering vector against every entry of the fixed
// note table by Hamming similarity (number of agreeing bits). The best
// score wins, ties go to the earlier table entry, and the winner is only
// reported when it reaches the minimum match score.

use crate::analysis::fingering::{FingeringVector, Note, NOTE_TABLE};
use crate::config::ClassifierConfig;

/// Maps fingering vectors to notes.
#[derive(Debug, Clone, Copy)]
pub struct FingeringClassifier {
    /// Minimum number of agreeing bits (0-8) for a confident match
    min_score: u8,
}

impl Default for FingeringClassifier {
    fn default() -> Self {
        Self::new(7)
    }
}

impl FingeringClassifier {
    pub fn new(min_score: u8) -> Self {
        Self { min_score }
    }

    pub fn from_config(config: &ClassifierConfig) -> Self {
        Self::new(config.min_match_score)
    }

    pub fn min_score(&self) -> u8 {
        self.min_score
    }

    /// Best table entry for `bits` and its score.
    ///
    /// Only a strictly higher score replaces the current best, so the
    /// first-declared note wins ties.
    pub fn best_match(&self, bits: FingeringVector) -> (Note, u8) {
        let (first_note, first_pattern) = NOTE_TABLE[0];
        let mut best = (first_note, bits.similarity(first_pattern));
        for &(note, pattern) in NOTE_TABLE.iter().skip(1) {
            let score = bits.similarity(pattern);
            if score > best.1 {
                best = (note, score);
            }
        }
        best
    }

    /// Classify a fingering vector.
    ///
    /// # Returns
    /// The best-matching note if its score reaches the minimum, else `None`
    pub fn classify(&self, bits: FingeringVector) -> Option<Note> {
        let (note, score) = self.best_match(bits);
        if score >= self.min_score {
            Some(note)
        } else {
            None
        }
    }
}

#[cfg(test)]
#[path = "classifier_tests.rs"]
mod tests;
