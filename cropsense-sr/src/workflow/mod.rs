//! Sample intake workflow
//!
//! One submission runs, in order:
//! 1. Location enrichment (only in location mode, and it must finish
//!    before anything reads the measurement)
//! 2. Validation and feature vector build
//! 3. Prediction call, concurrently with the transition context projection
//! 4. Ranking of the predictor response

pub mod intake;

pub use intake::{InputMode, IntakeSession, SubmissionError, SubmissionOutcome};
