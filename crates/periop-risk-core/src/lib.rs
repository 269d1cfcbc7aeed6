//! Periop-Risk Core Library
//!
//! Deterministic perioperative risk scoring.
//!
//! # Architecture
//!
//! ```text
//! PatientProfile + instrument inputs
//!         │
//!         ▼
//!   ┌─────────────────────────────────────────────┐
//!   │ scores: ASA · RCRI · ARISCAT · NSQIP proxy  │
//!   │         AKICS · PRE-DELIRIC · STOP-Bang     │
//!   └─────────────────────┬───────────────────────┘
//!                         │  ScoreResult (pure, never mutated)
//!                         ▼
//!                     ScoreSet ──► AnalysisPayload { patient, scores }
//!                                         │
//!                                         ▼
//!                              periop-risk-ai (prompts, model, cache)
//! ```
//!
//! # Core Principle
//!
//! **Scores never guess.** Out-of-range input is returned to the caller as a
//! [`scores::ValidationError`]; only the NSQIP proxy accepts anything.
//!
//! # Modules
//!
//! - [`models`]: Patient profile, score results, analysis payload
//! - [`scores`]: One pure function per instrument

pub mod models;
pub mod scores;

// Re-export commonly used types
pub use models::{
    AnalysisPayload, Instrument, PatientProfile, RiskCategory, ScoreResult, ScoreSet,
};
pub use scores::{ScoringResult, ValidationError};
