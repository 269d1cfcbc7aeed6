//! Perioperative scoring instruments.
//!
//! Every function here is pure: the same input always yields the same
//! [`ScoreResult`]. Out-of-domain input is reported as a [`ValidationError`]
//! and never corrected silently, with the exception of the NSQIP proxy whose
//! inputs are free-form by design.

mod akics;
mod ariscat;
mod asa;
mod nsqip;
mod pre_deliric;
mod rcri;
mod stop_bang;

pub use akics::*;
pub use ariscat::*;
pub use asa::*;
pub use nsqip::*;
pub use pre_deliric::*;
pub use rcri::*;
pub use stop_bang::*;

use thiserror::Error;

/// Invalid input to a scoring instrument.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("{field} = {value} is outside [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("{field} must be greater than {bound}, got {value}")]
    NotAbove {
        field: &'static str,
        value: f64,
        bound: f64,
    },

    #[error("invalid {field}: {value:?} (expected one of {expected})")]
    InvalidChoice {
        field: &'static str,
        value: String,
        expected: &'static str,
    },
}

pub type ScoringResult<T> = Result<T, ValidationError>;

/// Check that `value` lies in the closed interval `[min, max]`. NaN fails.
fn check_range(field: &'static str, value: f64, min: f64, max: f64) -> ScoringResult<()> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::OutOfRange {
            field,
            value,
            min,
            max,
        })
    }
}

/// Weight contributed by a boolean factor.
fn flag(present: bool, weight: f64) -> f64 {
    if present {
        weight
    } else {
        0.0
    }
}

/// Lower-case and strip the accents that show up in Portuguese form input,
/// so "Cirúrgico" and "cirurgico" compare equal.
fn fold(text: &str) -> String {
    text.trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'á' | 'à' | 'â' | 'ã' => 'a',
            'é' | 'ê' => 'e',
            'í' => 'i',
            'ó' | 'ô' | 'õ' => 'o',
            'ú' | 'ü' => 'u',
            'ç' => 'c',
            other => other,
        })
        .collect()
}
