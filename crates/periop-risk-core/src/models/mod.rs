//! Domain models for the perioperative risk system.

mod patient;
mod payload;
mod score;

pub use patient::*;
pub use payload::*;
pub use score::*;
