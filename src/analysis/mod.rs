//! Analysis and result aggregation modules
//!
//! Combines the tempo estimate into the final analysis:
//! - Confidence scoring
//! - Result types
//! - Progress notification

pub mod confidence;
pub mod progress;
pub mod result;
