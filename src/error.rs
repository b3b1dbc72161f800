//! Error types for the tempo analysis engine

use std::fmt;

/// Errors that can occur during tempo analysis
///
/// Only invalid caller input is reported through this type. Short or silent
/// audio is not an error: it yields a zero-confidence
/// [`AnalysisResult`](crate::AnalysisResult) carrying an explanatory flag.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisError {
    /// Invalid input parameters (malformed PCM buffer, invalid configuration)
    InvalidInput(String),

    /// Numerical error (non-finite samples, etc.)
    NumericalError(String),
}

impl fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            AnalysisError::NumericalError(msg) => write!(f, "Numerical error: {}", msg),
        }
    }
}

impl std::error::Error for AnalysisError {}
