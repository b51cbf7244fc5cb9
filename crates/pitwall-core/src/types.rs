//! Core identifier and classification types with validation.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation errors for core types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The provided value was zero.
    #[error("{field} must be a positive integer")]
    Zero { field: &'static str },

    /// Invalid resolution tier value.
    #[error("invalid resolution tier: {value}")]
    InvalidTier { value: String },
}

/// Generates a validated numeric key newtype with common trait implementations.
macro_rules! define_key {
    (
        $(#[$meta:meta])*
        $name:ident, $field_name:literal
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "u32", into = "u32")]
        pub struct $name(u32);

        impl $name {
            /// Creates a new key after validation.
            pub fn new(value: u32) -> Result<Self, ValidationError> {
                if value == 0 {
                    return Err(ValidationError::Zero { field: $field_name });
                }
                Ok(Self(value))
            }

            /// Returns the raw numeric value.
            #[must_use]
            pub const fn get(self) -> u32 {
                self.0
            }
        }

        impl TryFrom<u32> for $name {
            type Error = ValidationError;

            fn try_from(value: u32) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for u32 {
            fn from(key: $name) -> Self {
                key.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_key!(
    /// A validated session key.
    ///
    /// Session keys are the positive integers the timing source assigns to
    /// each session (e.g. 9161 for the 2023 Singapore Grand Prix race).
    SessionKey, "session key"
);

define_key!(
    /// A validated car number.
    ///
    /// Car numbers are the positive integers displayed on the cars
    /// (e.g. 1, 44, 81).
    DriverNumber, "driver number"
);

/// Which resolution strategy produced a set of stints.
///
/// Ordered from highest to lowest data fidelity. The tier is recorded on the
/// final analysis so callers can render an appropriate confidence caveat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolutionTier {
    /// Stints taken from source-declared stint records.
    Declared,
    /// Stint boundaries estimated from lap-time patterns alone.
    Segmented,
    /// All valid laps collapsed into one stint; no stint structure was usable.
    #[serde(rename = "single-stint")]
    SingleStint,
}

impl ResolutionTier {
    /// String representation, matching the serialized form.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Declared => "declared",
            Self::Segmented => "segmented",
            Self::SingleStint => "single-stint",
        }
    }
}

impl fmt::Display for ResolutionTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ResolutionTier {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "declared" => Ok(Self::Declared),
            "segmented" => Ok(Self::Segmented),
            "single-stint" => Ok(Self::SingleStint),
            _ => Err(ValidationError::InvalidTier {
                value: s.to_string(),
            }),
        }
    }
}
