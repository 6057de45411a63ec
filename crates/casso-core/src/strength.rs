//! Constraint strengths.
//!
//! A strength is a priority triple (strong, medium, weak) collapsed into a
//! single scalar. Each component is clamped to `[0, 1000]` and the tiers are
//! spaced by a factor of 1000, so a higher tier dominates any amount of a
//! lower one. [`Strength::REQUIRED`] sits above every achievable combination
//! and marks hard constraints, which the solver never trades off.

use std::fmt;
use std::str::FromStr;

use crate::errors::AlgebraError;

/// Largest value a single tier component may take.
const TIER_MAX: f64 = 1000.0;

/// Upper bound for any non-required combination.
const COMBINED_MAX: f64 = 1_000_000_000.0;

/// The priority of a constraint.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "f64"))]
pub struct Strength(f64);

impl Strength {
    pub const REQUIRED: Strength = Strength(1_001_001_000.0);
    pub const STRONG: Strength = Strength(1_000_000.0);
    pub const MEDIUM: Strength = Strength(1_000.0);
    pub const WEAK: Strength = Strength(1.0);

    /// Combine the three tiers, each scaled by `weight`, into one strength.
    ///
    /// A tier whose scaled value is NaN saturates at the tier maximum.
    pub fn create(strong: f64, medium: f64, weak: f64, weight: f64) -> Self {
        let tier = |w: f64| {
            let scaled = w * weight;
            if scaled.is_nan() {
                TIER_MAX
            } else {
                scaled.clamp(0.0, TIER_MAX)
            }
        };
        let combined = tier(strong) * 1_000_000.0 + tier(medium) * 1_000.0 + tier(weak);
        Self::clip(combined.min(COMBINED_MAX))
    }

    /// Create a strength from a raw scalar, clipped to `[0, REQUIRED]`.
    pub fn new(value: f64) -> Self {
        Self::clip(value)
    }

    /// Clip a raw scalar into the valid strength range.
    pub fn clip(value: f64) -> Self {
        if value.is_nan() {
            return Self(0.0);
        }
        Self(value.clamp(0.0, Self::REQUIRED.0))
    }

    /// Look up one of the named strengths.
    pub fn from_name(name: &str) -> Result<Self, AlgebraError> {
        match name {
            "weak" => Ok(Self::WEAK),
            "medium" => Ok(Self::MEDIUM),
            "strong" => Ok(Self::STRONG),
            "required" => Ok(Self::REQUIRED),
            _ => Err(AlgebraError::UnknownStrengthName {
                name: name.to_string(),
            }),
        }
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    /// Check if this is a required strength.
    pub fn is_required(&self) -> bool {
        self.0 >= Self::REQUIRED.0
    }
}

impl Default for Strength {
    fn default() -> Self {
        Self::REQUIRED
    }
}

impl From<f64> for Strength {
    fn from(value: f64) -> Self {
        Self::clip(value)
    }
}

impl FromStr for Strength {
    type Err = AlgebraError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s)
    }
}

impl fmt::Display for Strength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
