//! Measurement scales
//!
//! A [`MeasurementScale`] constrains the numeric values a quantity may
//! take: which number set they belong to and the optional bounds.

use crate::id::Iid;
use serde::{Deserialize, Serialize};

/// Kind of measurement scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScaleKind {
    /// Ratio scale (absolute zero, e.g. mass)
    Ratio,
    /// Interval scale (arbitrary zero, e.g. Celsius)
    Interval,
    /// Ordinal scale
    Ordinal,
    /// Cyclic scale (e.g. angle)
    Cyclic,
    /// Logarithmic scale
    Logarithmic,
}

/// Number set values on a scale belong to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NumberSetKind {
    /// Non-negative integers
    Natural,
    /// Integers
    Integer,
    /// Rational numbers
    Rational,
    /// Real numbers
    Real,
}

/// Lower or upper limit of a scale
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScaleBound {
    /// Limit value
    pub value: f64,
    /// Whether the limit itself is allowed
    pub inclusive: bool,
}

/// Measurement scale referenced by parameters and compound components
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementScale {
    /// Identifier
    pub iid: Iid,
    /// Short name, e.g. `kg`
    pub short_name: String,
    /// Scale kind
    pub kind: ScaleKind,
    /// Number set
    pub number_set: NumberSetKind,
    /// Optional lower limit
    pub minimum: Option<ScaleBound>,
    /// Optional upper limit
    pub maximum: Option<ScaleBound>,
}

impl MeasurementScale {
    /// Unbounded scale
    #[must_use]
    pub fn new(
        iid: Iid,
        short_name: impl Into<String>,
        kind: ScaleKind,
        number_set: NumberSetKind,
    ) -> Self {
        Self {
            iid,
            short_name: short_name.into(),
            kind,
            number_set,
            minimum: None,
            maximum: None,
        }
    }

    /// With a lower limit
    #[inline]
    #[must_use]
    pub fn with_minimum(mut self, value: f64, inclusive: bool) -> Self {
        self.minimum = Some(ScaleBound { value, inclusive });
        self
    }

    /// With an upper limit
    #[inline]
    #[must_use]
    pub fn with_maximum(mut self, value: f64, inclusive: bool) -> Self {
        self.maximum = Some(ScaleBound { value, inclusive });
        self
    }

    /// Parse `raw` as a number of this scale and check its bounds
    ///
    /// # Errors
    /// Returns a human-readable message describing why the value does not
    /// belong on this scale.
    pub fn check(&self, raw: &str) -> Result<f64, String> {
        let raw = raw.trim();
        let value = match self.number_set {
            NumberSetKind::Natural => raw
                .parse::<u64>()
                .map(|v| v as f64)
                .map_err(|_| format!("'{raw}' is not a natural number"))?,
            NumberSetKind::Integer => raw
                .parse::<i64>()
                .map(|v| v as f64)
                .map_err(|_| format!("'{raw}' is not an integer"))?,
            NumberSetKind::Rational | NumberSetKind::Real => match raw.parse::<f64>() {
                Ok(v) if v.is_finite() => v,
                _ => return Err(format!("'{raw}' is not a real number")),
            },
        };

        if let Some(min) = self.minimum {
            let below = if min.inclusive {
                value < min.value
            } else {
                value <= min.value
            };
            if below {
                return Err(format!(
                    "{value} is below the minimum {} of scale {}",
                    min.value, self.short_name
                ));
            }
        }

        if let Some(max) = self.maximum {
            let above = if max.inclusive {
                value > max.value
            } else {
                value >= max.value
            };
            if above {
                return Err(format!(
                    "{value} is above the maximum {} of scale {}",
                    max.value, self.short_name
                ));
            }
        }

        Ok(value)
    }
}
