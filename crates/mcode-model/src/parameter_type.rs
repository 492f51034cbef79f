//! Parameter types and value validation
//!
//! A [`ParameterType`] is either simple (one value) or compound (an
//! ordered list of named components, each with its own scalar type and
//! scale). Validation of a candidate value is delegated to the scalar
//! kind of the type (or of the component, for compound types).

use crate::id::Iid;
use crate::scale::MeasurementScale;
use crate::value::NO_VALUE;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use dashmap::DashMap;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::sync::OnceLock;

/// Separator between selected literals of a multi-select enumeration
pub const MULTI_SELECT_SEPARATOR: char = '|';

/// Text patterns compiled once per process, anchored to the whole value
static PATTERNS: OnceLock<DashMap<String, Regex>> = OnceLock::new();

fn anchored(pattern: &str) -> Result<Regex, regex::Error> {
    let patterns = PATTERNS.get_or_init(DashMap::new);
    if let Some(re) = patterns.get(pattern) {
        return Ok(re.clone());
    }
    let re = Regex::new(&format!("^(?:{pattern})$"))?;
    patterns.insert(pattern.to_string(), re.clone());
    Ok(re)
}

/// Outcome kind of a validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationResultKind {
    /// Value is acceptable
    Valid,
    /// Value is not acceptable
    Invalid,
    /// The type could not decide (e.g. broken pattern, compound type)
    Inconclusive,
}

impl Display for ValidationResultKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Valid => "Valid",
            Self::Invalid => "Invalid",
            Self::Inconclusive => "Inconclusive",
        })
    }
}

/// Result of validating a value against a parameter type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// Outcome
    pub kind: ValidationResultKind,
    /// Explanation (empty when valid)
    pub message: String,
}

impl ValidationResult {
    /// Successful validation
    #[inline]
    #[must_use]
    pub fn valid() -> Self {
        Self {
            kind: ValidationResultKind::Valid,
            message: String::new(),
        }
    }

    /// Failed validation
    #[inline]
    #[must_use]
    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            kind: ValidationResultKind::Invalid,
            message: message.into(),
        }
    }

    /// Undecided validation
    #[inline]
    #[must_use]
    pub fn inconclusive(message: impl Into<String>) -> Self {
        Self {
            kind: ValidationResultKind::Inconclusive,
            message: message.into(),
        }
    }

    /// True when the value was accepted
    #[inline]
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.kind == ValidationResultKind::Valid
    }
}

/// Scalar value kinds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScalarKind {
    /// Numeric quantity, validated against a measurement scale
    Quantity,
    /// `true` / `false`
    Boolean,
    /// Free text, optionally constrained by a regular expression
    Text {
        /// Pattern the whole value must match
        pattern: Option<String>,
    },
    /// One (or several) of a fixed set of literals
    Enumeration {
        /// Allowed literal short names
        literals: Vec<String>,
        /// Whether several literals may be selected
        allow_multi_select: bool,
    },
    /// Calendar date (`YYYY-MM-DD`)
    Date,
    /// Date and time (RFC 3339 or `YYYY-MM-DDTHH:MM:SS`)
    DateTime,
    /// Time of day (`HH:MM:SS`)
    TimeOfDay,
}

impl ScalarKind {
    /// Form of `value` that is validated and stored
    ///
    /// Surrounding whitespace is dropped, except for free text.
    #[inline]
    #[must_use]
    pub fn canonical<'v>(&self, value: &'v str) -> &'v str {
        match self {
            Self::Text { .. } => value,
            _ => value.trim(),
        }
    }

    /// Validate `value` for this kind
    ///
    /// The no-value marker `-` is accepted for every kind.
    #[must_use]
    pub fn validate(&self, value: &str, scale: Option<&MeasurementScale>) -> ValidationResult {
        let value = self.canonical(value);
        if value == NO_VALUE {
            return ValidationResult::valid();
        }

        match self {
            Self::Quantity => match scale {
                Some(scale) => match scale.check(value) {
                    Ok(_) => ValidationResult::valid(),
                    Err(message) => ValidationResult::invalid(message),
                },
                None => ValidationResult::invalid("a quantity requires a measurement scale"),
            },
            Self::Boolean => {
                let accepted = ["true", "false", "1", "0"]
                    .iter()
                    .any(|b| value.eq_ignore_ascii_case(b));
                if accepted {
                    ValidationResult::valid()
                } else {
                    ValidationResult::invalid(format!("'{value}' is not a boolean"))
                }
            }
            Self::Text { pattern: None } => ValidationResult::valid(),
            Self::Text {
                pattern: Some(pattern),
            } => match anchored(pattern) {
                Ok(re) if re.is_match(value) => ValidationResult::valid(),
                Ok(_) => ValidationResult::invalid(format!(
                    "'{value}' does not match the pattern {pattern}"
                )),
                Err(e) => ValidationResult::inconclusive(format!("unusable pattern {pattern}: {e}")),
            },
            Self::Enumeration {
                literals,
                allow_multi_select,
            } => {
                let selected: Vec<&str> = if *allow_multi_select {
                    value.split(MULTI_SELECT_SEPARATOR).map(str::trim).collect()
                } else {
                    vec![value]
                };
                match selected
                    .iter()
                    .find(|s| !literals.iter().any(|l| l == *s))
                {
                    None => ValidationResult::valid(),
                    Some(unknown) => ValidationResult::invalid(format!(
                        "'{unknown}' is not one of [{}]",
                        literals.join(", ")
                    )),
                }
            }
            Self::Date => match NaiveDate::parse_from_str(value, "%Y-%m-%d") {
                Ok(_) => ValidationResult::valid(),
                Err(_) => ValidationResult::invalid(format!("'{value}' is not a date (YYYY-MM-DD)")),
            },
            Self::DateTime => {
                let parsed = DateTime::parse_from_rfc3339(value).is_ok()
                    || NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S").is_ok();
                if parsed {
                    ValidationResult::valid()
                } else {
                    ValidationResult::invalid(format!("'{value}' is not a date-time"))
                }
            }
            Self::TimeOfDay => match NaiveTime::parse_from_str(value, "%H:%M:%S%.f") {
                Ok(_) => ValidationResult::valid(),
                Err(_) => ValidationResult::invalid(format!("'{value}' is not a time of day (HH:MM:SS)")),
            },
        }
    }
}

/// One component of a compound parameter type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterTypeComponent {
    /// Component short name, appended to model codes
    pub short_name: String,
    /// Scalar parameter type of the component
    pub parameter_type: Iid,
    /// Scale used by the component, if quantitative
    pub scale: Option<Iid>,
}

/// Simple or compound
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParameterTypeKind {
    /// Single scalar value
    Simple(ScalarKind),
    /// Ordered list of components
    Compound(Vec<ParameterTypeComponent>),
}

/// Parameter type, referenced by parameters through its `iid`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterType {
    /// Identifier
    pub iid: Iid,
    /// Short name, used in model codes
    pub short_name: String,
    /// Human-readable name
    pub name: String,
    /// Simple or compound
    pub kind: ParameterTypeKind,
}

impl ParameterType {
    /// Simple parameter type
    #[must_use]
    pub fn simple(iid: Iid, short_name: impl Into<String>, scalar: ScalarKind) -> Self {
        let short_name = short_name.into();
        Self {
            iid,
            name: short_name.clone(),
            short_name,
            kind: ParameterTypeKind::Simple(scalar),
        }
    }

    /// Compound parameter type
    #[must_use]
    pub fn compound(
        iid: Iid,
        short_name: impl Into<String>,
        components: Vec<ParameterTypeComponent>,
    ) -> Self {
        let short_name = short_name.into();
        Self {
            iid,
            name: short_name.clone(),
            short_name,
            kind: ParameterTypeKind::Compound(components),
        }
    }

    /// Number of values a value-set of this type holds per slot
    #[inline]
    #[must_use]
    pub fn number_of_values(&self) -> usize {
        match &self.kind {
            ParameterTypeKind::Simple(_) => 1,
            ParameterTypeKind::Compound(components) => components.len(),
        }
    }

    /// Components, empty for simple types
    #[inline]
    #[must_use]
    pub fn components(&self) -> &[ParameterTypeComponent] {
        match &self.kind {
            ParameterTypeKind::Simple(_) => &[],
            ParameterTypeKind::Compound(components) => components,
        }
    }

    /// Form of `value` that is validated and stored, see
    /// [`ScalarKind::canonical`]
    #[must_use]
    pub fn canonical<'v>(&self, value: &'v str) -> &'v str {
        match &self.kind {
            ParameterTypeKind::Simple(scalar) => scalar.canonical(value),
            ParameterTypeKind::Compound(_) => value.trim(),
        }
    }

    /// Validate a single value against this type
    ///
    /// Compound types cannot validate a value as a whole; callers validate
    /// each component against the component's own type and scale.
    #[must_use]
    pub fn validate(&self, value: &str, scale: Option<&MeasurementScale>) -> ValidationResult {
        match &self.kind {
            ParameterTypeKind::Simple(scalar) => scalar.validate(value, scale),
            ParameterTypeKind::Compound(_) => ValidationResult::inconclusive(format!(
                "compound type {} is validated per component",
                self.short_name
            )),
        }
    }
}
