//! Value arrays, switches and value slots

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Marker stored for a component that has no value yet
pub const NO_VALUE: &str = "-";

/// Ordered sequence of string values, one per parameter-type component
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValueArray(Vec<String>);

impl ValueArray {
    /// Wrap a list of values
    #[inline]
    #[must_use]
    pub fn new(values: Vec<String>) -> Self {
        Self(values)
    }

    /// `count` components, all set to [`NO_VALUE`]
    #[must_use]
    pub fn unset(count: usize) -> Self {
        Self(vec![NO_VALUE.to_string(); count])
    }

    /// Number of components
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when there are no components
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Value of component `index`
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(String::as_str)
    }

    /// Replace component `index`, returning false when out of range
    pub fn set(&mut self, index: usize, value: impl Into<String>) -> bool {
        match self.0.get_mut(index) {
            Some(slot) => {
                *slot = value.into();
                true
            }
            None => false,
        }
    }

    /// All values
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Iterate values
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl From<Vec<String>> for ValueArray {
    fn from(values: Vec<String>) -> Self {
        Self(values)
    }
}

impl<S: Into<String>> FromIterator<S> for ValueArray {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl Display for ValueArray {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.0.join(", "))
    }
}

/// Selects which writable slot holds the "actual" value of a value-set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SwitchKind {
    /// Value entered by hand
    #[default]
    Manual,
    /// Value produced by a computation
    Computed,
    /// Reference value
    Reference,
}

impl Display for SwitchKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Manual => "MANUAL",
            Self::Computed => "COMPUTED",
            Self::Reference => "REFERENCE",
        })
    }
}

/// A readable slot of a value-set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueSlot {
    /// Manual values
    Manual,
    /// Computed values
    Computed,
    /// Reference values
    Reference,
    /// Last published values
    Published,
    /// Whichever of manual/computed/reference the switch selects
    Actual,
}

impl From<SwitchKind> for ValueSlot {
    fn from(switch: SwitchKind) -> Self {
        match switch {
            SwitchKind::Manual => Self::Manual,
            SwitchKind::Computed => Self::Computed,
            SwitchKind::Reference => Self::Reference,
        }
    }
}

impl Display for ValueSlot {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Manual => "manual",
            Self::Computed => "computed",
            Self::Reference => "reference",
            Self::Published => "published",
            Self::Actual => "actual",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_fills_marker() {
        let values = ValueArray::unset(3);
        assert_eq!(values.len(), 3);
        assert!(values.iter().all(|v| v == NO_VALUE));
    }

    #[test]
    fn set_replaces_single_component() {
        let mut values: ValueArray = ["1", "2", "3"].into_iter().collect();
        assert!(values.set(1, "x"));
        assert_eq!(values.as_slice(), &["1", "x", "3"]);
    }

    #[test]
    fn set_out_of_range_is_rejected() {
        let mut values = ValueArray::unset(1);
        assert!(!values.set(1, "x"));
        assert_eq!(values, ValueArray::unset(1));
    }

    #[test]
    fn switch_serializes_uppercase() {
        let json = serde_json::to_string(&SwitchKind::Computed).unwrap();
        assert_eq!(json, "\"COMPUTED\"");
    }

    #[test]
    fn slot_from_switch() {
        assert_eq!(ValueSlot::from(SwitchKind::Reference), ValueSlot::Reference);
    }
}
