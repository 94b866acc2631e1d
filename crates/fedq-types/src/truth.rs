//! Kleene three-valued logic

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{BitAnd, BitOr, Not};

/// A three-valued truth value.
///
/// `Undefined` means "not known yet". It propagates through the connectives
/// according to Kleene's strong logic:
///
/// | A         | B         | A and B   | A or B    |
/// |-----------|-----------|-----------|-----------|
/// | true      | true      | true      | true      |
/// | true      | false     | false     | true      |
/// | true      | undefined | undefined | true      |
/// | false     | false     | false     | false     |
/// | false     | undefined | false     | undefined |
/// | undefined | undefined | undefined | undefined |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TruthValue {
    True,
    False,
    Undefined,
}

impl TruthValue {
    /// Logical negation; undefined stays undefined
    pub fn not(self) -> Self {
        match self {
            Self::True => Self::False,
            Self::False => Self::True,
            Self::Undefined => Self::Undefined,
        }
    }

    /// Conjunction: false dominates, then undefined
    pub fn and(self, other: Self) -> Self {
        match (self, other) {
            (Self::False, _) | (_, Self::False) => Self::False,
            (Self::Undefined, _) | (_, Self::Undefined) => Self::Undefined,
            (Self::True, Self::True) => Self::True,
        }
    }

    /// Disjunction: true dominates, then undefined
    pub fn or(self, other: Self) -> Self {
        match (self, other) {
            (Self::True, _) | (_, Self::True) => Self::True,
            (Self::Undefined, _) | (_, Self::Undefined) => Self::Undefined,
            (Self::False, Self::False) => Self::False,
        }
    }

    /// Exactly true
    pub fn is_true(self) -> bool {
        self == Self::True
    }

    /// Exactly false
    pub fn is_false(self) -> bool {
        self == Self::False
    }

    pub fn is_undefined(self) -> bool {
        self == Self::Undefined
    }
}

impl From<bool> for TruthValue {
    fn from(value: bool) -> Self {
        if value { Self::True } else { Self::False }
    }
}

impl Not for TruthValue {
    type Output = Self;

    fn not(self) -> Self {
        TruthValue::not(self)
    }
}

impl BitAnd for TruthValue {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        self.and(rhs)
    }
}

impl BitOr for TruthValue {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.or(rhs)
    }
}

impl fmt::Display for TruthValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::True => write!(f, "true"),
            Self::False => write!(f, "false"),
            Self::Undefined => write!(f, "undefined"),
        }
    }
}
