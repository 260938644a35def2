//! Qubit and classical bit types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a qubit within a circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct QubitId(pub u32);

impl QubitId {
    /// Position of this qubit in a statevector or bitstring.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for QubitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "q{}", self.0)
    }
}

impl From<u32> for QubitId {
    fn from(id: u32) -> Self {
        QubitId(id)
    }
}

/// Unique identifier for a classical bit within a circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ClbitId(pub u32);

impl ClbitId {
    /// Position of this bit in a measurement bitstring.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ClbitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c{}", self.0)
    }
}

impl From<u32> for ClbitId {
    fn from(id: u32) -> Self {
        ClbitId(id)
    }
}

/// A quantum bit with optional register membership.
///
/// The E91 circuits put the first half of every pair in an `alice`
/// register and the second half in a `bob` register.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Qubit {
    /// The unique identifier.
    pub id: QubitId,
    /// The name of the register this qubit belongs to, if any.
    pub register: Option<String>,
    /// The index within the register, if any.
    pub index: Option<u32>,
}

impl Qubit {
    /// Create a new qubit with just an id.
    pub fn new(id: QubitId) -> Self {
        Self {
            id,
            register: None,
            index: None,
        }
    }

    /// Create a new qubit with register membership.
    pub fn with_register(id: QubitId, register: impl Into<String>, index: u32) -> Self {
        Self {
            id,
            register: Some(register.into()),
            index: Some(index),
        }
    }
}

impl fmt::Display for Qubit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.register, self.index) {
            (Some(reg), Some(idx)) => write!(f, "{reg}[{idx}]"),
            _ => write!(f, "{}", self.id),
        }
    }
}

/// A classical bit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Clbit {
    /// The unique identifier.
    pub id: ClbitId,
}

impl Clbit {
    /// Create a new classical bit.
    pub fn new(id: ClbitId) -> Self {
        Self { id }
    }
}

impl fmt::Display for Clbit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qubit_display() {
        let q = Qubit::new(QubitId(0));
        assert_eq!(format!("{q}"), "q0");

        let q_reg = Qubit::with_register(QubitId(7), "bob", 2);
        assert_eq!(format!("{q_reg}"), "bob[2]");
    }

    #[test]
    fn test_clbit_display() {
        let c = Clbit::new(ClbitId(3));
        assert_eq!(format!("{c}"), "c3");
    }

    #[test]
    fn test_id_index() {
        assert_eq!(QubitId(5).index(), 5);
        assert_eq!(ClbitId::from(9).index(), 9);
    }
}
