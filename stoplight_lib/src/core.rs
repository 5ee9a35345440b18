//! Core traffic light types.
//!
//! This module provides the `Phase` value type and the error type shared by the light
//! operations.

use std::fmt;

use thiserror::Error;

/// The two-valued state of a traffic light.
///
/// A `Phase` is a plain value: it is `Copy`, carries no identity beyond its variant, and is
/// moved through a [`BlockingQueue`](crate::queue::BlockingQueue) every time the light changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// The light is red. Every light starts out in this phase.
    Red,
    /// The light is green.
    Green,
}

impl Phase {
    /// Returns the opposite phase: red becomes green and green becomes red.
    pub fn toggled(self) -> Phase {
        match self {
            Phase::Red => Phase::Green,
            Phase::Green => Phase::Red,
        }
    }

    /// Encoding used by the atomic phase snapshot.
    pub(crate) fn as_u8(self) -> u8 {
        match self {
            Phase::Red => 0,
            Phase::Green => 1,
        }
    }

    pub(crate) fn from_u8(value: u8) -> Phase {
        match value {
            0 => Phase::Red,
            _ => Phase::Green,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Red => write!(f, "red"),
            Phase::Green => write!(f, "green"),
        }
    }
}

/// Errors returned by [`TrafficLight`](crate::light::TrafficLight) operations.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum LightError {
    /// `simulate` was called while the updater thread is already running.
    #[error("the light is already being simulated")]
    AlreadyRunning,
    /// The light has been stopped, so the operation can never complete.
    #[error("the light has been stopped")]
    Stopped,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggled_alternates() {
        assert_eq!(Phase::Red.toggled(), Phase::Green);
        assert_eq!(Phase::Green.toggled(), Phase::Red);
        assert_eq!(Phase::Red.toggled().toggled(), Phase::Red);
    }

    #[test]
    fn test_snapshot_encoding_round_trips() {
        for phase in [Phase::Red, Phase::Green] {
            assert_eq!(Phase::from_u8(phase.as_u8()), phase);
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(Phase::Red.to_string(), "red");
        assert_eq!(Phase::Green.to_string(), "green");
    }
}
