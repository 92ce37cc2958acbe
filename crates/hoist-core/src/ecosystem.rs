use serde::{Deserialize, Serialize};
use std::fmt;

/// Runtime family inferred from a source tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ecosystem {
    Python,
    Node,
    Unknown,
}

impl Ecosystem {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Python => "python",
            Self::Node => "node",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Ecosystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the source inspector found. Produced once and never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectionResult {
    pub ecosystem: Ecosystem,
    pub listen_port: u16,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_lowercase() {
        assert_eq!(Ecosystem::Python.to_string(), "python");
        assert_eq!(Ecosystem::Node.to_string(), "node");
        assert_eq!(Ecosystem::Unknown.to_string(), "unknown");
    }
}
