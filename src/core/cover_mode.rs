//! Counter modes understood by `go tool cover`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// How the instrumenter updates block counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoverMode {
    /// Record whether a block ran.
    #[default]
    Set,
    /// Count how many times a block ran.
    Count,
    /// Like `Count`, safe for concurrent goroutines.
    Atomic,
}

impl CoverMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            CoverMode::Set => "set",
            CoverMode::Count => "count",
            CoverMode::Atomic => "atomic",
        }
    }
}

impl fmt::Display for CoverMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CoverMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "set" => Ok(CoverMode::Set),
            "count" => Ok(CoverMode::Count),
            "atomic" => Ok(CoverMode::Atomic),
            _ => Err(format!(
                "invalid cover mode '{}'; expected 'set', 'count', or 'atomic'",
                s
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cover_mode() {
        assert_eq!("set".parse::<CoverMode>().unwrap(), CoverMode::Set);
        assert_eq!("ATOMIC".parse::<CoverMode>().unwrap(), CoverMode::Atomic);
        assert!("sometimes".parse::<CoverMode>().is_err());
    }
}
