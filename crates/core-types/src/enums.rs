use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Direction of a transfer relative to the analyzed wallet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Flow {
    In,
    Out,
}

impl FromStr for Flow {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "in" => Ok(Flow::In),
            "out" => Ok(Flow::Out),
            other => Err(CoreError::InvalidInput("Flow".to_string(), other.to_string())),
        }
    }
}

impl fmt::Display for Flow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Flow::In => f.write_str("in"),
            Flow::Out => f.write_str("out"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_flows() {
        assert_eq!("in".parse::<Flow>().unwrap(), Flow::In);
        assert_eq!(" out ".parse::<Flow>().unwrap(), Flow::Out);
        assert_eq!(Flow::Out.to_string(), "out");
    }

    #[test]
    fn rejects_unknown_flow() {
        let err = "IN".parse::<Flow>().unwrap_err();
        assert_eq!(err, CoreError::InvalidInput("Flow".to_string(), "IN".to_string()));
    }
}
