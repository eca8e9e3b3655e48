use serde::{Deserialize, Serialize};

/// Signed unit along the tracking axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "i8", into = "i8")]
pub enum Direction {
    Decrease,
    #[default]
    Increase,
}

impl Direction {
    pub fn sign(self) -> f64 {
        match self {
            Direction::Decrease => -1.0,
            Direction::Increase => 1.0,
        }
    }
}

impl From<Direction> for i8 {
    fn from(d: Direction) -> i8 {
        match d {
            Direction::Decrease => -1,
            Direction::Increase => 1,
        }
    }
}

impl TryFrom<i8> for Direction {
    type Error = String;

    fn try_from(value: i8) -> Result<Self, Self::Error> {
        match value {
            -1 => Ok(Direction::Decrease),
            1 => Ok(Direction::Increase),
            other => Err(format!("direction must be -1 or 1, got {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_matches_variant() {
        assert_eq!(Direction::Decrease.sign(), -1.0);
        assert_eq!(Direction::Increase.sign(), 1.0);
        assert_eq!(Direction::default(), Direction::Increase);
    }

    #[test]
    fn only_unit_values_convert() {
        assert_eq!(Direction::try_from(-1), Ok(Direction::Decrease));
        assert_eq!(Direction::try_from(1), Ok(Direction::Increase));
        assert!(Direction::try_from(0).is_err());
        assert!(Direction::try_from(2).is_err());
    }

    #[test]
    fn serializes_as_signed_integer() {
        let json = serde_json::to_string(&Direction::Decrease).unwrap();
        assert_eq!(json, "-1");
        let back: Direction = serde_json::from_str("1").unwrap();
        assert_eq!(back, Direction::Increase);
        assert!(serde_json::from_str::<Direction>("0").is_err());
    }
}
