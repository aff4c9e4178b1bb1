use std::{error::Error, fmt};

use maze_survival_core::TileCoord;

/// Delimiter separating the two axes of a goal argument.
const AXIS_DELIMITER: char = ',';

/// Errors that can occur while parsing a `--goal` argument.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum GoalParseError {
    /// The provided string was empty or contained only whitespace.
    Empty,
    /// The argument did not contain both axes.
    MissingAxis(String),
    /// An axis was not a non-negative integer.
    InvalidAxis(String),
}

impl fmt::Display for GoalParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "goal was empty"),
            Self::MissingAxis(value) => write!(f, "goal '{value}' must have the form x,y"),
            Self::InvalidAxis(axis) => {
                write!(f, "goal axis '{axis}' is not a non-negative integer")
            }
        }
    }
}

impl Error for GoalParseError {}

/// Parses a tile coordinate written as `x,y`.
pub(crate) fn parse_goal(value: &str) -> Result<TileCoord, GoalParseError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(GoalParseError::Empty);
    }

    let (x, y) = trimmed
        .split_once(AXIS_DELIMITER)
        .ok_or_else(|| GoalParseError::MissingAxis(trimmed.to_owned()))?;

    Ok(TileCoord::new(parse_axis(x)?, parse_axis(y)?))
}

fn parse_axis(axis: &str) -> Result<u32, GoalParseError> {
    axis.trim()
        .parse::<u32>()
        .map_err(|_| GoalParseError::InvalidAxis(axis.trim().to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_both_axes() {
        assert_eq!(parse_goal("12, 40"), Ok(TileCoord::new(12, 40)));
    }

    #[test]
    fn rejects_malformed_goals() {
        assert_eq!(parse_goal("  "), Err(GoalParseError::Empty));
        assert_eq!(
            parse_goal("12"),
            Err(GoalParseError::MissingAxis("12".to_owned()))
        );
        assert_eq!(
            parse_goal("12,-3"),
            Err(GoalParseError::InvalidAxis("-3".to_owned()))
        );
    }
}
