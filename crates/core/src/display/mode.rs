//! Presentation variants of a balance sheet.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// How much account detail a rendered balance sheet carries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayMode {
    /// Totals and balanced flag only.
    TotalOnly,
    /// Only rows whose account has children.
    ParentOnly,
    /// Every row.
    #[default]
    Detailed,
    /// Every row, zero balances included.
    WithZero,
}

impl DisplayMode {
    /// All modes.
    pub const ALL: [Self; 4] = [Self::TotalOnly, Self::ParentOnly, Self::Detailed, Self::WithZero];

    /// Query-string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TotalOnly => "total_only",
            Self::ParentOnly => "parent_only",
            Self::Detailed => "detailed",
            Self::WithZero => "with_zero",
        }
    }
}

impl fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DisplayMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| format!("unknown display mode: {s}"))
    }
}

/// Display mode plus the separate include-zero toggle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayOptions {
    /// Presentation variant.
    #[serde(default)]
    pub mode: DisplayMode,
    /// Keep zero-balance rows regardless of mode.
    #[serde(default)]
    pub include_zero_balances: bool,
}

impl DisplayOptions {
    /// Options for a mode with the include-zero toggle off.
    #[must_use]
    pub const fn new(mode: DisplayMode) -> Self {
        Self {
            mode,
            include_zero_balances: false,
        }
    }

    /// Whether rows with a negligible balance are dropped.
    ///
    /// `with_zero` overrides the toggle.
    #[must_use]
    pub fn suppresses_zero(&self) -> bool {
        self.mode != DisplayMode::WithZero && !self.include_zero_balances
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("total_only", DisplayMode::TotalOnly)]
    #[case("parent_only", DisplayMode::ParentOnly)]
    #[case("detailed", DisplayMode::Detailed)]
    #[case("with_zero", DisplayMode::WithZero)]
    fn test_parse_mode(#[case] input: &str, #[case] expected: DisplayMode) {
        assert_eq!(input.parse::<DisplayMode>().unwrap(), expected);
        assert_eq!(expected.to_string(), input);
    }

    #[test]
    fn test_parse_unknown_mode() {
        assert!("everything".parse::<DisplayMode>().is_err());
    }

    #[rstest]
    #[case(DisplayMode::Detailed, false, true)]
    #[case(DisplayMode::Detailed, true, false)]
    #[case(DisplayMode::WithZero, false, false)]
    #[case(DisplayMode::ParentOnly, false, true)]
    #[case(DisplayMode::TotalOnly, true, false)]
    fn test_zero_suppression(
        #[case] mode: DisplayMode,
        #[case] include_zero_balances: bool,
        #[case] suppressed: bool,
    ) {
        let options = DisplayOptions {
            mode,
            include_zero_balances,
        };
        assert_eq!(options.suppresses_zero(), suppressed);
    }
}
