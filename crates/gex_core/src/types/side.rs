//! Option side selector.

use std::fmt;
use std::str::FromStr;

/// Call or put side of a strike.
///
/// Used wherever one side of a strike row has to be picked, in place of
/// dispatching on `call_`/`put_` column name prefixes.
///
/// # Examples
/// ```
/// use gex_core::types::OptionSide;
///
/// assert_eq!(OptionSide::Call.sign(), 1.0);
/// assert_eq!(OptionSide::Put.sign(), -1.0);
/// assert_eq!("put".parse::<OptionSide>().unwrap(), OptionSide::Put);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum OptionSide {
    /// Call option
    Call,
    /// Put option
    Put,
}

impl OptionSide {
    /// Both sides, calls first.
    pub const ALL: [OptionSide; 2] = [OptionSide::Call, OptionSide::Put];

    /// Exposure sign under the dealer-short convention: +1 for calls, -1 for puts.
    #[inline]
    pub fn sign(self) -> f64 {
        match self {
            OptionSide::Call => 1.0,
            OptionSide::Put => -1.0,
        }
    }

    /// Lowercase name (`"call"` / `"put"`).
    pub fn as_str(self) -> &'static str {
        match self {
            OptionSide::Call => "call",
            OptionSide::Put => "put",
        }
    }

    /// Returns true for calls.
    #[inline]
    pub fn is_call(self) -> bool {
        matches!(self, OptionSide::Call)
    }
}

impl fmt::Display for OptionSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OptionSide {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "call" | "c" | "ce" => Ok(OptionSide::Call),
            "put" | "p" | "pe" => Ok(OptionSide::Put),
            other => Err(format!("Unknown option side: {}", other)),
        }
    }
}
