/// Sort modes: a preset top-K or a full ranking.
use std::fmt;
use std::str::FromStr;

use crate::constants::TOP_K_PRESETS;
use crate::error::SortError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SortMode {
    /// Rank only the best `k` items.
    Top(usize),
    /// Rank every item.
    Full,
}

impl SortMode {
    /// The modes offered to users, presets first.
    pub fn presets() -> Vec<SortMode> {
        TOP_K_PRESETS
            .iter()
            .map(|&k| SortMode::Top(k))
            .chain(std::iter::once(SortMode::Full))
            .collect()
    }

    /// Target count for a registry of `n` items. Presets larger than the
    /// registry rank everything.
    pub fn resolve_k(self, n: usize) -> usize {
        match self {
            SortMode::Top(k) => k.min(n),
            SortMode::Full => n,
        }
    }
}

impl Default for SortMode {
    fn default() -> Self {
        SortMode::Top(TOP_K_PRESETS[0])
    }
}

impl FromStr for SortMode {
    type Err = SortError;

    /// Accepts `full`, `top-10`, `TOP_10`, `top10` and plain numbers.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        if normalized == "full" {
            return Ok(SortMode::Full);
        }
        let digits = normalized
            .strip_prefix("top-")
            .or_else(|| normalized.strip_prefix("top"))
            .unwrap_or(&normalized);
        match digits.parse::<usize>() {
            Ok(k) if k > 0 => Ok(SortMode::Top(k)),
            _ => Err(SortError::UnknownMode(s.to_string())),
        }
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortMode::Top(k) => write!(f, "top-{k}"),
            SortMode::Full => f.write_str("full"),
        }
    }
}
