/// Shared data types: items, the registry, choices and session outputs.
///
/// Items carry caller-visible `u8` IDs. The engine works on registry indices
/// (0..N) and only maps back to items at its edges.
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::constants::{ASSET_EXTENSIONS, MAX_ITEMS};
use crate::error::SortError;

/// A candidate item.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Item {
    /// Stable ID. Shared tokens store it as a single byte.
    pub id: u8,
    pub label: String,
    /// Opaque reference to an image or other asset. Empty when there is none.
    pub asset_ref: String,
}

impl Item {
    pub fn new(id: u8, label: impl Into<String>, asset_ref: impl Into<String>) -> Self {
        Item {
            id,
            label: label.into(),
            asset_ref: asset_ref.into(),
        }
    }

    /// Build an item from a raw list entry.
    ///
    /// Entries that name an image file become assets whose label is derived
    /// from the file name; anything else is taken as the label verbatim.
    pub fn from_entry(id: u8, entry: &str) -> Self {
        let entry = entry.trim();
        if is_asset_name(entry) {
            Item::new(id, label_from_asset(entry), entry)
        } else {
            Item::new(id, entry, "")
        }
    }
}

fn is_asset_name(entry: &str) -> bool {
    match entry.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => ASSET_EXTENSIONS
            .iter()
            .any(|known| ext.eq_ignore_ascii_case(known)),
        _ => false,
    }
}

/// Derive a display label from an asset file name.
///
/// `Special_Week_(Race).png` becomes `Special Week`: the extension and one
/// trailing `_(...)` qualifier are dropped, underscores become spaces.
pub fn label_from_asset(file_name: &str) -> String {
    let base = file_name.rsplit(['/', '\\']).next().unwrap_or(file_name);
    let stem = base.rsplit_once('.').map_or(base, |(stem, _)| stem);
    let stem = match stem.rfind("_(") {
        Some(pos) if stem.ends_with(')') => &stem[..pos],
        _ => stem,
    };
    stem.replace('_', " ")
}

/// Immutable, ordered collection of candidate items with unique IDs.
#[derive(Debug, Clone)]
pub struct ItemRegistry {
    items: Vec<Item>,
    id_to_idx: HashMap<u8, usize>,
}

impl ItemRegistry {
    pub fn new(items: Vec<Item>) -> Result<Self, SortError> {
        if items.len() > MAX_ITEMS {
            return Err(SortError::TooManyItems { count: items.len() });
        }
        let mut id_to_idx = HashMap::with_capacity(items.len());
        for (idx, item) in items.iter().enumerate() {
            if id_to_idx.insert(item.id, idx).is_some() {
                return Err(SortError::DuplicateId(item.id));
            }
        }
        Ok(ItemRegistry { items, id_to_idx })
    }

    /// Build a registry from raw entries, assigning IDs 0, 1, 2, ... in order.
    pub fn from_entries<S: AsRef<str>>(entries: &[S]) -> Result<Self, SortError> {
        if entries.len() > MAX_ITEMS {
            return Err(SortError::TooManyItems { count: entries.len() });
        }
        let items = entries
            .iter()
            .enumerate()
            .map(|(idx, entry)| Item::from_entry(idx as u8, entry.as_ref()))
            .collect();
        ItemRegistry::new(items)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Item at registry index `idx`.
    pub fn get(&self, idx: usize) -> &Item {
        &self.items[idx]
    }

    pub fn by_id(&self, id: u8) -> Option<&Item> {
        self.id_to_idx.get(&id).map(|&idx| &self.items[idx])
    }

    pub fn index_of(&self, id: u8) -> Option<usize> {
        self.id_to_idx.get(&id).copied()
    }
}

/// A human answer to "which do you prefer".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Choice {
    Left,
    Right,
    Tie,
}

impl Choice {
    /// Signed outcome: Left = +1, Right = -1, Tie = 0.
    pub fn sign(self) -> i8 {
        match self {
            Choice::Left => 1,
            Choice::Right => -1,
            Choice::Tie => 0,
        }
    }

    /// Keyboard shortcut: `a` = Left, `s` = Tie, `d` = Right.
    pub fn from_key(key: char) -> Option<Self> {
        match key.to_ascii_lowercase() {
            'a' => Some(Choice::Left),
            's' => Some(Choice::Tie),
            'd' => Some(Choice::Right),
            _ => None,
        }
    }
}

impl FromStr for Choice {
    type Err = SortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Left" | "left" | "A" => Ok(Choice::Left),
            "Right" | "right" | "B" => Ok(Choice::Right),
            "Tie" | "tie" | "S" => Ok(Choice::Tie),
            other => Err(SortError::UnknownChoice(other.to_string())),
        }
    }
}

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Choice::Left => "Left",
            Choice::Right => "Right",
            Choice::Tie => "Tie",
        };
        f.write_str(name)
    }
}

/// A finished ranking: items in display order with their rank numbers.
///
/// `ranks[i]` belongs to `items[i]`. Tied items share a rank and the next
/// group's rank is one higher, regardless of the group's size.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Ranking {
    pub items: Vec<Item>,
    pub ranks: Vec<u32>,
}

impl Ranking {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterate `(rank, item)` pairs in display order.
    pub fn entries(&self) -> impl Iterator<Item = (u32, &Item)> {
        self.ranks.iter().copied().zip(self.items.iter())
    }
}

/// What the UI should show next.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Outcome {
    /// Waiting on a human choice between `left` and `right`.
    Pending { left: Item, right: Item },
    /// Terminal ranking.
    Result(Ranking),
}

impl Outcome {
    pub fn is_pending(&self) -> bool {
        matches!(self, Outcome::Pending { .. })
    }
}

/// Lifecycle of a sorting session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SessionState {
    Setup,
    Sorting,
    Finished,
}
