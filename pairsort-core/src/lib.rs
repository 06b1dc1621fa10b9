/// pairsort-core: rank a list by asking a human "which do you prefer".
///
/// Partial heapsort that suspends at every comparison it cannot answer from
/// earlier choices, treats ties as merges, and undoes by replaying history.
/// No IO, no rendering. The caller shows the question and feeds the answer back.
///
/// Items carry caller-provided `u8` IDs so a finished ranking fits in a short
/// share token.
///
/// # Quick start
///
/// ```rust
/// use std::sync::Arc;
/// use pairsort_core::{Choice, ItemRegistry, Outcome, SortSession};
///
/// let registry = Arc::new(ItemRegistry::from_entries(&["Tea", "Coffee", "Juice"]).unwrap());
/// let mut session = SortSession::new(registry, 2).unwrap();
///
/// let mut outcome = session.next(None).unwrap();
/// while let Outcome::Pending { left, right } = &outcome {
///     // Always prefer whatever sorts first alphabetically
///     let choice = if left.label < right.label { Choice::Left } else { Choice::Right };
///     outcome = session.next(Some(choice)).unwrap();
/// }
///
/// if let Outcome::Result(ranking) = outcome {
///     let labels: Vec<&str> = ranking.items.iter().map(|i| i.label.as_str()).collect();
///     assert_eq!(labels, vec!["Coffee", "Juice"]);
///     assert_eq!(ranking.ranks, vec![1, 2]);
/// }
/// ```

pub mod codec;
pub mod constants;
pub mod engine;
pub mod equivalence;
pub mod error;
pub mod estimate;
pub mod mode;
pub mod session;
pub mod types;

// Re-export primary public API at crate root.
pub use codec::{deserialize, serialize, serialize_ranking};
pub use engine::{EngineSnapshot, PartialSortEngine, Step};
pub use equivalence::{CacheEntry, ComparisonCache, Equivalence};
pub use error::SortError;
pub use estimate::estimate_comparisons;
pub use mode::SortMode;
pub use session::SortSession;
pub use types::{label_from_asset, Choice, Item, ItemRegistry, Outcome, Ranking, SessionState};
