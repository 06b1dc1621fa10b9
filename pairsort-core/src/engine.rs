/// Interactive partial heapsort.
///
/// Heapify once, then extract the maximum only K times. Every comparison the
/// tie groups and the memo cannot answer suspends the engine: `advance` returns
/// the pending pair and keeps its frame stack, and the next `advance` call
/// re-enters the top frame with the human's choice.
///
/// The engine works on registry indices. The heap is always a permutation of
/// `0..n`.
use std::sync::Arc;

use crate::equivalence::{CacheEntry, Equivalence};
use crate::error::SortError;
use crate::types::{Choice, Item, ItemRegistry, Ranking};

/// Result of one `advance` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Waiting on a choice between these two registry indices (canonical roots).
    Pending { left: usize, right: usize },
    /// Extraction finished; `result()` is available.
    Done,
}

/// Where a sift-down frame is within one level of the heap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SiftPhase {
    /// Check whether the node has children at all.
    Descend,
    /// Compare the node against its left child.
    LeftChild,
    /// Compare the current winner against the right child.
    RightChild,
    /// Swap toward the winner or stop.
    Settle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Frame {
    /// Heapify loop. Nodes `0..next` still need a sift-down, highest first.
    Heapify { next: usize },
    /// Extraction loop. Slots `limit..next` still need an extraction, highest first.
    Extract { next: usize },
    /// One sift-down in progress.
    Sift {
        node: usize,
        end: usize,
        winner: usize,
        phase: SiftPhase,
    },
}

/// Copy of everything that determines the engine's future behavior.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EngineSnapshot {
    pub heap: Vec<usize>,
    pub parent: Vec<usize>,
    pub cache: Vec<CacheEntry>,
}

pub struct PartialSortEngine {
    registry: Arc<ItemRegistry>,
    k: usize,
    heap: Vec<usize>,
    equivalence: Equivalence,
    frames: Vec<Frame>,
    /// Canonical roots of the outstanding question, if any.
    pending: Option<(usize, usize)>,
    started: bool,
}

impl PartialSortEngine {
    /// Create an engine that ranks the top `k` of `registry`.
    pub fn new(registry: Arc<ItemRegistry>, k: usize) -> Result<Self, SortError> {
        let n = registry.len();
        if n == 0 {
            return Err(SortError::EmptyRegistry);
        }
        if k < 1 || k > n {
            return Err(SortError::InvalidTarget { k, n });
        }

        Ok(PartialSortEngine {
            heap: (0..n).collect(),
            equivalence: Equivalence::new(n),
            frames: vec![Frame::Heapify { next: n / 2 }],
            registry,
            k,
            pending: None,
            started: false,
        })
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn is_done(&self) -> bool {
        self.started && self.frames.is_empty()
    }

    /// First index of the extracted region: extraction stops once slot
    /// `limit` has been filled.
    fn limit(&self) -> usize {
        let n = self.heap.len();
        if self.k == n { 0 } else { n - self.k }
    }

    /// Run until the next unresolved comparison or the end.
    ///
    /// The first call must pass `None`. While a comparison is pending, `None`
    /// returns the same pending pair again without changing any state;
    /// `Some(choice)` answers it.
    pub fn advance(&mut self, choice: Option<Choice>) -> Result<Step, SortError> {
        if let Some((left, right)) = self.pending {
            if choice.is_none() {
                return Ok(Step::Pending { left, right });
            }
        } else if choice.is_some() {
            return Err(SortError::UnexpectedChoice);
        }

        self.started = true;
        let mut answer = choice;
        let n = self.heap.len();
        let limit = self.limit();

        while let Some(&frame) = self.frames.last() {
            match frame {
                Frame::Heapify { next } => {
                    if next == 0 {
                        self.replace_top(Frame::Extract { next: n });
                    } else {
                        let node = next - 1;
                        self.replace_top(Frame::Heapify { next: node });
                        self.frames.push(Frame::sift(node, n));
                    }
                }
                Frame::Extract { next } => {
                    if next > limit {
                        let end = next - 1;
                        self.replace_top(Frame::Extract { next: end });
                        self.heap.swap(0, end);
                        self.frames.push(Frame::sift(0, end));
                    } else {
                        self.frames.pop();
                    }
                }
                Frame::Sift { node, end, winner, phase } => {
                    let left_child = 2 * node + 1;
                    let next = match phase {
                        SiftPhase::Descend => {
                            if left_child >= end {
                                None
                            } else {
                                Some((node, node, SiftPhase::LeftChild))
                            }
                        }
                        SiftPhase::LeftChild => {
                            let (a, b) = (self.heap[winner], self.heap[left_child]);
                            let Some(outcome) = self.compare(a, b, &mut answer) else {
                                return Ok(self.suspended());
                            };
                            let winner = if outcome < 0 { left_child } else { winner };
                            Some((node, winner, SiftPhase::RightChild))
                        }
                        SiftPhase::RightChild => {
                            let right_child = left_child + 1;
                            let mut winner = winner;
                            if right_child < end {
                                let (a, b) = (self.heap[winner], self.heap[right_child]);
                                let Some(outcome) = self.compare(a, b, &mut answer) else {
                                    return Ok(self.suspended());
                                };
                                if outcome < 0 {
                                    winner = right_child;
                                }
                            }
                            Some((node, winner, SiftPhase::Settle))
                        }
                        SiftPhase::Settle => {
                            if winner == node {
                                None
                            } else {
                                self.heap.swap(node, winner);
                                Some((winner, winner, SiftPhase::Descend))
                            }
                        }
                    };

                    match next {
                        Some((node, winner, phase)) => {
                            self.replace_top(Frame::Sift { node, end, winner, phase });
                        }
                        None => {
                            self.frames.pop();
                        }
                    }
                }
            }
        }

        debug_assert!(answer.is_none(), "choice left unconsumed");
        Ok(Step::Done)
    }

    fn replace_top(&mut self, frame: Frame) {
        if let Some(top) = self.frames.last_mut() {
            *top = frame;
        }
    }

    fn suspended(&self) -> Step {
        match self.pending {
            Some((left, right)) => Step::Pending { left, right },
            None => Step::Done,
        }
    }

    /// Compare heap entries `a` and `b` (registry indices).
    ///
    /// Returns the signed outcome when it is known or when `answer` supplies
    /// it; otherwise records the pending question and returns `None`.
    fn compare(&mut self, a: usize, b: usize, answer: &mut Option<Choice>) -> Option<i8> {
        if let Some(outcome) = self.equivalence.known_outcome(a, b) {
            return Some(outcome);
        }

        let rep_a = self.equivalence.find(a);
        let rep_b = self.equivalence.find(b);

        match answer.take() {
            Some(choice) => {
                let outcome = choice.sign();
                self.equivalence.record(rep_a, rep_b, outcome);
                self.pending = None;
                Some(outcome)
            }
            None => {
                tracing::trace!(left = rep_a, right = rep_b, "awaiting choice");
                self.pending = Some((rep_a, rep_b));
                None
            }
        }
    }

    /// Outcome of `a` vs `b` (registry indices) if no human input is needed.
    pub fn known_outcome(&mut self, a: usize, b: usize) -> Option<i8> {
        self.equivalence.known_outcome(a, b)
    }

    /// Top `k` items, best first. Only meaningful once `is_done()`.
    pub fn result(&self) -> Vec<Item> {
        let n = self.heap.len();
        self.heap[n - self.k..]
            .iter()
            .rev()
            .map(|&idx| self.registry.get(idx).clone())
            .collect()
    }

    /// Assign rank numbers to an ordered item list.
    ///
    /// Items sharing a tie group are gathered at the position of the group's
    /// first member. Each group gets the next rank number, so a two-way tie
    /// for first is followed by rank 2. Items unknown to the registry form
    /// groups of their own.
    pub fn rank_groups(&self, ordered: &[Item]) -> Ranking {
        let mut groups: Vec<(Option<usize>, Vec<Item>)> = Vec::new();

        for item in ordered {
            let root = self
                .registry
                .index_of(item.id)
                .map(|idx| self.equivalence.root_of(idx));
            match groups.iter_mut().find(|(r, _)| r.is_some() && *r == root) {
                Some((_, members)) => members.push(item.clone()),
                None => groups.push((root, vec![item.clone()])),
            }
        }

        let mut ranking = Ranking::default();
        for (rank, (_, members)) in (1u32..).zip(groups) {
            for item in members {
                ranking.items.push(item);
                ranking.ranks.push(rank);
            }
        }
        ranking
    }

    /// Final ranking with tie groups applied.
    pub fn ranking(&self) -> Ranking {
        self.rank_groups(&self.result())
    }

    pub fn heap(&self) -> &[usize] {
        &self.heap
    }

    pub fn snapshot(&self) -> EngineSnapshot {
        EngineSnapshot {
            heap: self.heap.clone(),
            parent: self.equivalence.parent().to_vec(),
            cache: self.equivalence.cache().entries().to_vec(),
        }
    }
}

impl Frame {
    fn sift(node: usize, end: usize) -> Self {
        Frame::Sift {
            node,
            end,
            winner: node,
            phase: SiftPhase::Descend,
        }
    }
}
