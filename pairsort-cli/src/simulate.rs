/// Simulate command: measures how many questions sessions really take.
///
/// Each trial draws hidden scores, answers every question from them (equal
/// scores tie), checks the produced top K against the true order, and compares
/// the question count with the advertised estimate.
use std::sync::Arc;

use pairsort_core::{Choice, ItemRegistry, Outcome, Ranking, SortMode, SortSession};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::bail;

/// Result of a single simulated session.
#[derive(Debug, Clone, PartialEq)]
pub struct TrialResult {
    pub comparisons: usize,
    /// Number of distinct rank numbers in the result.
    pub rank_groups: usize,
    /// Ranked scores matched the true top K.
    pub correct: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationSummary {
    pub trials: usize,
    pub estimate: usize,
    pub mean_comparisons: f64,
    pub min_comparisons: usize,
    pub max_comparisons: usize,
    pub incorrect: usize,
}

/// Hidden scores for `count` items: a shuffled 0..count, then each item after
/// the first copies an earlier item's score with probability `tie_rate`.
fn draw_scores(rng: &mut StdRng, count: usize, tie_rate: f64) -> Vec<usize> {
    let mut scores: Vec<usize> = (0..count).collect();
    scores.shuffle(rng);
    for i in 1..count {
        if rng.random_bool(tie_rate) {
            let j = rng.random_range(0..i);
            scores[i] = scores[j];
        }
    }
    scores
}

fn answer(scores: &[usize], left: usize, right: usize) -> Choice {
    match scores[left].cmp(&scores[right]) {
        std::cmp::Ordering::Greater => Choice::Left,
        std::cmp::Ordering::Less => Choice::Right,
        std::cmp::Ordering::Equal => Choice::Tie,
    }
}

/// Play one session against `scores` (indexed by item ID).
pub fn run_trial(registry: Arc<ItemRegistry>, k: usize, scores: &[usize]) -> TrialResult {
    let mut session = SortSession::new(registry, k)
        .unwrap_or_else(|e| bail(format!("Cannot start simulated session: {e}")));

    let mut outcome = session.next(None).unwrap_or_else(|e| bail(e));
    let ranking: Ranking = loop {
        match outcome {
            Outcome::Pending { left, right } => {
                let choice = answer(scores, left.id as usize, right.id as usize);
                outcome = session.next(Some(choice)).unwrap_or_else(|e| bail(e));
            }
            Outcome::Result(ranking) => break ranking,
        }
    };

    let mut expected: Vec<usize> = scores.to_vec();
    expected.sort_unstable_by(|a, b| b.cmp(a));
    expected.truncate(k);
    let got: Vec<usize> = ranking.items.iter().map(|i| scores[i.id as usize]).collect();

    let mut distinct_ranks = ranking.ranks.clone();
    distinct_ranks.dedup();

    TrialResult {
        comparisons: session.comparisons(),
        rank_groups: distinct_ranks.len(),
        correct: got == expected,
    }
}

/// Run `trials` simulated sessions over `count` items.
pub fn run_simulation(
    count: usize,
    mode: SortMode,
    trials: usize,
    tie_rate: f64,
    seed: u64,
) -> SimulationSummary {
    let labels: Vec<String> = (0..count).map(|i| format!("item {i}")).collect();
    let registry = Arc::new(
        ItemRegistry::from_entries(&labels).unwrap_or_else(|e| bail(e)),
    );
    let k = mode.resolve_k(count);
    let mut rng = StdRng::seed_from_u64(seed);

    let results: Vec<TrialResult> = (0..trials)
        .map(|_| {
            let scores = draw_scores(&mut rng, count, tie_rate);
            run_trial(registry.clone(), k, &scores)
        })
        .collect();

    let total: usize = results.iter().map(|r| r.comparisons).sum();
    SimulationSummary {
        trials,
        estimate: pairsort_core::estimate_comparisons(count, k),
        mean_comparisons: total as f64 / trials.max(1) as f64,
        min_comparisons: results.iter().map(|r| r.comparisons).min().unwrap_or(0),
        max_comparisons: results.iter().map(|r| r.comparisons).max().unwrap_or(0),
        incorrect: results.iter().filter(|r| !r.correct).count(),
    }
}

pub fn print_summary(summary: &SimulationSummary, count: usize, mode: SortMode, seed: u64) {
    println!("Simulated {} sessions: {} items, mode {} (seed {})", summary.trials, count, mode, seed);
    println!("  Estimate:     ~{}", summary.estimate);
    println!("  Mean:         {:.1}", summary.mean_comparisons);
    println!("  Min / Max:    {} / {}", summary.min_comparisons, summary.max_comparisons);
    println!("  Wrong top-K:  {}", summary.incorrect);
}
