/// Estimated number of questions to rank the top `k` of `n` items.
///
/// Heap construction costs about `n` comparisons and each of the `k`
/// extractions about `log2(n)`. The number is only displayed before and
/// during a session; it never changes what the engine asks.
pub fn estimate_comparisons(n: usize, k: usize) -> usize {
    let build_heap = n as f64;
    let extract = k as f64 * (n.max(2) as f64).log2();
    let total = build_heap + extract;
    if !total.is_finite() || total <= 0.0 {
        return n;
    }
    total.round() as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estimate_known_values() {
        // 8 items, top 2: 8 + 2 * 3 = 14
        assert_eq!(estimate_comparisons(8, 2), 14);
        // 1 item still uses log2(2) = 1
        assert_eq!(estimate_comparisons(1, 1), 2);
        assert_eq!(estimate_comparisons(100, 10), 166);
    }

    #[test]
    fn test_estimate_degenerate_input_falls_back_to_n() {
        assert_eq!(estimate_comparisons(0, 0), 0);
    }

    #[test]
    fn test_estimate_monotone_in_k() {
        for n in [1usize, 2, 7, 64, 256] {
            let mut prev = 0;
            for k in 0..=n {
                let est = estimate_comparisons(n, k);
                assert!(est >= prev, "estimate({n}, {k}) = {est} < {prev}");
                prev = est;
            }
        }
    }
}
