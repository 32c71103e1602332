//! Batch boundaries for progress reporting over a candidate list.

/// Split `total` candidates into up to `num_batches` contiguous ranges `[start, end)`.
/// Earlier batches take the remainder, so sizes differ by at most one.
///
/// # Example
/// ```
/// # use gambit::parallel::batch_ranges;
/// assert_eq!(batch_ranges(10, 3), vec![(0, 4), (4, 7), (7, 10)]);
/// ```
pub fn batch_ranges(total: usize, num_batches: usize) -> Vec<(usize, usize)> {
    if total == 0 || num_batches == 0 {
        return Vec::new();
    }
    let batches = num_batches.min(total);
    let (base, remainder) = (total / batches, total % batches);
    let mut start = 0;
    (0..batches)
        .map(|batch| {
            let end = start + base + usize::from(batch < remainder);
            let range = (start, end);
            start = end;
            range
        })
        .collect()
}
