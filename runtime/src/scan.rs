//! Exclusive scan primitive.
//!
//! A blocked three-phase parallel scan: per-chunk totals, a sequential
//! scan over the totals, then per-chunk local scans offset by the chunk
//! prefix. Phase N+1 never starts before phase N has finished for the
//! whole input; within a phase, chunks are independent.
//!
//! Running sums use the input's own representation; overflow is the
//! caller's responsibility.

use rayon::prelude::*;

/// Scan tuning, overridable from the environment.
///
/// # Environment Variables
///
/// * `SLUICE_SEQ_SCAN=1` - force the sequential path
/// * `SLUICE_SCAN_CHUNK=N` - chunk size for the blocked parallel scan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanConfig {
    pub sequential: bool,
    pub chunk: usize,
}

impl ScanConfig {
    pub const DEFAULT_CHUNK: usize = 4096;

    pub fn from_env() -> Self {
        let sequential = std::env::var("SLUICE_SEQ_SCAN").is_ok();
        let chunk = std::env::var("SLUICE_SCAN_CHUNK")
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .filter(|&c| c > 0)
            .unwrap_or(Self::DEFAULT_CHUNK);
        Self { sequential, chunk }
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self { sequential: false, chunk: Self::DEFAULT_CHUNK }
    }
}

/// Exclusive scan with an associative combine: output position `i` holds
/// the combination of all inputs strictly before `i`. Returns the prefix
/// vector and the grand total.
pub fn exclusive_scan_with<T, F>(items: &[T], identity: T, combine: F) -> (Vec<T>, T)
where
    T: Clone + Send + Sync,
    F: Fn(&T, &T) -> T + Send + Sync,
{
    exclusive_scan_with_config(items, identity, combine, &ScanConfig::from_env())
}

/// [`exclusive_scan_with`] with explicit tuning.
pub fn exclusive_scan_with_config<T, F>(items: &[T], identity: T, combine: F, config: &ScanConfig) -> (Vec<T>, T)
where
    T: Clone + Send + Sync,
    F: Fn(&T, &T) -> T + Send + Sync,
{
    if config.sequential || items.len() <= config.chunk {
        return sequential_scan(items, identity, &combine);
    }

    // Phase 1: reduce each chunk to its total.
    let totals: Vec<T> = items
        .par_chunks(config.chunk)
        .map(|chunk| chunk.iter().fold(identity.clone(), |acc, item| combine(&acc, item)))
        .collect();

    // Phase 2: exclusive scan over the chunk totals.
    let (offsets, total) = sequential_scan(&totals, identity.clone(), &combine);

    // Phase 3: local exclusive scans, offset by the chunk prefix.
    let prefix: Vec<T> = items
        .par_chunks(config.chunk)
        .zip(offsets.par_iter())
        .flat_map_iter(|(chunk, offset)| {
            let mut acc = offset.clone();
            chunk
                .iter()
                .map(|item| {
                    let out = acc.clone();
                    acc = combine(&acc, item);
                    out
                })
                .collect::<Vec<_>>()
        })
        .collect();

    (prefix, total)
}

fn sequential_scan<T, F>(items: &[T], identity: T, combine: &F) -> (Vec<T>, T)
where
    T: Clone,
    F: Fn(&T, &T) -> T,
{
    let mut out = Vec::with_capacity(items.len());
    let mut acc = identity;
    for item in items {
        out.push(acc.clone());
        acc = combine(&acc, item);
    }
    (out, acc)
}

/// Exclusive sum over counts: the output index of each kept element in a
/// compaction, plus the total kept count.
pub fn add_scan(flags: &[usize]) -> (Vec<usize>, usize) {
    exclusive_scan_with(flags, 0, |a, b| a + b)
}
