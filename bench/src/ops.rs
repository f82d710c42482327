//! Timing of random insert/find/remove mixes.
use std::io::Write;

use inttab::{AllocError, ChainedTable, IntTable, Key, OpenTable, TableConfig};
use quanta::Instant;
use rand::{rngs::SmallRng, Rng, SeedableRng};

/// Table implementation to benchmark.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum TableKind {
    /// Separate chaining.
    Chained,
    /// Open addressing with double hashing.
    Open,
}

impl TableKind {
    /// Number of timed batches per operation count when not given explicitly.
    pub fn default_runs(self) -> usize {
        match self {
            TableKind::Chained => 5,
            TableKind::Open => 2,
        }
    }
}

/// Parameters of one `ops` run.
#[derive(Clone, Debug)]
pub struct OpsOptions {
    /// Smallest number of operations per batch.
    pub min_ops: usize,
    /// Largest number of operations per batch.
    pub max_ops: usize,
    /// Increment between operation counts.
    pub step: usize,
    /// Batches timed per operation count, the mean is reported.
    pub runs: usize,
    /// Overrides the table's default initial size.
    pub initial_size: Option<usize>,
    /// Seeds the key and operation stream.
    pub seed: u64,
}

/// Outcome counts of one batch.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
pub struct BatchStats {
    /// Insertions, both new keys and overwrites.
    pub inserts: usize,
    /// Lookups that found their key.
    pub hits: usize,
    /// Lookups that didn't.
    pub misses: usize,
    /// Removals of a present key.
    pub removed: usize,
    /// Removals of an absent key.
    pub absent_removals: usize,
}

/// Performs `ops` operations chosen uniformly among insert, find and remove, each on a uniformly
/// random non-negative key. Inserted values equal their key.
pub fn run_batch<T: IntTable>(
    table: &mut T,
    ops: usize,
    rng: &mut SmallRng,
) -> Result<BatchStats, AllocError> {
    let mut stats = BatchStats::default();
    for _ in 0..ops {
        let key: Key = rng.gen_range(0..=Key::MAX);
        match rng.gen_range(0..3) {
            0 => {
                table.insert(key, key)?;
                stats.inserts += 1;
            }
            1 => match table.find(key) {
                Some(_) => stats.hits += 1,
                None => stats.misses += 1,
            },
            _ => match table.remove(key) {
                Some(_) => stats.removed += 1,
                None => stats.absent_removals += 1,
            },
        }
    }
    Ok(stats)
}

/// Times batches of every operation count in the configured range and writes the mean duration in
/// milliseconds, one line per operation count.
pub fn time_operation_mix<T: IntTable>(
    options: &OpsOptions,
    out: &mut impl Write,
) -> color_eyre::Result<()> {
    let config = options
        .initial_size
        .map_or(T::DEFAULT_CONFIG, TableConfig::with_initial_size);
    let mut rng = SmallRng::seed_from_u64(options.seed);

    log::info!(
        "timing {} table, initial size {}, {}..={} ops by {}, {} runs",
        T::NAME,
        config.initial_size,
        options.min_ops,
        options.max_ops,
        options.step,
        options.runs
    );

    for ops in (options.min_ops..=options.max_ops).step_by(options.step.max(1)) {
        let mut total_ms = 0.0;
        for _ in 0..options.runs {
            let mut table = T::with_config(config)?;
            let start_time = Instant::now();
            let stats = run_batch(&mut table, ops, &mut rng)?;
            total_ms += start_time.elapsed().as_secs_f64() * 1000.0;
            log::debug!(
                "{ops} ops: {} inserts, {}/{} found, {}/{} removed, final len {} size {}",
                stats.inserts,
                stats.hits,
                stats.hits + stats.misses,
                stats.removed,
                stats.removed + stats.absent_removals,
                table.len(),
                table.size()
            );
        }
        let mean_ms = total_ms / options.runs.max(1) as f64;
        writeln!(out, "{mean_ms:.6}")?;
        log::info!("{ops:>8} ops: {mean_ms:10.3} ms");
    }
    Ok(())
}

/// Dispatches [`time_operation_mix`] on the selected table implementation.
pub fn run(kind: TableKind, options: &OpsOptions, out: &mut impl Write) -> color_eyre::Result<()> {
    match kind {
        TableKind::Chained => time_operation_mix::<ChainedTable>(options, out),
        TableKind::Open => time_operation_mix::<OpenTable>(options, out),
    }
}
