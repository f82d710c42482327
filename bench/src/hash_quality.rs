//! Distribution quality of simple hash functions.
//!
//! Each hash function is fed the same stream of random keys, its outputs are reduced modulo the
//! number of buckets and counted. The resulting histograms are appended to a CSV file.
use std::{borrow::Borrow, io::Write};

use inttab_util::hash::{hash_ref, hash_value};
use rand::{rngs::SmallRng, Rng, SeedableRng};

/// Kind of keys to generate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum KeyKind {
    /// Non-negative 32-bit integers.
    Int,
    /// Floats in `0.0..50000.0`.
    Float,
    /// Byte strings of 5 to 250 non-zero bytes.
    String,
}

/// Parameters drawn once per run and shared by every hash function of that run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HashParams {
    /// Number of histogram buckets.
    pub buckets: usize,
    /// Fraction in `(0, 1)` scaling keys in the multiplicative method.
    pub multiplier: f64,
}

impl HashParams {
    /// Draws a multiplier from `rng`.
    pub fn draw(buckets: usize, rng: &mut SmallRng) -> Self {
        HashParams {
            buckets,
            multiplier: rng.gen_range(f64::EPSILON..1.0),
        }
    }
}

/// A named hash function over keys of type `K`.
pub struct HashFunction<K: ?Sized> {
    /// Column label in the CSV output.
    pub name: &'static str,
    /// Maps a key to a hash, reduced modulo the bucket count afterwards.
    pub hash: fn(&K, &HashParams) -> u64,
}

const FLOAT_KEY_MAX: f32 = 50000.0;
const STRING_LEN: std::ops::RangeInclusive<usize> = 5..=250;

/// The key itself, sign-extended.
fn int_mod(key: &i32, _: &HashParams) -> u64 {
    *key as u64
}

/// The bit pattern of the key, zero-extended.
fn int_bin(key: &i32, _: &HashParams) -> u64 {
    *key as u32 as u64
}

/// Multiplicative method: the fractional part of `key * multiplier` scaled to the bucket count.
fn int_mul(key: &i32, params: &HashParams) -> u64 {
    let scaled = *key as f64 * params.multiplier;
    ((scaled - scaled.floor()) * params.buckets as f64) as u64
}

fn int_zwo(key: &i32, _: &HashParams) -> u64 {
    hash_value(key)
}

/// Hash functions compared on integer keys.
pub const INT_FUNCTIONS: &[HashFunction<i32>] = &[
    HashFunction { name: "mod", hash: int_mod },
    HashFunction { name: "bin", hash: int_bin },
    HashFunction { name: "mul", hash: int_mul },
    HashFunction { name: "zwo", hash: int_zwo },
];

fn float_int(key: &f32, _: &HashParams) -> u64 {
    *key as i64 as u64
}

fn float_bin(key: &f32, _: &HashParams) -> u64 {
    key.to_bits() as u64
}

fn float_zwo(key: &f32, _: &HashParams) -> u64 {
    hash_value(key.to_bits())
}

/// Hash functions compared on float keys.
pub const FLOAT_FUNCTIONS: &[HashFunction<f32>] = &[
    HashFunction { name: "int", hash: float_int },
    HashFunction { name: "bin", hash: float_bin },
    HashFunction { name: "zwo", hash: float_zwo },
];

fn str_len(key: &[u8], _: &HashParams) -> u64 {
    key.len() as u64
}

fn str_charsum(key: &[u8], _: &HashParams) -> u64 {
    key.iter().map(|&byte| byte as u64).sum()
}

fn str_poly(key: &[u8], _: &HashParams) -> u64 {
    key.iter()
        .fold(0u64, |sum, &byte| sum.wrapping_mul(7).wrapping_add(byte as u64))
}

/// Two running sums modulo 2^32, the second accumulating the first, packed into one word.
fn str_adler(key: &[u8], _: &HashParams) -> u64 {
    let (low, high) = key.iter().fold((1u32, 0u32), |(low, high), &byte| {
        let low = low.wrapping_add(byte as u32);
        (low, high.wrapping_add(low))
    });
    ((high as u64) << 32) | low as u64
}

fn str_zwo(key: &[u8], _: &HashParams) -> u64 {
    hash_ref(key)
}

/// Hash functions compared on byte string keys.
pub const STRING_FUNCTIONS: &[HashFunction<[u8]>] = &[
    HashFunction { name: "len", hash: str_len },
    HashFunction { name: "charsum", hash: str_charsum },
    HashFunction { name: "poly", hash: str_poly },
    HashFunction { name: "adler", hash: str_adler },
    HashFunction { name: "zwo", hash: str_zwo },
];

fn random_int(rng: &mut SmallRng) -> i32 {
    rng.gen_range(0..=i32::MAX)
}

fn random_float(rng: &mut SmallRng) -> f32 {
    rng.gen::<f32>() * FLOAT_KEY_MAX
}

fn random_string(rng: &mut SmallRng) -> Vec<u8> {
    let len = rng.gen_range(STRING_LEN);
    (0..len).map(|_| rng.gen_range(1..=u8::MAX)).collect()
}

/// Counts how many of `iterations` generated keys land in each of `params.buckets` buckets.
pub fn histogram<K, O, G>(
    hash: fn(&K, &HashParams) -> u64,
    params: &HashParams,
    iterations: usize,
    rng: &mut SmallRng,
    mut gen_key: G,
) -> Vec<u64>
where
    K: ?Sized,
    O: Borrow<K>,
    G: FnMut(&mut SmallRng) -> O,
{
    let mut counts = vec![0; params.buckets];
    for _ in 0..iterations {
        let key = gen_key(rng);
        counts[(hash(key.borrow(), params) % params.buckets as u64) as usize] += 1;
    }
    counts
}

/// Summary of how evenly a histogram is filled.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Uniformity {
    /// Smallest bucket count.
    pub min: u64,
    /// Largest bucket count.
    pub max: u64,
    /// Pearson's chi-squared statistic against the uniform distribution.
    pub chi_squared: f64,
}

impl Uniformity {
    /// Summarizes `counts`.
    pub fn of(counts: &[u64]) -> Self {
        let total: u64 = counts.iter().sum();
        let expected = total as f64 / counts.len() as f64;
        let chi_squared = if expected > 0.0 {
            counts
                .iter()
                .map(|&count| (count as f64 - expected).powi(2) / expected)
                .sum()
        } else {
            0.0
        };
        Uniformity {
            min: counts.iter().copied().min().unwrap_or(0),
            max: counts.iter().copied().max().unwrap_or(0),
            chi_squared,
        }
    }
}

/// Parameters of one `hash-quality` run.
#[derive(Clone, Debug)]
pub struct HashQualityOptions {
    /// Kind of keys to generate.
    pub keys: KeyKind,
    /// Number of histogram buckets.
    pub buckets: usize,
    /// Number of keys hashed per function.
    pub iterations: usize,
    /// Seeds the key stream and the drawn hash parameters.
    pub seed: u64,
}

fn write_row(out: &mut impl Write, name: &str, counts: &[u64]) -> std::io::Result<()> {
    write!(out, "{name}")?;
    for count in counts {
        write!(out, ",{count}")?;
    }
    writeln!(out)
}

fn compare<K: ?Sized, O: Borrow<K>>(
    functions: &[HashFunction<K>],
    options: &HashQualityOptions,
    out: &mut impl Write,
    mut gen_key: impl FnMut(&mut SmallRng) -> O,
) -> color_eyre::Result<()> {
    write!(out, "hash")?;
    for bucket in 0..options.buckets {
        write!(out, ",{bucket}")?;
    }
    writeln!(out)?;

    for function in functions {
        // every function sees the same parameters and keys
        let mut rng = SmallRng::seed_from_u64(options.seed);
        let params = HashParams::draw(options.buckets, &mut rng);
        let counts = histogram(
            function.hash,
            &params,
            options.iterations,
            &mut rng,
            &mut gen_key,
        );
        write_row(out, function.name, &counts)?;
        let Uniformity {
            min,
            max,
            chi_squared,
        } = Uniformity::of(&counts);
        log::info!(
            "{:>8}: buckets filled {min}..={max}, chi^2 {chi_squared:.1}",
            function.name
        );
    }
    Ok(())
}

/// Runs every hash function for the configured key kind and appends the histograms to `out`.
pub fn run(options: &HashQualityOptions, out: &mut impl Write) -> color_eyre::Result<()> {
    color_eyre::eyre::ensure!(options.buckets > 0, "at least one bucket is required");
    log::info!(
        "hashing {} {:?} keys into {} buckets",
        options.iterations,
        options.keys,
        options.buckets
    );
    match options.keys {
        KeyKind::Int => compare(INT_FUNCTIONS, options, out, random_int),
        KeyKind::Float => compare(FLOAT_FUNCTIONS, options, out, random_float),
        KeyKind::String => compare(STRING_FUNCTIONS, options, out, random_string),
    }
}
