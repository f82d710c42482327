//! Benchmark driver and hash function experiments for the inttab tables.
use std::{fs::OpenOptions, io::BufWriter, io::Write, path::PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::WrapErr;

mod hash_quality;
mod ops;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Times random insert/find/remove mixes of increasing length.
    Ops {
        #[clap(short = 't', long, value_enum, default_value = "chained")]
        table: ops::TableKind,
        #[clap(long, default_value = "10000")]
        min_ops: usize,
        #[clap(long, default_value = "1000000")]
        max_ops: usize,
        #[clap(long, default_value = "10000")]
        step: usize,
        /// Batches timed per operation count, defaults to 5 for chained and 2 for open.
        #[clap(short = 'r', long)]
        runs: Option<usize>,
        /// Initial bucket or slot count, defaults to the table's own default.
        #[clap(short = 's', long)]
        initial_size: Option<usize>,
        #[clap(long)]
        seed: Option<u64>,
        #[clap(short = 'o', long, default_value = "result.txt")]
        output: PathBuf,
    },
    /// Buckets random keys with several hash functions and appends the histograms to a CSV file.
    HashQuality {
        #[clap(short = 'k', long, value_enum, default_value = "string")]
        keys: hash_quality::KeyKind,
        #[clap(short = 'b', long, default_value = "1000")]
        buckets: usize,
        #[clap(short = 'n', long, default_value = "1000000")]
        iterations: usize,
        #[clap(long)]
        seed: Option<u64>,
        #[clap(short = 'o', long, default_value = "result.csv")]
        output: PathBuf,
    },
}

fn main() -> color_eyre::Result<()> {
    let args = Args::parse();

    color_eyre::install()?;
    inttab_logger::setup();

    match args.command {
        Command::Ops {
            table,
            min_ops,
            max_ops,
            step,
            runs,
            initial_size,
            seed,
            output,
        } => {
            let seed = seed.unwrap_or_else(rand::random);
            log::info!("seed {seed}");
            let file = std::fs::File::create(&output)
                .wrap_err_with(|| format!("creating {}", output.display()))?;
            let mut out = BufWriter::new(file);
            let options = ops::OpsOptions {
                min_ops,
                max_ops,
                step,
                runs: runs.unwrap_or_else(|| table.default_runs()),
                initial_size,
                seed,
            };
            ops::run(table, &options, &mut out)?;
            out.flush()?;
        }
        Command::HashQuality {
            keys,
            buckets,
            iterations,
            seed,
            output,
        } => {
            let seed = seed.unwrap_or_else(rand::random);
            log::info!("seed {seed}");
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&output)
                .wrap_err_with(|| format!("opening {}", output.display()))?;
            let mut out = BufWriter::new(file);
            let options = hash_quality::HashQualityOptions {
                keys,
                buckets,
                iterations,
                seed,
            };
            hash_quality::run(&options, &mut out)?;
            out.flush()?;
        }
    }

    Ok(())
}
