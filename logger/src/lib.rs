//! Default logging setup for the inttab tools
//!
//! Every line is prefixed with the time elapsed since [`setup`] and the resident memory of the
//! process, which is what matters when comparing table implementations. Whenever the log target
//! changes, a header line naming the new target is written first.
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::undocumented_unsafe_blocks)]
#![warn(missing_docs)]

use std::{fmt, sync::Mutex, time::Instant};

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct MemoryAmount(usize);

impl fmt::Display for MemoryAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 < 1000 {
            write!(f, "{:5}B", self.0)
        } else if self.0 < 1000 << 10 {
            write!(f, "{:5.1}K", self.0 as f64 / (1u64 << 10) as f64)
        } else if self.0 < 1000 << 20 {
            write!(f, "{:5.1}M", self.0 as f64 / (1u64 << 20) as f64)
        } else {
            write!(f, "{:5.1}G", self.0 as f64 / (1u64 << 30) as f64)
        }
    }
}

/// Resident set size of the current process, where the platform makes it cheap to obtain.
#[cfg(all(target_os = "linux", not(miri)))]
fn resident_memory() -> Option<MemoryAmount> {
    // SAFETY: standard way to obtain page size
    let pagesize = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
    let pagesize = usize::try_from(pagesize).ok()?;
    let statm = std::fs::read_to_string("/proc/self/statm").ok()?;
    let rss_pages = statm.split_ascii_whitespace().nth(1)?.parse::<usize>().ok()?;
    Some(MemoryAmount(rss_pages * pagesize))
}

#[cfg(not(all(target_os = "linux", not(miri))))]
fn resident_memory() -> Option<MemoryAmount> {
    None
}

const TIMESTAMP_STYLE: anstyle::Style =
    anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::BrightBlack)));

const MEMORY_STYLE: anstyle::Style =
    anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Blue)));

const TARGET_STYLE: anstyle::Style =
    anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Magenta)));

/// Perform the default logging setup used by the inttab binaries.
///
/// The filter is read from `INTTAB_LOG` (defaulting to `info`) and the color choice from
/// `INTTAB_LOG_STYLE`.
pub fn setup() {
    let start_time = Instant::now();
    let last_target = Mutex::new(String::new());

    env_logger::Builder::from_env(
        env_logger::Env::new()
            .filter_or("INTTAB_LOG", "info")
            .write_style("INTTAB_LOG_STYLE"),
    )
    .format(move |buf, record| {
        use std::io::Write;

        let timestamp = start_time.elapsed();
        let level = record.level();
        let target = record.target();
        let memory = resident_memory()
            .map_or_else(|| "     ?".to_string(), |memory| memory.to_string());

        let prefix = format!(
            "{} {}",
            format_args!("{style}{timestamp:>9.2?}{style:#}", style = TIMESTAMP_STYLE),
            format_args!("{style}{memory}{style:#}", style = MEMORY_STYLE),
        );

        let mut last_target = last_target.lock().unwrap_or_else(|err| err.into_inner());
        if target != *last_target {
            last_target.clear();
            last_target.push_str(target);
            writeln!(
                buf,
                "{prefix} {}",
                format_args!("{style}{target}{style:#}", style = TARGET_STYLE)
            )?;
        }
        writeln!(
            buf,
            "{prefix} {} {}",
            format_args!(
                "{style}{level}{style:#}",
                style = buf.default_level_style(level),
            ),
            record.args(),
        )
    })
    .init();
}
