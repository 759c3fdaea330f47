use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::time::Duration;

use clap::{value_parser, Parser};

use crate::error::Error;
use crate::warehouse::Plan;

/* ---------- */

/// Largest store accepted on the command line. Both lanes are allocated up front.
pub const MAX_CAPACITY: u64 = 4096;

/// Command-line arguments of the `warehouse` binary.
///
/// The three counts are prompted on stdin when missing.
#[derive(Parser, Debug, Clone)]
#[command(name = "warehouse")]
#[command(about = "Suppliers and retailers sharing a priority-aware bounded store")]
pub struct Args {
    /// Number of supplier threads
    #[arg(long, short = 's', value_parser = value_parser!(u64).range(1..))]
    pub suppliers: Option<u64>,

    /// Number of retailer threads
    #[arg(long, short = 'r', value_parser = value_parser!(u64).range(1..))]
    pub retailers: Option<u64>,

    /// Items consumed by retailers before the warehouse stops on its own
    #[arg(long, short = 'w', value_parser = value_parser!(u64).range(1..))]
    pub work: Option<u64>,

    /// Slots shared by the normal and urgent lanes
    #[arg(long, default_value_t = 10, value_parser = value_parser!(u64).range(1..=MAX_CAPACITY))]
    pub capacity: u64,

    /// Append-only event log
    #[arg(long, default_value = "warehouse.log")]
    pub log_file: PathBuf,

    /// Pause of each supplier before supplying an item, in milliseconds
    #[arg(long, default_value_t = 1000)]
    pub supply_delay_ms: u64,

    /// Pause of each retailer after taking an item, in milliseconds
    #[arg(long, default_value_t = 2000)]
    pub retail_delay_ms: u64,

    /// Probability for a supplied item to be urgent
    #[arg(long, default_value_t = 0.5, value_parser = parse_ratio)]
    pub urgent_ratio: f64,

    /// CPU to pin worker threads to, in turn (repeatable)
    #[arg(long = "pin", value_name = "CPU")]
    pub cores: Vec<usize>,

    /// Don't read commands from stdin
    #[arg(long)]
    pub no_console: bool,
}

fn parse_ratio(raw: &str) -> Result<f64, String> {
    let ratio = raw
        .parse::<f64>()
        .map_err(|err| format!("{raw:?} isn't a number: {err}"))?;

    if (0.0..=1.0).contains(&ratio) {
        Ok(ratio)
    } else {
        Err(format!("{ratio} isn't between 0 and 1"))
    }
}

/* ---------- */

/// The resolved configuration of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Shape of the warehouse.
    pub plan: Plan,
    /// Event log location.
    pub log_file: PathBuf,
    /// Supplier pacing.
    pub supply_delay: Duration,
    /// Retailer pacing.
    pub retail_delay: Duration,
    /// Probability for a supplied item to be urgent.
    pub urgent_ratio: f64,
    /// CPUs worker threads are pinned to, in turn. Empty means no pinning.
    pub cores: Vec<usize>,
    /// Whether the interactive console runs.
    pub console: bool,
}

impl Config {
    /// Resolves `args`, prompting on `input` for the counts it lacks.
    ///
    /// Invalid answers are reported on `output` and asked again.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `input` runs dry before every count is known,
    /// or if a value doesn't fit the platform.
    pub fn resolve<R, W>(args: Args, input: &mut R, output: &mut W) -> Result<Self, Error>
    where
        R: BufRead,
        W: Write,
    {
        let mut count = |given: Option<u64>, label: &str| match given {
            Some(count) => Ok(count),
            None => prompt_positive(input, output, label),
        };

        let suppliers = count(args.suppliers, "number of suppliers")?;
        let retailers = count(args.retailers, "number of retailers")?;
        let work = count(args.work, "number of items to consume before stopping")?;

        Ok(Self {
            plan: Plan {
                capacity: to_usize(args.capacity)?,
                suppliers: to_usize(suppliers)?,
                retailers: to_usize(retailers)?,
                work,
            },
            log_file: args.log_file,
            supply_delay: Duration::from_millis(args.supply_delay_ms),
            retail_delay: Duration::from_millis(args.retail_delay_ms),
            urgent_ratio: args.urgent_ratio,
            cores: args.cores,
            console: !args.no_console,
        })
    }

    /// Returns the shape of the warehouse.
    #[inline]
    pub fn plan(&self) -> Plan {
        self.plan
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            plan: Plan::default(),
            log_file: PathBuf::from("warehouse.log"),
            supply_delay: Duration::from_secs(1),
            retail_delay: Duration::from_secs(2),
            urgent_ratio: 0.5,
            cores: Vec::new(),
            console: true,
        }
    }
}

#[inline]
fn to_usize(value: u64) -> Result<usize, Error> {
    usize::try_from(value).map_err(Error::config)
}

/* ---------- */

/// Parses a strictly positive integer.
///
/// # Errors
///
/// Returns [`Error::Config`] for anything else, zero and negative numbers included.
pub fn parse_positive(raw: &str) -> Result<u64, Error> {
    let raw = raw.trim();

    match raw.parse::<i128>() {
        Ok(value) if value > 0 => u64::try_from(value).map_err(Error::config),
        Ok(value) => Err(Error::config(format!("{value} isn't positive"))),
        Err(_) => Err(Error::config(format!("{raw:?} isn't a whole number"))),
    }
}

/// Asks for `label` until a positive integer is entered.
///
/// # Errors
///
/// Returns [`Error::Config`] if `input` is exhausted or unreadable, or `output` unwritable.
pub fn prompt_positive<R, W>(input: &mut R, output: &mut W, label: &str) -> Result<u64, Error>
where
    R: BufRead,
    W: Write,
{
    let mut line = String::new();

    loop {
        write!(output, "Enter {label}: ").map_err(Error::config)?;
        output.flush().map_err(Error::config)?;

        line.clear();
        if input.read_line(&mut line).map_err(Error::config)? == 0 {
            return Err(Error::config(format!("no {label} given")));
        }

        match parse_positive(&line) {
            Ok(value) => return Ok(value),
            Err(err) => {
                tracing::debug!(%err, label, "rejected answer");
                writeln!(output, "{err}, please enter a positive whole number.")
                    .map_err(Error::config)?;
            }
        }
    }
}

/* ---------- */
