//! Command-line model shared by the `gemmly` and `gemm` binaries.

use std::ffi::OsString;

use clap::{error::ErrorKind, ArgAction, Args, CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use crate::bench::{Fill, GemmParams};
use crate::gemm::available_workers;

/// Exit code for a malformed command line and for fatal runtime errors.
pub const EXIT_FAILURE: i32 = 1;

/// Options accepted by every driver.
#[derive(Debug, Clone, Args)]
pub struct CommonArgs {
    /// Matrix dimension n (read like C `atoi`: junk reads as 0)
    #[arg(
        value_name = "MATRIX_SIZE",
        allow_negative_numbers = true,
        allow_hyphen_values = true
    )]
    pub size: String,

    /// Worker threads for the parallel kernels [default: available parallelism]
    #[arg(short, long, value_name = "N")]
    pub threads: Option<usize>,

    /// Scale applied to A*B
    #[arg(long, default_value_t = 1.0, allow_negative_numbers = true)]
    pub alpha: f64,

    /// Scale applied to the previous C
    #[arg(long, default_value_t = 1.0, allow_negative_numbers = true)]
    pub beta: f64,

    /// Fill A, B and C with seeded uniform values in [-1, 1) instead of ones
    #[arg(long, value_name = "SEED")]
    pub seed: Option<u64>,

    /// Log more to stderr (-v info, -vv debug, -vvv trace); RUST_LOG wins when set
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl CommonArgs {
    /// The matrix dimension.
    pub fn n(&self) -> usize {
        parse_size(&self.size)
    }

    pub fn params(&self) -> GemmParams {
        let fill = match self.seed {
            Some(seed) => Fill::Random { seed },
            None => Fill::default(),
        };
        GemmParams {
            alpha: self.alpha,
            beta: self.beta,
            fill,
        }
    }

    /// Requested worker count, or the machine's available parallelism.
    pub fn workers(&self) -> usize {
        self.threads.unwrap_or_else(available_workers)
    }
}

/// Reads a matrix size the way C `atoi` does.
///
/// Leading whitespace is skipped, one optional sign is accepted, then decimal
/// digits are read until the first non-digit. No digits reads as 0, a negative
/// value reads as 0 and values beyond `usize::MAX` saturate.
///
/// ```
/// use gemmly::cli::parse_size;
///
/// assert_eq!(parse_size("  512"), 512);
/// assert_eq!(parse_size("64x64"), 64);
/// assert_eq!(parse_size("abc"), 0);
/// assert_eq!(parse_size("-8"), 0);
/// ```
pub fn parse_size(arg: &str) -> usize {
    let s = arg.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let value = digits
        .bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0usize, |acc, d| {
            acc.saturating_mul(10).saturating_add(usize::from(d - b'0'))
        });

    if negative {
        0
    } else {
        value
    }
}

/// The usage line printed on a malformed command line, followed by the options.
pub fn usage_message<T: CommandFactory>(program: &str) -> String {
    let mut cmd = T::command();
    format!(
        "Usage: {program} <matrix_size>\n\n{}",
        cmd.render_help().to_string().trim_end()
    )
}

/// Parses `args` into `T`.
///
/// `--help` and `--version` print and exit 0 as usual. Every other command-line
/// error prints the usage message to stdout and exits with [`EXIT_FAILURE`].
pub fn parse_or_usage<T, I, A>(args: I) -> T
where
    T: Parser,
    I: IntoIterator<Item = A>,
    A: Into<OsString> + Clone,
{
    let args: Vec<OsString> = args.into_iter().map(Into::into).collect();
    match T::try_parse_from(&args) {
        Ok(parsed) => parsed,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            e.exit()
        }
        Err(_) => {
            let program = args
                .first()
                .map(|p| p.to_string_lossy().into_owned())
                .unwrap_or_else(|| T::command().get_name().to_string());
            println!("{}", usage_message::<T>(&program));
            std::process::exit(EXIT_FAILURE);
        }
    }
}

fn default_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Installs the global tracing subscriber, writing to stderr so that stdout
/// carries only the report.
pub fn init_tracing(verbose: u8) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level(verbose)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {e}"))
}
