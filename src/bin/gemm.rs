//! `gemm <n>`: runs one kernel on `n x n` operands. Silent unless `--print`.

use std::io::Write;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info};

use gemmly::cli::{init_tracing, parse_or_usage, CommonArgs, EXIT_FAILURE};
use gemmly::{Gemm, Kernel, Operands};

#[derive(Debug, Parser)]
#[command(name = "gemm", version)]
#[command(about = "Run a single GEMM kernel")]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,

    /// Kernel to run
    #[arg(short, long, value_enum, default_value_t = Kernel::ParallelSimd)]
    kernel: Kernel,

    /// Print A, B and C before the call and C after it
    #[arg(long)]
    print: bool,
}

fn run(cli: Cli) -> Result<()> {
    let n = cli.common.n();
    let params = cli.common.params();

    let gemm = Gemm::new(cli.common.workers()).context("Failed to build the worker pool")?;
    let mut operands = Operands::try_new(n, params.fill)
        .with_context(|| format!("Failed to allocate {n}x{n} operands"))?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    if cli.print {
        write!(out, "{}{}{}", operands.a, operands.b, operands.c)?;
    }

    let workers = if cli.kernel.is_parallel() { gemm.workers() } else { 1 };
    info!(n, kernel = %cli.kernel, workers, "running kernel");
    operands
        .run(&gemm, cli.kernel, params.alpha, params.beta)
        .with_context(|| format!("{} failed for n = {n}", cli.kernel))?;
    debug!("kernel finished");

    if cli.print {
        write!(out, "{}", operands.c)?;
    }
    out.flush().context("Failed to flush stdout")?;
    Ok(())
}

fn main() {
    let cli: Cli = parse_or_usage(std::env::args_os());

    if let Err(e) = init_tracing(cli.common.verbose) {
        eprintln!("Warning: {e}");
    }

    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        std::process::exit(EXIT_FAILURE);
    }
}
