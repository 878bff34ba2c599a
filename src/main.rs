//! `gemmly <n>`: times every kernel once on fresh `n x n` operands and prints
//! one line per kernel.

use std::io::Write;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use gemmly::cli::{init_tracing, parse_or_usage, CommonArgs, EXIT_FAILURE};
use gemmly::{run_all, Gemm};

#[derive(Debug, Parser)]
#[command(name = "gemmly", version)]
#[command(about = "Benchmark naive, transposed, parallel and parallel SIMD GEMM")]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,
}

fn run(cli: Cli) -> Result<()> {
    let n = cli.common.n();
    let params = cli.common.params();
    let workers = cli.common.workers();

    let gemm = Gemm::new(workers).context("Failed to build the worker pool")?;
    info!(n, workers, ?params, "running all kernels");

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    run_all(&gemm, n, &params, &mut out).with_context(|| format!("Benchmark failed for n = {n}"))?;
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
