use std::process::{Command, Output};

const LABELS: [&str; 4] = [
    "Naive GEMM",
    "Transposed GEMM",
    "Parallel GEMM",
    "Parallel SIMD GEMM",
];

fn gemmly(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_gemmly"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run gemmly")
}

fn gemm(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_gemm"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run gemm")
}

fn stdout(out: &Output) -> String {
    String::from_utf8(out.stdout.clone()).unwrap()
}

fn assert_report(out: &Output) {
    assert_eq!(out.status.code(), Some(0), "stderr: {}", String::from_utf8_lossy(&out.stderr));

    let text = stdout(out);
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 4, "stdout: {text:?}");

    for (line, label) in lines.iter().zip(LABELS) {
        let secs = line
            .strip_prefix(label)
            .and_then(|rest| rest.strip_prefix(": "))
            .and_then(|rest| rest.strip_suffix(" seconds"))
            .unwrap_or_else(|| panic!("malformed report line {line:?}"));
        let (_, decimals) = secs.split_once('.').unwrap();
        assert_eq!(decimals.len(), 6, "{line:?}");
        assert!(secs.parse::<f64>().unwrap() >= 0.0);
    }
}

fn assert_usage(out: &Output, program: &str) {
    assert_eq!(out.status.code(), Some(1));
    let text = stdout(out);
    assert!(text.starts_with("Usage: "), "stdout: {text:?}");
    assert!(
        text.lines().next().unwrap().ends_with(&format!("{program} <matrix_size>")),
        "stdout: {text:?}"
    );
}

// ============================================================
// gemmly
// ============================================================

#[test]
fn gemmly_prints_four_report_lines() {
    assert_report(&gemmly(&["16"]));
}

#[test]
fn gemmly_logs_go_to_stderr() {
    let out = gemmly(&["-v", "8"]);
    assert_report(&out);
    let logs = String::from_utf8(out.stderr).unwrap();
    assert!(logs.contains("running all kernels"), "stderr: {logs:?}");
}

#[test]
fn gemmly_reads_non_numeric_sizes_as_zero() {
    for size in ["abc", "-5", "-1e3", "-x", "--foo"] {
        let out = gemmly(&[size]);
        assert_report(&out);
    }
}

#[test]
fn gemmly_wrong_argument_count_prints_usage() {
    assert_usage(&gemmly(&[]), "gemmly");
    assert_usage(&gemmly(&["4", "5"]), "gemmly");
}

#[test]
fn gemmly_help_succeeds() {
    let out = gemmly(&["--help"]);
    assert_eq!(out.status.code(), Some(0));
    assert!(stdout(&out).contains("--threads"));
}

// ============================================================
// gemm
// ============================================================

#[test]
fn gemm_is_silent_without_print() {
    let out = gemm(&["24"]);
    assert_eq!(out.status.code(), Some(0));
    assert!(out.stdout.is_empty());
}

#[test]
fn gemm_prints_operands_and_result() {
    let out = gemm(&["2", "--print", "--kernel", "transposed"]);
    assert_eq!(out.status.code(), Some(0));

    let ones = "1.00 1.00 \n1.00 1.00 \n\n";
    let result = "3.00 3.00 \n3.00 3.00 \n\n";
    assert_eq!(stdout(&out), format!("{ones}{ones}{ones}{result}"));
}

#[test]
fn gemm_applies_alpha_and_beta() {
    let out = gemm(&["3", "--alpha", "2", "--beta", "0.5", "--print"]);
    assert_eq!(out.status.code(), Some(0));

    let text = stdout(&out);
    let last = text.split("\n\n").filter(|m| !m.is_empty()).last().unwrap();
    assert_eq!(last, "6.50 6.50 6.50 \n6.50 6.50 6.50 \n6.50 6.50 6.50 ");
}

#[test]
fn gemm_wrong_arguments_print_usage() {
    assert_usage(&gemm(&[]), "gemm");
    assert_usage(&gemm(&["4", "--kernel", "blocked"]), "gemm");
}

#[test]
fn gemm_zero_threads_is_a_fatal_error() {
    let out = gemm(&["4", "--threads", "0"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(out.stdout.is_empty());
    let err = String::from_utf8(out.stderr).unwrap();
    assert!(err.starts_with("Error:"), "stderr: {err:?}");
}
