//! Exit codes and output of the benchmark executables.

use std::process::{Command, Output};

fn stencil(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_stencil"))
        .args(args)
        .output()
        .expect("failed to launch stencil")
}

fn nstream(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_nstream"))
        .args(args)
        .output()
        .expect("failed to launch nstream")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn test_zero_iterations_rejected() {
    let out = stencil(&["0", "20"]);
    assert_eq!(out.status.code(), Some(1));
    assert_eq!(stdout(&out).trim(), "ERROR: iterations must be >= 1");
}

#[test]
fn test_zero_radius_rejected() {
    let out = stencil(&["5", "20", "32", "star", "0"]);
    assert_eq!(out.status.code(), Some(1));
    assert_eq!(stdout(&out).trim(), "ERROR: Stencil radius negative or too large");
}

#[test]
fn test_footprint_wider_than_grid_rejected() {
    let out = stencil(&["5", "6", "32", "star", "3"]);
    assert_eq!(out.status.code(), Some(1));
}

#[test]
fn test_missing_arguments_print_usage() {
    let out = stencil(&["5"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(stdout(&out).starts_with("Usage: <# iterations> <array dimension>"));
}

#[test]
fn test_help_exits_cleanly() {
    assert_eq!(stencil(&["--help"]).status.code(), Some(0));
}

#[test]
fn test_star_validates() {
    let out = stencil(&["5", "20", "32", "star", "2"]);
    assert_eq!(out.status.code(), Some(0));
    let text = stdout(&out);
    assert!(text.contains("Solution validates"), "{}", text);
    assert!(!text.contains("ERROR: L1 norm"), "{}", text);
}

#[test]
fn test_all_star_radii_on_host() {
    for radius in ["1", "3", "5"] {
        let out = stencil(&["3", "24", "8", "star", radius, "--backends", "reference,cpu"]);
        assert_eq!(out.status.code(), Some(0));
        let text = stdout(&out);
        assert_eq!(text.matches("64B Rate (MFlops/s)").count(), 2, "radius {}: {}", radius, text);
    }
}

#[test]
fn test_exact_weights_validate_in_single_precision() {
    let out = stencil(&["3", "24", "8", "star", "1", "--backends", "reference,cpu"]);
    let text = stdout(&out);
    assert_eq!(text.matches("32B Rate (MFlops/s)").count(), 2, "{}", text);
    assert!(!text.contains("ERROR: L1 norm"), "{}", text);
}

#[test]
fn test_inexact_weights_miss_tolerance_in_single_precision() {
    // Radius 3 weights (1/6, 1/12, 1/18) round in f32.
    let out = stencil(&["3", "24", "8", "star", "3", "--backends", "reference,cpu"]);
    assert_eq!(out.status.code(), Some(0));
    let text = stdout(&out);

    let errors: Vec<&str> = text
        .lines()
        .filter(|line| line.starts_with("ERROR: L1 norm = "))
        .collect();
    assert_eq!(errors.len(), 2, "{}", text);
    for line in errors {
        assert!(line.ends_with(" Reference L1 norm = 8"), "{}", line);
        assert!(!line.starts_with("ERROR: L1 norm = 8 "), "{}", line);
    }
    assert!(!text.contains("32B Rate"), "{}", text);
    assert_eq!(text.matches("64B Rate (MFlops/s)").count(), 2, "{}", text);
}

#[test]
fn test_quiet_keeps_results_and_silences_info_logs() {
    let out = stencil(&["2", "20", "32", "star", "1", "--backends", "cpu", "-q"]);
    assert_eq!(out.status.code(), Some(0));
    let text = stdout(&out);
    assert!(text.contains("Radius of stencil    = 1"), "{}", text);
    assert!(text.contains("Solution validates"), "{}", text);
    let logs = String::from_utf8_lossy(&out.stderr);
    assert!(!logs.contains("INFO"), "{}", logs);
}

#[test]
fn test_grid_pattern_aborts() {
    let out = stencil(&["2", "20", "32", "grid", "2", "--backends", "reference"]);
    assert!(!out.status.success());
    assert!(stdout(&out).contains("You are trying to use a stencil that does not exist."));
}

#[test]
fn test_reference_skipped_for_large_grid() {
    let out = stencil(&["1", "400", "32", "star", "1", "--backends", "reference,cpu"]);
    assert_eq!(out.status.code(), Some(0));
    let text = stdout(&out);
    assert!(text.contains("Skipping host device since it is too slow for large problems"));
    assert!(text.contains("Solution validates"));
}

#[test]
fn test_nstream_validates() {
    let out = nstream(&["5", "10000", "--backends", "reference,cpu"]);
    assert_eq!(out.status.code(), Some(0));
    let text = stdout(&out);
    assert_eq!(text.matches("Solution validates").count(), 4, "{}", text);
    assert!(text.contains("Vector length        = 10000"));
}

#[test]
fn test_nstream_rejections() {
    let out = nstream(&["5", "0"]);
    assert_eq!(out.status.code(), Some(1));
    assert_eq!(stdout(&out).trim(), "ERROR: vector length must be positive");

    let out = nstream(&["5", "10", "-2"]);
    assert_eq!(out.status.code(), Some(1));
    assert_eq!(stdout(&out).trim(), "ERROR: offset must be nonnegative");
}
