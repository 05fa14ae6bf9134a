//! Exercises the `pbe-synth` binary itself: argument parsing, exit codes, and the "No valid
//! program" normal-result path, as opposed to `pbe-core`'s own tests which drive the search
//! API directly.

use assert_cmd::Command;
use predicates::str::contains;

fn fixture(name: &str) -> String {
    format!("{}/tests/fixtures/{name}", env!("CARGO_MANIFEST_DIR"))
}

#[test]
fn finds_the_sum_of_three_variables() {
    Command::cargo_bin("pbe-synth")
        .unwrap()
        .args([
            "--input-output",
            &fixture("sum_examples.csv"),
            "--search-space",
            &fixture("sum_grammar.txt"),
            "--max-height",
            "3",
        ])
        .assert()
        .success()
        .stdout(contains("x"))
        .stdout(contains("y"))
        .stdout(contains("z"));
}

#[test]
fn reports_statistics_when_requested() {
    Command::cargo_bin("pbe-synth")
        .unwrap()
        .args([
            "--input-output",
            &fixture("sum_examples.csv"),
            "--search-space",
            &fixture("sum_grammar.txt"),
            "--max-height",
            "3",
            "--statistics",
        ])
        .assert()
        .success()
        .stdout(contains("programs searched:"))
        .stdout(contains("highest height reached:"));
}

#[test]
fn malformed_examples_file_is_a_nonzero_exit_with_a_stderr_diagnostic() {
    Command::cargo_bin("pbe-synth")
        .unwrap()
        .args(["--input-output", &fixture("bad_examples.csv"), "--search-space", &fixture("sum_grammar.txt")])
        .assert()
        .failure()
        .stderr(contains("output"));
}

#[test]
fn unsatisfiable_grammar_prints_no_valid_program_and_still_exits_zero() {
    Command::cargo_bin("pbe-synth")
        .unwrap()
        .args([
            "--input-output",
            &fixture("sum_examples.csv"),
            "--search-space",
            &fixture("sum_grammar.txt"),
            "--tactic",
            "match",
            "--max-height",
            "0",
        ])
        .assert()
        .success()
        .stdout(contains("No valid program"));
}
