use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;

use pbe_core::enumerator::CancelToken;
use pbe_core::error::SynthResult;
use pbe_core::io::{csv, literal, txt};
use pbe_core::{ExprArena, ExprId, SearchSpace, Value};

/// Best-effort programming-by-example synthesizer over a small expression grammar.
#[derive(Parser, Debug)]
#[command(name = "pbe-synth", version, about)]
struct Cli {
    /// Path to the input-output examples file (CSV).
    #[arg(short = 'i', long = "input-output")]
    input_output: PathBuf,

    /// Path to the grammar file (CSV or TXT, dispatched by extension).
    #[arg(short = 'g', long = "search-space")]
    search_space: PathBuf,

    /// Distance metric to score candidates with.
    #[arg(short = 'm', long = "metric", default_value = "default")]
    metric: String,

    /// Metric-specific parameter (sigma, vector-function name, combined sub-metric list, ...).
    #[arg(short = 'p', long = "metric-parameter", default_value = "")]
    metric_parameter: String,

    /// Selection tactic: match | accuracy | height | top | best_by_height | penalized_height |
    /// interrupt.
    #[arg(short = 't', long = "tactic", default_value = "height")]
    tactic: String,

    /// Tactic-specific parameter, a numeric literal.
    #[arg(short = 'a', long = "tactic-parameter", default_value = "0")]
    tactic_parameter: String,

    /// Maximum search depth.
    #[arg(short = 'H', long = "max-height", default_value_t = 2)]
    max_height: u32,

    /// Print programs searched and highest height reached after the result.
    #[arg(short = 'S', long = "statistics")]
    statistics: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> SynthResult<()> {
    let examples = csv::read_examples(&cli.input_output)?;
    let grammar = read_grammar(&cli.search_space)?;
    let metric = pbe_core::metric::from_name(&cli.metric, &cli.metric_parameter)?;
    let tactic_parameter = numeric_tactic_parameter(&cli.tactic_parameter)?;
    log::debug!(
        "resolved grammar reader={:?} metric={} tactic={}",
        cli.search_space.extension().and_then(|e| e.to_str()).unwrap_or("csv"),
        cli.metric,
        cli.tactic
    );

    match cli.tactic.as_str() {
        "match" => {
            let (found, arena, stats) = pbe_core::strategy::find_exact(&grammar, &examples, cli.max_height);
            print_single(found.as_ref().map(|&id| (id, &arena)));
            print_stats(cli.statistics, stats);
        }
        "accuracy" => {
            let (found, arena, stats) = pbe_core::strategy::find_within_error_rate(
                &grammar,
                &examples,
                cli.max_height,
                metric.as_ref(),
                tactic_parameter,
            );
            print_single(found.as_ref().map(|&id| (id, &arena)));
            print_stats(cli.statistics, stats);
        }
        "height" => {
            let (found, arena, stats) =
                pbe_core::strategy::find_best_by_height(&grammar, &examples, cli.max_height, metric.as_ref());
            print_single(found.as_ref().map(|&id| (id, &arena)));
            print_stats(cli.statistics, stats);
        }
        "top" => {
            let k = (tactic_parameter.max(0.0) as usize).max(1);
            let (ids, arena, stats) =
                pbe_core::strategy::find_top_k(&grammar, &examples, cli.max_height, metric.as_ref(), k);
            print_many(&ids, &arena);
            print_stats(cli.statistics, stats);
        }
        "best_by_height" => {
            let (by_height, arena, stats) = pbe_core::strategy::find_best_by_height_per_height(
                &grammar,
                &examples,
                cli.max_height,
                metric.as_ref(),
            );
            let ids: Vec<ExprId> = by_height.into_iter().flatten().collect();
            print_many(&ids, &arena);
            print_stats(cli.statistics, stats);
        }
        "penalized_height" => {
            let (found, arena, stats) = pbe_core::strategy::find_penalized_by_height(
                &grammar,
                &examples,
                cli.max_height,
                metric.as_ref(),
                tactic_parameter,
            );
            print_single(found.as_ref().map(|&id| (id, &arena)));
            print_stats(cli.statistics, stats);
        }
        "interrupt" => {
            let cancel = CancelToken::new();
            let handler_cancel = cancel.clone();
            // Matches the design notes' cooperative-cancellation story: a signal handler sets
            // the flag, the enumerator polls it at candidate boundaries.
            let _ = ctrlc::set_handler(move || handler_cancel.cancel());
            let (found, arena, stats) = pbe_core::strategy::find_best_until_interrupt(
                &grammar,
                &examples,
                cli.max_height,
                metric.as_ref(),
                cancel,
            );
            if found.is_none() {
                log::warn!("interrupted search ended with no candidate found");
            }
            print_single(found.as_ref().map(|&id| (id, &arena)));
            print_stats(cli.statistics, stats);
        }
        other => {
            return Err(pbe_core::error::SynthError::InputParse(format!("unknown tactic '{other}'")));
        }
    }
    Ok(())
}

fn read_grammar(path: &Path) -> SynthResult<SearchSpace> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("txt") => txt::read_grammar(path),
        _ => csv::read_grammar(path),
    }
}

fn numeric_tactic_parameter(raw: &str) -> SynthResult<f64> {
    let value = literal::parse_literal(raw)?;
    Ok(match value {
        Value::Int(i) => i.to_f64(),
        Value::Float(f) => f,
        _ => {
            return Err(pbe_core::error::SynthError::InputParse(format!(
                "tactic-parameter '{raw}' is not numeric"
            )));
        }
    })
}

fn print_single(found: Option<(ExprId, &ExprArena)>) {
    match found {
        Some((id, arena)) => println!("{}", render(arena, id)),
        None => println!("No valid program"),
    }
}

fn print_many(ids: &[ExprId], arena: &ExprArena) {
    if ids.is_empty() {
        println!("No valid program");
        return;
    }
    for &id in ids {
        println!("{}", render(arena, id));
    }
}

fn render(arena: &ExprArena, id: ExprId) -> String {
    arena.get(id).render(arena)
}

fn print_stats(enabled: bool, stats: pbe_core::strategy::SearchStats) {
    if enabled {
        println!("programs searched: {}", stats.programs_searched);
        println!("highest height reached: {}", stats.max_height_reached);
    }
}
