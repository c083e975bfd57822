use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{bail, ensure, Context, Result};
use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use slider_solver::solve::Config;
use slider_solver::{Board, Solver};

const USAGE: &str = "Usage: slider-solver [--parallel] [--limit <expansions>] <board-file>...";

struct Args {
    config: Config,
    paths: Vec<PathBuf>,
}

fn parse_args() -> Result<Args> {
    let mut config = Config::default();
    let mut paths = Vec::new();
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--parallel" => config.parallel = true,
            "--limit" => {
                let limit = args.next().context("Missing value for --limit")?;
                let limit = limit
                    .parse::<usize>()
                    .with_context(|| format!("Invalid limit: {limit:?}"))?;
                config.max_expansions = Some(limit);
            }
            _ if arg.starts_with("--") => bail!("Unknown option: {arg:?}"),
            _ => paths.push(PathBuf::from(arg)),
        }
    }
    ensure!(!paths.is_empty(), "Missing board file argument");
    Ok(Args { config, paths })
}

fn solve_file(path: &Path, config: &Config, progress: &ProgressBar) -> Result<Solver> {
    let data = std::fs::read_to_string(path).context("Failed to read the board")?;
    let board = data
        .parse::<Board>()
        .context("Failed to parse the board")?;
    let solver = Solver::with_config(board, config, || progress.inc(1))?;
    Ok(solver)
}

fn main() -> Result<ExitCode> {
    env_logger::init();

    let args = parse_args().context(USAGE)?;

    let progress = ProgressBar::new_spinner()
        .with_style(ProgressStyle::with_template("{spinner} {human_pos} expansions ({per_sec})")?);
    progress.enable_steady_tick(Duration::from_millis(100));

    let results = args
        .paths
        .par_iter()
        .map(|path| solve_file(path, &args.config, &progress))
        .collect::<Vec<_>>();
    progress.finish_and_clear();

    let term = Term::stderr();
    let show_names = args.paths.len() > 1;
    let mut failed = false;
    for (path, result) in args.paths.iter().zip(results) {
        match result {
            Ok(solver) => {
                if show_names {
                    println!("{}:", path.display());
                }
                print!("{solver}");
            }
            Err(err) => {
                failed = true;
                let msg = format!("{}: {err:#}", path.display());
                term.write_line(&style(msg).red().to_string())?;
            }
        }
    }

    Ok(if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}
