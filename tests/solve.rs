use anyhow::{ensure, Context};
use slider_solver::solve::Config;
use slider_solver::Solver;

use crate::common::*;

mod common;

fn main() {
    run_tests("solve", |content| {
        let (input, initial) = parse_input(content)?;

        let solver = Solver::new(initial.clone());

        // Validate.
        if let Some(path) = solver.solution() {
            ensure!(path.first() == Some(&initial), "Path does not start at the input");
            ensure!(
                path.last().context("Empty path")?.is_goal(),
                "Path does not end at the goal"
            );
            ensure!(
                solver.moves() == Some(path.len() - 1),
                "Move count disagrees with the path"
            );
            for (w, i) in path.windows(2).zip(1..) {
                ensure!(w[0].neighbors().contains(&w[1]), "Invalid move {i}");
            }
        } else {
            ensure!(solver.moves().is_none(), "Unsolvable board has a move count");
            ensure!(
                Solver::new(initial.twin()).is_solvable(),
                "Neither the board nor its twin is solvable"
            );
        }

        let config = Config {
            parallel: true,
            ..Config::default()
        };
        let parallel = Solver::with_config(initial, &config, || {})?;
        ensure!(
            parallel.solution() == solver.solution(),
            "Parallel search disagrees"
        );

        Ok(format!("{input}\n\n{SEPARATOR}{solver}"))
    });
}
