use std::fmt::Write;

use anyhow::ensure;

use crate::common::*;

mod common;

fn main() {
    run_tests("board", |content| {
        let (input, board) = parse_input(content)?;

        let twin = board.twin();
        ensure!(twin != board, "Twin equals the board");
        ensure!(twin.blank() == board.blank(), "Twin moved the blank");

        let neighbors = board.neighbors();
        ensure!(
            (2..=4).contains(&neighbors.len()),
            "Unexpected neighbor count {}",
            neighbors.len()
        );
        for n in &neighbors {
            ensure!(n.neighbors().contains(&board), "Asymmetric neighbor:\n{n}");
        }

        let mut got = format!("{input}\n\n{SEPARATOR}");
        writeln!(got, "dimension = {}", board.dimension()).unwrap();
        writeln!(got, "hamming = {}", board.hamming()).unwrap();
        writeln!(got, "manhattan = {}", board.manhattan()).unwrap();
        writeln!(got, "goal = {}", board.is_goal()).unwrap();
        writeln!(got, "\ntwin:\n{twin}").unwrap();
        writeln!(got, "neighbors:").unwrap();
        for n in &neighbors {
            writeln!(got, "{n}").unwrap();
        }
        Ok(got)
    });
}
