use std::str::FromStr;

use anyhow::{bail, ensure, Context, Result};

use crate::{Board, Tile};

impl FromStr for Board {
    type Err = anyhow::Error;

    /// Reads the dimension `N` followed by `N * N` tiles in row-major order,
    /// all separated by whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut tokens = s.split_whitespace();

        let dimension = tokens
            .next()
            .context("Missing board dimension")?
            .parse::<usize>()
            .context("Invalid board dimension")?;
        ensure!(dimension != 0, "Board dimension must be positive");
        let area = dimension
            .checked_mul(dimension)
            .context("Board dimension overflow")?;

        let mut tiles = Vec::with_capacity(area.min(1 << 16));
        for i in 0..area {
            let (row, col) = (i / dimension, i % dimension);
            let tile = tokens
                .next()
                .with_context(|| format!("Missing tile at row {row}, column {col}"))?
                .parse::<Tile>()
                .with_context(|| format!("Invalid tile at row {row}, column {col}"))?;
            tiles.push(tile);
        }
        if let Some(extra) = tokens.next() {
            bail!("Unexpected trailing input: {extra:?}");
        }

        Board::from_tiles(dimension, &tiles).context("Invalid board")
    }
}
