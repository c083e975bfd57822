use std::error::Error;
use std::fmt::{self as std_fmt, Display, Formatter};
use std::hash::{Hash, Hasher};
use std::ops::Index;
use std::sync::OnceLock;

use arrayvec::ArrayVec;

mod fmt;
mod parse;
pub mod solve;

pub use solve::Solver;

pub type Tile = u16;

pub const BLANK: Tile = 0;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BoardError {
    Empty,
    TooSmall { dimension: usize },
    TooLarge { dimension: usize },
    NotSquare { row: usize, len: usize, dimension: usize },
    WrongTileCount { got: usize, expected: usize },
    TileOutOfRange { tile: Tile, max: Tile },
    DuplicateTile { tile: Tile },
}

impl Display for BoardError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std_fmt::Result {
        match *self {
            BoardError::Empty => write!(f, "Board has no rows"),
            BoardError::TooSmall { dimension } => {
                write!(f, "Board dimension {dimension} is too small, need at least 2")
            }
            BoardError::TooLarge { dimension } => {
                write!(f, "Board dimension {dimension} does not fit the tile range")
            }
            BoardError::NotSquare {
                row,
                len,
                dimension,
            } => write!(f, "Row {row} has {len} tiles, expecting {dimension}"),
            BoardError::WrongTileCount { got, expected } => {
                write!(f, "Got {got} tiles, expecting {expected}")
            }
            BoardError::TileOutOfRange { tile, max } => {
                write!(f, "Tile {tile} out of range, expecting at most {max}")
            }
            BoardError::DuplicateTile { tile } => write!(f, "Tile {tile} appears more than once"),
        }
    }
}

impl Error for BoardError {}

/// Slide directions of the blank, in neighbor generation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Left = 0,
    Right,
    Up,
    Down,
}

impl Direction {
    pub const ALL: [Self; 4] = [Self::Left, Self::Right, Self::Up, Self::Down];

    pub fn reversed(self) -> Self {
        match self {
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
        }
    }
}

/// One arrangement of an N-by-N sliding puzzle.
///
/// Immutable once built. Distances to the goal are computed on first use and
/// cached for the lifetime of the instance.
#[derive(Debug, Clone)]
pub struct Board {
    dimension: usize,
    grid: Box<[Tile]>,
    blank: usize,
    hamming: OnceLock<u32>,
    manhattan: OnceLock<u32>,
}

impl PartialEq for Board {
    fn eq(&self, other: &Self) -> bool {
        self.dimension == other.dimension && self.grid == other.grid
    }
}
impl Eq for Board {}

impl Hash for Board {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.dimension.hash(state);
        self.grid.hash(state);
    }
}

impl Index<(usize, usize)> for Board {
    type Output = Tile;
    fn index(&self, (row, col): (usize, usize)) -> &Self::Output {
        &self.grid[row * self.dimension + col]
    }
}

impl Board {
    /// Builds a board from its rows. The dimension is the number of rows.
    pub fn new(rows: Vec<Vec<Tile>>) -> Result<Self, BoardError> {
        let dimension = rows.len();
        if dimension == 0 {
            return Err(BoardError::Empty);
        }
        if let Some((row, r)) = rows.iter().enumerate().find(|(_, r)| r.len() != dimension) {
            return Err(BoardError::NotSquare {
                row,
                len: r.len(),
                dimension,
            });
        }
        let tiles = rows.into_iter().flatten().collect::<Vec<_>>();
        Self::from_tiles(dimension, &tiles)
    }

    /// Builds a board from `dimension * dimension` tiles in row-major order.
    pub fn from_tiles(dimension: usize, tiles: &[Tile]) -> Result<Self, BoardError> {
        let area = Self::area(dimension)?;
        if tiles.len() != area {
            return Err(BoardError::WrongTileCount {
                got: tiles.len(),
                expected: area,
            });
        }

        let max = (area - 1) as Tile;
        let mut seen = vec![false; area];
        for &tile in tiles {
            if tile > max {
                return Err(BoardError::TileOutOfRange { tile, max });
            }
            if std::mem::replace(&mut seen[tile as usize], true) {
                return Err(BoardError::DuplicateTile { tile });
            }
        }

        // A full permutation of 0..area always holds the blank.
        let blank = tiles
            .iter()
            .position(|&tile| tile == BLANK)
            .ok_or(BoardError::DuplicateTile { tile: max })?;
        Ok(Self::from_grid(dimension, tiles.into(), blank))
    }

    /// The solved arrangement: tiles in row-major order, blank last.
    pub fn goal(dimension: usize) -> Result<Self, BoardError> {
        let area = Self::area(dimension)?;
        // `area` fits the tile range, so the casts are lossless.
        let grid = (1..area)
            .map(|tile| tile as Tile)
            .chain([BLANK])
            .collect::<Box<[_]>>();
        Ok(Self::from_grid(dimension, grid, area - 1))
    }

    /// Number of cells of a board with this dimension, if such a board is valid.
    fn area(dimension: usize) -> Result<usize, BoardError> {
        match dimension {
            0 => Err(BoardError::Empty),
            1 => Err(BoardError::TooSmall { dimension }),
            _ => dimension
                .checked_mul(dimension)
                .filter(|&area| area <= Tile::MAX as usize + 1)
                .ok_or(BoardError::TooLarge { dimension }),
        }
    }

    fn from_grid(dimension: usize, grid: Box<[Tile]>, blank: usize) -> Self {
        Self {
            dimension,
            grid,
            blank,
            hamming: OnceLock::new(),
            manhattan: OnceLock::new(),
        }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn get(&self, row: usize, col: usize) -> Option<Tile> {
        if row < self.dimension && col < self.dimension {
            Some(self[(row, col)])
        } else {
            None
        }
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Tile]> + '_ {
        self.grid.chunks(self.dimension)
    }

    /// Position of the blank as `(row, col)`.
    pub fn blank(&self) -> (usize, usize) {
        (self.blank / self.dimension, self.blank % self.dimension)
    }

    fn tiles(&self) -> impl Iterator<Item = ((usize, usize), Tile)> + '_ {
        let n = self.dimension;
        self.grid
            .iter()
            .enumerate()
            .map(move |(idx, &tile)| ((idx / n, idx % n), tile))
            .filter(|&(_, tile)| tile != BLANK)
    }

    fn home(&self, tile: Tile) -> (usize, usize) {
        let idx = tile as usize - 1;
        (idx / self.dimension, idx % self.dimension)
    }

    /// Number of tiles out of place, blank excluded.
    pub fn hamming(&self) -> u32 {
        *self.hamming.get_or_init(|| {
            self.tiles()
                .filter(|&(pos, tile)| self.home(tile) != pos)
                .count() as u32
        })
    }

    /// Sum of the grid distances between every tile and its home.
    pub fn manhattan(&self) -> u32 {
        *self.manhattan.get_or_init(|| {
            self.tiles()
                .map(|((row, col), tile)| {
                    let (goal_row, goal_col) = self.home(tile);
                    (row.abs_diff(goal_row) + col.abs_diff(goal_col)) as u32
                })
                .sum()
        })
    }

    pub fn is_goal(&self) -> bool {
        self.manhattan() == 0
    }

    fn sibling_pos(&self, pos: (usize, usize), dir: Direction) -> Option<(usize, usize)> {
        const DIRECTIONS: [(isize, isize); 4] = [(0, -1), (0, 1), (-1, 0), (1, 0)];
        let (dr, dc) = DIRECTIONS[dir as usize];
        let row = pos.0.checked_add_signed(dr)?;
        let col = pos.1.checked_add_signed(dc)?;
        if self.dimension <= row || self.dimension <= col {
            return None;
        }
        Some((row, col))
    }

    fn swapped(&self, a: (usize, usize), b: (usize, usize)) -> Self {
        let n = self.dimension;
        let (a, b) = (a.0 * n + a.1, b.0 * n + b.1);
        let mut grid = self.grid.clone();
        grid.swap(a, b);
        let blank = if self.blank == a {
            b
        } else if self.blank == b {
            a
        } else {
            self.blank
        };
        Self::from_grid(n, grid, blank)
    }

    /// The board after sliding the blank one cell in `dir`, if it stays on the grid.
    pub fn slide(&self, dir: Direction) -> Option<Self> {
        let blank = self.blank();
        let target = self.sibling_pos(blank, dir)?;
        Some(self.swapped(blank, target))
    }

    /// Every board one slide away: blank moved left, right, up, then down.
    pub fn neighbors(&self) -> ArrayVec<Self, 4> {
        Direction::ALL
            .into_iter()
            .filter_map(|dir| self.slide(dir))
            .collect()
    }

    /// This board with one pair of non-blank tiles exchanged.
    ///
    /// Solvable exactly when `self` is not.
    pub fn twin(&self) -> Self {
        let (a, b) = match (self.blank(), self.dimension) {
            ((0, 0), 2) => ((0, 1), (1, 1)),
            ((0, 0), _) => ((0, 1), (0, 2)),
            ((0, 1), 2) => ((0, 0), (1, 0)),
            ((0, 1), _) => ((0, 0), (0, 2)),
            _ => ((0, 0), (0, 1)),
        };
        self.swapped(a, b)
    }
}
