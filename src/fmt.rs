use std::fmt;

use crate::{Board, Solver};

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.dimension())?;
        for row in self.rows() {
            for tile in row {
                write!(f, "{tile:2} ")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// The move count followed by every board on the path, or a notice that
/// the board cannot be solved.
impl fmt::Display for Solver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (Some(moves), Some(path)) = (self.moves(), self.solution()) else {
            return writeln!(f, "No solution possible");
        };
        writeln!(f, "Minimum number of moves = {moves}")?;
        for board in path {
            writeln!(f, "{board}")?;
        }
        Ok(())
    }
}
