use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::error::Error;
use std::fmt::{self, Display, Formatter};
use std::sync::atomic::{AtomicBool, Ordering};

use log::{debug, info, trace};

use crate::Board;

type IndexSet<K> = indexmap::IndexSet<K, fxhash::FxBuildHasher>;

// Expansions per search between two checks of the race outcome.
const RACE_SLICE: usize = 1024;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    /// Upper bound on expansions per search. `None` searches until an outcome.
    pub max_expansions: Option<usize>,
    /// Run the original and the twin search on separate rayon workers.
    pub parallel: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SolveError {
    LimitExceeded { expansions: usize },
}

impl Display for SolveError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match *self {
            SolveError::LimitExceeded { expansions } => write!(
                f,
                "No outcome after {expansions} expansions on either search"
            ),
        }
    }
}

impl Error for SolveError {}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    pub expanded: usize,
    pub peak_frontier: usize,
    pub distinct_boards: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    pub original: SearchStats,
    pub twin: SearchStats,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
struct NodeId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct BoardId(usize);

#[derive(Debug, Clone, Copy)]
struct Node {
    board: BoardId,
    parent: Option<NodeId>,
    moves: u32,
    priority: u32,
}

enum Step {
    Goal(NodeId),
    Expanded,
}

enum Race {
    Won(NodeId),
    Lost,
    Paused,
    LimitExceeded,
}

/// Best-first search from one root.
///
/// Nodes are never removed from the arena, so the parent chain of any popped
/// node stays reachable. Boards are interned and nodes refer to them by index.
struct Search {
    boards: IndexSet<Board>,
    nodes: Vec<Node>,
    // Ties on priority go to the older node.
    frontier: BinaryHeap<Reverse<(u32, NodeId)>>,
    expanded: usize,
    peak_frontier: usize,
}

impl Search {
    fn new(root: Board) -> Self {
        let mut search = Self {
            boards: IndexSet::default(),
            nodes: Vec::new(),
            frontier: BinaryHeap::new(),
            expanded: 0,
            peak_frontier: 0,
        };
        let (idx, _) = search.boards.insert_full(root);
        search.push(BoardId(idx), None, 0);
        search
    }

    fn push(&mut self, board: BoardId, parent: Option<NodeId>, moves: u32) {
        let priority = moves + self.boards[board.0].manhattan();
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            board,
            parent,
            moves,
            priority,
        });
        self.frontier.push(Reverse((priority, id)));
        self.peak_frontier = self.peak_frontier.max(self.frontier.len());
    }

    fn step(&mut self) -> Step {
        #[cfg(feature = "coz")]
        coz::scope!("Expand");

        // Every board has at least two neighbors and only the parent is skipped.
        let Reverse((_, id)) = self.frontier.pop().expect("Frontier never drains");
        let node = self.nodes[id.0];
        let board = &self.boards[node.board.0];
        if board.is_goal() {
            return Step::Goal(id);
        }
        trace!(
            "Expanding node {} (moves {}, priority {})",
            id.0,
            node.moves,
            node.priority
        );

        let neighbors = board.neighbors();
        let parent_board = node.parent.map(|parent| self.nodes[parent.0].board);
        for next in neighbors {
            let (idx, _) = self.boards.insert_full(next);
            if parent_board == Some(BoardId(idx)) {
                continue;
            }
            self.push(BoardId(idx), Some(id), node.moves + 1);
        }
        self.expanded += 1;

        #[cfg(feature = "coz")]
        coz::progress!("Step");

        Step::Expanded
    }

    fn at_limit(&self, max_expansions: Option<usize>) -> bool {
        max_expansions.is_some_and(|max| self.expanded >= max)
    }

    /// Steps until the goal, the limit, the end of the slice, or until the
    /// other search has finished.
    fn race(
        &mut self,
        slice: usize,
        max_expansions: Option<usize>,
        finished: &AtomicBool,
        on_step: &(impl Fn() + Sync),
    ) -> Race {
        for _ in 0..slice {
            if finished.load(Ordering::Acquire) {
                return Race::Lost;
            }
            if self.at_limit(max_expansions) {
                return Race::LimitExceeded;
            }
            match self.step() {
                Step::Goal(id) => {
                    return match finished.compare_exchange(
                        false,
                        true,
                        Ordering::AcqRel,
                        Ordering::Acquire,
                    ) {
                        Ok(_) => Race::Won(id),
                        Err(_) => Race::Lost,
                    };
                }
                Step::Expanded => on_step(),
            }
        }
        Race::Paused
    }

    /// Boards from the root to `id`, inclusive.
    fn path(&self, id: NodeId) -> Vec<Board> {
        let mut path = std::iter::successors(Some(id), |&i| self.nodes[i.0].parent)
            .map(|i| self.boards[self.nodes[i.0].board.0].clone())
            .collect::<Vec<_>>();
        path.reverse();
        path
    }

    fn stats(&self) -> SearchStats {
        SearchStats {
            expanded: self.expanded,
            peak_frontier: self.peak_frontier,
            distinct_boards: self.boards.len(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Original = 0,
    Twin = 1,
}

impl Side {
    fn other(self) -> Self {
        match self {
            Side::Original => Side::Twin,
            Side::Twin => Side::Original,
        }
    }
}

/// Shortest solution of a sliding puzzle, or proof that there is none.
///
/// The board and its twin are searched side by side with A* on the Manhattan
/// distance. Exactly one of them is solvable, so whichever reaches the goal
/// first decides the outcome.
#[derive(Debug, Clone)]
pub struct Solver {
    solution: Option<Vec<Board>>,
    moves: Option<usize>,
    stats: Stats,
}

impl Solver {
    /// Solves `initial` without any bound on the search.
    pub fn new(initial: Board) -> Self {
        let mut searches = searches(initial);
        // Without a limit `lockstep` only returns with a winner.
        let winner = loop {
            if let Some(winner) = lockstep(&mut searches, None, &|| {}) {
                break winner;
            }
        };
        Self::from_winner(&searches, winner)
    }

    /// Solves `initial`, calling `on_step` after every expansion.
    pub fn with_config(
        initial: Board,
        config: &Config,
        on_step: impl Fn() + Sync,
    ) -> Result<Self, SolveError> {
        let mut searches = searches(initial);
        let max = config.max_expansions;

        let winner = if config.parallel {
            race(&mut searches, max, &on_step)
        } else {
            lockstep(&mut searches, max, &on_step)
        };

        match winner {
            Some(winner) => Ok(Self::from_winner(&searches, winner)),
            None => {
                let stats = stats_of(&searches);
                info!("Gave up: {stats:?}");
                Err(SolveError::LimitExceeded {
                    expansions: stats.original.expanded.max(stats.twin.expanded),
                })
            }
        }
    }

    fn from_winner(searches: &[Search; 2], (side, id): (Side, NodeId)) -> Self {
        let stats = stats_of(searches);
        let solver = match side {
            Side::Original => {
                let search = &searches[Side::Original as usize];
                Self {
                    solution: Some(search.path(id)),
                    moves: Some(search.nodes[id.0].moves as usize),
                    stats,
                }
            }
            Side::Twin => Self {
                solution: None,
                moves: None,
                stats,
            },
        };

        info!(
            "{}: {:?}",
            match solver.moves {
                Some(moves) => format!("Solved in {moves} moves"),
                None => "Unsolvable".to_owned(),
            },
            solver.stats,
        );
        solver
    }

    pub fn is_solvable(&self) -> bool {
        self.solution.is_some()
    }

    /// Minimum number of slides, or `None` if the board cannot be solved.
    pub fn moves(&self) -> Option<usize> {
        self.moves
    }

    /// Boards from the initial one to the goal, both included.
    pub fn solution(&self) -> Option<&[Board]> {
        self.solution.as_deref()
    }

    pub fn into_solution(self) -> Option<Vec<Board>> {
        self.solution
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }
}

fn searches(initial: Board) -> [Search; 2] {
    debug!(
        "Solving {n}x{n} board with manhattan {}, hamming {}",
        initial.manhattan(),
        initial.hamming(),
        n = initial.dimension(),
    );
    let twin = initial.twin();
    [Search::new(initial), Search::new(twin)]
}

fn stats_of(searches: &[Search; 2]) -> Stats {
    Stats {
        original: searches[Side::Original as usize].stats(),
        twin: searches[Side::Twin as usize].stats(),
    }
}

/// Runs both searches in slices of `RACE_SLICE` expansions through
/// `rayon::join`. Every join returns after bounded work, so a search that can
/// never reach its goal cannot starve the other one, even on a single worker.
fn race(
    searches: &mut [Search; 2],
    max_expansions: Option<usize>,
    on_step: &(impl Fn() + Sync),
) -> Option<(Side, NodeId)> {
    let finished = AtomicBool::new(false);
    let [original, twin] = searches;
    loop {
        let (a, b) = rayon::join(
            || original.race(RACE_SLICE, max_expansions, &finished, on_step),
            || twin.race(RACE_SLICE, max_expansions, &finished, on_step),
        );
        match (a, b) {
            (Race::Won(id), _) => return Some((Side::Original, id)),
            (_, Race::Won(id)) => return Some((Side::Twin, id)),
            (Race::LimitExceeded, Race::LimitExceeded) => return None,
            // A search only loses to a winner of the same round.
            (Race::Paused | Race::LimitExceeded | Race::Lost, _) => {}
        }
    }
}

/// Alternates single expansions, original first. A search that hits the limit
/// sits out while the other keeps going.
fn lockstep(
    searches: &mut [Search; 2],
    max_expansions: Option<usize>,
    on_step: &impl Fn(),
) -> Option<(Side, NodeId)> {
    let mut side = Side::Original;
    loop {
        if searches.iter().all(|s| s.at_limit(max_expansions)) {
            return None;
        }
        let search = &mut searches[side as usize];
        if !search.at_limit(max_expansions) {
            match search.step() {
                Step::Goal(id) => return Some((side, id)),
                Step::Expanded => on_step(),
            }
        }
        side = side.other();
    }
}
