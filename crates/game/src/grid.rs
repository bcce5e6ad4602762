use std::sync::OnceLock;

use shared::domain::{CellState, PlayerIndex, COLS, ROWS, WIN_LENGTH};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("column {column} is full")]
    ColumnFull { column: usize },
    #[error("column {column} is outside the board (0..{cols})", cols = COLS)]
    ColumnOutOfRange { column: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WinLine {
    Horizontal,
    Vertical,
    Ascending,
    Descending,
}

/// Where a disc landed and which scans reported a completed line for its owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub row: usize,
    pub column: usize,
    pub player: PlayerIndex,
    pub lines: Vec<WinLine>,
}

impl Placement {
    pub fn is_win(&self) -> bool {
        !self.lines.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Diagonal {
    /// Up and to the right.
    Ascending,
    /// Up and to the left.
    Descending,
}

impl Diagonal {
    fn step(self, (row, col): (usize, usize)) -> Option<(usize, usize)> {
        let row = row.checked_sub(1)?;
        let col = match self {
            Diagonal::Ascending => col + 1,
            Diagonal::Descending => col.checked_sub(1)?,
        };
        (col < COLS).then_some((row, col))
    }

    fn step_back(self, (row, col): (usize, usize)) -> Option<(usize, usize)> {
        let row = row + 1;
        let col = match self {
            Diagonal::Ascending => col.checked_sub(1)?,
            Diagonal::Descending => col + 1,
        };
        (row < ROWS && col < COLS).then_some((row, col))
    }

    fn walk(self, from: (usize, usize)) -> impl Iterator<Item = (usize, usize)> {
        std::iter::successors(Some(from), move |&pos| self.step(pos))
    }

    /// Number of cells on the diagonal running through `pos`.
    fn length_through(self, pos: (usize, usize)) -> usize {
        let behind = std::iter::successors(self.step_back(pos), |&p| self.step_back(p)).count();
        behind + self.walk(pos).count()
    }

    fn line(self) -> WinLine {
        match self {
            Diagonal::Ascending => WinLine::Ascending,
            Diagonal::Descending => WinLine::Descending,
        }
    }
}

/// Bottom end of every diagonal long enough to hold a winning line.
///
/// Derived from the board constants so a different shape regenerates the
/// enumeration instead of reusing it. For 6x9 with lines of five this yields
/// (4,0),(5,0..=4) ascending and (4,8),(5,8..=4) descending.
fn diagonal_anchors(direction: Diagonal) -> &'static [(usize, usize)] {
    static ASCENDING: OnceLock<Vec<(usize, usize)>> = OnceLock::new();
    static DESCENDING: OnceLock<Vec<(usize, usize)>> = OnceLock::new();

    let cell = match direction {
        Diagonal::Ascending => &ASCENDING,
        Diagonal::Descending => &DESCENDING,
    };
    cell.get_or_init(|| {
        (0..ROWS)
            .flat_map(|row| (0..COLS).map(move |col| (row, col)))
            .filter(|&pos| direction.step_back(pos).is_none())
            .filter(|&pos| direction.walk(pos).count() >= WIN_LENGTH)
            .collect()
    })
}

/// True for cells that lie on no diagonal of winning length in either direction.
pub fn diagonal_line_impossible(row: usize, column: usize) -> bool {
    [Diagonal::Ascending, Diagonal::Descending]
        .into_iter()
        .all(|direction| direction.length_through((row, column)) < WIN_LENGTH)
}

pub fn classify_symbol(cell: CellState) -> &'static str {
    match cell {
        CellState::Empty => " ",
        CellState::Disc(PlayerIndex::First) => "x",
        CellState::Disc(PlayerIndex::Second) => "o",
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    cells: [[CellState; COLS]; ROWS],
}

impl Default for Grid {
    fn default() -> Self {
        Self::new()
    }
}

impl Grid {
    pub fn new() -> Self {
        Self {
            cells: [[CellState::Empty; COLS]; ROWS],
        }
    }

    /// Row 0 is the top of the board.
    pub fn cell(&self, row: usize, column: usize) -> Option<CellState> {
        self.cells.get(row)?.get(column).copied()
    }

    pub fn reset(&mut self) {
        self.cells = [[CellState::Empty; COLS]; ROWS];
    }

    pub fn is_empty(&self) -> bool {
        self.cells
            .iter()
            .flatten()
            .all(|cell| *cell == CellState::Empty)
    }

    pub fn render(&self) -> String {
        let mut text = String::with_capacity(ROWS * (COLS * 3 + 1));
        for row in &self.cells {
            for cell in row {
                text.push('[');
                text.push_str(classify_symbol(*cell));
                text.push(']');
            }
            text.push('\n');
        }
        text
    }

    pub fn drop_disc(&mut self, column: usize, player: PlayerIndex) -> Result<Placement, GridError> {
        if column >= COLS {
            return Err(GridError::ColumnOutOfRange { column });
        }

        let Some(row) = (0..ROWS)
            .rev()
            .find(|&row| self.cells[row][column] == CellState::Empty)
        else {
            debug!(column, ?player, "column is full; disc not placed");
            return Err(GridError::ColumnFull { column });
        };

        self.cells[row][column] = CellState::Disc(player);
        let lines = self.winning_lines(row, column, player);
        debug!(row, column, ?player, "disc placed");
        if !lines.is_empty() {
            info!(row, column, ?player, ?lines, "winning line completed");
        }

        Ok(Placement {
            row,
            column,
            player,
            lines,
        })
    }

    /// Runs every scan independently; each completed window is reported, so a
    /// single move may yield several entries for the same player.
    fn winning_lines(&self, row: usize, column: usize, player: PlayerIndex) -> Vec<WinLine> {
        let mut lines = Vec::new();
        lines.extend(self.search_horizontally(row, player));
        lines.extend(self.search_vertically(row, column, player));
        if !diagonal_line_impossible(row, column) {
            lines.extend(self.search_diagonal(Diagonal::Ascending, player));
            lines.extend(self.search_diagonal(Diagonal::Descending, player));
        }
        lines
    }

    fn search_horizontally(&self, row: usize, player: PlayerIndex) -> Vec<WinLine> {
        count_runs(self.cells[row].iter().copied(), player)
            .map(|_| WinLine::Horizontal)
            .collect()
    }

    /// A new disc is always the top of its stack, so a single window from
    /// `row` downward is the only vertical candidate.
    fn search_vertically(&self, row: usize, column: usize, player: PlayerIndex) -> Option<WinLine> {
        if row > ROWS - WIN_LENGTH {
            return None;
        }
        (row..row + WIN_LENGTH)
            .all(|r| self.cells[r][column].is_disc_of(player))
            .then_some(WinLine::Vertical)
    }

    fn search_diagonal(&self, direction: Diagonal, player: PlayerIndex) -> Vec<WinLine> {
        diagonal_anchors(direction)
            .iter()
            .flat_map(move |&anchor| {
                count_runs(
                    direction.walk(anchor).map(move |(r, c)| self.cells[r][c]),
                    player,
                )
            })
            .map(|_| direction.line())
            .collect()
    }
}

/// Yields once for every point where the running count of consecutive
/// `player` discs reaches `WIN_LENGTH`.
fn count_runs(
    cells: impl Iterator<Item = CellState>,
    player: PlayerIndex,
) -> impl Iterator<Item = ()> {
    cells
        .scan(0usize, move |counter, cell| {
            *counter = if cell.is_disc_of(player) { *counter + 1 } else { 0 };
            Some(*counter == WIN_LENGTH)
        })
        .filter(|reached| *reached)
        .map(|_| ())
}

#[cfg(test)]
#[path = "tests/grid_tests.rs"]
mod tests;
