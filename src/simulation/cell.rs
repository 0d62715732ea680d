use std::fmt;

/// State of one grid position.
///
/// Layout: one byte per cell (`Dead = 0`, `Alive = 1`) so a whole grid can be
/// handed to a renderer as a byte slice.
#[repr(u8)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, bytemuck::NoUninit)]
pub enum CellState {
    #[default]
    Dead = 0,
    Alive = 1,
}

impl CellState {
    /// Map a catalog body character; anything other than `.` or `*` is rejected
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '.' => Some(CellState::Dead),
            '*' => Some(CellState::Alive),
            _ => None,
        }
    }

    pub fn to_char(self) -> char {
        match self {
            CellState::Dead => '.',
            CellState::Alive => '*',
        }
    }

    #[inline]
    pub fn is_alive(self) -> bool {
        self == CellState::Alive
    }

    /// Game of Life rule: survive on 2, born or survive on 3
    #[inline]
    pub fn next(self, alive_neighbors: u8) -> Self {
        if (self.is_alive() && alive_neighbors == 2) || alive_neighbors == 3 {
            CellState::Alive
        } else {
            CellState::Dead
        }
    }
}

impl From<bool> for CellState {
    fn from(alive: bool) -> Self {
        if alive {
            CellState::Alive
        } else {
            CellState::Dead
        }
    }
}

impl fmt::Display for CellState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_char())
    }
}
