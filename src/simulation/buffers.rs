use crate::error::Result;
use crate::simulation::engine::Engine;
use crate::simulation::grid::Grid;
use crate::simulation::pattern::Pattern;

/// Ping-pong pair of grids. One is read while the other is written, then the roles flip.
#[derive(Debug)]
pub struct GridBuffers {
    /// Grid A - ping
    grid_a: Grid,
    /// Grid B - pong
    grid_b: Grid,
    /// Which grid is current (true = A is read, B is written)
    read_from_a: bool,
    generation: u64,
}

impl GridBuffers {
    pub fn new(width: usize, height: usize) -> Result<Self> {
        Ok(Self {
            grid_a: Grid::try_new(width, height)?,
            grid_b: Grid::try_new(width, height)?,
            read_from_a: true,
            generation: 0,
        })
    }

    /// The generation a renderer should display
    pub fn current(&self) -> &Grid {
        if self.read_from_a {
            &self.grid_a
        } else {
            &self.grid_b
        }
    }

    /// Get (current, next) for a step
    pub fn io_buffers(&mut self) -> (&Grid, &mut Grid) {
        if self.read_from_a {
            (&self.grid_a, &mut self.grid_b)
        } else {
            (&self.grid_b, &mut self.grid_a)
        }
    }

    /// Exchange the roles of the two grids without moving any cells
    pub fn swap(&mut self) {
        self.read_from_a = !self.read_from_a;
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Seed the current grid with `pattern` and restart the generation count
    pub fn stamp(&mut self, pattern: &Pattern) -> Result<()> {
        let result = if self.read_from_a {
            self.grid_a.stamp(pattern)
        } else {
            self.grid_b.stamp(pattern)
        };
        self.generation = 0;
        result
    }

    /// Step once and swap. On failure nothing is swapped.
    pub fn advance(&mut self, engine: &Engine) -> Result<()> {
        let (current, next) = self.io_buffers();
        engine.step(current, next)?;
        self.swap();
        self.generation += 1;
        Ok(())
    }
}
