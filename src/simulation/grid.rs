use std::fmt;

use rand::Rng;

use crate::error::{Error, Result};
use crate::simulation::cell::CellState;
use crate::simulation::pattern::Pattern;

/// Fixed-size row-major buffer of cells
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    /// `None` once the grid has been destroyed
    cells: Option<Vec<CellState>>,
    width: usize,
    height: usize,
}

impl Grid {
    /// Create a grid with every cell dead.
    ///
    /// Panics if `width * height` overflows; use [`Grid::try_new`] for untrusted sizes.
    pub fn new(width: usize, height: usize) -> Self {
        match Self::try_new(width, height) {
            Ok(grid) => grid,
            Err(e) => panic!("{}", e),
        }
    }

    pub fn try_new(width: usize, height: usize) -> Result<Self> {
        let len = width
            .checked_mul(height)
            .ok_or(Error::GridTooLarge { width, height })?;
        Ok(Self {
            cells: Some(vec![CellState::Dead; len]),
            width,
            height,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Release the cell buffer. Calling it again is a no-op.
    pub fn destroy(&mut self) {
        self.cells = None;
    }

    pub fn is_destroyed(&self) -> bool {
        self.cells.is_none()
    }

    pub(crate) fn ensure_live(&self) -> Result<()> {
        if self.is_destroyed() {
            Err(Error::Destroyed)
        } else {
            Ok(())
        }
    }

    /// Set every cell dead
    pub fn clear(&mut self) {
        self.cells_mut().fill(CellState::Dead);
    }

    /// Clear the grid and copy `pattern` into its centre.
    ///
    /// The grid is left all dead when the pattern does not fit.
    pub fn stamp(&mut self, pattern: &Pattern) -> Result<()> {
        self.ensure_live()?;
        self.clear();

        if pattern.cols() > self.width || pattern.rows() > self.height {
            return Err(Error::PatternTooLarge {
                name: pattern.name().to_string(),
                cols: pattern.cols(),
                rows: pattern.rows(),
                width: self.width,
                height: self.height,
            });
        }

        let start_x = (self.width - pattern.cols()) / 2;
        let start_y = (self.height - pattern.rows()) / 2;
        let width = self.width;
        let cells = self.cells_mut();
        for y in 0..pattern.rows() {
            if let Some(row) = pattern.row(y) {
                let offset = (start_y + y) * width + start_x;
                cells[offset..offset + row.len()].copy_from_slice(row);
            }
        }

        log::debug!(
            "Stamped {:?} ({}x{}) at ({}, {})",
            pattern.name(),
            pattern.cols(),
            pattern.rows(),
            start_x,
            start_y
        );
        Ok(())
    }

    /// Cell at column `x`, row `y`
    pub fn read(&self, x: usize, y: usize) -> Result<CellState> {
        self.ensure_live()?;
        if x >= self.width || y >= self.height {
            return Err(Error::OutOfRange {
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }
        Ok(self.cells()[y * self.width + x])
    }

    /// Fill every cell alive with probability `density`
    pub fn randomize<R: Rng>(&mut self, rng: &mut R, density: f64) {
        let density = density.clamp(0.0, 1.0);
        for cell in self.cells_mut() {
            *cell = CellState::from(rng.gen_bool(density));
        }
    }

    /// Row-major cells; empty once destroyed
    pub fn cells(&self) -> &[CellState] {
        self.cells.as_deref().unwrap_or(&[])
    }

    pub(crate) fn cells_mut(&mut self) -> &mut [CellState] {
        self.cells.as_deref_mut().unwrap_or(&mut [])
    }

    /// Raw byte view of the cells (0 = dead, 1 = alive) for upload to a renderer
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(self.cells())
    }

    pub fn row(&self, y: usize) -> Option<&[CellState]> {
        if y < self.height && !self.is_destroyed() {
            Some(&self.cells()[y * self.width..(y + 1) * self.width])
        } else {
            None
        }
    }

    /// Number of live cells
    pub fn population(&self) -> usize {
        self.cells().iter().filter(|c| c.is_alive()).count()
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.width == 0 {
            return Ok(());
        }
        for row in self.cells().chunks_exact(self.width) {
            for cell in row {
                write!(f, "{}", cell)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
