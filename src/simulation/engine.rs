//! Generation stepping.
//!
//! The grid is split into rectangular tiles. The `next` buffer is cut into
//! horizontal bands one tile high, and each band's rows are cut into column
//! segments, so every tile owns a disjoint set of `&mut` row segments. rayon
//! evaluates the tiles concurrently while every worker reads the same immutable
//! `current` grid. The outermost ring of cells is always written dead.

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::config::TILE_SIZE;
use crate::error::{Error, Result};
use crate::simulation::cell::CellState;
use crate::simulation::grid::Grid;

/// Rectangular block of cells evaluated by one unit of work
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tile {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

/// Cover a `width` x `height` grid with tiles of at most `tile_width` x `tile_height`
pub fn tiles(width: usize, height: usize, tile_width: usize, tile_height: usize) -> Vec<Tile> {
    let (tw, th) = (tile_width.max(1), tile_height.max(1));
    let mut out = Vec::new();
    for y in (0..height).step_by(th) {
        for x in (0..width).step_by(tw) {
            out.push(Tile {
                x,
                y,
                width: tw.min(width - x),
                height: th.min(height - y),
            });
        }
    }
    out
}

/// Parallel Game of Life stepper
#[derive(Debug)]
pub struct Engine {
    tile_width: usize,
    tile_height: usize,
    /// Dedicated worker pool; `None` runs on rayon's global pool
    pool: Option<ThreadPool>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(TILE_SIZE, TILE_SIZE)
    }
}

impl Engine {
    pub fn new(tile_width: usize, tile_height: usize) -> Self {
        Self {
            tile_width: tile_width.max(1),
            tile_height: tile_height.max(1),
            pool: None,
        }
    }

    /// Run sweeps on a dedicated pool of `threads` workers (0 keeps the global pool)
    pub fn with_threads(mut self, threads: usize) -> Result<Self> {
        if threads > 0 {
            let pool = ThreadPoolBuilder::new()
                .num_threads(threads)
                .thread_name(|i| format!("lifex-worker-{}", i))
                .build()?;
            log::info!("Engine using {} worker threads", threads);
            self.pool = Some(pool);
        }
        Ok(self)
    }

    pub fn tile_size(&self) -> (usize, usize) {
        (self.tile_width, self.tile_height)
    }

    /// Compute the generation after `current` into `next`.
    ///
    /// Every cell of `next` is overwritten. Returns only after all workers finish.
    pub fn step(&self, current: &Grid, next: &mut Grid) -> Result<()> {
        check_buffers(current, next)?;
        match &self.pool {
            Some(pool) => pool.install(|| self.sweep(current, next)),
            None => self.sweep(current, next),
        }
        Ok(())
    }

    fn sweep(&self, current: &Grid, next: &mut Grid) {
        let (width, height) = current.dimensions();
        if width == 0 || height == 0 {
            return;
        }

        // tiles never exceed the grid, so the band length cannot overflow
        let tile_width = self.tile_width.min(width);
        let tile_height = self.tile_height.min(height);
        next.cells_mut()
            .par_chunks_mut(width * tile_height)
            .enumerate()
            .for_each(|(band, slab)| {
                let y = band * tile_height;
                let mut columns: Vec<Vec<&mut [CellState]>> = Vec::new();
                for row in slab.chunks_mut(width) {
                    for (i, segment) in row.chunks_mut(tile_width).enumerate() {
                        if columns.len() <= i {
                            columns.push(Vec::with_capacity(tile_height));
                        }
                        columns[i].push(segment);
                    }
                }

                columns
                    .into_par_iter()
                    .enumerate()
                    .for_each(|(i, segments)| {
                        let x = i * tile_width;
                        for (dy, segment) in segments.into_iter().enumerate() {
                            for (dx, cell) in segment.iter_mut().enumerate() {
                                *cell = next_cell(current, x + dx, y + dy);
                            }
                        }
                    });
            });
    }
}

/// Single-threaded reference sweep over the whole grid
pub fn step_sequential(current: &Grid, next: &mut Grid) -> Result<()> {
    check_buffers(current, next)?;
    let tile = Tile {
        x: 0,
        y: 0,
        width: current.width(),
        height: current.height(),
    };
    evolve_rows(current, next, tile);
    Ok(())
}

/// Evaluate exactly the cells of `tile`, writing them into `next`
pub fn evolve_tile(current: &Grid, next: &mut Grid, tile: Tile) -> Result<()> {
    check_buffers(current, next)?;
    let out_of_range = || Error::OutOfRange {
        x: tile.x.saturating_add(tile.width),
        y: tile.y.saturating_add(tile.height),
        width: current.width(),
        height: current.height(),
    };
    let right = tile.x.checked_add(tile.width).ok_or_else(out_of_range)?;
    let bottom = tile.y.checked_add(tile.height).ok_or_else(out_of_range)?;
    if right > current.width() || bottom > current.height() {
        return Err(out_of_range());
    }
    evolve_rows(current, next, tile);
    Ok(())
}

fn check_buffers(current: &Grid, next: &Grid) -> Result<()> {
    current.ensure_live()?;
    next.ensure_live()?;
    if current.dimensions() != next.dimensions() {
        return Err(Error::DimensionMismatch {
            current: current.dimensions(),
            next: next.dimensions(),
        });
    }
    Ok(())
}

/// `tile` must lie inside the grid
fn evolve_rows(current: &Grid, next: &mut Grid, tile: Tile) {
    let width = current.width();
    let out = next.cells_mut();
    for y in tile.y..tile.y + tile.height {
        for x in tile.x..tile.x + tile.width {
            out[y * width + x] = next_cell(current, x, y);
        }
    }
}

/// Kernel shared by every sweep
#[inline]
fn next_cell(current: &Grid, x: usize, y: usize) -> CellState {
    let (width, height) = current.dimensions();
    if x == 0 || y == 0 || x == width - 1 || y == height - 1 {
        return CellState::Dead;
    }

    let src = current.cells();
    let above = (y - 1) * width + x;
    let here = y * width + x;
    let below = (y + 1) * width + x;
    let n = src[above - 1] as u8
        + src[above] as u8
        + src[above + 1] as u8
        + src[here - 1] as u8
        + src[here + 1] as u8
        + src[below - 1] as u8
        + src[below] as u8
        + src[below + 1] as u8;
    src[here].next(n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::pattern::Pattern;
    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;
    use rand::SeedableRng;

    fn random_grid(width: usize, height: usize, seed: u64) -> Grid {
        let mut grid = Grid::new(width, height);
        grid.randomize(&mut StdRng::seed_from_u64(seed), 0.4);
        grid
    }

    fn stamped(width: usize, height: usize, rows: &[&str]) -> Grid {
        let mut grid = Grid::new(width, height);
        grid.stamp(&Pattern::from_rows("test", rows).unwrap()).unwrap();
        grid
    }

    #[test]
    fn test_tiles_cover_grid_once() {
        let (w, h) = (37, 23);
        let mut hits = vec![0u32; w * h];
        for tile in tiles(w, h, 8, 5) {
            for y in tile.y..tile.y + tile.height {
                for x in tile.x..tile.x + tile.width {
                    hits[y * w + x] += 1;
                }
            }
        }
        assert!(hits.iter().all(|&n| n == 1));
    }

    #[test]
    fn test_border_invariant() {
        let engine = Engine::new(4, 4);
        for (i, &(w, h)) in [(3, 3), (4, 7), (16, 16), (33, 19)].iter().enumerate() {
            let mut current = Grid::new(w, h);
            current.randomize(&mut StdRng::seed_from_u64(i as u64), 1.0);
            let mut next = random_grid(w, h, 100 + i as u64);
            engine.step(&current, &mut next).unwrap();
            for y in 0..h {
                for x in 0..w {
                    if x == 0 || y == 0 || x == w - 1 || y == h - 1 {
                        assert_eq!(next.read(x, y).unwrap(), CellState::Dead, "({}, {}) in {}x{}", x, y, w, h);
                    }
                }
            }
        }
    }

    #[test]
    fn test_block_still_life() {
        let current = stamped(4, 4, &["**", "**"]);
        let mut next = Grid::new(4, 4);
        Engine::default().step(&current, &mut next).unwrap();
        assert_eq!(next, current);

        let current = stamped(10, 10, &["**", "**"]);
        let mut next = Grid::new(10, 10);
        Engine::default().step(&current, &mut next).unwrap();
        assert_eq!(next, current);
    }

    #[test]
    fn test_blinker_oscillates() {
        let horizontal = stamped(7, 7, &["***"]);
        let vertical = stamped(7, 7, &["*", "*", "*"]);
        let engine = Engine::new(2, 3);

        let mut once = Grid::new(7, 7);
        engine.step(&horizontal, &mut once).unwrap();
        assert_eq!(once, vertical);

        let mut twice = Grid::new(7, 7);
        engine.step(&once, &mut twice).unwrap();
        assert_eq!(twice, horizontal);
    }

    #[test]
    fn test_glider_translates() {
        let mut a = stamped(12, 12, &[".*.", "..*", "***"]);
        let mut b = Grid::new(12, 12);
        let engine = Engine::default();
        for _ in 0..4 {
            engine.step(&a, &mut b).unwrap();
            std::mem::swap(&mut a, &mut b);
        }
        assert_eq!(a.population(), 5);
        // glider starts at (4, 4); after one period it sits one cell down and right
        for &(x, y) in &[(6, 5), (7, 6), (5, 7), (6, 7), (7, 7)] {
            assert_eq!(a.read(x, y).unwrap(), CellState::Alive, "({}, {})", x, y);
        }
    }

    #[test]
    fn test_partition_independence() {
        for seed in 0..4u64 {
            let current = random_grid(41, 29, seed);
            let mut expected = Grid::new(41, 29);
            step_sequential(&current, &mut expected).unwrap();

            for &(tw, th) in &[(1, 1), (3, 5), (16, 16), (64, 64), (41, 1)] {
                let mut next = random_grid(41, 29, seed + 50);
                Engine::new(tw, th).step(&current, &mut next).unwrap();
                assert_eq!(next, expected, "tiles {}x{}", tw, th);
            }

            let mut shuffled = tiles(41, 29, 7, 4);
            shuffled.shuffle(&mut StdRng::seed_from_u64(seed));
            let mut next = random_grid(41, 29, seed + 99);
            for tile in shuffled {
                evolve_tile(&current, &mut next, tile).unwrap();
            }
            assert_eq!(next, expected);
        }
    }

    #[test]
    fn test_dedicated_pool_matches_sequential() {
        let current = random_grid(64, 48, 3);
        let mut expected = Grid::new(64, 48);
        step_sequential(&current, &mut expected).unwrap();

        let engine = Engine::new(8, 8).with_threads(2).unwrap();
        let mut next = Grid::new(64, 48);
        engine.step(&current, &mut next).unwrap();
        assert_eq!(next, expected);
    }

    #[test]
    fn test_dimension_mismatch() {
        let current = random_grid(8, 8, 1);
        let mut next = random_grid(8, 9, 2);
        let before = next.clone();
        let err = Engine::default().step(&current, &mut next).unwrap_err();
        assert!(matches!(
            err,
            Error::DimensionMismatch { current: (8, 8), next: (8, 9) }
        ));
        assert_eq!(next, before);
        assert!(step_sequential(&current, &mut next).is_err());
    }

    #[test]
    fn test_destroyed_buffer_rejected() {
        let current = Grid::new(5, 5);
        let mut next = Grid::new(5, 5);
        next.destroy();
        assert!(matches!(
            Engine::default().step(&current, &mut next),
            Err(Error::Destroyed)
        ));
    }

    #[test]
    fn test_tile_outside_grid_rejected() {
        let current = Grid::new(5, 5);
        let mut next = Grid::new(5, 5);
        let tile = Tile { x: 3, y: 0, width: 3, height: 1 };
        assert!(matches!(
            evolve_tile(&current, &mut next, tile),
            Err(Error::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_huge_tile_size() {
        let current = stamped(8, 8, &["***"]);
        let expected = stamped(8, 8, &["*", "*", "*"]);
        for engine in [
            Engine::new(4, usize::MAX),
            Engine::new(usize::MAX, 4),
            Engine::new(usize::MAX, usize::MAX),
        ] {
            let mut next = Grid::new(8, 8);
            engine.step(&current, &mut next).unwrap();
            assert_eq!(next, expected);
        }
    }

    #[test]
    fn test_tile_overflow_rejected() {
        let current = Grid::new(5, 5);
        let mut next = Grid::new(5, 5);
        let wide = Tile { x: usize::MAX, y: 0, width: 2, height: 1 };
        let tall = Tile { x: 0, y: usize::MAX, width: 1, height: 2 };
        for tile in [wide, tall] {
            assert!(matches!(
                evolve_tile(&current, &mut next, tile),
                Err(Error::OutOfRange { .. })
            ));
        }
    }

    #[test]
    fn test_degenerate_grids() {
        for &(w, h) in &[(0, 0), (1, 1), (2, 5), (5, 2)] {
            let current = random_grid(w, h, 9);
            let mut next = random_grid(w, h, 10);
            Engine::default().step(&current, &mut next).unwrap();
            assert_eq!(next.population(), 0);
        }
    }
}
