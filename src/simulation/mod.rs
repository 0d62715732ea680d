pub mod buffers;
pub mod cell;
pub mod engine;
pub mod grid;
pub mod pattern;

pub use buffers::GridBuffers;
pub use cell::CellState;
pub use engine::{evolve_tile, step_sequential, tiles, Engine, Tile};
pub use grid::Grid;
pub use pattern::{Catalog, Pattern};
