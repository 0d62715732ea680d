//! Conway's Game of Life on a fixed, dead-bordered grid.
//!
//! Patterns come from a plain-text catalog ([`Catalog`]), are stamped into a
//! [`Grid`], and advanced generation by generation by a tiled parallel
//! [`Engine`] over a pair of ping-pong buffers ([`GridBuffers`]).

pub mod app;
pub mod config;
pub mod error;
pub mod simulation;

pub use error::{Error, FormatError, Result};
pub use simulation::{CellState, Catalog, Engine, Grid, GridBuffers, Pattern};
