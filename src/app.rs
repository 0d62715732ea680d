use std::time::Instant;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::simulation::{Catalog, Engine, Grid, GridBuffers, Pattern};

/// Per-frame control signals a front end feeds into the simulation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    TogglePause,
    NextPattern,
    PreviousPattern,
    Quit,
}

/// Application state
pub struct App {
    catalog: Catalog,
    buffers: GridBuffers,
    engine: Engine,
    current_pattern: usize,
    paused: bool,
    running: bool,
    counter: GenerationCounter,
}

impl App {
    pub fn new(config: &Config, catalog: Catalog) -> Result<Self> {
        if catalog.is_empty() {
            return Err(Error::EmptyCatalog);
        }

        let (width, height) = config.grid_size();
        log::info!("Grid size: {}x{}", width, height);

        let engine = Engine::new(config.tile_size, config.tile_size).with_threads(config.threads)?;
        let mut app = Self {
            current_pattern: catalog.wrap_index(config.rule_init),
            catalog,
            buffers: GridBuffers::new(width, height)?,
            engine,
            paused: false,
            running: true,
            counter: GenerationCounter::new(),
        };
        app.select(app.current_pattern)?;
        Ok(app)
    }

    pub fn grid(&self) -> &Grid {
        self.buffers.current()
    }

    pub fn pattern(&self) -> Option<&Pattern> {
        self.catalog.get(self.current_pattern)
    }

    pub fn pattern_index(&self) -> usize {
        self.current_pattern
    }

    pub fn generation(&self) -> u64 {
        self.buffers.generation()
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Stamp the pattern at `index` (mod catalog size) and pause.
    /// The simulation also starts paused on the initial pattern.
    pub fn select(&mut self, index: usize) -> Result<()> {
        let index = self.catalog.wrap_index(index);
        self.current_pattern = index;
        self.paused = true;
        let pattern = self.catalog.get(index).ok_or(Error::EmptyCatalog)?;
        self.buffers.stamp(pattern)?;
        log::info!("Pattern {}/{}: {}", index + 1, self.catalog.len(), pattern.name());
        Ok(())
    }

    pub fn handle_command(&mut self, command: Command) -> Result<()> {
        match command {
            Command::TogglePause => {
                self.paused = !self.paused;
                log::info!("Simulation {}", if self.paused { "paused" } else { "resumed" });
            }
            Command::NextPattern => {
                let index = self.catalog.next_index(self.current_pattern);
                self.select(index)?;
            }
            Command::PreviousPattern => {
                let index = self.catalog.previous_index(self.current_pattern);
                self.select(index)?;
            }
            Command::Quit => {
                log::info!("Quit requested, exiting...");
                self.running = false;
            }
        }
        Ok(())
    }

    /// Advance one generation unless paused
    pub fn tick(&mut self) -> Result<()> {
        if self.paused {
            return Ok(());
        }
        self.buffers.advance(&self.engine)?;
        if let Some(rate) = self.counter.tick() {
            log::info!(
                "Generation {} - {:.0} gen/s - population {}",
                self.buffers.generation(),
                rate,
                self.buffers.current().population()
            );
        }
        Ok(())
    }
}

/// Simple generation-rate counter
struct GenerationCounter {
    last_update: Instant,
    generation_count: u32,
}

impl GenerationCounter {
    fn new() -> Self {
        Self {
            last_update: Instant::now(),
            generation_count: 0,
        }
    }

    /// Tick the counter, returns Some(rate) every second
    fn tick(&mut self) -> Option<f64> {
        self.generation_count += 1;
        let elapsed = self.last_update.elapsed();

        if elapsed.as_secs_f64() >= 1.0 {
            let rate = self.generation_count as f64 / elapsed.as_secs_f64();
            self.generation_count = 0;
            self.last_update = Instant::now();
            Some(rate)
        } else {
            None
        }
    }
}
