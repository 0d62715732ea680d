//! Seed patterns and the plain-text catalog they are parsed from.
//!
//! The catalog dialect is line based. Lines are trimmed and blank lines dropped.
//! A name line looks like `:glider:description`; a body line holds only `.`
//! (dead) and `*` (alive). Each maximal run of body lines is one pattern, named
//! after the closest name line above it.

use std::fs;
use std::path::Path;
use std::str::FromStr;

use crate::error::{Error, FormatError, Result};
use crate::simulation::cell::CellState;

/// Named, immutable rectangle of cell states
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pattern {
    name: String,
    cols: usize,
    rows: usize,
    cells: Vec<CellState>,
}

impl Pattern {
    /// Build a pattern from `.`/`*` rows. Returns `None` for empty, ragged or non-body input.
    pub fn from_rows(name: impl Into<String>, rows: &[&str]) -> Option<Self> {
        let cols = rows.first()?.chars().count();
        if cols == 0 {
            return None;
        }
        let mut cells = Vec::with_capacity(cols * rows.len());
        for row in rows {
            if row.chars().count() != cols {
                return None;
            }
            for c in row.chars() {
                cells.push(CellState::from_char(c)?);
            }
        }
        Some(Self {
            name: name.into(),
            cols,
            rows: rows.len(),
            cells,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Cell at column `x`, row `y`
    pub fn get(&self, x: usize, y: usize) -> Option<CellState> {
        if x < self.cols && y < self.rows {
            Some(self.cells[y * self.cols + x])
        } else {
            None
        }
    }

    pub fn row(&self, y: usize) -> Option<&[CellState]> {
        self.cells.chunks_exact(self.cols).nth(y)
    }

    pub fn population(&self) -> usize {
        self.cells.iter().filter(|c| c.is_alive()).count()
    }
}

/// Ordered collection of patterns, read-only once parsed
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Catalog {
    patterns: Vec<Pattern>,
}

impl Catalog {
    /// Parse catalog text. Fails on the first malformed line; no partial catalog is returned.
    pub fn parse(text: &str) -> Result<Self> {
        let lines: Vec<(usize, &str)> = text
            .lines()
            .enumerate()
            .map(|(i, line)| (i + 1, line.trim()))
            .filter(|(_, line)| !line.is_empty())
            .collect();

        let mut patterns = Vec::new();
        let mut i = 0;
        while i < lines.len() {
            if !is_body_line(lines[i].1) {
                i += 1;
                continue;
            }

            let (first_line, _) = lines[i];
            let name = lines[..i]
                .iter()
                .rev()
                .find_map(|(_, line)| parse_name(line))
                .ok_or(FormatError::MissingName { line: first_line })?;

            let start = i;
            while i < lines.len() && is_body_line(lines[i].1) {
                i += 1;
            }
            patterns.push(parse_body(name, &lines[start..i])?);
        }

        log::debug!("Parsed {} patterns", patterns.len());
        Ok(Self { patterns })
    }

    /// Read and parse a catalog file
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let catalog = Self::parse(&text)?;
        log::info!("Loaded {} patterns from {}", catalog.len(), path.display());
        Ok(catalog)
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn count(&self) -> usize {
        self.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Pattern> {
        self.patterns.get(index)
    }

    /// First pattern with this name
    pub fn get_by_name(&self, name: &str) -> Result<&Pattern> {
        self.patterns
            .iter()
            .find(|p| p.name == name)
            .ok_or_else(|| Error::NotFound(name.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Pattern> {
        self.patterns.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.patterns.iter().map(Pattern::name)
    }

    /// `index mod count`, or 0 for an empty catalog
    pub fn wrap_index(&self, index: usize) -> usize {
        if self.is_empty() {
            0
        } else {
            index % self.len()
        }
    }

    pub fn next_index(&self, index: usize) -> usize {
        self.wrap_index(self.wrap_index(index) + 1)
    }

    pub fn previous_index(&self, index: usize) -> usize {
        if self.is_empty() {
            return 0;
        }
        let index = self.wrap_index(index);
        (index + self.len() - 1) % self.len()
    }
}

impl FromStr for Catalog {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

fn is_body_line(line: &str) -> bool {
    line.starts_with('.') || line.starts_with('*')
}

/// Name between the first and second `:`; the whole remainder when there is no second `:`
fn parse_name(line: &str) -> Option<&str> {
    let rest = line.strip_prefix(':')?;
    Some(rest.split(':').next().unwrap_or(rest))
}

fn parse_body(name: &str, lines: &[(usize, &str)]) -> Result<Pattern> {
    let cols = lines[0].1.chars().count();
    let mut cells = Vec::with_capacity(cols * lines.len());

    for &(line_no, line) in lines {
        let mut found = 0;
        for c in line.chars() {
            let cell = CellState::from_char(c).ok_or(FormatError::InvalidCharacter {
                line: line_no,
                found: c,
            })?;
            cells.push(cell);
            found += 1;
        }
        if found != cols {
            return Err(FormatError::RaggedRow {
                line: line_no,
                name: name.to_string(),
                expected: cols,
                found,
            }
            .into());
        }
    }

    Ok(Pattern {
        name: name.to_string(),
        cols,
        rows: lines.len(),
        cells,
    })
}
