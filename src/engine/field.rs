//! Static terrain files.
//!
//! A field is a rectangle of single-character cell tags, one row per
//! line. Tags: `.` (or space) empty, `*` rock, `w` water, `p` poison,
//! `f` food pile, `g` baby grasshopper, `0`-`3` anthill of colony N.
//! Any malformed input is a load error that aborts initialization.

use std::path::Path;

use thiserror::Error;

/// What a terrain cell seeds at world initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellTag {
    Empty,
    Rock,
    Water,
    Poison,
    Food,
    Grasshopper,
    Anthill(u8),
}

#[derive(Debug, Error)]
pub enum FieldError {
    #[error("failed to read field file: {0}")]
    Io(#[from] std::io::Error),
    #[error("field file contains no rows")]
    Empty,
    #[error("line {line}: row is {found} cells wide, expected {expected}")]
    RaggedRow { line: usize, found: usize, expected: usize },
    #[error("line {line}, column {column}: unknown cell tag `{tag}`")]
    UnknownTag { line: usize, column: usize, tag: char },
}

/// Parsed terrain layout, row-major.
#[derive(Debug)]
pub struct Field {
    width: i32,
    height: i32,
    cells: Vec<CellTag>,
}

impl Field {
    /// Parse a field from its text form.
    pub fn parse(source: &str) -> Result<Self, FieldError> {
        let mut cells = Vec::new();
        let mut width: Option<usize> = None;
        let mut height = 0usize;

        for (idx, row) in source.lines().enumerate() {
            if row.is_empty() {
                continue;
            }
            let expected = *width.get_or_insert(row.chars().count());
            let found = row.chars().count();
            if found != expected {
                return Err(FieldError::RaggedRow { line: idx + 1, found, expected });
            }
            for (col, tag) in row.chars().enumerate() {
                cells.push(match tag {
                    '.' | ' ' => CellTag::Empty,
                    '*' => CellTag::Rock,
                    'w' => CellTag::Water,
                    'p' => CellTag::Poison,
                    'f' => CellTag::Food,
                    'g' => CellTag::Grasshopper,
                    '0'..='3' => CellTag::Anthill(tag as u8 - b'0'),
                    other => {
                        return Err(FieldError::UnknownTag {
                            line: idx + 1,
                            column: col + 1,
                            tag: other,
                        })
                    }
                });
            }
            height += 1;
        }

        match width {
            Some(w) if height > 0 => Ok(Field {
                width: w as i32,
                height: height as i32,
                cells,
            }),
            _ => Err(FieldError::Empty),
        }
    }

    /// Read and parse a field file from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, FieldError> {
        let source = std::fs::read_to_string(path)?;
        Self::parse(&source)
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn get(&self, x: i32, y: i32) -> CellTag {
        assert!(x >= 0 && x < self.width && y >= 0 && y < self.height);
        self.cells[(y * self.width + x) as usize]
    }

    /// Iterate all cells as `(x, y, tag)` in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (i32, i32, CellTag)> + '_ {
        let width = self.width;
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, tag)| (i as i32 % width, i as i32 / width, *tag))
    }
}
