//! This module implements the static description of a crossword-filling problem: the grid's
//! slots, the crossings between them, and the neighbor relation derived from those crossings.
//! Everything here is computed once, up front; the fill algorithm never mutates it.

use std::collections::HashMap;
use std::fmt;

#[cfg(feature = "serde")]
use serde_derive::{Deserialize, Serialize};

#[cfg(feature = "serde")]
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::types::GlobalWordId;

/// An identifier for the intersection between two slots; these correspond one-to-one with checked
/// squares in the grid.
pub type CrossingId = usize;

/// An identifier for a given slot, based on its index in the `Puzzle`'s `slot_configs` field.
pub type SlotId = usize;

/// Zero-indexed x and y coords for a cell in the grid, where y = 0 in the top row.
pub type GridCoord = (usize, usize);

/// The direction that a slot is facing.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Direction {
    Across,
    Down,
}

/// A struct representing a crossing between one slot and another, referencing the other slot's id
/// and the location of the intersection within the other slot.
#[derive(Debug, Clone)]
pub struct Crossing {
    pub other_slot_id: SlotId,
    pub other_slot_cell: usize,
    pub crossing_id: CrossingId,
}

/// A struct representing the static aspects of a single slot in the grid.
#[derive(Debug, Clone)]
pub struct SlotConfig {
    pub id: SlotId,
    pub start_cell: GridCoord,
    pub direction: Direction,
    pub length: usize,

    /// One entry per cell of the slot; `None` means the cell is unchecked (no slot runs through
    /// it in the other direction).
    pub crossings: Vec<Option<Crossing>>,
}

impl SlotConfig {
    /// Generate the coords for each cell of this slot.
    #[must_use]
    pub fn cell_coords(&self) -> Vec<GridCoord> {
        (0..self.length)
            .map(|cell_idx| match self.direction {
                Direction::Across => (self.start_cell.0 + cell_idx, self.start_cell.1),
                Direction::Down => (self.start_cell.0, self.start_cell.1 + cell_idx),
            })
            .collect()
    }

    /// The ids of the slots crossing this one. Each crossing pair shares exactly one cell, so no
    /// id appears twice.
    #[must_use]
    pub fn neighbor_ids(&self) -> Vec<SlotId> {
        self.crossings
            .iter()
            .flatten()
            .map(|crossing| crossing.other_slot_id)
            .collect()
    }

    /// Generate a `SlotSpec` identifying this slot.
    #[must_use]
    pub fn slot_spec(&self) -> SlotSpec {
        SlotSpec {
            start_cell: self.start_cell,
            direction: self.direction,
            length: self.length,
        }
    }
}

/// A struct identifying a specific slot in the grid.
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub struct SlotSpec {
    pub start_cell: GridCoord,
    pub direction: Direction,
    pub length: usize,
}

impl SlotSpec {
    /// Parse a string like "1,2,down,5" into a `SlotSpec` struct.
    pub fn from_key(key: &str) -> Result<SlotSpec, PuzzleError> {
        let key_parts: Vec<&str> = key.split(',').collect();
        if key_parts.len() != 4 {
            return Err(PuzzleError::InvalidSlotKey(key.into()));
        }

        let x: Result<usize, _> = key_parts[0].parse();
        let y: Result<usize, _> = key_parts[1].parse();
        let direction: Option<Direction> = match key_parts[2] {
            "across" => Some(Direction::Across),
            "down" => Some(Direction::Down),
            _ => None,
        };
        let length: Result<usize, _> = key_parts[3].parse();

        if let (Ok(x), Ok(y), Some(direction), Ok(length)) = (x, y, direction, length) {
            Ok(SlotSpec {
                start_cell: (x, y),
                direction,
                length,
            })
        } else {
            Err(PuzzleError::InvalidSlotKey(key.into()))
        }
    }

    /// Represent this slot as a string like "1,2,down,5".
    #[must_use]
    pub fn to_key(&self) -> String {
        let direction = match self.direction {
            Direction::Across => "across",
            Direction::Down => "down",
        };
        format!(
            "{},{},{},{}",
            self.start_cell.0, self.start_cell.1, direction, self.length,
        )
    }

    /// Generate the coords for each cell of this entry.
    #[must_use]
    pub fn cell_coords(&self) -> Vec<GridCoord> {
        (0..self.length)
            .map(|cell_idx| match self.direction {
                Direction::Across => (self.start_cell.0 + cell_idx, self.start_cell.1),
                Direction::Down => (self.start_cell.0, self.start_cell.1 + cell_idx),
            })
            .collect()
    }
}

/// Serialize a `SlotSpec` into a string key.
#[cfg(feature = "serde")]
impl Serialize for SlotSpec {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_key())
    }
}

/// Deserialize a `SlotSpec` from a string key.
#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for SlotSpec {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw_string = String::deserialize(deserializer)?;
        SlotSpec::from_key(&raw_string).map_err(serde::de::Error::custom)
    }
}

/// A construction-time validation error. Distinct from an unsatisfiable instance, which is an
/// ordinary fill outcome rather than an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PuzzleError {
    EmptyGrid,
    RaggedGrid,
    InvalidSlotKey(String),
}

impl fmt::Display for PuzzleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let string = match self {
            PuzzleError::EmptyGrid => "Grid must contain at least one cell".to_string(),
            PuzzleError::RaggedGrid => "Rows in grid must all be the same length".to_string(),
            PuzzleError::InvalidSlotKey(key) => format!("Invalid slot key: “{key}”"),
        };
        write!(f, "{string}")
    }
}

/// A struct recording a slot assignment made during a fill process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub slot_id: SlotId,
    pub word_id: GlobalWordId,
}

/// A struct holding the full static description of a puzzle: dimensions, slots, and the crossing
/// relation between them.
#[derive(Debug, Clone)]
pub struct Puzzle {
    pub slot_configs: Vec<SlotConfig>,

    /// The width and height of the grid.
    pub width: usize,
    pub height: usize,

    /// The number of distinct crossings represented in all of the `slot_configs`.
    pub crossing_count: usize,
}

impl Puzzle {
    /// Build a `Puzzle` from a rectangular array of booleans indicating which cells are fillable.
    /// Slots are the maximal horizontal and vertical runs of at least two fillable cells, with
    /// across slots first (in reading order) and then down slots (in column-then-row order).
    pub fn from_grid(grid: &[Vec<bool>]) -> Result<Puzzle, PuzzleError> {
        if grid.is_empty() || grid[0].is_empty() {
            return Err(PuzzleError::EmptyGrid);
        }

        let width = grid[0].len();
        let height = grid.len();

        if grid.iter().any(|row| row.len() != width) {
            return Err(PuzzleError::RaggedGrid);
        }

        let slot_specs = generate_slots_from_grid(grid);
        let (slot_configs, crossing_count) = generate_slot_configs(&slot_specs);

        Ok(Puzzle {
            slot_configs,
            width,
            height,
            crossing_count,
        })
    }

    /// Build a `Puzzle` from a template string with `#` representing blocks and any other
    /// character representing a fillable cell. Leading/trailing whitespace on each line is
    /// ignored, as are blank lines.
    pub fn from_template(template: &str) -> Result<Puzzle, PuzzleError> {
        let grid: Vec<Vec<bool>> = template
            .lines()
            .filter_map(|line| {
                let line = line.trim();
                if line.is_empty() {
                    None
                } else {
                    Some(line.chars().map(|c| c != '#').collect())
                }
            })
            .collect();

        Puzzle::from_grid(&grid)
    }

    /// The number of slots in the puzzle.
    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.slot_configs.len()
    }

    /// The ids of the slots sharing a cell with the given slot.
    #[must_use]
    pub fn neighbors(&self, slot_id: SlotId) -> Vec<SlotId> {
        self.slot_configs[slot_id].neighbor_ids()
    }

    /// If slots `a` and `b` share a cell, the intra-word indices of that cell in each of them.
    #[must_use]
    pub fn crossing_between(&self, a: SlotId, b: SlotId) -> Option<(usize, usize)> {
        self.slot_configs[a]
            .crossings
            .iter()
            .enumerate()
            .find_map(|(cell_idx, crossing)| match crossing {
                Some(crossing) if crossing.other_slot_id == b => {
                    Some((cell_idx, crossing.other_slot_cell))
                }
                _ => None,
            })
    }
}

/// Given `SlotSpec`s specifying the positions of the slots in a grid, generate `SlotConfig`s
/// containing derived information about crossings.
#[must_use]
fn generate_slot_configs(entries: &[SlotSpec]) -> (Vec<SlotConfig>, usize) {
    let mut slot_configs: Vec<SlotConfig> = vec![];

    // Build a map from cell location to entries involved, which we can then use to calculate
    // crossings.
    let mut entries_by_loc: HashMap<GridCoord, Vec<(usize, usize)>> = HashMap::new();

    for (entry_idx, entry) in entries.iter().enumerate() {
        for (cell_idx, &loc) in entry.cell_coords().iter().enumerate() {
            entries_by_loc.entry(loc).or_default().push((entry_idx, cell_idx));
        }
    }

    // When we're generating a Crossing, if `(current_slot_id, crossing_slot_id)` is in this list,
    // use its index; if not, use `crossing_id_cache.len()` as the id and push
    // `(crossing_slot_id, current_id)` into the list so we can reuse it when we see the crossing
    // from the other side. This wouldn't work if the grid topology weren't 2D, so that each
    // crossing is guaranteed to be seen by exactly two slots.
    let mut crossing_id_cache: Vec<(SlotId, SlotId)> = vec![];

    for (entry_idx, entry) in entries.iter().enumerate() {
        let crossings: Vec<Option<Crossing>> = entry
            .cell_coords()
            .iter()
            .map(|&loc| {
                let crossing_idxs: Vec<_> = entries_by_loc[&loc]
                    .iter()
                    .filter(|&&(e, _)| e != entry_idx)
                    .collect();

                if crossing_idxs.is_empty() {
                    None
                } else if crossing_idxs.len() > 1 {
                    panic!("More than two entries crossing in cell?");
                } else {
                    let &(other_slot_id, other_slot_cell) = crossing_idxs[0];

                    let crossing_id = crossing_id_cache
                        .iter()
                        .position(|&id_pair| id_pair == (entry_idx, other_slot_id))
                        .unwrap_or_else(|| {
                            crossing_id_cache.push((other_slot_id, entry_idx));
                            crossing_id_cache.len() - 1
                        });

                    Some(Crossing {
                        other_slot_id,
                        other_slot_cell,
                        crossing_id,
                    })
                }
            })
            .collect();

        slot_configs.push(SlotConfig {
            id: entry_idx,
            start_cell: entry.start_cell,
            direction: entry.direction,
            length: entry.length,
            crossings,
        });
    }

    (slot_configs, crossing_id_cache.len())
}

/// Generate a list of `SlotSpec`s from a boolean grid, taking each maximal run of at least two
/// fillable cells in either direction. Single-cell runs are not slots.
#[must_use]
fn generate_slots_from_grid(grid: &[Vec<bool>]) -> Vec<SlotSpec> {
    fn build_runs(rows: &[Vec<bool>]) -> Vec<(GridCoord, usize)> {
        let mut result: Vec<(GridCoord, usize)> = vec![];

        for (y, row) in rows.iter().enumerate() {
            let mut current_run: Vec<GridCoord> = vec![];

            for (x, &fillable) in row.iter().enumerate() {
                if fillable {
                    current_run.push((x, y));
                } else {
                    if current_run.len() > 1 {
                        result.push((current_run[0], current_run.len()));
                    }
                    current_run = vec![];
                }
            }

            if current_run.len() > 1 {
                result.push((current_run[0], current_run.len()));
            }
        }

        result
    }

    let mut slot_specs: Vec<SlotSpec> = vec![];

    for (start_cell, length) in build_runs(grid) {
        slot_specs.push(SlotSpec {
            start_cell,
            direction: Direction::Across,
            length,
        });
    }

    let transposed: Vec<Vec<bool>> = (0..grid[0].len())
        .map(|x| (0..grid.len()).map(|y| grid[y][x]).collect())
        .collect();

    for ((y, x), length) in build_runs(&transposed) {
        slot_specs.push(SlotSpec {
            start_cell: (x, y),
            direction: Direction::Down,
            length,
        });
    }

    slot_specs
}
