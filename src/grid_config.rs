use std::collections::HashMap;
use std::fmt::{Debug, Formatter};
use std::fs;
use std::path::Path;

use smallvec::{smallvec, SmallVec};
use tracing::debug;

use crate::error::{Error, Result};
use crate::{GridCoord, SlotId, MAX_SLOT_LENGTH};

/// Direction that a slot is facing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    Across,
    Down,
}

/// A slot in the grid: a run of open cells starting at (`row`, `col`). Two variables are the same
/// slot iff all four fields match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Variable {
    pub row: usize,
    pub col: usize,
    pub direction: Direction,
    pub length: usize,
}

impl Variable {
    pub fn new(row: usize, col: usize, direction: Direction, length: usize) -> Variable {
        Variable { row, col, direction, length }
    }

    /// Generate the coords for each cell of this slot.
    pub fn cells(&self) -> impl Iterator<Item = GridCoord> + '_ {
        (0..self.length).map(move |cell_idx| match self.direction {
            Direction::Across => (self.row, self.col + cell_idx),
            Direction::Down => (self.row + cell_idx, self.col),
        })
    }
}

/// A crossing between one slot and another: character `cell_idx` of this slot's word must equal
/// character `other_slot_cell` of the other slot's word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Crossing {
    pub other_slot_id: SlotId,
    pub cell_idx: usize,
    pub other_slot_cell: usize,
}

/// The static description of a grid: its shape, its slots, and how the slots cross. Built once
/// and never mutated during filling.
pub struct GridConfig {
    pub width: usize,
    pub height: usize,

    /// `structure[row][col]` is true for open cells.
    pub structure: Vec<Vec<bool>>,

    /// Indexed by `SlotId`.
    pub variables: Vec<Variable>,

    /// Keyed by ordered slot pair `(x, y)`, the value `(i, j)` means character `i` of x's word
    /// must equal character `j` of y's word. Both orientations of each pair are present.
    overlaps: HashMap<(SlotId, SlotId), (usize, usize)>,

    /// Per slot, every crossing with another slot, ordered by the other slot's id.
    crossings: Vec<SmallVec<[Crossing; MAX_SLOT_LENGTH]>>,
}

impl Debug for GridConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GridConfig")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("variables", &self.variables)
            .field("overlaps", &(["(", &(self.overlaps.len() / 2).to_string(), " crossings)"].join("")))
            .finish()
    }
}

impl GridConfig {
    /// Build a grid config from a matrix of open (`true`) and blocked (`false`) cells. Every
    /// maximal horizontal or vertical run of at least two open cells becomes a slot; across slots
    /// come first, each direction in reading order.
    pub fn from_structure(structure: Vec<Vec<bool>>) -> GridConfig {
        let height = structure.len();
        let width = structure.iter().map(|row| row.len()).max().unwrap_or(0);
        let structure: Vec<Vec<bool>> = structure
            .into_iter()
            .map(|mut row| {
                row.resize(width, false);
                row
            })
            .collect();

        let is_open = |row: usize, col: usize| structure[row][col];

        let mut variables: Vec<Variable> = vec![];

        for row in 0..height {
            for col in 0..width {
                if is_open(row, col) && (col == 0 || !is_open(row, col - 1)) {
                    let length = (col..width).take_while(|&c| is_open(row, c)).count();
                    if length > 1 {
                        variables.push(Variable::new(row, col, Direction::Across, length));
                    }
                }
            }
        }

        for row in 0..height {
            for col in 0..width {
                if is_open(row, col) && (row == 0 || !is_open(row - 1, col)) {
                    let length = (row..height).take_while(|&r| is_open(r, col)).count();
                    if length > 1 {
                        variables.push(Variable::new(row, col, Direction::Down, length));
                    }
                }
            }
        }

        // Build a map from cell location to the slots covering it, which we can then use to
        // calculate overlaps.
        let mut slots_by_loc: HashMap<GridCoord, SmallVec<[(SlotId, usize); 2]>> = HashMap::new();
        for (slot_id, variable) in variables.iter().enumerate() {
            for (cell_idx, loc) in variable.cells().enumerate() {
                slots_by_loc.entry(loc).or_insert_with(|| smallvec![]).push((slot_id, cell_idx));
            }
        }

        let mut overlaps: Vec<((SlotId, SlotId), (usize, usize))> = vec![];
        for entries in slots_by_loc.values() {
            for (a, &(x, i)) in entries.iter().enumerate() {
                for &(y, j) in &entries[a + 1..] {
                    overlaps.push(((x, y), (i, j)));
                }
            }
        }

        GridConfig::build(width, height, structure, variables, overlaps)
    }

    /// Build a grid config from an explicit list of slots and overlaps rather than from grid
    /// geometry. Each overlap only needs to be given in one orientation; the mirrored entry is
    /// derived. Entries referring to unknown slots or pairing a slot with itself are ignored. The
    /// grid's shape is the bounding box of the slots, with exactly the covered cells open.
    pub fn from_overlaps<I>(variables: Vec<Variable>, overlaps: I) -> GridConfig
    where
        I: IntoIterator<Item = ((SlotId, SlotId), (usize, usize))>,
    {
        let cells: Vec<GridCoord> = variables.iter().flat_map(|variable| variable.cells()).collect();
        let height = cells.iter().map(|&(row, _)| row + 1).max().unwrap_or(0);
        let width = cells.iter().map(|&(_, col)| col + 1).max().unwrap_or(0);

        let mut structure = vec![vec![false; width]; height];
        for (row, col) in cells {
            structure[row][col] = true;
        }

        let slot_count = variables.len();
        let overlaps: Vec<_> = overlaps
            .into_iter()
            .filter(|&((x, y), _)| x != y && x < slot_count && y < slot_count)
            .collect();

        GridConfig::build(width, height, structure, variables, overlaps)
    }

    fn build(
        width: usize,
        height: usize,
        structure: Vec<Vec<bool>>,
        variables: Vec<Variable>,
        pairs: Vec<((SlotId, SlotId), (usize, usize))>,
    ) -> GridConfig {
        let mut overlaps: HashMap<(SlotId, SlotId), (usize, usize)> =
            HashMap::with_capacity(pairs.len() * 2);

        for ((x, y), (i, j)) in pairs {
            overlaps.entry((x, y)).or_insert((i, j));
            overlaps.entry((y, x)).or_insert((j, i));
        }

        let mut crossings: Vec<SmallVec<[Crossing; MAX_SLOT_LENGTH]>> =
            variables.iter().map(|_| smallvec![]).collect();
        for (&(x, y), &(i, j)) in &overlaps {
            crossings[x].push(Crossing { other_slot_id: y, cell_idx: i, other_slot_cell: j });
        }
        for slot_crossings in &mut crossings {
            slot_crossings.sort_by_key(|crossing| crossing.other_slot_id);
        }

        debug!(
            width,
            height,
            slots = variables.len(),
            crossings = overlaps.len() / 2,
            "built grid config"
        );

        GridConfig { width, height, structure, variables, overlaps, crossings }
    }

    pub fn slot_count(&self) -> usize {
        self.variables.len()
    }

    pub fn variable(&self, slot_id: SlotId) -> &Variable {
        &self.variables[slot_id]
    }

    /// Find the slot id for a given variable, if it's part of this grid.
    pub fn slot_id(&self, variable: &Variable) -> Option<SlotId> {
        self.variables.iter().position(|candidate| candidate == variable)
    }

    pub fn is_open(&self, row: usize, col: usize) -> bool {
        self.structure.get(row).and_then(|cells| cells.get(col)).copied().unwrap_or(false)
    }

    /// The `(i, j)` cell indexes at which `x` and `y` must agree, if they cross.
    pub fn overlap(&self, x: SlotId, y: SlotId) -> Option<(usize, usize)> {
        self.overlaps.get(&(x, y)).copied()
    }

    pub fn crossings(&self, slot_id: SlotId) -> &[Crossing] {
        &self.crossings[slot_id]
    }

    /// Every slot crossing the given one, in ascending id order.
    pub fn neighbors(&self, slot_id: SlotId) -> impl Iterator<Item = SlotId> + '_ {
        self.crossings[slot_id].iter().map(|crossing| crossing.other_slot_id)
    }

    pub fn degree(&self, slot_id: SlotId) -> usize {
        self.crossings[slot_id].len()
    }
}

/// Generate a grid config from a string template, with `_` or `.` representing open cells and
/// anything else representing blocks. Every line is a row, so a blank line in the middle is a row
/// of blocks; only trailing blank lines are dropped. Short rows are padded with blocks.
pub fn generate_grid_config_from_template_string(template: &str) -> Result<GridConfig> {
    let mut lines: Vec<&str> = template.lines().map(str::trim_end).collect();
    while lines.last().map_or(false, |line| line.is_empty()) {
        lines.pop();
    }

    let structure: Vec<Vec<bool>> = lines
        .into_iter()
        .map(|line| line.chars().map(|c| c == '_' || c == '.').collect())
        .collect();

    if structure.is_empty() {
        return Err(Error::EmptyStructure);
    }

    Ok(GridConfig::from_structure(structure))
}

/// Load a structure file in the format accepted by `generate_grid_config_from_template_string`.
pub fn load_structure_file(path: impl AsRef<Path>) -> Result<GridConfig> {
    let path = path.as_ref();
    let template = fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;

    generate_grid_config_from_template_string(&template)
}
