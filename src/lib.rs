//! Fill crossword grids from a word list.
//!
//! Each slot in the grid is a variable whose domain is the set of words that could go there.
//! Filling starts by cutting every domain down to words of the right length, then makes the grid
//! arc consistent with AC-3, then runs a backtracking search. After each committed word the
//! search re-runs AC-3 on the arcs into that slot and fills any crossing slot left with a single
//! option. A grid that can't be filled is reported as `None` / `FillFailure`, never as a partial
//! fill.

pub mod arc_consistency;
pub mod assignment;
pub mod backtracking_search;
pub mod consistency;
pub mod domains;
pub mod error;
pub mod grid_config;
pub mod render;
pub mod word_list;

pub use assignment::{Assignment, Choice};
pub use backtracking_search::{find_fill, solve, FillFailure, FillSuccess, Filler, Statistics};
pub use error::{Error, Result};
pub use grid_config::{
    generate_grid_config_from_template_string, load_structure_file, Direction, GridConfig, Variable,
};
pub use render::{letter_grid, render_grid, render_svg, save_svg, SvgConfig};
pub use word_list::{Word, WordList};

/// The expected maximum length for a single slot.
pub const MAX_SLOT_LENGTH: usize = 21;

/// An identifier for a given slot, based on its index in the GridConfig's `variables` field.
pub type SlotId = usize;

/// An identifier for a given word, based on its index in the `WordList`.
pub type WordId = usize;

/// Zero-indexed (row, column) coords for a cell in the grid, where row 0 is the top row.
pub type GridCoord = (usize, usize);
