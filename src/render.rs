use std::fs;
use std::path::Path;

use tracing::debug;

use crate::assignment::{Assignment, Choice};
use crate::error::{Error, Result};
use crate::grid_config::GridConfig;
use crate::word_list::WordList;

/// Character drawn for blocked cells in text output.
pub const BLOCK: char = '█';

/// One entry per grid cell, holding the letter placed there by the assignment, if any. Cells a
/// slot would place outside the grid are dropped.
pub fn letter_grid(
    config: &GridConfig,
    word_list: &WordList,
    assignment: &Assignment,
) -> Vec<Vec<Option<char>>> {
    let mut letters = vec![vec![None; config.width]; config.height];

    for Choice { slot_id, word_id } in assignment.iter() {
        let word = word_list.get(word_id);
        for ((row, col), &glyph) in config.variable(slot_id).cells().zip(&word.chars) {
            if let Some(cell) = letters.get_mut(row).and_then(|cells| cells.get_mut(col)) {
                *cell = Some(glyph);
            }
        }
    }

    letters
}

/// Turn the given grid config and assignment into a rendered string: one line per row, `█` for
/// blocks, and a space for open cells that haven't been filled.
pub fn render_grid(config: &GridConfig, word_list: &WordList, assignment: &Assignment) -> String {
    let letters = letter_grid(config, word_list, assignment);

    letters
        .iter()
        .enumerate()
        .map(|(row, cells)| {
            cells
                .iter()
                .enumerate()
                .map(|(col, &letter)| {
                    if config.is_open(row, col) {
                        letter.unwrap_or(' ')
                    } else {
                        BLOCK
                    }
                })
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Configuration options for SVG output.
#[derive(Debug, Clone)]
pub struct SvgConfig {
    /// Side length of each cell, in pixels.
    pub cell_size: u32,

    /// Gap between a cell's white square and its edge.
    pub cell_border: u32,

    pub font_size: u32,
    pub font_family: String,
}

impl Default for SvgConfig {
    fn default() -> Self {
        Self {
            cell_size: 100,
            cell_border: 2,
            font_size: 80,
            font_family: "Open Sans, sans-serif".to_string(),
        }
    }
}

fn escape_text(glyph: char) -> String {
    match glyph {
        '<' => "&lt;".to_string(),
        '>' => "&gt;".to_string(),
        '&' => "&amp;".to_string(),
        '"' => "&quot;".to_string(),
        _ => glyph.to_string(),
    }
}

/// Draw the grid as an SVG image: a black canvas with a white square for each open cell and the
/// assigned letters centered in their cells.
pub fn render_svg(
    config: &GridConfig,
    word_list: &WordList,
    assignment: &Assignment,
    svg_config: &SvgConfig,
) -> String {
    let letters = letter_grid(config, word_list, assignment);
    let cell = svg_config.cell_size as usize;
    let border = svg_config.cell_border as usize;
    let interior = cell.saturating_sub(2 * border);
    let (width, height) = (config.width * cell, config.height * cell);

    let mut svg = format!(
        concat!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}">"#,
            "\n",
            r#"  <rect x="0" y="0" width="{width}" height="{height}" fill="black"/>"#,
            "\n",
        ),
        width = width,
        height = height,
    );

    for (row, cells) in letters.iter().enumerate() {
        for (col, letter) in cells.iter().enumerate() {
            if !config.is_open(row, col) {
                continue;
            }

            let (x, y) = (col * cell + border, row * cell + border);
            svg.push_str(&format!(
                "  <rect x=\"{x}\" y=\"{y}\" width=\"{interior}\" height=\"{interior}\" fill=\"white\"/>\n"
            ));

            if let Some(glyph) = letter {
                svg.push_str(&format!(
                    "  <text x=\"{}\" y=\"{}\" font-family=\"{}\" font-size=\"{}\" text-anchor=\"middle\" dominant-baseline=\"central\" fill=\"black\">{}</text>\n",
                    x + interior / 2,
                    y + interior / 2,
                    svg_config.font_family,
                    svg_config.font_size,
                    escape_text(*glyph),
                ));
            }
        }
    }

    svg.push_str("</svg>\n");
    svg
}

/// Render the grid as SVG and write it to `path`.
pub fn save_svg(
    path: impl AsRef<Path>,
    config: &GridConfig,
    word_list: &WordList,
    assignment: &Assignment,
    svg_config: &SvgConfig,
) -> Result<()> {
    let path = path.as_ref();
    fs::write(path, render_svg(config, word_list, assignment, svg_config)).map_err(|source| {
        Error::Io {
            path: path.to_path_buf(),
            source,
        }
    })?;

    debug!(path = %path.display(), "wrote grid image");
    Ok(())
}
