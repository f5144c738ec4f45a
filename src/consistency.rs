use crate::assignment::Assignment;
use crate::grid_config::GridConfig;
use crate::word_list::WordList;
use crate::WordId;

/// Do two words agree at a crossing? `(i, j)` is the cell in the first word and the cell in the
/// second. A cell index past the end of either word never agrees.
pub fn words_agree(
    word_list: &WordList,
    word_id: WordId,
    other_word_id: WordId,
    (i, j): (usize, usize),
) -> bool {
    match word_list.get(word_id).char_at(i) {
        Some(glyph) => word_list.get(other_word_id).char_at(j) == Some(glyph),
        None => false,
    }
}

/// Check every constraint among the slots that currently hold a word: each word has its slot's
/// length, every pair of filled crossing slots agrees on the shared cell, and no word is used
/// twice. Crossings with unfilled slots are skipped.
pub fn is_consistent(config: &GridConfig, word_list: &WordList, assignment: &Assignment) -> bool {
    if assignment.has_repeated_words() {
        return false;
    }

    assignment.iter().all(|choice| {
        if word_list.get(choice.word_id).len() != config.variable(choice.slot_id).length {
            return false;
        }

        config.crossings(choice.slot_id).iter().all(|crossing| {
            match assignment.get(crossing.other_slot_id) {
                Some(other_word_id) => words_agree(
                    word_list,
                    choice.word_id,
                    other_word_id,
                    (crossing.cell_idx, crossing.other_slot_cell),
                ),
                None => true,
            }
        })
    })
}
