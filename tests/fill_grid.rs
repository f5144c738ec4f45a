//! End-to-end tests: load a structure and word list, fill, and render.

use std::collections::HashSet;
use std::path::PathBuf;

use crossfill::{
    find_fill, generate_grid_config_from_template_string, letter_grid, load_structure_file,
    render_grid, solve, Assignment, GridConfig, WordList,
};
use pretty_assertions::assert_eq;

fn data_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data").join(name)
}

/// Check every property a complete fill has to satisfy.
fn assert_valid_fill(config: &GridConfig, word_list: &WordList, assignment: &Assignment) {
    assert!(assignment.is_complete(config));

    let resolved = assignment.resolve(config, word_list);
    for (variable, word) in &resolved {
        assert_eq!(word.chars().count(), variable.length, "{} doesn't fit {:?}", word, variable);
    }

    let distinct: HashSet<&str> = resolved.iter().map(|&(_, word)| word).collect();
    assert_eq!(distinct.len(), resolved.len(), "a word was used twice");

    for x in 0..config.slot_count() {
        for y in config.neighbors(x) {
            let (i, j) = config.overlap(x, y).expect("neighbors always overlap");
            let x_word = &word_list.get(assignment.get(x).expect("slot is filled")).chars;
            let y_word = &word_list.get(assignment.get(y).expect("slot is filled")).chars;
            assert_eq!(x_word[i], y_word[j], "slots {} and {} disagree", x, y);
        }
    }
}

/// #___#
/// #_##_
/// #_##_
/// #_##_
/// #____
#[test]
fn test_fill_structure_file() {
    let config = load_structure_file(data_path("structure0.txt")).expect("structure should load");
    let word_list = WordList::from_file(data_path("words0.txt")).expect("words should load");

    assert_eq!(config.slot_count(), 4);
    assert_eq!(word_list.len(), 10);

    let result = find_fill(&config, &word_list).expect("Failed to find a fill");
    println!("{:?}", result.statistics);
    println!("{}", render_grid(&config, &word_list, &result.assignment));

    assert_valid_fill(&config, &word_list, &result.assignment);

    let letters = letter_grid(&config, &word_list, &result.assignment);
    for row in 0..config.height {
        for col in 0..config.width {
            assert_eq!(letters[row][col].is_some(), config.is_open(row, col));
        }
    }
}

#[test]
fn test_missing_file_is_an_error() {
    let err = WordList::from_file(data_path("no-such-words.txt")).expect_err("file doesn't exist");
    assert!(err.to_string().contains("no-such-words.txt"));
}

/// _____
/// _#_#_
/// _____
#[test]
fn test_fill_lattice() {
    let config = generate_grid_config_from_template_string("_____\n_#_#_\n_____")
        .expect("template should load");
    let word_list = WordList::new([
        "CABIN", "EATEN", "AXE", "BIN", "NON", "CAE", "BAT", "NAN", "OCEAN", "TENET", "ANT", "ICE",
        "NET", "ERA", "SEA",
    ]);

    let assignment = solve(&config, &word_list).expect("Failed to find a fill");
    assert_valid_fill(&config, &word_list, &assignment);
}

#[test]
fn test_unfillable_grid_reports_no_solution() {
    let config = generate_grid_config_from_template_string("_____\n_#_#_\n_____")
        .expect("template should load");
    let word_list = WordList::new(["CABIN", "EATEN", "AXE", "BIN", "NON"]);

    assert!(solve(&config, &word_list).is_none());
}

#[test]
fn test_satisfiability_is_stable_across_runs() {
    let config = load_structure_file(data_path("structure0.txt")).expect("structure should load");
    let word_list = WordList::new(["one", "two", "three", "four", "five", "six", "seven"]);

    let outcomes: Vec<bool> = (0..3).map(|_| solve(&config, &word_list).is_some()).collect();
    assert_eq!(outcomes, vec![outcomes[0]; 3]);
}
