//! Backtracking search over slot assignments, re-running AC-3 from the crossings of each choice.
//!
//! Slots are picked by minimum remaining values with degree as the tie-breaker, and words are
//! tried in least-constraining-value order. Pruning done by AC-3 during the search is never
//! undone on backtrack: every word it removes has no support in a crossing slot's options, so it
//! couldn't appear in any complete fill anyway. The consistency check on each extended
//! assignment is what actually guarantees the result is valid.

use std::cmp::Reverse;

use instant::{Duration, Instant};
use smallvec::{smallvec, SmallVec};
use tracing::{debug, trace};

use crate::arc_consistency::{ac3, build_glyph_counts, count_supporting_options, Arc, GlyphCounts};
use crate::assignment::Assignment;
use crate::consistency::is_consistent;
use crate::domains::Domains;
use crate::grid_config::{Crossing, GridConfig};
use crate::word_list::WordList;
use crate::{SlotId, WordId, MAX_SLOT_LENGTH};

/// A struct tracking statistics about the filling process.
#[derive(Debug, Clone, Default)]
pub struct Statistics {
    /// Number of times we picked a slot to branch on.
    pub states: u64,

    /// Number of words we committed and later had to take back.
    pub backtracks: u64,

    /// Number of slots filled because propagation left them with a single option.
    pub inferred: u64,

    pub duration: Duration,
}

/// A struct representing the results of a fill operation.
#[derive(Debug)]
pub struct FillSuccess {
    pub statistics: Statistics,
    pub assignment: Assignment,
}

/// Why a grid couldn't be filled. Both cases mean the same thing to a caller (no fill exists);
/// they only differ in how early we found out.
#[derive(Debug)]
pub enum FillFailure {
    /// Node or arc consistency left some slot without any options before searching.
    EmptyDomain(Statistics),

    /// The search tried every branch.
    Exhausted(Statistics),
}

impl FillFailure {
    pub fn statistics(&self) -> &Statistics {
        match self {
            FillFailure::EmptyDomain(statistics) | FillFailure::Exhausted(statistics) => statistics,
        }
    }
}

/// Choose the unfilled slot with the fewest remaining options, preferring the one with the most
/// crossings on a tie and then the lowest id. Returns `None` if every slot is filled.
pub fn select_unassigned_variable(
    config: &GridConfig,
    domains: &Domains,
    assignment: &Assignment,
) -> Option<SlotId> {
    (0..config.slot_count())
        .filter(|&slot_id| !assignment.contains(slot_id))
        .min_by_key(|&slot_id| (domains.len(slot_id), Reverse(config.degree(slot_id))))
}

/// Return the options for a slot, ordered by how many options they would rule out in the
/// crossing slots that are still unfilled. An option of a crossing slot is ruled out if it
/// disagrees at the shared cell or is the same word. Ties keep ascending `WordId` order.
pub fn order_domain_values(
    config: &GridConfig,
    word_list: &WordList,
    domains: &Domains,
    slot_id: SlotId,
    assignment: &Assignment,
) -> Vec<WordId> {
    let crossing_counts: SmallVec<[(&Crossing, usize, GlyphCounts); MAX_SLOT_LENGTH]> = config
        .crossings(slot_id)
        .iter()
        .filter(|crossing| !assignment.contains(crossing.other_slot_id))
        .map(|crossing| {
            let other_options = domains.options(crossing.other_slot_id);
            (
                crossing,
                other_options.len(),
                build_glyph_counts(word_list, other_options, crossing.other_slot_cell),
            )
        })
        .collect();

    let mut ranked: Vec<(usize, WordId)> = domains
        .options(slot_id)
        .iter()
        .map(|word_id| {
            let ruled_out: usize = crossing_counts
                .iter()
                .map(|(crossing, option_count, glyph_counts)| {
                    option_count
                        - count_supporting_options(
                            word_list,
                            domains.options(crossing.other_slot_id),
                            glyph_counts,
                            word_id,
                            (crossing.cell_idx, crossing.other_slot_cell),
                        )
                })
                .sum();

            (ruled_out, word_id)
        })
        .collect();

    ranked.sort_by_key(|&(ruled_out, _)| ruled_out);
    ranked.into_iter().map(|(_, word_id)| word_id).collect()
}

/// Owns the mutable state of a single fill attempt: the domains and the running statistics. The
/// grid and vocabulary are only borrowed.
pub struct Filler<'a> {
    config: &'a GridConfig,
    word_list: &'a WordList,
    domains: Domains,
    statistics: Statistics,
}

impl<'a> Filler<'a> {
    /// Start with every slot allowed any word in the vocabulary.
    pub fn new(config: &'a GridConfig, word_list: &'a WordList) -> Filler<'a> {
        Filler {
            config,
            word_list,
            domains: Domains::new(config, word_list),
            statistics: Statistics::default(),
        }
    }

    pub fn domains(&self) -> &Domains {
        &self.domains
    }

    pub fn statistics(&self) -> &Statistics {
        &self.statistics
    }

    pub fn enforce_node_consistency(&mut self) {
        self.domains.enforce_node_consistency(self.config, self.word_list);
    }

    pub fn ac3(&mut self, arcs: Option<Vec<Arc>>) -> bool {
        ac3(self.config, self.word_list, &mut self.domains, arcs)
    }

    /// Propagate a choice we just committed for `slot_id`, then fill any unfilled crossing slot
    /// that's down to a single option, as long as doing so keeps the assignment consistent.
    /// Returns the slots filled this way so they can be cleared together with `slot_id`.
    fn propagate_choice(
        &mut self,
        slot_id: SlotId,
        assignment: &mut Assignment,
    ) -> SmallVec<[SlotId; MAX_SLOT_LENGTH]> {
        let mut inferred: SmallVec<[SlotId; MAX_SLOT_LENGTH]> = smallvec![];

        let arcs: Vec<Arc> =
            self.config.neighbors(slot_id).map(|neighbor| (neighbor, slot_id)).collect();
        if !self.ac3(Some(arcs)) {
            // A crossing slot ran dry. Keep going anyway: if it's still unfilled, the next call to
            // `backtrack` selects it first and fails out of this branch.
            trace!(slot_id, "propagation emptied a crossing slot");
            return inferred;
        }

        for neighbor in self.config.neighbors(slot_id) {
            if assignment.contains(neighbor) {
                continue;
            }
            let Some(word_id) = self.domains.single_option(neighbor) else {
                continue;
            };

            assignment.assign(neighbor, word_id);
            if is_consistent(self.config, self.word_list, assignment) {
                inferred.push(neighbor);
            } else {
                assignment.unassign(neighbor);
            }
        }

        self.statistics.inferred += inferred.len() as u64;
        inferred
    }

    /// Extend `assignment` to a complete one if possible. On success, returns true and leaves the
    /// complete assignment in place; on failure, returns false with `assignment` as it was passed
    /// in.
    pub fn backtrack(&mut self, assignment: &mut Assignment) -> bool {
        if assignment.is_complete(self.config) {
            return true;
        }

        let Some(slot_id) = select_unassigned_variable(self.config, &self.domains, assignment) else {
            return false;
        };
        self.statistics.states += 1;

        let options =
            order_domain_values(self.config, self.word_list, &self.domains, slot_id, assignment);
        trace!(
            slot_id,
            options = options.len(),
            filled = assignment.len(),
            "selected slot"
        );

        for word_id in options {
            assignment.assign(slot_id, word_id);
            if !is_consistent(self.config, self.word_list, assignment) {
                assignment.unassign(slot_id);
                continue;
            }

            let inferred = self.propagate_choice(slot_id, assignment);

            if self.backtrack(assignment) {
                return true;
            }

            self.statistics.backtracks += 1;
            assignment.unassign(slot_id);
            for inferred_slot_id in inferred {
                assignment.unassign(inferred_slot_id);
            }
        }

        false
    }

    /// Enforce node and arc consistency, and then search for a complete fill.
    pub fn fill(mut self) -> Result<FillSuccess, FillFailure> {
        let start = Instant::now();

        self.enforce_node_consistency();
        let empty_slot_id =
            (0..self.config.slot_count()).find(|&slot_id| self.domains.is_empty(slot_id));
        if let Some(slot_id) = empty_slot_id {
            debug!(slot_id, "no words fit slot");
            self.statistics.duration = start.elapsed();
            return Err(FillFailure::EmptyDomain(self.statistics));
        }

        if !self.ac3(None) {
            debug!("initial arc consistency emptied a slot");
            self.statistics.duration = start.elapsed();
            return Err(FillFailure::EmptyDomain(self.statistics));
        }
        debug!(sizes = ?self.domains.sizes(), "established initial arc consistency");

        let mut assignment = Assignment::new();
        let found = self.backtrack(&mut assignment);
        self.statistics.duration = start.elapsed();

        debug!(
            found,
            states = self.statistics.states,
            backtracks = self.statistics.backtracks,
            duration = ?self.statistics.duration,
            "search finished"
        );

        if found {
            Ok(FillSuccess { statistics: self.statistics, assignment })
        } else {
            Err(FillFailure::Exhausted(self.statistics))
        }
    }
}

/// Search for a valid fill for the given grid and vocabulary.
pub fn find_fill(config: &GridConfig, word_list: &WordList) -> Result<FillSuccess, FillFailure> {
    Filler::new(config, word_list).fill()
}

/// Like `find_fill`, but only reports the assignment, or `None` if the grid can't be filled.
pub fn solve(config: &GridConfig, word_list: &WordList) -> Option<Assignment> {
    find_fill(config, word_list).ok().map(|success| success.assignment)
}

#[cfg(test)]
mod tests {
    use super::{find_fill, order_domain_values, select_unassigned_variable, solve, FillFailure, Filler};
    use crate::assignment::Assignment;
    use crate::consistency::is_consistent;
    use crate::domains::initialize_domains;
    use crate::grid_config::{generate_grid_config_from_template_string, Direction, GridConfig, Variable};
    use crate::word_list::WordList;
    use pretty_assertions::assert_eq;

    fn resolved(config: &GridConfig, word_list: &WordList, assignment: &Assignment) -> Vec<String> {
        assignment.resolve(config, word_list).into_iter().map(|(_, word)| word.to_string()).collect()
    }

    #[test]
    fn test_empty_grid_is_trivially_filled() {
        let config = GridConfig::from_overlaps(vec![], []);
        let word_list = WordList::new(["WORD"]);

        let assignment = solve(&config, &word_list).expect("Failed to find a fill");
        assert!(assignment.is_empty());
    }

    #[test]
    fn test_single_slot_gets_a_word_of_its_length() {
        let config = GridConfig::from_overlaps(vec![Variable::new(0, 0, Direction::Across, 4)], []);
        let word_list = WordList::new(["WORD", "TREE", "CAT"]);

        let assignment = solve(&config, &word_list).expect("Failed to find a fill");
        let words = resolved(&config, &word_list, &assignment);
        assert_eq!(words.len(), 1);
        assert!(words[0] == "WORD" || words[0] == "TREE");
    }

    #[test]
    fn test_crossing_pair_finds_the_only_fill() {
        let config = GridConfig::from_overlaps(
            vec![Variable::new(0, 0, Direction::Across, 3), Variable::new(0, 1, Direction::Down, 3)],
            [((0, 1), (1, 0))],
        );
        let word_list = WordList::new(["CAT", "ART", "DOG"]);

        let assignment = solve(&config, &word_list).expect("Failed to find a fill");
        assert_eq!(resolved(&config, &word_list, &assignment), vec!["CAT", "ART"]);
    }

    #[test]
    fn test_repeated_word_is_never_used() {
        let config = GridConfig::from_overlaps(
            vec![Variable::new(0, 0, Direction::Across, 3), Variable::new(2, 0, Direction::Across, 3)],
            [],
        );
        let word_list = WordList::new(["CAT", "HOUSE"]);

        assert!(solve(&config, &word_list).is_none());
        assert!(matches!(find_fill(&config, &word_list), Err(FillFailure::Exhausted(_))));
    }

    #[test]
    fn test_missing_length_fails_before_searching() {
        let config = GridConfig::from_overlaps(vec![Variable::new(0, 0, Direction::Across, 5)], []);
        let word_list = WordList::new(["CAT", "TREE"]);

        match find_fill(&config, &word_list) {
            Err(FillFailure::EmptyDomain(statistics)) => assert_eq!(statistics.states, 0),
            other => panic!("expected an empty domain, got {:?}", other),
        }
    }

    /// ___
    /// _#_
    /// ___
    #[test]
    fn test_fill_for_ring() {
        let config = generate_grid_config_from_template_string("___\n_#_\n___").expect("template should load");
        let word_list = WordList::new(["CAT", "TOE", "COT", "EAR", "ART", "TAR", "RAT", "ACE", "BUS"]);

        let result = find_fill(&config, &word_list).expect("Failed to find a fill");
        assert!(result.assignment.is_complete(&config));
        assert!(is_consistent(&config, &word_list, &result.assignment));
        assert!(result.statistics.states > 0);
    }

    #[test]
    fn test_fill_fails_gracefully() {
        let config = generate_grid_config_from_template_string("___\n_#_\n___").expect("template should load");
        let word_list = WordList::new(["CAT", "DOG", "BUS", "EMU"]);

        assert!(solve(&config, &word_list).is_none());
    }

    #[test]
    fn test_fill_is_deterministic() {
        let config = generate_grid_config_from_template_string("____\n_##_\n____").expect("template should load");
        let word_list = WordList::new([
            "COOL", "CORE", "LOVE", "LATE", "CAT", "CUT", "EYE", "ERA", "ACE", "ORE", "LUTE", "CELL",
        ]);

        let first = solve(&config, &word_list).map(|assignment| assignment.choices());
        let second = solve(&config, &word_list).map(|assignment| assignment.choices());
        assert_eq!(first, second);
    }

    #[test]
    fn test_select_unassigned_variable_prefers_small_domains_then_degree() {
        // Slots 0 and 2 have two options each, slot 1 has three. Slot 2 crosses more slots.
        let config = GridConfig::from_overlaps(
            vec![
                Variable::new(0, 0, Direction::Across, 2),
                Variable::new(0, 3, Direction::Across, 3),
                Variable::new(0, 0, Direction::Down, 4),
            ],
            [((2, 0), (0, 0)), ((2, 1), (3, 0))],
        );
        let word_list = WordList::new(["AB", "CD", "ABC", "DEF", "GHI", "ABCD", "EFGH"]);
        let domains = initialize_domains(&config, &word_list);

        let mut assignment = Assignment::new();
        assert_eq!(select_unassigned_variable(&config, &domains, &assignment), Some(2));

        assignment.assign(2, 5);
        assert_eq!(select_unassigned_variable(&config, &domains, &assignment), Some(0));

        assignment.assign(0, 0);
        assignment.assign(1, 2);
        assert_eq!(select_unassigned_variable(&config, &domains, &assignment), None);
    }

    #[test]
    fn test_order_domain_values_prefers_least_constraining() {
        let config = GridConfig::from_overlaps(
            vec![Variable::new(0, 0, Direction::Across, 3), Variable::new(0, 0, Direction::Down, 3)],
            [((0, 1), (0, 0))],
        );
        // An "A" word leaves the down slot two other "A" words; "Z" and "B" words leave it nothing.
        let word_list = WordList::new(["ZOO", "ACE", "ART", "ASH", "BOX"]);
        let domains = initialize_domains(&config, &word_list);

        let order = order_domain_values(&config, &word_list, &domains, 0, &Assignment::new());
        let order: Vec<&str> = order.iter().map(|&word_id| word_list.get(word_id).string.as_str()).collect();
        assert_eq!(order, vec!["ACE", "ART", "ASH", "ZOO", "BOX"]);
    }

    #[test]
    fn test_order_domain_values_ignores_filled_crossings() {
        let config = GridConfig::from_overlaps(
            vec![Variable::new(0, 0, Direction::Across, 3), Variable::new(0, 0, Direction::Down, 3)],
            [((0, 1), (0, 0))],
        );
        let word_list = WordList::new(["ZOO", "ACE", "ART"]);
        let domains = initialize_domains(&config, &word_list);

        let mut assignment = Assignment::new();
        assignment.assign(1, 1);

        let order = order_domain_values(&config, &word_list, &domains, 0, &assignment);
        assert_eq!(order, vec![0, 1, 2]);
    }

    #[test]
    fn test_single_option_crossing_is_filled_by_inference() {
        let config = GridConfig::from_overlaps(
            vec![Variable::new(0, 0, Direction::Across, 3), Variable::new(0, 1, Direction::Down, 3)],
            [((0, 1), (1, 0))],
        );
        let word_list = WordList::new(["CAT", "ART", "DOG"]);

        let result = find_fill(&config, &word_list).expect("Failed to find a fill");
        assert!(result.assignment.is_complete(&config));
        assert!(is_consistent(&config, &word_list, &result.assignment));
        assert_eq!(resolved(&config, &word_list, &result.assignment), vec!["CAT", "ART"]);

        // Only the first slot was branched on; its crossing was inferred.
        assert_eq!(result.statistics.states, 1);
        assert_eq!(result.statistics.inferred, 1);
        assert_eq!(result.statistics.backtracks, 0);
    }

    #[test]
    fn test_inferred_slots_are_cleared_when_the_branch_fails() {
        // Slots 0 and 1 cross and are forced to CAT/ART. Slot 2 crosses nothing, but every word
        // that fits it is already used, so the branch fails after the inference.
        let config = GridConfig::from_overlaps(
            vec![
                Variable::new(0, 0, Direction::Across, 3),
                Variable::new(0, 1, Direction::Down, 3),
                Variable::new(4, 0, Direction::Across, 3),
            ],
            [((0, 1), (1, 0))],
        );
        let word_list = WordList::new(["CAT", "ART"]);

        let mut filler = Filler::new(&config, &word_list);
        filler.enforce_node_consistency();
        assert!(filler.ac3(None));
        assert_eq!(filler.domains().sizes(), vec![1, 1, 2]);

        let mut assignment = Assignment::new();
        assert!(!filler.backtrack(&mut assignment));
        assert!(assignment.is_empty());
        assert_eq!(filler.statistics().inferred, 1);
        assert_eq!(filler.statistics().backtracks, 1);

        match find_fill(&config, &word_list) {
            Err(FillFailure::Exhausted(statistics)) => assert_eq!(statistics.inferred, 1),
            other => panic!("expected an exhausted search, got {:?}", other),
        }
    }

    #[test]
    fn test_filler_steps_match_fill() {
        let config = GridConfig::from_overlaps(
            vec![Variable::new(0, 0, Direction::Across, 3), Variable::new(0, 1, Direction::Down, 3)],
            [((0, 1), (1, 0))],
        );
        let word_list = WordList::new(["CAT", "ART", "DOG", "TREE"]);

        let mut filler = Filler::new(&config, &word_list);
        assert_eq!(filler.domains().len(0), 4);

        filler.enforce_node_consistency();
        assert_eq!(filler.domains().sizes(), vec![3, 3]);

        assert!(filler.ac3(None));
        assert_eq!(filler.domains().sizes(), vec![1, 1]);

        let mut assignment = Assignment::new();
        assert!(filler.backtrack(&mut assignment));
        assert_eq!(resolved(&config, &word_list, &assignment), vec!["CAT", "ART"]);
    }
}
