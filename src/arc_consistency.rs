//! AC-3 constraint propagation over the crossings between slots.
//!
//! Arcs are processed in FIFO order, and an arc that is already waiting in the queue is never
//! enqueued a second time. The pruning a pass produces doesn't depend on this order, but the
//! amount of work does, and fixing it keeps fills reproducible.

use std::collections::{HashMap, HashSet, VecDeque};

use bit_set::BitSet;
use tracing::trace;

use crate::domains::Domains;
use crate::grid_config::GridConfig;
use crate::word_list::WordList;
use crate::{SlotId, WordId};

/// A directed constraint: make the first slot consistent with the second.
pub type Arc = (SlotId, SlotId);

/// How many of a slot's options place each character at a given cell.
pub type GlyphCounts = HashMap<char, usize>;

/// Count the characters appearing at `cell_idx` across a set of options. Options too short to
/// reach the cell don't contribute anything.
pub fn build_glyph_counts(word_list: &WordList, options: &BitSet, cell_idx: usize) -> GlyphCounts {
    let mut counts = GlyphCounts::new();

    for word_id in options {
        if let Some(glyph) = word_list.get(word_id).char_at(cell_idx) {
            *counts.entry(glyph).or_insert(0) += 1;
        }
    }

    counts
}

/// How many of `other_options` agree with `word_id` at the crossing `(cell_idx, other_cell_idx)`,
/// given the precomputed counts for `other_options` at `other_cell_idx`. The word itself never
/// counts as support, since the same word can't fill two slots.
pub fn count_supporting_options(
    word_list: &WordList,
    other_options: &BitSet,
    other_glyph_counts: &GlyphCounts,
    word_id: WordId,
    (cell_idx, other_cell_idx): (usize, usize),
) -> usize {
    let word = word_list.get(word_id);
    let Some(glyph) = word.char_at(cell_idx) else {
        return 0;
    };

    let mut count = other_glyph_counts.get(&glyph).copied().unwrap_or(0);
    if other_options.contains(word_id) && word.char_at(other_cell_idx) == Some(glyph) {
        count -= 1;
    }

    count
}

/// Make `x` arc consistent with `y` by removing every option of `x` that has no supporting option
/// in `y`. Returns whether `x`'s domain changed; slots that don't cross are left alone.
pub fn revise(
    config: &GridConfig,
    word_list: &WordList,
    domains: &mut Domains,
    x: SlotId,
    y: SlotId,
) -> bool {
    let Some(overlap) = config.overlap(x, y) else {
        return false;
    };

    let other_options = domains.options(y);
    let other_glyph_counts = build_glyph_counts(word_list, other_options, overlap.1);

    let unsupported: Vec<WordId> = domains
        .options(x)
        .iter()
        .filter(|&word_id| {
            count_supporting_options(word_list, other_options, &other_glyph_counts, word_id, overlap)
                == 0
        })
        .collect();

    for &word_id in &unsupported {
        domains.remove(x, word_id);
    }

    !unsupported.is_empty()
}

/// Every directed arc between crossing slots.
pub fn all_arcs(config: &GridConfig) -> Vec<Arc> {
    (0..config.slot_count())
        .flat_map(|x| config.neighbors(x).map(move |y| (x, y)))
        .collect()
}

/// Work queue of arcs still to be revised.
#[derive(Debug, Default)]
struct ArcQueue {
    queue: VecDeque<Arc>,
    pending: HashSet<Arc>,
}

impl ArcQueue {
    fn with_initial_queue<Items>(items: Items) -> ArcQueue
    where
        Items: IntoIterator<Item = Arc>,
    {
        let mut queue = ArcQueue::default();
        for arc in items {
            queue.enqueue(arc);
        }
        queue
    }

    fn pop_front(&mut self) -> Option<Arc> {
        let arc = self.queue.pop_front()?;
        self.pending.remove(&arc);
        Some(arc)
    }

    fn enqueue(&mut self, arc: Arc) {
        if self.pending.insert(arc) {
            self.queue.push_back(arc);
        }
    }
}

/// Enforce arc consistency, starting from the given arcs or, if `arcs` is `None`, from every arc
/// in the grid. Returns false as soon as any slot runs out of options; otherwise true once no
/// further pruning is possible. A true result doesn't mean a fill exists.
pub fn ac3(
    config: &GridConfig,
    word_list: &WordList,
    domains: &mut Domains,
    arcs: Option<Vec<Arc>>,
) -> bool {
    let mut queue = ArcQueue::with_initial_queue(arcs.unwrap_or_else(|| all_arcs(config)));
    let mut revisions = 0usize;

    while let Some((x, y)) = queue.pop_front() {
        if !revise(config, word_list, domains, x, y) {
            continue;
        }
        revisions += 1;

        if domains.is_empty(x) {
            trace!(slot_id = x, revisions, "arc consistency emptied a domain");
            return false;
        }

        // Anything that was relying on the options we just removed from `x` needs another look.
        for z in config.neighbors(x) {
            if z != y {
                queue.enqueue((z, x));
            }
        }
    }

    trace!(revisions, "arc consistency established");
    true
}
