use bit_set::BitSet;
use tracing::debug;

use crate::grid_config::GridConfig;
use crate::word_list::WordList;
use crate::{SlotId, WordId};

/// The live candidate words for every slot, stored as a set of `WordId`s per `SlotId`. Domains
/// only shrink while filling; nothing here ever adds a word back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Domains {
    options: Vec<BitSet>,
}

impl Domains {
    /// Give every slot the full vocabulary, regardless of length.
    pub fn new(config: &GridConfig, word_list: &WordList) -> Domains {
        let all_words: BitSet = (0..word_list.len()).collect();

        Domains {
            options: (0..config.slot_count()).map(|_| all_words.clone()).collect(),
        }
    }

    /// Remove every word whose length differs from its slot's length. Running this more than once
    /// has no further effect.
    pub fn enforce_node_consistency(&mut self, config: &GridConfig, word_list: &WordList) {
        for (slot_id, options) in self.options.iter_mut().enumerate() {
            let length = config.variable(slot_id).length;
            let mismatched: Vec<WordId> =
                options.iter().filter(|&word_id| word_list.get(word_id).len() != length).collect();

            for word_id in mismatched {
                options.remove(word_id);
            }
        }
    }

    pub fn options(&self, slot_id: SlotId) -> &BitSet {
        &self.options[slot_id]
    }

    pub fn len(&self, slot_id: SlotId) -> usize {
        self.options[slot_id].len()
    }

    pub fn is_empty(&self, slot_id: SlotId) -> bool {
        self.options[slot_id].is_empty()
    }

    pub fn contains(&self, slot_id: SlotId, word_id: WordId) -> bool {
        self.options[slot_id].contains(word_id)
    }

    pub fn remove(&mut self, slot_id: SlotId, word_id: WordId) -> bool {
        self.options[slot_id].remove(word_id)
    }

    /// The sole remaining option for a slot, if it has exactly one.
    pub fn single_option(&self, slot_id: SlotId) -> Option<WordId> {
        let mut options = self.options[slot_id].iter();
        let word_id = options.next()?;
        options.next().is_none().then_some(word_id)
    }

    /// Per-slot option counts, mostly useful for logging and tests.
    pub fn sizes(&self) -> Vec<usize> {
        self.options.iter().map(|options| options.len()).collect()
    }
}

/// Build node-consistent domains: every slot starts with the whole vocabulary and is then cut down
/// to words of exactly its length. A slot with no words of its length ends up empty, which the
/// later stages treat as an ordinary unfillable grid.
pub fn initialize_domains(config: &GridConfig, word_list: &WordList) -> Domains {
    let mut domains = Domains::new(config, word_list);
    domains.enforce_node_consistency(config, word_list);

    debug!(sizes = ?domains.sizes(), "enforced node consistency");

    domains
}
