use std::collections::{BTreeMap, HashMap};

use smallvec::{smallvec, SmallVec};

use crate::grid_config::{GridConfig, Variable};
use crate::word_list::WordList;
use crate::{SlotId, WordId};

/// A struct recording a slot assignment made during the filling process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Choice {
    pub slot_id: SlotId,
    pub word_id: WordId,
}

/// A partial or complete mapping from slots to words. Alongside the forward mapping we keep a
/// reverse index from each word to the slots holding it, so repeated words can be detected
/// without rescanning every choice.
#[derive(Debug, Clone, Default)]
pub struct Assignment {
    choices: BTreeMap<SlotId, WordId>,
    slots_by_word: HashMap<WordId, SmallVec<[SlotId; 2]>>,

    /// Number of words currently held by more than one slot.
    repeated_word_count: usize,
}

impl Assignment {
    pub fn new() -> Assignment {
        Assignment::default()
    }

    pub fn len(&self) -> usize {
        self.choices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.choices.is_empty()
    }

    pub fn contains(&self, slot_id: SlotId) -> bool {
        self.choices.contains_key(&slot_id)
    }

    pub fn get(&self, slot_id: SlotId) -> Option<WordId> {
        self.choices.get(&slot_id).copied()
    }

    /// Is there a word for every slot in the grid?
    pub fn is_complete(&self, config: &GridConfig) -> bool {
        self.choices.len() == config.slot_count()
    }

    /// Put a word in a slot, returning whatever the slot held before.
    pub fn assign(&mut self, slot_id: SlotId, word_id: WordId) -> Option<WordId> {
        let previous = self.unassign(slot_id);

        let slots = self.slots_by_word.entry(word_id).or_insert_with(|| smallvec![]);
        slots.push(slot_id);
        if slots.len() == 2 {
            self.repeated_word_count += 1;
        }

        self.choices.insert(slot_id, word_id);
        previous
    }

    /// Clear a slot, returning the word it held.
    pub fn unassign(&mut self, slot_id: SlotId) -> Option<WordId> {
        let word_id = self.choices.remove(&slot_id)?;

        if let Some(slots) = self.slots_by_word.get_mut(&word_id) {
            if slots.len() == 2 {
                self.repeated_word_count -= 1;
            }
            slots.retain(|&mut other_slot_id| other_slot_id != slot_id);
            if slots.is_empty() {
                self.slots_by_word.remove(&word_id);
            }
        }

        Some(word_id)
    }

    /// Does any word currently fill more than one slot?
    pub fn has_repeated_words(&self) -> bool {
        self.repeated_word_count > 0
    }

    /// The slots currently holding the given word.
    pub fn slots_for_word(&self, word_id: WordId) -> &[SlotId] {
        self.slots_by_word.get(&word_id).map(|slots| slots.as_slice()).unwrap_or(&[])
    }

    /// Choices in ascending slot order.
    pub fn iter(&self) -> impl Iterator<Item = Choice> + '_ {
        self.choices.iter().map(|(&slot_id, &word_id)| Choice { slot_id, word_id })
    }

    pub fn choices(&self) -> Vec<Choice> {
        self.iter().collect()
    }

    /// Resolve ids into the slots and word strings they stand for.
    pub fn resolve<'a>(
        &self,
        config: &'a GridConfig,
        word_list: &'a WordList,
    ) -> Vec<(&'a Variable, &'a str)> {
        self.iter()
            .map(|Choice { slot_id, word_id }| {
                (config.variable(slot_id), word_list.get(word_id).string.as_str())
            })
            .collect()
    }
}
