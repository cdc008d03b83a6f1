//! Linked action resolution.
//!
//! A *group* is a main entry plus every entry whose `linked_action_id`
//! names it. Undoing any member of a group removes the whole group.
//!
//! [`LinkIndex`] is built in one pass over the log and answers group queries
//! by lookup, so resolving a group never rescans the log.

use std::collections::HashMap;

use tally_core::entry::{EntryId, LogEntry};

use crate::state::GameState;

// ---------------------------------------------------------------------------
// LinkIndex
// ---------------------------------------------------------------------------

/// Id-to-position index and main-to-dependents index over one log.
#[derive(Debug, Clone)]
pub struct LinkIndex {
    positions: HashMap<EntryId, usize>,
    dependents: HashMap<EntryId, Vec<usize>>,
    len: usize,
}

/// The members of a linked group, as log indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkGroup {
    /// The entry the group was resolved from.
    pub target: usize,
    /// The group's main entry, or `None` when the target links to an id that
    /// is not in the log.
    pub main: Option<usize>,
    /// Every index to remove, ascending and without duplicates.
    pub members: Vec<usize>,
}

impl LinkIndex {
    pub fn build(log: &[LogEntry]) -> Self {
        let mut positions = HashMap::with_capacity(log.len());
        let mut dependents: HashMap<EntryId, Vec<usize>> = HashMap::new();
        for (index, entry) in log.iter().enumerate() {
            positions.insert(entry.id, index);
            if let Some(main) = entry.linked_action_id {
                dependents.entry(main).or_default().push(index);
            }
        }
        Self {
            positions,
            dependents,
            len: log.len(),
        }
    }

    /// Log index of the entry with `id`.
    pub fn position(&self, id: EntryId) -> Option<usize> {
        self.positions.get(&id).copied()
    }

    /// Indices of entries linked to `main`.
    pub fn dependents_of(&self, main: EntryId) -> &[usize] {
        self.dependents.get(&main).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Resolve the group containing log entry `index`.
    ///
    /// A target whose link dangles forms a group of one.
    pub fn group(&self, log: &[LogEntry], index: usize) -> Option<LinkGroup> {
        if index >= self.len {
            return None;
        }
        let target = &log[index];
        let main_id = target.main_id();
        let Some(main) = self.position(main_id) else {
            return Some(LinkGroup {
                target: index,
                main: None,
                members: vec![index],
            });
        };

        let mut members = Vec::with_capacity(1 + self.dependents_of(main_id).len());
        members.push(main);
        members.extend_from_slice(self.dependents_of(main_id));
        members.push(index);
        members.sort_unstable();
        members.dedup();

        Some(LinkGroup {
            target: index,
            main: Some(main),
            members,
        })
    }
}

/// Resolve the linked group of log entry `index` in `log`.
pub fn linked_group(log: &[LogEntry], index: usize) -> Option<LinkGroup> {
    LinkIndex::build(log).group(log, index)
}

/// A copy of `state` whose log no longer contains entry `index` or anything
/// in its linked group. Counters and the time cache are left as they were;
/// reconstruct the result to bring them in line with the shorter log.
pub fn remove_target_and_linked(state: &GameState, index: usize) -> GameState {
    let mut next = state.clone();
    let Some(group) = linked_group(&state.log, index) else {
        return next;
    };
    let mut remove = vec![false; state.log.len()];
    for member in &group.members {
        remove[*member] = true;
    }
    next.log = state
        .log
        .iter()
        .zip(remove)
        .filter(|(_, removed)| !removed)
        .map(|(entry, _)| entry.clone())
        .collect();
    next
}
