//! Undo/redo history built from whole-diagram snapshots.
//!
//! Every mutating action records the diagram as it was immediately before the
//! change. Undo and redo move snapshots between the `past` and `future` stacks;
//! recording a new snapshot discards the `future` stack (linear history).
//!
//! Edit sessions group a burst of changes (typing a label, dragging a node, picking
//! a color) into a single undo step: [`History::begin_edit`] parks a snapshot, the
//! first change inside the session commits it, later changes add nothing, and
//! [`History::commit_edit`] closes the session.

use crate::types::Diagram;
use std::mem;

/// An open edit session. `pending` holds the pre-session snapshot until the
/// first change consumes it.
#[derive(Debug, Clone, Default)]
struct EditSession {
    pending: Option<Diagram>,
}

/// Manages undo/redo history for the editor.
#[derive(Debug, Clone, Default)]
pub struct History {
    /// Snapshots that can be restored by undo, most recent last
    past: Vec<Diagram>,
    /// Snapshots that can be restored by redo, most recent last
    future: Vec<Diagram>,
    session: Option<EditSession>,
}

impl History {
    /// Creates a new empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pushes a copy of `current` onto the undo stack and clears the redo stack.
    ///
    /// Use this when `current` is known to be about to change. [`History::record`]
    /// takes the state after the fact, once a change has been detected.
    pub fn snapshot(&mut self, current: &Diagram) {
        self.push_past(current.clone());
    }

    /// Records the state captured just before a change was applied.
    ///
    /// Inside an edit session only the first change of the session is recorded, and
    /// it records the state from when the session began.
    pub fn record(&mut self, before: Diagram) {
        match self.session.as_mut() {
            Some(session) => {
                if let Some(pending) = session.pending.take() {
                    self.push_past(pending);
                }
            }
            None => self.push_past(before),
        }
    }

    fn push_past(&mut self, snapshot: Diagram) {
        self.past.push(snapshot);
        self.future.clear();
    }

    /// Restores the most recent snapshot into `current`.
    ///
    /// The replaced state is pushed onto the redo stack. Does nothing and returns
    /// `false` when there is nothing to undo.
    pub fn undo(&mut self, current: &mut Diagram) -> bool {
        self.commit_edit();
        match self.past.pop() {
            Some(previous) => {
                self.future.push(mem::replace(current, previous));
                true
            }
            None => false,
        }
    }

    /// Re-applies the most recently undone snapshot into `current`.
    ///
    /// The replaced state is pushed back onto the undo stack. Does nothing and
    /// returns `false` when there is nothing to redo.
    pub fn redo(&mut self, current: &mut Diagram) -> bool {
        self.commit_edit();
        match self.future.pop() {
            Some(next) => {
                self.past.push(mem::replace(current, next));
                true
            }
            None => false,
        }
    }

    /// Opens an edit session. Has no effect if one is already open.
    pub fn begin_edit(&mut self, current: &Diagram) {
        if self.session.is_none() {
            self.session = Some(EditSession {
                pending: Some(current.clone()),
            });
        }
    }

    /// Closes the open edit session, if any.
    pub fn commit_edit(&mut self) {
        self.session = None;
    }

    /// Returns true while an edit session is open.
    pub fn is_editing(&self) -> bool {
        self.session.is_some()
    }

    /// Returns true if there are snapshots that can be undone.
    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    /// Returns true if there are snapshots that can be redone.
    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    /// Number of undo steps available.
    pub fn undo_len(&self) -> usize {
        self.past.len()
    }

    /// Number of redo steps available.
    pub fn redo_len(&self) -> usize {
        self.future.len()
    }

    /// Clears all undo and redo history and closes any edit session.
    pub fn clear(&mut self) {
        self.past.clear();
        self.future.clear();
        self.session = None;
    }
}
