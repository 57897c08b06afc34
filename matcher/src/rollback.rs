//! Snapshot stack over the live [`MatchState`].
//!
//! [`RollbackManager::push`] saves a full copy of the live state; the copy is
//! then either discarded ([`commit`](RollbackManager::commit)) or restored
//! ([`rollback`](RollbackManager::rollback)). Those two operations are the
//! only way the stack shrinks.
//!
//! [`Transaction`] is the scoped form: it pushes on creation and rolls back on
//! drop unless committed, so the stack stays balanced on every exit path,
//! unwinding included.

use std::ops::{Deref, DerefMut};

use tracing::trace;

use crate::state::MatchState;

/// Live match state plus its stack of snapshots.
#[derive(Debug, Clone)]
pub struct RollbackManager {
    live: MatchState,
    snapshots: Vec<MatchState>,
}

impl RollbackManager {
    pub fn new(state: MatchState) -> Self {
        Self {
            live: state,
            snapshots: Vec::new(),
        }
    }

    pub fn state(&self) -> &MatchState {
        &self.live
    }

    pub fn state_mut(&mut self) -> &mut MatchState {
        &mut self.live
    }

    /// Number of open snapshots.
    pub fn depth(&self) -> usize {
        self.snapshots.len()
    }

    /// Saves a deep copy of the live state.
    pub fn push(&mut self) {
        self.snapshots.push(self.live.clone());
        trace!(depth = self.snapshots.len(), "Pushed rollback point");
    }

    /// Drops the newest snapshot and keeps the live state.
    pub fn commit(&mut self) {
        debug_assert!(!self.snapshots.is_empty(), "commit without rollback point");
        self.snapshots.pop();
        trace!(depth = self.snapshots.len(), "Committed rollback point");
    }

    /// Replaces the live state with the newest snapshot.
    pub fn rollback(&mut self) {
        debug_assert!(!self.snapshots.is_empty(), "rollback without rollback point");
        if let Some(snapshot) = self.snapshots.pop() {
            self.live = snapshot;
        }
        trace!(depth = self.snapshots.len(), "Rolled back to rollback point");
    }

    pub fn into_state(self) -> MatchState {
        debug_assert!(self.snapshots.is_empty(), "unbalanced rollback points");
        self.live
    }
}

impl AsMut<RollbackManager> for RollbackManager {
    fn as_mut(&mut self) -> &mut RollbackManager {
        self
    }
}

/// Scoped rollback point over anything that owns a [`RollbackManager`].
///
/// Dereferences to the owner so nested matching can continue through the
/// guard.
///
/// # Examples
///
/// ```
/// use usage_grammar_core::GrammarClasses;
/// use usage_grammar_match::rollback::{RollbackManager, Transaction};
/// use usage_grammar_match::state::MatchState;
///
/// let mut manager = RollbackManager::new(MatchState::new(2, &GrammarClasses::new()));
/// {
///     let mut tx = Transaction::begin(&mut manager);
///     tx.state_mut().set_consumed(0);
///     // dropped without commit: rolled back
/// }
/// assert!(!manager.state().is_consumed(0));
///
/// let mut tx = Transaction::begin(&mut manager);
/// tx.state_mut().set_consumed(1);
/// tx.commit();
/// assert!(manager.state().is_consumed(1));
/// assert_eq!(manager.depth(), 0);
/// ```
pub struct Transaction<'a, T: AsMut<RollbackManager>> {
    owner: &'a mut T,
    settled: bool,
}

impl<'a, T: AsMut<RollbackManager>> Transaction<'a, T> {
    pub fn begin(owner: &'a mut T) -> Self {
        owner.as_mut().push();
        Self {
            owner,
            settled: false,
        }
    }

    pub fn commit(mut self) {
        self.owner.as_mut().commit();
        self.settled = true;
    }

    pub fn rollback(mut self) {
        self.owner.as_mut().rollback();
        self.settled = true;
    }
}

impl<T: AsMut<RollbackManager>> Deref for Transaction<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &*self.owner
    }
}

impl<T: AsMut<RollbackManager>> DerefMut for Transaction<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut *self.owner
    }
}

impl<T: AsMut<RollbackManager>> Drop for Transaction<'_, T> {
    fn drop(&mut self) {
        if !self.settled {
            self.owner.as_mut().rollback();
        }
    }
}
