use std::collections::HashMap;
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::thread::{self, ThreadId};

use jmodel_types::{ClassRef, ModelError, Result};

use crate::sync::lock;

/// Rendezvous for one in-flight class construction.
///
/// The thread that creates the slot runs the builder; every other caller for the same name waits
/// here and receives the same outcome, success or failure.
#[derive(Debug)]
pub(crate) struct ConstructionSlot {
    owner: ThreadId,
    state: Mutex<SlotState>,
    ready: Condvar,
}

#[derive(Debug)]
enum SlotState {
    Building,
    Done(Result<ClassRef>),
}

impl ConstructionSlot {
    pub(crate) fn new() -> Self {
        Self::owned_by(thread::current().id())
    }

    fn owned_by(owner: ThreadId) -> Self {
        Self {
            owner,
            state: Mutex::new(SlotState::Building),
            ready: Condvar::new(),
        }
    }

    pub(crate) fn wait(&self) -> Result<ClassRef> {
        let mut state = lock(&self.state);
        loop {
            match &*state {
                SlotState::Done(result) => return result.clone(),
                SlotState::Building => {
                    state = self
                        .ready
                        .wait(state)
                        .unwrap_or_else(PoisonError::into_inner);
                }
            }
        }
    }

    fn is_done(&self) -> bool {
        matches!(*lock(&self.state), SlotState::Done(_))
    }

    /// Publish the outcome. Only the first call has an effect.
    pub(crate) fn complete(&self, result: Result<ClassRef>) {
        let mut state = lock(&self.state);
        if matches!(*state, SlotState::Building) {
            *state = SlotState::Done(result);
            self.ready.notify_all();
        }
    }

    pub(crate) fn abandon(&self, name: &str) {
        self.complete(Err(ModelError::class_resolution(
            name,
            "class construction was abandoned (builder panicked)",
        )));
    }
}

/// In-flight constructions by name, plus which thread is blocked on which of them.
///
/// A thread may only start waiting if the owners it would transitively wait on never lead back
/// to itself. Edges are added under the same lock that checks them, so the waits-for graph stays
/// acyclic and no set of builders can block each other forever.
#[derive(Debug, Default)]
pub(crate) struct PendingTable {
    slots: HashMap<Arc<str>, Arc<ConstructionSlot>>,
    waits: HashMap<ThreadId, Arc<ConstructionSlot>>,
}

impl PendingTable {
    pub(crate) fn get(&self, name: &str) -> Option<Arc<ConstructionSlot>> {
        self.slots.get(name).cloned()
    }

    /// Open a slot for `name`, owned by the current thread.
    pub(crate) fn claim(&mut self, name: &str) -> Arc<ConstructionSlot> {
        let slot = Arc::new(ConstructionSlot::new());
        self.slots.insert(Arc::from(name), Arc::clone(&slot));
        slot
    }

    pub(crate) fn release(&mut self, name: &str) {
        self.slots.remove(name);
    }

    /// Record that the current thread is about to wait on `slot`. Returns `false`, recording
    /// nothing, when that wait would close a cycle.
    pub(crate) fn start_waiting(&mut self, slot: &Arc<ConstructionSlot>) -> bool {
        let waiter = thread::current().id();
        if self.would_deadlock(waiter, slot) {
            return false;
        }
        self.waits.insert(waiter, Arc::clone(slot));
        true
    }

    pub(crate) fn stop_waiting(&mut self) {
        self.waits.remove(&thread::current().id());
    }

    fn would_deadlock(&self, waiter: ThreadId, slot: &ConstructionSlot) -> bool {
        let mut owner = slot.owner;
        loop {
            if owner == waiter {
                return true;
            }
            // A waiter whose slot already completed is about to run again.
            match self.waits.get(&owner) {
                Some(next) if !next.is_done() => owner = next.owner,
                _ => return false,
            }
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }
}
