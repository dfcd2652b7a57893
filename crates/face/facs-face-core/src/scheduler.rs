//! Deferred one-shot actions drained by the tick loop.
//!
//! Blink sub-frames and idle-expression reverts are queued with an absolute
//! `fire_at_ms` and an owning behaviour. The engine drains due actions on each
//! tick with the host's `now_ms`, so timing is driven entirely by the values a
//! caller feeds in. Due actions run in `(fire_at_ms, id)` order.

use serde::{Deserialize, Serialize};

use crate::ids::{ActionId, IdAllocator};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Behavior {
    Blink,
    IdleExpression,
}

#[derive(Clone, Debug, PartialEq)]
pub enum DeferredAction {
    /// Apply step `step` of the blink curve; the last step ends the blink.
    BlinkStep { step: usize },
    /// Return the listed channels to zero and end the active expression.
    Revert { channels: Vec<&'static str> },
}

#[derive(Clone, Debug, PartialEq)]
pub struct ScheduledAction {
    pub id: ActionId,
    pub fire_at_ms: f64,
    pub owner: Behavior,
    pub action: DeferredAction,
}

#[derive(Debug, Default)]
pub struct ActionQueue {
    pending: Vec<ScheduledAction>,
    ids: IdAllocator,
}

impl ActionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(
        &mut self,
        fire_at_ms: f64,
        owner: Behavior,
        action: DeferredAction,
    ) -> ActionId {
        let id = self.ids.alloc_action();
        self.pending.push(ScheduledAction {
            id,
            fire_at_ms,
            owner,
            action,
        });
        id
    }

    /// Remove and return every action with `fire_at_ms <= now_ms`, in firing order.
    pub fn drain_due(&mut self, now_ms: f64) -> Vec<ScheduledAction> {
        let (mut due, keep): (Vec<_>, Vec<_>) = self
            .pending
            .drain(..)
            .partition(|a| a.fire_at_ms <= now_ms);
        self.pending = keep;
        due.sort_by(|a, b| {
            a.fire_at_ms
                .total_cmp(&b.fire_at_ms)
                .then_with(|| a.id.cmp(&b.id))
        });
        due
    }

    /// Cancel every pending action of `owner`; returns how many were dropped.
    pub fn cancel_owner(&mut self, owner: Behavior) -> usize {
        let before = self.pending.len();
        self.pending.retain(|a| a.owner != owner);
        before - self.pending.len()
    }

    pub fn pending_for(&self, owner: Behavior) -> usize {
        self.pending.iter().filter(|a| a.owner == owner).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScheduledAction> {
        self.pending.iter()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
