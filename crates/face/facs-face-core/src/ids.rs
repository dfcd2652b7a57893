//! Identifiers and a simple allocator for scheduled actions.

use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct ActionId(pub u64);

/// Monotonic allocator; ids double as the tie-breaker for actions due at the same instant.
#[derive(Default, Debug)]
pub struct IdAllocator {
    next_action: u64,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn alloc_action(&mut self) -> ActionId {
        let id = ActionId(self.next_action);
        self.next_action = self.next_action.wrapping_add(1);
        id
    }
}
