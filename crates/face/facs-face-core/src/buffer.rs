//! Capability-aware writes into the host-owned morph weight array.
//!
//! The buffer is never resized. Names without a binding, and bindings that
//! point past the end of the buffer, are skipped silently.

use crate::catalog::Group;
use crate::resolver::CapabilityMap;

pub struct WeightBuffer<'a> {
    slots: &'a mut [f32],
    caps: &'a CapabilityMap,
}

impl<'a> WeightBuffer<'a> {
    pub fn new(slots: &'a mut [f32], caps: &'a CapabilityMap) -> Self {
        Self { slots, caps }
    }

    #[inline]
    fn slot(&self, name: &str) -> Option<usize> {
        self.caps.index(name).filter(|i| *i < self.slots.len())
    }

    pub fn caps(&self) -> &CapabilityMap {
        self.caps
    }

    /// True when `name` is bound to a slot inside this buffer.
    pub fn has(&self, name: &str) -> bool {
        self.slot(name).is_some()
    }

    pub fn get(&self, name: &str) -> Option<f32> {
        self.slot(name).map(|i| self.slots[i])
    }

    /// Overwrite a channel. Returns false when the channel is unavailable.
    pub fn set(&mut self, name: &str, value: f32) -> bool {
        match self.slot(name) {
            Some(i) => {
                self.slots[i] = value;
                true
            }
            None => false,
        }
    }

    /// Overwrite a channel, capped at its catalog maximum.
    pub fn set_clamped(&mut self, name: &str, value: f32) -> bool {
        let max = self
            .caps
            .binding(name)
            .map(|b| b.def.max)
            .unwrap_or(f32::INFINITY);
        self.set(name, value.min(max))
    }

    /// `max(current, floor)`; never lowers an existing value.
    pub fn raise_to(&mut self, name: &str, floor: f32) -> bool {
        match self.slot(name) {
            Some(i) => {
                self.slots[i] = self.slots[i].max(floor);
                true
            }
            None => false,
        }
    }

    /// Zero every bound channel whose group satisfies `pred`.
    pub fn zero_groups(&mut self, pred: impl Fn(Group) -> bool) {
        let len = self.slots.len();
        for b in self.caps.bindings() {
            if pred(b.def.group) && b.index < len {
                self.slots[b.index] = 0.0;
            }
        }
    }
}
