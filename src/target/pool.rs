//! Free-list arena for `TargetEntry` records.
//!
//! Entries removed from a registry are not dropped; their slot goes back on a
//! free list and is handed out again by the next `acquire`. After warm-up the
//! registry adds and removes targets without touching the allocator.
use bevy::ecs::entity::Entity;

/// Index of a slot inside an `EntryPool`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntryId(u32);

/// One followed entity and its priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetEntry {
    pub target: Entity,
    pub priority: i32,
}

#[derive(Debug, Default, Clone)]
pub struct EntryPool {
    slots: Vec<TargetEntry>,
    free: Vec<EntryId>,
}

impl EntryPool {
    /// Take a slot for `target`, reusing a released one when available.
    ///
    /// `target` must not be `Entity::PLACEHOLDER`, which marks free slots.
    pub fn acquire(&mut self, target: Entity, priority: i32) -> EntryId {
        debug_assert_ne!(target, Entity::PLACEHOLDER, "placeholder marks free slots");
        let entry = TargetEntry { target, priority };
        if let Some(id) = self.free.pop() {
            self.slots[id.0 as usize] = entry;
            id
        } else {
            let id = EntryId(self.slots.len() as u32);
            self.slots.push(entry);
            id
        }
    }

    /// Return a slot to the free list. The caller must not use `id` afterwards.
    pub fn release(&mut self, id: EntryId) {
        let slot = &mut self.slots[id.0 as usize];
        debug_assert_ne!(slot.target, Entity::PLACEHOLDER, "double release of {id:?}");
        slot.target = Entity::PLACEHOLDER;
        self.free.push(id);
    }

    #[must_use]
    pub fn get(&self, id: EntryId) -> &TargetEntry {
        &self.slots[id.0 as usize]
    }

    pub fn get_mut(&mut self, id: EntryId) -> &mut TargetEntry {
        &mut self.slots[id.0 as usize]
    }

    /// Slots currently handed out.
    #[must_use]
    pub fn in_use(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    /// Slots ever allocated (in use plus free).
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }
}
