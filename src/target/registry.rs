//! Priority-ordered target registry.
//!
//! Entries are kept sorted ascending by priority. An entry inserted (or
//! re-inserted) with a priority equal to existing ones lands after them, so
//! the most recent call wins ties. The highest-priority entry is always the
//! tail of `order`.
//!
//! Targets despawned elsewhere stay in the sequence as tombstones until a
//! query walks over them or `sanitize` runs. Queries scan from the tail and
//! drop every dead entry they meet, so each tombstone costs one removal in
//! total and repeated queries are O(1) amortized.
use bevy::prelude::{Entity, Vec3};

use super::TargetLookup;
use super::pool::{EntryId, EntryPool};

#[derive(Debug, Default, Clone)]
pub struct TargetRegistry {
    pool: EntryPool,
    order: Vec<EntryId>,
}

impl TargetRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `target` the highest priority entry.
    ///
    /// No-op when `target` is already the tail entry. Otherwise the target is
    /// (re)inserted one above the current highest priority, or at `1` when the
    /// registry is empty.
    pub fn add(&mut self, target: Entity) {
        let priority = match self.order.last() {
            Some(&id) => {
                let tail = self.pool.get(id);
                if tail.target == target {
                    return;
                }
                tail.priority.saturating_add(1)
            }
            None => 1,
        };
        self.add_with_priority(target, priority);
    }

    /// Insert `target` at `priority`, replacing any existing entry for it.
    ///
    /// The entry goes right after the last entry whose priority is `<=`
    /// `priority`, or at the front if every entry is strictly higher.
    /// `Entity::PLACEHOLDER` is the null target and is ignored.
    pub fn add_with_priority(&mut self, target: Entity, priority: i32) {
        if target == Entity::PLACEHOLDER {
            return;
        }
        let id = match self.index_of(target) {
            Some(index) => {
                let id = self.order.remove(index);
                self.pool.get_mut(id).priority = priority;
                id
            }
            None => self.pool.acquire(target, priority),
        };

        let pool = &self.pool;
        let at = self
            .order
            .partition_point(|&other| pool.get(other).priority <= priority);
        self.order.insert(at, id);
    }

    /// Remove `target`. Returns `false` if it was not registered or is the
    /// placeholder entity.
    ///
    /// Liveness is not checked: a registered target that has since been
    /// despawned is still found, removed and reported as `true`.
    pub fn remove(&mut self, target: Entity) -> bool {
        if target == Entity::PLACEHOLDER {
            return false;
        }
        let Some(index) = self.index_of(target) else {
            return false;
        };
        let id = self.order.remove(index);
        self.pool.release(id);
        true
    }

    pub fn clear(&mut self) {
        for id in self.order.drain(..) {
            self.pool.release(id);
        }
    }

    /// Number of stored entries, tombstones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    #[must_use]
    pub fn contains(&self, target: Entity) -> bool {
        self.index_of(target).is_some()
    }

    /// Stored priority of `target`. Does not check liveness.
    #[must_use]
    pub fn priority_of(&self, target: Entity) -> Option<i32> {
        self.index_of(target)
            .map(|index| self.pool.get(self.order[index]).priority)
    }

    /// Priority of the highest live entry, dropping dead entries on the way.
    pub fn highest_priority(&mut self, lookup: &impl TargetLookup) -> Option<i32> {
        self.resolve_highest(lookup)
            .map(|(id, _)| self.pool.get(id).priority)
    }

    /// World position of the highest live entry, dropping dead entries on the way.
    pub fn highest_priority_position(&mut self, lookup: &impl TargetLookup) -> Option<Vec3> {
        self.resolve_highest(lookup).map(|(_, position)| position)
    }

    /// The highest live entity, dropping dead entries on the way.
    pub fn highest_priority_target(&mut self, lookup: &impl TargetLookup) -> Option<Entity> {
        self.resolve_highest(lookup)
            .map(|(id, _)| self.pool.get(id).target)
    }

    /// Drop every dead entry now. Returns how many were removed.
    pub fn sanitize(&mut self, lookup: &impl TargetLookup) -> usize {
        let before = self.order.len();
        let pool = &mut self.pool;
        self.order.retain(|&id| {
            let alive = lookup.is_alive(pool.get(id).target);
            if !alive {
                pool.release(id);
            }
            alive
        });
        before - self.order.len()
    }

    /// Append every entry's priority and entity, index-aligned, in ascending
    /// priority order. Either output may be skipped with `None`. Does not
    /// sanitize.
    pub fn collect_into(&self, priorities: Option<&mut Vec<i32>>, targets: Option<&mut Vec<Entity>>) {
        if let Some(priorities) = priorities {
            priorities.extend(self.iter().map(|(priority, _)| priority));
        }
        if let Some(targets) = targets {
            targets.extend(self.iter().map(|(_, target)| target));
        }
    }

    /// `(priority, entity)` pairs in ascending priority order, tombstones included.
    pub fn iter(&self) -> impl Iterator<Item = (i32, Entity)> + '_ {
        self.order.iter().map(|&id| {
            let entry = self.pool.get(id);
            (entry.priority, entry.target)
        })
    }

    fn index_of(&self, target: Entity) -> Option<usize> {
        self.order
            .iter()
            .position(|&id| self.pool.get(id).target == target)
    }

    fn resolve_highest(&mut self, lookup: &impl TargetLookup) -> Option<(EntryId, Vec3)> {
        while let Some(&id) = self.order.last() {
            if let Some(position) = lookup.position(self.pool.get(id).target) {
                return Some((id, position));
            }
            self.order.pop();
            self.pool.release(id);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn entity(n: u32) -> Entity {
        Entity::from_raw(n)
    }

    fn world(entities: &[(u32, f32)]) -> HashMap<Entity, Vec3> {
        entities
            .iter()
            .map(|&(n, x)| (entity(n), Vec3::new(x, 0.0, 0.0)))
            .collect()
    }

    fn assert_sorted(registry: &TargetRegistry) {
        let priorities: Vec<i32> = registry.iter().map(|(p, _)| p).collect();
        assert!(
            priorities.windows(2).all(|w| w[0] <= w[1]),
            "not sorted: {priorities:?}"
        );
    }

    #[test]
    fn add_assigns_increasing_priorities() {
        let lookup = world(&[(1, 1.0), (2, 2.0)]);
        let mut registry = TargetRegistry::new();
        registry.add(entity(1));
        registry.add(entity(2));

        assert_eq!(registry.priority_of(entity(1)), Some(1));
        assert_eq!(registry.priority_of(entity(2)), Some(2));
        assert_eq!(registry.highest_priority(&lookup), Some(2));
        assert_eq!(registry.highest_priority_target(&lookup), Some(entity(2)));
    }

    #[test]
    fn add_promotes_existing_target_without_duplicating() {
        let lookup = world(&[(1, 1.0), (2, 2.0)]);
        let mut registry = TargetRegistry::new();
        registry.add(entity(1));
        registry.add(entity(2));
        registry.add(entity(1));

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.priority_of(entity(1)), Some(3));
        assert_eq!(registry.highest_priority_target(&lookup), Some(entity(1)));
        assert_sorted(&registry);
    }

    #[test]
    fn add_on_current_highest_is_noop() {
        let mut registry = TargetRegistry::new();
        registry.add(entity(1));
        registry.add(entity(1));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.priority_of(entity(1)), Some(1));
    }

    #[test]
    fn add_is_unique_highest_over_explicit_priorities() {
        let lookup = world(&[(1, 1.0), (2, 2.0), (3, 3.0)]);
        let mut registry = TargetRegistry::new();
        registry.add_with_priority(entity(1), 40);
        registry.add_with_priority(entity(2), -3);
        registry.add(entity(3));

        assert_eq!(registry.priority_of(entity(3)), Some(41));
        assert_eq!(registry.highest_priority_target(&lookup), Some(entity(3)));
    }

    #[test]
    fn add_saturates_at_max_priority() {
        let mut registry = TargetRegistry::new();
        registry.add_with_priority(entity(1), i32::MAX);
        registry.add(entity(2));

        let lookup = world(&[(1, 1.0), (2, 2.0)]);
        assert_eq!(registry.priority_of(entity(2)), Some(i32::MAX));
        // Equal priority, later call wins.
        assert_eq!(registry.highest_priority_target(&lookup), Some(entity(2)));
    }

    #[test]
    fn equal_priorities_break_ties_by_recency() {
        let lookup = world(&[(1, 1.0), (2, 2.0)]);
        let mut registry = TargetRegistry::new();
        registry.add_with_priority(entity(1), 5);
        registry.add_with_priority(entity(2), 5);
        assert_eq!(registry.highest_priority_target(&lookup), Some(entity(2)));

        // Updating the earlier one moves it ahead again.
        registry.add_with_priority(entity(1), 5);
        assert_eq!(registry.highest_priority_target(&lookup), Some(entity(1)));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn lower_priority_inserts_at_front() {
        let mut registry = TargetRegistry::new();
        registry.add_with_priority(entity(1), 10);
        registry.add_with_priority(entity(2), 20);
        registry.add_with_priority(entity(3), -1);
        registry.add_with_priority(entity(4), 15);

        let order: Vec<Entity> = registry.iter().map(|(_, e)| e).collect();
        assert_eq!(order, vec![entity(3), entity(1), entity(4), entity(2)]);
    }

    #[test]
    fn stays_sorted_across_mixed_mutations() {
        let mut registry = TargetRegistry::new();
        let mut state: u32 = 0x1234_5678;
        for step in 0..500u32 {
            state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            let target = entity((state >> 8) % 16);
            let priority = ((state >> 16) % 21) as i32 - 10;
            match step % 4 {
                0 => registry.add(target),
                1 | 2 => registry.add_with_priority(target, priority),
                _ => {
                    registry.remove(target);
                }
            }
            assert_sorted(&registry);
            assert!(registry.len() <= 16);
        }
    }

    #[test]
    fn dead_highest_falls_back_to_next_live_entry() {
        let mut lookup = world(&[(1, 1.0), (2, 2.0)]);
        let mut registry = TargetRegistry::new();
        registry.add(entity(1));
        registry.add(entity(2));

        lookup.remove(&entity(2));
        assert_eq!(registry.highest_priority(&lookup), Some(1));
        assert_eq!(registry.highest_priority_target(&lookup), Some(entity(1)));
        assert_eq!(
            registry.highest_priority_position(&lookup),
            Some(Vec3::new(1.0, 0.0, 0.0))
        );
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn query_only_drops_tombstones_it_walks_over() {
        let mut lookup = world(&[(1, 1.0), (2, 2.0), (3, 3.0), (4, 4.0)]);
        let mut registry = TargetRegistry::new();
        for n in 1..=4 {
            registry.add(entity(n));
        }

        // A dead entry below the live highest is left for later.
        lookup.remove(&entity(1));
        lookup.remove(&entity(4));
        assert_eq!(registry.highest_priority_target(&lookup), Some(entity(3)));
        assert_eq!(registry.len(), 3);

        assert_eq!(registry.sanitize(&lookup), 1);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn all_dead_reports_nothing_and_empties() {
        let mut registry = TargetRegistry::new();
        registry.add(entity(1));
        registry.add(entity(2));

        let empty = HashMap::new();
        assert_eq!(registry.highest_priority_position(&empty), None);
        assert!(registry.is_empty());
    }

    #[test]
    fn remove_then_query_never_returns_removed() {
        let lookup = world(&[(1, 1.0), (2, 2.0)]);
        let mut registry = TargetRegistry::new();
        registry.add(entity(1));
        registry.add(entity(2));

        assert!(registry.remove(entity(2)));
        assert_eq!(registry.highest_priority_target(&lookup), Some(entity(1)));
        assert!(!registry.remove(entity(2)));
        assert!(!registry.remove(Entity::PLACEHOLDER));
        assert!(!registry.remove(entity(9)));
    }

    #[test]
    fn placeholder_is_never_registered() {
        let mut registry = TargetRegistry::new();
        registry.add(Entity::PLACEHOLDER);
        registry.add_with_priority(Entity::PLACEHOLDER, 3);
        assert!(registry.is_empty());
        assert!(!registry.contains(Entity::PLACEHOLDER));
    }

    #[test]
    fn remove_finds_despawned_target_without_lookup() {
        let lookup = world(&[(1, 1.0)]);
        let mut registry = TargetRegistry::new();
        registry.add(entity(1));
        registry.add(entity(2));
        assert!(!lookup.is_alive(entity(2)));

        assert!(registry.remove(entity(2)));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.highest_priority_target(&lookup), Some(entity(1)));
    }

    #[test]
    fn clear_empties_and_queries_fail() {
        let lookup = world(&[(1, 1.0)]);
        let mut registry = TargetRegistry::new();
        registry.add(entity(1));
        registry.clear();

        assert_eq!(registry.len(), 0);
        assert_eq!(registry.highest_priority(&lookup), None);
        assert_eq!(registry.highest_priority_target(&lookup), None);
    }

    #[test]
    fn empty_registry_reports_nothing() {
        let mut registry = TargetRegistry::new();
        let lookup = HashMap::new();
        assert_eq!(registry.highest_priority(&lookup), None);
        assert_eq!(registry.highest_priority_position(&lookup), None);
    }

    #[test]
    fn collect_into_is_index_aligned_and_skips_missing_outputs() {
        let mut registry = TargetRegistry::new();
        registry.add_with_priority(entity(1), 3);
        registry.add_with_priority(entity(2), 1);

        let mut priorities = vec![99];
        let mut targets = Vec::new();
        registry.collect_into(Some(&mut priorities), Some(&mut targets));
        assert_eq!(priorities, vec![99, 1, 3]);
        assert_eq!(targets, vec![entity(2), entity(1)]);

        let mut only_targets = Vec::new();
        registry.collect_into(None, Some(&mut only_targets));
        assert_eq!(only_targets.len(), 2);
    }

    #[test]
    fn removed_entries_go_back_to_the_pool() {
        let mut registry = TargetRegistry::new();
        for n in 0..8 {
            registry.add(entity(n));
        }
        registry.clear();
        for n in 8..16 {
            registry.add(entity(n));
        }
        assert_eq!(registry.pool.capacity(), 8);
        assert_eq!(registry.pool.in_use(), 8);
    }
}
