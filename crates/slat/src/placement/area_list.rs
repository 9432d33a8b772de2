use super::icon::{IconId, Priority, FIXED_SLOT_COUNT};
use super::registry::IconRegistry;

/// Which end of an ordered area list holds the most urgent entry.
///
/// The System list keeps the most urgent icon first; the Notification list
/// uses the reversed comparison direction. The asymmetry is a deliberate
/// design quirk of the bar: the two regions grow toward opposite visual ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    MostUrgentFirst,
    LeastUrgentFirst,
}

/// Ordered container of the icons currently visible in one (orientation, area).
///
/// Ordering invariant: entries are kept sorted by priority in the list's
/// direction, ties broken by recency (a newly inserted entry lands just before
/// the same-or-less-urgent ones). `always_top` entries are skipped over during
/// the insertion comparison, so an equal-priority newcomer never lands in
/// front of a pinned resident.
#[derive(Debug, Clone)]
pub struct AreaList {
    direction: SortDirection,
    entries: Vec<IconId>,
}

impl AreaList {
    pub fn new(direction: SortDirection) -> Self {
        AreaList { direction, entries: Vec::new() }
    }

    pub fn count(&self) -> usize {
        self.entries.len()
    }

    pub fn contains(&self, id: IconId) -> bool {
        self.entries.contains(&id)
    }

    /// Whether any resident carries the given name.
    pub fn contains_name(&self, registry: &IconRegistry, name: &str) -> bool {
        self.entries.iter().any(|id| registry.icon(*id).map(|icon| icon.name.0 == name).unwrap_or(false))
    }

    pub fn iter(&self) -> impl Iterator<Item = IconId> + '_ {
        self.entries.iter().copied()
    }

    /// Insert at the position the ordering invariant dictates.
    pub fn insert_sorted(&mut self, registry: &IconRegistry, id: IconId) {
        let candidate_priority = match registry.icon(id) {
            Some(icon) => icon.priority,
            None => return,
        };
        let pos = self.entries.iter().position(|other| {
            let other = match registry.icon(*other) {
                Some(icon) => icon,
                None => return false,
            };
            if other.always_top {
                return false;
            }
            match self.direction {
                SortDirection::MostUrgentFirst => other.priority >= candidate_priority,
                SortDirection::LeastUrgentFirst => other.priority <= candidate_priority,
            }
        });
        match pos {
            Some(pos) => self.entries.insert(pos, id),
            None => self.entries.push(id),
        }
    }

    /// O(n) removal by identity. Returns whether the icon was resident.
    pub fn remove(&mut self, id: IconId) -> bool {
        match self.entries.iter().position(|other| *other == id) {
            Some(pos) => {
                self.entries.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Pick the eviction victim: the least urgent non-pinned resident, scanned
    /// from the list's least-urgent end. With a priority floor, only residents
    /// that are not more urgent than the floor qualify; without one, any
    /// non-pinned resident does. Returns `None` if every qualifying resident
    /// is pinned.
    pub fn find_evictable(&self, registry: &IconRegistry, priority_floor: Option<Priority>) -> Option<IconId> {
        let mut scan: Box<dyn Iterator<Item = &IconId>> = match self.direction {
            SortDirection::MostUrgentFirst => Box::new(self.entries.iter().rev()),
            SortDirection::LeastUrgentFirst => Box::new(self.entries.iter()),
        };
        scan.find(|id| {
            let icon = match registry.icon(**id) {
                Some(icon) => icon,
                None => return false,
            };
            if icon.always_top {
                return false;
            }
            match priority_floor {
                Some(floor) => icon.priority >= floor,
                None => true,
            }
        })
        .copied()
    }
}

/// The Fixed area: a bank of named slots, each holding at most one icon.
/// Insertion is slot assignment, not list insertion, so there is no eviction
/// competition across different slots.
#[derive(Debug, Clone, Default)]
pub struct FixedSlots {
    slots: [Option<IconId>; FIXED_SLOT_COUNT],
}

impl FixedSlots {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn occupant(&self, slot: usize) -> Option<IconId> {
        self.slots.get(slot).copied().flatten()
    }

    pub fn place(&mut self, slot: usize, id: IconId) {
        if let Some(entry) = self.slots.get_mut(slot) {
            *entry = Some(id);
        }
    }

    /// Clear whichever slot holds the icon. Returns whether it was resident.
    pub fn remove(&mut self, id: IconId) -> bool {
        for entry in self.slots.iter_mut() {
            if *entry == Some(id) {
                *entry = None;
                return true;
            }
        }
        false
    }

    pub fn count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// Occupied slots by slot index ascending.
    pub fn iter(&self) -> impl Iterator<Item = IconId> + '_ {
        self.slots.iter().filter_map(|slot| *slot)
    }
}
