use super::icon::{Area, Orientation, FIXED_SLOT_COUNT};

/// Display budgets for the competitive areas, per orientation. Capacity is a
/// derived value: the engine never stores it, it asks this table every time,
/// passing in the current percentage-display setting.
///
/// The percentage readout takes the width of roughly one icon, so turning it
/// on shrinks both competitive budgets by a fixed delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapacityTable {
    pub system_portrait: usize,
    pub system_landscape: usize,
    pub notification_portrait: usize,
    pub notification_landscape: usize,
    pub percentage_delta: usize,
}

impl Default for CapacityTable {
    fn default() -> Self {
        CapacityTable {
            system_portrait: 4,
            system_landscape: 7,
            notification_portrait: 3,
            notification_landscape: 5,
            percentage_delta: 1,
        }
    }
}

impl CapacityTable {
    pub fn max_slots(&self, area: Area, orientation: Orientation, percentage_display: bool) -> usize {
        let base = match (area, orientation) {
            (Area::Fixed, _) => return FIXED_SLOT_COUNT,
            (Area::System, Orientation::Portrait) => self.system_portrait,
            (Area::System, Orientation::Landscape) => self.system_landscape,
            (Area::Notification, Orientation::Portrait) => self.notification_portrait,
            (Area::Notification, Orientation::Landscape) => self.notification_landscape,
        };
        if percentage_display {
            base.saturating_sub(self.percentage_delta)
        } else {
            base
        }
    }
}
