//! The icon placement and prioritized-eviction engine.
//!
//! Status modules request icons visible or hidden; this module decides who
//! actually occupies the bar. Per orientation it keeps three membership
//! containers (the slot-based Fixed area and the priority-ordered System and
//! Notification areas), admits or evicts under the capacity budget, and asks
//! the compositor to rebuild the layout after every mutation.

pub mod area_list;
pub mod capacity;
mod compositor;
mod eligibility;
pub mod icon;
pub mod registry;
pub mod service;

#[cfg(test)]
mod test;

pub use capacity::CapacityTable;
pub use icon::{
    AnimationMode, Area, Icon, IconContent, IconId, IconSpec, Orientation, PerOrientation, Priority, FIXED_SLOT_COUNT,
};
pub use service::{IndicatorService, OrientationContext};
