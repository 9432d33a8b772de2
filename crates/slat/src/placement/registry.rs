use std::collections::BTreeMap;

use crate::error::PlacementError;

use super::icon::{Area, Icon, IconId, IconSpec, FIXED_SLOT_COUNT};

/// Identity store for every icon registered in one orientation, visible or
/// not. Icons live here for the daemon's lifetime; only dynamically created
/// notification icons are ever removed again.
#[derive(Debug, Default)]
pub struct IconRegistry {
    icons: BTreeMap<IconId, Icon>,
    last_id: IconId,
}

impl IconRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new icon. Fails with `DuplicateName` if an icon with the
    /// same name already exists anywhere in this orientation's module set,
    /// not just among the currently visible ones.
    pub fn register(&mut self, spec: IconSpec) -> Result<IconId, PlacementError> {
        if spec.name.0.is_empty() {
            return Err(PlacementError::InvalidDescriptor("icon name must not be empty".to_string()));
        }
        if spec.area == Area::Fixed && spec.priority as usize >= FIXED_SLOT_COUNT {
            return Err(PlacementError::InvalidDescriptor(format!(
                "fixed slot {} is out of range (0..{})",
                spec.priority, FIXED_SLOT_COUNT
            )));
        }
        if self.icons.values().any(|icon| icon.name == spec.name) {
            return Err(PlacementError::DuplicateName(spec.name));
        }

        self.last_id.advance();
        let id = self.last_id;
        self.icons.insert(id, Icon::from_spec(spec));
        Ok(id)
    }

    /// Discard an icon entirely. Callers must have removed it from its area
    /// list first; this only drops the descriptor.
    pub fn unregister(&mut self, id: IconId) -> Option<Icon> {
        self.icons.remove(&id)
    }

    pub fn icon(&self, id: IconId) -> Option<&Icon> {
        self.icons.get(&id)
    }

    pub fn icon_mut(&mut self, id: IconId) -> Option<&mut Icon> {
        self.icons.get_mut(&id)
    }

    pub fn is_visible(&self, id: IconId) -> bool {
        self.icons.get(&id).map(|icon| icon.exist_in_view).unwrap_or(false)
    }

    pub fn find_by_name(&self, name: &str) -> Option<IconId> {
        self.icons.iter().find(|(_, icon)| icon.name.0 == name).map(|(id, _)| *id)
    }

    /// All registered icons, in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (IconId, &Icon)> {
        self.icons.iter().map(|(id, icon)| (*id, icon))
    }

    pub fn len(&self) -> usize {
        self.icons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.icons.is_empty()
    }
}
