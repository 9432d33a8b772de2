#[cfg(test)]
use std::collections::HashMap;

use anyhow::Result;

use crate::placement::icon::{Area, Icon, Orientation};

/// Opaque handle to a visual object owned by the rendering collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderedHandle(pub u64);

/// How an area's handles are packed into its layout container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Packing {
    Front,
    End,
}

/// The placement engine's boundary to the rendering collaborator. The core
/// never touches pixels; it only asks for visual objects to be created,
/// destroyed and reordered.
pub trait RenderBackend {
    /// Build a visual object for the icon. May fail (missing image asset,
    /// surface gone); the compositor logs and skips the icon in that case.
    fn materialize(&mut self, icon: &Icon) -> Result<RenderedHandle>;

    fn destroy(&mut self, handle: RenderedHandle);

    /// Replace the contents of one area's layout container with the given
    /// handles, in order.
    fn arrange(&mut self, orientation: Orientation, area: Area, packing: Packing, handles: &[RenderedHandle]);
}

/// Backend that hands out handles without drawing anything. Used when the
/// daemon runs without a compositor connection.
#[derive(Debug, Default)]
pub struct HeadlessBackend {
    next_handle: u64,
}

impl RenderBackend for HeadlessBackend {
    fn materialize(&mut self, icon: &Icon) -> Result<RenderedHandle> {
        self.next_handle += 1;
        log::trace!("materialized visual {} for icon {}", self.next_handle, icon.name);
        Ok(RenderedHandle(self.next_handle))
    }

    fn destroy(&mut self, handle: RenderedHandle) {
        log::trace!("destroyed visual {}", handle.0);
    }

    fn arrange(&mut self, orientation: Orientation, area: Area, _packing: Packing, handles: &[RenderedHandle]) {
        log::trace!("arranged {} visuals in {}/{}", handles.len(), orientation, area);
    }
}

/// Backend that records every call, for inspecting compositor output in tests.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordingBackend {
    next_handle: u64,
    /// Handles that have been materialized and not destroyed since.
    pub live: Vec<RenderedHandle>,
    /// Latest arrangement per (orientation, area), including the packing rule.
    pub arrangements: HashMap<(Orientation, Area), (Packing, Vec<RenderedHandle>)>,
}

#[cfg(test)]
impl RenderBackend for RecordingBackend {
    fn materialize(&mut self, _icon: &Icon) -> Result<RenderedHandle> {
        self.next_handle += 1;
        let handle = RenderedHandle(self.next_handle);
        self.live.push(handle);
        Ok(handle)
    }

    fn destroy(&mut self, handle: RenderedHandle) {
        self.live.retain(|other| *other != handle);
    }

    fn arrange(&mut self, orientation: Orientation, area: Area, packing: Packing, handles: &[RenderedHandle]) {
        self.arrangements.insert((orientation, area), (packing, handles.to_vec()));
    }
}
