use itertools::Itertools;

use crate::error::PlacementError;
use crate::render_backend::RenderBackend;

use super::area_list::{AreaList, FixedSlots, SortDirection};
use super::capacity::CapacityTable;
use super::compositor;
use super::eligibility;
use super::icon::{AnimationMode, Area, Icon, IconContent, IconId, IconSpec, Orientation};
use super::registry::IconRegistry;

/// The complete placement state of one bar instance. The two orientations
/// each own one of these; they never mutate each other's state and only share
/// the capacity function's external setting.
#[derive(Debug)]
pub struct OrientationContext {
    pub orientation: Orientation,
    pub registry: IconRegistry,
    pub fixed: FixedSlots,
    pub system: AreaList,
    pub notification: AreaList,
}

impl OrientationContext {
    pub fn new(orientation: Orientation) -> Self {
        OrientationContext {
            orientation,
            registry: IconRegistry::new(),
            fixed: FixedSlots::new(),
            system: AreaList::new(SortDirection::MostUrgentFirst),
            notification: AreaList::new(SortDirection::LeastUrgentFirst),
        }
    }

}

/// Top-level owner of the placement engine: both orientation contexts, the
/// capacity table, the percentage-display setting and the render backend.
/// All mutation goes through here, one call at a time, so the list invariants
/// only need to hold at call boundaries.
pub struct IndicatorService {
    portrait: OrientationContext,
    landscape: OrientationContext,
    capacity: CapacityTable,
    percentage_display: bool,
    backend: Box<dyn RenderBackend>,
}

impl std::fmt::Debug for IndicatorService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndicatorService")
            .field("portrait", &self.portrait)
            .field("landscape", &self.landscape)
            .field("capacity", &self.capacity)
            .field("percentage_display", &self.percentage_display)
            .finish()
    }
}

impl IndicatorService {
    pub fn new(backend: Box<dyn RenderBackend>) -> Self {
        Self::with_capacity(backend, CapacityTable::default())
    }

    pub fn with_capacity(backend: Box<dyn RenderBackend>, capacity: CapacityTable) -> Self {
        IndicatorService {
            portrait: OrientationContext::new(Orientation::Portrait),
            landscape: OrientationContext::new(Orientation::Landscape),
            capacity,
            percentage_display: false,
            backend,
        }
    }

    pub fn context(&self, orientation: Orientation) -> &OrientationContext {
        match orientation {
            Orientation::Portrait => &self.portrait,
            Orientation::Landscape => &self.landscape,
        }
    }

    fn parts_mut(&mut self, orientation: Orientation) -> (&mut OrientationContext, &mut dyn RenderBackend) {
        let ctx = match orientation {
            Orientation::Portrait => &mut self.portrait,
            Orientation::Landscape => &mut self.landscape,
        };
        (ctx, self.backend.as_mut())
    }

    pub fn max_slots(&self, area: Area, orientation: Orientation) -> usize {
        self.capacity.max_slots(area, orientation, self.percentage_display)
    }

    pub fn percentage_display(&self) -> bool {
        self.percentage_display
    }

    /// Register a new icon in one orientation. The icon starts out hidden,
    /// with no wish to show recorded.
    pub fn register(&mut self, orientation: Orientation, spec: IconSpec) -> Result<IconId, PlacementError> {
        let name = spec.name.clone();
        let result = self.ctx_mut(orientation).registry.register(spec);
        if let Err(err) = &result {
            err.log(&format!("while registering `{}` ({})", name, orientation));
        }
        result
    }

    /// Drop an icon entirely: vacate its slot, destroy its visual and discard
    /// the descriptor. Used for dynamically created notification icons; the
    /// static module icons live for the daemon's lifetime.
    pub fn unregister(&mut self, orientation: Orientation, id: IconId) -> Result<(), PlacementError> {
        let (capacity, percentage) = (self.capacity, self.percentage_display);
        let (ctx, backend) = self.parts_mut(orientation);
        let icon = ctx
            .registry
            .icon(id)
            .ok_or_else(|| PlacementError::InvalidDescriptor("unknown icon id".to_string()))?;
        let was_resident = icon.exist_in_view;
        let (area, priority) = (icon.area, icon.priority);

        eligibility::remove_from_view(ctx, backend, id);
        ctx.registry.unregister(id);
        if was_resident {
            // The freed slot goes to whoever was waiting at the same rank.
            eligibility::promote_waiting(ctx, backend, &capacity, percentage, area, priority);
            compositor::render(ctx, backend);
        }
        Ok(())
    }

    /// Request the icon visible. The wish is recorded even when the request
    /// is refused, so the icon stays eligible for later promotion.
    pub fn show(&mut self, orientation: Orientation, id: IconId) -> Result<(), PlacementError> {
        let (capacity, percentage) = (self.capacity, self.percentage_display);
        let (ctx, backend) = self.parts_mut(orientation);
        match eligibility::admit(ctx, backend, &capacity, percentage, id) {
            Ok(true) => {
                compositor::render(ctx, backend);
                Ok(())
            }
            Ok(false) => Ok(()),
            Err(err) => {
                err.log(&format!("while showing icon in {}", orientation));
                Err(err)
            }
        }
    }

    /// Request the icon hidden, promoting a same-priority waiting icon into
    /// the freed slot.
    pub fn hide(&mut self, orientation: Orientation, id: IconId) -> Result<(), PlacementError> {
        let (capacity, percentage) = (self.capacity, self.percentage_display);
        let (ctx, backend) = self.parts_mut(orientation);
        match eligibility::dismiss(ctx, backend, &capacity, percentage, id) {
            Ok(true) => {
                compositor::render(ctx, backend);
                Ok(())
            }
            Ok(false) => Ok(()),
            Err(err) => {
                err.log(&format!("while hiding icon in {}", orientation));
                Err(err)
            }
        }
    }

    pub fn is_visible(&self, orientation: Orientation, id: IconId) -> bool {
        self.context(orientation).registry.is_visible(id)
    }

    /// Swap the icon's text, tearing down the stale visual so the next render
    /// rebuilds it.
    pub fn set_text(&mut self, orientation: Orientation, id: IconId, text: String) -> Result<(), PlacementError> {
        self.update_content(orientation, id, move |icon| {
            icon.content = icon.content.clone().with_text(text);
        })
    }

    /// Replace the icon's visual payload wholesale.
    pub fn set_content(&mut self, orientation: Orientation, id: IconId, content: IconContent) -> Result<(), PlacementError> {
        self.update_content(orientation, id, move |icon| {
            icon.content = content;
        })
    }

    pub fn set_animation(
        &mut self,
        orientation: Orientation,
        id: IconId,
        animation: AnimationMode,
    ) -> Result<(), PlacementError> {
        self.update_content(orientation, id, move |icon| {
            icon.animation = animation;
        })
    }

    fn update_content(
        &mut self,
        orientation: Orientation,
        id: IconId,
        update: impl FnOnce(&mut Icon),
    ) -> Result<(), PlacementError> {
        let (ctx, backend) = self.parts_mut(orientation);
        let icon = ctx
            .registry
            .icon_mut(id)
            .ok_or_else(|| PlacementError::InvalidDescriptor("unknown icon id".to_string()))?;
        update(icon);
        if let Some(handle) = icon.rendered.take() {
            backend.destroy(handle);
        }
        let resident = icon.exist_in_view;
        if resident {
            compositor::render(ctx, backend);
        }
        Ok(())
    }

    /// Flip the percentage-display setting and bring both orientations back
    /// within their shifted budgets.
    pub fn set_percentage_display(&mut self, enabled: bool) {
        if self.percentage_display == enabled {
            return;
        }
        self.percentage_display = enabled;
        let capacity = self.capacity;
        for orientation in Orientation::ALL {
            let (ctx, backend) = self.parts_mut(orientation);
            eligibility::apply_capacity(ctx, backend, &capacity, enabled);
            compositor::render(ctx, backend);
        }
    }

    pub fn render(&mut self, orientation: Orientation) {
        let (ctx, backend) = self.parts_mut(orientation);
        compositor::render(ctx, backend);
    }

    fn ctx_mut(&mut self, orientation: Orientation) -> &mut OrientationContext {
        match orientation {
            Orientation::Portrait => &mut self.portrait,
            Orientation::Landscape => &mut self.landscape,
        }
    }

    /// Human-readable dump of both orientations, for the `state` command.
    /// With `all`, icons waiting for a slot are listed too.
    pub fn dump_state(&self, all: bool) -> String {
        let header = format!("percentage-display: {}", if self.percentage_display() { "on" } else { "off" });
        std::iter::once(header)
            .chain(Orientation::ALL.iter().map(|orientation| self.dump_orientation(*orientation, all)))
            .join("\n")
    }

    fn dump_orientation(&self, orientation: Orientation, all: bool) -> String {
        let ctx = self.context(orientation);
        let fmt_icon = |id: IconId| {
            let icon = ctx.registry.icon(id);
            match icon {
                Some(icon) if icon.always_top => format!("{}*", icon.name),
                Some(icon) => icon.name.to_string(),
                None => "?".to_string(),
            }
        };
        let mut out = format!(
            "[{}]\n  fixed:        {}\n  system:       {} ({}/{})\n  notification: {} ({}/{})",
            orientation,
            ctx.fixed.iter().map(&fmt_icon).join(" "),
            ctx.system.iter().map(&fmt_icon).join(" "),
            ctx.system.count(),
            self.max_slots(Area::System, orientation),
            ctx.notification.iter().map(&fmt_icon).join(" "),
            ctx.notification.count(),
            self.max_slots(Area::Notification, orientation),
        );
        if all {
            let waiting = ctx
                .registry
                .iter()
                .filter(|(_, icon)| icon.wish_to_show && !icon.exist_in_view)
                .map(|(_, icon)| icon.name.to_string())
                .join(" ");
            out.push_str(&format!("\n  waiting:      {}", waiting));
        }
        out
    }
}
