use crate::error::PlacementError;
use crate::render_backend::RenderBackend;

use super::capacity::CapacityTable;
use super::icon::{Area, IconId, Priority};
use super::service::OrientationContext;

/// Outcome of the admission classifier for the competitive areas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Capacity is exhausted by residents that outrank the candidate.
    CannotAdd,
    /// The candidate gets in by evicting a System resident.
    EvictSystem,
    /// The candidate gets in by evicting a Notification resident.
    EvictNotification,
    /// There is room, insert directly.
    NoEvict,
}

/// Decide whether a System/Notification candidate fits, must evict, or is
/// rejected. The Fixed area never goes through here; fixed icons compete for
/// their own slot only.
///
/// For the System area the decision counts the residents that outrank the
/// candidate: `higher` (strictly more urgent), `same` (equal priority) and
/// `same_top` (equal priority and pinned). A candidate that doesn't make the
/// cut can still get in by evicting an equal-priority non-pinned resident,
/// unless it is outranked by `cap` pinned (for pinned candidates) or strictly
/// more urgent (for ordinary candidates) residents. A candidate that makes
/// the cut against a physically full list evicts the least urgent resident.
///
/// The Notification area has no priority-based rejection: when full, it
/// always admits by evicting the least urgent resident.
pub(super) fn classify(
    ctx: &OrientationContext,
    caps: &CapacityTable,
    percentage_display: bool,
    area: Area,
    priority: Priority,
    always_top: bool,
) -> Admission {
    let cap = caps.max_slots(area, ctx.orientation, percentage_display);
    match area {
        Area::Fixed => Admission::NoEvict,
        Area::System => {
            let mut higher = 0;
            let mut same = 0;
            let mut same_top = 0;
            for id in ctx.system.iter() {
                let resident = match ctx.registry.icon(id) {
                    Some(icon) => icon,
                    None => continue,
                };
                if resident.priority < priority {
                    higher += 1;
                } else if resident.priority == priority {
                    same += 1;
                    if resident.always_top {
                        same_top += 1;
                    }
                }
            }

            if higher + same >= cap {
                if always_top {
                    if same_top >= cap {
                        Admission::CannotAdd
                    } else {
                        Admission::EvictSystem
                    }
                } else if higher >= cap {
                    Admission::CannotAdd
                } else {
                    Admission::EvictSystem
                }
            } else if ctx.system.count() >= cap {
                // The candidate makes the cut, but the list is physically
                // full, so a strictly less urgent resident must go.
                Admission::EvictSystem
            } else {
                Admission::NoEvict
            }
        }
        Area::Notification => {
            if ctx.notification.count() >= cap {
                Admission::EvictNotification
            } else {
                Admission::NoEvict
            }
        }
    }
}

/// Record the wish to show and place the icon if the classifier allows it.
/// Returns whether the area's membership actually changed.
///
/// The wish flag is recorded on every request, including rejected ones, so a
/// refused icon stays eligible for promotion once a slot frees up.
pub(super) fn admit(
    ctx: &mut OrientationContext,
    backend: &mut dyn RenderBackend,
    caps: &CapacityTable,
    percentage_display: bool,
    id: IconId,
) -> Result<bool, PlacementError> {
    let icon = ctx
        .registry
        .icon_mut(id)
        .ok_or_else(|| PlacementError::InvalidDescriptor("unknown icon id".to_string()))?;
    icon.wish_to_show = true;
    if icon.exist_in_view {
        return Ok(false);
    }
    let (area, priority, always_top, name) = (icon.area, icon.priority, icon.always_top, icon.name.clone());

    match area {
        Area::Fixed => {
            let slot = priority as usize;
            match ctx.fixed.occupant(slot) {
                Some(occupant) if occupant == id => Ok(false),
                Some(occupant) => {
                    let occupant_pinned = ctx.registry.icon(occupant).map(|other| other.always_top).unwrap_or(false);
                    if occupant_pinned {
                        // The pinned occupant keeps its slot; the newcomer's
                        // request succeeds without effect and it waits.
                        log::debug!("fixed slot {} is held by a pinned icon, `{}` stays hidden", slot, name);
                        Ok(false)
                    } else {
                        remove_from_view(ctx, backend, occupant);
                        place_fixed(ctx, slot, id);
                        Ok(true)
                    }
                }
                None => {
                    place_fixed(ctx, slot, id);
                    Ok(true)
                }
            }
        }
        Area::System | Area::Notification => {
            let list = match area {
                Area::System => &ctx.system,
                _ => &ctx.notification,
            };
            let duplicate = list
                .iter()
                .any(|other| other != id && ctx.registry.icon(other).map(|icon| icon.name == name).unwrap_or(false));
            if duplicate {
                return Err(PlacementError::DuplicateName(name));
            }

            match classify(ctx, caps, percentage_display, area, priority, always_top) {
                Admission::CannotAdd => Err(PlacementError::CannotAdd),
                Admission::NoEvict => {
                    insert_listed(ctx, area, id);
                    Ok(true)
                }
                Admission::EvictSystem => {
                    let victim = ctx
                        .system
                        .find_evictable(&ctx.registry, Some(priority))
                        .ok_or(PlacementError::EvictionImpossible)?;
                    remove_from_view(ctx, backend, victim);
                    insert_listed(ctx, area, id);
                    Ok(true)
                }
                Admission::EvictNotification => {
                    let victim = ctx
                        .notification
                        .find_evictable(&ctx.registry, None)
                        .ok_or(PlacementError::EvictionImpossible)?;
                    remove_from_view(ctx, backend, victim);
                    insert_listed(ctx, area, id);
                    Ok(true)
                }
            }
        }
    }
}

/// Clear the wish to show and, if the icon was resident, vacate its slot and
/// promote a same-priority icon that has been waiting in the wings. Returns
/// whether the area's membership actually changed.
pub(super) fn dismiss(
    ctx: &mut OrientationContext,
    backend: &mut dyn RenderBackend,
    caps: &CapacityTable,
    percentage_display: bool,
    id: IconId,
) -> Result<bool, PlacementError> {
    let icon = ctx
        .registry
        .icon_mut(id)
        .ok_or_else(|| PlacementError::InvalidDescriptor("unknown icon id".to_string()))?;
    icon.wish_to_show = false;
    if !icon.exist_in_view {
        return Ok(false);
    }
    let (area, priority) = (icon.area, icon.priority);

    remove_from_view(ctx, backend, id);
    promote_waiting(ctx, backend, caps, percentage_display, area, priority);
    Ok(true)
}

/// Re-admit the first registered icon of the given area and priority that
/// wishes to be shown but isn't. This is how an icon that lost the earlier
/// admission becomes visible once its slot frees.
pub(super) fn promote_waiting(
    ctx: &mut OrientationContext,
    backend: &mut dyn RenderBackend,
    caps: &CapacityTable,
    percentage_display: bool,
    area: Area,
    priority: Priority,
) {
    let waiting = ctx
        .registry
        .iter()
        .find(|(_, icon)| icon.area == area && icon.priority == priority && icon.wish_to_show && !icon.exist_in_view)
        .map(|(id, icon)| (id, icon.name.clone()));
    if let Some((id, name)) = waiting {
        log::debug!("promoting waiting icon `{}`", name);
        if let Err(err) = admit(ctx, backend, caps, percentage_display, id) {
            err.log(&format!("while promoting `{}`", name));
        }
    }
}

/// Bring the competitive areas back within budget after the capacity function
/// changed under us (percentage-display setting flip). Shrinking evicts the
/// least urgent non-pinned residents; growing promotes waiting icons, most
/// urgent first.
pub(super) fn apply_capacity(
    ctx: &mut OrientationContext,
    backend: &mut dyn RenderBackend,
    caps: &CapacityTable,
    percentage_display: bool,
) {
    for area in [Area::System, Area::Notification] {
        let cap = caps.max_slots(area, ctx.orientation, percentage_display);

        loop {
            let list = match area {
                Area::System => &ctx.system,
                _ => &ctx.notification,
            };
            if list.count() <= cap {
                break;
            }
            match list.find_evictable(&ctx.registry, None) {
                Some(victim) => remove_from_view(ctx, backend, victim),
                None => {
                    log::warn!("{} {} area over budget but every resident is pinned", ctx.orientation, area);
                    break;
                }
            }
        }

        let mut waiting: Vec<(Priority, IconId)> = ctx
            .registry
            .iter()
            .filter(|(_, icon)| icon.area == area && icon.wish_to_show && !icon.exist_in_view)
            .map(|(id, icon)| (icon.priority, id))
            .collect();
        waiting.sort();
        for (_, id) in waiting {
            let count = match area {
                Area::System => ctx.system.count(),
                _ => ctx.notification.count(),
            };
            if count >= cap {
                break;
            }
            if let Err(err) = admit(ctx, backend, caps, percentage_display, id) {
                err.log("while re-admitting after capacity change");
            }
        }
    }
}

/// Vacate the icon's slot, whichever container holds it, and tear down its
/// visual. The wish flag is left untouched so the icon stays promotable.
pub(super) fn remove_from_view(ctx: &mut OrientationContext, backend: &mut dyn RenderBackend, id: IconId) {
    let area = match ctx.registry.icon(id) {
        Some(icon) => icon.area,
        None => return,
    };
    match area {
        Area::Fixed => {
            ctx.fixed.remove(id);
        }
        Area::System => {
            ctx.system.remove(id);
        }
        Area::Notification => {
            ctx.notification.remove(id);
        }
    }
    if let Some(icon) = ctx.registry.icon_mut(id) {
        icon.exist_in_view = false;
        if let Some(handle) = icon.rendered.take() {
            backend.destroy(handle);
        }
    }
}

fn place_fixed(ctx: &mut OrientationContext, slot: usize, id: IconId) {
    ctx.fixed.place(slot, id);
    if let Some(icon) = ctx.registry.icon_mut(id) {
        icon.exist_in_view = true;
    }
}

fn insert_listed(ctx: &mut OrientationContext, area: Area, id: IconId) {
    match area {
        Area::System => ctx.system.insert_sorted(&ctx.registry, id),
        Area::Notification => ctx.notification.insert_sorted(&ctx.registry, id),
        Area::Fixed => return,
    }
    if let Some(icon) = ctx.registry.icon_mut(id) {
        icon.exist_in_view = true;
    }
}
