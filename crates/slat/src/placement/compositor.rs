use crate::render_backend::{Packing, RenderBackend};

use super::icon::{Area, IconId};
use super::service::OrientationContext;

/// Rebuild the on-screen layout from the current area lists. Idempotent:
/// rendering twice with no intervening mutation produces the same
/// arrangement, since the lists alone determine the order.
///
/// The packing convention mirrors the bar's visual layout: the Fixed area
/// packs at the front by slot index ascending, the two competitive areas
/// append at the end in list order.
pub(super) fn render(ctx: &mut OrientationContext, backend: &mut dyn RenderBackend) {
    let fixed: Vec<IconId> = ctx.fixed.iter().collect();
    arrange_area(ctx, backend, Area::Fixed, Packing::Front, &fixed);

    let system: Vec<IconId> = ctx.system.iter().collect();
    arrange_area(ctx, backend, Area::System, Packing::End, &system);

    let notification: Vec<IconId> = ctx.notification.iter().collect();
    arrange_area(ctx, backend, Area::Notification, Packing::End, &notification);
}

/// Re-populate one area's layout container, lazily materializing a visual for
/// any member that doesn't have one yet. A member whose visual cannot be
/// built is logged and skipped rather than failing the whole arrangement.
fn arrange_area(
    ctx: &mut OrientationContext,
    backend: &mut dyn RenderBackend,
    area: Area,
    packing: Packing,
    members: &[IconId],
) {
    let mut handles = Vec::with_capacity(members.len());
    for id in members {
        let icon = match ctx.registry.icon_mut(*id) {
            Some(icon) => icon,
            None => continue,
        };
        if icon.rendered.is_none() {
            match backend.materialize(icon) {
                Ok(handle) => icon.rendered = Some(handle),
                Err(err) => {
                    log::error!("failed to materialize visual for `{}`: {:?}", icon.name, err);
                    continue;
                }
            }
        }
        if let Some(handle) = icon.rendered {
            handles.push(handle);
        }
    }
    backend.arrange(ctx.orientation, area, packing, &handles);
}
