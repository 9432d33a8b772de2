use std::cell::RefCell;
use std::rc::Rc;

use maplit::hashset;
use pretty_assertions::assert_eq;

use crate::error::PlacementError;
use crate::render_backend::{Packing, RecordingBackend, RenderBackend, RenderedHandle};

use super::capacity::CapacityTable;
use super::icon::{Area, Icon, IconContent, IconId, IconSpec, Orientation, Priority};
use super::service::IndicatorService;

/// Backend handle that stays inspectable after the service takes ownership of
/// its clone.
#[derive(Clone, Default)]
struct SharedRecorder(Rc<RefCell<RecordingBackend>>);

impl SharedRecorder {
    fn arrangement(&self, orientation: Orientation, area: Area) -> (Packing, Vec<RenderedHandle>) {
        self.0.borrow().arrangements.get(&(orientation, area)).cloned().expect("area was never arranged")
    }

    fn live_handles(&self) -> Vec<RenderedHandle> {
        self.0.borrow().live.clone()
    }
}

impl RenderBackend for SharedRecorder {
    fn materialize(&mut self, icon: &Icon) -> anyhow::Result<RenderedHandle> {
        self.0.borrow_mut().materialize(icon)
    }

    fn destroy(&mut self, handle: RenderedHandle) {
        self.0.borrow_mut().destroy(handle)
    }

    fn arrange(&mut self, orientation: Orientation, area: Area, packing: Packing, handles: &[RenderedHandle]) {
        self.0.borrow_mut().arrange(orientation, area, packing, handles)
    }
}

/// A service with small, test-sized budgets: System and Notification both
/// hold 2 icons in portrait and 3 in landscape, one less with the percentage
/// readout enabled.
fn test_service() -> (IndicatorService, SharedRecorder) {
    let recorder = SharedRecorder::default();
    let capacity = CapacityTable {
        system_portrait: 2,
        system_landscape: 3,
        notification_portrait: 2,
        notification_landscape: 3,
        percentage_delta: 1,
    };
    (IndicatorService::with_capacity(Box::new(recorder.clone()), capacity), recorder)
}

fn image_content(name: &str) -> IconContent {
    IconContent::Image { path: format!("icons/{}.png", name).into(), width: 24, height: 24 }
}

fn system_icon(name: &str, priority: Priority) -> IconSpec {
    IconSpec::new(name, Area::System, priority, image_content(name))
}

fn noti_icon(name: &str, priority: Priority) -> IconSpec {
    IconSpec::new(name, Area::Notification, priority, image_content(name))
}

fn fixed_icon(name: &str, slot: Priority) -> IconSpec {
    IconSpec::new(name, Area::Fixed, slot, image_content(name))
}

fn show(service: &mut IndicatorService, spec: IconSpec) -> Result<IconId, PlacementError> {
    let id = service.register(Orientation::Portrait, spec)?;
    service.show(Orientation::Portrait, id)?;
    Ok(id)
}

fn resident_names(service: &IndicatorService, orientation: Orientation, area: Area) -> Vec<String> {
    let ctx = service.context(orientation);
    let names = |ids: &mut dyn Iterator<Item = IconId>| {
        ids.map(|id| ctx.registry.icon(id).expect("resident without registry entry").name.to_string()).collect()
    };
    match area {
        Area::Fixed => names(&mut ctx.fixed.iter()),
        Area::System => names(&mut ctx.system.iter()),
        Area::Notification => names(&mut ctx.notification.iter()),
    }
}

/// `exist_in_view` must mirror actual list membership for every icon.
fn assert_membership_consistent(service: &IndicatorService, orientation: Orientation) {
    let ctx = service.context(orientation);
    for (id, icon) in ctx.registry.iter() {
        let listed = match icon.area {
            Area::Fixed => ctx.fixed.iter().any(|other| other == id),
            Area::System => ctx.system.contains(id),
            Area::Notification => ctx.notification.contains(id),
        };
        assert_eq!(
            icon.exist_in_view, listed,
            "icon `{}` has exist_in_view={} but listed={}",
            icon.name, icon.exist_in_view, listed
        );
    }
}

#[test]
fn test_admit_without_evict() {
    let (mut service, _) = test_service();
    let x = show(&mut service, system_icon("x", 1)).unwrap();
    let y = show(&mut service, system_icon("y", 2)).unwrap();

    assert_eq!(resident_names(&service, Orientation::Portrait, Area::System), vec!["x", "y"]);
    assert!(service.is_visible(Orientation::Portrait, x));
    assert!(service.is_visible(Orientation::Portrait, y));
    assert_membership_consistent(&service, Orientation::Portrait);
}

#[test]
fn test_admit_evicts_lowest_priority() {
    // System capacity is 2. x and y fill the list, then a more urgent icon
    // arrives: the least urgent resident goes.
    let (mut service, _) = test_service();
    show(&mut service, system_icon("x", 1)).unwrap();
    let y = show(&mut service, system_icon("y", 2)).unwrap();
    show(&mut service, system_icon("z", 1)).unwrap();

    assert_eq!(resident_names(&service, Orientation::Portrait, Area::System), vec!["z", "x"]);
    assert!(!service.is_visible(Orientation::Portrait, y));
    let ctx = service.context(Orientation::Portrait);
    let evicted = ctx.registry.icon(y).unwrap();
    // The eviction does not clear the module's intent.
    assert!(evicted.wish_to_show);
    assert!(evicted.rendered.is_none());
    assert_membership_consistent(&service, Orientation::Portrait);
}

#[test]
fn test_refusal_when_outranked() {
    let (mut service, _) = test_service();
    show(&mut service, system_icon("x", 1)).unwrap();
    show(&mut service, system_icon("y", 2)).unwrap();

    let b = service.register(Orientation::Portrait, system_icon("b", 5)).unwrap();
    assert_eq!(service.show(Orientation::Portrait, b), Err(PlacementError::CannotAdd));

    // No membership change, but the wish is recorded for later promotion.
    assert_eq!(resident_names(&service, Orientation::Portrait, Area::System), vec!["x", "y"]);
    let icon = service.context(Orientation::Portrait).registry.icon(b).unwrap();
    assert!(icon.wish_to_show);
    assert!(!icon.exist_in_view);
    assert_membership_consistent(&service, Orientation::Portrait);
}

#[test]
fn test_fixed_slot_displacement() {
    // An ordinary fixed-slot occupant is displaced by a newcomer for the
    // same slot, and its visual is torn down.
    let (mut service, recorder) = test_service();
    let a = show(&mut service, fixed_icon("a", 3)).unwrap();
    let a_handle = service.context(Orientation::Portrait).registry.icon(a).unwrap().rendered.unwrap();

    let b = show(&mut service, fixed_icon("b", 3)).unwrap();

    assert_eq!(resident_names(&service, Orientation::Portrait, Area::Fixed), vec!["b"]);
    assert!(!service.is_visible(Orientation::Portrait, a));
    assert!(service.is_visible(Orientation::Portrait, b));
    assert!(!recorder.live_handles().contains(&a_handle));
    assert_membership_consistent(&service, Orientation::Portrait);
}

#[test]
fn test_fixed_slot_pinned_occupant_stays() {
    // A pinned occupant keeps its slot; the newcomer's request succeeds
    // without effect but its wish is recorded.
    let (mut service, _) = test_service();
    let a = show(&mut service, fixed_icon("a", 3).always_top()).unwrap();

    let b = service.register(Orientation::Portrait, fixed_icon("b", 3)).unwrap();
    assert_eq!(service.show(Orientation::Portrait, b), Ok(()));

    assert_eq!(resident_names(&service, Orientation::Portrait, Area::Fixed), vec!["a"]);
    assert!(service.is_visible(Orientation::Portrait, a));
    let icon = service.context(Orientation::Portrait).registry.icon(b).unwrap();
    assert!(icon.wish_to_show);
    assert!(!icon.exist_in_view);
}

#[test]
fn test_fixed_slot_freed_promotes_waiting() {
    let (mut service, _) = test_service();
    let a = show(&mut service, fixed_icon("a", 3).always_top()).unwrap();
    let b = show(&mut service, fixed_icon("b", 3)).unwrap();
    assert!(!service.is_visible(Orientation::Portrait, b));

    service.hide(Orientation::Portrait, a).unwrap();

    assert_eq!(resident_names(&service, Orientation::Portrait, Area::Fixed), vec!["b"]);
    assert_membership_consistent(&service, Orientation::Portrait);
}

#[test]
fn test_notification_evicts_least_urgent_when_full() {
    // The Notification area has no priority-based rejection: when full it
    // always admits by evicting the least urgent resident.
    let (mut service, _) = test_service();
    show(&mut service, noti_icon("noti/a", 10)).unwrap();
    show(&mut service, noti_icon("noti/b", 5)).unwrap();
    show(&mut service, noti_icon("noti/c", 20)).unwrap();

    // The victim is the least urgent resident (a), even though the newcomer
    // itself ranks below it. Notification never rejects on priority.
    assert_eq!(resident_names(&service, Orientation::Portrait, Area::Notification), vec!["noti/c", "noti/b"]);
    assert_membership_consistent(&service, Orientation::Portrait);
}

#[test]
fn test_notification_eviction_impossible_when_all_pinned() {
    let (mut service, _) = test_service();
    show(&mut service, noti_icon("noti/a", 10).always_top()).unwrap();
    show(&mut service, noti_icon("noti/b", 10).always_top()).unwrap();

    let c = service.register(Orientation::Portrait, noti_icon("noti/c", 10)).unwrap();
    assert_eq!(service.show(Orientation::Portrait, c), Err(PlacementError::EvictionImpossible));

    assert_eq!(resident_names(&service, Orientation::Portrait, Area::Notification), vec!["noti/a", "noti/b"]);
    assert_membership_consistent(&service, Orientation::Portrait);
}

#[test]
fn test_duplicate_registration_rejected() {
    let (mut service, _) = test_service();
    let first = service.register(Orientation::Portrait, system_icon("wifi", 1)).unwrap();
    let result = service.register(Orientation::Portrait, system_icon("wifi", 2));

    assert_eq!(result, Err(PlacementError::DuplicateName("wifi".into())));
    assert_eq!(service.context(Orientation::Portrait).registry.len(), 1);
    assert_eq!(service.context(Orientation::Portrait).registry.icon(first).unwrap().priority, 1);

    // The same name is fine in the other orientation's module set.
    assert!(service.register(Orientation::Landscape, system_icon("wifi", 1)).is_ok());
}

#[test]
fn test_invalid_descriptors_rejected_at_boundary() {
    let (mut service, _) = test_service();
    assert!(matches!(
        service.register(Orientation::Portrait, system_icon("", 1)),
        Err(PlacementError::InvalidDescriptor(_))
    ));
    assert!(matches!(
        service.register(Orientation::Portrait, fixed_icon("late", 9)),
        Err(PlacementError::InvalidDescriptor(_))
    ));
    assert!(service.context(Orientation::Portrait).registry.is_empty());
}

#[test]
fn test_capacity_bound_holds_under_pressure() {
    let (mut service, _) = test_service();
    for (i, priority) in [(0, 4), (1, 2), (2, 9), (3, 1), (4, 7)] {
        let name = format!("sys{}", i);
        let _ = show(&mut service, system_icon(&name, priority));
        assert!(service.context(Orientation::Portrait).system.count() <= service.max_slots(Area::System, Orientation::Portrait));
        assert_membership_consistent(&service, Orientation::Portrait);
    }
    // The two most urgent ones won.
    assert_eq!(resident_names(&service, Orientation::Portrait, Area::System), vec!["sys3", "sys1"]);
}

#[test]
fn test_pinned_resident_survives_equal_priority_pressure() {
    // A pinned resident is never evicted in favor of a non-pinned newcomer
    // of equal or lower priority.
    let (mut service, _) = test_service();
    let pinned = show(&mut service, system_icon("pinned", 5).always_top()).unwrap();
    show(&mut service, system_icon("a", 5)).unwrap();
    show(&mut service, system_icon("b", 5)).unwrap();

    assert!(service.is_visible(Orientation::Portrait, pinned));
    let names = resident_names(&service, Orientation::Portrait, Area::System);
    assert!(names.contains(&"pinned".to_string()), "pinned icon was evicted: {:?}", names);
    assert_membership_consistent(&service, Orientation::Portrait);
}

#[test]
fn test_pinned_candidate_evicts_equal_priority_resident() {
    let (mut service, _) = test_service();
    show(&mut service, system_icon("a", 5)).unwrap();
    show(&mut service, system_icon("b", 5)).unwrap();
    // b was inserted before a (recency tie-break), so a is the oldest
    // equal-priority resident and the one to go.
    show(&mut service, system_icon("pinned", 5).always_top()).unwrap();

    assert_eq!(resident_names(&service, Orientation::Portrait, Area::System), vec!["pinned", "b"]);
    assert_membership_consistent(&service, Orientation::Portrait);
}

#[test]
fn test_pinned_candidate_refused_when_cap_filled_by_pinned() {
    let (mut service, _) = test_service();
    show(&mut service, system_icon("a", 5).always_top()).unwrap();
    show(&mut service, system_icon("b", 5).always_top()).unwrap();

    let c = service.register(Orientation::Portrait, system_icon("c", 5).always_top()).unwrap();
    assert_eq!(service.show(Orientation::Portrait, c), Err(PlacementError::CannotAdd));
}

#[test]
fn test_promotion_on_dismiss() {
    let (mut service, _) = test_service();
    show(&mut service, system_icon("x", 1)).unwrap();
    let y = show(&mut service, system_icon("y", 2)).unwrap();

    // b is refused while outranked, its wish stays recorded.
    let b = service.register(Orientation::Portrait, system_icon("b", 5)).unwrap();
    assert_eq!(service.show(Orientation::Portrait, b), Err(PlacementError::CannotAdd));

    // Freeing y's slot promotes nothing: no other icon waits at rank 2.
    service.hide(Orientation::Portrait, y).unwrap();
    assert_eq!(resident_names(&service, Orientation::Portrait, Area::System), vec!["x"]);

    // a arrives at b's rank and takes the free slot.
    let a = show(&mut service, system_icon("a", 5)).unwrap();
    assert_eq!(resident_names(&service, Orientation::Portrait, Area::System), vec!["x", "a"]);

    // Dismissing a frees its slot; b has been waiting at the same rank and
    // becomes visible without being re-requested.
    service.hide(Orientation::Portrait, a).unwrap();
    assert_eq!(resident_names(&service, Orientation::Portrait, Area::System), vec!["x", "b"]);
    assert!(service.is_visible(Orientation::Portrait, b));
    assert_membership_consistent(&service, Orientation::Portrait);
}

#[test]
fn test_system_ordering_most_urgent_first_with_recency_tiebreak() {
    let (mut service, _) = test_service();
    // Landscape holds three System icons.
    let a = service.register(Orientation::Landscape, system_icon("a", 2)).unwrap();
    let b = service.register(Orientation::Landscape, system_icon("b", 2)).unwrap();
    let c = service.register(Orientation::Landscape, system_icon("c", 1)).unwrap();
    for id in [a, b, c] {
        service.show(Orientation::Landscape, id).unwrap();
    }

    // b is newer than a at the same rank, so it sits in front of it.
    assert_eq!(resident_names(&service, Orientation::Landscape, Area::System), vec!["c", "b", "a"]);
}

#[test]
fn test_notification_ordering_is_reversed() {
    let (mut service, _) = test_service();
    let a = service.register(Orientation::Landscape, noti_icon("noti/a", 1)).unwrap();
    let b = service.register(Orientation::Landscape, noti_icon("noti/b", 5)).unwrap();
    let c = service.register(Orientation::Landscape, noti_icon("noti/c", 3)).unwrap();
    for id in [a, b, c] {
        service.show(Orientation::Landscape, id).unwrap();
    }

    // Reversed comparison direction: least urgent first.
    assert_eq!(
        resident_names(&service, Orientation::Landscape, Area::Notification),
        vec!["noti/b", "noti/c", "noti/a"]
    );
}

#[test]
fn test_pinned_entries_skipped_during_insertion() {
    let (mut service, _) = test_service();
    let p = service.register(Orientation::Landscape, system_icon("p", 2).always_top()).unwrap();
    let a = service.register(Orientation::Landscape, system_icon("a", 2)).unwrap();
    let c = service.register(Orientation::Landscape, system_icon("c", 1)).unwrap();
    for id in [p, a, c] {
        service.show(Orientation::Landscape, id).unwrap();
    }

    // c is the most urgent, but the pinned entry is skipped during the
    // insertion comparison and keeps the front position.
    assert_eq!(resident_names(&service, Orientation::Landscape, Area::System), vec!["p", "c", "a"]);
}

#[test]
fn test_render_is_idempotent() {
    let (mut service, recorder) = test_service();
    show(&mut service, fixed_icon("clock", 0).always_top()).unwrap();
    show(&mut service, system_icon("bt", 2)).unwrap();
    show(&mut service, noti_icon("noti/mail", 10)).unwrap();

    let first = recorder.0.borrow().arrangements.clone();
    service.render(Orientation::Portrait);
    let second = recorder.0.borrow().arrangements.clone();

    assert_eq!(first, second);
    assert_eq!(
        first.keys().copied().collect::<std::collections::HashSet<_>>(),
        hashset! {
            (Orientation::Portrait, Area::Fixed),
            (Orientation::Portrait, Area::System),
            (Orientation::Portrait, Area::Notification),
        }
    );
}

#[test]
fn test_packing_convention() {
    let (mut service, recorder) = test_service();
    show(&mut service, fixed_icon("clock", 0).always_top()).unwrap();
    show(&mut service, system_icon("bt", 2)).unwrap();

    let (fixed_packing, _) = recorder.arrangement(Orientation::Portrait, Area::Fixed);
    let (system_packing, _) = recorder.arrangement(Orientation::Portrait, Area::System);
    let (noti_packing, _) = recorder.arrangement(Orientation::Portrait, Area::Notification);
    assert_eq!(fixed_packing, Packing::Front);
    assert_eq!(system_packing, Packing::End);
    assert_eq!(noti_packing, Packing::End);
}

#[test]
fn test_percentage_display_shrinks_and_restores_budget() {
    let (mut service, _) = test_service();
    show(&mut service, system_icon("a", 1)).unwrap();
    let b = show(&mut service, system_icon("b", 2)).unwrap();
    assert_eq!(service.context(Orientation::Portrait).system.count(), 2);

    // Budget drops to 1: the least urgent resident is pushed out, but its
    // wish survives.
    service.set_percentage_display(true);
    assert_eq!(service.max_slots(Area::System, Orientation::Portrait), 1);
    assert_eq!(resident_names(&service, Orientation::Portrait, Area::System), vec!["a"]);
    assert!(!service.is_visible(Orientation::Portrait, b));
    assert_membership_consistent(&service, Orientation::Portrait);

    // Budget grows back: the pushed-out icon returns on its own.
    service.set_percentage_display(false);
    assert_eq!(resident_names(&service, Orientation::Portrait, Area::System), vec!["a", "b"]);
    assert_membership_consistent(&service, Orientation::Portrait);
}

#[test]
fn test_orientations_are_independent() {
    let (mut service, _) = test_service();
    let portrait = service.register(Orientation::Portrait, system_icon("bt", 2)).unwrap();
    let landscape = service.register(Orientation::Landscape, system_icon("bt", 2)).unwrap();

    service.show(Orientation::Portrait, portrait).unwrap();
    assert!(service.is_visible(Orientation::Portrait, portrait));
    assert!(!service.is_visible(Orientation::Landscape, landscape));
    assert_eq!(resident_names(&service, Orientation::Landscape, Area::System), Vec::<String>::new());
}

#[test]
fn test_unregister_frees_slot_and_promotes() {
    let (mut service, _) = test_service();
    show(&mut service, noti_icon("noti/a", 10)).unwrap();
    let b = show(&mut service, noti_icon("noti/b", 10)).unwrap();
    let c = show(&mut service, noti_icon("noti/c", 10)).unwrap();
    // c got in by evicting b, which is now waiting with its wish recorded.
    assert!(!service.is_visible(Orientation::Portrait, b));

    // The notifying package withdraws c entirely.
    service.unregister(Orientation::Portrait, c).unwrap();

    let ctx = service.context(Orientation::Portrait);
    assert!(ctx.registry.find_by_name("noti/c").is_none());
    // The freed slot went back to the waiting icon of the same rank.
    assert_eq!(ctx.notification.count(), 2);
    assert!(service.is_visible(Orientation::Portrait, b));
    assert_membership_consistent(&service, Orientation::Portrait);
}

#[test]
fn test_text_change_rebuilds_visual() {
    let (mut service, recorder) = test_service();
    let clock = show(&mut service, IconSpec::new("clock", Area::Fixed, 0, IconContent::Text("09:41".into()))).unwrap();
    let before = service.context(Orientation::Portrait).registry.icon(clock).unwrap().rendered.unwrap();

    service.set_text(Orientation::Portrait, clock, "09:42".into()).unwrap();

    let after = service.context(Orientation::Portrait).registry.icon(clock).unwrap().rendered.unwrap();
    assert_ne!(before, after);
    assert!(!recorder.live_handles().contains(&before));
    assert!(recorder.live_handles().contains(&after));
}

#[test]
fn test_show_when_already_visible_is_a_noop() {
    let (mut service, recorder) = test_service();
    let x = show(&mut service, system_icon("x", 1)).unwrap();
    let handle = service.context(Orientation::Portrait).registry.icon(x).unwrap().rendered.unwrap();

    service.show(Orientation::Portrait, x).unwrap();

    assert_eq!(resident_names(&service, Orientation::Portrait, Area::System), vec!["x"]);
    assert_eq!(service.context(Orientation::Portrait).registry.icon(x).unwrap().rendered, Some(handle));
    assert!(recorder.live_handles().contains(&handle));
}
