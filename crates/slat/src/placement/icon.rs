use std::path::PathBuf;

use slat_shared_util::IconName;

use crate::render_backend::RenderedHandle;

/// Number of slots in the Fixed area. Each fixed icon owns exactly one of these.
pub const FIXED_SLOT_COUNT: usize = 6;

/// The two bar instances. Each orientation carries a fully independent copy of
/// the placement state, since the two screens have differently sized budgets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Orientation {
    Portrait,
    Landscape,
}

impl Orientation {
    pub const ALL: [Orientation; 2] = [Orientation::Portrait, Orientation::Landscape];
}

impl std::fmt::Display for Orientation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Orientation::Portrait => write!(f, "portrait"),
            Orientation::Landscape => write!(f, "landscape"),
        }
    }
}

/// A pair of values, one per orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PerOrientation<T> {
    pub portrait: T,
    pub landscape: T,
}

impl<T> PerOrientation<T> {
    pub fn get(&self, orientation: Orientation) -> &T {
        match orientation {
            Orientation::Portrait => &self.portrait,
            Orientation::Landscape => &self.landscape,
        }
    }
}

/// The three icon regions of the bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Area {
    Fixed,
    System,
    Notification,
}

impl std::fmt::Display for Area {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Area::Fixed => write!(f, "fixed"),
            Area::System => write!(f, "system"),
            Area::Notification => write!(f, "notification"),
        }
    }
}

/// For Fixed icons this is the slot index (a strict 1:1 slot, not a rank).
/// For System/Notification icons it is a rank: lower value = more urgent.
pub type Priority = u32;

/// What an icon's visual object is built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IconContent {
    Image { path: PathBuf, width: u32, height: u32 },
    Text(String),
    ImageText { path: PathBuf, width: u32, height: u32, text: String },
}

impl IconContent {
    /// Replace the textual part of the content, keeping any image untouched.
    /// A plain image becomes image+text.
    pub fn with_text(self, text: String) -> IconContent {
        match self {
            IconContent::Image { path, width, height } => IconContent::ImageText { path, width, height, text },
            IconContent::Text(_) => IconContent::Text(text),
            IconContent::ImageText { path, width, height, .. } => IconContent::ImageText { path, width, height, text },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnimationMode {
    #[default]
    None,
    Blink,
}

/// Identity of a registered icon within one orientation's registry.
#[derive(Hash, Eq, PartialEq, Ord, PartialOrd, Copy, Clone, Default)]
pub struct IconId(pub usize);

impl std::fmt::Debug for IconId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "IconId({})", self.0)
    }
}

impl IconId {
    pub(super) fn advance(&mut self) {
        self.0 += 1;
    }
}

/// The static attributes a module hands to the registry when registering an icon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconSpec {
    pub name: IconName,
    pub area: Area,
    pub priority: Priority,
    pub always_top: bool,
    pub content: IconContent,
    pub animation: AnimationMode,
}

impl IconSpec {
    pub fn new(name: impl Into<IconName>, area: Area, priority: Priority, content: IconContent) -> Self {
        IconSpec { name: name.into(), area, priority, always_top: false, content, animation: AnimationMode::None }
    }

    pub fn always_top(mut self) -> Self {
        self.always_top = true;
        self
    }
}

/// A registered icon. `area`, `priority` and `always_top` are immutable after
/// registration; the rest is runtime state owned by the placement engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Icon {
    pub name: IconName,
    pub area: Area,
    pub priority: Priority,
    pub always_top: bool,
    /// The owning module's latest intent, independent of residency.
    pub wish_to_show: bool,
    /// Whether the icon currently occupies a slot in its area list.
    pub exist_in_view: bool,
    /// Handle of the materialized visual object, if one exists.
    pub rendered: Option<RenderedHandle>,
    pub content: IconContent,
    pub animation: AnimationMode,
}

impl Icon {
    pub fn from_spec(spec: IconSpec) -> Self {
        Icon {
            name: spec.name,
            area: spec.area,
            priority: spec.priority,
            always_top: spec.always_top,
            wish_to_show: false,
            exist_in_view: false,
            rendered: None,
            content: spec.content,
            animation: spec.animation,
        }
    }
}
