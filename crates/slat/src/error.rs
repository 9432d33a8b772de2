use slat_shared_util::IconName;

/// A business rejection from the placement engine. All of these are local,
/// recoverable conditions: the daemon logs them and returns to the caller, it
/// never tears down the process over bad module input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlacementError {
    /// An icon with this name is already active in the same orientation.
    #[error("an icon named `{0}` is already registered")]
    DuplicateName(IconName),

    /// Capacity is exhausted by higher-or-equal-priority pinned residents.
    /// The wish to show is still recorded for later promotion.
    #[error("no slot available, all occupied by more urgent icons")]
    CannotAdd,

    /// The admission classifier decided an eviction was possible, but every
    /// resident turned out to be pinned. Logged as an unexpected-error class,
    /// distinct from an ordinary `CannotAdd`.
    #[error("eviction required, but every resident is pinned")]
    EvictionImpossible,

    /// Malformed descriptor handed in by a module, rejected at the boundary.
    #[error("invalid icon descriptor: {0}")]
    InvalidDescriptor(String),
}

impl PlacementError {
    /// Log the rejection at the severity its class calls for.
    pub fn log(&self, context: &str) {
        match self {
            PlacementError::CannotAdd => log::debug!("{}: {}", context, self),
            PlacementError::EvictionImpossible => log::error!("{}: {}", context, self),
            PlacementError::DuplicateName(_) | PlacementError::InvalidDescriptor(_) => {
                log::warn!("{}: {}", context, self)
            }
        }
    }
}
