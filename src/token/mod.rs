// Token module - class configuration and holder identity

mod holder;
mod schedule;

pub use holder::HolderId;
pub use schedule::EmissionSchedule;

/// Token class identifier.
pub type TokenId = u64;

/// Discrete time unit driving accrual, supplied by the environment.
pub type Tick = u64;
