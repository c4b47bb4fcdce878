use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use vodca::{AsRefln, Fromln};

/// Rent time of a ledger event, set once at append and never touched again.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Fromln, AsRefln, Serialize, Deserialize,
)]
pub struct CreatedAt(OffsetDateTime);

impl CreatedAt {
    pub fn new(time: impl Into<OffsetDateTime>) -> Self {
        Self(time.into())
    }
}
