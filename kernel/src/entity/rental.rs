mod created_at;
mod id;
mod returned_at;

pub use self::{created_at::*, id::*, returned_at::*};
use destructure::Destructure;
use vodca::References;

use crate::entity::{DeviceId, UserId};

/// One entry of the append-only lending ledger. Created once on rent,
/// mutated once when `returned_at` is stamped on return, never deleted.
#[derive(Debug, Clone, Eq, PartialEq, References, Destructure)]
pub struct RentalEvent {
    id: RentalEventId,
    device_id: DeviceId,
    renter_id: UserId,
    created_at: CreatedAt,
    returned_at: Option<ReturnedAt>,
}

impl RentalEvent {
    pub fn new(
        id: RentalEventId,
        device_id: DeviceId,
        renter_id: UserId,
        created_at: CreatedAt,
        returned_at: Option<ReturnedAt>,
    ) -> Self {
        Self {
            id,
            device_id,
            renter_id,
            created_at,
            returned_at,
        }
    }

    pub fn is_open(&self) -> bool {
        self.returned_at.is_none()
    }
}
