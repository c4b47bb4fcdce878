use crate::entity::{CreatedAt, DeviceId, RentalEventId, ReturnedAt, UserId};
use crate::KernelError;

#[async_trait::async_trait]
pub trait RentalEventModifier<Connection: 'static + Send>: 'static + Sync + Send {
    /// Appends an open event (`returned_at` unset) and returns the
    /// store-assigned id. Fails with `Concurrency` when the device already
    /// has an open event.
    async fn open(
        &self,
        con: &mut Connection,
        device_id: &DeviceId,
        renter_id: &UserId,
        created_at: &CreatedAt,
    ) -> error_stack::Result<RentalEventId, KernelError>;

    /// Stamps `returned_at` on an event that is still open at write time.
    /// Fails with `Concurrency` when the event was already closed and with
    /// `NotFound` when no such event exists.
    async fn close(
        &self,
        con: &mut Connection,
        id: &RentalEventId,
        returned_at: &ReturnedAt,
    ) -> error_stack::Result<(), KernelError>;
}

pub trait DependOnRentalEventModifier<Connection: 'static + Send>: 'static + Sync + Send {
    type RentalEventModifier: RentalEventModifier<Connection>;
    fn rental_event_modifier(&self) -> &Self::RentalEventModifier;
}
