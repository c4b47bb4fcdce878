use crate::entity::{DeviceId, RentalEvent, RentalEventId};
use crate::KernelError;

#[async_trait::async_trait]
pub trait RentalEventQuery<Connection: 'static + Send>: Sync + Send + 'static {
    async fn find_by_id(
        &self,
        con: &mut Connection,
        id: &RentalEventId,
    ) -> error_stack::Result<Option<RentalEvent>, KernelError>;

    /// The event with the greatest `created_at` for the device, ties broken
    /// by the highest id. `None` means the device has never been rented.
    async fn find_latest_by_device_id(
        &self,
        con: &mut Connection,
        device_id: &DeviceId,
    ) -> error_stack::Result<Option<RentalEvent>, KernelError>;
}

pub trait DependOnRentalEventQuery<Connection: 'static + Send>: Sync + Send + 'static {
    type RentalEventQuery: RentalEventQuery<Connection>;
    fn rental_event_query(&self) -> &Self::RentalEventQuery;
}
