use error_stack::Report;

use kernel::interface::query::{
    DependOnRentalEventQuery, DependOnUserQuery, RentalEventQuery, UserQuery,
};
use kernel::prelude::entity::{DeviceId, User};
use kernel::KernelError;

/// Point-in-time possession state of a device, derived from the latest
/// ledger event. Never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Occupancy {
    holder: Option<User>,
}

impl Occupancy {
    pub fn free() -> Self {
        Self { holder: None }
    }

    pub fn held_by(user: User) -> Self {
        Self { holder: Some(user) }
    }

    pub fn is_free(&self) -> bool {
        self.holder.is_none()
    }

    pub fn holder(&self) -> Option<&User> {
        self.holder.as_ref()
    }
}

#[async_trait::async_trait]
pub trait OccupancyResolver<Connection: 'static + Send>:
    'static + Sync + Send + DependOnRentalEventQuery<Connection> + DependOnUserQuery<Connection>
{
    /// Read-only snapshot: a device with no events or a closed latest event
    /// is free, otherwise it is held by the renter of the open event.
    async fn resolve(
        &self,
        con: &mut Connection,
        device_id: &DeviceId,
    ) -> error_stack::Result<Occupancy, KernelError> {
        let latest = self
            .rental_event_query()
            .find_latest_by_device_id(con, device_id)
            .await?;
        let open = match latest {
            Some(event) if event.is_open() => event,
            _ => return Ok(Occupancy::free()),
        };
        let holder = self
            .user_query()
            .find_by_id(con, open.renter_id())
            .await?
            .ok_or_else(|| {
                Report::new(KernelError::Internal)
                    .attach_printable("open event references a renter missing from the directory")
            })?;
        Ok(Occupancy::held_by(holder))
    }
}

impl<Connection: 'static + Send, T> OccupancyResolver<Connection> for T where
    T: DependOnRentalEventQuery<Connection> + DependOnUserQuery<Connection>
{
}

#[cfg(test)]
mod test {
    use kernel::interface::database::QueryDatabaseConnection;
    use kernel::interface::update::RentalEventModifier;
    use kernel::prelude::entity::{CreatedAt, DeviceId, ReturnedAt, UserId};
    use time::OffsetDateTime;

    use crate::service::mock::{MockDatabase, MockRentalEventRepository};
    use crate::service::OccupancyResolver;

    #[tokio::test]
    async fn device_without_history_is_free() {
        let db = MockDatabase::with_catalogue();
        let mut con = db.transact().await.unwrap();

        let occupancy = db.resolve(&mut con, &DeviceId::new(1)).await.unwrap();
        assert!(occupancy.is_free());
        assert!(occupancy.holder().is_none());
    }

    #[tokio::test]
    async fn open_event_marks_device_held() {
        let db = MockDatabase::with_catalogue();
        let mut con = db.transact().await.unwrap();

        MockRentalEventRepository
            .open(
                &mut con,
                &DeviceId::new(1),
                &UserId::new(7),
                &CreatedAt::new(OffsetDateTime::now_utc()),
            )
            .await
            .unwrap();

        let occupancy = db.resolve(&mut con, &DeviceId::new(1)).await.unwrap();
        assert_eq!(
            occupancy.holder().map(|user| user.id().clone()),
            Some(UserId::new(7))
        );
    }

    #[tokio::test]
    async fn closed_latest_event_means_free() {
        let db = MockDatabase::with_catalogue();
        let mut con = db.transact().await.unwrap();

        let event_id = MockRentalEventRepository
            .open(
                &mut con,
                &DeviceId::new(1),
                &UserId::new(7),
                &CreatedAt::new(OffsetDateTime::now_utc()),
            )
            .await
            .unwrap();
        MockRentalEventRepository
            .close(
                &mut con,
                &event_id,
                &ReturnedAt::new(OffsetDateTime::now_utc()),
            )
            .await
            .unwrap();

        let occupancy = db.resolve(&mut con, &DeviceId::new(1)).await.unwrap();
        assert!(occupancy.is_free());
    }
}
