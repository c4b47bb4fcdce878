use error_stack::{Report, ResultExt};
use time::OffsetDateTime;

use kernel::interface::database::{DependOnDatabaseConnection, QueryDatabaseConnection};
use kernel::interface::query::{
    DependOnDeviceQuery, DependOnRentalEventQuery, DependOnUserQuery, DeviceQuery,
    RentalEventQuery, UserQuery,
};
use kernel::interface::update::{DependOnRentalEventModifier, RentalEventModifier};
use kernel::prelude::entity::{CreatedAt, DeviceId, OperatingSystem, ReturnedAt, UserId};
use kernel::KernelError;

use crate::error::AppError;
use crate::service::OccupancyResolver;
use crate::transfer::{DeviceRentalDto, GetDeviceListDto, RentDeviceDto, ReturnDeviceDto};

#[async_trait::async_trait]
pub trait GetDeviceListService<Connection: 'static + Send>:
    'static
    + Sync
    + Send
    + DependOnDatabaseConnection<Connection>
    + DependOnDeviceQuery<Connection>
    + OccupancyResolver<Connection>
{
    async fn get_device_list(
        &self,
        dto: GetDeviceListDto,
    ) -> error_stack::Result<Vec<DeviceRentalDto>, AppError> {
        let mut connection = self
            .database_connection()
            .transact()
            .await
            .change_context(AppError::Internal)?;

        let devices = match dto.os.filter(|os| !os.is_empty()) {
            None => self.device_query().find_all(&mut connection).await,
            Some(os) => {
                self.device_query()
                    .find_by_os(&mut connection, &OperatingSystem::new(os))
                    .await
            }
        }
        .change_context(AppError::Internal)?;

        let mut list = Vec::with_capacity(devices.len());
        for device in devices {
            let occupancy = self
                .resolve(&mut connection, device.id())
                .await
                .change_context(AppError::Internal)?;
            list.push(DeviceRentalDto::from_parts(device, occupancy.holder()));
        }
        Ok(list)
    }
}

impl<Connection: 'static + Send, T> GetDeviceListService<Connection> for T where
    T: DependOnDatabaseConnection<Connection>
        + DependOnDeviceQuery<Connection>
        + OccupancyResolver<Connection>
{
}

#[async_trait::async_trait]
pub trait RentDeviceService<Connection: 'static + Send>:
    'static
    + Sync
    + Send
    + DependOnDatabaseConnection<Connection>
    + DependOnDeviceQuery<Connection>
    + DependOnRentalEventModifier<Connection>
    + OccupancyResolver<Connection>
{
    async fn rent_device(
        &self,
        dto: RentDeviceDto,
    ) -> error_stack::Result<DeviceRentalDto, AppError> {
        let mut connection = self
            .database_connection()
            .transact()
            .await
            .change_context(AppError::Internal)?;

        let device_id = DeviceId::new(dto.device_id);
        self.device_query()
            .find_by_id(&mut connection, &device_id)
            .await
            .change_context(AppError::Internal)?
            .ok_or_else(|| Report::new(AppError::DeviceNotFound))?;

        let occupancy = self
            .resolve(&mut connection, &device_id)
            .await
            .change_context(AppError::Internal)?;
        if !occupancy.is_free() {
            return Err(Report::new(AppError::AlreadyRented));
        }

        // The store rejects a second open event for the same device, which
        // closes the race left open by the check above.
        let renter_id = UserId::new(dto.requester_id);
        let created_at = CreatedAt::new(OffsetDateTime::now_utc());
        let event_id = self
            .rental_event_modifier()
            .open(&mut connection, &device_id, &renter_id, &created_at)
            .await
            .map_err(|report| {
                let context = match report.current_context() {
                    KernelError::Concurrency => AppError::AlreadyRented,
                    _ => AppError::Internal,
                };
                report.change_context(context)
            })?;

        let event = self
            .rental_event_query()
            .find_by_id(&mut connection, &event_id)
            .await
            .change_context(AppError::Internal)?
            .ok_or_else(|| Report::new(AppError::Internal))?;
        let device = self
            .device_query()
            .find_by_id(&mut connection, &device_id)
            .await
            .change_context(AppError::Internal)?
            .ok_or_else(|| Report::new(AppError::Internal))?;
        let holder = self
            .user_query()
            .find_by_id(&mut connection, event.renter_id())
            .await
            .change_context(AppError::Internal)?
            .ok_or_else(|| Report::new(AppError::Internal))?;

        Ok(DeviceRentalDto::from_parts(device, Some(&holder)))
    }
}

impl<Connection: 'static + Send, T> RentDeviceService<Connection> for T where
    T: DependOnDatabaseConnection<Connection>
        + DependOnDeviceQuery<Connection>
        + DependOnRentalEventModifier<Connection>
        + OccupancyResolver<Connection>
{
}

#[async_trait::async_trait]
pub trait ReturnDeviceService<Connection: 'static + Send>:
    'static
    + Sync
    + Send
    + DependOnDatabaseConnection<Connection>
    + DependOnDeviceQuery<Connection>
    + DependOnRentalEventQuery<Connection>
    + DependOnRentalEventModifier<Connection>
{
    async fn return_device(
        &self,
        dto: ReturnDeviceDto,
    ) -> error_stack::Result<DeviceRentalDto, AppError> {
        let mut connection = self
            .database_connection()
            .transact()
            .await
            .change_context(AppError::Internal)?;

        let device_id = DeviceId::new(dto.device_id);
        let latest = self
            .rental_event_query()
            .find_latest_by_device_id(&mut connection, &device_id)
            .await
            .change_context(AppError::Internal)?;
        let open = match latest {
            Some(event) if event.is_open() => event,
            _ => return Err(Report::new(AppError::NotRented)),
        };
        if open.renter_id() != &UserId::new(dto.requester_id) {
            return Err(Report::new(AppError::RenterMismatch));
        }

        // Compare-and-set close: losing to a concurrent return is reported
        // as NotRented, the same terminal answer the loser would have seen.
        let returned_at = ReturnedAt::new(OffsetDateTime::now_utc());
        self.rental_event_modifier()
            .close(&mut connection, open.id(), &returned_at)
            .await
            .map_err(|report| {
                let context = match report.current_context() {
                    KernelError::Concurrency | KernelError::NotFound => AppError::NotRented,
                    _ => AppError::Internal,
                };
                report.change_context(context)
            })?;

        let device = self
            .device_query()
            .find_by_id(&mut connection, &device_id)
            .await
            .change_context(AppError::Internal)?
            .ok_or_else(|| Report::new(AppError::Internal))?;

        Ok(DeviceRentalDto::from_parts(device, None))
    }
}

impl<Connection: 'static + Send, T> ReturnDeviceService<Connection> for T where
    T: DependOnDatabaseConnection<Connection>
        + DependOnDeviceQuery<Connection>
        + DependOnRentalEventQuery<Connection>
        + DependOnRentalEventModifier<Connection>
{
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use kernel::interface::database::QueryDatabaseConnection;
    use kernel::prelude::entity::{DeviceId, UserId};

    use crate::error::AppError;
    use crate::service::mock::MockDatabase;
    use crate::service::{
        GetDeviceListService, OccupancyResolver, RentDeviceService, ReturnDeviceService,
    };
    use crate::transfer::{DeviceRentalDto, GetDeviceListDto, RentDeviceDto, ReturnDeviceDto};

    #[tokio::test]
    async fn rent_marks_device_occupied_and_blocks_second_rent() {
        let db = MockDatabase::with_catalogue();

        let rented = db
            .rent_device(RentDeviceDto {
                device_id: 1,
                requester_id: 7,
            })
            .await
            .unwrap();
        assert_eq!(rented.name, "iPhone12");
        assert_eq!(rented.display_name, "Aydar Ibragimov");

        let mut con = db.transact().await.unwrap();
        let occupancy = db.resolve(&mut con, &DeviceId::new(1)).await.unwrap();
        assert_eq!(
            occupancy.holder().map(|user| user.id().clone()),
            Some(UserId::new(7))
        );

        let second = db
            .rent_device(RentDeviceDto {
                device_id: 1,
                requester_id: 9,
            })
            .await
            .unwrap_err();
        assert!(matches!(second.current_context(), AppError::AlreadyRented));
    }

    #[tokio::test]
    async fn rent_unknown_device_is_not_found() {
        let db = MockDatabase::with_catalogue();

        let result = db
            .rent_device(RentDeviceDto {
                device_id: 42,
                requester_id: 7,
            })
            .await
            .unwrap_err();
        assert!(matches!(result.current_context(), AppError::DeviceNotFound));
    }

    #[tokio::test]
    async fn return_by_stranger_is_rejected_and_leaves_event_open() {
        let db = MockDatabase::with_catalogue();
        db.rent_device(RentDeviceDto {
            device_id: 1,
            requester_id: 7,
        })
        .await
        .unwrap();

        let result = db
            .return_device(ReturnDeviceDto {
                device_id: 1,
                requester_id: 9,
            })
            .await
            .unwrap_err();
        assert!(matches!(result.current_context(), AppError::RenterMismatch));

        let mut con = db.transact().await.unwrap();
        let occupancy = db.resolve(&mut con, &DeviceId::new(1)).await.unwrap();
        assert_eq!(
            occupancy.holder().map(|user| user.id().clone()),
            Some(UserId::new(7))
        );
    }

    #[tokio::test]
    async fn return_frees_device_and_second_return_fails() {
        let db = MockDatabase::with_catalogue();
        db.rent_device(RentDeviceDto {
            device_id: 1,
            requester_id: 7,
        })
        .await
        .unwrap();

        let returned = db
            .return_device(ReturnDeviceDto {
                device_id: 1,
                requester_id: 7,
            })
            .await
            .unwrap();
        assert_eq!(returned.display_name, "");

        let mut con = db.transact().await.unwrap();
        assert!(db
            .resolve(&mut con, &DeviceId::new(1))
            .await
            .unwrap()
            .is_free());

        let again = db
            .return_device(ReturnDeviceDto {
                device_id: 1,
                requester_id: 7,
            })
            .await
            .unwrap_err();
        assert!(matches!(again.current_context(), AppError::NotRented));
    }

    #[tokio::test]
    async fn return_without_history_is_not_rented() {
        let db = MockDatabase::with_catalogue();

        let result = db
            .return_device(ReturnDeviceDto {
                device_id: 1,
                requester_id: 7,
            })
            .await
            .unwrap_err();
        assert!(matches!(result.current_context(), AppError::NotRented));
    }

    #[tokio::test]
    async fn rent_after_return_attributes_the_new_holder() {
        let db = MockDatabase::with_catalogue();
        db.rent_device(RentDeviceDto {
            device_id: 1,
            requester_id: 7,
        })
        .await
        .unwrap();
        db.return_device(ReturnDeviceDto {
            device_id: 1,
            requester_id: 7,
        })
        .await
        .unwrap();

        let rented = db
            .rent_device(RentDeviceDto {
                device_id: 1,
                requester_id: 9,
            })
            .await
            .unwrap();
        assert_eq!(rented.display_name, "Maria Petrova");

        let events = db.events();
        assert_eq!(events.len(), 2);
        assert!(!events[0].is_open());
        assert_eq!(events[0].renter_id(), &UserId::new(7));
        assert!(events[1].is_open());
        assert_eq!(events[1].renter_id(), &UserId::new(9));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_rents_have_exactly_one_winner() {
        let db = Arc::new(MockDatabase::with_catalogue());

        let mut handles = Vec::new();
        for attempt in 0..8 {
            let db = Arc::clone(&db);
            handles.push(tokio::spawn(async move {
                db.rent_device(RentDeviceDto {
                    device_id: 1,
                    requester_id: if attempt % 2 == 0 { 7 } else { 9 },
                })
                .await
            }));
        }

        let mut winners = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => winners += 1,
                Err(report) => {
                    assert!(matches!(report.current_context(), AppError::AlreadyRented))
                }
            }
        }
        assert_eq!(winners, 1);
        assert_eq!(db.events().iter().filter(|event| event.is_open()).count(), 1);
    }

    #[tokio::test]
    async fn device_list_reflects_the_rental_lifecycle() {
        let db = MockDatabase::with_catalogue();

        let list = db
            .get_device_list(GetDeviceListDto {
                os: Some("IOS".to_string()),
            })
            .await
            .unwrap();
        assert_eq!(
            list,
            vec![DeviceRentalDto {
                id: 1,
                name: "iPhone12".to_string(),
                display_name: String::new(),
            }]
        );

        db.rent_device(RentDeviceDto {
            device_id: 1,
            requester_id: 7,
        })
        .await
        .unwrap();
        let list = db
            .get_device_list(GetDeviceListDto { os: None })
            .await
            .unwrap();
        let iphone = list.iter().find(|device| device.id == 1).unwrap();
        assert_eq!(iphone.display_name, "Aydar Ibragimov");

        db.return_device(ReturnDeviceDto {
            device_id: 1,
            requester_id: 7,
        })
        .await
        .unwrap();
        let list = db
            .get_device_list(GetDeviceListDto { os: None })
            .await
            .unwrap();
        let iphone = list.iter().find(|device| device.id == 1).unwrap();
        assert_eq!(iphone.display_name, "");
    }

    #[tokio::test]
    async fn os_filter_narrows_the_list_and_empty_filter_does_not() {
        let db = MockDatabase::with_catalogue();

        let filtered = db
            .get_device_list(GetDeviceListDto {
                os: Some("IOS".to_string()),
            })
            .await
            .unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id, 1);

        let unfiltered = db
            .get_device_list(GetDeviceListDto {
                os: Some(String::new()),
            })
            .await
            .unwrap();
        assert_eq!(unfiltered.len(), 2);
    }
}
