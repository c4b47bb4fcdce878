use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use error_stack::Report;

use kernel::interface::database::QueryDatabaseConnection;
use kernel::interface::query::{
    DependOnDeviceQuery, DependOnRentalEventQuery, DependOnUserQuery, DeviceQuery,
    RentalEventQuery, UserQuery,
};
use kernel::interface::update::{DependOnRentalEventModifier, RentalEventModifier};
use kernel::prelude::entity::{
    CreatedAt, Device, DeviceId, DeviceName, DisplayName, EmailAddress, OperatingSystem,
    RentalEvent, RentalEventId, ReturnedAt, User, UserId, UserName,
};
use kernel::KernelError;

/// Shared in-memory store handed out as the "connection". The open/close
/// guards mirror the partial unique index and compare-and-set the Postgres
/// driver relies on, so the service races are observable in tests.
#[derive(Clone, Default)]
pub(crate) struct MockConnection {
    devices: Arc<Mutex<Vec<Device>>>,
    users: Arc<Mutex<Vec<User>>>,
    events: Arc<Mutex<Vec<RentalEvent>>>,
    sequence: Arc<AtomicI64>,
}

#[derive(Clone, Default)]
pub(crate) struct MockDatabase {
    connection: MockConnection,
}

impl MockDatabase {
    /// One iOS device, one Android device, two directory users.
    pub(crate) fn with_catalogue() -> Self {
        let db = Self::default();
        {
            let mut devices = db.connection.devices.lock().unwrap();
            devices.push(Device::new(
                DeviceId::new(1),
                DeviceName::new("iPhone12"),
                OperatingSystem::new("IOS"),
            ));
            devices.push(Device::new(
                DeviceId::new(2),
                DeviceName::new("Pixel 6"),
                OperatingSystem::new("ANDROID"),
            ));
        }
        {
            let mut users = db.connection.users.lock().unwrap();
            users.push(User::new(
                UserId::new(7),
                UserName::new("aydar"),
                DisplayName::new("Aydar Ibragimov"),
                EmailAddress::new("aydar@example.com"),
            ));
            users.push(User::new(
                UserId::new(9),
                UserName::new("maria"),
                DisplayName::new("Maria Petrova"),
                EmailAddress::new("maria@example.com"),
            ));
        }
        db
    }

    pub(crate) fn events(&self) -> Vec<RentalEvent> {
        self.connection.events.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl QueryDatabaseConnection<MockConnection> for MockDatabase {
    async fn transact(&self) -> error_stack::Result<MockConnection, KernelError> {
        Ok(self.connection.clone())
    }
}

pub(crate) struct MockDeviceRepository;

#[async_trait::async_trait]
impl DeviceQuery<MockConnection> for MockDeviceRepository {
    async fn find_all(
        &self,
        con: &mut MockConnection,
    ) -> error_stack::Result<Vec<Device>, KernelError> {
        Ok(con.devices.lock().unwrap().clone())
    }

    async fn find_by_os(
        &self,
        con: &mut MockConnection,
        os: &OperatingSystem,
    ) -> error_stack::Result<Vec<Device>, KernelError> {
        Ok(con
            .devices
            .lock()
            .unwrap()
            .iter()
            .filter(|device| device.os() == os)
            .cloned()
            .collect())
    }

    async fn find_by_id(
        &self,
        con: &mut MockConnection,
        id: &DeviceId,
    ) -> error_stack::Result<Option<Device>, KernelError> {
        Ok(con
            .devices
            .lock()
            .unwrap()
            .iter()
            .find(|device| device.id() == id)
            .cloned())
    }
}

pub(crate) struct MockUserRepository;

#[async_trait::async_trait]
impl UserQuery<MockConnection> for MockUserRepository {
    async fn find_all(
        &self,
        con: &mut MockConnection,
    ) -> error_stack::Result<Vec<User>, KernelError> {
        Ok(con.users.lock().unwrap().clone())
    }

    async fn find_by_id(
        &self,
        con: &mut MockConnection,
        id: &UserId,
    ) -> error_stack::Result<Option<User>, KernelError> {
        Ok(con
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|user| user.id() == id)
            .cloned())
    }

    async fn find_by_name(
        &self,
        con: &mut MockConnection,
        name: &UserName,
    ) -> error_stack::Result<Option<User>, KernelError> {
        Ok(con
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|user| user.name() == name)
            .cloned())
    }
}

pub(crate) struct MockRentalEventRepository;

#[async_trait::async_trait]
impl RentalEventQuery<MockConnection> for MockRentalEventRepository {
    async fn find_by_id(
        &self,
        con: &mut MockConnection,
        id: &RentalEventId,
    ) -> error_stack::Result<Option<RentalEvent>, KernelError> {
        Ok(con
            .events
            .lock()
            .unwrap()
            .iter()
            .find(|event| event.id() == id)
            .cloned())
    }

    async fn find_latest_by_device_id(
        &self,
        con: &mut MockConnection,
        device_id: &DeviceId,
    ) -> error_stack::Result<Option<RentalEvent>, KernelError> {
        Ok(con
            .events
            .lock()
            .unwrap()
            .iter()
            .filter(|event| event.device_id() == device_id)
            .max_by_key(|event| (event.created_at().clone(), event.id().as_ref().clone()))
            .cloned())
    }
}

#[async_trait::async_trait]
impl RentalEventModifier<MockConnection> for MockRentalEventRepository {
    async fn open(
        &self,
        con: &mut MockConnection,
        device_id: &DeviceId,
        renter_id: &UserId,
        created_at: &CreatedAt,
    ) -> error_stack::Result<RentalEventId, KernelError> {
        let mut events = con.events.lock().unwrap();
        if events
            .iter()
            .any(|event| event.device_id() == device_id && event.is_open())
        {
            return Err(Report::new(KernelError::Concurrency));
        }
        let id = RentalEventId::new(con.sequence.fetch_add(1, Ordering::SeqCst) + 1);
        events.push(RentalEvent::new(
            id.clone(),
            device_id.clone(),
            renter_id.clone(),
            created_at.clone(),
            None,
        ));
        Ok(id)
    }

    async fn close(
        &self,
        con: &mut MockConnection,
        id: &RentalEventId,
        returned_at: &ReturnedAt,
    ) -> error_stack::Result<(), KernelError> {
        let mut events = con.events.lock().unwrap();
        let Some(index) = events.iter().position(|event| event.id() == id) else {
            return Err(Report::new(KernelError::NotFound));
        };
        if !events[index].is_open() {
            return Err(Report::new(KernelError::Concurrency));
        }
        let closed = RentalEvent::new(
            events[index].id().clone(),
            events[index].device_id().clone(),
            events[index].renter_id().clone(),
            events[index].created_at().clone(),
            Some(returned_at.clone()),
        );
        events[index] = closed;
        Ok(())
    }
}

impl DependOnDeviceQuery<MockConnection> for MockDatabase {
    type DeviceQuery = MockDeviceRepository;
    fn device_query(&self) -> &Self::DeviceQuery {
        &MockDeviceRepository
    }
}

impl DependOnUserQuery<MockConnection> for MockDatabase {
    type UserQuery = MockUserRepository;
    fn user_query(&self) -> &Self::UserQuery {
        &MockUserRepository
    }
}

impl DependOnRentalEventQuery<MockConnection> for MockDatabase {
    type RentalEventQuery = MockRentalEventRepository;
    fn rental_event_query(&self) -> &Self::RentalEventQuery {
        &MockRentalEventRepository
    }
}

impl DependOnRentalEventModifier<MockConnection> for MockDatabase {
    type RentalEventModifier = MockRentalEventRepository;
    fn rental_event_modifier(&self) -> &Self::RentalEventModifier {
        &MockRentalEventRepository
    }
}
