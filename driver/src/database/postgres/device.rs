use sqlx::pool::PoolConnection;
use sqlx::{PgConnection, Postgres};

use kernel::interface::query::DeviceQuery;
use kernel::prelude::entity::{Device, DeviceId, DeviceName, OperatingSystem};
use kernel::KernelError;

use crate::error::ConvertError;

pub struct PostgresDeviceRepository;

#[async_trait::async_trait]
impl DeviceQuery<PoolConnection<Postgres>> for PostgresDeviceRepository {
    async fn find_all(
        &self,
        con: &mut PoolConnection<Postgres>,
    ) -> error_stack::Result<Vec<Device>, KernelError> {
        PgDeviceInternal::find_all(con).await
    }

    async fn find_by_os(
        &self,
        con: &mut PoolConnection<Postgres>,
        os: &OperatingSystem,
    ) -> error_stack::Result<Vec<Device>, KernelError> {
        PgDeviceInternal::find_by_os(con, os).await
    }

    async fn find_by_id(
        &self,
        con: &mut PoolConnection<Postgres>,
        id: &DeviceId,
    ) -> error_stack::Result<Option<Device>, KernelError> {
        PgDeviceInternal::find_by_id(con, id).await
    }
}

#[derive(sqlx::FromRow)]
struct DeviceRow {
    id: i32,
    name: String,
    os: String,
}

impl From<DeviceRow> for Device {
    fn from(value: DeviceRow) -> Self {
        Device::new(
            DeviceId::new(value.id),
            DeviceName::new(value.name),
            OperatingSystem::new(value.os),
        )
    }
}

pub(in crate::database) struct PgDeviceInternal;

impl PgDeviceInternal {
    async fn find_all(con: &mut PgConnection) -> error_stack::Result<Vec<Device>, KernelError> {
        let rows = sqlx::query_as::<_, DeviceRow>(
            // language=postgresql
            r#"
            SELECT id, name, os
            FROM devices
            "#,
        )
        .fetch_all(con)
        .await
        .convert_error()?;
        Ok(rows.into_iter().map(Device::from).collect())
    }

    async fn find_by_os(
        con: &mut PgConnection,
        os: &OperatingSystem,
    ) -> error_stack::Result<Vec<Device>, KernelError> {
        let rows = sqlx::query_as::<_, DeviceRow>(
            // language=postgresql
            r#"
            SELECT id, name, os
            FROM devices
            WHERE os = $1
            "#,
        )
        .bind(os.as_ref())
        .fetch_all(con)
        .await
        .convert_error()?;
        Ok(rows.into_iter().map(Device::from).collect())
    }

    async fn find_by_id(
        con: &mut PgConnection,
        id: &DeviceId,
    ) -> error_stack::Result<Option<Device>, KernelError> {
        let row = sqlx::query_as::<_, DeviceRow>(
            // language=postgresql
            r#"
            SELECT id, name, os
            FROM devices
            WHERE id = $1
            "#,
        )
        .bind(id.as_ref())
        .fetch_optional(con)
        .await
        .convert_error()?;
        Ok(row.map(Device::from))
    }
}
