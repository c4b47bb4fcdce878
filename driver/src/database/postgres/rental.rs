use error_stack::Report;
use sqlx::pool::PoolConnection;
use sqlx::{PgConnection, Postgres};
use time::OffsetDateTime;

use kernel::interface::query::RentalEventQuery;
use kernel::interface::update::RentalEventModifier;
use kernel::prelude::entity::{
    CreatedAt, DeviceId, RentalEvent, RentalEventId, ReturnedAt, UserId,
};
use kernel::KernelError;

use crate::error::ConvertError;

pub struct PostgresRentalEventRepository;

#[async_trait::async_trait]
impl RentalEventQuery<PoolConnection<Postgres>> for PostgresRentalEventRepository {
    async fn find_by_id(
        &self,
        con: &mut PoolConnection<Postgres>,
        id: &RentalEventId,
    ) -> error_stack::Result<Option<RentalEvent>, KernelError> {
        PgRentalEventInternal::find_by_id(con, id).await
    }

    async fn find_latest_by_device_id(
        &self,
        con: &mut PoolConnection<Postgres>,
        device_id: &DeviceId,
    ) -> error_stack::Result<Option<RentalEvent>, KernelError> {
        PgRentalEventInternal::find_latest_by_device_id(con, device_id).await
    }
}

#[async_trait::async_trait]
impl RentalEventModifier<PoolConnection<Postgres>> for PostgresRentalEventRepository {
    async fn open(
        &self,
        con: &mut PoolConnection<Postgres>,
        device_id: &DeviceId,
        renter_id: &UserId,
        created_at: &CreatedAt,
    ) -> error_stack::Result<RentalEventId, KernelError> {
        PgRentalEventInternal::open(con, device_id, renter_id, created_at).await
    }

    async fn close(
        &self,
        con: &mut PoolConnection<Postgres>,
        id: &RentalEventId,
        returned_at: &ReturnedAt,
    ) -> error_stack::Result<(), KernelError> {
        PgRentalEventInternal::close(con, id, returned_at).await
    }
}

#[derive(sqlx::FromRow)]
struct RentalEventRow {
    id: i64,
    device_id: i32,
    renter_id: i32,
    created_at: OffsetDateTime,
    returned_at: Option<OffsetDateTime>,
}

impl From<RentalEventRow> for RentalEvent {
    fn from(value: RentalEventRow) -> Self {
        RentalEvent::new(
            RentalEventId::new(value.id),
            DeviceId::new(value.device_id),
            UserId::new(value.renter_id),
            CreatedAt::new(value.created_at),
            value.returned_at.map(ReturnedAt::new),
        )
    }
}

pub(in crate::database) struct PgRentalEventInternal;

impl PgRentalEventInternal {
    async fn find_by_id(
        con: &mut PgConnection,
        id: &RentalEventId,
    ) -> error_stack::Result<Option<RentalEvent>, KernelError> {
        let row = sqlx::query_as::<_, RentalEventRow>(
            // language=postgresql
            r#"
            SELECT id, device_id, renter_id, created_at, returned_at
            FROM device_rentals
            WHERE id = $1
            "#,
        )
        .bind(id.as_ref())
        .fetch_optional(con)
        .await
        .convert_error()?;
        Ok(row.map(RentalEvent::from))
    }

    async fn find_latest_by_device_id(
        con: &mut PgConnection,
        device_id: &DeviceId,
    ) -> error_stack::Result<Option<RentalEvent>, KernelError> {
        let row = sqlx::query_as::<_, RentalEventRow>(
            // language=postgresql
            r#"
            SELECT id, device_id, renter_id, created_at, returned_at
            FROM device_rentals
            WHERE device_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT 1
            "#,
        )
        .bind(device_id.as_ref())
        .fetch_optional(con)
        .await
        .convert_error()?;
        Ok(row.map(RentalEvent::from))
    }

    // The partial unique index on open rentals turns a second open insert
    // for the same device into a Concurrency error.
    async fn open(
        con: &mut PgConnection,
        device_id: &DeviceId,
        renter_id: &UserId,
        created_at: &CreatedAt,
    ) -> error_stack::Result<RentalEventId, KernelError> {
        let id = sqlx::query_scalar::<_, i64>(
            // language=postgresql
            r#"
            INSERT INTO device_rentals (device_id, renter_id, created_at)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(device_id.as_ref())
        .bind(renter_id.as_ref())
        .bind(created_at.as_ref())
        .fetch_one(con)
        .await
        .convert_error()?;
        Ok(RentalEventId::new(id))
    }

    // Compare-and-set: the stamp only lands while the event is still open.
    async fn close(
        con: &mut PgConnection,
        id: &RentalEventId,
        returned_at: &ReturnedAt,
    ) -> error_stack::Result<(), KernelError> {
        let result = sqlx::query(
            // language=postgresql
            r#"
            UPDATE device_rentals
            SET returned_at = $2
            WHERE id = $1 AND returned_at IS NULL
            "#,
        )
        .bind(id.as_ref())
        .bind(returned_at.as_ref())
        .execute(&mut *con)
        .await
        .convert_error()?;
        if result.rows_affected() == 0 {
            let exists = sqlx::query_scalar::<_, i64>(
                // language=postgresql
                r#"
                SELECT id
                FROM device_rentals
                WHERE id = $1
                "#,
            )
            .bind(id.as_ref())
            .fetch_optional(con)
            .await
            .convert_error()?;
            let context = if exists.is_some() {
                KernelError::Concurrency
            } else {
                KernelError::NotFound
            };
            return Err(Report::new(context));
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use kernel::interface::database::QueryDatabaseConnection;
    use kernel::interface::query::RentalEventQuery;
    use kernel::interface::update::RentalEventModifier;
    use kernel::prelude::entity::{CreatedAt, DeviceId, ReturnedAt, UserId};
    use kernel::KernelError;
    use time::OffsetDateTime;

    use crate::database::postgres::{PostgresDatabase, PostgresRentalEventRepository};

    #[test_with::env(POSTGRES_TEST)]
    #[tokio::test]
    async fn test() {
        let db = PostgresDatabase::new().await.unwrap();
        let mut con = db.transact().await.unwrap();

        let device_id: i32 = sqlx::query_scalar(
            "INSERT INTO devices (name, os) VALUES ('iPhone12', 'IOS') RETURNING id",
        )
        .fetch_one(&mut *con)
        .await
        .unwrap();
        let renter_id: i32 = sqlx::query_scalar(
            "INSERT INTO users (username, display_name, email) \
             VALUES ($1, 'Aydar Ibragimov', 'aydar@example.com') RETURNING id",
        )
        .bind(format!("aydar-{device_id}"))
        .fetch_one(&mut *con)
        .await
        .unwrap();

        let device_id = DeviceId::new(device_id);
        let renter_id = UserId::new(renter_id);

        assert!(PostgresRentalEventRepository
            .find_latest_by_device_id(&mut con, &device_id)
            .await
            .unwrap()
            .is_none());

        let event_id = PostgresRentalEventRepository
            .open(
                &mut con,
                &device_id,
                &renter_id,
                &CreatedAt::new(OffsetDateTime::now_utc()),
            )
            .await
            .unwrap();

        let latest = PostgresRentalEventRepository
            .find_latest_by_device_id(&mut con, &device_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(latest.id(), &event_id);
        assert!(latest.is_open());

        let duplicate = PostgresRentalEventRepository
            .open(
                &mut con,
                &device_id,
                &renter_id,
                &CreatedAt::new(OffsetDateTime::now_utc()),
            )
            .await
            .unwrap_err();
        assert!(matches!(
            duplicate.current_context(),
            KernelError::Concurrency
        ));

        PostgresRentalEventRepository
            .close(
                &mut con,
                &event_id,
                &ReturnedAt::new(OffsetDateTime::now_utc()),
            )
            .await
            .unwrap();

        let double_close = PostgresRentalEventRepository
            .close(
                &mut con,
                &event_id,
                &ReturnedAt::new(OffsetDateTime::now_utc()),
            )
            .await
            .unwrap_err();
        assert!(matches!(
            double_close.current_context(),
            KernelError::Concurrency
        ));

        let latest = PostgresRentalEventRepository
            .find_latest_by_device_id(&mut con, &device_id)
            .await
            .unwrap()
            .unwrap();
        assert!(!latest.is_open());

        let missing = PostgresRentalEventRepository
            .close(
                &mut con,
                &kernel::prelude::entity::RentalEventId::new(i64::MAX),
                &ReturnedAt::new(OffsetDateTime::now_utc()),
            )
            .await
            .unwrap_err();
        assert!(matches!(missing.current_context(), KernelError::NotFound));
    }
}
