use error_stack::{Report, ResultExt};
use sqlx::pool::PoolConnection;
use sqlx::{Error, Pool, Postgres};

use kernel::interface::database::QueryDatabaseConnection;
use kernel::interface::query::{DependOnDeviceQuery, DependOnRentalEventQuery, DependOnUserQuery};
use kernel::interface::update::DependOnRentalEventModifier;
use kernel::KernelError;

use crate::env;
use crate::error::{ConvertError, DriverError};

pub use self::{device::*, rental::*, user::*};

mod device;
mod rental;
mod user;

static POSTGRES_URL: &str = "POSTGRES_URL";

/// `POSTGRES_URL` wins; otherwise the url is assembled from the `PG_*`
/// variables.
fn database_url() -> Result<String, DriverError> {
    if let Ok(url) = env(POSTGRES_URL) {
        return Ok(url);
    }
    let user = env("PG_USER")?;
    let password = env("PG_PASSWORD")?;
    let host = env("PG_HOST")?;
    let port = env("PG_PORT")?;
    let database = env("PG_DATABASE")?;
    Ok(format!(
        "postgres://{user}:{password}@{host}:{port}/{database}"
    ))
}

pub struct PostgresDatabase {
    pool: Pool<Postgres>,
}

impl PostgresDatabase {
    pub async fn new() -> error_stack::Result<Self, KernelError> {
        let url = database_url().change_context(KernelError::Internal)?;
        let pool = Pool::connect(&url).await.convert_error()?;
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .change_context(KernelError::Internal)?;
        tracing::debug!("connected to postgres, schema up to date");
        Ok(Self { pool })
    }
}

#[async_trait::async_trait]
impl QueryDatabaseConnection<PoolConnection<Postgres>> for PostgresDatabase {
    async fn transact(&self) -> error_stack::Result<PoolConnection<Postgres>, KernelError> {
        let con = self.pool.acquire().await.convert_error()?;
        Ok(con)
    }
}

impl DependOnDeviceQuery<PoolConnection<Postgres>> for PostgresDatabase {
    type DeviceQuery = PostgresDeviceRepository;
    fn device_query(&self) -> &Self::DeviceQuery {
        &PostgresDeviceRepository
    }
}

impl DependOnUserQuery<PoolConnection<Postgres>> for PostgresDatabase {
    type UserQuery = PostgresUserRepository;
    fn user_query(&self) -> &Self::UserQuery {
        &PostgresUserRepository
    }
}

impl DependOnRentalEventQuery<PoolConnection<Postgres>> for PostgresDatabase {
    type RentalEventQuery = PostgresRentalEventRepository;
    fn rental_event_query(&self) -> &Self::RentalEventQuery {
        &PostgresRentalEventRepository
    }
}

impl DependOnRentalEventModifier<PoolConnection<Postgres>> for PostgresDatabase {
    type RentalEventModifier = PostgresRentalEventRepository;
    fn rental_event_modifier(&self) -> &Self::RentalEventModifier {
        &PostgresRentalEventRepository
    }
}

impl<T> ConvertError for Result<T, Error> {
    type Ok = T;
    fn convert_error(self) -> error_stack::Result<T, KernelError> {
        self.map_err(|error| {
            let context = match &error {
                Error::PoolTimedOut => KernelError::Timeout,
                Error::RowNotFound => KernelError::NotFound,
                Error::Database(db)
                    if matches!(db.kind(), sqlx::error::ErrorKind::UniqueViolation) =>
                {
                    KernelError::Concurrency
                }
                _ => KernelError::Internal,
            };
            Report::from(error).change_context(context)
        })
    }
}
