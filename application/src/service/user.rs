use error_stack::{Report, ResultExt};

use kernel::interface::database::{DependOnDatabaseConnection, QueryDatabaseConnection};
use kernel::interface::query::{DependOnUserQuery, UserQuery};
use kernel::prelude::entity::{UserId, UserName};

use crate::error::AppError;
use crate::transfer::{EmployeeDto, GetPrincipalDto, GetUserDto, PrincipalDto, UserDto};

#[async_trait::async_trait]
pub trait GetUserService<Connection: 'static + Send>:
    'static + Sync + Send + DependOnDatabaseConnection<Connection> + DependOnUserQuery<Connection>
{
    async fn get_user(&self, dto: GetUserDto) -> error_stack::Result<UserDto, AppError> {
        let mut connection = self
            .database_connection()
            .transact()
            .await
            .change_context(AppError::Internal)?;

        let user = self
            .user_query()
            .find_by_id(&mut connection, &UserId::new(dto.id))
            .await
            .change_context(AppError::Internal)?
            .ok_or_else(|| Report::new(AppError::UserNotFound))?;
        Ok(UserDto::from(user))
    }

    async fn get_user_list(&self) -> error_stack::Result<Vec<EmployeeDto>, AppError> {
        let mut connection = self
            .database_connection()
            .transact()
            .await
            .change_context(AppError::Internal)?;

        let users = self
            .user_query()
            .find_all(&mut connection)
            .await
            .change_context(AppError::Internal)?;
        Ok(users.into_iter().map(EmployeeDto::from).collect())
    }
}

impl<Connection: 'static + Send, T> GetUserService<Connection> for T where
    T: DependOnDatabaseConnection<Connection> + DependOnUserQuery<Connection>
{
}

#[async_trait::async_trait]
pub trait PrincipalService<Connection: 'static + Send>:
    'static + Sync + Send + DependOnDatabaseConnection<Connection> + DependOnUserQuery<Connection>
{
    /// Maps the subject asserted by the authentication collaborator to a
    /// directory user. The caller treats a missing user as unauthorized.
    async fn resolve_principal(
        &self,
        dto: GetPrincipalDto,
    ) -> error_stack::Result<PrincipalDto, AppError> {
        let mut connection = self
            .database_connection()
            .transact()
            .await
            .change_context(AppError::Internal)?;

        let user = self
            .user_query()
            .find_by_name(&mut connection, &UserName::new(dto.username))
            .await
            .change_context(AppError::Internal)?
            .ok_or_else(|| Report::new(AppError::UserNotFound))?;
        Ok(PrincipalDto::from(user))
    }
}

impl<Connection: 'static + Send, T> PrincipalService<Connection> for T where
    T: DependOnDatabaseConnection<Connection> + DependOnUserQuery<Connection>
{
}

#[cfg(test)]
mod test {
    use crate::error::AppError;
    use crate::service::mock::MockDatabase;
    use crate::service::{GetUserService, PrincipalService};
    use crate::transfer::{GetPrincipalDto, GetUserDto};

    #[tokio::test]
    async fn get_user_returns_directory_entry() {
        let db = MockDatabase::with_catalogue();

        let user = db.get_user(GetUserDto { id: 7 }).await.unwrap();
        assert_eq!(user.username, "aydar");
        assert_eq!(user.display_name, "Aydar Ibragimov");
    }

    #[tokio::test]
    async fn get_unknown_user_is_not_found() {
        let db = MockDatabase::with_catalogue();

        let result = db.get_user(GetUserDto { id: 42 }).await.unwrap_err();
        assert!(matches!(result.current_context(), AppError::UserNotFound));
    }

    #[tokio::test]
    async fn user_list_contains_every_directory_entry() {
        let db = MockDatabase::with_catalogue();

        let list = db.get_user_list().await.unwrap();
        assert_eq!(list.len(), 2);
        assert!(list.iter().any(|user| user.display_name == "Maria Petrova"));
    }

    #[tokio::test]
    async fn principal_resolves_by_username() {
        let db = MockDatabase::with_catalogue();

        let principal = db
            .resolve_principal(GetPrincipalDto {
                username: "maria".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(principal.id, 9);

        let unknown = db
            .resolve_principal(GetPrincipalDto {
                username: "nobody".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(unknown.current_context(), AppError::UserNotFound));
    }
}
