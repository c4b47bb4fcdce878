use crate::entity::{User, UserId, UserName};
use crate::KernelError;

#[async_trait::async_trait]
pub trait UserQuery<Connection: 'static + Send>: Sync + Send + 'static {
    async fn find_all(&self, con: &mut Connection)
        -> error_stack::Result<Vec<User>, KernelError>;

    async fn find_by_id(
        &self,
        con: &mut Connection,
        id: &UserId,
    ) -> error_stack::Result<Option<User>, KernelError>;

    async fn find_by_name(
        &self,
        con: &mut Connection,
        name: &UserName,
    ) -> error_stack::Result<Option<User>, KernelError>;
}

pub trait DependOnUserQuery<Connection: 'static + Send>: Sync + Send + 'static {
    type UserQuery: UserQuery<Connection>;
    fn user_query(&self) -> &Self::UserQuery;
}
