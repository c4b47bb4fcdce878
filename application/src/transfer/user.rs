use kernel::prelude::entity::{DestructUser, User};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserDto {
    pub id: i32,
    pub username: String,
    pub display_name: String,
    pub email: String,
}

impl From<User> for UserDto {
    fn from(value: User) -> Self {
        let DestructUser {
            id,
            name,
            display_name,
            email,
        } = value.into_destruct();
        Self {
            id: id.into(),
            username: name.into(),
            display_name: display_name.into(),
            email: email.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmployeeDto {
    pub id: i32,
    pub display_name: String,
}

impl From<User> for EmployeeDto {
    fn from(value: User) -> Self {
        let DestructUser {
            id, display_name, ..
        } = value.into_destruct();
        Self {
            id: id.into(),
            display_name: display_name.into(),
        }
    }
}

/// The verified acting user of a request, as asserted by the
/// authentication collaborator and resolved against the user directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalDto {
    pub id: i32,
    pub username: String,
    pub display_name: String,
    pub email: String,
}

impl From<User> for PrincipalDto {
    fn from(value: User) -> Self {
        let DestructUser {
            id,
            name,
            display_name,
            email,
        } = value.into_destruct();
        Self {
            id: id.into(),
            username: name.into(),
            display_name: display_name.into(),
            email: email.into(),
        }
    }
}

pub struct GetUserDto {
    pub id: i32,
}

pub struct GetPrincipalDto {
    pub username: String,
}
