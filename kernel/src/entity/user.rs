mod display_name;
mod email;
mod id;
mod name;

pub use self::{display_name::*, email::*, id::*, name::*};
use destructure::Destructure;
use serde::{Deserialize, Serialize};
use vodca::References;

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize, Destructure, References)]
pub struct User {
    id: UserId,
    name: UserName,
    display_name: DisplayName,
    email: EmailAddress,
}

impl User {
    pub fn new(id: UserId, name: UserName, display_name: DisplayName, email: EmailAddress) -> Self {
        Self {
            id,
            name,
            display_name,
            email,
        }
    }
}
