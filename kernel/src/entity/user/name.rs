use serde::{Deserialize, Serialize};
use vodca::{AsRefln, Fromln};

/// Login name, unique within the user directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Fromln, AsRefln, Serialize, Deserialize)]
pub struct UserName(String);

impl UserName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}
