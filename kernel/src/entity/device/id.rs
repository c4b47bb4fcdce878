use serde::{Deserialize, Serialize};
use vodca::{AsRefln, Fromln};

#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize, Fromln, AsRefln)]
pub struct DeviceId(i32);

impl DeviceId {
    pub fn new(id: impl Into<i32>) -> Self {
        Self(id.into())
    }
}
