mod id;
mod name;
mod os;

pub use self::{id::*, name::*, os::*};
use destructure::Destructure;
use serde::{Deserialize, Serialize};
use vodca::References;

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize, Destructure, References)]
pub struct Device {
    id: DeviceId,
    name: DeviceName,
    os: OperatingSystem,
}

impl Device {
    pub fn new(id: DeviceId, name: DeviceName, os: OperatingSystem) -> Self {
        Self { id, name, os }
    }
}
