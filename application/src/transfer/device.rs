use kernel::prelude::entity::{DestructDevice, Device, User};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceRentalDto {
    pub id: i32,
    pub name: String,
    pub display_name: String,
}

impl DeviceRentalDto {
    pub fn from_parts(device: Device, holder: Option<&User>) -> Self {
        let DestructDevice { id, name, .. } = device.into_destruct();
        Self {
            id: id.into(),
            name: name.into(),
            display_name: holder
                .map(|user| user.display_name().as_ref().clone())
                .unwrap_or_default(),
        }
    }
}

pub struct GetDeviceListDto {
    pub os: Option<String>,
}

pub struct RentDeviceDto {
    pub device_id: i32,
    pub requester_id: i32,
}

pub struct ReturnDeviceDto {
    pub device_id: i32,
    pub requester_id: i32,
}
