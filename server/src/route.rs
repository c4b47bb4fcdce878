mod device;
mod user;

pub use self::{device::*, user::*};
