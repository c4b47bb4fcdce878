mod device;
mod rental;
mod user;

pub use self::{device::*, rental::*, user::*};
