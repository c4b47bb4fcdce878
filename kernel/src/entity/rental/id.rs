use serde::{Deserialize, Serialize};
use vodca::{AsRefln, Fromln};

#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize, Fromln, AsRefln)]
pub struct RentalEventId(i64);

impl RentalEventId {
    pub fn new(id: impl Into<i64>) -> Self {
        Self(id.into())
    }
}
