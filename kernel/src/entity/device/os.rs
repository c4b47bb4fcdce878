use serde::{Deserialize, Serialize};
use vodca::{AsRefln, Fromln};

/// Category tag for a device, e.g. "IOS" or "ANDROID".
#[derive(Debug, Clone, PartialEq, Eq, Hash, Fromln, AsRefln, Serialize, Deserialize)]
pub struct OperatingSystem(String);

impl OperatingSystem {
    pub fn new(os: impl Into<String>) -> Self {
        Self(os.into())
    }
}
