use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity reported by `/info`. Built once at startup so the instance id
/// is stable for the lifetime of the process.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub name: String,
    pub version: String,
    pub environment: String,
    pub instance_id: Uuid,
}

impl ServiceInfo {
    pub fn new(name: &str, environment: &str) -> Self {
        Self {
            name: name.to_owned(),
            version: env!("CARGO_PKG_VERSION").to_owned(),
            environment: environment.to_owned(),
            instance_id: Uuid::new_v4(),
        }
    }
}
