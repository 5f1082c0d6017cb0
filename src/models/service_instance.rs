use std::collections::BTreeMap;
use serde::{Deserialize, Serialize};
use url::Url;

/// One live network location of a logical service, as reported by a registry.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ServiceInstance {
    pub service_id: String,
    pub uri: Url,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

impl ServiceInstance {
    pub fn new(service_id: impl Into<String>, uri: Url) -> Self {
        Self {
            service_id: service_id.into(),
            uri,
            metadata: BTreeMap::new(),
        }
    }
}
