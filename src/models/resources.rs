use std::collections::BTreeMap;
use serde::Deserialize;
use serde_json::Value;

/// Client-side view of a hypermedia collection: the embedded items plus whatever links came with them.
#[derive(Deserialize, Clone, Debug)]
#[serde(bound(deserialize = "T: serde::de::DeserializeOwned"))]
pub struct Resources<T> {
    #[serde(rename = "_embedded", default)]
    embedded: BTreeMap<String, Vec<T>>,
    #[serde(rename = "_links", default)]
    pub links: BTreeMap<String, Value>,
}

impl<T> Resources<T> {
    pub fn content(self) -> Vec<T> {
        self.embedded
            .into_values()
            .flatten()
            .collect()
    }
}
