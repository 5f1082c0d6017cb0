use std::collections::BTreeMap;
use anyhow::{anyhow, Context};
use async_trait::async_trait;
use url::Url;
use crate::discovery::DiscoveryClient;
use crate::models::service_instance::ServiceInstance;

/// Registry backed by a fixed list of instances.
#[derive(Clone, Debug, Default)]
pub struct StaticDiscoveryClient {
    instances: BTreeMap<String, Vec<ServiceInstance>>,
}

impl StaticDiscoveryClient {
    pub fn new(instances: impl IntoIterator<Item = ServiceInstance>) -> Self {
        let mut grouped: BTreeMap<String, Vec<ServiceInstance>> = BTreeMap::new();
        for instance in instances {
            grouped
                .entry(instance.service_id.to_lowercase())
                .or_default()
                .push(instance);
        }
        Self { instances: grouped }
    }

    /// Parses `name=uri` entries.
    pub fn from_entries(entries: &[String]) -> anyhow::Result<Self> {
        let instances = entries
            .iter()
            .filter(|entry| !entry.trim().is_empty())
            .map(|entry| parse_entry(entry))
            .collect::<anyhow::Result<Vec<ServiceInstance>>>()?;
        Ok(Self::new(instances))
    }
}

fn parse_entry(entry: &str) -> anyhow::Result<ServiceInstance> {
    let (name, uri) = entry
        .trim()
        .split_once('=')
        .ok_or_else(|| anyhow!("Static instance '{}' is not in name=uri form", entry))?;
    let uri = Url::parse(uri.trim())
        .with_context(|| format!("Static instance '{}' has an invalid uri", entry))?;
    Ok(ServiceInstance::new(name.trim(), uri))
}

#[async_trait]
impl DiscoveryClient for StaticDiscoveryClient {
    fn description(&self) -> &'static str {
        "Static discovery client"
    }

    async fn get_instances(&self, service_id: &str) -> anyhow::Result<Vec<ServiceInstance>> {
        Ok(self
            .instances
            .get(&service_id.to_lowercase())
            .cloned()
            .unwrap_or_default())
    }

    async fn get_services(&self) -> anyhow::Result<Vec<String>> {
        Ok(self.instances.keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn entries_group_by_service_ignoring_case() {
        let discovery = StaticDiscoveryClient::from_entries(&[
            "reservationservice=http://a:8000".to_string(),
            "ReservationService=http://b:8000".to_string(),
            "other=http://c:9000".to_string(),
        ])
        .unwrap();

        let instances = discovery.get_instances("RESERVATIONSERVICE").await.unwrap();
        let hosts: Vec<&str> = instances.iter().filter_map(|i| i.uri.host_str()).collect();
        assert_eq!(hosts, vec!["a", "b"]);
        assert_eq!(discovery.get_services().await.unwrap(), vec!["other", "reservationservice"]);
        assert!(discovery.get_instances("missing").await.unwrap().is_empty());
    }

    #[test]
    fn malformed_entries_are_rejected() {
        assert!(StaticDiscoveryClient::from_entries(&["no-separator".to_string()]).is_err());
        assert!(StaticDiscoveryClient::from_entries(&["svc=not a url".to_string()]).is_err());
    }
}
