use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use reqwest::header::ACCEPT;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;
use crate::discovery::DiscoveryClient;
use crate::models::service_instance::ServiceInstance;

#[derive(Debug, Error)]
pub enum LoadBalancerError {
    #[error("'{0}' is not a load-balanced uri")]
    InvalidUri(String),
    #[error("no live instances of '{0}'")]
    NoInstances(String),
    #[error(transparent)]
    Discovery(#[from] anyhow::Error),
    #[error("request to {uri} failed")]
    Transport {
        uri: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{uri} responded with {status}")]
    Status {
        uri: String,
        status: reqwest::StatusCode,
    },
}

/// HTTP client whose request host is a logical service name. Instances are
/// picked round-robin; a connection failure moves on to the next instance,
/// each instance being tried at most once per request.
pub struct LoadBalancedClient {
    http: reqwest::Client,
    discovery: Arc<dyn DiscoveryClient>,
    cursor: AtomicUsize,
}

impl LoadBalancedClient {
    pub fn new(http: reqwest::Client, discovery: Arc<dyn DiscoveryClient>) -> Self {
        Self {
            http,
            discovery,
            cursor: AtomicUsize::new(0),
        }
    }

    /// Moves the path and query of `original` onto the instance location.
    pub fn reconstruct_uri(instance: &ServiceInstance, original: &Url) -> Url {
        let mut uri = instance.uri.clone();
        let path = format!("{}{}", instance.uri.path().trim_end_matches('/'), original.path());
        uri.set_path(&path);
        uri.set_query(original.query());
        uri
    }

    /// Instances in the order this request should try them.
    fn rotation(&self, mut instances: Vec<ServiceInstance>) -> Vec<ServiceInstance> {
        if !instances.is_empty() {
            let start = self.cursor.fetch_add(1, Ordering::Relaxed) % instances.len();
            instances.rotate_left(start);
        }
        instances
    }

    pub async fn get_json<T: DeserializeOwned>(&self, logical_uri: &str) -> Result<T, LoadBalancerError> {
        let original = Url::parse(logical_uri)
            .map_err(|_| LoadBalancerError::InvalidUri(logical_uri.to_string()))?;
        let service_id = original
            .host_str()
            .ok_or_else(|| LoadBalancerError::InvalidUri(logical_uri.to_string()))?
            .to_string();

        let instances = self.discovery.get_instances(&service_id).await?;
        let mut last_error = None;
        for instance in self.rotation(instances) {
            let uri = Self::reconstruct_uri(&instance, &original);
            debug!("Resolved {} to {}", logical_uri, uri);

            let response = match self
                .http
                .get(uri.as_str())
                .header(ACCEPT, "application/hal+json, application/json")
                .send()
                .await
            {
                Ok(response) => response,
                Err(e) if e.is_connect() => {
                    warn!("Instance {} of {} is unreachable, trying the next one", instance.uri, service_id);
                    last_error = Some(LoadBalancerError::Transport { uri: uri.to_string(), source: e });
                    continue;
                }
                Err(e) => return Err(LoadBalancerError::Transport { uri: uri.to_string(), source: e }),
            };

            if !response.status().is_success() {
                return Err(LoadBalancerError::Status {
                    uri: uri.to_string(),
                    status: response.status(),
                });
            }
            return response
                .json::<T>()
                .await
                .map_err(|e| LoadBalancerError::Transport { uri: uri.to_string(), source: e });
        }

        Err(last_error.unwrap_or(LoadBalancerError::NoInstances(service_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::static_discovery::StaticDiscoveryClient;

    fn instance(uri: &str) -> ServiceInstance {
        ServiceInstance::new("reservationservice", Url::parse(uri).unwrap())
    }

    #[test]
    fn reconstruct_keeps_path_and_query() {
        let original = Url::parse("http://reservationservice/reservations?page=1").unwrap();
        let uri = LoadBalancedClient::reconstruct_uri(&instance("http://10.0.0.5:8000"), &original);
        assert_eq!(uri.as_str(), "http://10.0.0.5:8000/reservations?page=1");

        let prefixed = LoadBalancedClient::reconstruct_uri(&instance("http://10.0.0.5:8000/api/"), &original);
        assert_eq!(prefixed.as_str(), "http://10.0.0.5:8000/api/reservations?page=1");
    }

    #[test]
    fn rotation_is_round_robin() {
        let client = LoadBalancedClient::new(
            reqwest::Client::new(),
            Arc::new(StaticDiscoveryClient::default()),
        );
        let instances = vec![instance("http://a"), instance("http://b"), instance("http://c")];

        let firsts: Vec<String> = (0..4)
            .map(|_| client.rotation(instances.clone())[0].uri.host_str().unwrap().to_string())
            .collect();
        assert_eq!(firsts, vec!["a", "b", "c", "a"]);
    }

    #[tokio::test]
    async fn unknown_service_has_no_instances() {
        let client = LoadBalancedClient::new(
            reqwest::Client::new(),
            Arc::new(StaticDiscoveryClient::default()),
        );
        let err = client
            .get_json::<serde_json::Value>("http://reservationservice/reservations")
            .await
            .unwrap_err();
        assert!(matches!(err, LoadBalancerError::NoInstances(name) if name == "reservationservice"));
    }
}
