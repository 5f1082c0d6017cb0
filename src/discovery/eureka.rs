//! Eureka REST (v2) registry integration: registration and heartbeats for the
//! service, instance lookup for the client.

use std::collections::BTreeMap;
use std::time::Duration;
use anyhow::{anyhow, Context};
use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, skip_serializing_none, DisplayFromStr, PickFirst};
use tracing::{info, warn};
use url::Url;
use crate::discovery::DiscoveryClient;
use crate::helpers::uri::resource_uri;
use crate::models::service_instance::ServiceInstance;

pub const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);
const STATUS_UP: &str = "UP";
const DEFAULT_DATA_CENTER_CLASS: &str = "com.netflix.appinfo.InstanceInfo$DefaultDataCenterInfo";

#[serde_as]
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct PortInfo {
    #[serde(rename = "$")]
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub port: u16,
    #[serde(rename = "@enabled", default)]
    pub enabled: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct DataCenterInfo {
    #[serde(rename = "@class")]
    pub class: String,
    pub name: String,
}

#[skip_serializing_none]
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InstanceInfo {
    pub instance_id: Option<String>,
    pub host_name: String,
    pub app: String,
    #[serde(default)]
    pub ip_addr: String,
    pub vip_address: Option<String>,
    pub status: String,
    pub port: PortInfo,
    pub secure_port: Option<PortInfo>,
    pub home_page_url: Option<String>,
    pub status_page_url: Option<String>,
    pub health_check_url: Option<String>,
    pub data_center_info: Option<DataCenterInfo>,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

impl InstanceInfo {
    /// Describes this process for registration under `app`.
    pub fn for_registration(
        app: &str,
        host_name: &str,
        port: u16,
        metadata: BTreeMap<String, String>,
    ) -> Self {
        let home = format!("http://{}:{}/", host_name, port);
        Self {
            instance_id: Some(format!("{}:{}:{}", host_name, app.to_lowercase(), port)),
            host_name: host_name.to_string(),
            app: app.to_uppercase(),
            ip_addr: host_name.to_string(),
            vip_address: Some(app.to_lowercase()),
            status: STATUS_UP.to_string(),
            port: PortInfo {
                port,
                enabled: "true".to_string(),
            },
            secure_port: Some(PortInfo {
                port: 443,
                enabled: "false".to_string(),
            }),
            status_page_url: Some(format!("{}actuator/info", home)),
            health_check_url: Some(format!("{}actuator/health", home)),
            home_page_url: Some(home),
            data_center_info: Some(DataCenterInfo {
                class: DEFAULT_DATA_CENTER_CLASS.to_string(),
                name: "MyOwn".to_string(),
            }),
            metadata,
        }
    }

    pub fn id(&self) -> String {
        self.instance_id
            .clone()
            .unwrap_or_else(|| self.host_name.clone())
    }

    pub fn is_up(&self) -> bool {
        self.status.eq_ignore_ascii_case(STATUS_UP)
    }

    pub fn to_service_instance(&self) -> anyhow::Result<ServiceInstance> {
        let uri = Url::parse(&format!("http://{}:{}", self.host_name, self.port.port))
            .with_context(|| format!("Registry returned an invalid host for {}", self.id()))?;
        Ok(ServiceInstance {
            service_id: self.app.to_lowercase(),
            uri,
            metadata: self.metadata.clone(),
        })
    }
}

/// Eureka renders single-element lists as a bare object.
#[derive(Deserialize, Clone, Debug)]
#[serde(untagged)]
enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> Default for OneOrMany<T> {
    fn default() -> Self {
        OneOrMany::Many(Vec::new())
    }
}

impl<T> OneOrMany<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::One(item) => vec![item],
            OneOrMany::Many(items) => items,
        }
    }
}

#[derive(Deserialize, Debug)]
struct Application {
    name: String,
    #[serde(default)]
    instance: OneOrMany<InstanceInfo>,
}

#[derive(Deserialize, Debug)]
struct ApplicationEnvelope {
    application: Application,
}

#[derive(Deserialize, Debug)]
struct Applications {
    #[serde(default)]
    application: OneOrMany<Application>,
}

#[derive(Deserialize, Debug)]
struct ApplicationsEnvelope {
    applications: Applications,
}

#[derive(Serialize, Debug)]
struct RegistrationEnvelope<'a> {
    instance: &'a InstanceInfo,
}

#[derive(Clone, Debug)]
pub struct EurekaClient {
    http: reqwest::Client,
    base: Url,
}

impl EurekaClient {
    /// `base` is the Eureka REST root, e.g. `http://localhost:8761/eureka/`.
    pub fn new(http: reqwest::Client, base: Url) -> Self {
        Self { http, base }
    }

    fn apps_uri(&self, segments: &[&str]) -> Url {
        let mut path = vec!["apps"];
        path.extend_from_slice(segments);
        resource_uri(&self.base, &path)
    }

    pub async fn register(&self, instance: &InstanceInfo) -> anyhow::Result<()> {
        let uri = self.apps_uri(&[instance.app.as_str()]);
        let response = self
            .http
            .post(uri.as_str())
            .json(&RegistrationEnvelope { instance })
            .send()
            .await
            .with_context(|| format!("POST {}", uri))?;

        if !response.status().is_success() {
            return Err(anyhow!("Eureka rejected registration of {} with {}", instance.id(), response.status()));
        }
        info!("Registered {} with Eureka at {}", instance.id(), self.base);
        Ok(())
    }

    /// Returns `false` when the registry no longer knows the instance.
    pub async fn renew(&self, instance: &InstanceInfo) -> anyhow::Result<bool> {
        let id = instance.id();
        let uri = self.apps_uri(&[instance.app.as_str(), id.as_str()]);
        let response = self
            .http
            .put(uri.as_str())
            .send()
            .await
            .with_context(|| format!("PUT {}", uri))?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(false),
            status if status.is_success() => Ok(true),
            status => Err(anyhow!("Eureka heartbeat for {} failed with {}", id, status)),
        }
    }

    pub async fn deregister(&self, instance: &InstanceInfo) -> anyhow::Result<()> {
        let id = instance.id();
        let uri = self.apps_uri(&[instance.app.as_str(), id.as_str()]);
        self.http
            .delete(uri.as_str())
            .send()
            .await
            .with_context(|| format!("DELETE {}", uri))?
            .error_for_status()
            .context("Eureka rejected deregistration")?;
        info!("Deregistered {} from Eureka", id);
        Ok(())
    }

    /// Keeps `instance` registered until the task is dropped.
    pub async fn heartbeat(&self, instance: &InstanceInfo, period: Duration) {
        let mut interval = tokio::time::interval(period);
        interval.tick().await;
        loop {
            interval.tick().await;
            match self.renew(instance).await {
                Ok(true) => {}
                Ok(false) => {
                    warn!("Eureka lost {}, registering again", instance.id());
                    if let Err(e) = self.register(instance).await {
                        warn!("Failed to re-register with Eureka due to: {:#}", e);
                    }
                }
                Err(e) => warn!("Failed to renew Eureka lease due to: {:#}", e),
            }
        }
    }
}

#[async_trait]
impl DiscoveryClient for EurekaClient {
    fn description(&self) -> &'static str {
        "Eureka discovery client"
    }

    async fn get_instances(&self, service_id: &str) -> anyhow::Result<Vec<ServiceInstance>> {
        let uri = self.apps_uri(&[service_id.to_uppercase().as_str()]);
        let response = self
            .http
            .get(uri.as_str())
            .header(ACCEPT, "application/json")
            .send()
            .await
            .with_context(|| format!("GET {}", uri))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }
        let envelope: ApplicationEnvelope = response
            .error_for_status()
            .context("Eureka lookup failed")?
            .json()
            .await
            .context("Eureka returned an unreadable application")?;

        envelope
            .application
            .instance
            .into_vec()
            .into_iter()
            .filter(InstanceInfo::is_up)
            .map(|instance| instance.to_service_instance())
            .collect()
    }

    async fn get_services(&self) -> anyhow::Result<Vec<String>> {
        let uri = self.apps_uri(&[]);
        let envelope: ApplicationsEnvelope = self
            .http
            .get(uri.as_str())
            .header(ACCEPT, "application/json")
            .send()
            .await
            .with_context(|| format!("GET {}", uri))?
            .error_for_status()
            .context("Eureka lookup failed")?
            .json()
            .await
            .context("Eureka returned unreadable applications")?;

        Ok(envelope
            .applications
            .application
            .into_vec()
            .into_iter()
            .map(|application| application.name.to_lowercase())
            .collect())
    }
}
