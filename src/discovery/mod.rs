use async_trait::async_trait;
use crate::models::service_instance::ServiceInstance;

pub mod eureka;
pub mod load_balancer;
pub mod static_discovery;

/// Read side of a service registry.
#[async_trait]
pub trait DiscoveryClient: Send + Sync {
    fn description(&self) -> &'static str;

    /// Live instances registered under `service_id`; an unknown service yields an empty list.
    async fn get_instances(&self, service_id: &str) -> anyhow::Result<Vec<ServiceInstance>>;

    async fn get_services(&self) -> anyhow::Result<Vec<String>>;
}
