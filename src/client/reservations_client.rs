use std::sync::Arc;
use async_trait::async_trait;
use crate::discovery::load_balancer::{LoadBalancedClient, LoadBalancerError};
use crate::discovery::DiscoveryClient;
use crate::models::reservation::Reservation;
use crate::models::resources::Resources;

const LIST_RESERVATIONS_PATH: &str = "/reservations";

/// Typed view of the reservation service's collection endpoint.
#[async_trait]
pub trait ReservationsClient: Send + Sync {
    async fn list_reservations(&self) -> Result<Resources<Reservation>, LoadBalancerError>;
}

/// `ReservationsClient` bound to a logical service name; owns its own
/// discovery-backed load balancer.
pub struct DiscoveryReservationsClient {
    service_name: String,
    load_balancer: LoadBalancedClient,
}

impl DiscoveryReservationsClient {
    pub fn new(service_name: impl Into<String>, discovery: Arc<dyn DiscoveryClient>) -> Self {
        Self {
            service_name: service_name.into(),
            load_balancer: LoadBalancedClient::new(reqwest::Client::new(), discovery),
        }
    }

    fn uri(&self, path: &str) -> String {
        format!("http://{}{}", self.service_name, path)
    }
}

#[async_trait]
impl ReservationsClient for DiscoveryReservationsClient {
    async fn list_reservations(&self) -> Result<Resources<Reservation>, LoadBalancerError> {
        self.load_balancer
            .get_json(&self.uri(LIST_RESERVATIONS_PATH))
            .await
    }
}
