use tracing::{error, info};
use crate::discovery::DiscoveryClient;

/// Logs every registered instance of `service_id`. Never fails: errors are
/// only logged so the client can start without a reachable registry.
pub async fn log_instances(discovery: &dyn DiscoveryClient, service_id: &str) {
    info!("------------------------------");
    info!("{} example", discovery.description());

    match discovery.get_services().await {
        Ok(services) => info!("Known services: {:?}", services),
        Err(e) => error!("{} example error! {:#}", discovery.description(), e),
    }

    match discovery.get_instances(service_id).await {
        Ok(instances) => {
            for instance in instances {
                info!("Reservation service: ");
                info!("  ID: {}", instance.service_id);
                info!("  URI: {}", instance.uri);
                info!("  Meta: {:?}", instance.metadata);
            }
        }
        Err(e) => error!("{} example error! {:#}", discovery.description(), e),
    }

    info!("------------------------------");
}
