use std::collections::BTreeMap;
use std::sync::Arc;
use anyhow::Context;
use tracing::{info, warn};
use crate::client::{self, discovery_demo, ClientState};
use crate::config::{ClientConfig, ServiceConfig};
use crate::controller::{self, AppState};
use crate::controller::hal::ResourceProcessor;
use crate::discovery::eureka::{EurekaClient, InstanceInfo, HEARTBEAT_INTERVAL};
use crate::discovery::static_discovery::StaticDiscoveryClient;
use crate::discovery::DiscoveryClient;
use crate::metrics::CounterService;
use crate::repositories::memory_repo::InMemoryRepo;
use crate::repositories::postgres_repo::{self, PostgresConnectionRepo};
use crate::repositories::ReservationRepository;
use crate::services::event_handler::ReservationEventHandler;
use crate::services::reservation_service::ReservationService;

pub fn build_app_state(
    repository: Arc<dyn ReservationRepository>,
    instance_id: &str,
) -> anyhow::Result<AppState> {
    let counters = Arc::new(CounterService::new().context("Error registering reservation metrics")?);
    let events = ReservationEventHandler::new(counters.clone());
    Ok(AppState {
        reservation_service: ReservationService::new(repository, events),
        resource_processor: Arc::new(ResourceProcessor::new(instance_id)),
        counters,
    })
}

async fn build_repository(config: &ServiceConfig) -> anyhow::Result<Arc<dyn ReservationRepository>> {
    match &config.database_url {
        Some(database_url) => {
            let pool = postgres_repo::connect(database_url).await?;
            let repo = PostgresConnectionRepo::new(pool);
            repo.ensure_schema().await?;
            info!("Storing reservations in postgres");
            Ok(Arc::new(repo))
        }
        None => {
            info!("No database configured, storing reservations in memory");
            Ok(Arc::new(InMemoryRepo::new()))
        }
    }
}

pub async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal due to: {}", e);
        futures::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

pub async fn run_service(config: ServiceConfig) -> anyhow::Result<()> {
    let repository = build_repository(&config).await?;
    let app_state = build_app_state(repository, &config.instance_id)?;

    app_state
        .reservation_service
        .seed_demo_data()
        .await
        .context("Failed to seed demo reservations")?;

    let registration = match &config.eureka_url {
        Some(eureka_url) => {
            let eureka = EurekaClient::new(reqwest::Client::new(), eureka_url.clone());
            let metadata = BTreeMap::from([("instanceId".to_string(), config.instance_id.clone())]);
            let instance = InstanceInfo::for_registration(
                &config.service_name,
                &config.instance_hostname,
                config.port,
                metadata,
            );
            if let Err(e) = eureka.register(&instance).await {
                warn!("Initial Eureka registration failed, heartbeats will retry: {:#}", e);
            }
            Some((eureka, instance))
        }
        None => None,
    };

    let server = controller::serve(app_state, &config, shutdown_signal());
    let result = match &registration {
        Some((eureka, instance)) => {
            tokio::select! {
                result = server => result,
                _ = eureka.heartbeat(instance, HEARTBEAT_INTERVAL) => Ok(()),
            }
        }
        None => server.await,
    };

    if let Some((eureka, instance)) = &registration {
        if let Err(e) = eureka.deregister(instance).await {
            warn!("Failed to deregister from Eureka due to: {:#}", e);
        }
    }
    result
}

pub fn build_discovery(config: &ClientConfig) -> anyhow::Result<Arc<dyn DiscoveryClient>> {
    match &config.eureka_url {
        Some(eureka_url) => Ok(Arc::new(EurekaClient::new(reqwest::Client::new(), eureka_url.clone()))),
        None => Ok(Arc::new(StaticDiscoveryClient::from_entries(&config.static_instances)?)),
    }
}

pub async fn run_client(config: ClientConfig) -> anyhow::Result<()> {
    let discovery = build_discovery(&config)?;
    discovery_demo::log_instances(discovery.as_ref(), &config.service_name).await;

    let client_state = ClientState::new(&config.service_name, discovery);
    client::serve(client_state, &config, shutdown_signal()).await
}
