use std::net::{IpAddr, SocketAddr};
use clap::{Args, Parser, Subcommand};
use url::Url;

pub const DEFAULT_SERVICE_NAME: &str = "reservationservice";

#[derive(Parser, Clone, Debug)]
#[command(name = "reservation-services", version, about = "Reservation service and its discovery-aware client")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Clone, Debug)]
pub enum Command {
    /// Serve the reservation store over HTTP
    Service(ServiceConfig),
    /// Serve the name lookups backed by the discovered reservation service
    Client(ClientConfig),
}

#[derive(Args, Clone, Debug)]
pub struct ServiceConfig {
    #[clap(env, long, default_value = "0.0.0.0")]
    pub bind_address: IpAddr,
    #[clap(env, long, default_value_t = 8000)]
    pub port: u16,
    /// Postgres connection string, reservations are kept in memory when unset
    #[clap(env, long)]
    pub database_url: Option<String>,
    /// Suffix appended to names rendered by the hypermedia surface
    #[clap(env = "INFO_INSTANCE_ID", long = "info-instance-id", default_value = "")]
    pub instance_id: String,
    #[clap(env, long, default_value = DEFAULT_SERVICE_NAME)]
    pub service_name: String,
    #[clap(env, long)]
    pub eureka_url: Option<Url>,
    #[clap(env, long, default_value = "localhost")]
    pub instance_hostname: String,
    #[clap(env, long, default_value = "*")]
    pub origin_urls: String,
}

impl ServiceConfig {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_address, self.port)
    }
}

#[derive(Args, Clone, Debug)]
pub struct ClientConfig {
    #[clap(env, long, default_value = "0.0.0.0")]
    pub bind_address: IpAddr,
    #[clap(env, long, default_value_t = 9999)]
    pub port: u16,
    #[clap(env, long, default_value = DEFAULT_SERVICE_NAME)]
    pub service_name: String,
    #[clap(env, long)]
    pub eureka_url: Option<Url>,
    /// Fixed registry entries as `name=uri`, used when no Eureka server is configured
    #[clap(env, long, value_delimiter = ',')]
    pub static_instances: Vec<String>,
}

impl ClientConfig {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_address, self.port)
    }
}
