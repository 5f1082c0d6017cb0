pub mod reservation;
pub mod resources;
pub mod service_instance;
