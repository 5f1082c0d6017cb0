pub mod event_handler;
pub mod reservation_service;
