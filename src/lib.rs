pub mod app;
pub mod client;
pub mod config;
pub mod controller;
pub mod discovery;
pub mod helpers;
pub mod metrics;
pub mod models;
pub mod repositories;
pub mod services;
