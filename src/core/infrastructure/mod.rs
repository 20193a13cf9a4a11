pub mod api_client;
pub mod client_config;
pub mod settings;
