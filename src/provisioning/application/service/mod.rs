pub mod provisioning_service;
