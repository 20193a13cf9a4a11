pub mod catalog;
pub mod credentials;
pub mod instance;
pub mod outcome;
pub mod placement;
pub mod proxmox_connection;
