mod api_token;
mod instance_id;
mod node_name;
mod proxmox_csrf_token;
mod proxmox_host;
mod proxmox_password;
mod proxmox_port;
mod proxmox_ticket;
mod proxmox_username;

pub use api_token::ApiToken;
pub use instance_id::InstanceId;
pub use node_name::NodeName;
pub use proxmox_csrf_token::ProxmoxCSRFToken;
pub use proxmox_host::ProxmoxHost;
pub use proxmox_password::ProxmoxPassword;
pub use proxmox_port::ProxmoxPort;
pub use proxmox_ticket::ProxmoxTicket;
pub use proxmox_username::ProxmoxUsername;
