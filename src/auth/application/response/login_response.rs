use serde::Deserialize;

#[derive(Deserialize)]
pub struct LoginResponse {
    pub data: LoginResponseData,
}

#[derive(Deserialize)]
pub struct LoginResponseData {
    pub ticket: String,
    #[serde(rename = "CSRFPreventionToken")]
    pub csrf_token: String,
    /// The user id Proxmox authenticated, echoed back.
    #[serde(default)]
    pub username: Option<String>,
}
