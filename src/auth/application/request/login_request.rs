use serde::Serialize;

/// Body of `POST /api2/json/access/ticket`.
#[derive(Serialize)]
pub struct LoginRequest<'a> {
    /// Full `user@realm` id.
    pub username: &'a str,
    pub password: &'a str,
}
