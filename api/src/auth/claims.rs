use serde::{Deserialize, Serialize};

/// JWT payload issued to every authenticated caller.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// User id.
    pub sub: i64,
    /// Expiry as a unix timestamp.
    pub exp: usize,
    pub admin: bool,
}

/// Verified claims, available to handlers behind the auth guards.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl AuthUser {
    pub fn user_id(&self) -> i64 {
        self.0.sub
    }

    pub fn is_admin(&self) -> bool {
        self.0.admin
    }
}
