use chrono::{DateTime, Utc};

use crate::domain::value_object::capability::Capability;
use kernel::id::UserId;

/// Allow-list entry granting `capability` to a user
#[derive(Debug, Clone)]
pub struct AuthorizationRecord {
    pub user_id: UserId,
    pub capability: Capability,
    /// Free-form role label kept by the allow-list (e.g. "admin", "support")
    pub role: String,
    pub granted_at: DateTime<Utc>,
}
