//! Resolved caller identity.
//!
//! Every gated route sees the caller through this one type, regardless of
//! whether the caller arrived with a signed credential cookie or a federated
//! session.

use crate::models::Role;
use serde::{Deserialize, Serialize};

/// Identity carried by a locally issued signed credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalIdentity {
    pub subject_id: String,
    pub username: String,
    pub role: Role,
}

/// Profile normalized from the federated provider.
///
/// Federated identities are authenticated but carry no role; they can only
/// reach role-agnostic pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FederatedProfile {
    pub subject_id: String,
    pub display_name: String,
    pub email: Option<String>,
}

/// The caller as resolved from the request.
#[derive(Debug, Clone)]
pub enum Identity {
    Local(LocalIdentity),
    Federated(FederatedProfile),
    Anonymous,
}
