//! Contact-center user provisioning abstraction.

use async_trait::async_trait;
use thiserror::Error;

/// Errors raised by a provisioning backend.
#[derive(Error, Debug)]
pub enum ProvisioningError {
    /// Backend refused the create because the username is taken
    #[error("User already exists: {0}")]
    AlreadyExists(String),

    /// Any other backend or transport failure
    #[error("Provisioning API error: {0}")]
    Api(String),
}

/// Parameters of a single create-user call. Users always get a soft phone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateUserRequest {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub security_profile_ids: Vec<String>,
    pub routing_profile_id: String,
    pub instance_id: String,
}

/// Identifiers returned for a created user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreatedUser {
    pub user_id: Option<String>,
    pub user_arn: Option<String>,
}

/// User-management operations the webhook needs from the backend.
#[async_trait]
pub trait ProvisioningApi: Send + Sync {
    /// All usernames in the instance.
    async fn list_usernames(&self, instance_id: &str) -> Result<Vec<String>, ProvisioningError>;

    /// Create one user.
    async fn create_user(
        &self,
        request: &CreateUserRequest,
    ) -> Result<CreatedUser, ProvisioningError>;
}
