//! Shared library for the Okta to Amazon Connect webhook Lambda.
//!
//! Okta event hooks deliver group and application membership changes. This
//! crate parses those deliveries, derives the users to provision, and creates
//! them in an Amazon Connect instance. It also answers Okta's one-time
//! verification handshake.

pub mod config;
pub mod connect;
pub mod error;
pub mod handler;
pub mod http;
pub mod models;
pub mod parser;
pub mod provisioner;
pub mod provisioning;
pub mod verification;

pub use config::{Config, DuplicatePolicy};
pub use connect::ConnectProvisioningClient;
pub use error::{Error, Result};
pub use handler::{handle, handle_event, AppContext};
pub use http::{ApiGatewayRequest, ApiGatewayResponse};
pub use models::{CandidateUser, UserResult, UserStatus};
pub use provisioning::{CreateUserRequest, CreatedUser, ProvisioningApi, ProvisioningError};
