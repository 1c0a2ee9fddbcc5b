//! Configuration management for the webhook Lambda.

use std::env;
use std::str::FromStr;

use tracing::error;
use validator::Validate;

use crate::{Error, Result};

/// How to treat a candidate whose username already exists in Connect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicatePolicy {
    /// Report the duplicate and never call create-user.
    #[default]
    Reject,
    /// Log a warning and call create-user anyway.
    SkipAndLog,
}

impl FromStr for DuplicatePolicy {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "reject" => Ok(Self::Reject),
            "skip-and-log" | "log-and-continue" => Ok(Self::SkipAndLog),
            other => Err(Error::Config(format!(
                "DUPLICATE_USER_POLICY must be 'reject' or 'skip-and-log', got '{}'",
                other
            ))),
        }
    }
}

/// Application configuration loaded from environment variables.
///
/// Built once per cold start and never mutated afterwards.
#[derive(Debug, Clone, Validate)]
pub struct Config {
    /// Amazon Connect instance id
    #[validate(length(min = 1))]
    pub instance_id: String,
    /// Security profiles attached to every created user
    #[validate(length(min = 1))]
    pub security_profile_ids: Vec<String>,
    /// Routing profile attached to every created user
    #[validate(length(min = 1))]
    pub routing_profile_id: String,
    /// Okta application whose membership events are accepted
    #[validate(length(min = 1))]
    pub app_name: String,
    /// Okta group whose membership events are accepted
    #[validate(length(min = 1))]
    pub group_name: String,
    /// Event type for "user added to application"
    #[validate(length(min = 1))]
    pub app_membership_add_event: String,
    /// Event type for "user added to group"
    #[validate(length(min = 1))]
    pub group_membership_add_event: String,
    /// Handling of usernames already present in Connect
    pub duplicate_policy: DuplicatePolicy,
    /// Skip records whose event type matches neither membership-add event
    pub strict_event_types: bool,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key).ok_or_else(|| {
                error!("Environment variable {} is not set.", key);
                Error::Config(format!("Required environment variable {} is not set.", key))
            })
        };

        let profile_ids = lookup("CONNECT_SECURITY_PROFILE_IDS")
            .or_else(|| lookup("CONNECT_SECURITY_PROFILE_ID"))
            .ok_or_else(|| {
                Error::Config(
                    "Required environment variable CONNECT_SECURITY_PROFILE_IDS is not set."
                        .to_string(),
                )
            })?;

        let duplicate_policy = match lookup("DUPLICATE_USER_POLICY") {
            Some(value) => value.parse()?,
            None => DuplicatePolicy::default(),
        };

        let strict_event_types = match lookup("OKTA_STRICT_EVENT_TYPES") {
            Some(value) => parse_flag("OKTA_STRICT_EVENT_TYPES", &value)?,
            None => false,
        };

        let config = Self {
            instance_id: required("CONNECT_INSTANCE_ID")?,
            security_profile_ids: split_ids(&profile_ids),
            routing_profile_id: required("CONNECT_ROUTING_PROFILE_ID")?,
            app_name: required("OKTA_APP_NAME")?,
            group_name: required("OKTA_GROUP_NAME")?,
            app_membership_add_event: required("OKTA_APP_MEMBERSHIP_ADD_EVENT")?,
            group_membership_add_event: required("OKTA_GROUP_MEMBERSHIP_ADD_EVENT")?,
            duplicate_policy,
            strict_event_types,
        };

        config
            .validate()
            .map_err(|e| Error::Config(format!("Invalid configuration: {}", e)))?;

        Ok(config)
    }

    /// Whether an event type is one of the configured membership-add events.
    pub fn is_membership_add_event(&self, event_type: &str) -> bool {
        event_type == self.app_membership_add_event || event_type == self.group_membership_add_event
    }
}

fn split_ids(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(String::from)
        .collect()
}

fn parse_flag(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" | "" => Ok(false),
        other => Err(Error::Config(format!(
            "{} must be a boolean, got '{}'",
            key, other
        ))),
    }
}
