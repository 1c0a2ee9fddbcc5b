//! Amazon Connect implementation of the provisioning API.

use async_trait::async_trait;
use aws_sdk_connect::error::DisplayErrorContext;
use aws_sdk_connect::types::{PhoneType, UserIdentityInfo, UserPhoneConfig};
use aws_sdk_connect::Client as ConnectClient;
use tracing::info;

use crate::provisioning::{CreateUserRequest, CreatedUser, ProvisioningApi, ProvisioningError};

/// Provisioning client backed by the Amazon Connect API.
pub struct ConnectProvisioningClient {
    client: ConnectClient,
}

impl ConnectProvisioningClient {
    /// Create a new Connect provisioning client.
    pub fn new(client: ConnectClient) -> Self {
        Self { client }
    }
}

fn soft_phone_config() -> UserPhoneConfig {
    UserPhoneConfig::builder()
        .phone_type(PhoneType::SoftPhone)
        .build()
}

#[async_trait]
impl ProvisioningApi for ConnectProvisioningClient {
    async fn list_usernames(&self, instance_id: &str) -> Result<Vec<String>, ProvisioningError> {
        let mut usernames = Vec::new();
        let mut pages = self
            .client
            .list_users()
            .instance_id(instance_id)
            .into_paginator()
            .send();

        while let Some(page) = pages.next().await {
            let page = page.map_err(|e| {
                ProvisioningError::Api(format!("Failed to list users: {}", DisplayErrorContext(&e)))
            })?;

            usernames.extend(
                page.user_summary_list()
                    .iter()
                    .filter_map(|summary| summary.username())
                    .map(String::from),
            );
        }

        info!("Listed {} existing Connect users", usernames.len());
        Ok(usernames)
    }

    async fn create_user(
        &self,
        request: &CreateUserRequest,
    ) -> Result<CreatedUser, ProvisioningError> {
        let identity_info = UserIdentityInfo::builder()
            .first_name(&request.first_name)
            .last_name(&request.last_name)
            .build();

        let output = self
            .client
            .create_user()
            .username(&request.username)
            .identity_info(identity_info)
            .phone_config(soft_phone_config())
            .set_security_profile_ids(Some(request.security_profile_ids.clone()))
            .routing_profile_id(&request.routing_profile_id)
            .instance_id(&request.instance_id)
            .send()
            .await
            .map_err(|e| {
                let duplicate = e
                    .as_service_error()
                    .map(|se| se.is_duplicate_resource_exception())
                    .unwrap_or(false);
                if duplicate {
                    ProvisioningError::AlreadyExists(request.username.clone())
                } else {
                    ProvisioningError::Api(format!(
                        "Failed to create user: {}",
                        DisplayErrorContext(&e)
                    ))
                }
            })?;

        Ok(CreatedUser {
            user_id: output.user_id().map(String::from),
            user_arn: output.user_arn().map(String::from),
        })
    }
}
