//! Creation of Connect users from parsed candidates.

use std::collections::HashSet;

use tracing::{error, info, warn};

use crate::config::{Config, DuplicatePolicy};
use crate::models::{CandidateUser, ProvisionedBody, UserResult, UserStatus};
use crate::provisioning::{CreateUserRequest, ProvisioningApi, ProvisioningError};
use crate::{Error, Result};

/// Message returned when provisioning succeeds.
pub const SUCCESS_MESSAGE: &str = "Connect user created successfully";

/// Provision every candidate in order and report a per-user outcome.
///
/// Existing usernames are listed once up front. The check and the create are
/// not atomic, so two concurrent deliveries for the same user can both pass
/// the check.
pub async fn provision_users(
    api: &dyn ProvisioningApi,
    config: &Config,
    candidates: &[CandidateUser],
) -> Result<Vec<UserResult>> {
    info!(
        "Checking {} candidate(s) against instance {}",
        candidates.len(),
        config.instance_id
    );

    let existing = api
        .list_usernames(&config.instance_id)
        .await
        .map_err(|e| {
            error!("Error checking for duplicate user: {}", e);
            Error::ProvisioningUnavailable(e.to_string())
        })?;
    let mut known: HashSet<String> = existing.into_iter().collect();

    let mut results = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        let status = provision_user(api, config, candidate, &mut known).await;
        results.push(UserResult {
            username: candidate.alternate_id.clone(),
            status,
        });
    }

    Ok(results)
}

async fn provision_user(
    api: &dyn ProvisioningApi,
    config: &Config,
    candidate: &CandidateUser,
    known: &mut HashSet<String>,
) -> UserStatus {
    if !candidate.has_username() {
        warn!(
            "Skipping user '{}' with no alternate id",
            candidate.display_name
        );
        return UserStatus::Skipped;
    }

    let username = &candidate.alternate_id;
    if known.contains(username) {
        match config.duplicate_policy {
            DuplicatePolicy::Reject => {
                warn!("User with username '{}' already exists.", username);
                return UserStatus::Duplicate;
            }
            DuplicatePolicy::SkipAndLog => {
                warn!(
                    "User with username '{}' already exists, creating anyway",
                    username
                );
            }
        }
    }

    let request = CreateUserRequest {
        username: username.clone(),
        first_name: candidate.first_name.clone(),
        last_name: candidate.last_name.clone(),
        security_profile_ids: config.security_profile_ids.clone(),
        routing_profile_id: config.routing_profile_id.clone(),
        instance_id: config.instance_id.clone(),
    };

    match api.create_user(&request).await {
        Ok(created) => {
            info!(
                "Created UserId {:?} and UserArn {:?} for {}",
                created.user_id, created.user_arn, username
            );
            known.insert(username.clone());
            UserStatus::Created
        }
        Err(ProvisioningError::AlreadyExists(_)) => {
            warn!("Connect rejected '{}' as a duplicate", username);
            UserStatus::Duplicate
        }
        Err(e) => {
            error!("Failed to create user {}: {}", username, e);
            UserStatus::Failed
        }
    }
}

/// Fold per-user outcomes into the invocation result.
///
/// Any failure wins, then a run with nothing created is a client error.
pub fn summarize(results: Vec<UserResult>) -> Result<ProvisionedBody> {
    let failed: Vec<&str> = usernames_with(&results, UserStatus::Failed);
    if !failed.is_empty() {
        return Err(Error::ProvisioningUnavailable(format!(
            "create-user failed for {}",
            failed.join(", ")
        )));
    }

    if !results.iter().any(|r| r.status == UserStatus::Created) {
        let duplicates = usernames_with(&results, UserStatus::Duplicate);
        if duplicates.is_empty() {
            return Err(Error::NoValidUsers);
        }
        return Err(Error::UserAlreadyExists(duplicates.join(", ")));
    }

    Ok(ProvisionedBody {
        message: SUCCESS_MESSAGE.to_string(),
        results,
    })
}

fn usernames_with(results: &[UserResult], status: UserStatus) -> Vec<&str> {
    results
        .iter()
        .filter(|r| r.status == status)
        .map(|r| r.username.as_str())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provisioning::CreatedUser;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeApi {
        existing: Vec<String>,
        fail_list: bool,
        fail_create_for: Option<String>,
        reject_create_for: Option<String>,
        created: Mutex<Vec<CreateUserRequest>>,
    }

    #[async_trait]
    impl ProvisioningApi for FakeApi {
        async fn list_usernames(
            &self,
            _instance_id: &str,
        ) -> std::result::Result<Vec<String>, ProvisioningError> {
            if self.fail_list {
                return Err(ProvisioningError::Api("ThrottlingException".to_string()));
            }
            Ok(self.existing.clone())
        }

        async fn create_user(
            &self,
            request: &CreateUserRequest,
        ) -> std::result::Result<CreatedUser, ProvisioningError> {
            self.created.lock().unwrap().push(request.clone());
            if self.fail_create_for.as_deref() == Some(request.username.as_str()) {
                return Err(ProvisioningError::Api("InternalServiceException".to_string()));
            }
            if self.reject_create_for.as_deref() == Some(request.username.as_str()) {
                return Err(ProvisioningError::AlreadyExists(request.username.clone()));
            }
            Ok(CreatedUser {
                user_id: Some("user-id".to_string()),
                user_arn: Some("arn:aws:connect:user".to_string()),
            })
        }
    }

    fn config(policy: DuplicatePolicy) -> Config {
        Config {
            instance_id: "instance-1".to_string(),
            security_profile_ids: vec!["sp-1".to_string(), "sp-2".to_string()],
            routing_profile_id: "rp-1".to_string(),
            app_name: "Connect App".to_string(),
            group_name: "amazon_connect".to_string(),
            app_membership_add_event: "application.user_membership.add".to_string(),
            group_membership_add_event: "group.user_membership.add".to_string(),
            duplicate_policy: policy,
            strict_event_types: false,
        }
    }

    fn candidate(id: &str, name: &str) -> CandidateUser {
        CandidateUser::new(Some(id), Some(name))
    }

    fn statuses(results: &[UserResult]) -> Vec<UserStatus> {
        results.iter().map(|r| r.status).collect()
    }

    #[tokio::test]
    async fn test_creates_user_with_configured_profiles() {
        let api = FakeApi::default();
        let results = provision_users(
            &api,
            &config(DuplicatePolicy::Reject),
            &[candidate("jdoe", "Jane Doe")],
        )
        .await
        .unwrap();

        assert_eq!(statuses(&results), vec![UserStatus::Created]);
        let created = api.created.lock().unwrap();
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].username, "jdoe");
        assert_eq!(created[0].first_name, "Jane");
        assert_eq!(created[0].last_name, "Doe");
        assert_eq!(created[0].security_profile_ids, vec!["sp-1", "sp-2"]);
        assert_eq!(created[0].routing_profile_id, "rp-1");
        assert_eq!(created[0].instance_id, "instance-1");
    }

    #[tokio::test]
    async fn test_reject_policy_never_creates_duplicate() {
        let api = FakeApi {
            existing: vec!["jdoe".to_string()],
            ..Default::default()
        };
        let results = provision_users(
            &api,
            &config(DuplicatePolicy::Reject),
            &[candidate("jdoe", "Jane Doe")],
        )
        .await
        .unwrap();

        assert_eq!(statuses(&results), vec![UserStatus::Duplicate]);
        assert!(api.created.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_skip_and_log_policy_creates_anyway() {
        let api = FakeApi {
            existing: vec!["jdoe".to_string()],
            ..Default::default()
        };
        let results = provision_users(
            &api,
            &config(DuplicatePolicy::SkipAndLog),
            &[candidate("jdoe", "Jane Doe")],
        )
        .await
        .unwrap();

        assert_eq!(statuses(&results), vec![UserStatus::Created]);
        assert_eq!(api.created.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_repeated_candidate_is_duplicate() {
        let api = FakeApi::default();
        let results = provision_users(
            &api,
            &config(DuplicatePolicy::Reject),
            &[candidate("jdoe", "Jane Doe"), candidate("jdoe", "Jane Doe")],
        )
        .await
        .unwrap();

        assert_eq!(
            statuses(&results),
            vec![UserStatus::Created, UserStatus::Duplicate]
        );
        assert_eq!(api.created.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_list_failure_is_unavailable() {
        let api = FakeApi {
            fail_list: true,
            ..Default::default()
        };
        let err = provision_users(
            &api,
            &config(DuplicatePolicy::Reject),
            &[candidate("jdoe", "Jane Doe")],
        )
        .await
        .unwrap_err();

        assert!(matches!(err, Error::ProvisioningUnavailable(_)));
        assert!(api.created.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_mixed_outcomes() {
        let api = FakeApi {
            fail_create_for: Some("broken".to_string()),
            reject_create_for: Some("taken".to_string()),
            ..Default::default()
        };
        let results = provision_users(
            &api,
            &config(DuplicatePolicy::Reject),
            &[
                candidate("jdoe", "Jane Doe"),
                candidate("taken", "Taken User"),
                candidate("broken", "Broken User"),
                CandidateUser::new(None, Some("No Id")),
            ],
        )
        .await
        .unwrap();

        assert_eq!(
            statuses(&results),
            vec![
                UserStatus::Created,
                UserStatus::Duplicate,
                UserStatus::Failed,
                UserStatus::Skipped
            ]
        );
        assert_eq!(api.created.lock().unwrap().len(), 3);
    }

    fn result(username: &str, status: UserStatus) -> UserResult {
        UserResult {
            username: username.to_string(),
            status,
        }
    }

    #[test]
    fn test_summarize_success() {
        let body = summarize(vec![
            result("jdoe", UserStatus::Created),
            result("taken", UserStatus::Duplicate),
        ])
        .unwrap();
        assert_eq!(body.message, SUCCESS_MESSAGE);
        assert_eq!(body.results.len(), 2);
    }

    #[test]
    fn test_summarize_failure_wins() {
        let err = summarize(vec![
            result("jdoe", UserStatus::Created),
            result("broken", UserStatus::Failed),
        ])
        .unwrap_err();
        assert_eq!(err.status_code(), 500);
    }

    #[test]
    fn test_summarize_all_duplicates() {
        let err = summarize(vec![result("jdoe", UserStatus::Duplicate)]).unwrap_err();
        assert_eq!(err.status_code(), 400);
        assert_eq!(
            err.public_message(),
            "User with username 'jdoe' already exists."
        );
    }

    #[test]
    fn test_summarize_all_skipped() {
        let err = summarize(vec![result("N/A", UserStatus::Skipped)]).unwrap_err();
        assert!(matches!(err, Error::NoValidUsers));
    }
}
