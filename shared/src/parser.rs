//! Extraction of candidate users from Okta membership events.

use tracing::{debug, info, warn};

use crate::config::Config;
use crate::models::{CandidateUser, EventHookPayload, EventRecord, TargetObject};
use crate::{Error, Result};

/// Parse a delivery body into its event records.
///
/// Fails when the body is not JSON or carries no events.
pub fn parse_events(body: &[u8]) -> Result<Vec<EventRecord>> {
    let payload: EventHookPayload = serde_json::from_slice(body)
        .map_err(|e| Error::MalformedPayload(format!("Invalid JSON payload: {}", e)))?;

    let events = payload.data.map(|data| data.events).unwrap_or_default();
    if events.is_empty() {
        return Err(Error::MalformedPayload("No events found in data".to_string()));
    }

    Ok(events)
}

/// Walk records in order and collect candidate users.
///
/// A group or app target whose display name differs from the configured one
/// clears every candidate gathered so far, including those from earlier
/// records, and rejects the rest of its own record. Later records may still
/// add candidates.
pub fn extract_candidates(config: &Config, records: &[EventRecord]) -> Result<Vec<CandidateUser>> {
    let mut candidates = Vec::new();

    for record in records {
        let event_type = record.event_type.as_deref().unwrap_or_default();
        if !config.is_membership_add_event(event_type) {
            if config.strict_event_types {
                info!("Skipping event of type '{}'", event_type);
                continue;
            }
            warn!("Processing unrecognised event type '{}'", event_type);
        }

        let mut rejected = false;
        for target in &record.target {
            match target {
                TargetObject::User { alternate_id, .. } if rejected => {
                    info!("Skipping user {:?} in rejected event", alternate_id);
                }
                TargetObject::User {
                    display_name,
                    alternate_id,
                } => {
                    let candidate =
                        CandidateUser::new(alternate_id.as_deref(), display_name.as_deref());
                    debug!("Candidate user: {:?}", candidate);
                    candidates.push(candidate);
                }
                TargetObject::UserGroup { display_name }
                    if display_name.as_deref() != Some(config.group_name.as_str()) =>
                {
                    info!("Skipping event: Group name mismatch ({:?})", display_name);
                    candidates.clear();
                    rejected = true;
                }
                TargetObject::AppInstance { display_name }
                    if display_name.as_deref() != Some(config.app_name.as_str()) =>
                {
                    info!("Skipping event: App name mismatch ({:?})", display_name);
                    candidates.clear();
                    rejected = true;
                }
                _ => {}
            }
        }
    }

    if candidates.is_empty() {
        return Err(Error::NoValidUsers);
    }

    Ok(candidates)
}

/// Parse a delivery body straight into candidate users.
pub fn parse_candidates(config: &Config, body: &[u8]) -> Result<Vec<CandidateUser>> {
    let records = parse_events(body)?;
    extract_candidates(config, &records)
}
