//! Okta one-time event hook verification.
//!
//! Okta activates an event hook by sending a GET with a challenge header and
//! expects the value echoed back as `{"verification": "<value>"}`.

use tracing::{info, warn};

use crate::http::{ApiGatewayRequest, ApiGatewayResponse};
use crate::models::VerificationResponse;
use crate::{Error, Result};

/// Header carrying the verification challenge.
pub const VERIFICATION_HEADER: &str = "x-okta-verification-challenge";

/// Echo the challenge header back to Okta.
pub fn verify_challenge(request: &ApiGatewayRequest) -> Result<ApiGatewayResponse> {
    let challenge = match request.header(VERIFICATION_HEADER) {
        Some(value) if !value.is_empty() => value,
        _ => {
            warn!("Okta verification challenge header missing");
            return Err(Error::MissingChallenge);
        }
    };

    info!("One-Time Okta Verification Request");
    Ok(ApiGatewayResponse::json(
        200,
        &VerificationResponse {
            verification: challenge.to_string(),
        },
    )?)
}
