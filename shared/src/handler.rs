//! Request routing for the webhook Lambda.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::http::{ApiGatewayRequest, ApiGatewayResponse};
use crate::parser::parse_candidates;
use crate::provisioner::{provision_users, summarize};
use crate::provisioning::ProvisioningApi;
use crate::verification::verify_challenge;
use crate::{Error, Result};

/// Per-process state shared by every invocation.
pub struct AppContext {
    pub config: Config,
    pub provisioning: Arc<dyn ProvisioningApi>,
}

impl AppContext {
    pub fn new(config: Config, provisioning: Arc<dyn ProvisioningApi>) -> Self {
        Self {
            config,
            provisioning,
        }
    }
}

/// Handle a raw API Gateway proxy event.
pub async fn handle_event(ctx: &AppContext, payload: Value) -> ApiGatewayResponse {
    debug!("Received event: {}", payload);

    match serde_json::from_value::<ApiGatewayRequest>(payload) {
        Ok(request) => handle(ctx, &request).await,
        Err(e) => {
            let err = Error::MalformedRequest(format!("Unrecognised event shape: {}", e));
            warn!("{}", err);
            ApiGatewayResponse::from_error(&err)
        }
    }
}

/// Route a request and render any error as a JSON response.
pub async fn handle(ctx: &AppContext, request: &ApiGatewayRequest) -> ApiGatewayResponse {
    match route(ctx, request).await {
        Ok(response) => response,
        Err(err) => {
            if err.status_code() >= 500 {
                error!("Request failed: {}", err);
            } else {
                warn!("Request rejected: {}", err);
            }
            ApiGatewayResponse::from_error(&err)
        }
    }
}

async fn route(ctx: &AppContext, request: &ApiGatewayRequest) -> Result<ApiGatewayResponse> {
    let method = request.method()?;
    info!("Handling {} request", method);

    match method.as_str() {
        "GET" => verify_challenge(request),
        "POST" => create_connect_users(ctx, request).await,
        _ => Err(Error::UnsupportedMethod(method)),
    }
}

async fn create_connect_users(
    ctx: &AppContext,
    request: &ApiGatewayRequest,
) -> Result<ApiGatewayResponse> {
    let body = request.body_bytes()?;
    let candidates = parse_candidates(&ctx.config, &body)?;
    info!("Extracted {} candidate user(s)", candidates.len());

    let results = provision_users(ctx.provisioning.as_ref(), &ctx.config, &candidates).await?;
    let body = summarize(results)?;

    info!("User provisioning complete");
    Ok(ApiGatewayResponse::json(200, &body)?)
}
