//! Okta Webhook Lambda - Provisions Amazon Connect users from Okta event hooks.
//!
//! Sits behind API Gateway on a single `/create_user` resource:
//! - GET answers Okta's one-time verification challenge
//! - POST receives membership-add events and creates the matching Connect users

use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;
use shared::{handle_event, AppContext, Config, ConnectProvisioningClient};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

async fn build_context() -> Result<AppContext, Error> {
    let config = Config::from_env()?;

    let sdk_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let connect_client = aws_sdk_connect::Client::new(&sdk_config);

    info!(
        "Loaded configuration for Connect instance {} (duplicate policy {:?})",
        config.instance_id, config.duplicate_policy
    );

    Ok(AppContext::new(
        config,
        Arc::new(ConnectProvisioningClient::new(connect_client)),
    ))
}

async fn handler(ctx: Arc<AppContext>, event: LambdaEvent<Value>) -> Result<Value, Error> {
    let (payload, _context) = event.into_parts();
    let response = handle_event(&ctx, payload).await;
    Ok(serde_json::to_value(response)?)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let ctx = Arc::new(build_context().await?);

    lambda_runtime::run(service_fn(move |event| {
        let ctx = Arc::clone(&ctx);
        async move { handler(ctx, event).await }
    }))
    .await
}
