use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};

use crate::db::AppState;
use crate::payments::{PaddleSubscriptionData, PaddleWebhookEvent};

use super::common::{
    process_cancellation, process_created, process_status_update, resolve_account,
    CancellationData, CreatedData, Outcome, Resolution, StatusData, WebhookEvent,
    WebhookResponse,
};

pub const PROVIDER_NAME: &str = "paddle";

fn parse_subscription_data(
    event: &PaddleWebhookEvent,
) -> std::result::Result<PaddleSubscriptionData, String> {
    serde_json::from_value(event.data.clone()).map_err(|e| {
        tracing::error!("Failed to parse {} payload: {}", event.event_type, e);
        format!("Invalid {} payload", event.event_type)
    })
}

/// Parse the envelope into a tagged event. Unrecognized kinds become
/// `Unknown` rather than errors - the provider sends far more event types
/// than account state cares about.
fn parse_event(event: &PaddleWebhookEvent) -> std::result::Result<WebhookEvent, String> {
    match event.event_type.as_str() {
        "subscription.created" => {
            let data = parse_subscription_data(event)?;
            let price = data.items.first().and_then(|i| i.price.as_ref());
            Ok(WebhookEvent::SubscriptionCreated(CreatedData {
                subscription_id: data.id.clone(),
                customer_id: data.customer_id.clone(),
                customer_email: data.customer.as_ref().and_then(|c| c.email.clone()),
                price_id: price.and_then(|p| p.id.clone()),
                plan_name: price.and_then(|p| p.description.clone().or_else(|| p.name.clone())),
                next_billed_at: data.next_billed_at.clone(),
                user_id: data.custom_data.as_ref().and_then(|c| c.user_id.clone()),
            }))
        }
        "subscription.updated" => {
            let data = parse_subscription_data(event)?;
            let status = data.status.clone().ok_or_else(|| {
                tracing::error!("subscription.updated without a status field");
                "Missing subscription status".to_string()
            })?;
            Ok(WebhookEvent::SubscriptionUpdated(StatusData {
                subscription_id: data.id.clone(),
                status,
                customer_email: data.customer.as_ref().and_then(|c| c.email.clone()),
                user_id: data.custom_data.as_ref().and_then(|c| c.user_id.clone()),
            }))
        }
        "subscription.cancelled" => {
            let data = parse_subscription_data(event)?;
            Ok(WebhookEvent::SubscriptionCancelled(CancellationData {
                subscription_id: data.id.clone(),
                customer_email: data.customer.as_ref().and_then(|c| c.email.clone()),
                user_id: data.custom_data.as_ref().and_then(|c| c.user_id.clone()),
            }))
        }
        other => Ok(WebhookEvent::Unknown(other.to_string())),
    }
}

/// Resolve the target account and apply the event's state transition.
///
/// Every failure path here is soft: the outcome is reported in the response
/// body, never as a non-2xx status.
fn dispatch(
    state: &AppState,
    event_type: &str,
    event_id: Option<&str>,
    event: &WebhookEvent,
) -> WebhookResponse {
    let mut conn = match state.db.get() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("DB connection error: {}", e);
            return WebhookResponse::failed("Database unavailable");
        }
    };

    let (user_id, email) = match event {
        WebhookEvent::SubscriptionCreated(d) => (d.user_id.as_deref(), d.customer_email.as_deref()),
        WebhookEvent::SubscriptionUpdated(d) => (d.user_id.as_deref(), d.customer_email.as_deref()),
        WebhookEvent::SubscriptionCancelled(d) => {
            (d.user_id.as_deref(), d.customer_email.as_deref())
        }
        WebhookEvent::Unknown(kind) => return WebhookResponse::processed(kind),
    };

    let account = match resolve_account(&conn, user_id, email) {
        Ok(Resolution::Resolved(account)) => account,
        Ok(Resolution::NotFound) => {
            tracing::warn!(
                "No account matched {} event (user_id={:?}, email={:?})",
                event_type,
                user_id,
                email
            );
            return WebhookResponse::failed("No account matched event");
        }
        Ok(Resolution::Ambiguous) => {
            tracing::warn!(
                "Multiple accounts share email {:?}; refusing to pick one for {}",
                email,
                event_type
            );
            return WebhookResponse::failed("Ambiguous email match");
        }
        Err(e) => {
            tracing::error!("Account resolution failed: {}", e);
            return WebhookResponse::failed("Account resolution failed");
        }
    };

    let result = match event {
        WebhookEvent::SubscriptionCreated(d) => {
            process_created(&mut conn, PROVIDER_NAME, &account, event_id, d)
        }
        WebhookEvent::SubscriptionUpdated(d) => {
            process_status_update(&mut conn, PROVIDER_NAME, &account, event_id, d)
        }
        WebhookEvent::SubscriptionCancelled(d) => {
            process_cancellation(&mut conn, PROVIDER_NAME, &account, event_id, d)
        }
        WebhookEvent::Unknown(_) => unreachable!("filtered above"),
    };

    match result {
        Ok(Outcome::Applied) => WebhookResponse::processed(event_type),
        Ok(Outcome::AlreadyProcessed) => {
            tracing::info!("Replayed {} event {:?} ignored", event_type, event_id);
            WebhookResponse::processed(event_type)
        }
        Err(e) => {
            tracing::error!("Failed to process {} event: {}", event_type, e);
            WebhookResponse::failed(format!("Failed to process {}", event_type))
        }
    }
}

/// Axum handler for Paddle webhooks.
///
/// Signature failures are the only hard reject (401). Everything after a
/// valid signature is acknowledged with 200 - the provider retries non-2xx
/// deliveries, and a blind retry of a side-effecting handler is worse for
/// this system than a logged drop.
pub async fn handle_paddle_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    let signature = headers
        .get(state.paddle.signature_header())
        .and_then(|v| v.to_str().ok());
    let timestamp = headers
        .get(state.paddle.timestamp_header())
        .and_then(|v| v.to_str().ok());

    if !state
        .paddle
        .verify_webhook_signature(&body, signature, timestamp)
    {
        tracing::warn!("Rejected paddle webhook: invalid or missing signature");
        return (
            StatusCode::UNAUTHORIZED,
            Json(WebhookResponse::failed("Invalid signature")),
        );
    }

    let envelope: PaddleWebhookEvent = match serde_json::from_slice(&body) {
        Ok(e) => e,
        Err(e) => {
            tracing::error!("Failed to parse paddle webhook envelope: {}", e);
            return (
                StatusCode::OK,
                Json(WebhookResponse::failed("Invalid JSON payload")),
            );
        }
    };

    tracing::debug!(
        "Paddle webhook received: event_type={}, event_id={:?}",
        envelope.event_type,
        envelope.event_id
    );

    let response = match parse_event(&envelope) {
        Ok(WebhookEvent::Unknown(kind)) => {
            tracing::debug!("Ignoring unrecognized paddle event kind: {}", kind);
            WebhookResponse::processed(&kind)
        }
        Ok(event) => dispatch(
            &state,
            &envelope.event_type,
            envelope.event_id.as_deref(),
            &event,
        ),
        Err(msg) => WebhookResponse::failed(msg),
    };

    (StatusCode::OK, Json(response))
}
