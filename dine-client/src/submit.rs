//! Order submission protocol
//!
//! token -> table -> cart snapshot -> stock gate -> order record -> POST.
//! A failed POST leaves the cart as it was and is never retried here; the
//! caller decides whether to submit again. One submission per session is in
//! flight at a time; an overlapping call fails fast without a POST.

use crate::api::OrderApi;
use crate::http::HttpClient;
use crate::money::to_f64;
use crate::session::{SessionContext, normalize_token};
use crate::stock::reconcile;
use crate::{ClientError, DineError, DineResult};
use shared::models::{NewOrder, Order};
use std::time::Duration;

/// Submit the session's cart as one order
///
/// Returns the order as created by the API (server-assigned id). On success
/// the order is appended to the session's history and the submitted lines
/// leave the cart.
pub async fn submit_order<C: HttpClient>(
    ctx: &SessionContext,
    api: &OrderApi<C>,
    raw_token: &str,
    timeout: Duration,
) -> DineResult<Order> {
    let token = normalize_token(raw_token);
    if token.is_empty() {
        return Err(DineError::session_invalid("missing session token"));
    }
    let Some(_submitting) = ctx.try_begin_submit() else {
        tracing::warn!(session_id = ctx.session_id(), "Order submission already in progress");
        return Err(DineError::SubmissionInProgress);
    };
    let table_id = ctx.resolve_table(api, &token).await?;

    let cart = ctx.cart().clone();
    if cart.is_empty() {
        return Err(DineError::EmptyCart);
    }

    let catalog = ctx.catalog().load(api).await?;
    reconcile(&cart, &catalog)?;

    let total_amount = to_f64(cart.calculate_total(&catalog));
    let details = cart.to_order_details();
    let new_order = NewOrder::pending(table_id, total_amount, &details)
        .map_err(|e| DineError::SubmissionFailed(ClientError::Serialization(e)))?;

    tracing::info!(
        table_id,
        lines = details.len(),
        total_amount,
        "Submitting order"
    );

    let record = match tokio::time::timeout(timeout, api.create_order(&new_order, &token)).await {
        Ok(Ok(record)) => record,
        Ok(Err(e)) => {
            let code = e.error_code();
            tracing::error!(
                table_id,
                error = %e,
                code = code.map(|c| c.code()),
                category = code.map(|c| c.category().name()),
                "Order submission failed"
            );
            return Err(DineError::SubmissionFailed(e));
        }
        Err(_) => {
            tracing::error!(table_id, ?timeout, "Order submission timed out");
            return Err(DineError::SubmissionFailed(ClientError::Timeout(timeout)));
        }
    };

    let (mut order, details_error) = record.normalize();
    if let Some(e) = details_error {
        // The API echoed a details payload we cannot read; what we sent is
        // what was stored.
        tracing::warn!(order_id = order.id, error = %e, "Created order has unreadable details");
        order.details = details;
    }
    order.table_id.get_or_insert(table_id);

    {
        let mut live = ctx.cart();
        for line in cart.lines() {
            live.remove_line(line.line_id);
        }
    }
    ctx.record_order(order.clone());

    tracing::info!(order_id = order.id, table_id, "Order submitted");
    Ok(order)
}
