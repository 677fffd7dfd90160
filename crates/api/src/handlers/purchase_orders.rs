//! Handlers for the `/purchase-orders` resource and its workflow actions.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use ledgerline_core::finance::{price_order_lines, PricedLines};
use ledgerline_core::lifecycle::{ensure_transition, PurchaseOrderStatus};
use ledgerline_core::pagination::Page;
use ledgerline_core::types::{Date, DbId};
use ledgerline_core::validation::date_range;
use ledgerline_db::models::purchase_order::{
    CreatePurchaseOrder, OrderLineInput, PurchaseOrder, PurchaseOrderDetail, PurchaseOrderFilter,
    ReceivePurchaseOrder, UpdatePurchaseOrder,
};
use ledgerline_db::models::transaction::FinancialTransaction;
use ledgerline_db::repositories::PurchaseOrderRepo;
use serde::Serialize;

use super::{changed_concurrently, require_active_account};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::validated_json::{OptionalJson, ValidatedJson};
use crate::query::PageParams;
use crate::response::ApiResponse;
use crate::state::AppState;

/// Response of `POST /purchase-orders/{id}/receive`.
#[derive(Debug, Serialize)]
pub struct ReceiveResponse {
    pub order: PurchaseOrder,
    /// The pending payable raised for the order total.
    pub payable: FinancialTransaction,
}

/// GET /api/purchase-orders
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(page): Query<PageParams>,
    Query(filter): Query<PurchaseOrderFilter>,
) -> AppResult<ApiResponse<Page<PurchaseOrder>>> {
    let orders =
        PurchaseOrderRepo::list(&state.pool, auth.company_id, &filter, page.to_request()).await?;
    Ok(ApiResponse::ok(orders))
}

/// GET /api/purchase-orders/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<ApiResponse<PurchaseOrderDetail>> {
    let detail = PurchaseOrderRepo::find_detail(&state.pool, auth.company_id, id)
        .await?
        .ok_or_else(|| AppError::not_found("PurchaseOrder", id))?;
    Ok(ApiResponse::ok(detail))
}

/// POST /api/purchase-orders
///
/// The order number and total are generated; clients only send lines.
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(input): ValidatedJson<CreatePurchaseOrder>,
) -> AppResult<ApiResponse<PurchaseOrderDetail>> {
    let priced = check_lines(&input.lines)?;
    check_dates(input.order_date, input.expected_date)?;

    let detail =
        PurchaseOrderRepo::create(&state.pool, auth.company_id, &input, &priced, auth.user_id)
            .await?;
    tracing::info!(
        purchase_order_id = detail.order.id,
        number = %detail.order.number,
        total = %detail.order.total,
        "Purchase order created"
    );
    Ok(ApiResponse::created(detail))
}

/// PUT /api/purchase-orders/{id}
///
/// Drafts only. Sending `lines` replaces all existing lines.
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    ValidatedJson(input): ValidatedJson<UpdatePurchaseOrder>,
) -> AppResult<ApiResponse<PurchaseOrderDetail>> {
    let existing = find(&state, auth.company_id, id).await?;
    if existing.status != PurchaseOrderStatus::Draft {
        return Err(AppError::business_rule(format!(
            "Only draft purchase orders can be edited (status is {})",
            existing.status.name()
        )));
    }
    let priced = input.lines.as_deref().map(check_lines).transpose()?;
    check_dates(
        input.order_date.unwrap_or(existing.order_date),
        input.expected_date.or(existing.expected_date),
    )?;

    let detail =
        PurchaseOrderRepo::update_draft(
            &state.pool,
            auth.company_id,
            id,
            &input,
            priced.as_ref(),
            auth.user_id,
        )
        .await?
            .ok_or_else(|| changed_concurrently("PurchaseOrder"))?;
    Ok(ApiResponse::ok(detail))
}

/// POST /api/purchase-orders/{id}/submit
pub async fn submit(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<ApiResponse<PurchaseOrder>> {
    let order = transition(&state, &auth, id, PurchaseOrderStatus::Submitted).await?;
    Ok(ApiResponse::ok(order))
}

/// POST /api/purchase-orders/{id}/approve
pub async fn approve(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<ApiResponse<PurchaseOrder>> {
    let order = transition(&state, &auth, id, PurchaseOrderStatus::Approved).await?;
    Ok(ApiResponse::ok(order))
}

/// POST /api/purchase-orders/{id}/cancel
pub async fn cancel(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<ApiResponse<PurchaseOrder>> {
    let order = transition(&state, &auth, id, PurchaseOrderStatus::Cancelled).await?;
    Ok(ApiResponse::ok(order))
}

/// POST /api/purchase-orders/{id}/receive
///
/// Marks an approved order received and raises a pending payable for its
/// total in the same database transaction.
pub async fn receive(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    OptionalJson(input): OptionalJson<ReceivePurchaseOrder>,
) -> AppResult<ApiResponse<ReceiveResponse>> {
    let existing = find(&state, auth.company_id, id).await?;
    ensure_transition(existing.status, PurchaseOrderStatus::Received)?;
    if existing.total.is_zero() {
        return Err(AppError::business_rule(
            "A purchase order with a zero total cannot be received",
        ));
    }
    if let Some(account_id) = input.account_id {
        require_active_account(&state, auth.company_id, account_id).await?;
    }

    let received = PurchaseOrderRepo::receive(
        &state.pool,
        auth.company_id,
        id,
        input.account_id,
        input.due_date,
        auth.user_id,
    )
    .await?
    .ok_or_else(|| changed_concurrently("PurchaseOrder"))?;

    tracing::info!(
        purchase_order_id = id,
        transaction_id = received.payable.id,
        amount = %received.payable.amount,
        "Purchase order received"
    );
    Ok(ApiResponse::ok(ReceiveResponse {
        order: received.order,
        payable: received.payable,
    }))
}

/// DELETE /api/purchase-orders/{id}
///
/// Draft and cancelled orders only.
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let existing = find(&state, auth.company_id, id).await?;
    if !matches!(
        existing.status,
        PurchaseOrderStatus::Draft | PurchaseOrderStatus::Cancelled
    ) {
        return Err(AppError::business_rule(format!(
            "Only draft or cancelled purchase orders can be deleted (status is {})",
            existing.status.name()
        )));
    }

    if PurchaseOrderRepo::delete(&state.pool, auth.company_id, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(changed_concurrently("PurchaseOrder"))
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn find(state: &AppState, company_id: DbId, id: DbId) -> AppResult<PurchaseOrder> {
    PurchaseOrderRepo::find_by_id(&state.pool, company_id, id)
        .await?
        .ok_or_else(|| AppError::not_found("PurchaseOrder", id))
}

async fn transition(
    state: &AppState,
    auth: &AuthUser,
    id: DbId,
    to: PurchaseOrderStatus,
) -> AppResult<PurchaseOrder> {
    let existing = find(state, auth.company_id, id).await?;
    ensure_transition(existing.status, to)?;

    let order = PurchaseOrderRepo::transition(
        &state.pool,
        auth.company_id,
        id,
        existing.status,
        to,
        auth.user_id,
    )
    .await?
    .ok_or_else(|| changed_concurrently("PurchaseOrder"))?;

    tracing::info!(
        purchase_order_id = id,
        from = existing.status.name(),
        to = to.name(),
        "Purchase order status changed"
    );
    Ok(order)
}

fn check_lines(lines: &[OrderLineInput]) -> AppResult<PricedLines> {
    Ok(price_order_lines(
        lines.iter().map(|l| (&l.quantity, &l.unit_price)),
    )?)
}

fn check_dates(order_date: Date, expected_date: Option<Date>) -> AppResult<()> {
    date_range(order_date, expected_date, "purchase order").map_err(AppError::validation)
}
