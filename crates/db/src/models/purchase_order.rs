//! Purchase order and line models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;
use ledgerline_core::lifecycle::PurchaseOrderStatus;
use ledgerline_core::types::{Date, DbId, Money, Timestamp};
use ledgerline_core::validation::{non_negative_amount, not_blank, positive_quantity};

/// A row from the `purchase_orders` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PurchaseOrder {
    pub id: DbId,
    pub company_id: DbId,
    /// Generated per company, e.g. `PO-000042`.
    pub number: String,
    pub supplier_name: String,
    pub supplier_email: Option<String>,
    pub order_date: Date,
    pub expected_date: Option<Date>,
    #[sqlx(rename = "status_id", try_from = "i16")]
    pub status: PurchaseOrderStatus,
    pub total: Money,
    pub notes: Option<String>,
    pub submitted_at: Option<Timestamp>,
    pub approved_at: Option<Timestamp>,
    pub approved_by: Option<DbId>,
    pub received_at: Option<Timestamp>,
    pub created_by: Option<DbId>,
    pub updated_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `purchase_order_lines` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PurchaseOrderLine {
    pub id: DbId,
    pub purchase_order_id: DbId,
    pub line_no: i32,
    pub description: String,
    pub quantity: Money,
    pub unit_price: Money,
    pub line_total: Money,
}

/// An order with its lines, as returned by the detail endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct PurchaseOrderDetail {
    #[serde(flatten)]
    pub order: PurchaseOrder,
    pub lines: Vec<PurchaseOrderLine>,
}

/// One line of a create/update request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct OrderLineInput {
    #[validate(length(min = 1, max = 500), custom(function = "not_blank"))]
    pub description: String,
    #[validate(custom(function = "positive_quantity"))]
    pub quantity: Money,
    #[validate(custom(function = "non_negative_amount"))]
    pub unit_price: Money,
}

/// DTO for creating a purchase order in `draft`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreatePurchaseOrder {
    #[validate(length(min = 1, max = 200), custom(function = "not_blank"))]
    pub supplier_name: String,
    #[validate(email(message = "must be a valid email"))]
    pub supplier_email: Option<String>,
    pub order_date: Date,
    pub expected_date: Option<Date>,
    pub notes: Option<String>,
    #[validate(length(min = 1, message = "must contain at least one line"), nested)]
    pub lines: Vec<OrderLineInput>,
}

/// DTO for editing a draft order. When `lines` is present it replaces every
/// existing line and the total is recomputed.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdatePurchaseOrder {
    #[validate(length(min = 1, max = 200), custom(function = "not_blank"))]
    pub supplier_name: Option<String>,
    #[validate(email(message = "must be a valid email"))]
    pub supplier_email: Option<String>,
    pub order_date: Option<Date>,
    pub expected_date: Option<Date>,
    pub notes: Option<String>,
    #[validate(length(min = 1, message = "must contain at least one line"), nested)]
    pub lines: Option<Vec<OrderLineInput>>,
}

/// Body of `POST /purchase-orders/{id}/receive`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReceivePurchaseOrder {
    /// Account the generated payable will be settled from.
    pub account_id: Option<DbId>,
    /// Due date of the generated payable.
    pub due_date: Option<Date>,
}

/// Query filters for listing purchase orders.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PurchaseOrderFilter {
    pub status: Option<PurchaseOrderStatus>,
    /// Case-insensitive match on supplier name or order number.
    pub search: Option<String>,
}
