//! Repository for `purchase_orders` and `purchase_order_lines`.
//!
//! Header and lines are always written together in one transaction. Line
//! totals and the order total come in as [`PricedLines`], computed and
//! bounds-checked by `ledgerline_core::finance::price_order_lines`.

use sqlx::PgPool;
use ledgerline_core::finance::{purchase_order_number, PricedLines};
use ledgerline_core::lifecycle::{PurchaseOrderStatus, TransactionKind, TransactionStatus};
use ledgerline_core::pagination::{Page, PageRequest};
use ledgerline_core::types::{Date, DbId};

use crate::models::purchase_order::{
    CreatePurchaseOrder, OrderLineInput, PurchaseOrder, PurchaseOrderDetail, PurchaseOrderFilter,
    PurchaseOrderLine, UpdatePurchaseOrder,
};
use crate::models::transaction::FinancialTransaction;
use crate::repositories::transaction_repo::{insert_in_tx, NewTransaction};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, company_id, number, supplier_name, supplier_email, order_date, \
                       expected_date, status_id, total, notes, submitted_at, approved_at, \
                       approved_by, received_at, created_by, updated_by, created_at, updated_at";

const LINE_COLUMNS: &str =
    "id, purchase_order_id, line_no, description, quantity, unit_price, line_total";

/// List predicate; `$1` company, `$2` status, `$3` search.
const FILTER: &str = "company_id = $1
    AND ($2::SMALLINT IS NULL OR status_id = $2)
    AND ($3::TEXT IS NULL OR supplier_name ILIKE '%' || $3 || '%' OR number ILIKE '%' || $3 || '%')";

async fn insert_lines(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    order_id: DbId,
    lines: &[OrderLineInput],
    priced: &PricedLines,
) -> Result<Vec<PurchaseOrderLine>, sqlx::Error> {
    let query = format!(
        "INSERT INTO purchase_order_lines
            (purchase_order_id, line_no, description, quantity, unit_price, line_total)
         VALUES ($1, $2, $3, $4, $5, $6)
         RETURNING {LINE_COLUMNS}"
    );
    let mut inserted = Vec::with_capacity(lines.len());
    for (index, (line, total)) in lines.iter().zip(&priced.line_totals).enumerate() {
        let row = sqlx::query_as::<_, PurchaseOrderLine>(&query)
            .bind(order_id)
            .bind(index as i32 + 1)
            .bind(line.description.trim())
            .bind(line.quantity)
            .bind(line.unit_price)
            .bind(*total)
            .fetch_one(&mut **tx)
            .await?;
        inserted.push(row);
    }
    Ok(inserted)
}

/// Outcome of [`PurchaseOrderRepo::receive`].
#[derive(Debug)]
pub struct ReceivedOrder {
    pub order: PurchaseOrder,
    pub payable: FinancialTransaction,
}

/// Provides CRUD and workflow operations for purchase orders.
pub struct PurchaseOrderRepo;

impl PurchaseOrderRepo {
    /// Insert a draft order with its lines and a generated number.
    ///
    /// The company row is locked while the next sequence is picked so two
    /// concurrent creates cannot take the same number.
    pub async fn create(
        pool: &PgPool,
        company_id: DbId,
        input: &CreatePurchaseOrder,
        priced: &PricedLines,
        actor: DbId,
    ) -> Result<PurchaseOrderDetail, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("SELECT id FROM companies WHERE id = $1 FOR UPDATE")
            .bind(company_id)
            .fetch_one(&mut *tx)
            .await?;
        let sequence: i64 = sqlx::query_scalar(
            "SELECT COALESCE(MAX(sequence), 0) + 1 FROM purchase_orders WHERE company_id = $1",
        )
        .bind(company_id)
        .fetch_one(&mut *tx)
        .await?;

        let query = format!(
            "INSERT INTO purchase_orders
                (company_id, sequence, number, supplier_name, supplier_email, order_date,
                 expected_date, status_id, total, notes, created_by, updated_by)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $11)
             RETURNING {COLUMNS}"
        );
        let order = sqlx::query_as::<_, PurchaseOrder>(&query)
            .bind(company_id)
            .bind(sequence)
            .bind(purchase_order_number(sequence))
            .bind(input.supplier_name.trim())
            .bind(&input.supplier_email)
            .bind(input.order_date)
            .bind(input.expected_date)
            .bind(PurchaseOrderStatus::Draft.id())
            .bind(priced.total)
            .bind(&input.notes)
            .bind(actor)
            .fetch_one(&mut *tx)
            .await?;

        let lines = insert_lines(&mut tx, order.id, &input.lines, priced).await?;

        tx.commit().await?;
        Ok(PurchaseOrderDetail { order, lines })
    }

    /// Find an order header by ID within a company.
    pub async fn find_by_id(
        pool: &PgPool,
        company_id: DbId,
        id: DbId,
    ) -> Result<Option<PurchaseOrder>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM purchase_orders WHERE company_id = $1 AND id = $2");
        sqlx::query_as::<_, PurchaseOrder>(&query)
            .bind(company_id)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Lines of an order in line-number order.
    pub async fn find_lines(
        pool: &PgPool,
        order_id: DbId,
    ) -> Result<Vec<PurchaseOrderLine>, sqlx::Error> {
        let query = format!(
            "SELECT {LINE_COLUMNS} FROM purchase_order_lines
             WHERE purchase_order_id = $1 ORDER BY line_no ASC"
        );
        sqlx::query_as::<_, PurchaseOrderLine>(&query)
            .bind(order_id)
            .fetch_all(pool)
            .await
    }

    /// Header plus lines.
    pub async fn find_detail(
        pool: &PgPool,
        company_id: DbId,
        id: DbId,
    ) -> Result<Option<PurchaseOrderDetail>, sqlx::Error> {
        let Some(order) = Self::find_by_id(pool, company_id, id).await? else {
            return Ok(None);
        };
        let lines = Self::find_lines(pool, order.id).await?;
        Ok(Some(PurchaseOrderDetail { order, lines }))
    }

    /// List order headers, newest order date first.
    pub async fn list(
        pool: &PgPool,
        company_id: DbId,
        filter: &PurchaseOrderFilter,
        page: PageRequest,
    ) -> Result<Page<PurchaseOrder>, sqlx::Error> {
        let count_query = format!("SELECT COUNT(*) FROM purchase_orders WHERE {FILTER}");
        let total: i64 = sqlx::query_scalar(&count_query)
            .bind(company_id)
            .bind(filter.status.map(PurchaseOrderStatus::id))
            .bind(&filter.search)
            .fetch_one(pool)
            .await?;

        let query = format!(
            "SELECT {COLUMNS} FROM purchase_orders WHERE {FILTER}
             ORDER BY order_date DESC, sequence DESC
             LIMIT $4 OFFSET $5"
        );
        let items = sqlx::query_as::<_, PurchaseOrder>(&query)
            .bind(company_id)
            .bind(filter.status.map(PurchaseOrderStatus::id))
            .bind(&filter.search)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(pool)
            .await?;

        Ok(Page::new(items, page, total))
    }

    /// Update a draft order. When `lines` is present they replace the
    /// existing lines and the total is taken from `priced`.
    ///
    /// Returns `None` if the order does not exist or is no longer a draft.
    pub async fn update_draft(
        pool: &PgPool,
        company_id: DbId,
        id: DbId,
        input: &UpdatePurchaseOrder,
        priced: Option<&PricedLines>,
        actor: DbId,
    ) -> Result<Option<PurchaseOrderDetail>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let new_total = priced.map(|p| p.total);
        let query = format!(
            "UPDATE purchase_orders SET
                supplier_name = COALESCE($4, supplier_name),
                supplier_email = COALESCE($5, supplier_email),
                order_date = COALESCE($6, order_date),
                expected_date = COALESCE($7, expected_date),
                notes = COALESCE($8, notes),
                total = COALESCE($9, total),
                updated_by = $10
             WHERE company_id = $1 AND id = $2 AND status_id = $3
             RETURNING {COLUMNS}"
        );
        let order = sqlx::query_as::<_, PurchaseOrder>(&query)
            .bind(company_id)
            .bind(id)
            .bind(PurchaseOrderStatus::Draft.id())
            .bind(input.supplier_name.as_deref().map(str::trim))
            .bind(&input.supplier_email)
            .bind(input.order_date)
            .bind(input.expected_date)
            .bind(&input.notes)
            .bind(new_total)
            .bind(actor)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(order) = order else {
            tx.rollback().await?;
            return Ok(None);
        };

        let lines = match (&input.lines, priced) {
            (Some(lines), Some(priced)) => {
                sqlx::query("DELETE FROM purchase_order_lines WHERE purchase_order_id = $1")
                    .bind(order.id)
                    .execute(&mut *tx)
                    .await?;
                insert_lines(&mut tx, order.id, lines, priced).await?
            }
            _ => {
                let query = format!(
                    "SELECT {LINE_COLUMNS} FROM purchase_order_lines
                     WHERE purchase_order_id = $1 ORDER BY line_no ASC"
                );
                sqlx::query_as::<_, PurchaseOrderLine>(&query)
                    .bind(order.id)
                    .fetch_all(&mut *tx)
                    .await?
            }
        };

        tx.commit().await?;
        Ok(Some(PurchaseOrderDetail { order, lines }))
    }

    /// Move an order from `from` to `to`, stamping the matching timestamp.
    ///
    /// Returns `None` when the stored status is no longer `from`.
    pub async fn transition(
        pool: &PgPool,
        company_id: DbId,
        id: DbId,
        from: PurchaseOrderStatus,
        to: PurchaseOrderStatus,
        actor: DbId,
    ) -> Result<Option<PurchaseOrder>, sqlx::Error> {
        let query = format!(
            "UPDATE purchase_orders SET
                status_id = $4,
                submitted_at = CASE WHEN $4 = $6 THEN NOW() ELSE submitted_at END,
                approved_at = CASE WHEN $4 = $7 THEN NOW() ELSE approved_at END,
                approved_by = CASE WHEN $4 = $7 THEN $5 ELSE approved_by END,
                updated_by = $5
             WHERE company_id = $1 AND id = $2 AND status_id = $3
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PurchaseOrder>(&query)
            .bind(company_id)
            .bind(id)
            .bind(from.id())
            .bind(to.id())
            .bind(actor)
            .bind(PurchaseOrderStatus::Submitted.id())
            .bind(PurchaseOrderStatus::Approved.id())
            .fetch_optional(pool)
            .await
    }

    /// Mark an approved order received and raise a pending payable for its
    /// total, in one transaction.
    ///
    /// Returns `None` when the order is not in `approved` status.
    pub async fn receive(
        pool: &PgPool,
        company_id: DbId,
        id: DbId,
        account_id: Option<DbId>,
        due_date: Option<Date>,
        actor: DbId,
    ) -> Result<Option<ReceivedOrder>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE purchase_orders SET status_id = $4, received_at = NOW(), updated_by = $5
             WHERE company_id = $1 AND id = $2 AND status_id = $3
             RETURNING {COLUMNS}"
        );
        let order = sqlx::query_as::<_, PurchaseOrder>(&query)
            .bind(company_id)
            .bind(id)
            .bind(PurchaseOrderStatus::Approved.id())
            .bind(PurchaseOrderStatus::Received.id())
            .bind(actor)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(order) = order else {
            tx.rollback().await?;
            return Ok(None);
        };

        let payable = insert_in_tx(
            &mut tx,
            company_id,
            &NewTransaction {
                kind: TransactionKind::Payable,
                status: TransactionStatus::Pending,
                account_id,
                counterparty: order.supplier_name.clone(),
                description: Some(format!("Purchase order {}", order.number)),
                reference: Some(order.number.clone()),
                amount: order.total,
                due_date,
                purchase_order_id: Some(order.id),
                payroll_id: None,
            },
            actor,
        )
        .await?;

        tx.commit().await?;
        Ok(Some(ReceivedOrder { order, payable }))
    }

    /// Delete an order in `draft` or `cancelled` status, with its lines.
    pub async fn delete(pool: &PgPool, company_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM purchase_orders
             WHERE company_id = $1 AND id = $2 AND status_id IN ($3, $4)",
        )
        .bind(company_id)
        .bind(id)
        .bind(PurchaseOrderStatus::Draft.id())
        .bind(PurchaseOrderStatus::Cancelled.id())
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
