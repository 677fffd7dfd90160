//! Integration tests for the money-moving workflows.
//!
//! Verifies against a real database that:
//! - Paying a receivable credits the account and paying a payable debits it
//! - Paying into an inactive account changes nothing
//! - Receiving a purchase order raises one pending payable for the order total
//! - Payroll generation is idempotent for a period
//! - Paying a payroll debits the account and records a paid payable

mod common;

use common::{create_account, create_employee, date, money, register_company};
use ledgerline_core::finance::price_order_lines;
use ledgerline_core::lifecycle::{
    PayrollStatus, PurchaseOrderStatus, TransactionKind, TransactionStatus,
};
use ledgerline_core::types::{DbId, Money};
use ledgerline_db::models::account::UpdateAccount;
use ledgerline_db::models::purchase_order::{CreatePurchaseOrder, OrderLineInput};
use ledgerline_db::models::transaction::{CreateTransaction, FinancialTransaction};
use ledgerline_db::repositories::{
    AccountRepo, PayOutcome, PayrollPayment, PayrollRepo, PurchaseOrderRepo, TransactionRepo,
};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn pending(
    pool: &PgPool,
    company_id: DbId,
    actor: DbId,
    kind: TransactionKind,
    amount: &str,
) -> FinancialTransaction {
    TransactionRepo::create(
        pool,
        company_id,
        &CreateTransaction {
            kind,
            account_id: None,
            counterparty: "Initech".to_string(),
            description: None,
            reference: None,
            amount: money(amount),
            due_date: Some(date(2026, 3, 31)),
        },
        actor,
    )
    .await
    .unwrap()
}

async fn balance_of(pool: &PgPool, company_id: DbId, account_id: DbId) -> Money {
    AccountRepo::find_by_id(pool, company_id, account_id)
        .await
        .unwrap()
        .unwrap()
        .balance
}

fn line(description: &str, quantity: &str, unit_price: &str) -> OrderLineInput {
    OrderLineInput {
        description: description.to_string(),
        quantity: money(quantity),
        unit_price: money(unit_price),
    }
}

// ---------------------------------------------------------------------------
// Test: paying transactions moves the account balance
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_pay_receivable_credits_and_payable_debits(pool: PgPool) {
    let (acme, admin) = register_company(&pool, "acme").await;
    let account = create_account(&pool, acme.id, admin.id, "Operating").await;

    let receivable = pending(&pool, acme.id, admin.id, TransactionKind::Receivable, "250.00").await;
    let payable = pending(&pool, acme.id, admin.id, TransactionKind::Payable, "100.50").await;

    match TransactionRepo::pay(&pool, acme.id, receivable.id, account.id, admin.id)
        .await
        .unwrap()
    {
        PayOutcome::Paid(tx) => {
            assert_eq!(tx.status, TransactionStatus::Paid);
            assert_eq!(tx.account_id, Some(account.id));
            assert!(tx.paid_at.is_some());
        }
        other => panic!("expected Paid, got {other:?}"),
    }
    assert_eq!(balance_of(&pool, acme.id, account.id).await, money("250.00"));

    assert!(matches!(
        TransactionRepo::pay(&pool, acme.id, payable.id, account.id, admin.id)
            .await
            .unwrap(),
        PayOutcome::Paid(_)
    ));
    assert_eq!(balance_of(&pool, acme.id, account.id).await, money("149.50"));

    // Paying twice is refused and the balance stays put.
    assert!(matches!(
        TransactionRepo::pay(&pool, acme.id, payable.id, account.id, admin.id)
            .await
            .unwrap(),
        PayOutcome::NotPending
    ));
    assert_eq!(balance_of(&pool, acme.id, account.id).await, money("149.50"));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_pay_into_inactive_account_rolls_back(pool: PgPool) {
    let (acme, admin) = register_company(&pool, "acme").await;
    let account = create_account(&pool, acme.id, admin.id, "Dormant").await;
    AccountRepo::update(
        &pool,
        acme.id,
        account.id,
        &UpdateAccount {
            name: None,
            account_type: None,
            is_active: Some(false),
        },
        admin.id,
    )
    .await
    .unwrap();
    let receivable = pending(&pool, acme.id, admin.id, TransactionKind::Receivable, "20.00").await;

    assert!(matches!(
        TransactionRepo::pay(&pool, acme.id, receivable.id, account.id, admin.id)
            .await
            .unwrap(),
        PayOutcome::AccountUnavailable
    ));

    let reloaded = TransactionRepo::find_by_id(&pool, acme.id, receivable.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reloaded.status, TransactionStatus::Pending, "status update is rolled back");
    assert_eq!(balance_of(&pool, acme.id, account.id).await, money("0"));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_pay_with_another_companys_account_is_unavailable(pool: PgPool) {
    let (acme, admin) = register_company(&pool, "acme").await;
    let (globex, globex_admin) = register_company(&pool, "globex").await;
    let foreign = create_account(&pool, globex.id, globex_admin.id, "Operating").await;
    let receivable = pending(&pool, acme.id, admin.id, TransactionKind::Receivable, "5.00").await;

    assert!(matches!(
        TransactionRepo::pay(&pool, acme.id, receivable.id, foreign.id, admin.id)
            .await
            .unwrap(),
        PayOutcome::AccountUnavailable
    ));
    assert_eq!(balance_of(&pool, globex.id, foreign.id).await, money("0"));
}

// ---------------------------------------------------------------------------
// Test: purchase order receipt
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_receive_raises_pending_payable_for_order_total(pool: PgPool) {
    let (acme, admin) = register_company(&pool, "acme").await;
    let input = CreatePurchaseOrder {
        supplier_name: "Paper Supply Co".to_string(),
        supplier_email: None,
        order_date: date(2026, 2, 1),
        expected_date: None,
        notes: None,
        lines: vec![line("Paper", "3", "1.335"), line("Toner", "1", "10")],
    };
    let priced =
        price_order_lines(input.lines.iter().map(|l| (&l.quantity, &l.unit_price))).unwrap();

    let detail = PurchaseOrderRepo::create(&pool, acme.id, &input, &priced, admin.id)
        .await
        .unwrap();
    assert_eq!(detail.order.number, "PO-000001");
    assert_eq!(detail.order.total, money("14.01"));
    assert_eq!(detail.lines.len(), 2);
    assert_eq!(detail.lines[0].line_total, money("4.01"));

    // Only approved orders can be received.
    assert!(
        PurchaseOrderRepo::receive(&pool, acme.id, detail.order.id, None, None, admin.id)
            .await
            .unwrap()
            .is_none()
    );

    let order_id = detail.order.id;
    for (from, to) in [
        (PurchaseOrderStatus::Draft, PurchaseOrderStatus::Submitted),
        (PurchaseOrderStatus::Submitted, PurchaseOrderStatus::Approved),
    ] {
        PurchaseOrderRepo::transition(&pool, acme.id, order_id, from, to, admin.id)
            .await
            .unwrap()
            .expect("transition should apply");
    }

    let received = PurchaseOrderRepo::receive(
        &pool,
        acme.id,
        order_id,
        None,
        Some(date(2026, 3, 1)),
        admin.id,
    )
    .await
    .unwrap()
    .expect("approved order should be received");

    assert_eq!(received.order.status, PurchaseOrderStatus::Received);
    assert!(received.order.received_at.is_some());
    assert_eq!(received.payable.kind, TransactionKind::Payable);
    assert_eq!(received.payable.status, TransactionStatus::Pending);
    assert_eq!(received.payable.amount, money("14.01"));
    assert_eq!(received.payable.purchase_order_id, Some(order_id));
    assert_eq!(received.payable.counterparty, "Paper Supply Co");
    assert_eq!(received.payable.due_date, Some(date(2026, 3, 1)));

    // A second receipt is refused and raises nothing.
    assert!(
        PurchaseOrderRepo::receive(&pool, acme.id, order_id, None, None, admin.id)
            .await
            .unwrap()
            .is_none()
    );
    let payables: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM financial_transactions WHERE purchase_order_id = $1",
    )
    .bind(order_id)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(payables, 1);
}

// ---------------------------------------------------------------------------
// Test: payroll generation and payment
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_generate_is_idempotent_for_a_period(pool: PgPool) {
    let (acme, admin) = register_company(&pool, "acme").await;
    create_employee(&pool, acme.id, admin.id, "ada@acme.test", money("4000")).await;
    create_employee(&pool, acme.id, admin.id, "bob@acme.test", money("3500.50")).await;
    let (start, end) = (date(2026, 1, 1), date(2026, 1, 31));

    let first = PayrollRepo::generate(&pool, acme.id, start, end, admin.id)
        .await
        .unwrap();
    assert_eq!(first.created.len(), 2);
    assert_eq!(first.skipped, 0);
    assert!(first.created.iter().all(|p| p.status == PayrollStatus::Draft));
    assert!(first.created.iter().any(|p| p.net_pay == money("3500.50")));

    let second = PayrollRepo::generate(&pool, acme.id, start, end, admin.id)
        .await
        .unwrap();
    assert!(second.created.is_empty());
    assert_eq!(second.skipped, 2);

    // A different period is a fresh run.
    let next =
        PayrollRepo::generate(&pool, acme.id, date(2026, 2, 1), date(2026, 2, 28), admin.id)
            .await
            .unwrap();
    assert_eq!(next.created.len(), 2);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_pay_payroll_debits_account_and_records_payable(pool: PgPool) {
    let (acme, admin) = register_company(&pool, "acme").await;
    let account = create_account(&pool, acme.id, admin.id, "Payroll").await;
    create_employee(&pool, acme.id, admin.id, "ada@acme.test", money("4000")).await;

    let generated =
        PayrollRepo::generate(&pool, acme.id, date(2026, 1, 1), date(2026, 1, 31), admin.id)
            .await
            .unwrap();
    let payroll = &generated.created[0];

    // Drafts must be approved first.
    assert!(matches!(
        PayrollRepo::pay(&pool, acme.id, payroll.id, account.id, "Ada", admin.id)
            .await
            .unwrap(),
        PayrollPayment::NotApproved
    ));

    PayrollRepo::approve(&pool, acme.id, payroll.id, admin.id)
        .await
        .unwrap()
        .expect("draft should approve");

    match PayrollRepo::pay(&pool, acme.id, payroll.id, account.id, "Ada", admin.id)
        .await
        .unwrap()
    {
        PayrollPayment::Paid {
            payroll,
            transaction,
        } => {
            assert_eq!(payroll.status, PayrollStatus::Paid);
            let transaction = transaction.expect("non-zero net pay records a payable");
            assert_eq!(transaction.kind, TransactionKind::Payable);
            assert_eq!(transaction.status, TransactionStatus::Paid);
            assert_eq!(transaction.amount, money("4000"));
            assert_eq!(transaction.payroll_id, Some(payroll.id));
            assert_eq!(transaction.account_id, Some(account.id));
        }
        other => panic!("expected Paid, got {other:?}"),
    }
    assert_eq!(balance_of(&pool, acme.id, account.id).await, money("-4000"));

    assert!(matches!(
        PayrollRepo::pay(&pool, acme.id, payroll.id, account.id, "Ada", admin.id)
            .await
            .unwrap(),
        PayrollPayment::NotApproved
    ));
    assert_eq!(balance_of(&pool, acme.id, account.id).await, money("-4000"));
}
