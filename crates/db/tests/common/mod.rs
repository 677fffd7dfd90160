//! Shared fixtures for the repository integration tests.
//!
//! Each `#[sqlx::test]` gets a fresh database with the migrations applied,
//! so fixtures register their own companies instead of relying on seeds.

#![allow(dead_code)]

use chrono::NaiveDate;
use ledgerline_core::types::{DbId, Money};
use ledgerline_db::models::account::{Account, CreateAccount};
use ledgerline_db::models::company::{Company, CreateCompany};
use ledgerline_db::models::employee::{CreateEmployee, Employee};
use ledgerline_db::models::user::User;
use ledgerline_db::repositories::{AccountRepo, CompanyRepo, EmployeeRepo, NewAdmin};
use sqlx::PgPool;

/// Register a company whose admin is `<slug>-admin`.
pub async fn register_company(pool: &PgPool, slug: &str) -> (Company, User) {
    CompanyRepo::register(
        pool,
        &CreateCompany {
            name: format!("{slug} Ltd"),
            legal_name: None,
            tax_id: None,
            email: Some(format!("billing@{slug}.test")),
            currency: None,
        },
        &NewAdmin {
            username: format!("{slug}-admin"),
            email: format!("admin@{slug}.test"),
            password_hash: "not-a-real-hash".to_string(),
        },
    )
    .await
    .unwrap()
}

pub async fn create_account(pool: &PgPool, company_id: DbId, actor: DbId, name: &str) -> Account {
    AccountRepo::create(
        pool,
        company_id,
        &CreateAccount {
            name: name.to_string(),
            account_type: "bank".to_string(),
            currency: "USD".to_string(),
        },
        actor,
    )
    .await
    .unwrap()
}

pub async fn create_employee(
    pool: &PgPool,
    company_id: DbId,
    actor: DbId,
    email: &str,
    base_salary: Money,
) -> Employee {
    EmployeeRepo::create(
        pool,
        company_id,
        &CreateEmployee {
            first_name: "Ada".to_string(),
            last_name: email.split('@').next().unwrap_or("Worker").to_string(),
            email: email.to_string(),
            phone: None,
            position: None,
            department: None,
            hire_date: date(2025, 1, 6),
            base_salary,
            user_id: None,
        },
        actor,
    )
    .await
    .unwrap()
}

pub fn money(raw: &str) -> Money {
    raw.parse().unwrap()
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}
