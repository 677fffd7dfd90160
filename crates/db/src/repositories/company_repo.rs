//! Repository for the `companies` table, including tenant registration.

use sqlx::PgPool;
use ledgerline_core::roles::ROLE_ADMIN;
use ledgerline_core::types::DbId;

use crate::models::company::{Company, CreateCompany, UpdateCompany};
use crate::models::user::User;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, legal_name, tax_id, email, phone, address, currency, \
                       created_by, updated_by, created_at, updated_at";

const USER_COLUMNS: &str = "id, company_id, role_id, username, email, password_hash, is_active, \
                            failed_login_count, locked_until, last_login_at, \
                            created_by, updated_by, created_at, updated_at";

/// The first administrator created alongside a new company.
#[derive(Debug)]
pub struct NewAdmin {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

/// Provides operations on companies.
pub struct CompanyRepo;

impl CompanyRepo {
    /// Create a company and its first admin user in a single transaction.
    ///
    /// The admin is recorded as the company's creator.
    pub async fn register(
        pool: &PgPool,
        company: &CreateCompany,
        admin: &NewAdmin,
    ) -> Result<(Company, User), sqlx::Error> {
        let mut tx = pool.begin().await?;

        let company_id: DbId = sqlx::query_scalar(
            "INSERT INTO companies (name, legal_name, tax_id, email, currency)
             VALUES ($1, $2, $3, $4, COALESCE($5, 'USD'))
             RETURNING id",
        )
        .bind(&company.name)
        .bind(&company.legal_name)
        .bind(&company.tax_id)
        .bind(&company.email)
        .bind(&company.currency)
        .fetch_one(&mut *tx)
        .await?;

        let admin_role_id: DbId =
            sqlx::query_scalar("SELECT id FROM roles WHERE company_id IS NULL AND name = $1")
                .bind(ROLE_ADMIN)
                .fetch_one(&mut *tx)
                .await?;

        let query = format!(
            "INSERT INTO users (company_id, role_id, username, email, password_hash)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {USER_COLUMNS}"
        );
        let user = sqlx::query_as::<_, User>(&query)
            .bind(company_id)
            .bind(admin_role_id)
            .bind(&admin.username)
            .bind(&admin.email)
            .bind(&admin.password_hash)
            .fetch_one(&mut *tx)
            .await?;

        let query = format!(
            "UPDATE companies SET created_by = $2, updated_by = $2
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let company = sqlx::query_as::<_, Company>(&query)
            .bind(company_id)
            .bind(user.id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok((company, user))
    }

    /// Find a company by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Company>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM companies WHERE id = $1");
        sqlx::query_as::<_, Company>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Update a company. Only non-`None` fields in `input` are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateCompany,
        actor: DbId,
    ) -> Result<Option<Company>, sqlx::Error> {
        let query = format!(
            "UPDATE companies SET
                name = COALESCE($2, name),
                legal_name = COALESCE($3, legal_name),
                tax_id = COALESCE($4, tax_id),
                email = COALESCE($5, email),
                phone = COALESCE($6, phone),
                address = COALESCE($7, address),
                currency = COALESCE($8, currency),
                updated_by = $9
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Company>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.legal_name)
            .bind(&input.tax_id)
            .bind(&input.email)
            .bind(&input.phone)
            .bind(&input.address)
            .bind(&input.currency)
            .bind(actor)
            .fetch_optional(pool)
            .await
    }
}
