//! Employee entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;
use ledgerline_core::lifecycle::EmployeeStatus;
use ledgerline_core::types::{Date, DbId, Money, Timestamp};
use ledgerline_core::validation::{non_negative_amount, not_blank};

/// A row from the `employees` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Employee {
    pub id: DbId,
    pub company_id: DbId,
    pub user_id: Option<DbId>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub position: Option<String>,
    pub department: Option<String>,
    pub hire_date: Date,
    pub termination_date: Option<Date>,
    pub base_salary: Money,
    #[sqlx(rename = "status_id", try_from = "i16")]
    pub status: EmployeeStatus,
    pub created_by: Option<DbId>,
    pub updated_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Employee {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// DTO for creating a new employee.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateEmployee {
    #[validate(length(min = 1, max = 100), custom(function = "not_blank"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100), custom(function = "not_blank"))]
    pub last_name: String,
    #[validate(email(message = "must be a valid email"))]
    pub email: String,
    #[validate(length(max = 50))]
    pub phone: Option<String>,
    #[validate(length(max = 100))]
    pub position: Option<String>,
    #[validate(length(max = 100))]
    pub department: Option<String>,
    pub hire_date: Date,
    #[validate(custom(function = "non_negative_amount"))]
    pub base_salary: Money,
    /// Optional link to a login of the same company.
    pub user_id: Option<DbId>,
}

/// DTO for updating an existing employee. All fields are optional.
///
/// Moving to `terminated` requires a `termination_date` (here or already
/// stored) that is not before the hire date.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateEmployee {
    #[validate(length(min = 1, max = 100), custom(function = "not_blank"))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 100), custom(function = "not_blank"))]
    pub last_name: Option<String>,
    #[validate(email(message = "must be a valid email"))]
    pub email: Option<String>,
    #[validate(length(max = 50))]
    pub phone: Option<String>,
    #[validate(length(max = 100))]
    pub position: Option<String>,
    #[validate(length(max = 100))]
    pub department: Option<String>,
    pub hire_date: Option<Date>,
    pub termination_date: Option<Date>,
    #[validate(custom(function = "non_negative_amount"))]
    pub base_salary: Option<Money>,
    pub status: Option<EmployeeStatus>,
    pub user_id: Option<DbId>,
}

/// Query filters for listing employees.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EmployeeFilter {
    pub status: Option<EmployeeStatus>,
    pub department: Option<String>,
    /// Case-insensitive match on first name, last name or email.
    pub search: Option<String>,
}
