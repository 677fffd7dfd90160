//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that accept
//! `&PgPool` as the first argument. Tenant-owned tables take the caller's
//! `company_id` on every call; writes also take the acting user id, which is
//! stored in `created_by` / `updated_by`.

pub mod account_repo;
pub mod company_repo;
pub mod contract_repo;
pub mod employee_repo;
pub mod payroll_repo;
pub mod purchase_order_repo;
pub mod role_repo;
pub mod session_repo;
pub mod task_repo;
pub mod time_entry_repo;
pub mod transaction_repo;
pub mod user_repo;

pub use account_repo::AccountRepo;
pub use company_repo::{CompanyRepo, NewAdmin};
pub use contract_repo::ContractRepo;
pub use employee_repo::EmployeeRepo;
pub use payroll_repo::{PayrollPayment, PayrollRepo};
pub use purchase_order_repo::{PurchaseOrderRepo, ReceivedOrder};
pub use role_repo::RoleRepo;
pub use session_repo::SessionRepo;
pub use task_repo::TaskRepo;
pub use time_entry_repo::{TimeEntryRepo, TimeEntryValues};
pub use transaction_repo::{NewTransaction, PayOutcome, TransactionRepo};
pub use user_repo::UserRepo;
