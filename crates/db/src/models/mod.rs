//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` + `Validate` create DTO for inserts
//! - A `Deserialize` + `Validate` update DTO (all `Option` fields) for patches
//! - Where the resource is listed with filters, a `Deserialize` filter struct

pub mod account;
pub mod company;
pub mod contract;
pub mod employee;
pub mod payroll;
pub mod purchase_order;
pub mod role;
pub mod session;
pub mod task;
pub mod time_entry;
pub mod transaction;
pub mod user;
