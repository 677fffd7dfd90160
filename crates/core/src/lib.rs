//! Domain rules for Ledgerline.
//!
//! Nothing in this crate performs I/O. The database and HTTP layers call into
//! it for identifiers, error kinds, the role permission model, lifecycle
//! transitions and money arithmetic.

pub mod error;
pub mod export;
pub mod finance;
pub mod lifecycle;
pub mod pagination;
pub mod payroll;
pub mod permissions;
pub mod roles;
pub mod time_tracking;
pub mod types;
pub mod validation;
