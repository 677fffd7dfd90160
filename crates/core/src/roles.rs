//! Well-known system role names.
//!
//! These must match the seed rows in
//! `20260101000001_create_companies_roles_users.sql`. Custom roles created by
//! a company may not reuse any of these names.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_MANAGER: &str = "manager";
pub const ROLE_ACCOUNTANT: &str = "accountant";
pub const ROLE_EMPLOYEE: &str = "employee";

/// Every system role, in seed order.
pub const SYSTEM_ROLES: [&str; 4] = [ROLE_ADMIN, ROLE_MANAGER, ROLE_ACCOUNTANT, ROLE_EMPLOYEE];

/// Whether `name` collides with a system role (case-insensitive).
pub fn is_reserved_name(name: &str) -> bool {
    SYSTEM_ROLES
        .iter()
        .any(|role| role.eq_ignore_ascii_case(name.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserved_names_are_case_insensitive() {
        assert!(is_reserved_name("Admin"));
        assert!(is_reserved_name(" accountant "));
        assert!(!is_reserved_name("warehouse"));
    }
}
