//! Permission documents for the seeded system roles.
//!
//! These are written to the `roles` table at startup so the code is the
//! single source of truth for what a system role may do.

use super::document::{ModulePermissions, RolePermissions};
use super::modules::{self, MODULES};
use crate::roles::{ROLE_ACCOUNTANT, ROLE_ADMIN, ROLE_EMPLOYEE, ROLE_MANAGER};

const VIEW_EXPORT: ModulePermissions = ModulePermissions {
    view: true,
    create: false,
    edit: false,
    delete: false,
    export: true,
};

/// Default document for a system role, or `None` for any other name.
pub fn default_permissions(role: &str) -> Option<RolePermissions> {
    let doc = match role {
        ROLE_ADMIN => MODULES.iter().fold(RolePermissions::default(), |doc, m| {
            doc.with_module(m.key, ModulePermissions::FULL)
        }),
        ROLE_MANAGER => RolePermissions::default()
            .with_module(modules::COMPANIES, ModulePermissions::READ_ONLY)
            .with_module(modules::USERS, ModulePermissions::READ_ONLY)
            .with_module(modules::ROLES, ModulePermissions::READ_ONLY)
            .with_module(modules::EMPLOYEES, ModulePermissions::MANAGE)
            .with_module(modules::CONTRACTS, ModulePermissions::MANAGE)
            .with_module(modules::ACCOUNTS, VIEW_EXPORT)
            .with_module(modules::TRANSACTIONS, VIEW_EXPORT)
            .with_module(modules::PURCHASE_ORDERS, ModulePermissions::MANAGE)
            .with_module(modules::PAYROLL, ModulePermissions::READ_ONLY)
            .with_module(modules::TASKS, ModulePermissions::FULL)
            .with_module(modules::TIME_ENTRIES, ModulePermissions::FULL),
        ROLE_ACCOUNTANT => RolePermissions::default()
            .with_module(modules::COMPANIES, ModulePermissions::READ_ONLY)
            .with_module(modules::EMPLOYEES, ModulePermissions::READ_ONLY)
            .with_module(modules::CONTRACTS, ModulePermissions::READ_ONLY)
            .with_module(modules::ACCOUNTS, ModulePermissions::FULL)
            .with_module(modules::TRANSACTIONS, ModulePermissions::FULL)
            .with_module(modules::PURCHASE_ORDERS, ModulePermissions::MANAGE)
            .with_module(modules::PAYROLL, ModulePermissions::FULL)
            .with_module(modules::TASKS, ModulePermissions::READ_ONLY)
            .with_module(
                modules::TIME_ENTRIES,
                ModulePermissions {
                    delete: false,
                    export: false,
                    ..ModulePermissions::FULL
                },
            ),
        ROLE_EMPLOYEE => RolePermissions::default()
            .with_module(modules::EMPLOYEES, ModulePermissions::READ_ONLY)
            .with_module(
                modules::TASKS,
                ModulePermissions {
                    edit: true,
                    ..ModulePermissions::READ_ONLY
                },
            )
            .with_module(
                modules::TIME_ENTRIES,
                ModulePermissions {
                    export: false,
                    ..ModulePermissions::FULL
                },
            )
            .with_route("GET", "/api/companies/current"),
        _ => return None,
    };
    Some(doc)
}
