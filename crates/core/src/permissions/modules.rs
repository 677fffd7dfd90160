//! Module catalogue and request-to-capability mapping.

use serde::Serialize;

/// One permission area of the application.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ModuleInfo {
    /// Key used in the permissions document (`"purchase_orders"`).
    pub key: &'static str,
    /// First path segment after `/api` (`"purchase-orders"`).
    pub path_segment: &'static str,
    /// Display label for role editors.
    pub label: &'static str,
}

pub const COMPANIES: &str = "companies";
pub const USERS: &str = "users";
pub const ROLES: &str = "roles";
pub const EMPLOYEES: &str = "employees";
pub const CONTRACTS: &str = "contracts";
pub const ACCOUNTS: &str = "accounts";
pub const TRANSACTIONS: &str = "transactions";
pub const PURCHASE_ORDERS: &str = "purchase_orders";
pub const PAYROLL: &str = "payroll";
pub const TASKS: &str = "tasks";
pub const TIME_ENTRIES: &str = "time_entries";

/// Every module that can appear in a permissions document.
pub const MODULES: &[ModuleInfo] = &[
    ModuleInfo { key: COMPANIES, path_segment: "companies", label: "Company profile" },
    ModuleInfo { key: USERS, path_segment: "users", label: "Users" },
    ModuleInfo { key: ROLES, path_segment: "roles", label: "Roles" },
    ModuleInfo { key: EMPLOYEES, path_segment: "employees", label: "Employees" },
    ModuleInfo { key: CONTRACTS, path_segment: "contracts", label: "Contracts" },
    ModuleInfo { key: ACCOUNTS, path_segment: "accounts", label: "Accounts" },
    ModuleInfo { key: TRANSACTIONS, path_segment: "transactions", label: "Payables & receivables" },
    ModuleInfo { key: PURCHASE_ORDERS, path_segment: "purchase-orders", label: "Purchase orders" },
    ModuleInfo { key: PAYROLL, path_segment: "payrolls", label: "Payroll" },
    ModuleInfo { key: TASKS, path_segment: "tasks", label: "Tasks" },
    ModuleInfo { key: TIME_ENTRIES, path_segment: "time-entries", label: "Time tracking" },
];

/// An action on a module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Capability {
    View,
    Create,
    Edit,
    Delete,
    Export,
}

impl Capability {
    pub const ALL: [Capability; 5] = [
        Capability::View,
        Capability::Create,
        Capability::Edit,
        Capability::Delete,
        Capability::Export,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Capability::View => "view",
            Capability::Create => "create",
            Capability::Edit => "edit",
            Capability::Delete => "delete",
            Capability::Export => "export",
        }
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Whether `key` names a known module.
pub fn is_known_module(key: &str) -> bool {
    MODULES.iter().any(|m| m.key == key)
}

/// Resolve the module addressed by a normalized path (`["api", "payrolls", ..]`).
///
/// Returns `None` for paths outside `/api/<module>` or for unknown modules.
pub fn module_for_path(segments: &[String]) -> Option<&'static str> {
    match segments {
        [api, resource, ..] if api == "api" => MODULES
            .iter()
            .find(|m| m.path_segment == resource.as_str())
            .map(|m| m.key),
        _ => None,
    }
}

/// Map an HTTP method and normalized path to the capability it exercises.
///
/// - `GET`/`HEAD` is `view`, or `export` when the last segment is `export`.
/// - `POST` on the collection or a collection action (`/api/payrolls/generate`)
///   is `create`; `POST` on a record action (`/api/payrolls/7/approve`) is `edit`.
/// - `PUT`/`PATCH` is `edit`, `DELETE` is `delete`.
/// - Anything else maps to no capability.
pub fn capability_for(method: &str, segments: &[String]) -> Option<Capability> {
    let method = method.to_ascii_uppercase();
    match method.as_str() {
        "GET" | "HEAD" => {
            if segments.len() > 2 && segments.last().is_some_and(|s| s == "export") {
                Some(Capability::Export)
            } else {
                Some(Capability::View)
            }
        }
        "POST" => match segments.get(2) {
            Some(record) if segments.len() > 3 || is_record_id(record) => Some(Capability::Edit),
            _ => Some(Capability::Create),
        },
        "PUT" | "PATCH" => Some(Capability::Edit),
        "DELETE" => Some(Capability::Delete),
        _ => None,
    }
}

fn is_record_id(segment: &str) -> bool {
    !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit())
}
