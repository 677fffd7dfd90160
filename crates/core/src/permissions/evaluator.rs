//! Per-request allow/deny decision.

use std::fmt;

use super::document::CompiledPermissions;
use super::modules::{capability_for, module_for_path, Capability};
use super::pattern::normalize_path;
use crate::roles::ROLE_ADMIN;

/// Whether a role is a built-in system role or owned by a company.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleScope {
    System,
    Company,
}

/// Why a request was allowed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowReason {
    /// The caller holds the built-in administrator role.
    AdminBypass,
    /// A method-specific route rule matched.
    Route(String),
    /// An allowed-endpoint pattern matched.
    Endpoint(String),
    /// The module grants the capability the request exercises.
    Module {
        module: &'static str,
        capability: Capability,
    },
}

/// Why a request was denied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DenyReason {
    /// The role's permissions could not be loaded.
    NoPermissionData,
    /// The path does not belong to any known module and no pattern matched.
    UnknownModule,
    /// The module exists but the role was not granted the capability.
    MissingCapability {
        module: &'static str,
        capability: Capability,
    },
    /// The method does not map to any capability (e.g. `OPTIONS`).
    UnsupportedMethod,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow(AllowReason),
    Deny(DenyReason),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow(_))
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decision::Allow(AllowReason::AdminBypass) => f.write_str("allow: administrator"),
            Decision::Allow(AllowReason::Route(p)) => write!(f, "allow: route {p}"),
            Decision::Allow(AllowReason::Endpoint(p)) => write!(f, "allow: endpoint {p}"),
            Decision::Allow(AllowReason::Module { module, capability }) => {
                write!(f, "allow: {module}.{capability}")
            }
            Decision::Deny(DenyReason::NoPermissionData) => f.write_str("deny: no permission data"),
            Decision::Deny(DenyReason::UnknownModule) => f.write_str("deny: unknown module"),
            Decision::Deny(DenyReason::MissingCapability { module, capability }) => {
                write!(f, "deny: missing {module}.{capability}")
            }
            Decision::Deny(DenyReason::UnsupportedMethod) => f.write_str("deny: unsupported method"),
        }
    }
}

/// Decide whether `role` may call `method path`.
///
/// Order of evaluation:
///
/// 1. the system `admin` role bypasses every check; a company role never
///    does, whatever its name;
/// 2. no permission data means deny;
/// 3. method-specific route rules;
/// 4. allowed-endpoint patterns (any method);
/// 5. module capability flags; unknown modules are denied.
pub fn evaluate(
    role: &str,
    scope: RoleScope,
    permissions: Option<&CompiledPermissions>,
    method: &str,
    path: &str,
) -> Decision {
    if scope == RoleScope::System && role == ROLE_ADMIN {
        return Decision::Allow(AllowReason::AdminBypass);
    }

    let Some(permissions) = permissions else {
        return Decision::Deny(DenyReason::NoPermissionData);
    };

    let segments = normalize_path(path);

    if let Some((_, pattern)) = permissions
        .routes
        .iter()
        .find(|(m, pattern)| m.matches(method) && pattern.matches(&segments))
    {
        return Decision::Allow(AllowReason::Route(pattern.to_string()));
    }

    if let Some(pattern) = permissions.endpoints.iter().find(|p| p.matches(&segments)) {
        return Decision::Allow(AllowReason::Endpoint(pattern.to_string()));
    }

    let Some(module) = module_for_path(&segments) else {
        return Decision::Deny(DenyReason::UnknownModule);
    };
    let Some(capability) = capability_for(method, &segments) else {
        return Decision::Deny(DenyReason::UnsupportedMethod);
    };

    match permissions.module(module) {
        Some(flags) if flags.allows(capability) => {
            Decision::Allow(AllowReason::Module { module, capability })
        }
        _ => Decision::Deny(DenyReason::MissingCapability { module, capability }),
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::permissions::defaults::default_permissions;
    use crate::permissions::document::{ModulePermissions, RolePermissions};
    use crate::permissions::modules;
    use crate::roles::{ROLE_ACCOUNTANT, ROLE_EMPLOYEE, ROLE_MANAGER};

    fn compiled(role: &str) -> CompiledPermissions {
        default_permissions(role)
            .expect("system role has defaults")
            .compile()
    }

    fn allowed(role: &str, method: &str, path: &str) -> bool {
        let perms = compiled(role);
        evaluate(role, RoleScope::System, Some(&perms), method, path).is_allowed()
    }

    #[test]
    fn admin_bypasses_even_without_data() {
        assert_eq!(
            evaluate(ROLE_ADMIN, RoleScope::System, None, "DELETE", "/api/roles/3"),
            Decision::Allow(AllowReason::AdminBypass)
        );
    }

    #[test]
    fn company_role_named_admin_gets_no_bypass() {
        assert_eq!(
            evaluate(ROLE_ADMIN, RoleScope::Company, None, "DELETE", "/api/roles/3"),
            Decision::Deny(DenyReason::NoPermissionData)
        );
        let perms = RolePermissions::default().compile();
        assert!(
            !evaluate(ROLE_ADMIN, RoleScope::Company, Some(&perms), "GET", "/api/users")
                .is_allowed()
        );
    }

    #[test]
    fn missing_data_denies() {
        assert_eq!(
            evaluate(ROLE_MANAGER, RoleScope::System, None, "GET", "/api/tasks"),
            Decision::Deny(DenyReason::NoPermissionData)
        );
    }

    #[test]
    fn unknown_module_denied() {
        let perms = compiled(ROLE_MANAGER);
        assert_eq!(
            evaluate(ROLE_MANAGER, RoleScope::System, Some(&perms), "GET", "/api/warehouse"),
            Decision::Deny(DenyReason::UnknownModule)
        );
    }

    #[test]
    fn route_rule_requires_matching_method() {
        let perms = RolePermissions::default()
            .with_route("POST", "/api/payrolls/{id:int}/approve")
            .compile();
        assert_matches!(
            evaluate(
                "auditor",
                RoleScope::Company,
                Some(&perms),
                "POST",
                "/api/payrolls/9/approve"
            ),
            Decision::Allow(AllowReason::Route(p)) if p == "/api/payrolls/{id:int}/approve"
        );
        assert_matches!(
            evaluate(
                "auditor",
                RoleScope::Company,
                Some(&perms),
                "GET",
                "/api/payrolls/9/approve"
            ),
            Decision::Deny(DenyReason::MissingCapability { .. })
        );
    }

    #[test]
    fn endpoint_pattern_allows_any_method() {
        let perms = RolePermissions::default()
            .with_endpoint("/api/tasks/*")
            .compile();
        let helper = |method, path| {
            evaluate("helper", RoleScope::Company, Some(&perms), method, path).is_allowed()
        };
        assert!(helper("DELETE", "/api/tasks/4"));
        assert!(!helper("GET", "/api/tasks"));
    }

    #[test]
    fn module_capability_decides_when_no_pattern_matches() {
        let perms = RolePermissions::default()
            .with_module(modules::EMPLOYEES, ModulePermissions::READ_ONLY)
            .compile();
        assert_eq!(
            evaluate("viewer", RoleScope::Company, Some(&perms), "GET", "/api/employees?page=2"),
            Decision::Allow(AllowReason::Module {
                module: modules::EMPLOYEES,
                capability: Capability::View
            })
        );
        assert_eq!(
            evaluate("viewer", RoleScope::Company, Some(&perms), "GET", "/api/employees/export"),
            Decision::Deny(DenyReason::MissingCapability {
                module: modules::EMPLOYEES,
                capability: Capability::Export
            })
        );
        assert_eq!(
            evaluate("viewer", RoleScope::Company, Some(&perms), "OPTIONS", "/api/employees"),
            Decision::Deny(DenyReason::UnsupportedMethod)
        );
    }

    #[test]
    fn ungranted_module_is_no_access() {
        let perms = RolePermissions::default().compile();
        let decision = evaluate("nobody", RoleScope::Company, Some(&perms), "GET", "/api/tasks");
        assert!(!decision.is_allowed());
    }

    // -- default role matrix ------------------------------------------------

    #[test]
    fn manager_matrix() {
        assert!(allowed(ROLE_MANAGER, "GET", "/api/employees"));
        assert!(allowed(ROLE_MANAGER, "POST", "/api/employees"));
        assert!(allowed(ROLE_MANAGER, "GET", "/api/employees/export"));
        assert!(!allowed(ROLE_MANAGER, "DELETE", "/api/employees/3"));
        assert!(allowed(ROLE_MANAGER, "DELETE", "/api/tasks/3"));
        assert!(allowed(ROLE_MANAGER, "POST", "/api/purchase-orders/3/approve"));
        assert!(allowed(ROLE_MANAGER, "GET", "/api/roles"));
        assert!(!allowed(ROLE_MANAGER, "POST", "/api/roles"));
        assert!(!allowed(ROLE_MANAGER, "PUT", "/api/companies/current"));
    }

    #[test]
    fn accountant_matrix() {
        assert!(allowed(ROLE_ACCOUNTANT, "POST", "/api/transactions/5/pay"));
        assert!(allowed(ROLE_ACCOUNTANT, "POST", "/api/payrolls/generate"));
        assert!(allowed(ROLE_ACCOUNTANT, "DELETE", "/api/transactions/5"));
        assert!(allowed(ROLE_ACCOUNTANT, "GET", "/api/employees/2"));
        assert!(!allowed(ROLE_ACCOUNTANT, "PUT", "/api/employees/2"));
        assert!(!allowed(ROLE_ACCOUNTANT, "GET", "/api/users"));
        assert!(!allowed(ROLE_ACCOUNTANT, "POST", "/api/tasks"));
    }

    #[test]
    fn employee_matrix() {
        assert!(allowed(ROLE_EMPLOYEE, "GET", "/api/tasks"));
        assert!(allowed(ROLE_EMPLOYEE, "PATCH", "/api/tasks/8/status"));
        assert!(!allowed(ROLE_EMPLOYEE, "DELETE", "/api/tasks/8"));
        assert!(allowed(ROLE_EMPLOYEE, "POST", "/api/time-entries"));
        assert!(allowed(ROLE_EMPLOYEE, "POST", "/api/time-entries/4/stop"));
        assert!(allowed(ROLE_EMPLOYEE, "GET", "/api/companies/current"));
        assert!(!allowed(ROLE_EMPLOYEE, "GET", "/api/payrolls"));
        assert!(!allowed(ROLE_EMPLOYEE, "GET", "/api/transactions"));
        assert!(!allowed(ROLE_EMPLOYEE, "GET", "/api/accounts"));
    }

    #[test]
    fn decision_display() {
        let d = Decision::Deny(DenyReason::MissingCapability {
            module: modules::PAYROLL,
            capability: Capability::Delete,
        });
        assert_eq!(d.to_string(), "deny: missing payroll.delete");
    }
}
