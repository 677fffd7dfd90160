//! The per-role permissions document and its compiled form.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::modules::{is_known_module, Capability};
use super::pattern::RoutePattern;

/// Capability flags for one module. Missing flags deserialize as `false`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModulePermissions {
    pub view: bool,
    pub create: bool,
    pub edit: bool,
    pub delete: bool,
    pub export: bool,
}

impl ModulePermissions {
    pub const FULL: Self = Self {
        view: true,
        create: true,
        edit: true,
        delete: true,
        export: true,
    };

    pub const READ_ONLY: Self = Self {
        view: true,
        create: false,
        edit: false,
        delete: false,
        export: false,
    };

    /// Everything except delete.
    pub const MANAGE: Self = Self {
        view: true,
        create: true,
        edit: true,
        delete: false,
        export: true,
    };

    pub fn allows(&self, capability: Capability) -> bool {
        match capability {
            Capability::View => self.view,
            Capability::Create => self.create,
            Capability::Edit => self.edit,
            Capability::Delete => self.delete,
            Capability::Export => self.export,
        }
    }
}

/// An explicitly allowed method + pattern pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteRule {
    /// HTTP method, or `*` / `ANY` for every method.
    pub method: String,
    pub pattern: String,
}

/// The JSON document stored in `roles.permissions`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RolePermissions {
    pub modules: BTreeMap<String, ModulePermissions>,
    pub allowed_endpoints: Vec<String>,
    pub routes: Vec<RouteRule>,
}

const KNOWN_METHODS: [&str; 7] = ["GET", "POST", "PUT", "PATCH", "DELETE", "HEAD", "OPTIONS"];

impl RolePermissions {
    /// Parse a stored document.
    pub fn from_json(value: &serde_json::Value) -> Result<Self, serde_json::Error> {
        Self::deserialize(value)
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }

    /// Builder helper used by the default documents and tests.
    pub fn with_module(mut self, key: &str, flags: ModulePermissions) -> Self {
        self.modules.insert(key.to_string(), flags);
        self
    }

    pub fn with_endpoint(mut self, pattern: &str) -> Self {
        self.allowed_endpoints.push(pattern.to_string());
        self
    }

    pub fn with_route(mut self, method: &str, pattern: &str) -> Self {
        self.routes.push(RouteRule {
            method: method.to_string(),
            pattern: pattern.to_string(),
        });
        self
    }

    /// List every problem in the document: unknown modules, unknown methods
    /// and unparsable patterns. An empty list means the document is clean.
    pub fn problems(&self) -> Vec<String> {
        let mut problems = Vec::new();

        for key in self.modules.keys() {
            if !is_known_module(key) {
                problems.push(format!("unknown module '{key}'"));
            }
        }
        for pattern in &self.allowed_endpoints {
            if let Err(e) = RoutePattern::parse(pattern) {
                problems.push(e.to_string());
            }
        }
        for rule in &self.routes {
            if MethodMatcher::parse(&rule.method).is_none() {
                problems.push(format!("unknown HTTP method '{}'", rule.method));
            }
            if let Err(e) = RoutePattern::parse(&rule.pattern) {
                problems.push(e.to_string());
            }
        }

        problems
    }

    /// Compile the document for evaluation.
    ///
    /// Compilation is lenient: unknown modules are dropped and invalid
    /// patterns or methods are skipped, so a damaged document can only ever
    /// grant less. Use [`RolePermissions::problems`] to reject bad input
    /// before it is stored.
    pub fn compile(&self) -> CompiledPermissions {
        let modules = self
            .modules
            .iter()
            .filter(|(key, _)| is_known_module(key))
            .map(|(key, flags)| (key.clone(), *flags))
            .collect();

        let endpoints = self
            .allowed_endpoints
            .iter()
            .filter_map(|p| RoutePattern::parse(p).ok())
            .collect();

        let routes = self
            .routes
            .iter()
            .filter_map(|rule| {
                let method = MethodMatcher::parse(&rule.method)?;
                let pattern = RoutePattern::parse(&rule.pattern).ok()?;
                Some((method, pattern))
            })
            .collect();

        CompiledPermissions {
            modules,
            endpoints,
            routes,
        }
    }
}

/// Method side of a [`RouteRule`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MethodMatcher {
    Any,
    Exact(String),
}

impl MethodMatcher {
    fn parse(method: &str) -> Option<Self> {
        let upper = method.trim().to_ascii_uppercase();
        if upper == "*" || upper == "ANY" {
            Some(MethodMatcher::Any)
        } else if KNOWN_METHODS.contains(&upper.as_str()) {
            Some(MethodMatcher::Exact(upper))
        } else {
            None
        }
    }

    pub fn matches(&self, method: &str) -> bool {
        match self {
            MethodMatcher::Any => true,
            MethodMatcher::Exact(expected) => expected.eq_ignore_ascii_case(method),
        }
    }
}

/// A document ready for per-request evaluation.
#[derive(Debug, Clone, Default)]
pub struct CompiledPermissions {
    pub(crate) modules: BTreeMap<String, ModulePermissions>,
    pub(crate) endpoints: Vec<RoutePattern>,
    pub(crate) routes: Vec<(MethodMatcher, RoutePattern)>,
}

impl CompiledPermissions {
    /// Flags for a module; `None` when the module is not granted at all.
    pub fn module(&self, key: &str) -> Option<&ModulePermissions> {
        self.modules.get(key)
    }

    /// Number of usable endpoint patterns and route rules.
    pub fn rule_count(&self) -> usize {
        self.endpoints.len() + self.routes.len()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn parses_camel_case_document_with_missing_fields() {
        let doc = RolePermissions::from_json(&json!({
            "modules": { "employees": { "view": true, "export": true } },
            "allowedEndpoints": ["/api/tasks/*"]
        }))
        .unwrap();

        let flags = doc.modules["employees"];
        assert!(flags.view && flags.export);
        assert!(!flags.create && !flags.edit && !flags.delete);
        assert_eq!(doc.allowed_endpoints, vec!["/api/tasks/*"]);
        assert!(doc.routes.is_empty());
    }

    #[test]
    fn empty_object_is_an_empty_document() {
        let doc = RolePermissions::from_json(&json!({})).unwrap();
        assert_eq!(doc, RolePermissions::default());
    }

    #[test]
    fn wrong_shape_is_an_error() {
        assert!(RolePermissions::from_json(&json!({ "modules": ["employees"] })).is_err());
    }

    #[test]
    fn serializes_back_to_camel_case() {
        let doc = RolePermissions::default()
            .with_endpoint("/api/tasks/*")
            .with_route("POST", "/api/payrolls/{id}/approve");
        let value = doc.to_json();
        assert_eq!(value["allowedEndpoints"][0], "/api/tasks/*");
        assert_eq!(value["routes"][0]["method"], "POST");
    }

    #[test]
    fn problems_lists_every_defect() {
        let doc = RolePermissions::default()
            .with_module("warehouse", ModulePermissions::FULL)
            .with_endpoint("api/no-slash")
            .with_route("FETCH", "/api/tasks")
            .with_route("GET", "/api/**/x");
        let problems = doc.problems();
        assert_eq!(problems.len(), 4, "{problems:?}");
        assert!(problems[0].contains("warehouse"));
    }

    #[test]
    fn compile_skips_invalid_entries() {
        let doc = RolePermissions::default()
            .with_module("warehouse", ModulePermissions::FULL)
            .with_module("tasks", ModulePermissions::READ_ONLY)
            .with_endpoint("api/no-slash")
            .with_endpoint("/api/tasks/*")
            .with_route("FETCH", "/api/tasks")
            .with_route("any", "/api/time-entries/**");
        let compiled = doc.compile();
        assert!(compiled.module("warehouse").is_none());
        assert!(compiled.module("tasks").is_some());
        assert_eq!(compiled.rule_count(), 2);
    }

    #[test]
    fn method_matcher() {
        assert!(MethodMatcher::parse("*").unwrap().matches("DELETE"));
        assert!(MethodMatcher::parse("get").unwrap().matches("GET"));
        assert!(!MethodMatcher::parse("GET").unwrap().matches("POST"));
        assert!(MethodMatcher::parse("TRACE").is_none());
    }

    #[test]
    fn capability_flags() {
        assert!(ModulePermissions::MANAGE.allows(Capability::Export));
        assert!(!ModulePermissions::MANAGE.allows(Capability::Delete));
        assert!(!ModulePermissions::default().allows(Capability::View));
    }
}
