//! Role-based permission model.
//!
//! Each role carries a JSON [`RolePermissions`] document: per-module
//! capability flags, an allow-list of endpoint patterns and method-specific
//! routes. Documents are compiled once ([`CompiledPermissions`]) and then
//! evaluated on every request by [`evaluate`].
//!
//! - [`pattern`] -- segment-based route patterns (`{id}`, `*`, `**`).
//! - [`modules`] -- module catalogue and path/method to capability mapping.
//! - [`document`] -- the serialized document and its compiled form.
//! - [`evaluator`] -- the allow/deny decision.
//! - [`defaults`] -- documents for the seeded system roles.

pub mod defaults;
pub mod document;
pub mod evaluator;
pub mod modules;
pub mod pattern;

pub use document::{CompiledPermissions, ModulePermissions, RolePermissions, RouteRule};
pub use evaluator::{evaluate, AllowReason, Decision, DenyReason, RoleScope};
pub use modules::Capability;
