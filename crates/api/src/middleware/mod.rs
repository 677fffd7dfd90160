pub mod auth;
pub mod permission;
pub mod permission_cache;
pub mod validated_json;
