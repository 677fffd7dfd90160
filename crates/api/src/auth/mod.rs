//! Token and password primitives. Request-level extraction lives in
//! [`crate::middleware::auth`].

pub mod jwt;
pub mod password;
