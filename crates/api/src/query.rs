//! Shared query parameter types for API handlers.

use ledgerline_core::pagination::PageRequest;
use serde::Deserialize;

/// Page-number pagination parameters (`?page=&pageSize=`).
///
/// Out-of-range values are clamped by [`PageRequest::new`].
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageParams {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

impl PageParams {
    pub fn to_request(&self) -> PageRequest {
        PageRequest::new(self.page, self.page_size)
    }
}

/// `?isActive=` filter used by accounts.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveParams {
    pub is_active: Option<bool>,
}
