//! Store configuration.

/// Store configuration shared with the REST layer.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Initial row capacity per entity type
    pub initial_capacity: usize,
    /// Page size applied when the request does not specify one
    pub default_page_size: usize,
    /// Upper bound on the requested page size
    pub max_page_size: usize,
    /// Request body read timeout in milliseconds
    pub request_timeout_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            initial_capacity: 1024,
            default_page_size: 20,
            max_page_size: 1000,
            request_timeout_ms: 5000, // 5 seconds default
        }
    }
}
