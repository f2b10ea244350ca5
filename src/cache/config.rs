/// Draft cache tuning, resolved from application settings.
#[derive(Debug, Clone)]
pub struct DraftCacheConfig {
    /// Seconds an entry stays live after its last insert or update.
    pub ttl_seconds: u64,
}

impl Default for DraftCacheConfig {
    fn default() -> Self {
        Self { ttl_seconds: 600 }
    }
}
