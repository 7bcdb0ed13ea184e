use std::time::Duration;

use anyhow::Result;
use moka::future::Cache;

use crate::{
    model::shift_rule::ShiftRule,
    store::{AttendanceStore, StoreResult},
};

/// Shift rules change rarely; keep them in memory for `ttl`.
#[derive(Clone)]
pub struct ShiftCache {
    cache: Cache<String, ShiftRule>,
}

impl ShiftCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            cache: Cache::builder()
                .max_capacity(1_000)
                .time_to_live(ttl)
                .build(),
        }
    }

    /// Cached rule, falling back to the store. Unknown shifts are not cached.
    pub async fn get(
        &self,
        store: &dyn AttendanceStore,
        shift_name: &str,
    ) -> StoreResult<Option<ShiftRule>> {
        if let Some(rule) = self.cache.get(shift_name).await {
            return Ok(Some(rule));
        }

        let rule = store.find_shift(shift_name).await?;
        if let Some(rule) = &rule {
            self.cache
                .insert(shift_name.to_string(), rule.clone())
                .await;
        }
        Ok(rule)
    }

    /// Load every shift rule up front.
    pub async fn warmup(&self, store: &dyn AttendanceStore) -> Result<usize> {
        let rules = store.list_shifts().await?;

        let futures: Vec<_> = rules
            .iter()
            .map(|r| self.cache.insert(r.shift_name.clone(), r.clone()))
            .collect();

        // Await all insertions concurrently
        futures::future::join_all(futures).await;

        tracing::info!("Shift cache warmup complete: {} rules", rules.len());
        Ok(rules.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::sheet::tests::store;

    #[actix_web::test]
    async fn serves_from_cache_after_first_load() {
        let store = store();
        let cache = ShiftCache::new(Duration::from_secs(60));

        assert_eq!(cache.warmup(&store).await.unwrap(), 2);
        let general = cache.get(&store, "General").await.unwrap().unwrap();
        assert_eq!(general, ShiftRule::new("General", 9.0, 4.5));
        assert!(cache.get(&store, "Ghost").await.unwrap().is_none());
    }
}
