//! Grid caching
//!
//! Memoizes built grids per (symbol, configuration) so repeated UI
//! interactions don't rebuild identical grids. Entries are immutable and
//! replaced wholesale; expiry is checked on read.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use crate::core::HeatmapResult;
use crate::heatmap::{
    ExpirationGroup, HeatmapConfig, HeatmapGrid, StrikeRange, ValueMetric, ViewType,
};

/// Cache configuration
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum age of an entry (in seconds)
    pub ttl_seconds: i64,
    /// Whether to use cache
    pub enabled: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: 60,
            enabled: true,
        }
    }
}

/// Hashable fingerprint of a `HeatmapConfig`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConfigKey {
    view_type: ViewType,
    strike_range: StrikeRange,
    expiration_group: ExpirationGroup,
    metric: ValueMetric,
    price_bits: u64,
}

impl From<&HeatmapConfig> for ConfigKey {
    fn from(config: &HeatmapConfig) -> Self {
        Self {
            view_type: config.view_type,
            strike_range: config.strike_range,
            expiration_group: config.expiration_group,
            metric: config.metric,
            price_bits: (config.underlying_price + 0.0).to_bits(),
        }
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    grid: Arc<HeatmapGrid>,
    inserted_at: DateTime<Utc>,
}

/// In-memory grid cache with TTL eviction on read
#[derive(Debug)]
pub struct GridCache {
    config: CacheConfig,
    entries: HashMap<(String, ConfigKey), CacheEntry>,
}

impl GridCache {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config,
            entries: HashMap::new(),
        }
    }

    fn ttl(&self) -> Duration {
        Duration::seconds(self.config.ttl_seconds)
    }

    fn key(symbol: &str, config: &HeatmapConfig) -> (String, ConfigKey) {
        (symbol.to_ascii_uppercase(), ConfigKey::from(config))
    }

    /// Cached grid, if present and fresh
    pub fn get(&mut self, symbol: &str, config: &HeatmapConfig) -> Option<Arc<HeatmapGrid>> {
        self.get_at(symbol, config, Utc::now())
    }

    /// Cached grid as of `now`; stale entries are evicted
    pub fn get_at(
        &mut self,
        symbol: &str,
        config: &HeatmapConfig,
        now: DateTime<Utc>,
    ) -> Option<Arc<HeatmapGrid>> {
        if !self.config.enabled {
            return None;
        }

        let key = Self::key(symbol, config);
        let age = now - self.entries.get(&key)?.inserted_at;

        if age >= self.ttl() {
            self.entries.remove(&key);
            tracing::debug!("Evicted stale grid for {} ({}s old)", symbol, age.num_seconds());
            return None;
        }

        tracing::debug!("Grid cache hit for {}", symbol);
        self.entries.get(&key).map(|e| Arc::clone(&e.grid))
    }

    /// Store a grid, replacing any previous entry
    pub fn insert(
        &mut self,
        symbol: &str,
        config: &HeatmapConfig,
        grid: HeatmapGrid,
    ) -> Arc<HeatmapGrid> {
        self.insert_at(symbol, config, grid, Utc::now())
    }

    /// Store a grid stamped with `now`
    pub fn insert_at(
        &mut self,
        symbol: &str,
        config: &HeatmapConfig,
        grid: HeatmapGrid,
        now: DateTime<Utc>,
    ) -> Arc<HeatmapGrid> {
        let grid = Arc::new(grid);
        if self.config.enabled {
            self.entries.insert(
                Self::key(symbol, config),
                CacheEntry {
                    grid: Arc::clone(&grid),
                    inserted_at: now,
                },
            );
        }
        grid
    }

    /// Cached grid, or build and cache one
    pub fn get_or_build<F>(
        &mut self,
        symbol: &str,
        config: &HeatmapConfig,
        build: F,
    ) -> HeatmapResult<Arc<HeatmapGrid>>
    where
        F: FnOnce() -> HeatmapResult<HeatmapGrid>,
    {
        if let Some(grid) = self.get(symbol, config) {
            return Ok(grid);
        }

        tracing::debug!("Building fresh grid for {}", symbol);
        let grid = build()?;
        Ok(self.insert(symbol, config, grid))
    }

    /// Drop every entry for a symbol
    pub fn invalidate(&mut self, symbol: &str) {
        let symbol = symbol.to_ascii_uppercase();
        self.entries.retain(|(s, _), _| *s != symbol);
    }

    /// Drop everything
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for GridCache {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heatmap::HeatmapEngine;
    use chrono::TimeZone;

    fn config(view: ViewType) -> HeatmapConfig {
        HeatmapConfig::new(view, StrikeRange::Pct20, ExpirationGroup::Short, 150.0)
    }

    fn grid() -> HeatmapGrid {
        HeatmapGrid::empty(ViewType::Net, ValueMetric::OpenInterest)
    }

    #[test]
    fn test_cache_operations() {
        let mut cache = GridCache::default();
        let t0 = Utc.with_ymd_and_hms(2024, 1, 15, 14, 30, 0).unwrap();

        cache.insert_at("SPY", &config(ViewType::Net), grid(), t0);
        assert_eq!(cache.len(), 1);

        // key is case-insensitive on symbol, sensitive on config
        assert!(cache.get_at("spy", &config(ViewType::Net), t0).is_some());
        assert!(cache.get_at("SPY", &config(ViewType::Calls), t0).is_none());

        let mut moved = config(ViewType::Net);
        moved.underlying_price = 151.0;
        assert!(cache.get_at("SPY", &moved, t0).is_none());

        cache.invalidate("SPY");
        assert!(cache.is_empty());
    }

    #[test]
    fn test_ttl_checked_on_read() {
        let mut cache = GridCache::new(CacheConfig {
            ttl_seconds: 30,
            enabled: true,
        });
        let t0 = Utc.with_ymd_and_hms(2024, 1, 15, 14, 30, 0).unwrap();

        cache.insert_at("QQQ", &config(ViewType::Puts), grid(), t0);
        assert!(cache
            .get_at("QQQ", &config(ViewType::Puts), t0 + Duration::seconds(29))
            .is_some());
        assert!(cache
            .get_at("QQQ", &config(ViewType::Puts), t0 + Duration::seconds(30))
            .is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_insert_replaces_entry() {
        let mut cache = GridCache::default();
        let t0 = Utc.with_ymd_and_hms(2024, 1, 15, 14, 30, 0).unwrap();

        let first = cache.insert_at("SPY", &config(ViewType::Net), grid(), t0);
        let second = cache.insert_at("SPY", &config(ViewType::Net), grid(), t0);
        let cached = cache.get_at("SPY", &config(ViewType::Net), t0).unwrap();

        assert_eq!(cache.len(), 1);
        assert!(Arc::ptr_eq(&cached, &second));
        assert!(!Arc::ptr_eq(&cached, &first));
    }

    #[test]
    fn test_disabled_cache() {
        let mut cache = GridCache::new(CacheConfig {
            ttl_seconds: 60,
            enabled: false,
        });
        cache.insert("SPY", &config(ViewType::Net), grid());
        assert!(cache.is_empty());
        assert!(cache.get("SPY", &config(ViewType::Net)).is_none());
    }

    #[test]
    fn test_get_or_build() {
        let mut cache = GridCache::default();
        let engine = HeatmapEngine::new();
        let cfg = config(ViewType::Calls);
        let mut builds = 0;

        for _ in 0..3 {
            cache
                .get_or_build("AAPL", &cfg, || {
                    builds += 1;
                    engine.build_now(&[], &cfg)
                })
                .unwrap();
        }
        assert_eq!(builds, 1);
        assert_eq!(cache.len(), 1);
    }
}
