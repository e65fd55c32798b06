//! Parsed condition cache
//!
//! Parsing is pure, so a condition string always yields the same tree. The
//! cache keeps one shared `Arc<Expression>` per source string.

use crate::condition::ast::Expression;
use crate::condition::evaluator::{evaluate, Environment, TriState};
use crate::condition::parser;
use crate::config::{EngineConfig, DEFAULT_CACHE_CAPACITY};
use crate::error::Result;
use ahash::AHashMap;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Source text → parsed expression, shared across threads
pub struct ConditionCache {
    config: EngineConfig,
    entries: RwLock<AHashMap<String, Arc<Expression>>>,
    /// Set once the "cache full" warning has been logged
    full_reported: AtomicBool,
}

impl ConditionCache {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        let map = AHashMap::with_capacity(config.cache_capacity.min(DEFAULT_CACHE_CAPACITY));
        Self {
            config,
            entries: RwLock::new(map),
            full_reported: AtomicBool::new(false),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Get or parse a condition string.
    ///
    /// Parse failures are never cached. Once the cache holds
    /// `cache_capacity` entries new conditions are parsed but not stored.
    pub fn get_or_parse(&self, condition: &str) -> Result<Arc<Expression>> {
        // Fast path: check read lock first
        {
            let entries = self.entries.read();
            if let Some(ast) = entries.get(condition) {
                tracing::trace!(condition, "condition cache hit");
                return Ok(Arc::clone(ast));
            }
        }

        // Slow path: parse outside the lock, then insert
        let ast = Arc::new(parser::parse_with_config(condition, &self.config)?);

        let mut entries = self.entries.write();
        if let Some(existing) = entries.get(condition) {
            return Ok(Arc::clone(existing));
        }
        if entries.len() < self.config.cache_capacity {
            entries.insert(condition.to_string(), Arc::clone(&ast));
        } else if !self.full_reported.swap(true, Ordering::Relaxed) {
            tracing::warn!(
                capacity = self.config.cache_capacity,
                "condition cache full, not caching"
            );
        } else {
            tracing::debug!(condition, "condition cache full, not caching");
        }

        Ok(ast)
    }

    /// Evaluate a condition string against an environment, using the cache.
    ///
    /// An empty condition means the question has no condition and is always
    /// satisfied.
    pub fn check<E: Environment + ?Sized>(&self, condition: &str, env: &E) -> Result<TriState> {
        if condition.trim().is_empty() {
            return Ok(TriState::True);
        }

        let ast = self.get_or_parse(condition)?;
        Ok(evaluate(&ast, env))
    }

    pub fn clear(&self) {
        self.entries.write().clear();
        self.full_reported.store(false, Ordering::Relaxed);
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl Default for ConditionCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Process-wide cache with the default limits
static CONDITION_CACHE: Lazy<ConditionCache> = Lazy::new(ConditionCache::new);

/// Get or parse a condition string, using the process-wide cache
#[inline]
pub fn get_or_parse(condition: &str) -> Result<Arc<Expression>> {
    CONDITION_CACHE.get_or_parse(condition)
}

/// Check a condition against an environment, using the process-wide cache
#[inline]
pub fn check_condition<E: Environment + ?Sized>(condition: &str, env: &E) -> Result<TriState> {
    CONDITION_CACHE.check(condition, env)
}

/// Clear the process-wide cache
pub fn clear_cache() {
    CONDITION_CACHE.clear();
}

/// Number of conditions in the process-wide cache
pub fn cache_size() -> usize {
    CONDITION_CACHE.len()
}
