// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Handler registry keyed by (source type, target type).
//!
//! Exact registrations are served straight from a concurrent map. Anything
//! else walks the source type's lineage in the [`TypeHierarchy`] and the
//! outcome is memoised per *requested* key in a bounded LRU cache, since
//! the same requests recur far more often than registrations happen.
//!
//! Registering does not invalidate cached resolutions for other keys: a
//! request already answered through an ancestor keeps that answer until
//! [`HandlerRegistry::clear_cache`] is called or the entry is evicted.
//! Exact matches are always checked before the cache, so they are never
//! shadowed by a stale entry.

use crate::error::RegistryError;
use crate::types::{TypeHierarchy, TypeTag};
use dashmap::DashMap;
use lru::LruCache;
use parking_lot::RwLock;
use std::fmt;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

/// Default number of cached resolutions.
pub const DEFAULT_CACHE_CAPACITY: usize = 1024;

/// Conversion/comparison direction.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeKey {
    pub source: TypeTag,
    pub target: TypeTag,
}

impl TypeKey {
    pub fn new(source: impl Into<TypeTag>, target: impl Into<TypeTag>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.source, self.target)
    }
}

/// How a resolution was satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedBy {
    Exact,
    Cache,
    Hierarchy,
    Fallback,
}

/// A resolved handler together with the registered key it came from.
#[derive(Debug, Clone)]
pub struct Resolution<H> {
    pub handler: H,
    /// Registered key that matched; `None` for the fallback.
    pub matched: Option<TypeKey>,
    pub by: ResolvedBy,
}

/// Lookup statistics.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LookupStats {
    pub exact_hits: u64,
    pub cache_hits: u64,
    pub walks: u64,
    pub fallbacks: u64,
    pub misses: u64,
}

#[derive(Default)]
struct Counters {
    exact_hits: AtomicU64,
    cache_hits: AtomicU64,
    walks: AtomicU64,
    fallbacks: AtomicU64,
    misses: AtomicU64,
}

impl Counters {
    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> LookupStats {
        LookupStats {
            exact_hits: self.exact_hits.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            walks: self.walks.load(Ordering::Relaxed),
            fallbacks: self.fallbacks.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

#[derive(Clone)]
struct Cached<H> {
    handler: H,
    matched: TypeKey,
}

/// Type-hierarchy aware handler registry.
///
/// Safe to share across threads: resolution takes `&self`, the entry table
/// is a sharded concurrent map and cache writes happen under a write lock,
/// so each cached key is replaced atomically.
pub struct HandlerRegistry<H> {
    hierarchy: Arc<TypeHierarchy>,
    entries: DashMap<TypeKey, H>,
    cache: RwLock<LruCache<TypeKey, Cached<H>>>,
    fallback: RwLock<Option<H>>,
    frozen: AtomicBool,
    counters: Counters,
}

impl<H: Clone> HandlerRegistry<H> {
    pub fn new(hierarchy: Arc<TypeHierarchy>) -> Self {
        #[allow(clippy::expect_used)] // non-zero constant
        let capacity = NonZeroUsize::new(DEFAULT_CACHE_CAPACITY).expect("capacity > 0");
        Self::with_capacity(hierarchy, capacity)
    }

    pub fn with_capacity(hierarchy: Arc<TypeHierarchy>, cache_capacity: NonZeroUsize) -> Self {
        Self {
            hierarchy,
            entries: DashMap::new(),
            cache: RwLock::new(LruCache::new(cache_capacity)),
            fallback: RwLock::new(None),
            frozen: AtomicBool::new(false),
            counters: Counters::default(),
        }
    }

    pub fn hierarchy(&self) -> &Arc<TypeHierarchy> {
        &self.hierarchy
    }

    /// Insert or replace the handler for exactly (`source`, `target`).
    ///
    /// Both types must be declared in the hierarchy. Cached resolutions are
    /// left untouched.
    pub fn register(
        &self,
        source: impl Into<TypeTag>,
        target: impl Into<TypeTag>,
        handler: H,
    ) -> Result<(), RegistryError> {
        let key = TypeKey::new(source, target);
        self.check_registrable(&key.source)?;
        self.check_registrable(&key.target)?;

        log::debug!("[registry] register {}", key);
        if self.entries.insert(key.clone(), handler).is_some() {
            log::debug!("[registry] replaced existing handler for {}", key);
        }
        Ok(())
    }

    /// Handler used when neither an exact entry nor any ancestor matches.
    ///
    /// Fallback answers are not cached.
    pub fn register_fallback(&self, handler: H) -> Result<(), RegistryError> {
        if self.is_frozen() {
            return Err(RegistryError::Frozen);
        }
        *self.fallback.write() = Some(handler);
        log::debug!("[registry] fallback handler installed");
        Ok(())
    }

    fn check_registrable(&self, tag: &TypeTag) -> Result<(), RegistryError> {
        if self.is_frozen() {
            return Err(RegistryError::Frozen);
        }
        if tag.is_empty() {
            return Err(RegistryError::EmptyType);
        }
        if !self.hierarchy.contains(tag) {
            return Err(RegistryError::UnknownType(tag.clone()));
        }
        Ok(())
    }

    /// Reject further registrations.
    pub fn freeze(&self) {
        self.frozen.store(true, Ordering::Release);
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen.load(Ordering::Acquire)
    }

    /// Resolve the most specific handler for (`source`, `target`).
    ///
    /// `None` means no handler applies; this never panics.
    pub fn resolve(&self, source: &TypeTag, target: &TypeTag) -> Option<H> {
        self.lookup(source, target).map(|r| r.handler)
    }

    /// Like [`resolve`](Self::resolve), also reporting where the handler came from.
    pub fn lookup(&self, source: &TypeTag, target: &TypeTag) -> Option<Resolution<H>> {
        let key = TypeKey {
            source: source.clone(),
            target: target.clone(),
        };

        if let Some(entry) = self.entries.get(&key) {
            Counters::bump(&self.counters.exact_hits);
            return Some(Resolution {
                handler: entry.value().clone(),
                matched: Some(key),
                by: ResolvedBy::Exact,
            });
        }

        if let Some(hit) = self.try_peek(&key) {
            Counters::bump(&self.counters.cache_hits);
            return Some(Resolution {
                handler: hit.handler,
                matched: Some(hit.matched),
                by: ResolvedBy::Cache,
            });
        }

        if let Some(found) = self.walk(&key) {
            Counters::bump(&self.counters.walks);
            log::debug!("[registry] resolved {} via {}", key, found.matched);
            let resolution = Resolution {
                handler: found.handler.clone(),
                matched: Some(found.matched.clone()),
                by: ResolvedBy::Hierarchy,
            };
            self.cache.write().put(key, found);
            return Some(resolution);
        }

        if let Some(handler) = self.fallback.read().clone() {
            Counters::bump(&self.counters.fallbacks);
            log::debug!("[registry] {} served by fallback", key);
            return Some(Resolution {
                handler,
                matched: None,
                by: ResolvedBy::Fallback,
            });
        }

        Counters::bump(&self.counters.misses);
        log::debug!("[registry] no handler for {}", key);
        None
    }

    fn try_peek(&self, key: &TypeKey) -> Option<Cached<H>> {
        let cache = self.cache.read();
        cache.peek(key).cloned()
    }

    /// First ancestor of the source (excluding itself) with an exact entry.
    fn walk(&self, key: &TypeKey) -> Option<Cached<H>> {
        let lineage = self.hierarchy.lineage(&key.source)?;
        lineage.iter().skip(1).find_map(|ancestor| {
            let candidate = TypeKey {
                source: ancestor.clone(),
                target: key.target.clone(),
            };
            let handler = self.entries.get(&candidate)?.value().clone();
            Some(Cached {
                handler,
                matched: candidate,
            })
        })
    }

    /// True if an entry is registered for exactly (`source`, `target`).
    pub fn contains(&self, source: &TypeTag, target: &TypeTag) -> bool {
        self.entries.contains_key(&TypeKey {
            source: source.clone(),
            target: target.clone(),
        })
    }

    /// Drop every memoised resolution.
    pub fn clear_cache(&self) {
        let mut cache = self.cache.write();
        log::debug!("[registry] clearing {} cached resolutions", cache.len());
        cache.clear();
    }

    pub fn cached_len(&self) -> usize {
        self.cache.read().len()
    }

    /// Number of exact registrations.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn stats(&self) -> LookupStats {
        self.counters.snapshot()
    }
}

impl<H> fmt::Debug for HandlerRegistry<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("entries", &self.entries.len())
            .field("cached", &self.cache.read().len())
            .field("frozen", &self.frozen.load(Ordering::Relaxed))
            .finish()
    }
}
