/// Generational cache of idle transient resource objects.
///
/// Creating native placed resources is expensive, so objects created in one
/// session are kept per heap and handed back when a later session asks for
/// the same content hash (same descriptor at the same heap offset).
///
/// Entries are stamped with the cache generation at which they were
/// returned. Once the cache grows past its capacity, the oldest entries are
/// destroyed, but only those at least `garbage_collect_latency` generations
/// old: capacity is a soft target.

const SOURCE: &str = "galaxy3d::transient::ResourceCache";

/// A resource object that can live in a `ResourceCache`
pub trait CachedResource {
    /// Content hash the object was created or last acquired under
    fn cache_hash(&self) -> u64;
}

#[derive(Debug)]
struct CacheEntry<R> {
    resource: R,
    hash: u64,
    generation: u64,
}

/// Bounded pool of idle resource objects, keyed by content hash
#[derive(Debug)]
pub struct ResourceCache<R: CachedResource> {
    /// Sorted newest generation first after every forfeit
    entries: Vec<CacheEntry<R>>,
    capacity: usize,
    garbage_collect_latency: u64,
    generation: u64,
}

impl<R: CachedResource> ResourceCache<R> {
    /// Create an empty cache
    ///
    /// # Arguments
    ///
    /// * `capacity` - Soft limit on the number of cached objects
    /// * `garbage_collect_latency` - Minimum age, in generations, before an
    ///   entry above capacity may be evicted
    pub fn new(capacity: usize, garbage_collect_latency: u64) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            capacity,
            garbage_collect_latency,
            generation: 0,
        }
    }

    /// Take the cached object with this hash, or create one with `create_fn`
    ///
    /// The cache never builds resources itself; on a miss the factory is
    /// solely responsible for creating the object.
    pub fn acquire<F>(&mut self, hash: u64, create_fn: F) -> R
    where
        F: FnOnce() -> R,
    {
        match self.entries.iter().position(|entry| entry.hash == hash) {
            Some(index) => {
                crate::engine_trace!(SOURCE, "Cache hit for hash {:#018x}", hash);
                self.entries.swap_remove(index).resource
            }
            None => create_fn(),
        }
    }

    /// Return objects to the cache as a new generation, then evict
    ///
    /// Returns the number of objects destroyed by eviction.
    pub fn forfeit<I>(&mut self, resources: I) -> usize
    where
        I: IntoIterator<Item = R>,
    {
        self.generation += 1;
        let generation = self.generation;

        self.entries.extend(resources.into_iter().map(|resource| CacheEntry {
            hash: resource.cache_hash(),
            resource,
            generation,
        }));

        self.entries.sort_by(|a, b| b.generation.cmp(&a.generation));

        let mut evicted = 0;
        while self.entries.len() > self.capacity {
            match self.entries.last() {
                Some(oldest) if generation - oldest.generation >= self.garbage_collect_latency => {
                    if let Some(entry) = self.entries.pop() {
                        crate::engine_trace!(SOURCE,
                            "Evicting hash {:#018x} (generation {}, current {})",
                            entry.hash, entry.generation, generation);
                        drop(entry.resource);
                        evicted += 1;
                    }
                }
                _ => break,
            }
        }

        evicted
    }

    /// Whether an object with this hash is cached
    pub fn contains(&self, hash: u64) -> bool {
        self.entries.iter().any(|entry| entry.hash == hash)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Current generation (number of forfeits so far)
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Destroy every cached object
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
#[path = "resource_cache_tests.rs"]
mod tests;
