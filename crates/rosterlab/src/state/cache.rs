//! Version-tagged cache.
//!
//! `CachedValue<T>` remembers the data version a value was computed at. Any
//! later version makes it unreadable, so bumping the version in
//! `AppState::mark_modified` discards a cached matrix without touching it.

#[derive(Debug)]
pub struct CachedValue<T> {
    value: Option<T>,
    computed_at_version: u64,
}

impl<T> Default for CachedValue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> CachedValue<T> {
    pub const fn new() -> Self {
        Self {
            value: None,
            computed_at_version: 0,
        }
    }

    /// The value, if one was stored at exactly `current_version`.
    pub fn get(&self, current_version: u64) -> Option<&T> {
        if self.computed_at_version == current_version {
            self.value.as_ref()
        } else {
            None
        }
    }

    pub fn set(&mut self, value: T, version: u64) {
        self.value = Some(value);
        self.computed_at_version = version;
    }

    pub fn is_valid(&self, current_version: u64) -> bool {
        self.value.is_some() && self.computed_at_version == current_version
    }

    /// Drop the value outright.
    pub fn invalidate(&mut self) {
        self.value = None;
    }

    pub fn version(&self) -> u64 {
        self.computed_at_version
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_basic() {
        let mut cache: CachedValue<i32> = CachedValue::new();
        assert!(cache.get(1).is_none());

        cache.set(42, 1);
        assert_eq!(cache.get(1), Some(&42));
        assert!(cache.is_valid(1));
        assert_eq!(cache.version(), 1);

        // Stale at newer version
        assert!(cache.get(2).is_none());
        assert!(!cache.is_valid(2));
    }

    #[test]
    fn test_cache_invalidate() {
        let mut cache: CachedValue<i32> = CachedValue::new();
        cache.set(42, 1);

        cache.invalidate();
        assert!(cache.get(1).is_none());
        assert!(!cache.is_valid(1));
    }
}
