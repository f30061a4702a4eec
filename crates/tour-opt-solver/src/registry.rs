// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

use fxhash::FxHashMap;
use tour_opt_core::prelude::{CostNumeric, TourSignature};

/// Registry of tour signatures accepted during one run, with the cost each
/// was accepted at. Scoped to a single run and a single worker; it is
/// initialized before the first trial and never shared.
#[derive(Debug, Clone, Default)]
pub struct TourRegistry<T> {
    map: FxHashMap<TourSignature, T>,
}

impl<T> TourRegistry<T>
where
    T: CostNumeric,
{
    #[inline]
    pub fn new() -> Self {
        Self {
            map: FxHashMap::default(),
        }
    }

    /// Resets the registry for a fresh run.
    #[inline]
    pub fn initialize(&mut self) {
        self.map.clear();
    }

    #[inline]
    pub fn contains(&self, sig: TourSignature) -> bool {
        self.map.contains_key(&sig)
    }

    #[inline]
    pub fn lookup(&self, sig: TourSignature) -> Option<T> {
        self.map.get(&sig).copied()
    }

    /// Records a signature with its accepted cost. The first recording
    /// wins; returns `false` when the signature was already present.
    pub fn insert(&mut self, sig: TourSignature, cost: T) -> bool {
        use std::collections::hash_map::Entry;
        match self.map.entry(sig) {
            Entry::Vacant(slot) => {
                slot.insert(cost);
                true
            }
            Entry::Occupied(_) => false,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sig(value: u64) -> TourSignature {
        TourSignature::new(value)
    }

    #[test]
    fn test_insert_and_lookup() {
        let mut registry = TourRegistry::<i64>::new();
        assert!(registry.is_empty());
        assert!(!registry.contains(sig(7)));

        assert!(registry.insert(sig(7), 100));
        assert!(registry.contains(sig(7)));
        assert_eq!(registry.lookup(sig(7)), Some(100));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_first_recording_wins() {
        let mut registry = TourRegistry::<i64>::new();
        assert!(registry.insert(sig(7), 100));
        assert!(!registry.insert(sig(7), 50));
        assert_eq!(registry.lookup(sig(7)), Some(100));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_initialize_clears_previous_run() {
        let mut registry = TourRegistry::<i64>::new();
        registry.insert(sig(1), 10);
        registry.insert(sig(2), 20);
        assert_eq!(registry.len(), 2);

        registry.initialize();
        assert!(registry.is_empty());
        assert!(!registry.contains(sig(1)));
    }
}
