use ordermap::OrderSet;
use std::fmt;
use std::hash::Hash;

/// Decides which keys can be queried through
/// [`LatticeRelation::get`](crate::LatticeRelation::get).
pub enum QueryFilter<K> {
    Predicate(Box<dyn Fn(&K) -> bool>),
    /// All addressable keys, known before the first insertion.
    KeySet(OrderSet<K>),
}

impl<K: Eq + Hash> QueryFilter<K> {
    pub fn predicate(f: impl Fn(&K) -> bool + 'static) -> Self {
        QueryFilter::Predicate(Box::new(f))
    }

    pub fn accepts(&self, key: &K) -> bool {
        match self {
            QueryFilter::Predicate(f) => f(key),
            QueryFilter::KeySet(keys) => keys.contains(key),
        }
    }
}

impl<K: fmt::Debug> fmt::Debug for QueryFilter<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryFilter::Predicate(_) => f.write_str("Predicate(..)"),
            QueryFilter::KeySet(keys) => f.debug_tuple("KeySet").field(keys).finish(),
        }
    }
}
