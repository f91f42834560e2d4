/// Supplies, for a key, the keys directly above it in a partial order.
///
/// Values put at a key become visible at every key reachable from it through
/// `direct_successors`. The relation must be acyclic over every key that is
/// ever inserted, and repeated calls for one key must agree.
pub trait TopoOrder<K> {
    fn direct_successors(&self, key: &K) -> Vec<K>;

    /// Name used when reporting a cycle.
    fn describe(&self) -> String {
        std::any::type_name::<Self>().to_string()
    }
}

impl<K, F> TopoOrder<K> for F
where
    F: Fn(&K) -> Vec<K>,
{
    fn direct_successors(&self, key: &K) -> Vec<K> {
        self(key)
    }

    fn describe(&self) -> String {
        "closure order".to_string()
    }
}
