use ordermap::{OrderMap, OrderSet};
use std::collections::HashSet;
use std::fmt;
use std::hash::Hash;
use tracing::{debug, trace};

use crate::dot::{to_dot, DotColor};
use crate::error::{LatticeError, Result};
use crate::filter::QueryFilter;
use crate::node::{Node, NodeId, NodeKind};
use crate::order::TopoOrder;
use crate::phase::Phase;

/// Indexes values of type `V` by keys of type `K` ordered by a [`TopoOrder`].
///
/// The value of a queryable key is the union of the values put at it and at
/// every key below it, that is every key from which it is reachable through
/// `direct_successors`. Keys that do not match the [`QueryFilter`] only act
/// as conduits: values put there flow to the nearest queryable keys above.
///
/// An instance is either writable or readable, toggled by
/// [`make_readable`](Self::make_readable) and
/// [`make_writable`](Self::make_writable). Cached aggregates are invalidated
/// in bulk on the way back to writable instead of on every insertion.
pub struct LatticeRelation<K, V, O> {
    order: O,
    filter: QueryFilter<K>,
    render: Box<dyn Fn(&K) -> String>,
    /// Arena; slot 0 is the sink.
    nodes: Vec<Node<K, V>>,
    index: OrderMap<K, NodeId>,
    /// Nearest query nodes of non-queryable keys met mid-walk. The order and
    /// the filter never change, so neither do these.
    skipped: OrderMap<K, OrderSet<NodeId>>,
    phase: Phase,
    empty: OrderSet<V>,
}

impl<K, V, O> LatticeRelation<K, V, O>
where
    K: Eq + Hash + Clone + fmt::Debug,
    V: Eq + Hash + Clone,
    O: TopoOrder<K>,
{
    /// Creates a relation whose queryable keys are those matching `is_query`.
    pub fn new(order: O, is_query: impl Fn(&K) -> bool + 'static) -> Self {
        Self::with_filter(order, QueryFilter::predicate(is_query))
    }

    /// Creates a relation where only the keys of `query_keys` may be queried.
    ///
    /// Every key is registered up front, which lets the graph drop its
    /// transitive edges once. Fails if the order has a cycle through one
    /// of the keys.
    pub fn with_query_set<I>(order: O, query_keys: I) -> Result<Self>
    where
        I: IntoIterator<Item = K>,
    {
        let keys: OrderSet<K> = query_keys.into_iter().collect();
        let mut lattice = Self::with_filter(order, QueryFilter::KeySet(keys.clone()));
        for k in keys {
            lattice.insert(k, None)?;
        }
        lattice.transitive_reduction();
        Ok(lattice)
    }

    fn with_filter(order: O, filter: QueryFilter<K>) -> Self {
        Self {
            order,
            filter,
            render: Box::new(|k| format!("{:?}", k)),
            nodes: vec![Node::Sink],
            index: OrderMap::new(),
            skipped: OrderMap::new(),
            phase: Phase::default(),
            empty: OrderSet::new(),
        }
    }

    /// Strategy to render keys when dumping the graph.
    pub fn with_key_renderer(mut self, render: impl Fn(&K) -> String + 'static) -> Self {
        self.render = Box::new(render);
        self
    }

    /// Adds `value` to `key`. It will be part of the result of [`get`](Self::get)
    /// for the key and every queryable key above it.
    pub fn put(&mut self, key: K, value: V) -> Result<()> {
        self.phase.ensure_writable()?;
        self.insert(key, Some(value))
    }

    /// Returns the combined values for `key`, or an empty set if the key is
    /// not queryable or nothing was ever inserted at or below it.
    pub fn get(&mut self, key: &K) -> Result<&OrderSet<V>> {
        self.phase.ensure_readable()?;
        let id = match self.index.get(key) {
            Some(&id) if self.nodes[id.0].kind() == NodeKind::Query => id,
            _ => return Ok(&self.empty),
        };
        if self.is_fresh(id) {
            trace!(key = ?key, "aggregate cache hit");
        } else {
            trace!(key = ?key, "computing aggregate");
            let mut seen = HashSet::new();
            self.reduce(id, &mut seen);
        }
        match &self.nodes[id.0] {
            Node::Query(q) => Ok(q.cache.as_ref().unwrap_or(&self.empty)),
            _ => Ok(&self.empty),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Allows reads. Nothing is computed until the first `get`.
    pub fn make_readable(&mut self) {
        debug!("lattice made readable");
        self.phase = Phase::Readable;
    }

    /// Allows writes again; cached aggregates are dropped, explicit values kept.
    pub fn make_writable(&mut self) {
        debug!(nodes = self.nodes.len(), "lattice made writable");
        self.phase = Phase::Writable;
        for n in &mut self.nodes {
            n.invalidate();
        }
    }

    /// Like [`make_writable`](Self::make_writable), also discarding every value put so far.
    pub fn make_writable_and_clear(&mut self) {
        debug!(nodes = self.nodes.len(), "lattice made writable and cleared");
        self.phase = Phase::Writable;
        for n in &mut self.nodes {
            n.reset();
        }
    }

    /// What `key` was materialized as, if it was ever encountered on its own.
    pub fn node_kind(&self, key: &K) -> Option<NodeKind> {
        self.index.get(key).map(|id| self.nodes[id.0].kind())
    }

    pub fn query_node_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.kind() == NodeKind::Query).count()
    }

    pub fn edge_count(&self) -> usize {
        self.nodes.iter().filter_map(|n| n.succs()).map(|s| s.len()).sum()
    }

    /// Graphviz DOT rendering of the node graph.
    pub fn to_dot(&self) -> String {
        let mut shown: OrderSet<NodeId> = self.index.values().copied().collect();
        shown.extend((1..self.nodes.len()).map(NodeId));
        to_dot(
            shown,
            |id| {
                self.nodes[id.0]
                    .succs()
                    .map(|s| s.iter().copied().collect())
                    .unwrap_or_default()
            },
            |id| match self.nodes[id.0].kind() {
                NodeKind::Query => DotColor::Green,
                _ => DotColor::Black,
            },
            |id| self.nodes[id.0].describe(&*self.render),
        )
    }

    fn insert(&mut self, key: K, value: Option<V>) -> Result<()> {
        let id = match self.index.get(&key) {
            Some(&id) => id,
            None => self.materialize(key)?,
        };
        if let Some(v) = value {
            self.nodes[id.0].accept(v);
        }
        Ok(())
    }

    /// First encounter of a key passed to `put`: builds its node and
    /// everything reachable from it that is not built yet.
    fn materialize(&mut self, key: K) -> Result<NodeId> {
        let mut path = vec![key.clone()];
        if self.filter.accepts(&key) {
            let id = self.add_node(key.clone(), Node::query(key.clone()));
            self.descend_from(id, &key, &mut path)?;
            return Ok(id);
        }

        let frontier = match self.skipped.remove(&key) {
            Some(frontier) => frontier,
            None => self.frontier_of(&key, &mut path)?,
        };
        if frontier.is_empty() {
            debug!(key = ?key, "dead end, routed to sink");
            self.index.insert(key, NodeId::SINK);
            return Ok(NodeId::SINK);
        }
        let id = self.add_node(key.clone(), Node::leaf(key, OrderSet::new()));
        for succ in frontier {
            self.link(id, succ);
        }
        Ok(id)
    }

    fn add_node(&mut self, key: K, node: Node<K, V>) -> NodeId {
        let id = NodeId(self.nodes.len());
        debug!(key = ?key, kind = ?node.kind(), "new lattice node");
        self.nodes.push(node);
        self.index.insert(key, id);
        id
    }

    /// Links query node `id` to the nearest queryable keys above `key`.
    fn descend_from(&mut self, id: NodeId, key: &K, path: &mut Vec<K>) -> Result<()> {
        for next in self.order.direct_successors(key) {
            for succ in self.reach(next, path)? {
                self.link(id, succ);
            }
        }
        Ok(())
    }

    /// Union of `reach` over the direct successors of a non-queryable key.
    fn frontier_of(&mut self, key: &K, path: &mut Vec<K>) -> Result<OrderSet<NodeId>> {
        let mut frontier = OrderSet::new();
        for next in self.order.direct_successors(key) {
            frontier.extend(self.reach(next, path)?);
        }
        Ok(frontier)
    }

    /// Returns the query nodes that a predecessor of `key` has to be linked
    /// to, building whatever was not built yet.
    fn reach(&mut self, key: K, path: &mut Vec<K>) -> Result<OrderSet<NodeId>> {
        if path.contains(&key) {
            debug!(key = ?key, "cycle detected");
            return Err(LatticeError::CycleDetected {
                order: self.order.describe(),
                key: (self.render)(&key),
            });
        }

        if let Some(&id) = self.index.get(&key) {
            return Ok(match &self.nodes[id.0] {
                Node::Query(_) => OrderSet::from_iter([id]),
                // a leaf was linked when it was first put
                Node::Leaf(l) => l.succs.clone(),
                Node::Sink => OrderSet::new(),
            });
        }
        if let Some(frontier) = self.skipped.get(&key) {
            return Ok(frontier.clone());
        }

        path.push(key.clone());
        let reached = if self.filter.accepts(&key) {
            let id = self.add_node(key.clone(), Node::query(key.clone()));
            self.descend_from(id, &key, path)?;
            OrderSet::from_iter([id])
        } else {
            // Not queryable: skip it, linking the predecessor to what lies beyond.
            let frontier = self.frontier_of(&key, path)?;
            if frontier.is_empty() {
                debug!(key = ?key, "dead end, routed to sink");
                self.index.insert(key, NodeId::SINK);
            } else {
                self.skipped.insert(key, frontier.clone());
            }
            frontier
        };
        path.pop();
        Ok(reached)
    }

    fn link(&mut self, from: NodeId, to: NodeId) {
        if let Some(succs) = self.nodes[from.0].succs_mut() {
            succs.insert(to);
        }
        if let Node::Query(q) = &mut self.nodes[to.0] {
            q.preds.insert(from);
        }
    }

    fn unlink(&mut self, from: NodeId, to: NodeId) {
        if let Some(succs) = self.nodes[from.0].succs_mut() {
            succs.remove(&to);
        }
        if let Node::Query(q) = &mut self.nodes[to.0] {
            q.preds.remove(&from);
        }
    }

    /// Drops `i -> k` wherever `i -> j -> k` also exists. Reachability is
    /// unchanged; fewer edges means fewer diamonds, so more cacheable results.
    fn transitive_reduction(&mut self) {
        let mut redundant = Vec::new();
        for (j, node) in self.nodes.iter().enumerate() {
            let Node::Query(q) = node else { continue };
            let j = NodeId(j);
            for &i in &q.preds {
                let Some(i_succs) = self.nodes[i.0].succs() else { continue };
                for &k in &q.succs {
                    if i != j && k != j && i_succs.contains(&k) {
                        redundant.push((i, k));
                    }
                }
            }
        }
        for (i, k) in redundant {
            debug!(
                from = ?self.nodes[i.0].key(),
                to = ?self.nodes[k.0].key(),
                "removing transitive edge"
            );
            self.unlink(i, k);
        }
    }

    fn is_fresh(&self, id: NodeId) -> bool {
        matches!(&self.nodes[id.0], Node::Query(q) if q.fresh && q.cache.is_some())
    }

    /// Computes the aggregate of query node `id` into its cache, returning
    /// whether it may be reused. Predecessors reachable along several paths
    /// are only visited once per computation; every node that skipped one
    /// holds a partial union and stays stale.
    fn reduce(&mut self, id: NodeId, seen: &mut HashSet<NodeId>) -> bool {
        if self.is_fresh(id) {
            return true;
        }
        let (mut acc, preds) = match &self.nodes[id.0] {
            Node::Query(q) => (q.values.clone(), q.preds.iter().copied().collect::<Vec<_>>()),
            _ => return true,
        };

        let mut fresh = true;
        for pred in preds {
            if !seen.insert(pred) {
                // reached along another path already
                fresh = false;
                continue;
            }
            match self.nodes[pred.0].kind() {
                NodeKind::Query => {
                    fresh &= self.reduce(pred, seen);
                    if let Node::Query(p) = &self.nodes[pred.0] {
                        acc.extend(p.cache.iter().flatten().cloned());
                    }
                }
                NodeKind::Leaf => {
                    acc.extend(self.nodes[pred.0].values().into_iter().flatten().cloned());
                }
                NodeKind::Sink => {}
            }
        }

        if let Node::Query(q) = &mut self.nodes[id.0] {
            q.cache = Some(acc);
            q.fresh = fresh;
        }
        fresh
    }
}

impl<K, V, O> fmt::Display for LatticeRelation<K, V, O>
where
    K: Eq + Hash + Clone + fmt::Debug,
    V: Eq + Hash + Clone,
    O: TopoOrder<K>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_dot())
    }
}

impl<K: fmt::Debug, V, O> fmt::Debug for LatticeRelation<K, V, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LatticeRelation")
            .field("filter", &self.filter)
            .field("keys", &self.index.len())
            .field("nodes", &self.nodes.len())
            .field("phase", &self.phase)
            .finish()
    }
}
