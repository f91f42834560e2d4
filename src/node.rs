use ordermap::OrderSet;
use std::hash::Hash;

/// Handle into the node arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// The shared dead end. Always the first slot of the arena.
    pub const SINK: NodeId = NodeId(0);

    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Query,
    Leaf,
    Sink,
}

#[derive(Debug)]
pub(crate) struct QueryNode<K, V> {
    pub key: K,
    pub values: OrderSet<V>,
    /// Nodes whose values flow into this one.
    pub preds: OrderSet<NodeId>,
    pub succs: OrderSet<NodeId>,
    pub cache: Option<OrderSet<V>>,
    pub fresh: bool,
}

/// A non-addressable key that was `put` directly and still feeds some query node.
#[derive(Debug)]
pub(crate) struct LeafNode<K, V> {
    pub key: K,
    pub values: OrderSet<V>,
    pub succs: OrderSet<NodeId>,
}

#[derive(Debug)]
pub(crate) enum Node<K, V> {
    Query(QueryNode<K, V>),
    Leaf(LeafNode<K, V>),
    Sink,
}

impl<K, V: Eq + Hash> Node<K, V> {
    pub fn query(key: K) -> Self {
        Node::Query(QueryNode {
            key,
            values: OrderSet::new(),
            preds: OrderSet::new(),
            succs: OrderSet::new(),
            cache: None,
            fresh: false,
        })
    }

    pub fn leaf(key: K, succs: OrderSet<NodeId>) -> Self {
        Node::Leaf(LeafNode { key, values: OrderSet::new(), succs })
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Query(_) => NodeKind::Query,
            Node::Leaf(_) => NodeKind::Leaf,
            Node::Sink => NodeKind::Sink,
        }
    }

    pub fn key(&self) -> Option<&K> {
        match self {
            Node::Query(q) => Some(&q.key),
            Node::Leaf(l) => Some(&l.key),
            Node::Sink => None,
        }
    }

    /// Stores a value. The sink drops it.
    pub fn accept(&mut self, value: V) {
        match self {
            Node::Query(q) => {
                q.values.insert(value);
            }
            Node::Leaf(l) => {
                l.values.insert(value);
            }
            Node::Sink => {}
        }
    }

    pub fn values(&self) -> Option<&OrderSet<V>> {
        match self {
            Node::Query(q) => Some(&q.values),
            Node::Leaf(l) => Some(&l.values),
            Node::Sink => None,
        }
    }

    pub fn succs(&self) -> Option<&OrderSet<NodeId>> {
        match self {
            Node::Query(q) => Some(&q.succs),
            Node::Leaf(l) => Some(&l.succs),
            Node::Sink => None,
        }
    }

    pub fn succs_mut(&mut self) -> Option<&mut OrderSet<NodeId>> {
        match self {
            Node::Query(q) => Some(&mut q.succs),
            Node::Leaf(l) => Some(&mut l.succs),
            Node::Sink => None,
        }
    }

    /// Drops the cached aggregate, keeping explicit values.
    pub fn invalidate(&mut self) {
        if let Node::Query(q) = self {
            q.cache = None;
            q.fresh = false;
        }
    }

    /// Drops explicit values and the cached aggregate.
    pub fn reset(&mut self) {
        self.invalidate();
        match self {
            Node::Query(q) => q.values.clear(),
            Node::Leaf(l) => l.values.clear(),
            Node::Sink => {}
        }
    }

    pub fn describe(&self, render: &dyn Fn(&K) -> String) -> String {
        match self {
            Node::Query(q) => render(&q.key),
            Node::Leaf(l) => format!("leaf({})", render(&l.key)),
            Node::Sink => "<sink>".to_string(),
        }
    }
}
