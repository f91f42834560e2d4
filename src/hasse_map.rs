use ordermap::OrderMap;
use petgraph::algo::{has_path_connecting, toposort};
use petgraph::graph::{DiGraph, NodeIndex};
use std::fmt::Debug;
use std::hash::Hash;

use crate::error::{LatticeError, Result};
use crate::order::TopoOrder;

/// A finite partial order given up front, usable as a [`TopoOrder`].
///
/// Edges point from a key to the keys above it. After [`Poset::normalize`]
/// only cover (Hasse) edges remain, so `direct_successors` really is direct.
#[derive(Debug, Clone)]
pub struct Poset<K> {
    /// Stable order-of-appearance (OOA): key -> idx
    pub idx: OrderMap<K, usize>,
    /// Reverse index: idx -> key
    pub keys: Vec<K>,
    /// Hasse edges: successors as adjacency lists
    pub succ: Vec<Vec<usize>>,
}

impl<K: Eq + Hash + Clone + Debug> Default for Poset<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Eq + Hash + Clone + Debug> Poset<K> {
    pub fn new() -> Self {
        Self { idx: OrderMap::new(), keys: Vec::new(), succ: Vec::new() }
    }

    pub fn add_key(&mut self, k: K) -> usize {
        if let Some(&i) = self.idx.get(&k) {
            return i;
        }
        let i = self.keys.len();
        self.idx.insert(k.clone(), i);
        self.keys.push(k);
        self.succ.push(Vec::new());
        i
    }

    /// Declares `lo` directly below `hi`. Self loops are kept: they are
    /// cycles and must surface as such.
    pub fn add_edge(&mut self, lo: K, hi: K) {
        let u = self.add_key(lo);
        let v = self.add_key(hi);
        if !self.succ[u].contains(&v) {
            self.succ[u].push(v);
        }
    }

    /// Each row is a chain: every key sits below every key after it.
    pub fn from_rows(rows: &[Vec<K>]) -> Self {
        let mut p = Poset::new();
        for row in rows {
            for k in row {
                p.add_key(k.clone());
            }
        }
        for row in rows {
            for i in 0..row.len() {
                for j in (i + 1)..row.len() {
                    p.add_edge(row[i].clone(), row[j].clone());
                }
            }
        }
        p.normalize();
        p
    }

    pub fn from_edges<I>(edges: I) -> Self
    where
        I: IntoIterator<Item = (K, K)>,
    {
        let mut p = Poset::new();
        for (lo, hi) in edges {
            p.add_edge(lo, hi);
        }
        p
    }

    fn graph(&self) -> (DiGraph<(), ()>, Vec<NodeIndex>) {
        let mut g: DiGraph<(), ()> = DiGraph::new();
        let nodes: Vec<NodeIndex> = (0..self.keys.len()).map(|_| g.add_node(())).collect();
        for (u, vs) in self.succ.iter().enumerate() {
            for &v in vs {
                g.add_edge(nodes[u], nodes[v], ());
            }
        }
        (g, nodes)
    }

    /// Reduce the successor lists to Hasse edges.
    pub fn normalize(&mut self) {
        let (g, nodes) = self.graph();

        let mut new_succ: Vec<Vec<usize>> = vec![Vec::new(); self.keys.len()];
        for (u, vs) in self.succ.iter().enumerate() {
            for &v in vs {
                if u == v {
                    new_succ[u].push(v);
                    continue;
                }
                // Skip edge u→v and see if v is still reachable; if not it's a cover edge.
                let mut g2 = g.clone();
                if let Some(eid) = g2.find_edge(nodes[u], nodes[v]) {
                    g2.remove_edge(eid);
                }
                if !has_path_connecting(&g2, nodes[u], nodes[v], None) {
                    new_succ[u].push(v);
                }
            }
        }
        for row in &mut new_succ {
            row.sort_unstable();
        }
        self.succ = new_succ;
    }

    /// Produce one topological order, lowest keys first.
    pub fn topological_order(&self) -> Result<Vec<K>> {
        let (g, _) = self.graph();
        match toposort(&g, None) {
            // each NodeIndex maps directly to the key's idx
            Ok(order) => Ok(order.into_iter().map(|ix| self.keys[ix.index()].clone()).collect()),
            Err(cycle) => Err(LatticeError::CycleDetected {
                order: <Self as TopoOrder<K>>::describe(self),
                key: format!("{:?}", self.keys[cycle.node_id().index()]),
            }),
        }
    }
}

impl<K: Eq + Hash + Clone + Debug> TopoOrder<K> for Poset<K> {
    fn direct_successors(&self, key: &K) -> Vec<K> {
        match self.idx.get(key) {
            Some(&i) => self.succ[i].iter().map(|&j| self.keys[j].clone()).collect(),
            None => Vec::new(),
        }
    }

    fn describe(&self) -> String {
        format!("poset of {} keys", self.keys.len())
    }
}
