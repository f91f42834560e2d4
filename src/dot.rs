//! Graphviz rendering of a node graph, for debugging only.
//!
//! Paste the output into any DOT viewer (eg http://webgraphviz.com/).

use ordermap::OrderMap;
use petgraph::dot::{Config, Dot};
use petgraph::graph::{DiGraph, NodeIndex};
use std::hash::Hash;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DotColor {
    Green,
    Black,
}

impl DotColor {
    fn attr(self) -> &'static str {
        match self {
            DotColor::Green => "color=green",
            DotColor::Black => "color=black",
        }
    }
}

/// Renders `nodes` and the edges given by `successors`. Successors that are
/// not themselves in `nodes` are left out.
pub fn to_dot<N, I, S, C, L>(nodes: I, successors: S, color: C, label: L) -> String
where
    N: Copy + Eq + Hash,
    I: IntoIterator<Item = N>,
    S: Fn(N) -> Vec<N>,
    C: Fn(N) -> DotColor,
    L: Fn(N) -> String,
{
    let mut g: DiGraph<(String, DotColor), ()> = DiGraph::new();
    let mut ix: OrderMap<N, NodeIndex> = OrderMap::new();
    for n in nodes {
        let i = g.add_node((label(n), color(n)));
        ix.insert(n, i);
    }
    for (&n, &from) in &ix {
        for s in successors(n) {
            if let Some(&to) = ix.get(&s) {
                g.add_edge(from, to, ());
            }
        }
    }

    format!(
        "{:?}",
        Dot::with_attr_getters(
            &g,
            &[Config::EdgeNoLabel, Config::NodeNoLabel],
            &|_, _| String::new(),
            &|_, (_, weight)| {
                let (label, color) = weight;
                format!("label={:?} {}", label, color.attr())
            },
        )
    )
}
