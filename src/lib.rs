//! # Lattice relation
//!
//! Indexes values by keys that are partially ordered by an external
//! [`TopoOrder`]. Querying a key returns the union of the values put at that
//! key and at every key below it, without walking the order at query time.
//!
//! Only keys matching a [`QueryFilter`] can be queried; the others are
//! compressed away, their values routed to the nearest queryable keys above
//! them, or dropped when there are none.
//!
//! ```
//! use lattice_relation::{LatticeRelation, Poset};
//!
//! let order = Poset::from_rows(&[vec!["A", "B", "C", "D"]]);
//! let mut lattice = LatticeRelation::new(order, |k| *k == "B" || *k == "D");
//! lattice.put("A", "x").unwrap();
//! lattice.make_readable();
//! assert!(lattice.get(&"D").unwrap().contains(&"x"));
//! assert!(lattice.get(&"C").unwrap().is_empty());
//! ```
pub mod dot;
mod error;
mod filter;
mod hasse_map;
mod lattice;
mod node;
mod order;
mod phase;
pub mod scenario;

pub use error::{LatticeError, Result};
pub use filter::QueryFilter;
pub use hasse_map::Poset;
pub use lattice::LatticeRelation;
pub use node::{NodeId, NodeKind};
pub use order::TopoOrder;
pub use phase::Phase;
