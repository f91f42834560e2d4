//! JSON-driven runs of a [`LatticeRelation`] over a [`Poset`] of string keys.
//!
//! ```json
//! {
//!   "rows": [["A", "B", "C", "D"]],
//!   "query": ["B", "D"],
//!   "steps": [{"put": {"key": "A", "value": "x"}}, "make_readable", {"get": {"key": "D"}}]
//! }
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{LatticeError, Result};
use crate::hasse_map::Poset;
use crate::lattice::LatticeRelation;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    /// Chains: every key sits below every key after it in the row.
    #[serde(default)]
    pub rows: Vec<Vec<String>>,
    /// Direct `[lower, upper]` pairs.
    #[serde(default)]
    pub edges: Vec<(String, String)>,
    /// Explicit queryable keys. Takes precedence over `query_suffix`.
    #[serde(default)]
    pub query: Option<Vec<String>>,
    /// Keys ending with this are queryable. Without either, all keys are.
    #[serde(default)]
    pub query_suffix: Option<String>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Put { key: Option<String>, value: String },
    Get { key: Option<String> },
    MakeReadable,
    MakeWritable,
    MakeWritableAndClear,
    Dot,
}

#[derive(Debug, Default, Serialize)]
pub struct Report {
    /// Absent when the order has a cycle.
    pub topological_order: Option<Vec<String>>,
    pub results: Vec<QueryResult>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dots: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryResult {
    pub key: String,
    pub values: Vec<String>,
}

pub fn run(scenario: Scenario) -> Result<Report> {
    let mut poset = Poset::from_rows(&scenario.rows);
    for (lo, hi) in scenario.edges {
        poset.add_edge(lo, hi);
    }
    poset.normalize();

    let mut report = Report {
        topological_order: poset.topological_order().ok(),
        ..Report::default()
    };

    let mut lattice = match (scenario.query, scenario.query_suffix) {
        (Some(keys), _) => LatticeRelation::with_query_set(poset, keys)?,
        (None, Some(suffix)) => LatticeRelation::new(poset, move |k: &String| k.ends_with(&suffix)),
        (None, None) => LatticeRelation::new(poset, |_: &String| true),
    }
    .with_key_renderer(|k: &String| k.clone());

    debug!(steps = scenario.steps.len(), "running scenario");
    for step in scenario.steps {
        match step {
            Step::Put { key, value } => {
                let key = key.ok_or(LatticeError::NullKey { operation: "put" })?;
                lattice.put(key, value)?;
            }
            Step::Get { key } => {
                let key = key.ok_or(LatticeError::NullKey { operation: "get" })?;
                let values = lattice.get(&key)?.iter().cloned().collect();
                report.results.push(QueryResult { key, values });
            }
            Step::MakeReadable => lattice.make_readable(),
            Step::MakeWritable => lattice.make_writable(),
            Step::MakeWritableAndClear => lattice.make_writable_and_clear(),
            Step::Dot => report.dots.push(lattice.to_dot()),
        }
    }
    Ok(report)
}
