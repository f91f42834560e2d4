use lattice_relation::{LatticeError, LatticeRelation, NodeKind, Phase, Poset};
use ordermap::OrderSet;

fn sorted(set: &OrderSet<&'static str>) -> Vec<&'static str> {
    let mut v: Vec<_> = set.iter().copied().collect();
    v.sort_unstable();
    v
}

fn chain() -> Poset<&'static str> {
    Poset::from_rows(&[vec!["A", "B", "C", "D"]])
}

#[test]
fn unqueryable_keys_always_read_empty() {
    let mut lattice = LatticeRelation::new(chain(), |k| *k == "D");
    lattice.put("A", "a1").unwrap();
    lattice.put("A", "a2").unwrap();
    lattice.put("C", "c").unwrap();
    lattice.put("Z", "nowhere").unwrap();
    lattice.make_readable();

    assert!(lattice.get(&"A").unwrap().is_empty());
    assert!(lattice.get(&"C").unwrap().is_empty());
    assert!(lattice.get(&"Z").unwrap().is_empty());
    assert_eq!(sorted(lattice.get(&"D").unwrap()), vec!["a1", "a2", "c"]);
}

#[test]
fn equal_values_collapse() {
    let mut lattice = LatticeRelation::new(chain(), |_| true);
    lattice.put("B", "v1").unwrap();
    lattice.put("B", "v1").unwrap();
    lattice.put("B", "v2").unwrap();
    lattice.make_readable();
    assert_eq!(sorted(lattice.get(&"B").unwrap()), vec!["v1", "v2"]);
}

#[test]
fn values_flow_through_unqueryable_keys() {
    let order = Poset::from_edges([("k", "k2")]);
    let mut lattice = LatticeRelation::new(order, |k| *k == "k2");
    lattice.put("k", "v").unwrap();
    lattice.make_readable();
    assert_eq!(sorted(lattice.get(&"k2").unwrap()), vec!["v"]);
}

#[test]
fn phase_is_enforced() {
    let mut lattice = LatticeRelation::new(chain(), |_| true);
    assert_eq!(lattice.phase(), Phase::Writable);
    assert_eq!(
        lattice.get(&"A").unwrap_err(),
        LatticeError::PhaseViolation { expected: Phase::Readable, actual: Phase::Writable }
    );

    lattice.make_readable();
    assert_eq!(
        lattice.put("A", "v").unwrap_err(),
        LatticeError::PhaseViolation { expected: Phase::Writable, actual: Phase::Readable }
    );

    lattice.make_writable();
    lattice.put("A", "v").unwrap();
}

#[test]
fn make_writable_keeps_values() {
    let mut lattice = LatticeRelation::new(chain(), |k| *k != "C");
    lattice.put("A", "old").unwrap();
    lattice.make_readable();
    assert_eq!(sorted(lattice.get(&"D").unwrap()), vec!["old"]);

    lattice.make_writable();
    lattice.put("B", "new").unwrap();
    lattice.make_readable();
    assert_eq!(sorted(lattice.get(&"D").unwrap()), vec!["new", "old"]);
    assert_eq!(sorted(lattice.get(&"A").unwrap()), vec!["old"]);
}

#[test]
fn make_writable_and_clear_erases_values() {
    let mut lattice = LatticeRelation::new(chain(), |_| true);
    lattice.put("A", "old").unwrap();
    lattice.make_readable();
    assert_eq!(sorted(lattice.get(&"D").unwrap()), vec!["old"]);

    lattice.make_writable_and_clear();
    lattice.put("C", "new").unwrap();
    lattice.make_readable();
    assert!(lattice.get(&"A").unwrap().is_empty());
    assert!(lattice.get(&"B").unwrap().is_empty());
    assert_eq!(sorted(lattice.get(&"D").unwrap()), vec!["new"]);
}

#[test]
fn cycles_fail_insertion() {
    let order = Poset::from_edges([("k", "k2"), ("k2", "k")]);
    let mut lattice = LatticeRelation::new(order.clone(), |_| true);
    assert!(matches!(lattice.put("k", "v"), Err(LatticeError::CycleDetected { .. })));

    let mut lattice = LatticeRelation::new(order.clone(), |_| false);
    assert!(matches!(lattice.put("k", "v"), Err(LatticeError::CycleDetected { .. })));

    let err = LatticeRelation::<_, &str, _>::with_query_set(order, ["k"]).unwrap_err();
    match err {
        LatticeError::CycleDetected { order, .. } => assert_eq!(order, "poset of 2 keys"),
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn self_loop_is_a_cycle() {
    let order = Poset::from_edges([("k", "k")]);
    let mut lattice = LatticeRelation::new(order, |_| true);
    assert!(matches!(lattice.put("k", "v"), Err(LatticeError::CycleDetected { .. })));
}

#[test]
fn chain_with_sparse_query_keys() {
    for query_set in [false, true] {
        let mut lattice = if query_set {
            LatticeRelation::with_query_set(chain(), ["B", "D"]).unwrap()
        } else {
            LatticeRelation::new(chain(), |k| *k == "B" || *k == "D")
        };
        lattice.put("A", "x").unwrap();
        lattice.make_readable();

        assert_eq!(sorted(lattice.get(&"B").unwrap()), vec!["x"]);
        assert_eq!(sorted(lattice.get(&"D").unwrap()), vec!["x"]);
        assert!(lattice.get(&"A").unwrap().is_empty());
        assert!(lattice.get(&"C").unwrap().is_empty());
    }
}

#[test]
fn diamond_values_only_flow_upward() {
    let order = Poset::from_edges([("A", "B"), ("A", "C"), ("B", "D"), ("C", "D")]);
    let mut lattice = LatticeRelation::new(order, |k| *k == "A" || *k == "D");
    lattice.put("D", "base").unwrap();
    lattice.put("A", "top").unwrap();
    lattice.make_readable();

    // nothing sits below A
    assert_eq!(sorted(lattice.get(&"A").unwrap()), vec!["top"]);
    // A is below D through both B and C
    assert_eq!(sorted(lattice.get(&"D").unwrap()), vec!["base", "top"]);
    assert!(lattice.get(&"B").unwrap().is_empty());
}

#[test]
fn query_set_is_registered_up_front() {
    let lattice: LatticeRelation<_, &str, _> =
        LatticeRelation::with_query_set(chain(), ["A", "C"]).unwrap();
    assert_eq!(lattice.node_kind(&"A"), Some(NodeKind::Query));
    assert_eq!(lattice.node_kind(&"C"), Some(NodeKind::Query));
    assert_eq!(lattice.node_kind(&"B"), None);
    assert_eq!(lattice.node_kind(&"D"), Some(NodeKind::Sink));
    assert_eq!(lattice.query_node_count(), 2);
}

#[test]
fn transitive_edges_are_reduced_for_query_sets() {
    // the closure reports A -> C directly as well as through B
    let order = |k: &&'static str| match *k {
        "A" => vec!["B", "C"],
        "B" => vec!["C"],
        _ => vec![],
    };
    let mut lattice = LatticeRelation::with_query_set(order, ["A", "B", "C"]).unwrap();
    assert_eq!(lattice.edge_count(), 2);

    lattice.put("A", "a").unwrap();
    lattice.put("B", "b").unwrap();
    lattice.make_readable();
    assert_eq!(sorted(lattice.get(&"C").unwrap()), vec!["a", "b"]);

    let mut unreduced = LatticeRelation::new(order, |_| true);
    unreduced.put("A", "a").unwrap();
    assert_eq!(unreduced.edge_count(), 3);
}

#[test]
fn dot_dump_lists_every_node() {
    let mut lattice = LatticeRelation::new(chain(), |k| *k == "D")
        .with_key_renderer(|k| k.to_lowercase());
    lattice.put("A", "x").unwrap();
    lattice.put("Q", "lost").unwrap();
    let dot = lattice.to_string();
    assert!(dot.contains("label=\"leaf(a)\""));
    assert!(dot.contains("label=\"d\" color=green"));
    assert!(dot.contains("label=\"<sink>\""));
}

#[test]
fn stacked_diamonds_of_unqueryable_keys_stay_linear() {
    // level l holds keys 2l and 2l + 1, both below both keys of level l + 1
    const LEVELS: u32 = 40;
    const TOP: u32 = 2 * LEVELS;
    let order = |k: &u32| {
        let next = (k / 2 + 1) * 2;
        if *k >= TOP {
            vec![]
        } else if next >= TOP {
            vec![TOP]
        } else {
            vec![next, next + 1]
        }
    };
    let mut lattice = LatticeRelation::new(order, |k| *k == TOP);
    lattice.put(0, 1u8).unwrap();
    lattice.put(2 * LEVELS - 1, 2).unwrap();
    lattice.put(LEVELS, 3).unwrap();
    assert_eq!(lattice.query_node_count(), 1);
    assert_eq!(lattice.edge_count(), 3);

    lattice.make_readable();
    let mut got: Vec<u8> = lattice.get(&TOP).unwrap().iter().copied().collect();
    got.sort_unstable();
    assert_eq!(got, vec![1, 2, 3]);
}
