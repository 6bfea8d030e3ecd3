//! Integration tests for grouping and aggregation over graph records.

use strata_core::{EdgeId, Entry, Error, FieldData, Record};
use strata_query::ast::{ExprArena, ExprId};
use strata_query::context::{InMemoryGraph, RuntimeContext};
use strata_query::detector::AggregateDetector;
use strata_query::executor::{AggregateOperator, OpResult, Operator, ReturnItem, ValuesOp};
use strata_query::symbol_table::{SymbolKind, SymbolTable};
use strata_query::{AggregateConfig, Evaluator};

/// People graph: (id, name, age, city).
fn people() -> InMemoryGraph {
    let mut graph = InMemoryGraph::new();
    let rows = [
        (1, "ann", 30, "Oslo"),
        (2, "bob", 25, "Rome"),
        (3, "cid", 35, "Oslo"),
        (4, "dee", 40, "Rome"),
        (5, "eve", 30, "Oslo"),
    ];
    for (id, name, age, city) in rows {
        graph.add_node(
            id,
            ["Person"],
            [
                ("name", FieldData::from(name)),
                ("age", FieldData::from(age as i64)),
                ("city", FieldData::from(city)),
            ],
        );
    }
    graph.add_edge(EdgeId::new(1, 2, 0), "KNOWS", Vec::<(&str, FieldData)>::new());
    graph
}

fn node_rows(ids: &[i64]) -> Vec<Record> {
    ids.iter()
        .map(|id| Record::from_entries(vec![Entry::Node(*id)]))
        .collect()
}

fn symbols_n() -> SymbolTable {
    let mut symbols = SymbolTable::new();
    symbols.insert("n", SymbolKind::Node);
    symbols
}

/// Runs an aggregate operator to completion and returns its output rows.
fn collect_rows(
    graph: &InMemoryGraph,
    arena: &ExprArena,
    symbols: &SymbolTable,
    rows: Vec<Record>,
    items: Vec<(ExprId, &str)>,
    config: AggregateConfig,
) -> Result<Vec<Vec<Entry>>, Error> {
    let ctx = RuntimeContext::new(graph);
    let items = items
        .into_iter()
        .map(|(expr, alias)| ReturnItem::new(expr, alias))
        .collect();
    let child = Box::new(ValuesOp::new(rows));
    let mut op = AggregateOperator::new(child, items, arena, symbols, config)?;
    op.initialize(&ctx)?;
    let mut out = Vec::new();
    while op.consume(&ctx)? == OpResult::Ok {
        out.push(op.record().values().to_vec());
    }
    Ok(out)
}

#[test]
fn test_end_to_end_property_plus_one() {
    let graph = people();
    let mut symbols = SymbolTable::new();
    symbols.insert("a", SymbolKind::Node);
    let mut arena = ExprArena::new();
    let age = arena.var_prop("a", "age");
    let one = arena.int(1);
    let root = arena.add(age, one);

    let ctx = RuntimeContext::new(&graph);
    let record = Record::from_entries(vec![Entry::Node(1)]);
    let mut eval = Evaluator::new(&arena, root, &symbols);
    assert_eq!(eval.evaluate(&ctx, &record).unwrap(), Entry::constant(31i64));
}

#[test]
fn test_group_by_city() {
    let graph = people();
    let symbols = symbols_n();
    let mut arena = ExprArena::new();
    let city = arena.var_prop("n", "city");
    let age = arena.var_prop("n", "age");
    let avg = arena.agg("avg", false, vec![age]);
    let star = arena.count_star();

    let out = collect_rows(
        &graph,
        &arena,
        &symbols,
        node_rows(&[1, 2, 3, 4, 5]),
        vec![(city, "city"), (avg, "avg"), (star, "n")],
        AggregateConfig::default(),
    )
    .unwrap();
    assert_eq!(
        out,
        vec![
            vec![Entry::constant("Oslo"), Entry::constant(95.0 / 3.0), Entry::constant(3i64)],
            vec![Entry::constant("Rome"), Entry::constant(32.5), Entry::constant(2i64)],
        ]
    );
}

#[test]
fn test_group_by_round_trip() {
    // Every input key appears exactly once and the counts add up.
    let graph = people();
    let symbols = symbols_n();
    let mut arena = ExprArena::new();
    let age = arena.var_prop("n", "age");
    let star = arena.count_star();
    let out = collect_rows(
        &graph,
        &arena,
        &symbols,
        node_rows(&[1, 2, 3, 4, 5, 1, 2]),
        vec![(age, "age"), (star, "n")],
        AggregateConfig::default(),
    )
    .unwrap();
    let keys: Vec<_> = out.iter().map(|row| row[0].clone()).collect();
    assert_eq!(
        keys,
        vec![
            Entry::constant(30i64),
            Entry::constant(25i64),
            Entry::constant(35i64),
            Entry::constant(40i64),
        ]
    );
    let total: i64 = out
        .iter()
        .map(|row| row[1].as_constant().and_then(FieldData::as_i64).unwrap())
        .sum();
    assert_eq!(total, 7);
}

#[test]
fn test_group_by_entity_is_snapshotted() {
    let mut graph = people();
    let symbols = symbols_n();
    let mut arena = ExprArena::new();
    let n = arena.var("n");
    let star = arena.count_star();
    graph.invalidate_node(1);
    let out = collect_rows(
        &graph,
        &arena,
        &symbols,
        node_rows(&[1, 1]),
        vec![(n, "n"), (star, "c")],
        AggregateConfig::default(),
    )
    .unwrap();
    assert_eq!(out, vec![vec![Entry::NodeSnapshot(1), Entry::constant(2i64)]]);
}

#[test]
fn test_count_variants_over_optional_miss() {
    let graph = people();
    let mut symbols = SymbolTable::new();
    symbols.insert("x", SymbolKind::Constant);
    let mut arena = ExprArena::new();
    let star = arena.count_star();
    let x = arena.var("x");
    let count_x = arena.count(x);
    let count_distinct = arena.agg("count", true, vec![x]);

    let rows = vec![
        Record::from_entries(vec![Entry::constant(7i64)]),
        Record::from_entries(vec![Entry::constant(7i64)]),
        Record::from_entries(vec![Entry::constant(9i64)]),
        Record::null_marker(1),
    ];
    let out = collect_rows(
        &graph,
        &arena,
        &symbols,
        rows,
        vec![(star, "star"), (count_x, "x"), (count_distinct, "dx")],
        AggregateConfig::default(),
    )
    .unwrap();
    assert_eq!(
        out,
        vec![vec![Entry::constant(3i64), Entry::constant(3i64), Entry::constant(2i64)]]
    );
}

#[test]
fn test_count_star_with_null_marker() {
    let graph = people();
    let symbols = symbols_n();
    let mut arena = ExprArena::new();
    let star = arena.count_star();
    let n = arena.var("n");
    let count_n = arena.count(n);
    let mut rows = node_rows(&[1, 2]);
    rows.push(Record::null_marker(1));
    let out = collect_rows(
        &graph,
        &arena,
        &symbols,
        rows,
        vec![(star, "star"), (count_n, "n")],
        AggregateConfig::default(),
    )
    .unwrap();
    assert_eq!(out, vec![vec![Entry::constant(2i64), Entry::constant(2i64)]]);
}

#[test]
fn test_collect_distinct() {
    let graph = people();
    let symbols = symbols_n();
    let mut arena = ExprArena::new();
    let city = arena.var_prop("n", "city");
    let all = arena.agg("collect", false, vec![city]);
    let distinct = arena.agg("collect", true, vec![city]);
    let out = collect_rows(
        &graph,
        &arena,
        &symbols,
        node_rows(&[1, 2, 3, 4]),
        vec![(all, "all"), (distinct, "distinct")],
        AggregateConfig::default(),
    )
    .unwrap();
    let list = |items: &[&str]| {
        Entry::constant(FieldData::Array(items.iter().map(|s| FieldData::from(*s)).collect()))
    };
    assert_eq!(
        out,
        vec![vec![
            list(&["Oslo", "Rome", "Oslo", "Rome"]),
            list(&["Oslo", "Rome"]),
        ]]
    );
}

#[test]
fn test_percentiles_and_dispersion() {
    let graph = people();
    let symbols = symbols_n();
    let mut arena = ExprArena::new();
    let age = arena.var_prop("n", "age");
    let half = arena.double(0.5);
    let disc = arena.agg("percentileDisc", false, vec![age, half]);
    let cont = arena.agg("percentileCont", false, vec![age, half]);
    let var = arena.agg("varianceP", false, vec![age]);
    let out = collect_rows(
        &graph,
        &arena,
        &symbols,
        node_rows(&[1, 2, 3, 4]),
        vec![(disc, "disc"), (cont, "cont"), (var, "var")],
        AggregateConfig::default(),
    )
    .unwrap();
    // ages 25, 30, 35, 40
    assert_eq!(
        out,
        vec![vec![Entry::constant(30.0), Entry::constant(32.5), Entry::constant(31.25)]]
    );
}

#[test]
fn test_invalid_percentile_aborts() {
    let graph = people();
    let symbols = symbols_n();
    let mut arena = ExprArena::new();
    let age = arena.var_prop("n", "age");
    let p = arena.double(2.0);
    let disc = arena.agg("percentileDisc", false, vec![age, p]);
    let err = collect_rows(
        &graph,
        &arena,
        &symbols,
        node_rows(&[1]),
        vec![(disc, "p")],
        AggregateConfig::default(),
    )
    .unwrap_err();
    assert_eq!(err, Error::InvalidPercentile { value: 2.0 });
}

#[test]
fn test_nesting_and_mixed_scope_rejected() {
    let symbols = symbols_n();
    let mut arena = ExprArena::new();
    let age = arena.var_prop("n", "age");
    let max = arena.agg("max", false, vec![age]);
    let nested = arena.sum(max);
    let mut detector = AggregateDetector::new(&arena, nested);
    assert!(!detector.validate());

    let total = arena.sum(age);
    let name = arena.var_prop("m", "name");
    let mixed = arena.add(total, name);
    let mut detector = AggregateDetector::new(&arena, mixed);
    assert!(!detector.validate());

    let graph = people();
    let err = collect_rows(
        &graph,
        &arena,
        &symbols,
        node_rows(&[1]),
        vec![(mixed, "bad")],
        AggregateConfig::default(),
    )
    .unwrap_err();
    assert!(matches!(err, Error::MixedAggregateScope { .. }));
}

#[test]
fn test_aggregate_step_error_aborts() {
    let graph = people();
    let symbols = symbols_n();
    let mut arena = ExprArena::new();
    let name = arena.var_prop("n", "name");
    let total = arena.sum(name);
    let err = collect_rows(
        &graph,
        &arena,
        &symbols,
        node_rows(&[1, 2]),
        vec![(total, "total")],
        AggregateConfig::default(),
    )
    .unwrap_err();
    assert!(matches!(err, Error::AggregateStep { .. }));
    assert!(err.to_string().starts_with("sum: "));
}

#[test]
fn test_aggregate_arithmetic_with_literal() {
    let graph = people();
    let symbols = symbols_n();
    let mut arena = ExprArena::new();
    let star = arena.count_star();
    let ten = arena.int(10);
    let scaled = arena.mul(star, ten);
    let out = collect_rows(
        &graph,
        &arena,
        &symbols,
        node_rows(&[1, 2, 3]),
        vec![(scaled, "scaled")],
        AggregateConfig::default(),
    )
    .unwrap();
    assert_eq!(out, vec![vec![Entry::constant(30i64)]]);
}

#[test]
fn test_empty_global_group() {
    let graph = people();
    let symbols = symbols_n();
    let mut arena = ExprArena::new();
    let star = arena.count_star();
    let age = arena.var_prop("n", "age");
    let avg = arena.agg("avg", false, vec![age]);
    let all = arena.agg("collect", false, vec![age]);
    let items = vec![(star, "n"), (avg, "avg"), (all, "all")];

    let out = collect_rows(
        &graph,
        &arena,
        &symbols,
        Vec::new(),
        items.clone(),
        AggregateConfig::default(),
    )
    .unwrap();
    assert_eq!(
        out,
        vec![vec![
            Entry::constant(0i64),
            Entry::null(),
            Entry::constant(FieldData::Array(Vec::new())),
        ]]
    );

    let out = collect_rows(
        &graph,
        &arena,
        &symbols,
        Vec::new(),
        items,
        AggregateConfig::default().with_empty_global_group(false),
    )
    .unwrap();
    assert!(out.is_empty());
}
