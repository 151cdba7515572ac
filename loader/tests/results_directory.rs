mod common;

use common::{result_dir, sorted, write_raw, write_results};
use membench_loader::{
    load, load_results_benchmark_directory, Cell, Layout, LoadError, Scalar, Strategy,
};
use serde_json::json;

#[test]
fn two_nodes_with_divergent_config_are_reconciled() {
    let dir = result_dir();
    write_results(
        dir.path(),
        "nodeA/run1.json",
        vec![json!({"config": {"x": 1}, "runtime": 2.0})],
    );
    write_results(
        dir.path(),
        "nodeB/run1.json",
        vec![json!({"config": {"x": 1, "y": 5}, "runtime": 3.0})],
    );

    let table = load_results_benchmark_directory(dir.path(), &sorted()).unwrap();

    assert_eq!(table.len(), 2);
    let mut columns = table.columns().to_vec();
    columns.sort();
    assert_eq!(columns, ["config::x", "config::y", "id", "runtime"]);

    let node_a = table.filter_eq("id", &Scalar::from("nodeA"));
    let node_b = table.filter_eq("id", &Scalar::from("nodeB"));
    assert_eq!(node_a.column("config::y").unwrap(), [Cell::Missing]);
    assert_eq!(
        node_b.column("config::y").unwrap(),
        [Cell::Value(Scalar::from(5i64))]
    );
    assert_eq!(
        node_a.column("config::x").unwrap(),
        node_b.column("config::x").unwrap()
    );
}

#[test]
fn every_row_is_tagged_with_its_node_directory() {
    let dir = result_dir();
    write_results(
        dir.path(),
        "AMD1/prefetch.json",
        vec![json!({"distance": 1}), json!({"distance": 2})],
    );
    write_results(dir.path(), "AMD1/prefetch_2.json", vec![json!({"distance": 4})]);
    write_results(
        dir.path(),
        "ARM1/prefetch.json",
        vec![json!({"distance": 8, "id": "overwritten"})],
    );

    let table = load_results_benchmark_directory(dir.path(), &sorted()).unwrap();

    assert_eq!(table.len(), 4);
    assert_eq!(table.columns()[0], "id");
    assert_eq!(
        table.column("id").unwrap(),
        [
            Cell::Value(Scalar::from("AMD1")),
            Cell::Value(Scalar::from("AMD1")),
            Cell::Value(Scalar::from("AMD1")),
            Cell::Value(Scalar::from("ARM1")),
        ]
    );
}

#[test]
fn row_count_matches_records_across_files() {
    let dir = result_dir();
    for (node, count) in [("INTEL1", 3), ("INTEL2", 0), ("ARM2", 5)] {
        write_results(
            dir.path(),
            &format!("{node}/latencies.json"),
            (0..count).map(|run| json!({"run": run})).collect(),
        );
    }

    let table = load_results_benchmark_directory(dir.path(), &sorted()).unwrap();

    assert_eq!(table.len(), 8);
    assert_eq!(table.unique("id").unwrap().len(), 2);
}

#[test]
fn files_outside_node_directories_are_ignored() {
    let dir = result_dir();
    write_results(dir.path(), "stray.json", vec![json!({"stray": true})]);
    write_results(dir.path(), "nodeA/run.json", vec![json!({"runtime": 1})]);
    write_results(dir.path(), "nodeA/deeper/run.json", vec![json!({"deep": 1})]);
    write_raw(dir.path(), "nodeA/notes.txt", "not json");
    write_results(dir.path(), "nodeA/.hidden.json", vec![json!({"runtime": 2})]);

    let table = load_results_benchmark_directory(dir.path(), &sorted()).unwrap();

    assert_eq!(table.len(), 2);
    assert_eq!(table.columns(), ["id", "runtime"]);
}

#[test]
fn uniform_batches_load_identically_with_both_strategies() {
    let dir = result_dir();
    for node in ["AMD1", "AMD2", "INTEL3"] {
        write_results(
            dir.path(),
            &format!("{node}/btree.json"),
            vec![
                json!({"config": {"node_size": 16, "prefetch": true}, "lookups": 100}),
                json!({"config": {"node_size": 64, "prefetch": false}, "lookups": 90}),
            ],
        );
    }

    let reconciled = load(dir.path(), Layout::Results, Strategy::Reconciling, &sorted()).unwrap();
    let flat = load(dir.path(), Layout::Results, Strategy::Flat, &sorted()).unwrap();

    assert_eq!(reconciled, flat);
    assert_eq!(reconciled.len(), 6);
}

#[test]
fn empty_directory_has_no_records() {
    let dir = result_dir();
    write_results(dir.path(), "nodeA/empty.json", vec![]);

    assert!(matches!(
        load_results_benchmark_directory(dir.path(), &sorted()),
        Err(LoadError::NoRecords(_))
    ));
}

#[test]
fn malformed_json_fails_the_whole_load() {
    let dir = result_dir();
    write_results(dir.path(), "nodeA/good.json", vec![json!({"runtime": 1})]);
    write_raw(dir.path(), "nodeB/bad.json", "{\"results\": [");

    assert!(matches!(
        load_results_benchmark_directory(dir.path(), &sorted()),
        Err(LoadError::Ingest(_))
    ));
}

#[test]
fn missing_root_is_an_error() {
    let dir = result_dir();

    assert!(matches!(
        load_results_benchmark_directory(&dir.path().join("absent"), &sorted()),
        Err(LoadError::Collect(_))
    ));
}
