//! End-to-end tests over the bundled demo snapshot

use loupe_core::prelude::*;

const DEMO: &str = include_str!("../../../demos/route.json");

fn demo() -> (Snapshot, Registry<Snapshot>)
{
    let snapshot = Snapshot::from_json(DEMO).unwrap();
    let registry = Registry::with_defaults().unwrap();
    (snapshot, registry)
}

fn summary_of(expression: &str) -> Option<String>
{
    let (snapshot, registry) = demo();
    let value = snapshot.evaluate(expression).unwrap();
    render(&registry, &snapshot, expression, &value, RenderOptions::default())
        .unwrap()
        .summary
}

#[test]
fn test_scalar_members()
{
    assert_eq!(summary_of("train.first_departure_").as_deref(), Some("14.11.2023 - 22:13:20"));
    assert_eq!(summary_of("train.last_arrival_").as_deref(), Some("14.11.2023 - 23:14:21"));
    assert_eq!(summary_of("train.dwell_").as_deref(), Some("1 day, 1:00:00"));
    assert_eq!(summary_of("train.first_section_").as_deref(), Some("7"));
}

#[test]
fn test_static_vector_member()
{
    let (snapshot, registry) = demo();
    let stops = snapshot.evaluate("train.stops_").unwrap();
    let tree = render(&registry, &snapshot, "stops_", &stops, RenderOptions::default()).unwrap();
    let values: Vec<_> = tree.children.iter().filter_map(|child| child.summary.as_deref()).collect();
    assert_eq!(values, ["3", "5", "8"]);
}

#[test]
fn test_index_operator_on_member()
{
    let (snapshot, registry) = demo();
    let graph = snapshot.evaluate("train.element_to_section_ids_").unwrap();
    let bucket = registry
        .invoke(&snapshot, &graph, "operator[]", &[SnapshotValue::new("unsigned long", 0_u64)])
        .unwrap()
        .unwrap();
    let tree = render(&registry, &snapshot, "bucket", &bucket, RenderOptions::default()).unwrap();
    let values: Vec<_> = tree.children.iter().filter_map(|child| child.summary.as_deref()).collect();
    assert_eq!(values, ["10", "11"]);
}

#[test]
fn test_unknown_variable()
{
    let (snapshot, _) = demo();
    assert!(matches!(
        snapshot.evaluate("timetable"),
        Err(LoupeError::InvalidExpression(_))
    ));
}
