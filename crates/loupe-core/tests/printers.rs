//! Tests for the printers against a snapshot host

use loupe_core::prelude::*;

const UNIXTIME: &str = "soro::unixtime";
const SECONDS: &str = "std::chrono::duration<unsigned int, std::ratio<1, 1> >";
const SYS_DURATION: &str = "std::chrono::duration<long, std::ratio<1, 1> >";
const SYS_SECONDS: &str =
    "std::chrono::time_point<std::chrono::system_clock, std::chrono::duration<long, std::ratio<1, 1> > >";
const STATIC_VECTOR: &str = "soro::utls::static_vector<unsigned int, 8>";
const STD_ARRAY: &str = "std::array<unsigned int, 8>";
const DATA_VECTOR: &str = "cista::basic_vector<unsigned int>";
const OFFSETS_VECTOR: &str = "cista::basic_vector<unsigned long>";
const VECVEC: &str = "cista::basic_vecvec<unsigned int, cista::basic_vector<unsigned int>>";

fn time_types(snapshot: Snapshot) -> Snapshot
{
    snapshot
        .with_type(TypeDescriptor::structure(UNIXTIME, [("t_", "long")]).with_size(8))
        .with_type(TypeDescriptor::structure(SECONDS, [("__r", "unsigned int")]).with_size(4))
        .with_type(TypeDescriptor::structure(SYS_DURATION, [("__r", "long")]).with_size(8))
        .with_type(TypeDescriptor::structure(SYS_SECONDS, [("__d", SYS_DURATION)]).with_size(8))
        .with_alias("soro::absolute_time", UNIXTIME)
}

fn static_vector(end: u64) -> (Snapshot, SnapshotValue)
{
    let snapshot = Snapshot::new()
        .with_type(TypeDescriptor::structure(STATIC_VECTOR, [("mem_", STD_ARRAY), ("end_", "unsigned long")]))
        .with_type(TypeDescriptor::structure(STD_ARRAY, [("_M_elems", "unsigned int[8]")]).with_size(32))
        .with_type(
            TypeDescriptor::new("unsigned int[8]", TypeKind::Array { length: 8 })
                .with_size(32)
                .with_target("unsigned int"),
        );
    let storage = Datum::Elements((10..18_u64).map(Datum::UInt).collect());
    let value = SnapshotValue::new(
        STATIC_VECTOR,
        Datum::fields([
            ("mem_", Datum::fields([("_M_elems", storage)])),
            ("end_", Datum::UInt(end)),
        ]),
    );
    (snapshot, value)
}

/// `[[10, 11], [], [20, 21, 22]]`, stored flat at 0x1000 with offsets at 0x2000.
fn vecvec_snapshot(offsets: &[u64]) -> Snapshot
{
    Snapshot::new()
        .with_type(
            TypeDescriptor::structure(DATA_VECTOR, [("el_", "unsigned int*"), ("used_size_", "unsigned long")])
                .with_size(16),
        )
        .with_type(
            TypeDescriptor::structure(OFFSETS_VECTOR, [("el_", "unsigned long*"), ("used_size_", "unsigned long")])
                .with_size(16),
        )
        .with_alias(format!("{DATA_VECTOR}::value_type"), "unsigned int")
        .with_type(
            TypeDescriptor::structure(VECVEC, [("bucket_starts_", OFFSETS_VECTOR), ("data_", DATA_VECTOR)])
                .with_size(32),
        )
        .with_allocation(0x1000_u64, "unsigned int", [10, 11, 20, 21, 22].map(Datum::UInt))
        .with_allocation(0x2000_u64, "unsigned long", offsets.iter().copied().map(Datum::UInt))
        .with_variable(
            "graph",
            VECVEC,
            Datum::fields([
                (
                    "data_",
                    Datum::fields([("el_", Datum::UInt(0x1000)), ("used_size_", Datum::UInt(5))]),
                ),
                (
                    "bucket_starts_",
                    Datum::fields([
                        ("el_", Datum::UInt(0x2000)),
                        ("used_size_", Datum::UInt(offsets.len() as u64)),
                    ]),
                ),
            ]),
        )
}

fn summary(snapshot: &Snapshot, value: &SnapshotValue) -> Option<String>
{
    let registry = Registry::<Snapshot>::with_defaults().unwrap();
    render(&registry, snapshot, "value", value, RenderOptions::default())
        .unwrap()
        .summary
}

fn elements(snapshot: &Snapshot, value: &SnapshotValue) -> Vec<i128>
{
    let length = snapshot.describe(value).unwrap().array_length().unwrap();
    (0..length)
        .map(|i| snapshot.to_integer(&snapshot.element(value, i).unwrap()).unwrap())
        .collect()
}

#[test]
fn test_epoch_timestamp_zero()
{
    let snapshot = time_types(Snapshot::new());
    let value = SnapshotValue::new(UNIXTIME, Datum::fields([("t_", Datum::Int(0))]));
    assert_eq!(summary(&snapshot, &value).as_deref(), Some("01.01.1970 - 00:00:00"));
}

#[test]
fn test_timestamp_through_alias_and_qualifiers()
{
    let snapshot = time_types(Snapshot::new());
    let value = SnapshotValue::new("const soro::absolute_time &", Datum::fields([("t_", Datum::Int(1_700_000_000))]));
    assert_eq!(summary(&snapshot, &value).as_deref(), Some("14.11.2023 - 22:13:20"));
}

#[test]
fn test_system_clock_time_point()
{
    let snapshot = time_types(Snapshot::new());
    let value = SnapshotValue::new(
        SYS_SECONDS,
        Datum::fields([("__d", Datum::fields([("__r", Datum::Int(86_400))]))]),
    );
    assert_eq!(summary(&snapshot, &value).as_deref(), Some("02.01.1970 - 00:00:00"));
}

#[test]
fn test_duration_summaries()
{
    let snapshot = time_types(Snapshot::new());
    let duration = |seconds: u64| SnapshotValue::new(SECONDS, Datum::fields([("__r", Datum::UInt(seconds))]));
    assert_eq!(summary(&snapshot, &duration(3661)).as_deref(), Some("1:01:01"));
    assert_eq!(summary(&snapshot, &duration(90_000)).as_deref(), Some("1 day, 1:00:00"));
}

#[test]
fn test_negative_duration_is_rejected()
{
    let snapshot = time_types(Snapshot::new());
    let registry = Registry::<Snapshot>::with_defaults().unwrap();
    let value = SnapshotValue::new(SECONDS, Datum::fields([("__r", Datum::Int(-5))]));
    let printer = registry.printer_for(&snapshot, &value).unwrap().unwrap();
    assert!(matches!(printer.summary(&snapshot), Err(LoupeError::InvalidArgument(_))));
}

#[test]
fn test_missing_field_falls_back_to_default_formatter()
{
    let snapshot = Snapshot::new().with_type(TypeDescriptor::structure(UNIXTIME, [("seconds", "long")]));
    let registry = Registry::<Snapshot>::with_defaults().unwrap();
    let value = SnapshotValue::new(UNIXTIME, Datum::fields([("seconds", Datum::Int(0))]));
    assert!(registry.printer_for(&snapshot, &value).unwrap().is_none());

    let tree = render(&registry, &snapshot, "departure", &value, RenderOptions::default()).unwrap();
    assert_eq!(tree.summary, None);
    assert_eq!(tree.children.len(), 1);
    assert_eq!(tree.children[0].name, "seconds");
    assert_eq!(tree.children[0].summary.as_deref(), Some("0"));
}

#[test]
fn test_mismatched_strong_id_does_not_hide_siblings()
{
    let strong = "cista::strong<unsigned int, tag>";
    let snapshot = Snapshot::new()
        .with_type(TypeDescriptor::structure(strong, [("value", "unsigned int")]).with_size(4))
        .with_type(TypeDescriptor::structure("holder", [("id_", strong), ("n_", "unsigned long")]));
    let registry = Registry::<Snapshot>::with_defaults().unwrap();
    let value = SnapshotValue::new(
        "holder",
        Datum::fields([
            ("id_", Datum::fields([("value", Datum::UInt(5))])),
            ("n_", Datum::UInt(9)),
        ]),
    );

    let tree = render(&registry, &snapshot, "holder", &value, RenderOptions::default()).unwrap();
    let names: Vec<_> = tree.children.iter().map(|child| child.name.as_str()).collect();
    assert_eq!(names, ["id_", "n_"]);
    assert_eq!(tree.children[1].summary.as_deref(), Some("9"));

    let id = &tree.children[0];
    assert_eq!(id.summary, None);
    assert_eq!(id.children.len(), 1);
    assert_eq!(id.children[0].name, "value");
    assert_eq!(id.children[0].summary.as_deref(), Some("5"));
}

#[test]
fn test_pass_through_wrappers()
{
    let strong = "cista::strong<unsigned int, soro::si::_length>";
    let fraction = "soro::utls::fraction<double, soro::si::_speed>";
    let optional = "soro::utls::optional<soro::unixtime, 0>";
    let snapshot = time_types(Snapshot::new())
        .with_type(TypeDescriptor::structure(strong, [("v_", "unsigned int")]))
        .with_type(TypeDescriptor::structure(fraction, [("val_", "double")]))
        .with_type(TypeDescriptor::structure(optional, [("val_", UNIXTIME)]));

    let value = SnapshotValue::new(strong, Datum::fields([("v_", Datum::UInt(42))]));
    assert_eq!(summary(&snapshot, &value).as_deref(), Some("42"));

    let value = SnapshotValue::new(fraction, Datum::fields([("val_", Datum::Float(2.5))]));
    assert_eq!(summary(&snapshot, &value).as_deref(), Some("2.5"));

    // The payload is formatted by its own printer
    let value = SnapshotValue::new(
        optional,
        Datum::fields([("val_", Datum::fields([("t_", Datum::Int(0))]))]),
    );
    assert_eq!(summary(&snapshot, &value).as_deref(), Some("01.01.1970 - 00:00:00"));
}

#[test]
fn test_static_vector_shows_only_constructed_elements()
{
    let (snapshot, value) = static_vector(3);
    let registry = Registry::<Snapshot>::with_defaults().unwrap();
    let printer = registry.printer_for(&snapshot, &value).unwrap().unwrap();

    let children = printer.children(&snapshot).unwrap();
    let names: Vec<_> = children.iter().map(|child| child.name.as_str()).collect();
    assert_eq!(names, ["[0]", "[1]", "[2]"]);
    let values: Vec<_> = children
        .iter()
        .map(|child| snapshot.to_integer(&child.value).unwrap())
        .collect();
    assert_eq!(values, [10, 11, 12]);
    assert_eq!(children[0].value.type_name, "unsigned int");
    assert!(printer.display_hint().is_some());
}

#[test]
fn test_static_vector_empty_and_full()
{
    let registry = Registry::<Snapshot>::with_defaults().unwrap();

    let (snapshot, value) = static_vector(0);
    let printer = registry.printer_for(&snapshot, &value).unwrap().unwrap();
    assert!(printer.children(&snapshot).unwrap().is_empty());

    let (snapshot, value) = static_vector(8);
    let printer = registry.printer_for(&snapshot, &value).unwrap().unwrap();
    assert_eq!(printer.children(&snapshot).unwrap().len(), 8);
}

#[test]
fn test_static_vector_length_past_capacity()
{
    let (snapshot, value) = static_vector(9);
    let registry = Registry::<Snapshot>::with_defaults().unwrap();
    assert!(matches!(
        registry.printer_for(&snapshot, &value),
        Err(LoupeError::CorruptLength { len: 9, capacity: 8 })
    ));
}

#[test]
fn test_vecvec_buckets()
{
    let snapshot = vecvec_snapshot(&[0, 2, 2, 5]);
    let registry = Registry::<Snapshot>::with_defaults().unwrap();
    let graph = snapshot.variable("graph").unwrap();
    let printer = registry.printer_for(&snapshot, &graph).unwrap().unwrap();

    let children = printer.children(&snapshot).unwrap();
    let names: Vec<_> = children.iter().map(|child| child.name.as_str()).collect();
    assert_eq!(names, ["[0]", "[1]", "[2]"]);
    assert!(children.iter().all(|child| child.value.type_name == "std::span<unsigned int>"));

    let buckets: Vec<_> = children.iter().map(|child| elements(&snapshot, &child.value)).collect();
    assert_eq!(buckets, [vec![10, 11], vec![], vec![20, 21, 22]]);
}

#[test]
fn test_vecvec_without_buckets()
{
    let snapshot = vecvec_snapshot(&[0]);
    let registry = Registry::<Snapshot>::with_defaults().unwrap();
    let graph = snapshot.variable("graph").unwrap();
    let printer = registry.printer_for(&snapshot, &graph).unwrap().unwrap();
    assert!(printer.children(&snapshot).unwrap().is_empty());
}

#[test]
fn test_vecvec_corrupt_offsets()
{
    let snapshot = vecvec_snapshot(&[0, 3, 2, 5]);
    let registry = Registry::<Snapshot>::with_defaults().unwrap();
    let graph = snapshot.variable("graph").unwrap();
    let printer = registry.printer_for(&snapshot, &graph).unwrap().unwrap();
    assert!(matches!(
        printer.children(&snapshot),
        Err(LoupeError::CorruptOffsets { index: 1, start: 3, end: 2 })
    ));
}

#[test]
fn test_vecvec_reads_only_shown_offsets()
{
    // The offset closing the last bucket is corrupt; it is never read when
    // fewer buckets are shown
    let snapshot = vecvec_snapshot(&[0, 2, 2, 1]);
    let registry = Registry::<Snapshot>::with_defaults().unwrap();
    let graph = snapshot.variable("graph").unwrap();
    let printer = registry.printer_for(&snapshot, &graph).unwrap().unwrap();

    assert!(matches!(
        printer.children(&snapshot),
        Err(LoupeError::CorruptOffsets { index: 2, start: 2, end: 1 })
    ));
    let children = printer.children_up_to(&snapshot, 2).unwrap();
    assert_eq!(children.len(), 2);
    assert_eq!(elements(&snapshot, &children[0].value), [10, 11]);

    let options = RenderOptions {
        max_depth: 8,
        max_children: 1,
    };
    let tree = render(&registry, &snapshot, "graph", &graph, options).unwrap();
    assert_eq!(tree.children.len(), 1);
    assert!(tree.truncated);
}

#[test]
fn test_index_operator_returns_bucket_span()
{
    let snapshot = vecvec_snapshot(&[0, 2, 2, 5]);
    let registry = Registry::<Snapshot>::with_defaults().unwrap();
    let graph = snapshot.variable("graph").unwrap();

    let bucket = registry
        .invoke(&snapshot, &graph, "operator[]", &[SnapshotValue::new("unsigned long", 2_u64)])
        .unwrap()
        .unwrap();
    assert_eq!(bucket.type_name, "std::span<unsigned int>");
    assert_eq!(elements(&snapshot, &bucket), [20, 21, 22]);

    let empty = registry
        .invoke(&snapshot, &graph, "operator[]", &[SnapshotValue::new("unsigned long", 1_u64)])
        .unwrap()
        .unwrap();
    assert_eq!(snapshot.describe(&empty).unwrap().array_length(), Some(0));
}

#[test]
fn test_index_operator_past_end()
{
    let snapshot = vecvec_snapshot(&[0, 2, 2, 5]);
    let registry = Registry::<Snapshot>::with_defaults().unwrap();
    let graph = snapshot.variable("graph").unwrap();
    let result = registry.invoke(&snapshot, &graph, "operator[]", &[SnapshotValue::new("unsigned long", 3_u64)]);
    assert!(matches!(result, Err(LoupeError::IndexOutOfBounds { index: 3, len: 3 })));
}

#[test]
fn test_index_operator_through_pointer_receiver()
{
    let snapshot = vecvec_snapshot(&[0, 2, 2, 5]);
    let graph = snapshot.variable("graph").unwrap();
    let snapshot = snapshot.with_allocation(0x3000_u64, VECVEC, [graph.datum]);
    let registry = Registry::<Snapshot>::with_defaults().unwrap();

    let this = SnapshotValue::new(format!("{VECVEC} *"), 0x3000_u64);
    let bucket = registry
        .invoke(&snapshot, &this, "operator[]", &[SnapshotValue::new("unsigned long", 0_u64)])
        .unwrap()
        .unwrap();
    assert_eq!(elements(&snapshot, &bucket), [10, 11]);
}

#[test]
fn test_index_operator_contract()
{
    let snapshot = vecvec_snapshot(&[0, 2, 2, 5]);
    let registry = Registry::<Snapshot>::with_defaults().unwrap();
    let graph = snapshot.variable("graph").unwrap();

    let method = registry.method_for(&snapshot, VECVEC, "operator[]").unwrap();
    assert_eq!(method.argument_types(), ["unsigned long"]);
    assert_eq!(
        method.result_type(&snapshot, &graph, &[]).unwrap(),
        "std::span<unsigned int>"
    );
    assert!(matches!(
        method.invoke(&snapshot, &graph, &[]),
        Err(LoupeError::InvalidArgument(_))
    ));
    assert!(registry.method_for(&snapshot, VECVEC, "size").is_none());
}

#[test]
fn test_bucket_family_is_not_claimed()
{
    let bucket_vecvec = "cista::basic_vecvec<unsigned int, cista::paged<cista::basic_vector<unsigned int>>, bucket>";
    let snapshot = Snapshot::new().with_type(TypeDescriptor::structure(bucket_vecvec, [("size_", "unsigned long")]));
    let registry = Registry::<Snapshot>::with_defaults().unwrap();
    let value = SnapshotValue::new(bucket_vecvec, Datum::fields([("size_", Datum::UInt(0))]));

    assert!(registry.printer_for(&snapshot, &value).unwrap().is_none());
    assert!(registry.method_for(&snapshot, bucket_vecvec, "operator[]").is_none());
    assert_eq!(
        registry
            .invoke(&snapshot, &value, "operator[]", &[SnapshotValue::new("unsigned long", 0_u64)])
            .unwrap(),
        None
    );
}
