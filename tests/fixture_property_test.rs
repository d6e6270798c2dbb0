//! Properties that hold for every generated diagram, checked over a spread
//! of seeds and scales.

use ahash::AHashSet;
use erd_fixture_gen::{Generator, Scale};
use erd_relational::io::parse_diagram;
use erd_relational::model::{AttributeFlag, Diagram, ErDiagram, ErNode, RelationalDiagram};
use erd_relational::repair::repair;
use erd_relational::transform::{transform_er_with_stats, TransformOptions};
use erd_relational::validate::{validate_er, Severity};

const SEEDS: [u64; 6] = [1, 7, 42, 1234, 98765, 12345];

fn generated(seed: u64, scale: Scale) -> ErDiagram {
    let value = Generator::new(seed, scale).generate();
    match parse_diagram(&value.to_string()).unwrap() {
        Diagram::Er(er) => er,
        Diagram::Relational(_) => panic!("generator produced a relational diagram"),
    }
}

fn repaired(seed: u64, scale: Scale) -> ErDiagram {
    let mut er = generated(seed, scale);
    repair(&mut er);
    er
}

fn options() -> TransformOptions {
    TransformOptions {
        updated_at: Some(0),
    }
}

fn all_cases() -> impl Iterator<Item = (u64, Scale)> {
    SEEDS
        .iter()
        .flat_map(|&seed| [(seed, Scale::Small), (seed, Scale::Medium)])
        .chain(std::iter::once((3, Scale::Large)))
}

fn table_ids(out: &RelationalDiagram) -> AHashSet<&str> {
    out.data.tables().map(|t| t.id()).collect()
}

#[test]
fn test_repaired_fixtures_validate_cleanly() {
    for (seed, scale) in all_cases() {
        let er = repaired(seed, scale);
        let issues = validate_er(&er);
        let serious: Vec<_> = issues
            .iter()
            .filter(|i| i.severity != Severity::Info)
            .map(|i| i.to_string())
            .collect();
        assert!(
            serious.is_empty(),
            "seed {} {:?}: {:?}",
            seed,
            scale,
            serious
        );
    }
}

#[test]
fn test_unrepaired_fixtures_report_missing_links() {
    let er = generated(42, Scale::Small);
    let issues = validate_er(&er);
    assert!(issues.iter().any(|i| i.code == "ORPHAN_ATTRIBUTE"));
    assert!(issues.iter().any(|i| i.code == "UNKNOWN_RELATIONSHIP_ENTITY"));
}

#[test]
fn test_column_positions_are_dense() {
    for (seed, scale) in all_cases() {
        let (out, _) = transform_er_with_stats(&repaired(seed, scale), &options());
        for table in out.data.tables() {
            let positions: Vec<usize> = table.columns().iter().map(|c| c.position).collect();
            let expected: Vec<usize> = (0..positions.len()).collect();
            assert_eq!(positions, expected, "table {} (seed {})", table.label(), seed);
        }
    }
}

#[test]
fn test_every_table_has_a_primary_key() {
    for (seed, scale) in all_cases() {
        let (out, _) = transform_er_with_stats(&repaired(seed, scale), &options());
        for table in out.data.tables() {
            assert!(
                table.primary_keys().next().is_some(),
                "table {} has no key (seed {})",
                table.label(),
                seed
            );
        }
    }
}

#[test]
fn test_references_point_at_tables() {
    for (seed, scale) in all_cases() {
        let (out, _) = transform_er_with_stats(&repaired(seed, scale), &options());
        let tables = table_ids(&out);

        for edge in &out.data.edges {
            assert!(tables.contains(edge.source.as_str()), "edge {} source", edge.id);
            assert!(tables.contains(edge.target.as_str()), "edge {} target", edge.id);
            assert_eq!(edge.data.foreign_key_props.source_table_id, edge.source);
        }
        for table in out.data.tables() {
            for column in table.columns().iter().filter(|c| c.is_foreign_key) {
                let props = column
                    .foreign_key_props
                    .as_ref()
                    .expect("foreign key without props");
                assert!(tables.contains(props.source_table_id.as_str()));
            }
        }
    }
}

#[test]
fn test_conversion_is_deterministic() {
    for (seed, scale) in all_cases() {
        let er = repaired(seed, scale);
        let first = transform_er_with_stats(&er, &options());
        let second = transform_er_with_stats(&er, &options());
        assert_eq!(first, second, "seed {} {:?}", seed, scale);
    }
}

#[test]
fn test_stats_match_output() {
    for (seed, scale) in all_cases() {
        let er = repaired(seed, scale);
        let entity_count = er
            .data
            .nodes
            .iter()
            .filter(|n| matches!(n, ErNode::Entity(_)))
            .count();
        let (out, stats) = transform_er_with_stats(&er, &options());

        assert_eq!(stats.entity_tables, entity_count);
        assert_eq!(stats.tables, out.data.tables().count());
        assert_eq!(
            stats.tables,
            stats.entity_tables + stats.associative_tables + stats.satellite_tables
        );
        assert_eq!(stats.edges, out.data.edges.len());
        let columns: usize = out.data.tables().map(|t| t.columns().len()).sum();
        assert_eq!(stats.columns, columns);
    }
}

#[test]
fn test_derived_attributes_never_become_columns() {
    for (seed, scale) in all_cases() {
        let er = repaired(seed, scale);
        let derived: AHashSet<&str> = er
            .data
            .nodes
            .iter()
            .filter_map(|n| match n {
                ErNode::Attribute(a) if a.flags().contains(AttributeFlag::Derived) => Some(a.id()),
                _ => None,
            })
            .collect();

        let (out, _) = transform_er_with_stats(&er, &options());
        for table in out.data.tables() {
            for column in table.columns() {
                assert!(!derived.contains(column.id.as_str()), "derived column {}", column.name);
            }
        }
    }
}
