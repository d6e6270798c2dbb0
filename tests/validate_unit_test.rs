//! Unit tests for semantic validation of ER diagrams.

mod common;

use common::*;
use erd_relational::model::AttributeFlag::{Composite, Derived};
use erd_relational::model::{AttributeEdge, Diagram, ErEdge, ErNode, RelationshipEdge};
use erd_relational::validate::{validate_diagram, validate_er, Severity, ValidationIssue};

fn codes(issues: &[ValidationIssue]) -> Vec<&'static str> {
    issues.iter().map(|i| i.code).collect()
}

fn find<'a>(issues: &'a [ValidationIssue], code: &str) -> &'a ValidationIssue {
    issues
        .iter()
        .find(|i| i.code == code)
        .unwrap_or_else(|| panic!("no {} issue in {:?}", code, codes(issues)))
}

fn clean_school() -> Vec<ErNode> {
    vec![
        entity("s", "Student"),
        entity("c", "Course"),
        relationship("r", "Enrolls", many("s"), many("c")),
        attribute("n", "Name", "s", &[]),
        attribute("addr", "Address", "s", &[Composite]),
        attribute("street", "Street", "addr", &[]),
    ]
}

#[test]
fn test_clean_diagram_has_no_issues() {
    let issues = validate_er(&diagram("School", clean_school()));
    assert!(issues.is_empty(), "unexpected issues: {:?}", codes(&issues));
}

#[test]
fn test_duplicate_node_id_reported_once() {
    let issues = validate_er(&diagram(
        "School",
        vec![
            entity("s", "Student"),
            entity("s", "Student2"),
            entity("s", "Student3"),
        ],
    ));

    assert_eq!(codes(&issues), vec!["DUPLICATE_NODE_ID"]);
    let issue = &issues[0];
    assert_eq!(issue.severity, Severity::Error);
    assert_eq!(issue.location.as_ref().unwrap().node.as_deref(), Some("s"));
}

#[test]
fn test_orphan_and_dangling_attributes() {
    let mut orphan = attribute("o", "Orphan", "s", &[]);
    if let ErNode::Attribute(a) = &mut orphan {
        a.parent_id = None;
    }
    let issues = validate_er(&diagram(
        "School",
        vec![
            entity("s", "Student"),
            orphan,
            attribute("d", "Dangling", "nowhere", &[]),
        ],
    ));

    assert_eq!(
        codes(&issues),
        vec!["ORPHAN_ATTRIBUTE", "DANGLING_ATTRIBUTE_PARENT"]
    );
    assert!(issues.iter().all(|i| i.severity == Severity::Warning));
}

#[test]
fn test_attribute_cycle_is_an_error() {
    let issues = validate_er(&diagram(
        "School",
        vec![
            attribute("x", "X", "y", &[]),
            attribute("y", "Y", "x", &[]),
        ],
    ));

    let cycles: Vec<_> = issues.iter().filter(|i| i.code == "ATTRIBUTE_CYCLE").collect();
    assert_eq!(cycles.len(), 2);
    assert!(cycles.iter().all(|i| i.severity == Severity::Error));
}

#[test]
fn test_empty_composite_warns() {
    let issues = validate_er(&diagram(
        "School",
        vec![
            entity("s", "Student"),
            attribute("addr", "Address", "s", &[Composite]),
        ],
    ));
    assert_eq!(codes(&issues), vec!["EMPTY_COMPOSITE"]);
}

#[test]
fn test_missing_supertype() {
    let issues = validate_er(&diagram(
        "People",
        vec![
            subtype("st", "Student", "ghost"),
            subtype("t", "Teacher", "st"),
        ],
    ));
    assert_eq!(codes(&issues), vec!["MISSING_SUPERTYPE"]);
    assert!(find(&issues, "MISSING_SUPERTYPE").message.contains("ghost"));
}

#[test]
fn test_weak_entity_needs_identifying_relationship() {
    let issues = validate_er(&diagram(
        "Campus",
        vec![
            entity("b", "Building"),
            weak_entity("w", "Room"),
            relationship("r", "Has", one("b"), many("w")),
        ],
    ));
    assert_eq!(codes(&issues), vec!["WEAK_WITHOUT_IDENTIFYING"]);

    let issues = validate_er(&diagram(
        "Campus",
        vec![
            entity("b", "Building"),
            weak_entity("w", "Room"),
            identifying("r", "Has", one("b"), many("w")),
        ],
    ));
    assert!(issues.is_empty());
}

#[test]
fn test_relationship_checks() {
    let issues = validate_er(&diagram(
        "School",
        vec![
            entity("s", "Student"),
            entity("c", "Course"),
            ErNode::Relationship(relationship_node("half", "Half", Some(one("s")), None)),
            relationship("off", "Off", disabled("s"), many("c")),
            relationship("ghost", "Ghost", one("nobody"), many("c")),
        ],
    ));

    assert_eq!(
        codes(&issues),
        vec![
            "MISSING_ENTITY_DETAILS",
            "DISABLED_RELATIONSHIP",
            "UNKNOWN_RELATIONSHIP_ENTITY"
        ]
    );
    assert_eq!(find(&issues, "DISABLED_RELATIONSHIP").severity, Severity::Info);
}

#[test]
fn test_edge_checks() {
    let edges = vec![
        ErEdge::Relationship(RelationshipEdge {
            id: "r->s".to_string(),
            source: "r".to_string(),
            target: "s".to_string(),
            data: None,
        }),
        ErEdge::Attribute(AttributeEdge {
            id: "s->gone".to_string(),
            source: "s".to_string(),
            target: "gone".to_string(),
        }),
    ];
    let issues = validate_er(&diagram_with_edges(
        "School",
        vec![
            entity("s", "Student"),
            entity("c", "Course"),
            relationship("r", "Enrolls", many("s"), many("c")),
        ],
        edges,
    ));

    assert_eq!(codes(&issues), vec!["MALFORMED_EDGE_ID", "DANGLING_EDGE"]);
    let dangling = find(&issues, "DANGLING_EDGE");
    assert_eq!(
        dangling.location.as_ref().unwrap().edge.as_deref(),
        Some("s->gone")
    );
}

#[test]
fn test_derived_attributes_are_not_issues() {
    let mut nodes = clean_school();
    nodes.push(attribute("age", "Age", "s", &[Derived]));
    assert!(validate_er(&diagram("School", nodes)).is_empty());
}

#[test]
fn test_summary_counts_and_strictness() {
    let er = diagram(
        "School",
        vec![
            entity("s", "Student"),
            attribute("addr", "Address", "s", &[Composite]),
            relationship("off", "Off", disabled("s"), many("s")),
        ],
    );
    let summary = validate_diagram(&Diagram::Er(er));

    assert_eq!(summary.diagram, "School");
    assert_eq!(summary.summary.errors, 0);
    assert_eq!(summary.summary.warnings, 1);
    assert_eq!(summary.summary.info, 1);
    assert_eq!(summary.summary.nodes, 3);
    assert_eq!(summary.summary.edges, 0);
    assert!(!summary.is_failure(false));
    assert!(summary.is_failure(true));
}

#[test]
fn test_relational_diagrams_have_no_issues() {
    let relational = convert(&diagram("School", clean_school()));
    let summary = validate_diagram(&Diagram::Relational(relational));
    assert!(summary.issues.is_empty());
    assert!(!summary.is_failure(true));
}

#[test]
fn test_issue_display() {
    let issues = validate_er(&diagram(
        "School",
        vec![entity("s", "Student"), entity("s", "Again")],
    ));
    assert_eq!(
        issues[0].to_string(),
        "ERROR [DUPLICATE_NODE_ID] node=s: node id 's' is used more than once"
    );
}

#[test]
fn test_summary_serializes_lowercase_severity() {
    let er = diagram("School", vec![entity("s", "Student"), entity("s", "Again")]);
    let summary = validate_diagram(&Diagram::Er(er));
    let json = serde_json::to_value(&summary).unwrap();

    assert_eq!(json["issues"][0]["severity"], "error");
    assert_eq!(json["issues"][0]["code"], "DUPLICATE_NODE_ID");
    assert_eq!(json["summary"]["errors"], 1);
}
