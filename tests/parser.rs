use sift::{parse_node, Node, Operator};

fn leaf(op: Operator, field: &str, literal: &str) -> Node {
    Node::comparison(op, field, literal)
}

fn eq(field: &str, literal: &str) -> Node {
    leaf(Operator::Equals, field, literal)
}

#[test]
fn test_every_operator_builds_its_leaf() {
    let examples = vec![
        ("a = 1", Node::Equals { field: "a".into(), literal: "1".into() }),
        ("a != 1", Node::NotEquals { field: "a".into(), literal: "1".into() }),
        ("a > 1", Node::GreaterThan { field: "a".into(), literal: "1".into() }),
        ("a >= 1", Node::GreaterThanOrEquals { field: "a".into(), literal: "1".into() }),
        ("a < 1", Node::LessThan { field: "a".into(), literal: "1".into() }),
        ("a <= 1", Node::LessThanOrEquals { field: "a".into(), literal: "1".into() }),
        ("a ≈ x*", Node::Matches { field: "a".into(), literal: "x*".into() }),
        ("a !≈ *x", Node::NotMatches { field: "a".into(), literal: "*x".into() }),
        (
            "a ∈ [1, 2, 3]",
            Node::In {
                field: "a".into(),
                literals: vec!["1".into(), "2".into(), "3".into()],
            },
        ),
    ];

    for (input, expected) in examples {
        assert_eq!(parse_node(input).unwrap(), expected, "input: {input}");
    }
}

#[test]
fn test_whitespace_is_optional_around_symbols() {
    assert_eq!(parse_node("a=1").unwrap(), eq("a", "1"));
    assert_eq!(
        parse_node("(a=1)&&(b=2)").unwrap(),
        Node::and(eq("a", "1"), eq("b", "2"))
    );
    assert_eq!(
        parse_node("a∈[x,y]").unwrap(),
        Node::membership("a", vec!["x".into(), "y".into()])
    );
    assert_eq!(parse_node("\ta =\n1  ").unwrap(), eq("a", "1"));
}

#[test]
fn test_precedence() {
    // '&&' binds more tightly than '||': a || (b && c)
    assert_eq!(
        parse_node("a = 1 || b = 2 && c = 3").unwrap(),
        Node::or(eq("a", "1"), Node::and(eq("b", "2"), eq("c", "3")))
    );
    // and in reverse order: (c && b) || a
    assert_eq!(
        parse_node("c = 3 && b = 2 || a = 1").unwrap(),
        Node::or(Node::and(eq("c", "3"), eq("b", "2")), eq("a", "1"))
    );
}

#[test]
fn test_parentheses_override_precedence() {
    assert_eq!(
        parse_node("(a = 1 || b = 2) && c = 3").unwrap(),
        Node::and(Node::or(eq("a", "1"), eq("b", "2")), eq("c", "3"))
    );
    assert_eq!(parse_node("((a = 1))").unwrap(), eq("a", "1"));
}

#[test]
fn test_left_associativity() {
    assert_eq!(
        parse_node("a = 1 && b = 2 && c = 3").unwrap(),
        Node::and(Node::and(eq("a", "1"), eq("b", "2")), eq("c", "3"))
    );
}

#[test]
fn test_bare_literal_after_membership_is_singleton() {
    assert_eq!(
        parse_node("a ∈ x").unwrap(),
        Node::In {
            field: "a".into(),
            literals: vec!["x".into()],
        }
    );
}

#[test]
fn test_literals_keep_unusual_characters() {
    assert_eq!(
        parse_node("path = /usr/local/bin").unwrap(),
        eq("path", "/usr/local/bin")
    );
    assert_eq!(parse_node("a = !x").unwrap(), eq("a", "!x"));
    assert_eq!(parse_node("a = x|y&z").unwrap(), eq("a", "x|y&z"));
    assert_eq!(parse_node("名前 = 値").unwrap(), eq("名前", "値"));
}

#[test]
fn test_display_round_trips() {
    for input in [
        "a = 1",
        "a = 1 && b = 2 || c = 3",
        "a = 1 || b = 2 && c = 3",
        "(a = 1 || b = 2) && c = 3",
        "a = 1 && (b = 2 && c = 3)",
        "a = 1 || (b = 2 || c = 3)",
        "a ∈ [1, 2] && b !≈ *x*",
    ] {
        let node = parse_node(input).unwrap();
        let rendered = node.to_string();
        assert_eq!(rendered, input);
        assert_eq!(parse_node(&rendered).unwrap(), node);
    }
}

#[test]
fn test_ast_serde_round_trip() {
    let node = parse_node("age >= 18 && (status = active || tier ∈ [gold, platinum])").unwrap();
    let json = serde_json::to_string(&node).unwrap();
    let back: Node = serde_json::from_str(&json).unwrap();
    assert_eq!(back, node);

    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["kind"], "And");
    assert_eq!(value["left"]["kind"], "GreaterThanOrEquals");
    assert_eq!(value["right"]["right"]["literals"][1], "platinum");
}

#[test]
fn test_unknown_kind_deserializes_to_unsupported() {
    let node: Node = serde_json::from_str(r#"{"kind": "Xor"}"#).unwrap();
    assert_eq!(node, Node::Unsupported);
    assert_eq!(node.field(), None);
}
