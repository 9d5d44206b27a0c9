//! Tests for predicate construction from derived attributes.

mod common;
use common::*;

use querykit::{count, ComparisonOperator, Expression, Predicate, Value};

fn operator(p: &Predicate) -> ComparisonOperator {
    match p {
        Predicate::Comparison(c) => c.operator,
        other => panic!("expected comparison, got {other:?}"),
    }
}

#[test]
fn test_each_operator_kind() {
    let age = Author::age();
    assert_eq!(operator(&age.equals(1)), ComparisonOperator::Equal);
    assert_eq!(operator(&age.not_equals(1)), ComparisonOperator::NotEqual);
    assert_eq!(operator(&age.greater_than(1)), ComparisonOperator::GreaterThan);
    assert_eq!(operator(&age.greater_or_equal(1)), ComparisonOperator::GreaterOrEqual);
    assert_eq!(operator(&age.less_than(1)), ComparisonOperator::LessThan);
    assert_eq!(operator(&age.less_or_equal(1)), ComparisonOperator::LessOrEqual);
    assert_eq!(operator(&Author::name().like("K*")), ComparisonOperator::Like);
    assert_eq!(operator(&age.is_in([1, 2])), ComparisonOperator::In);
    assert_eq!(operator(&age.between(1..2)), ComparisonOperator::Between);
}

#[test]
fn test_attribute_and_hand_built_predicates_match() {
    let built = Author::name().equals("Kyle");
    let by_hand = Expression::key_path("name").equals(Expression::constant("Kyle"));
    assert_eq!(built, by_hand);
}

#[test]
fn test_negated_bool_attribute() {
    assert_eq!(!Author::is_active(), Author::is_active().equals(false));
    assert_eq!((!Author::is_active()).to_string(), "isActive == false");
}

#[test]
fn test_count_comparison() {
    let p = count(&Author::books()).greater_or_equal(2);
    assert_eq!(p.to_string(), "books.@count >= 2");
}

#[test]
fn test_optional_attribute_null() {
    let p = Author::email().is_null() | Author::email().equals(Some(String::from("a@b.c")));
    assert_eq!(p.to_string(), "(mail == nil) OR (mail == \"a@b.c\")");
}

#[test]
fn test_predicates_serialize() {
    let p = Author::age().between(18..65) & !Author::is_active();
    let json = serde_json::to_string(&p).unwrap();
    let back: Predicate = serde_json::from_str(&json).unwrap();
    assert_eq!(back, p);
    let Predicate::And(left, _) = back else {
        panic!("expected AND");
    };
    let Predicate::Comparison(c) = *left else {
        panic!("expected comparison");
    };
    assert_eq!(
        c.right,
        Expression::Constant(Value::Array(vec![Value::Int(18), Value::Int(65)]))
    );
}
