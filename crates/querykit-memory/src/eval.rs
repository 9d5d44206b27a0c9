//! Predicate evaluation against records.

use std::cmp::Ordering;
use std::collections::HashMap;

use querykit::{
    value_for_key_path, BackendError, Comparison, ComparisonOperator, Expression, Predicate,
    Record, Value,
};
use regex::Regex;

use crate::pattern;

/// Evaluates one predicate against many records.
///
/// Constant `LIKE` patterns are compiled once, up front.
pub struct Evaluator<'p> {
    predicate: Option<&'p Predicate>,
    patterns: HashMap<String, Regex>,
}

impl<'p> Evaluator<'p> {
    /// Prepares a predicate for evaluation. `None` matches every record.
    pub fn new(predicate: Option<&'p Predicate>) -> Result<Self, BackendError> {
        let mut patterns = HashMap::new();
        if let Some(predicate) = predicate {
            collect_patterns(predicate, &mut patterns)?;
        }
        Ok(Self {
            predicate,
            patterns,
        })
    }

    /// Returns whether the record satisfies the predicate.
    pub fn matches(&self, record: &dyn Record) -> Result<bool, BackendError> {
        self.predicate
            .map_or(Ok(true), |predicate| self.evaluate(predicate, record))
    }

    fn evaluate(&self, predicate: &Predicate, record: &dyn Record) -> Result<bool, BackendError> {
        match predicate {
            Predicate::Comparison(c) => self.compare(c, record),
            Predicate::And(left, right) => {
                Ok(self.evaluate(left, record)? && self.evaluate(right, record)?)
            }
            Predicate::Or(left, right) => {
                Ok(self.evaluate(left, record)? || self.evaluate(right, record)?)
            }
            Predicate::Not(inner) => Ok(!self.evaluate(inner, record)?),
        }
    }

    fn compare(&self, c: &Comparison, record: &dyn Record) -> Result<bool, BackendError> {
        let left = resolve(&c.left, record)?;
        let right = resolve(&c.right, record)?;
        let key_path = &c.left;

        match c.operator {
            ComparisonOperator::Equal => Ok(loosely_equal(&left, &right)),
            ComparisonOperator::NotEqual => Ok(!loosely_equal(&left, &right)),
            ComparisonOperator::GreaterThan => {
                Ok(ordering(&left, &right, key_path)? == Some(Ordering::Greater))
            }
            ComparisonOperator::GreaterOrEqual => Ok(matches!(
                ordering(&left, &right, key_path)?,
                Some(Ordering::Greater | Ordering::Equal)
            )),
            ComparisonOperator::LessThan => {
                Ok(ordering(&left, &right, key_path)? == Some(Ordering::Less))
            }
            ComparisonOperator::LessOrEqual => Ok(matches!(
                ordering(&left, &right, key_path)?,
                Some(Ordering::Less | Ordering::Equal)
            )),
            ComparisonOperator::Like => self.like(&left, &right, key_path),
            ComparisonOperator::In => match &right {
                Value::Array(items) => Ok(items.iter().any(|item| loosely_equal(&left, item))),
                other => Err(unsupported(
                    c.operator,
                    format!("right-hand side must be a list, got {}", other.kind()),
                )),
            },
            ComparisonOperator::Between => match &right {
                Value::Array(bounds) if bounds.len() == 2 => {
                    let above = matches!(
                        ordering(&left, &bounds[0], key_path)?,
                        Some(Ordering::Greater | Ordering::Equal)
                    );
                    let below = matches!(
                        ordering(&left, &bounds[1], key_path)?,
                        Some(Ordering::Less | Ordering::Equal)
                    );
                    Ok(above && below)
                }
                other => Err(unsupported(
                    c.operator,
                    format!("right-hand side must be a pair of bounds, got {other}"),
                )),
            },
        }
    }

    fn like(&self, left: &Value, right: &Value, key_path: &Expression) -> Result<bool, BackendError> {
        match (left, right) {
            (Value::Null, _) => Ok(false),
            (Value::String(text), Value::String(pattern)) => match self.patterns.get(pattern) {
                Some(re) => Ok(re.is_match(text)),
                None => Ok(compile(pattern)?.is_match(text)),
            },
            _ => Err(BackendError::TypeMismatch {
                key_path: key_path.to_string(),
                left: left.kind(),
                right: right.kind(),
            }),
        }
    }
}

fn collect_patterns(
    predicate: &Predicate,
    patterns: &mut HashMap<String, Regex>,
) -> Result<(), BackendError> {
    match predicate {
        Predicate::Comparison(Comparison {
            operator: ComparisonOperator::Like,
            right: Expression::Constant(Value::String(pattern)),
            ..
        }) => {
            if !patterns.contains_key(pattern) {
                patterns.insert(pattern.clone(), compile(pattern)?);
            }
        }
        Predicate::Comparison(_) => {}
        Predicate::And(left, right) | Predicate::Or(left, right) => {
            collect_patterns(left, patterns)?;
            collect_patterns(right, patterns)?;
        }
        Predicate::Not(inner) => collect_patterns(inner, patterns)?,
    }
    Ok(())
}

fn compile(pattern: &str) -> Result<Regex, BackendError> {
    pattern::compile(pattern)
        .map_err(|e| BackendError::Rejected(format!("invalid LIKE pattern {pattern:?}: {e}")))
}

fn unsupported(operator: ComparisonOperator, detail: String) -> BackendError {
    BackendError::UnsupportedOperator {
        operator: operator.to_string(),
        detail,
    }
}

/// Resolves an expression to a value for one record.
pub fn resolve(expression: &Expression, record: &dyn Record) -> Result<Value, BackendError> {
    match expression {
        Expression::KeyPath(path) => value_for_key_path(record, path)
            .ok_or_else(|| BackendError::UnknownKeyPath(path.clone())),
        Expression::Constant(value) => Ok(value.clone()),
    }
}

/// Equality with integers and floats compared numerically.
pub fn loosely_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| loosely_equal(x, y))
        }
        (Value::Int(_) | Value::Float(_), Value::Int(_) | Value::Float(_)) => {
            left.partial_compare(right) == Some(Ordering::Equal)
        }
        _ => left == right,
    }
}

/// Orders two values for a comparison on `key_path`.
///
/// Null never orders. Values of unrelated kinds are a type mismatch.
fn ordering(
    left: &Value,
    right: &Value,
    key_path: &Expression,
) -> Result<Option<Ordering>, BackendError> {
    if left.is_null() || right.is_null() {
        return Ok(None);
    }
    match left.partial_compare(right) {
        Some(order) => Ok(Some(order)),
        // NaN against a number has no order but is not a mismatch
        None if left.as_f64().is_some() && right.as_f64().is_some() => Ok(None),
        None => Err(BackendError::TypeMismatch {
            key_path: key_path.to_string(),
            left: left.kind(),
            right: right.kind(),
        }),
    }
}

/// Orders two sort keys; nulls first, unrelated kinds tie.
pub fn sort_order(left: &Value, right: &Value) -> Ordering {
    match (left.is_null(), right.is_null()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => left.partial_compare(right).unwrap_or(Ordering::Equal),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use querykit::Attribute;

    struct Row {
        age: Option<i64>,
        name: &'static str,
    }

    impl Record for Row {
        fn value_for_key(&self, key: &str) -> Option<Value> {
            match key {
                "age" => Some(self.age.map_or(Value::Null, Value::Int)),
                "name" => Some(Value::String(self.name.to_string())),
                _ => None,
            }
        }
    }

    fn check(predicate: &Predicate, row: &Row) -> Result<bool, BackendError> {
        Evaluator::new(Some(predicate))?.matches(row)
    }

    fn row(age: i64) -> Row {
        Row {
            age: Some(age),
            name: "Kyle",
        }
    }

    #[test]
    fn test_comparisons() {
        let age = Attribute::<i64>::new("age");
        assert!(check(&age.greater_than(18), &row(20)).unwrap());
        assert!(!check(&age.greater_than(18), &row(18)).unwrap());
        assert!(check(&age.greater_or_equal(18), &row(18)).unwrap());
        assert!(check(&age.less_or_equal(18), &row(18)).unwrap());
        assert!(check(&age.not_equals(18), &row(17)).unwrap());
    }

    #[test]
    fn test_int_float_equality() {
        let p = Attribute::<f64>::new("age").equals(20.0);
        assert!(check(&p, &row(20)).unwrap());
    }

    #[test]
    fn test_null_never_orders() {
        let r = Row {
            age: None,
            name: "x",
        };
        let age = Attribute::<Option<i64>>::new("age");
        assert!(!check(&Attribute::<i64>::new("age").greater_than(0), &r).unwrap());
        assert!(!check(&Attribute::<i64>::new("age").less_than(0), &r).unwrap());
        assert!(check(&age.is_null(), &r).unwrap());
    }

    #[test]
    fn test_between_is_inclusive() {
        let age = Attribute::<i64>::new("age");
        assert!(check(&age.between(18..65), &row(18)).unwrap());
        assert!(check(&age.between(18..65), &row(65)).unwrap());
        assert!(!check(&age.between(18..65), &row(66)).unwrap());
    }

    #[test]
    fn test_in_and_like() {
        let age = Attribute::<i64>::new("age");
        let name = Attribute::<String>::new("name");
        assert!(check(&age.is_in([1, 20, 3]), &row(20)).unwrap());
        assert!(!check(&age.is_in([1, 3]), &row(20)).unwrap());
        assert!(check(&name.starts_with("Ky"), &row(1)).unwrap());
        assert!(!check(&name.like("ky*"), &row(1)).unwrap());
    }

    #[test]
    fn test_logical_combinators() {
        let age = Attribute::<i64>::new("age");
        let p = age.greater_than(10) & !age.greater_than(30);
        assert!(check(&p, &row(20)).unwrap());
        assert!(!check(&p, &row(40)).unwrap());
        assert!(check(&(p | age.equals(40)), &row(40)).unwrap());
    }

    #[test]
    fn test_unknown_key_path() {
        let p = Attribute::<i64>::new("height").greater_than(1);
        assert_eq!(
            check(&p, &row(1)),
            Err(BackendError::UnknownKeyPath(String::from("height")))
        );
    }

    #[test]
    fn test_type_mismatch() {
        let p = Attribute::<String>::new("age").greater_than("x");
        assert!(matches!(
            check(&p, &row(1)),
            Err(BackendError::TypeMismatch { left: "int", right: "string", .. })
        ));
    }

    #[test]
    fn test_type_mismatch_names_the_key_path() {
        let p = Expression::key_path("name").like(Expression::constant(3_i64));
        assert_eq!(
            check(&p, &row(1)),
            Err(BackendError::TypeMismatch {
                key_path: String::from("name"),
                left: "string",
                right: "int",
            })
        );
    }

    #[test]
    fn test_in_requires_a_list() {
        let p = Expression::key_path("age").equals(Expression::constant(1));
        let Predicate::Comparison(mut c) = p else {
            unreachable!();
        };
        c.operator = ComparisonOperator::In;
        assert!(matches!(
            check(&Predicate::Comparison(c), &row(1)),
            Err(BackendError::UnsupportedOperator { .. })
        ));
    }

    #[test]
    fn test_sort_order_puts_nulls_first() {
        assert_eq!(sort_order(&Value::Null, &Value::Int(1)), Ordering::Less);
        assert_eq!(sort_order(&Value::Int(2), &Value::Int(1)), Ordering::Greater);
    }
}
