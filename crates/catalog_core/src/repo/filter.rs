//! Typed filter predicates translated to SQL.
//!
//! # Responsibility
//! - Let callers describe row predicates over an entity's columns.
//! - Render predicates as SQL fragments with positional bind values.
//!
//! # Invariants
//! - Caller values are always bound, never spliced into SQL text.
//! - `Filter::all()` (the empty filter) is the absent predicate: it matches
//!   every row and renders no `WHERE` clause.

use rusqlite::types::Value;
use std::fmt::Debug;

/// Column of an entity table that filters may reference.
pub trait Column: Copy + Debug + PartialEq + 'static {
    /// SQL column name.
    fn name(self) -> &'static str;
}

/// Predicate tree over columns `C`.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition<C> {
    Eq(C, Value),
    Ne(C, Value),
    Gt(C, Value),
    Lt(C, Value),
    /// Case-sensitive substring match on a text column.
    Contains(C, String),
    In(C, Vec<Value>),
    /// Matches when every child matches; empty matches everything.
    And(Vec<Condition<C>>),
    /// Matches when any child matches; empty matches nothing.
    Or(Vec<Condition<C>>),
    Not(Box<Condition<C>>),
}

/// SQL rendering of a condition.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlFragment {
    /// Boolean SQL expression using `?` placeholders.
    pub sql: String,
    /// Values bound to the placeholders, in order.
    pub params: Vec<Value>,
}

/// Optional predicate over columns `C`.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter<C> {
    condition: Option<Condition<C>>,
}

impl<C: Column> Default for Filter<C> {
    fn default() -> Self {
        Self::all()
    }
}

impl<C: Column> Filter<C> {
    /// The empty filter: no predicate.
    pub fn all() -> Self {
        Self { condition: None }
    }

    /// Wraps an explicit condition tree.
    pub fn from_condition(condition: Condition<C>) -> Self {
        Self {
            condition: Some(condition),
        }
    }

    /// `column = value` (`IS NULL` for a null value).
    pub fn eq(column: C, value: impl Into<Value>) -> Self {
        Self::from_condition(Condition::Eq(column, value.into()))
    }

    /// `column <> value` (`IS NOT NULL` for a null value).
    pub fn ne(column: C, value: impl Into<Value>) -> Self {
        Self::from_condition(Condition::Ne(column, value.into()))
    }

    pub fn gt(column: C, value: impl Into<Value>) -> Self {
        Self::from_condition(Condition::Gt(column, value.into()))
    }

    pub fn lt(column: C, value: impl Into<Value>) -> Self {
        Self::from_condition(Condition::Lt(column, value.into()))
    }

    /// Case-sensitive substring match. An empty fragment matches every row.
    pub fn contains(column: C, fragment: impl Into<String>) -> Self {
        Self::from_condition(Condition::Contains(column, fragment.into()))
    }

    /// `column IN (...)`. An empty set matches nothing.
    pub fn is_in<V: Into<Value>>(column: C, values: impl IntoIterator<Item = V>) -> Self {
        Self::from_condition(Condition::In(
            column,
            values.into_iter().map(Into::into).collect(),
        ))
    }

    /// Both predicates must match. The empty filter is the identity.
    pub fn and(self, other: Self) -> Self {
        match (self.condition, other.condition) {
            (None, rhs) => Self { condition: rhs },
            (lhs, None) => Self { condition: lhs },
            (Some(Condition::And(mut items)), Some(rhs)) => {
                items.push(rhs);
                Self::from_condition(Condition::And(items))
            }
            (Some(lhs), Some(rhs)) => Self::from_condition(Condition::And(vec![lhs, rhs])),
        }
    }

    /// Either predicate may match.
    ///
    /// An empty side absorbs the other, producing an explicit match-all
    /// predicate that still counts as supplied.
    pub fn or(self, other: Self) -> Self {
        match (self.condition, other.condition) {
            (None, _) | (_, None) => Self::from_condition(Condition::And(Vec::new())),
            (Some(Condition::Or(mut items)), Some(rhs)) => {
                items.push(rhs);
                Self::from_condition(Condition::Or(items))
            }
            (Some(lhs), Some(rhs)) => Self::from_condition(Condition::Or(vec![lhs, rhs])),
        }
    }

    /// Logical negation. Negating the empty filter matches nothing.
    pub fn negate(self) -> Self {
        match self.condition {
            None => Self::from_condition(Condition::Or(Vec::new())),
            Some(Condition::Not(inner)) => Self::from_condition(*inner),
            Some(condition) => Self::from_condition(Condition::Not(Box::new(condition))),
        }
    }

    /// Returns whether this is the absent predicate.
    pub fn is_empty(&self) -> bool {
        self.condition.is_none()
    }

    pub fn condition(&self) -> Option<&Condition<C>> {
        self.condition.as_ref()
    }

    /// Renders the predicate, or `None` for the empty filter.
    pub fn to_sql(&self) -> Option<SqlFragment> {
        self.condition.as_ref().map(|condition| {
            let mut params = Vec::new();
            let sql = render(condition, &mut params);
            SqlFragment { sql, params }
        })
    }
}

fn render<C: Column>(condition: &Condition<C>, params: &mut Vec<Value>) -> String {
    match condition {
        Condition::Eq(column, Value::Null) => format!("{} IS NULL", column.name()),
        Condition::Ne(column, Value::Null) => format!("{} IS NOT NULL", column.name()),
        Condition::Eq(column, value) => bind(column.name(), "=", value, params),
        Condition::Ne(column, value) => bind(column.name(), "<>", value, params),
        Condition::Gt(column, value) => bind(column.name(), ">", value, params),
        Condition::Lt(column, value) => bind(column.name(), "<", value, params),
        Condition::Contains(column, fragment) => {
            params.push(Value::Text(fragment.clone()));
            format!("instr({}, ?) > 0", column.name())
        }
        Condition::In(_, values) if values.is_empty() => "0".to_string(),
        Condition::In(column, values) => {
            params.extend(values.iter().cloned());
            let placeholders = vec!["?"; values.len()].join(", ");
            format!("{} IN ({placeholders})", column.name())
        }
        Condition::And(items) => join(items, "AND", "1", params),
        Condition::Or(items) => join(items, "OR", "0", params),
        Condition::Not(inner) => format!("NOT ({})", render(inner, params)),
    }
}

fn bind(column: &str, op: &str, value: &Value, params: &mut Vec<Value>) -> String {
    params.push(value.clone());
    format!("{column} {op} ?")
}

fn join<C: Column>(
    items: &[Condition<C>],
    op: &str,
    identity: &str,
    params: &mut Vec<Value>,
) -> String {
    if items.is_empty() {
        return identity.to_string();
    }
    let parts: Vec<String> = items.iter().map(|item| render(item, params)).collect();
    format!("({})", parts.join(&format!(" {op} ")))
}

#[cfg(test)]
mod tests {
    use super::{Column, Condition, Filter};
    use rusqlite::types::Value;

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Col {
        Id,
        Title,
    }

    impl Column for Col {
        fn name(self) -> &'static str {
            match self {
                Self::Id => "id",
                Self::Title => "title",
            }
        }
    }

    #[test]
    fn empty_filter_renders_nothing() {
        let filter = Filter::<Col>::all();
        assert!(filter.is_empty());
        assert_eq!(filter.to_sql(), None);
    }

    #[test]
    fn leaf_conditions_bind_values() {
        let sql = Filter::eq(Col::Title, "Emma".to_string()).to_sql().unwrap();
        assert_eq!(sql.sql, "title = ?");
        assert_eq!(sql.params, vec![Value::Text("Emma".to_string())]);

        let sql = Filter::contains(Col::Title, "a").to_sql().unwrap();
        assert_eq!(sql.sql, "instr(title, ?) > 0");

        let sql = Filter::eq(Col::Title, Value::Null).to_sql().unwrap();
        assert_eq!(sql.sql, "title IS NULL");
        assert!(sql.params.is_empty());
    }

    #[test]
    fn and_or_flatten_and_keep_param_order() {
        let filter = Filter::gt(Col::Id, 1_i64)
            .and(Filter::lt(Col::Id, 9_i64))
            .and(Filter::ne(Col::Title, "x".to_string()));
        let sql = filter.to_sql().unwrap();
        assert_eq!(sql.sql, "(id > ? AND id < ? AND title <> ?)");
        assert_eq!(
            sql.params,
            vec![
                Value::Integer(1),
                Value::Integer(9),
                Value::Text("x".to_string())
            ]
        );

        let sql = Filter::eq(Col::Id, 1_i64)
            .or(Filter::eq(Col::Id, 2_i64))
            .to_sql()
            .unwrap();
        assert_eq!(sql.sql, "(id = ? OR id = ?)");
    }

    #[test]
    fn empty_filter_is_and_identity_and_or_absorber() {
        let only = Filter::eq(Col::Id, 3_i64);
        assert_eq!(Filter::all().and(only.clone()), only);

        let absorbed = only.or(Filter::all());
        assert!(!absorbed.is_empty());
        assert_eq!(absorbed.condition(), Some(&Condition::And(Vec::new())));
        assert_eq!(absorbed.to_sql().unwrap().sql, "1");
        assert!(!Filter::<Col>::all().or(Filter::all()).is_empty());
    }

    #[test]
    fn negate_handles_empty_and_double_negation() {
        let none = Filter::<Col>::all().negate();
        assert_eq!(none.to_sql().unwrap().sql, "0");

        let filter = Filter::eq(Col::Id, 4_i64);
        assert_eq!(filter.clone().negate().negate(), filter);
        assert_eq!(
            filter.negate().condition(),
            Some(&Condition::Not(Box::new(Condition::Eq(
                Col::Id,
                Value::Integer(4)
            ))))
        );
    }

    #[test]
    fn in_list_renders_placeholders() {
        let sql = Filter::is_in(Col::Id, [1_i64, 2, 3]).to_sql().unwrap();
        assert_eq!(sql.sql, "id IN (?, ?, ?)");
        assert_eq!(sql.params.len(), 3);

        let empty: [i64; 0] = [];
        assert_eq!(Filter::is_in(Col::Id, empty).to_sql().unwrap().sql, "0");
    }
}
