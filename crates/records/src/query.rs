//! Composable, not-yet-executed queries.
//!
//! A `Query` names a collection and carries an ordered list of constraints.
//! Filter stages only ever add constraints; nothing is evaluated until a
//! repository calls `Query::execute` over a snapshot of its records.
//!
//! Constraints run strictly in the order they were added. Narrowing
//! constraints commute with each other, but `OrderBy` and `Limit` do not:
//! `Limit` followed by `Equals` keeps the matches among the first rows, while
//! `Equals` followed by `Limit` keeps the first matches.

use crate::types::Record;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Asc,
    Desc,
}

/// A single step of a query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Constraint {
    /// Field's textual form equals `value` exactly
    Equals { field: String, value: String },
    /// Field's textual form contains `needle`, ignoring case
    Contains { field: String, needle: String },
    /// Integer field lies within the inclusive bounds; missing bounds are open
    Between {
        field: String,
        min: Option<i64>,
        max: Option<i64>,
    },
    /// Stable sort on a field
    OrderBy {
        field: String,
        direction: SortDirection,
    },
    /// Keep only the first `count` rows
    Limit { count: usize },
}

impl Constraint {
    /// Whether this constraint only removes rows (and so can be evaluated
    /// row by row).
    pub fn is_narrowing(&self) -> bool {
        matches!(
            self,
            Constraint::Equals { .. } | Constraint::Contains { .. } | Constraint::Between { .. }
        )
    }

    fn matches<R: Record>(&self, record: &R) -> bool {
        match self {
            Constraint::Equals { field, value } => {
                let actual = record.field(field);
                !actual.is_null() && actual.to_string() == *value
            }
            Constraint::Contains { field, needle } => {
                let actual = record.field(field);
                !actual.is_null()
                    && actual
                        .to_string()
                        .to_lowercase()
                        .contains(&needle.to_lowercase())
            }
            Constraint::Between { field, min, max } => match record.field(field).as_integer() {
                Some(n) => min.is_none_or(|lo| n >= lo) && max.is_none_or(|hi| n <= hi),
                None => false,
            },
            // Reordering constraints keep every row
            Constraint::OrderBy { .. } | Constraint::Limit { .. } => true,
        }
    }
}

/// A pending fetch against a named collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    collection: String,
    constraints: Vec<Constraint>,
}

impl Query {
    /// Create an unfiltered query over `collection`.
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            constraints: Vec::new(),
        }
    }

    /// Create an unfiltered query over the collection of record type `R`.
    pub fn for_record<R: Record>() -> Self {
        Self::new(R::COLLECTION)
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Constraints in application order
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn is_unfiltered(&self) -> bool {
        self.constraints.is_empty()
    }

    /// Append a constraint (builder pattern).
    pub fn with(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    pub fn where_eq(self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.with(Constraint::Equals {
            field: field.into(),
            value: value.into(),
        })
    }

    pub fn where_contains(self, field: impl Into<String>, needle: impl Into<String>) -> Self {
        self.with(Constraint::Contains {
            field: field.into(),
            needle: needle.into(),
        })
    }

    pub fn where_between(
        self,
        field: impl Into<String>,
        min: Option<i64>,
        max: Option<i64>,
    ) -> Self {
        self.with(Constraint::Between {
            field: field.into(),
            min,
            max,
        })
    }

    pub fn order_by(self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.with(Constraint::OrderBy {
            field: field.into(),
            direction,
        })
    }

    pub fn limit(self, count: usize) -> Self {
        self.with(Constraint::Limit { count })
    }

    /// Evaluate the query over `records`.
    ///
    /// ## Algorithm
    /// 1. Start from the input rows (expected in creation order)
    /// 2. For each constraint in order:
    ///    a. narrowing: keep matching rows (parallel, order preserving)
    ///    b. `OrderBy`: stable sort, so ties keep their previous order
    ///    c. `Limit`: truncate
    /// 3. Return the surviving rows
    pub fn execute<R: Record>(&self, records: Vec<R>) -> Vec<R> {
        let mut rows = records;
        for constraint in &self.constraints {
            if constraint.is_narrowing() {
                rows = rows
                    .into_par_iter()
                    .filter(|row| constraint.matches(row))
                    .collect();
                continue;
            }

            match constraint {
                Constraint::OrderBy { field, direction } => match direction {
                    SortDirection::Asc => rows.sort_by_cached_key(|row| row.field(field)),
                    SortDirection::Desc => {
                        rows.sort_by_cached_key(|row| Reverse(row.field(field)))
                    }
                },
                Constraint::Limit { count } => rows.truncate(*count),
                Constraint::Equals { .. }
                | Constraint::Contains { .. }
                | Constraint::Between { .. } => {}
            }
        }
        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{User, UserDraft};

    fn users() -> Vec<User> {
        let drafts = vec![
            UserDraft::new("Ann Lee", "ann@example.com").with_age(31).with_role("admin"),
            UserDraft::new("Bob Stone", "bob@example.com").with_age(19),
            UserDraft::new("Cara Lee", "cara@example.com").with_age(45),
            UserDraft::new("Dan Moss", "dan@example.com"),
            UserDraft::new("Eve Lee", "eve@example.com").with_age(19).with_role("admin"),
        ];
        drafts
            .into_iter()
            .enumerate()
            .map(|(i, d)| User::from_draft(i as u64 + 1, d).unwrap())
            .collect()
    }

    fn ids(rows: &[User]) -> Vec<u64> {
        rows.iter().map(|u| u.id).collect()
    }

    #[test]
    fn test_unfiltered_query_returns_everything_in_order() {
        let query = Query::for_record::<User>();
        assert!(query.is_unfiltered());
        assert_eq!(query.collection(), "users");
        assert_eq!(ids(&query.execute(users())), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_contains_is_case_insensitive() {
        let rows = Query::new("users").where_contains("name", "lee").execute(users());
        assert_eq!(ids(&rows), vec![1, 3, 5]);
    }

    #[test]
    fn test_between_skips_missing_values() {
        let rows = Query::new("users")
            .where_between("age", Some(19), Some(31))
            .execute(users());
        assert_eq!(ids(&rows), vec![1, 2, 5]);

        let rows = Query::new("users").where_between("age", Some(40), None).execute(users());
        assert_eq!(ids(&rows), vec![3]);
    }

    #[test]
    fn test_equals_on_integer_field() {
        let rows = Query::new("users").where_eq("age", "19").execute(users());
        assert_eq!(ids(&rows), vec![2, 5]);
    }

    #[test]
    fn test_order_by_is_stable() {
        let rows = Query::new("users")
            .order_by("role", SortDirection::Asc)
            .execute(users());
        // admins first, ties keep creation order
        assert_eq!(ids(&rows), vec![1, 5, 2, 3, 4]);

        let rows = Query::new("users")
            .order_by("age", SortDirection::Desc)
            .execute(users());
        assert_eq!(ids(&rows), vec![3, 1, 2, 5, 4]);

        // descending ties keep creation order too
        let rows = Query::new("users")
            .order_by("role", SortDirection::Desc)
            .execute(users());
        assert_eq!(ids(&rows), vec![2, 3, 4, 1, 5]);
    }

    #[test]
    fn test_narrowing_split() {
        let query = Query::new("users")
            .where_eq("role", "admin")
            .where_contains("name", "lee")
            .where_between("age", Some(18), None)
            .order_by("name", SortDirection::Asc)
            .limit(1);
        let narrowing: Vec<bool> = query.constraints().iter().map(|c| c.is_narrowing()).collect();
        assert_eq!(narrowing, vec![true, true, true, false, false]);
    }

    #[test]
    fn test_limit_position_changes_result() {
        let filter_then_limit = Query::new("users")
            .where_eq("role", "admin")
            .limit(1)
            .execute(users());
        assert_eq!(ids(&filter_then_limit), vec![1]);

        let limit_then_filter = Query::new("users")
            .limit(3)
            .where_eq("role", "admin")
            .execute(users());
        assert_eq!(ids(&limit_then_filter), vec![1]);

        let limit_then_filter = Query::new("users")
            .limit(2)
            .where_contains("name", "eve")
            .execute(users());
        assert!(limit_then_filter.is_empty());
    }

    #[test]
    fn test_constraint_serialization_shape() {
        let query = Query::new("users").where_eq("role", "admin").limit(2);
        let json = serde_json::to_value(&query).unwrap();
        assert_eq!(json["constraints"][0]["op"], "equals");
        assert_eq!(json["constraints"][1]["count"], 2);
    }
}
