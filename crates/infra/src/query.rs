//! Minimal query model for tenant-scoped records.
//!
//! A [`Query`] names a table, an alias and a conjunction of equality
//! predicates. Repositories execute it; [`Query::to_sql`] renders the same
//! structure as parameterised SQL for logging and inspection.

use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

use agencyhub_core::{AgencyId, RecordId, UserId};

/// A comparable column value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Uuid(Uuid),
    Text(String),
    Int(i64),
    Bool(bool),
    Date(NaiveDate),
}

impl From<Uuid> for Value {
    fn from(v: Uuid) -> Self {
        Value::Uuid(v)
    }
}

impl From<AgencyId> for Value {
    fn from(v: AgencyId) -> Self {
        Value::Uuid(v.into())
    }
}

impl From<RecordId> for Value {
    fn from(v: RecordId) -> Self {
        Value::Uuid(v.into())
    }
}

impl From<UserId> for Value {
    fn from(v: UserId) -> Self {
        Value::Uuid(v.into())
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Value::Date(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// `alias.column`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnRef {
    pub alias: String,
    pub column: String,
}

impl ColumnRef {
    pub fn new(alias: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            alias: alias.into(),
            column: column.into(),
        }
    }
}

impl core::fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}.{}", self.alias, self.column)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Predicate {
    Eq { column: ColumnRef, value: Value },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Query {
    table: String,
    alias: String,
    predicates: Vec<Predicate>,
    limit: Option<usize>,
}

impl Query {
    pub fn select(table: impl Into<String>, alias: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            alias: alias.into(),
            predicates: Vec::new(),
            limit: None,
        }
    }

    /// Add `alias.column = value` on the query's own alias.
    pub fn filter_eq(self, column: &str, value: impl Into<Value>) -> Self {
        let column = ColumnRef::new(self.alias.clone(), column);
        self.and_where(Predicate::Eq {
            column,
            value: value.into(),
        })
    }

    pub fn and_where(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    pub fn max_rows(&self) -> Option<usize> {
        self.limit
    }

    /// Render as `SELECT ... WHERE ...` with `$n` placeholders.
    pub fn to_sql(&self) -> (String, Vec<Value>) {
        let mut sql = format!("SELECT {alias}.* FROM {} AS {alias}", self.table, alias = self.alias);
        let mut params = Vec::with_capacity(self.predicates.len());

        for (i, predicate) in self.predicates.iter().enumerate() {
            sql.push_str(if i == 0 { " WHERE " } else { " AND " });
            match predicate {
                Predicate::Eq { column, value } => {
                    params.push(value.clone());
                    sql.push_str(&format!("{column} = ${}", params.len()));
                }
            }
        }

        if let Some(limit) = self.limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }

        (sql, params)
    }
}
