//! Tenant-scoped record repositories.

use std::collections::BTreeMap;
use std::sync::RwLock;

use thiserror::Error;

use agencyhub_core::RecordId;

use crate::query::{Predicate, Query};
use crate::records::Record;
use crate::scope::ScopedQuery;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("not found")]
    NotFound,

    #[error("query targets table '{query}' but repository holds '{repository}'")]
    TableMismatch { query: String, repository: &'static str },

    #[error("unknown alias '{0}' in predicate")]
    UnknownAlias(String),

    #[error("unknown column '{0}'")]
    UnknownColumn(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("storage lock poisoned")]
    Poisoned,
}

/// Persistence for one record type.
///
/// Every read, update and delete takes a [`ScopedQuery`]; inserts carry their
/// owning agency on the record itself.
pub trait Repository<R: Record>: Send + Sync {
    fn find_all(&self, query: &ScopedQuery) -> Result<Vec<R>, RepositoryError>;

    fn insert(&self, record: R) -> Result<R, RepositoryError>;

    /// Replace the single row matched by `query` with `record`.
    ///
    /// The replacement must keep the matched row's id and agency.
    fn update(&self, query: &ScopedQuery, record: R) -> Result<R, RepositoryError>;

    /// Delete every row matched by `query`; returns how many were removed.
    fn delete(&self, query: &ScopedQuery) -> Result<usize, RepositoryError>;

    fn find_one(&self, query: &ScopedQuery) -> Result<R, RepositoryError> {
        self.find_all(query)?
            .into_iter()
            .next()
            .ok_or(RepositoryError::NotFound)
    }
}

/// In-memory repository for tests/dev.
///
/// Rows are kept ordered by id (UUIDv7, so creation order).
#[derive(Debug)]
pub struct InMemoryRepository<R> {
    inner: RwLock<BTreeMap<RecordId, R>>,
}

impl<R> InMemoryRepository<R> {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(BTreeMap::new()),
        }
    }
}

impl<R> Default for InMemoryRepository<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Record> InMemoryRepository<R> {
    fn check_table(query: &Query) -> Result<(), RepositoryError> {
        if query.table() != R::TABLE {
            return Err(RepositoryError::TableMismatch {
                query: query.table().to_string(),
                repository: R::TABLE,
            });
        }
        Ok(())
    }

    fn matches(query: &Query, record: &R) -> Result<bool, RepositoryError> {
        for predicate in query.predicates() {
            match predicate {
                Predicate::Eq { column, value } => {
                    if column.alias != query.alias() {
                        return Err(RepositoryError::UnknownAlias(column.alias.clone()));
                    }
                    let actual = record
                        .column(&column.column)
                        .ok_or_else(|| RepositoryError::UnknownColumn(column.to_string()))?;
                    if &actual != value {
                        return Ok(false);
                    }
                }
            }
        }
        Ok(true)
    }

    fn matching_ids(map: &BTreeMap<RecordId, R>, query: &Query) -> Result<Vec<RecordId>, RepositoryError> {
        let mut ids = Vec::new();
        for (id, record) in map {
            if query.max_rows().is_some_and(|limit| ids.len() >= limit) {
                break;
            }
            if Self::matches(query, record)? {
                ids.push(*id);
            }
        }
        Ok(ids)
    }
}

impl<R: Record> Repository<R> for InMemoryRepository<R> {
    fn find_all(&self, scoped: &ScopedQuery) -> Result<Vec<R>, RepositoryError> {
        let query = scoped.query();
        Self::check_table(query)?;

        let (sql, params) = query.to_sql();
        tracing::debug!(%sql, params = params.len(), "executing scoped query");

        let map = self.inner.read().map_err(|_| RepositoryError::Poisoned)?;
        let ids = Self::matching_ids(&map, query)?;
        Ok(ids.iter().filter_map(|id| map.get(id).cloned()).collect())
    }

    fn insert(&self, record: R) -> Result<R, RepositoryError> {
        let mut map = self.inner.write().map_err(|_| RepositoryError::Poisoned)?;
        if map.contains_key(&record.id()) {
            return Err(RepositoryError::Conflict(format!(
                "{} {} already exists",
                R::TABLE,
                record.id()
            )));
        }
        map.insert(record.id(), record.clone());
        Ok(record)
    }

    fn update(&self, scoped: &ScopedQuery, record: R) -> Result<R, RepositoryError> {
        let query = scoped.query();
        Self::check_table(query)?;

        let mut map = self.inner.write().map_err(|_| RepositoryError::Poisoned)?;
        let ids = Self::matching_ids(&map, query)?;
        let id = match ids.as_slice() {
            [] => return Err(RepositoryError::NotFound),
            [id] => *id,
            _ => {
                return Err(RepositoryError::Conflict(format!(
                    "update matched {} rows in {}",
                    ids.len(),
                    R::TABLE
                )));
            }
        };

        let current = map.get(&id).ok_or(RepositoryError::NotFound)?;
        if record.id() != id || !record.belongs_to(current.agency_id()) {
            return Err(RepositoryError::Conflict(
                "update may not change a record's id or agency".to_string(),
            ));
        }

        map.insert(id, record.clone());
        Ok(record)
    }

    fn delete(&self, scoped: &ScopedQuery) -> Result<usize, RepositoryError> {
        let query = scoped.query();
        Self::check_table(query)?;

        let mut map = self.inner.write().map_err(|_| RepositoryError::Poisoned)?;
        let ids = Self::matching_ids(&map, query)?;
        for id in &ids {
            map.remove(id);
        }
        Ok(ids.len())
    }
}
