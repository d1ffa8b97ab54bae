//! Tenant scoping for queries.
//!
//! Repositories only accept [`ScopedQuery`], and the only way to obtain one
//! is [`scope_to_agency`]. A tenant-scoped read, update or delete that skips
//! scoping does not compile.

use serde::Serialize;

use agencyhub_auth::{AgencyContext, AgencyScope};

use crate::query::{ColumnRef, Predicate, Query};

/// Column holding the owning agency on every tenant-scoped table.
pub const AGENCY_COLUMN: &str = "agency_id";

/// A query that has been through [`scope_to_agency`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScopedQuery {
    query: Query,
    scope: AgencyScope,
}

impl ScopedQuery {
    pub fn query(&self) -> &Query {
        &self.query
    }

    /// Scope the query was restricted to.
    pub fn scope(&self) -> AgencyScope {
        self.scope
    }
}

/// Restrict `query` to the rows the actor in `ctx` may see.
///
/// - `Global` (super-admin): the query is returned unchanged.
/// - `Agency(id)`: exactly one `alias.agency_id = id` predicate is appended.
pub fn scope_to_agency(query: Query, ctx: &AgencyContext, alias: &str) -> ScopedQuery {
    let scope = ctx.scope();
    let query = match scope {
        AgencyScope::Global => query,
        AgencyScope::Agency(agency_id) => query.and_where(Predicate::Eq {
            column: ColumnRef::new(alias, AGENCY_COLUMN),
            value: agency_id.into(),
        }),
    };

    ScopedQuery { query, scope }
}
