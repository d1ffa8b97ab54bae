//! Tenant-owned back-office records.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use agencyhub_core::{AgencyId, RecordId, TenantScoped};

use crate::query::{Query, Value};

/// A row of a tenant-scoped table.
pub trait Record: TenantScoped + Clone + Send + Sync + 'static {
    const TABLE: &'static str;

    fn id(&self) -> RecordId;

    /// Value of `column`, or `None` if the table has no such column.
    fn column(&self, column: &str) -> Option<Value>;

    /// Unscoped `SELECT` over this record's table.
    fn query(alias: &str) -> Query {
        Query::select(Self::TABLE, alias)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    pub id: RecordId,
    pub agency_id: AgencyId,
    pub name: String,
    pub email: String,
    pub company: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    #[default]
    Planned,
    InProgress,
    Delivered,
    Cancelled,
}

impl ProjectStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::Planned => "planned",
            ProjectStatus::InProgress => "in_progress",
            ProjectStatus::Delivered => "delivered",
            ProjectStatus::Cancelled => "cancelled",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: RecordId,
    pub agency_id: AgencyId,
    pub client_id: RecordId,
    pub name: String,
    pub status: ProjectStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: RecordId,
    pub agency_id: AgencyId,
    pub client_id: RecordId,
    pub number: String,
    pub amount_cents: i64,
    pub paid: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reminder {
    pub id: RecordId,
    pub agency_id: AgencyId,
    pub title: String,
    pub due_on: NaiveDate,
    pub done: bool,
}

macro_rules! impl_tenant_scoped {
    ($($t:ty),+) => {
        $(impl TenantScoped for $t {
            fn agency_id(&self) -> AgencyId {
                self.agency_id
            }
        })+
    };
}

impl_tenant_scoped!(Client, Project, Invoice, Reminder);

impl Record for Client {
    const TABLE: &'static str = "clients";

    fn id(&self) -> RecordId {
        self.id
    }

    fn column(&self, column: &str) -> Option<Value> {
        Some(match column {
            "id" => self.id.into(),
            "agency_id" => self.agency_id.into(),
            "name" => self.name.clone().into(),
            "email" => self.email.clone().into(),
            "company" => self.company.clone().into(),
            _ => return None,
        })
    }
}

impl Record for Project {
    const TABLE: &'static str = "projects";

    fn id(&self) -> RecordId {
        self.id
    }

    fn column(&self, column: &str) -> Option<Value> {
        Some(match column {
            "id" => self.id.into(),
            "agency_id" => self.agency_id.into(),
            "client_id" => self.client_id.into(),
            "name" => self.name.clone().into(),
            "status" => self.status.as_str().into(),
            _ => return None,
        })
    }
}

impl Record for Invoice {
    const TABLE: &'static str = "invoices";

    fn id(&self) -> RecordId {
        self.id
    }

    fn column(&self, column: &str) -> Option<Value> {
        Some(match column {
            "id" => self.id.into(),
            "agency_id" => self.agency_id.into(),
            "client_id" => self.client_id.into(),
            "number" => self.number.clone().into(),
            "amount_cents" => self.amount_cents.into(),
            "paid" => self.paid.into(),
            _ => return None,
        })
    }
}

impl Record for Reminder {
    const TABLE: &'static str = "reminders";

    fn id(&self) -> RecordId {
        self.id
    }

    fn column(&self, column: &str) -> Option<Value> {
        Some(match column {
            "id" => self.id.into(),
            "agency_id" => self.agency_id.into(),
            "title" => self.title.clone().into(),
            "due_on" => self.due_on.into(),
            "done" => self.done.into(),
            _ => return None,
        })
    }
}
