use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use agencyhub_auth::{AgencyScope, Role, Session};
use agencyhub_core::{AgencyId, DomainError, RecordId, UserId};
use agencyhub_infra::ProjectStatus;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub user_id: UserId,
    pub email: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agency_id: Option<AgencyId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<AgencyScope>,
}

impl SessionResponse {
    pub fn from_session(session: &Session) -> Self {
        Self {
            user_id: session.user_id,
            email: session.email.clone(),
            role: session.role,
            agency_id: session.agency_id,
            expires_at: None,
            scope: None,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateClientRequest {
    pub name: String,
    pub email: String,
    pub company: Option<String>,
    /// Only meaningful for super-admins; tenant-bound callers may omit it.
    pub agency_id: Option<AgencyId>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateClientRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub company: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateProjectRequest {
    pub client_id: RecordId,
    pub name: String,
    pub status: Option<ProjectStatus>,
    pub agency_id: Option<AgencyId>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProjectRequest {
    pub name: Option<String>,
    pub status: Option<ProjectStatus>,
}

#[derive(Debug, Deserialize)]
pub struct CreateInvoiceRequest {
    pub client_id: RecordId,
    pub number: String,
    pub amount_cents: i64,
    pub agency_id: Option<AgencyId>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateInvoiceRequest {
    pub amount_cents: Option<i64>,
    pub paid: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct CreateReminderRequest {
    pub title: String,
    pub due_on: NaiveDate,
    pub agency_id: Option<AgencyId>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateReminderRequest {
    pub title: Option<String>,
    pub due_on: Option<NaiveDate>,
    pub done: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub password: String,
    pub role: Role,
    /// Required from a super-admin creating an admin or staff account.
    pub agency_id: Option<AgencyId>,
}

pub const MIN_PASSWORD_LENGTH: usize = 8;

#[derive(Debug, Deserialize)]
pub struct ExplainQuery {
    pub permission: String,
}

pub fn require_non_empty(field: &str, value: &str) -> Result<(), DomainError> {
    if value.trim().is_empty() {
        return Err(DomainError::validation(field, "must not be empty"));
    }
    Ok(())
}

pub fn require_email(value: &str) -> Result<(), DomainError> {
    match value.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(()),
        _ => Err(DomainError::validation("email", "must look like name@domain.tld")),
    }
}

pub fn require_password(value: &str) -> Result<(), DomainError> {
    if value.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(DomainError::validation(
            "password",
            format!("must be at least {MIN_PASSWORD_LENGTH} characters"),
        ));
    }
    Ok(())
}

pub fn require_non_negative(field: &str, value: i64) -> Result<(), DomainError> {
    if value < 0 {
        return Err(DomainError::validation(field, "must not be negative"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_check() {
        assert!(require_email("a@b.co").is_ok());
        assert!(require_email("@b.co").is_err());
        assert!(require_email("a@localhost").is_err());
        assert!(require_email("plain").is_err());
    }

    #[test]
    fn empty_and_negative_checks() {
        assert!(require_non_empty("name", "  ").is_err());
        assert!(require_non_empty("name", "Acme").is_ok());
        assert!(require_non_negative("amount_cents", -1).is_err());
        assert!(require_non_negative("amount_cents", 0).is_ok());
    }

    #[test]
    fn password_length_counts_characters() {
        assert!(require_password("short").is_err());
        assert!(require_password("ünïcødé").is_err());
        assert!(require_password("eight ch").is_ok());
    }
}
