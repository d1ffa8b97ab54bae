use crate::AgencyId;

/// Marker for values owned by exactly one agency.
///
/// Every persisted back-office record (client, project, invoice, reminder)
/// implements this. Scoping and repositories rely on it to keep one agency's
/// rows invisible to another.
pub trait TenantScoped {
    fn agency_id(&self) -> AgencyId;

    /// Whether this value belongs to `agency_id`.
    fn belongs_to(&self, agency_id: AgencyId) -> bool {
        self.agency_id() == agency_id
    }
}
