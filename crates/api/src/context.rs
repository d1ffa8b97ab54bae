use agencyhub_auth::Session;

/// Session resolved for the current request (if any).
///
/// Inserted by the session middleware on every request; handlers never
/// read cookies themselves.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RequestSession {
    session: Option<Session>,
}

impl RequestSession {
    pub fn new(session: Option<Session>) -> Self {
        Self { session }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }
}
