use std::collections::BTreeMap;

use rowguard_core::ScalarValue;

/// The typed session-context interface policy evaluation resolves
/// placeholders through.
///
/// `{userId}` becomes a `user_id()` call and `{user.<property>}` a
/// `property(name)` call; session values never reach a query by string
/// substitution. Implementations must resolve any I/O (role lookup,
/// property fetch) before evaluation begins -- these accessors are
/// synchronous and are called on the request path.
pub trait Session: Send + Sync {
    /// The authenticated principal's id, as issued by the identity
    /// provider. Opaque to this crate.
    fn user_id(&self) -> &str;

    /// A named session property, e.g. `department` for
    /// `{user.department}`.
    fn property(&self, name: &str) -> Option<&ScalarValue>;

    /// Roles held by the principal.
    fn roles(&self) -> &[String];
}

/// Helpers shared by the gate and the filter.
pub(crate) fn has_any_role(session: &dyn Session, roles: &[String]) -> bool {
    roles.iter().any(|r| session.roles().contains(r))
}

/// An owned, pre-resolved session -- the implementation embedders and
/// tests use when the principal's attributes are already in hand.
#[derive(Debug, Clone)]
pub struct StaticSession {
    user_id: String,
    roles: Vec<String>,
    properties: BTreeMap<String, ScalarValue>,
}

impl StaticSession {
    /// Creates a session for the given principal with no roles or
    /// properties.
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            roles: Vec::new(),
            properties: BTreeMap::new(),
        }
    }

    /// Adds a role.
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.roles.push(role.into());
        self
    }

    /// Adds a named property.
    pub fn with_property(mut self, name: impl Into<String>, value: ScalarValue) -> Self {
        self.properties.insert(name.into(), value);
        self
    }
}

impl Session for StaticSession {
    fn user_id(&self) -> &str {
        &self.user_id
    }

    fn property(&self, name: &str) -> Option<&ScalarValue> {
        self.properties.get(name)
    }

    fn roles(&self) -> &[String] {
        &self.roles
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_session_accessors() {
        let session = StaticSession::new("user_a")
            .with_role("member")
            .with_property("department", ScalarValue::Text("Engineering".into()));

        assert_eq!(session.user_id(), "user_a");
        assert_eq!(session.roles(), &["member".to_string()]);
        assert_eq!(
            session.property("department"),
            Some(&ScalarValue::Text("Engineering".into()))
        );
        assert_eq!(session.property("missing"), None);
    }

    #[test]
    fn has_any_role_matches() {
        let session = StaticSession::new("u").with_role("editor");
        assert!(has_any_role(&session, &["admin".into(), "editor".into()]));
        assert!(!has_any_role(&session, &["admin".into()]));
        assert!(!has_any_role(&session, &[]));
    }

    #[test]
    fn session_is_object_safe() {
        let session = StaticSession::new("u");
        let _: &dyn Session = &session;
    }
}
