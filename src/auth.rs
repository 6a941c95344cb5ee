use crate::errors::SocialError;

/// Display name recorded when the provider has an identity but no name.
pub const ANONYMOUS_DISPLAY_NAME: &str = "anonymous";

/// Read-at-call-time view of the authenticated session.
///
/// Plaza never caches identity: every mutating operation asks the provider
/// for the current user at the moment it runs, matching a session layer
/// that can sign in and out underneath us.
pub trait AuthProvider: Send + Sync {
    fn current_user_id(&self) -> Option<String>;
    fn current_display_name(&self) -> Option<String>;
}

/// The acting identity resolved for one operation.
#[derive(Debug, Clone)]
pub struct Actor {
    pub user_id: String,
    pub display_name: String,
}

/// Resolves the current identity or fails with [`SocialError::Unauthenticated`].
pub(crate) fn require_user(auth: &dyn AuthProvider) -> Result<Actor, SocialError> {
    let user_id = auth.current_user_id().ok_or(SocialError::Unauthenticated)?;
    let display_name = auth
        .current_display_name()
        .unwrap_or_else(|| ANONYMOUS_DISPLAY_NAME.to_string());
    Ok(Actor { user_id, display_name })
}

/// Fixed identity provider, for tests and single-user tooling.
#[derive(Debug, Clone, Default)]
pub struct StaticSession {
    user_id: Option<String>,
    display_name: Option<String>,
}

impl StaticSession {
    pub fn signed_in(user_id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            display_name: Some(display_name.into()),
        }
    }

    pub fn signed_out() -> Self {
        Self::default()
    }
}

impl AuthProvider for StaticSession {
    fn current_user_id(&self) -> Option<String> {
        self.user_id.clone()
    }

    fn current_display_name(&self) -> Option<String> {
        self.display_name.clone()
    }
}
