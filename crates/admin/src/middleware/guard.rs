//! Route guard and admin role gate.
//!
//! The guard follows a browser's [`AuthInstance`] from the moment a view is
//! mounted: it starts in [`GuardState::Checking`] and moves to
//! authenticated or unauthenticated on every session notification. The role
//! gate then decides which `/dashboard` sub-views the stored role may open.

use ms_apparels_core::Role;

use crate::identity::{AuthInstance, IdentitySession, SessionSubscription};

/// Where the guard's knowledge of the session stands.
#[derive(Debug, Clone)]
pub enum GuardState {
    /// No session notification has arrived yet.
    Checking,
    /// Signed in.
    Authenticated(IdentitySession),
    /// Signed out.
    Unauthenticated,
}

/// What the guarded view should render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rendering {
    /// A loading placeholder.
    Loading,
    /// A redirect to `/login`.
    RedirectToLogin,
    /// The wrapped view.
    View,
}

/// A mounted guard with a live session subscription.
///
/// Dropping the guard unsubscribes.
#[derive(Debug)]
pub struct RouteGuard {
    state: GuardState,
    subscription: SessionSubscription,
}

impl RouteGuard {
    /// Mount on a browser's auth instance.
    #[must_use]
    pub fn mount(auth: &AuthInstance) -> Self {
        Self {
            state: GuardState::Checking,
            subscription: auth.subscribe(),
        }
    }

    #[must_use]
    pub const fn state(&self) -> &GuardState {
        &self.state
    }

    /// Wait for the next session notification and apply it.
    ///
    /// The first call resolves with the current session. If the auth
    /// instance is gone the guard treats the browser as signed out.
    pub async fn settle(&mut self) -> Rendering {
        let session = self.subscription.next().await.flatten();
        self.observe(session);
        self.rendering()
    }

    /// Apply a session notification.
    pub fn observe(&mut self, session: Option<IdentitySession>) {
        self.state = match session {
            Some(session) => GuardState::Authenticated(session),
            None => GuardState::Unauthenticated,
        };
    }

    /// Rendering for the current state.
    #[must_use]
    pub const fn rendering(&self) -> Rendering {
        match self.state {
            GuardState::Checking => Rendering::Loading,
            GuardState::Authenticated(_) => Rendering::View,
            GuardState::Unauthenticated => Rendering::RedirectToLogin,
        }
    }

    /// The signed-in session, when authenticated.
    #[must_use]
    pub const fn session(&self) -> Option<&IdentitySession> {
        match &self.state {
            GuardState::Authenticated(session) => Some(session),
            _ => None,
        }
    }
}

/// `/dashboard` sub-views.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminRoute {
    /// `/dashboard` and any unknown sub-path.
    Dashboard,
    /// `/dashboard/profile/*`
    Profile,
    /// `/dashboard/products/*`
    Products,
    /// `/dashboard/moderator/*`
    Moderators,
}

impl AdminRoute {
    /// Classify a request path.
    #[must_use]
    pub fn from_path(path: &str) -> Self {
        let rest = path
            .strip_prefix("/dashboard")
            .unwrap_or("")
            .trim_start_matches('/');
        let section = rest.split('/').next().unwrap_or("");
        match section {
            "moderator" => Self::Moderators,
            "products" => Self::Products,
            "profile" => Self::Profile,
            _ => Self::Dashboard,
        }
    }

    /// Whether only admins may open this view.
    #[must_use]
    pub const fn requires_admin(self) -> bool {
        matches!(self, Self::Moderators)
    }
}

/// Outcome of the role gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Allow,
    RedirectToDashboard,
}

/// Decide whether `role` may open `route`.
#[must_use]
pub fn role_gate(route: AdminRoute, role: Option<Role>) -> GateDecision {
    if route.requires_admin() && !role.is_some_and(Role::is_admin) {
        GateDecision::RedirectToDashboard
    } else {
        GateDecision::Allow
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use ms_apparels_core::Uid;
    use secrecy::SecretString;

    use super::*;

    fn session() -> IdentitySession {
        IdentitySession {
            uid: Uid::new("u1"),
            email: "u1@example.com".to_string(),
            display_name: String::new(),
            id_token: SecretString::from("token"),
            refresh_token: SecretString::from("refresh"),
        }
    }

    #[test]
    fn test_mounted_guard_is_checking() {
        let auth = AuthInstance::new();
        let guard = RouteGuard::mount(&auth);
        assert!(matches!(guard.state(), GuardState::Checking));
        assert_eq!(guard.rendering(), Rendering::Loading);
    }

    #[tokio::test]
    async fn test_settle_without_session_redirects() {
        let auth = AuthInstance::new();
        let mut guard = RouteGuard::mount(&auth);
        assert_eq!(guard.settle().await, Rendering::RedirectToLogin);
    }

    #[tokio::test]
    async fn test_settle_follows_sign_in_and_out() {
        let auth = AuthInstance::new();
        auth.publish(Some(session()));
        let mut guard = RouteGuard::mount(&auth);
        assert_eq!(guard.settle().await, Rendering::View);
        assert_eq!(guard.session().unwrap().uid.as_str(), "u1");

        auth.sign_out();
        assert_eq!(guard.settle().await, Rendering::RedirectToLogin);

        auth.publish(Some(session()));
        assert_eq!(guard.settle().await, Rendering::View);
    }

    #[test]
    fn test_dropping_guard_unsubscribes() {
        let auth = AuthInstance::new();
        let guard = RouteGuard::mount(&auth);
        assert_eq!(auth.subscriber_count(), 1);
        drop(guard);
        assert_eq!(auth.subscriber_count(), 0);
    }

    #[test]
    fn test_route_classification() {
        assert_eq!(AdminRoute::from_path("/dashboard"), AdminRoute::Dashboard);
        assert_eq!(
            AdminRoute::from_path("/dashboard/moderator/add"),
            AdminRoute::Moderators
        );
        assert_eq!(
            AdminRoute::from_path("/dashboard/products/show"),
            AdminRoute::Products
        );
        assert_eq!(
            AdminRoute::from_path("/dashboard/profile/edit"),
            AdminRoute::Profile
        );
        assert_eq!(
            AdminRoute::from_path("/dashboard/whatever"),
            AdminRoute::Dashboard
        );
        assert_eq!(
            AdminRoute::from_path("/dashboard/moderators"),
            AdminRoute::Dashboard
        );
    }

    #[test]
    fn test_role_gate_for_every_role() {
        for role in [Some(Role::Admin), Some(Role::Moderator), None] {
            let expected = if role == Some(Role::Admin) {
                GateDecision::Allow
            } else {
                GateDecision::RedirectToDashboard
            };
            assert_eq!(role_gate(AdminRoute::Moderators, role), expected);
            assert_eq!(role_gate(AdminRoute::Products, role), GateDecision::Allow);
            assert_eq!(role_gate(AdminRoute::Dashboard, role), GateDecision::Allow);
        }
    }
}
