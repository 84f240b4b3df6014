//! Per-browser auth state with change notifications.

use std::sync::Arc;

use tokio::sync::watch;

use super::types::IdentitySession;

/// One browser's identity state.
///
/// Cloning shares the same state. Every [`publish`](Self::publish) is seen
/// by all live subscriptions; the last published value wins.
#[derive(Debug, Clone)]
pub struct AuthInstance {
    sender: Arc<watch::Sender<Option<IdentitySession>>>,
}

impl Default for AuthInstance {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthInstance {
    /// A signed-out instance.
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = watch::channel(None);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// The current session, if signed in.
    #[must_use]
    pub fn current_session(&self) -> Option<IdentitySession> {
        self.sender.borrow().clone()
    }

    /// Replace the session (`None` signs out) and notify subscribers.
    pub fn publish(&self, session: Option<IdentitySession>) {
        let signed_in = session.is_some();
        self.sender.send_replace(session);
        tracing::debug!(signed_in, "Auth state published");
    }

    /// Sign out locally.
    pub fn sign_out(&self) {
        self.publish(None);
    }

    /// Subscribe to session changes.
    ///
    /// The first [`SessionSubscription::next`] resolves immediately with the
    /// current session. Dropping the subscription unsubscribes.
    #[must_use]
    pub fn subscribe(&self) -> SessionSubscription {
        SessionSubscription {
            receiver: self.sender.subscribe(),
            delivered_initial: false,
        }
    }

    /// Number of live subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

/// A live subscription to an [`AuthInstance`].
#[derive(Debug)]
pub struct SessionSubscription {
    receiver: watch::Receiver<Option<IdentitySession>>,
    delivered_initial: bool,
}

impl SessionSubscription {
    /// Wait for the next notification.
    ///
    /// Returns `None` once the instance is gone.
    pub async fn next(&mut self) -> Option<Option<IdentitySession>> {
        if self.delivered_initial {
            self.receiver.changed().await.ok()?;
        } else {
            self.delivered_initial = true;
        }
        Some(self.receiver.borrow_and_update().clone())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use ms_apparels_core::Uid;
    use secrecy::SecretString;

    use super::*;

    fn session(uid: &str) -> IdentitySession {
        IdentitySession {
            uid: Uid::new(uid),
            email: format!("{uid}@example.com"),
            display_name: String::new(),
            id_token: SecretString::from("token"),
            refresh_token: SecretString::from("refresh"),
        }
    }

    #[tokio::test]
    async fn test_first_notification_is_current_state() {
        let auth = AuthInstance::new();
        auth.publish(Some(session("u1")));

        let mut subscription = auth.subscribe();
        let first = subscription.next().await.unwrap();
        assert_eq!(first.unwrap().uid.as_str(), "u1");
    }

    #[tokio::test]
    async fn test_notifies_sign_in_and_sign_out() {
        let auth = AuthInstance::new();
        let mut subscription = auth.subscribe();
        assert!(subscription.next().await.unwrap().is_none());

        auth.publish(Some(session("u1")));
        assert!(subscription.next().await.unwrap().is_some());

        auth.sign_out();
        assert!(subscription.next().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_last_published_value_wins() {
        let auth = AuthInstance::new();
        let mut subscription = auth.subscribe();
        subscription.next().await.unwrap();

        auth.publish(Some(session("u1")));
        auth.publish(Some(session("u2")));
        let latest = subscription.next().await.unwrap().unwrap();
        assert_eq!(latest.uid.as_str(), "u2");
    }

    #[test]
    fn test_drop_unsubscribes() {
        let auth = AuthInstance::new();
        let first = auth.subscribe();
        let second = auth.subscribe();
        assert_eq!(auth.subscriber_count(), 2);

        drop(first);
        assert_eq!(auth.subscriber_count(), 1);
        drop(second);
        assert_eq!(auth.subscriber_count(), 0);
    }

    #[test]
    fn test_publish_without_subscribers_is_kept() {
        let auth = AuthInstance::new();
        auth.publish(Some(session("u1")));
        assert_eq!(auth.current_session().unwrap().uid.as_str(), "u1");
    }
}
