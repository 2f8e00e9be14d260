//! Logout: local cleanup, navigation to login, best-effort server revoke.

#[cfg(test)]
#[path = "logout_test.rs"]
mod logout_test;

use crate::coordinator::Session;

/// Navigation sink; the client adapts its router to this.
pub trait Navigator {
    fn navigate(&self, path: &str);
}

impl<F: Fn(&str)> Navigator for F {
    fn navigate(&self, path: &str) {
        self(path);
    }
}

impl Session {
    /// End the session.
    ///
    /// Store, persisted snapshot and credential cookie are cleared and the
    /// login view is opened before the revoke request is awaited, so a slow
    /// or failing server never keeps the user signed in locally. Safe to call
    /// more than once.
    pub async fn logout(&self, navigator: &dyn Navigator) {
        let revoke = self.inner.api.logout();
        self.invalidate();
        navigator.navigate(&self.inner.config.login_path);
        log::info!("signed out");
        if let Err(err) = revoke.await {
            log::warn!("logout revoke failed (local session already cleared): {err}");
        }
    }
}
