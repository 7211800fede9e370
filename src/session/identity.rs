//! Identity provider seam and the session manager built on it.

use async_trait::async_trait;
use tracing::info;

use super::{RegistrationProfile, SessionCache, SessionError, UserRecord};

/// External authentication service (hosted auth plus profile store).
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Authenticate and fetch the stored profile.
    async fn login(&self, email: &str, password: &str) -> Result<UserRecord, SessionError>;

    /// Create an account and its profile.
    async fn register(&self, profile: &RegistrationProfile) -> Result<UserRecord, SessionError>;

    async fn logout(&self) -> Result<(), SessionError>;
}

/// Keeps the session cache in step with the identity provider.
pub struct SessionManager<P> {
    provider: P,
    cache: SessionCache,
}

impl<P: IdentityProvider> SessionManager<P> {
    pub fn new(provider: P, cache: SessionCache) -> Self {
        Self { provider, cache }
    }

    pub fn current_user(&self) -> Option<&UserRecord> {
        self.cache.current()
    }

    pub fn cache(&self) -> &SessionCache {
        &self.cache
    }

    /// Log in and cache the profile. Returns the dashboard to redirect to.
    pub async fn login(
        &mut self,
        email: &str,
        password: &str,
    ) -> Result<&'static str, SessionError> {
        let user = self.provider.login(email, password).await?;
        let route = user.role.dashboard_route();
        info!("Signed in {} as {}", user.masked_email(), user.role);
        self.cache.save(user).await?;
        Ok(route)
    }

    /// Register and cache the new profile. Returns the dashboard route.
    pub async fn register(
        &mut self,
        profile: &RegistrationProfile,
    ) -> Result<&'static str, SessionError> {
        let user = self.provider.register(profile).await?;
        let route = user.role.dashboard_route();
        info!("Registered {} as {}", user.masked_email(), user.role);
        self.cache.save(user).await?;
        Ok(route)
    }

    /// Clear the cached session, then sign out of the provider.
    ///
    /// The cache is cleared first so a provider failure still leaves this
    /// process signed out.
    pub async fn logout(&mut self) -> Result<(), SessionError> {
        self.cache.clear().await?;
        self.provider.logout().await
    }
}
