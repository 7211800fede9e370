//! Role-based route guarding.

use super::{Role, UserRecord};

/// Public landing page.
pub const HOME_ROUTE: &str = "/";

/// Outcome of guarding a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    Allow,
    Redirect(&'static str),
}

/// Decide whether `user` may open a route restricted to `allowed`.
///
/// Anonymous users go home. A user on another role's route is sent to their
/// own dashboard. `allowed = None` admits any signed-in user.
pub fn guard(user: Option<&UserRecord>, allowed: Option<Role>) -> RouteDecision {
    let Some(user) = user else {
        return RouteDecision::Redirect(HOME_ROUTE);
    };

    match allowed {
        Some(role) if role != user.role => RouteDecision::Redirect(user.role.dashboard_route()),
        _ => RouteDecision::Allow,
    }
}
