//! Route table and role-based route guard.
//!
//! The guard decision is recomputed on every navigation from the current
//! [`SessionState`]; it is never cached.

use std::fmt;

use serde::Serialize;

use crate::session::{Role, SessionState};

/// Public entry point every redirect goes to.
pub const LOGIN_PATH: &str = "/login";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MerchantView {
    Dashboard,
    CreatePayment,
    History,
    Details(String),
    MobileToken,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminView {
    Dashboard,
    Cards,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Login,
    Merchant(MerchantView),
    Admin(AdminView),
}

impl Route {
    /// Resolve a path such as `/merchant/details/TX-1`. Unknown paths yield `None`.
    pub fn parse(path: &str) -> Option<Self> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        match segments.as_slice() {
            [] | ["login"] => Some(Self::Login),
            ["merchant", rest @ ..] => {
                let view = match rest {
                    ["dashboard"] => MerchantView::Dashboard,
                    ["create"] => MerchantView::CreatePayment,
                    ["history"] => MerchantView::History,
                    ["details", id] => MerchantView::Details((*id).to_string()),
                    ["mobile-token"] => MerchantView::MobileToken,
                    _ => return None,
                };
                Some(Self::Merchant(view))
            }
            ["admin", rest @ ..] => {
                let view = match rest {
                    ["dashboard"] => AdminView::Dashboard,
                    ["cards"] => AdminView::Cards,
                    _ => return None,
                };
                Some(Self::Admin(view))
            }
            _ => None,
        }
    }

    pub fn path(&self) -> String {
        match self {
            Self::Login => LOGIN_PATH.to_string(),
            Self::Merchant(view) => match view {
                MerchantView::Dashboard => "/merchant/dashboard".to_string(),
                MerchantView::CreatePayment => "/merchant/create".to_string(),
                MerchantView::History => "/merchant/history".to_string(),
                MerchantView::Details(id) => format!("/merchant/details/{id}"),
                MerchantView::MobileToken => "/merchant/mobile-token".to_string(),
            },
            Self::Admin(view) => match view {
                AdminView::Dashboard => "/admin/dashboard".to_string(),
                AdminView::Cards => "/admin/cards".to_string(),
            },
        }
    }

    /// Role a route is scoped to; `None` for public routes.
    pub fn required_role(&self) -> Option<Role> {
        match self {
            Self::Login => None,
            Self::Merchant(_) => Some(Role::Merchant),
            Self::Admin(_) => Some(Role::BankAdmin),
        }
    }

    /// Landing route after a successful login.
    pub fn home(role: Role) -> Self {
        match role {
            Role::Merchant => Self::Merchant(MerchantView::Dashboard),
            Role::BankAdmin => Self::Admin(AdminView::Dashboard),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum RedirectReason {
    NotAuthenticated,
    RoleMismatch { required: Role, actual: Role },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum GuardDecision {
    /// Session still loading; show a neutral placeholder.
    Pending,
    Allow,
    /// Navigate to [`LOGIN_PATH`], replacing the current history entry.
    RedirectToLogin {
        reason: RedirectReason,
        replace: bool,
    },
}

impl GuardDecision {
    fn redirect(reason: RedirectReason) -> Self {
        Self::RedirectToLogin {
            reason,
            replace: true,
        }
    }

    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }
}

/// Decide whether content requiring `required` may be shown for `state`.
///
/// A role mismatch redirects to login, same as no session at all.
pub fn guard(state: &SessionState, required: Option<Role>) -> GuardDecision {
    match state {
        SessionState::Loading => GuardDecision::Pending,
        SessionState::Anonymous => GuardDecision::redirect(RedirectReason::NotAuthenticated),
        SessionState::Authenticated(session) => match required {
            Some(required) if required != session.claim().role => {
                GuardDecision::redirect(RedirectReason::RoleMismatch {
                    required,
                    actual: session.claim().role,
                })
            }
            _ => GuardDecision::Allow,
        },
    }
}

/// Guard a concrete route. Public routes are always allowed once loaded.
pub fn guard_route(state: &SessionState, route: &Route) -> GuardDecision {
    match (state, route.required_role()) {
        (SessionState::Loading, _) => GuardDecision::Pending,
        (_, None) => GuardDecision::Allow,
        (_, required) => guard(state, required),
    }
}
