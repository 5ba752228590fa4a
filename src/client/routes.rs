use crate::{
    auth::policy::{authorize, AccessPolicy, Capability},
    client::session::AuthContext,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Dashboard,
    Admin,
}

/// What a route asks of the current session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    Authenticated,
    Requires(Capability),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Render(Route),
    Redirect(Route),
}

impl Route {
    pub fn path(self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::Dashboard => "/",
            Route::Admin => "/admin",
        }
    }

    pub fn access(self) -> Access {
        match self {
            Route::Login => Access::Public,
            Route::Dashboard => Access::Authenticated,
            Route::Admin => Access::Requires(Capability::ManageProducts),
        }
    }
}

/// Renders `route` when the session satisfies its declared access, else sends to login.
pub fn guard(route: Route, auth: &AuthContext, policy: &AccessPolicy) -> Navigation {
    let allowed = match (route.access(), auth.role()) {
        (Access::Public, _) => true,
        (_, None) => false,
        (Access::Authenticated, Some(_)) => true,
        (Access::Requires(capability), Some(role)) => authorize(role, capability, policy).is_ok(),
    };
    if allowed {
        Navigation::Render(route)
    } else {
        Navigation::Redirect(Route::Login)
    }
}
