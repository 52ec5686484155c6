// screens/src/guard.rs

use session::SessionSnapshot;

/// The route surface. Doctors, Pharmacy, Billing, and Settings are stub
/// screens but sit behind the same guard as the rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    SignUp,
    Dashboard,
    Patients,
    Appointments,
    Doctors,
    Pharmacy,
    Billing,
    Settings,
}

impl Route {
    pub const ALL: [Route; 9] = [
        Route::Login,
        Route::SignUp,
        Route::Dashboard,
        Route::Patients,
        Route::Appointments,
        Route::Doctors,
        Route::Pharmacy,
        Route::Billing,
        Route::Settings,
    ];

    pub fn path(self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::SignUp => "/signup",
            Route::Dashboard => "/dashboard",
            Route::Patients => "/patients",
            Route::Appointments => "/appointments",
            Route::Doctors => "/doctors",
            Route::Pharmacy => "/pharmacy",
            Route::Billing => "/billing",
            Route::Settings => "/settings",
        }
    }

    pub fn from_path(path: &str) -> Option<Route> {
        Route::ALL.into_iter().find(|route| route.path() == path)
    }

    /// Everything except the two auth screens needs a resolved identity.
    pub fn requires_auth(self) -> bool {
        !matches!(self, Route::Login | Route::SignUp)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    /// Session still resolving: render a neutral placeholder, never
    /// redirect early.
    Placeholder,
    Render(Route),
    Redirect(Route),
}

/// Gates a route on the session snapshot. The auth screens render
/// unconditionally, which is also what keeps an unauthenticated visit to
/// `/login` from looping.
pub fn resolve_route(route: Route, session: &SessionSnapshot) -> RouteDecision {
    if !route.requires_auth() {
        return RouteDecision::Render(route);
    }
    if session.loading {
        return RouteDecision::Placeholder;
    }
    match session.identity {
        Some(_) => RouteDecision::Render(route),
        None => RouteDecision::Redirect(Route::Login),
    }
}

/// Path-level entry point: `/` and anything unknown land on the login
/// screen.
pub fn resolve_path(path: &str, session: &SessionSnapshot) -> RouteDecision {
    match Route::from_path(path) {
        Some(route) => resolve_route(route, session),
        None => RouteDecision::Redirect(Route::Login),
    }
}
