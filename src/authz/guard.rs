//! Route guards: decide whether a view renders or where to send the viewer.
//!
//! Guards are stateless and meant to be evaluated again whenever the
//! session changes.

use url::form_urlencoded;

use crate::domain::Role;
use crate::session::Session;

pub const DEFAULT_LOGIN_PATH: &str = "/login";
pub const DEFAULT_LANDING_PATH: &str = "/dashboard";
pub const HOME_PATH: &str = "/";

/// Query parameter carrying the originally requested path.
const RETURN_PARAM: &str = "next";

/// A client-side navigation instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    pub target: String,
    pub return_to: Option<String>,
}

impl Redirect {
    pub fn to(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            return_to: None,
        }
    }

    /// Redirect to `target`, remembering where the viewer was heading.
    pub fn with_return(target: impl Into<String>, return_to: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            return_to: Some(return_to.into()),
        }
    }

    /// Full location, e.g. `/login?next=%2Fdashboard%2Fusers`.
    pub fn location(&self) -> String {
        match &self.return_to {
            Some(path) => {
                let query: String = form_urlencoded::Serializer::new(String::new())
                    .append_pair(RETURN_PARAM, path)
                    .finish();
                format!("{}?{}", self.target, query)
            }
            None => self.target.clone(),
        }
    }
}

/// Recover the originally requested path from a login location.
///
/// Only same-site absolute paths are accepted so a crafted link cannot
/// bounce the user elsewhere after signing in.
pub fn return_path_from(location: &str) -> Option<String> {
    let (_, query) = location.split_once('?')?;
    form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == RETURN_PARAM)
        .map(|(_, value)| value.into_owned())
        .filter(|path| path.starts_with('/') && !path.starts_with("//"))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardState {
    /// The session has not settled yet; render nothing.
    Loading,
    Authorized,
    Unauthenticated(Redirect),
    Forbidden(Redirect),
}

impl GuardState {
    pub fn is_authorized(&self) -> bool {
        matches!(self, GuardState::Authorized)
    }

    pub fn redirect(&self) -> Option<&Redirect> {
        match self {
            GuardState::Unauthenticated(r) | GuardState::Forbidden(r) => Some(r),
            GuardState::Loading | GuardState::Authorized => None,
        }
    }
}

/// Guard for views that need a signed-in user, optionally with a role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteGuard {
    allowed: Option<Vec<Role>>,
    login_path: String,
    landing_path: String,
}

impl RouteGuard {
    pub fn new(allowed: &[Role]) -> Self {
        Self {
            allowed: Some(allowed.to_vec()),
            login_path: DEFAULT_LOGIN_PATH.to_string(),
            landing_path: DEFAULT_LANDING_PATH.to_string(),
        }
    }

    /// Any signed-in user passes, whatever the role.
    pub fn any_authenticated() -> Self {
        Self {
            allowed: None,
            login_path: DEFAULT_LOGIN_PATH.to_string(),
            landing_path: DEFAULT_LANDING_PATH.to_string(),
        }
    }

    pub fn with_paths(mut self, login_path: &str, landing_path: &str) -> Self {
        self.login_path = login_path.to_string();
        self.landing_path = landing_path.to_string();
        self
    }

    pub fn allows(&self, role: Role) -> bool {
        match &self.allowed {
            Some(roles) => roles.contains(&role),
            None => true,
        }
    }

    pub fn evaluate(&self, session: &Session, requested_path: &str) -> GuardState {
        if session.is_loading() {
            return GuardState::Loading;
        }
        match session.user() {
            None => GuardState::Unauthenticated(Redirect::with_return(
                self.login_path.clone(),
                requested_path,
            )),
            // Denied on the landing view itself: fall back to home, not a loop.
            Some(user) if !self.allows(user.role) => {
                let target = if requested_path == self.landing_path {
                    HOME_PATH.to_string()
                } else {
                    self.landing_path.clone()
                };
                GuardState::Forbidden(Redirect::to(target))
            }
            Some(_) => GuardState::Authorized,
        }
    }
}

/// Guard for login/register: signed-in users are sent away.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuestGuard {
    landing_path: String,
}

impl GuestGuard {
    pub fn new(landing_path: &str) -> Self {
        Self {
            landing_path: landing_path.to_string(),
        }
    }

    pub fn evaluate(&self, session: &Session) -> GuardState {
        if session.is_loading() {
            return GuardState::Loading;
        }
        match session.user() {
            Some(_) => GuardState::Forbidden(Redirect::to(self.landing_path.clone())),
            None => GuardState::Authorized,
        }
    }
}

impl Default for GuestGuard {
    fn default() -> Self {
        Self::new(DEFAULT_LANDING_PATH)
    }
}

/// Views of the client and who may open them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    Register,
    Dashboard,
    Blogs,
    Categories,
    Tags,
    Profile,
    Users,
    Settings,
}

const SIGNED_IN: &[Role] = &[Role::Admin, Role::Author, Role::User];
const ADMIN_ONLY: &[Role] = &[Role::Admin];

impl Route {
    pub const ALL: [Route; 9] = [
        Route::Login,
        Route::Register,
        Route::Dashboard,
        Route::Blogs,
        Route::Categories,
        Route::Tags,
        Route::Profile,
        Route::Users,
        Route::Settings,
    ];

    /// The route serving `path`, ignoring any query string.
    pub fn from_path(path: &str) -> Option<Route> {
        let path = path.split('?').next().unwrap_or(path);
        let path = if path.len() > 1 {
            path.trim_end_matches('/')
        } else {
            path
        };
        Route::ALL.into_iter().find(|route| route.path() == path)
    }

    pub fn path(self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::Register => "/register",
            Route::Dashboard => "/dashboard",
            Route::Blogs => "/dashboard/blogs",
            Route::Categories => "/dashboard/categories",
            Route::Tags => "/dashboard/tags",
            Route::Profile => "/dashboard/profile",
            Route::Users => "/dashboard/users",
            Route::Settings => "/dashboard/settings",
        }
    }

    /// Roles allowed in, or `None` for guest-only views.
    pub fn allowed_roles(self) -> Option<&'static [Role]> {
        match self {
            Route::Login | Route::Register => None,
            Route::Users | Route::Settings => Some(ADMIN_ONLY),
            Route::Dashboard | Route::Blogs | Route::Categories | Route::Tags | Route::Profile => {
                Some(SIGNED_IN)
            }
        }
    }

    pub fn is_guest_only(self) -> bool {
        self.allowed_roles().is_none()
    }

    /// Evaluate the matching guard against `session`.
    pub fn check(self, session: &Session, login_path: &str, landing_path: &str) -> GuardState {
        match self.allowed_roles() {
            Some(roles) => RouteGuard::new(roles)
                .with_paths(login_path, landing_path)
                .evaluate(session, self.path()),
            None => GuestGuard::new(landing_path).evaluate(session),
        }
    }
}
