//! AccessGate: the single per-request policy point
//!
//! Every request path is classified through an ordered [`RouteTable`]
//! (first match wins, fallback last). Protected paths go through the
//! [`SessionResolver`]; the resulting [`GateDecision`] tells the HTTP layer
//! whether to forward, answer 401, or redirect to the login page.
//!
//! The decision never says *why* a credential was rejected. Only the response
//! shape differs, and that depends on the path class alone.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use tracing::debug;

use crate::auth::{Credentials, Identity, SessionResolver};
use crate::config::AuthConfig;

/// Query parameter carrying the originally requested path
pub const CALLBACK_PARAM: &str = "callbackUrl";

/// Characters left readable in the callback path
const CALLBACK_ENCODE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'/')
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Access class of a request path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    /// Static assets and framework internals, never authenticated
    Bypass,
    /// No identity required
    Public,
    /// Identity required; rejection is a structured 401
    ProtectedApi,
    /// Identity required; rejection redirects to login
    ProtectedPage,
}

/// Path matcher used by [`RouteTable`] rules
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathPattern {
    /// Exactly this path
    Exact(String),
    /// This path or anything beneath it (`/login`, `/login/...`)
    Subtree(String),
    /// Plain string prefix (`/api/emotion` also covers `/api/emotions`)
    Prefix(String),
}

impl PathPattern {
    pub fn exact(path: impl Into<String>) -> Self {
        Self::Exact(path.into())
    }

    pub fn subtree(path: impl Into<String>) -> Self {
        Self::Subtree(path.into())
    }

    pub fn prefix(path: impl Into<String>) -> Self {
        Self::Prefix(path.into())
    }

    pub fn matches(&self, path: &str) -> bool {
        match self {
            Self::Exact(p) => path == p,
            Self::Subtree(p) => path
                .strip_prefix(p.as_str())
                .is_some_and(|rest| rest.is_empty() || rest.starts_with('/')),
            Self::Prefix(p) => path.starts_with(p.as_str()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRule {
    pub pattern: PathPattern,
    pub class: RouteClass,
}

/// Ordered `(pattern, class)` table; the first matching rule decides
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTable {
    rules: Vec<RouteRule>,
    fallback: RouteClass,
}

impl RouteTable {
    /// Empty table classifying everything as `fallback`
    pub fn new(fallback: RouteClass) -> Self {
        Self { rules: Vec::new(), fallback }
    }

    /// Append a rule (evaluated after every rule already added)
    pub fn rule(mut self, pattern: PathPattern, class: RouteClass) -> Self {
        self.rules.push(RouteRule { pattern, class });
        self
    }

    pub fn rules(&self) -> &[RouteRule] {
        &self.rules
    }

    pub fn classify(&self, path: &str) -> RouteClass {
        self.rules
            .iter()
            .find(|rule| rule.pattern.matches(path))
            .map_or(self.fallback, |rule| rule.class)
    }
}

impl Default for RouteTable {
    /// Dashboard routing. Protected API prefixes come before the public
    /// entries, and the `/api/` catch-all after them, so that API paths
    /// never fall through to the page rule.
    fn default() -> Self {
        use PathPattern as P;
        use RouteClass::*;

        Self::new(ProtectedPage)
            // ─── Static assets ───
            .rule(P::prefix("/_next"), Bypass)
            .rule(P::prefix("/favicon.ico"), Bypass)
            .rule(P::prefix("/public/"), Bypass)
            // ─── Protected APIs ───
            .rule(P::prefix("/api/dashboard"), ProtectedApi)
            .rule(P::prefix("/api/sessions"), ProtectedApi)
            .rule(P::prefix("/api/emotion"), ProtectedApi)
            .rule(P::prefix("/api/suggestions"), ProtectedApi)
            .rule(P::prefix("/api/reports"), ProtectedApi)
            // ─── Public ───
            .rule(P::exact("/"), Public)
            .rule(P::subtree("/login"), Public)
            .rule(P::subtree("/register"), Public)
            .rule(P::subtree("/api/auth/login"), Public)
            .rule(P::subtree("/api/auth/register"), Public)
            .rule(P::subtree("/api/auth/logout"), Public)
            .rule(P::exact("/health"), Public)
            // ─── Remaining APIs ───
            .rule(P::prefix("/api/"), ProtectedApi)
    }
}

/// What the HTTP layer should do with a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Static asset; pass through untouched
    Bypass,
    /// Public path; pass through without an identity
    Public,
    /// Protected path with a resolved identity; responses must not be cached
    Authenticated(Identity),
    /// Protected API without an identity: 401 `{"error":"Unauthorized"}`
    Unauthorized { clear_cookie: bool },
    /// Protected page without an identity
    RedirectToLogin { location: String, clear_cookie: bool },
}

impl GateDecision {
    pub fn clears_cookie(&self) -> bool {
        match self {
            Self::Unauthorized { clear_cookie } | Self::RedirectToLogin { clear_cookie, .. } => {
                *clear_cookie
            }
            _ => false,
        }
    }

    pub fn is_forwarded(&self) -> bool {
        matches!(self, Self::Bypass | Self::Public | Self::Authenticated(_))
    }
}

/// Classifies, resolves, and decides
#[derive(Debug, Clone)]
pub struct AccessGate {
    routes: RouteTable,
    resolver: SessionResolver,
    login_path: String,
}

impl AccessGate {
    /// Gate with the default dashboard routing table
    pub fn new(config: &AuthConfig, resolver: SessionResolver) -> Self {
        Self {
            routes: RouteTable::default(),
            resolver,
            login_path: config.login_path.clone(),
        }
    }

    /// Replace the routing table
    pub fn with_routes(mut self, routes: RouteTable) -> Self {
        self.routes = routes;
        self
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    pub fn resolver(&self) -> &SessionResolver {
        &self.resolver
    }

    pub fn evaluate(&self, path: &str, credentials: &Credentials<'_>) -> GateDecision {
        self.evaluate_at(path, credentials, chrono::Utc::now().timestamp())
    }

    pub fn evaluate_at(&self, path: &str, credentials: &Credentials<'_>, now: i64) -> GateDecision {
        let class = self.routes.classify(path);
        match class {
            RouteClass::Bypass => return GateDecision::Bypass,
            RouteClass::Public => return GateDecision::Public,
            RouteClass::ProtectedApi | RouteClass::ProtectedPage => {}
        }

        let resolution = self.resolver.resolve_at(credentials, now);
        let clear_cookie = resolution.stale_credential;

        match (resolution.identity, class) {
            (Some(identity), _) => GateDecision::Authenticated(identity),
            (None, RouteClass::ProtectedApi) => {
                debug!(path, clear_cookie, "Unauthenticated API request");
                GateDecision::Unauthorized { clear_cookie }
            }
            (None, _) => {
                debug!(path, clear_cookie, "Unauthenticated page request, redirecting to login");
                GateDecision::RedirectToLogin {
                    location: self.login_redirect(path),
                    clear_cookie,
                }
            }
        }
    }

    /// Login URL with the requested path as the return destination
    pub fn login_redirect(&self, path: &str) -> String {
        format!(
            "{}?{CALLBACK_PARAM}={}",
            self.login_path,
            utf8_percent_encode(path, CALLBACK_ENCODE)
        )
    }
}
