//! Session cookie parsing and `Set-Cookie` rendering

use crate::config::AuthConfig;

/// Name of the cookie carrying the session token
pub const SESSION_COOKIE: &str = "session";

/// Find a cookie value in a raw `Cookie` header.
///
/// When the name repeats, the last pair wins. Pairs without a value
/// (`session=`) are treated as absent.
pub fn find_cookie<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .rev()
        .find(|(key, _)| key.trim() == name)
        .map(|(_, value)| value.trim())
        .filter(|value| !value.is_empty())
}

/// `Set-Cookie` value that hands the client a new session token
pub fn session_cookie(token: &str, config: &AuthConfig) -> String {
    let mut cookie = format!(
        "{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        config.token_ttl_secs()
    );
    if config.secure_cookies {
        cookie.push_str("; Secure");
    }
    cookie
}

/// `Set-Cookie` value that expires the session cookie immediately
pub const CLEARED_SESSION_COOKIE: &str =
    "session=; Path=/; Expires=Thu, 01 Jan 1970 00:00:00 GMT; Max-Age=0; HttpOnly; SameSite=Lax";
