use axum::http::{HeaderMap, HeaderValue, header};

/// Anti-forgery state for the OAuth redirect handshake.
pub const STATE_COOKIE: &str = "oauth_state";

const STATE_COOKIE_MAX_AGE_SECS: i64 = 600;

/// Value of a named cookie from the request headers, if present.
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|raw| raw.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(k, _)| *k == name)
        .map(|(_, v)| v.to_string())
}

/// Session cookie: HttpOnly always; cross-site (`SameSite=None; Secure`)
/// only in production, where the frontend lives on another origin.
pub fn session_cookie(name: &str, token: &str, max_age_secs: i64, production: bool) -> HeaderValue {
    build_cookie(name, token, max_age_secs, production)
}

pub fn clear_session_cookie(name: &str, production: bool) -> HeaderValue {
    build_cookie(name, "", 0, production)
}

pub fn state_cookie(value: &str, production: bool) -> HeaderValue {
    build_cookie(STATE_COOKIE, value, STATE_COOKIE_MAX_AGE_SECS, production)
}

pub fn clear_state_cookie(production: bool) -> HeaderValue {
    build_cookie(STATE_COOKIE, "", 0, production)
}

fn build_cookie(name: &str, value: &str, max_age_secs: i64, production: bool) -> HeaderValue {
    let attributes = if production {
        "Path=/; HttpOnly; Secure; SameSite=None"
    } else {
        "Path=/; HttpOnly; SameSite=Lax"
    };
    let cookie = format!("{}={}; {}; Max-Age={}", name, value, attributes, max_age_secs);
    // Name and value are server-generated; this cannot contain invalid
    // header bytes.
    HeaderValue::from_str(&cookie).unwrap_or_else(|_| HeaderValue::from_static(""))
}
