//! Session cookie directives.
//!
//! Both cookies are HttpOnly, `SameSite=Lax` and live exactly as long as the
//! token they carry. `Secure` follows [`CookieConfig::secure`].

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use lectern_config::CookieConfig;

pub const ACCESS_TOKEN_COOKIE: &str = "access_token";
pub const REFRESH_TOKEN_COOKIE: &str = "refresh_token";

fn session_cookie(
    name: &'static str,
    value: String,
    max_age: chrono::Duration,
    config: &CookieConfig,
) -> Cookie<'static> {
    Cookie::build((name, value))
        .http_only(true)
        .secure(config.secure)
        .same_site(SameSite::Lax)
        .path(config.path.clone())
        .max_age(time::Duration::seconds(max_age.num_seconds()))
        .build()
}

/// Adds both session cookies to `jar`.
pub fn set_session_cookies(
    jar: CookieJar,
    access_token: &str,
    refresh_token: &str,
    access_ttl: chrono::Duration,
    refresh_ttl: chrono::Duration,
    config: &CookieConfig,
) -> CookieJar {
    jar.add(session_cookie(
        ACCESS_TOKEN_COOKIE,
        access_token.to_string(),
        access_ttl,
        config,
    ))
    .add(session_cookie(
        REFRESH_TOKEN_COOKIE,
        refresh_token.to_string(),
        refresh_ttl,
        config,
    ))
}

fn removal_cookie(name: &'static str, config: &CookieConfig) -> Cookie<'static> {
    let mut cookie = Cookie::build((name, ""))
        .http_only(true)
        .secure(config.secure)
        .same_site(SameSite::Lax)
        .path(config.path.clone())
        .build();
    cookie.make_removal();
    cookie
}

/// Emits expired removal cookies for both session cookies, whether or not
/// the client sent them.
pub fn clear_session_cookies(jar: CookieJar, config: &CookieConfig) -> CookieJar {
    jar.add(removal_cookie(ACCESS_TOKEN_COOKIE, config))
        .add(removal_cookie(REFRESH_TOKEN_COOKIE, config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::response::IntoResponse;

    fn set_cookie_headers(jar: CookieJar) -> Vec<String> {
        jar.into_response()
            .headers()
            .get_all(axum::http::header::SET_COOKIE)
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect()
    }

    #[test]
    fn test_session_cookie_attributes() {
        let jar = set_session_cookies(
            CookieJar::new(),
            "access",
            "refresh",
            chrono::Duration::minutes(15),
            chrono::Duration::days(7),
            &CookieConfig::default(),
        );

        let access = jar.get(ACCESS_TOKEN_COOKIE).unwrap();
        assert_eq!(access.value(), "access");
        assert_eq!(access.http_only(), Some(true));
        assert_eq!(access.same_site(), Some(SameSite::Lax));
        assert_eq!(access.path(), Some("/"));
        assert_eq!(access.max_age(), Some(time::Duration::seconds(900)));
        assert_ne!(access.secure(), Some(true));

        let refresh = jar.get(REFRESH_TOKEN_COOKIE).unwrap();
        assert_eq!(refresh.max_age(), Some(time::Duration::seconds(604800)));
    }

    #[test]
    fn test_secure_flag_in_production() {
        let config = CookieConfig {
            secure: true,
            ..CookieConfig::default()
        };
        let headers = set_cookie_headers(set_session_cookies(
            CookieJar::new(),
            "a",
            "r",
            chrono::Duration::minutes(15),
            chrono::Duration::days(7),
            &config,
        ));

        assert_eq!(headers.len(), 2);
        assert!(headers.iter().all(|h| h.contains("Secure")));
        assert!(headers.iter().all(|h| h.contains("HttpOnly")));
        assert!(headers.iter().all(|h| h.contains("SameSite=Lax")));
    }

    #[test]
    fn test_clear_emits_expired_cookies() {
        let headers = set_cookie_headers(clear_session_cookies(
            CookieJar::new(),
            &CookieConfig::default(),
        ));

        assert_eq!(headers.len(), 2);
        assert!(headers.iter().any(|h| h.starts_with("access_token=")));
        assert!(headers.iter().any(|h| h.starts_with("refresh_token=")));
        assert!(headers.iter().all(|h| h.contains("Max-Age=0")));
    }
}
