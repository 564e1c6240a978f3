//! Device-category extraction from request headers.
//!
//! A deliberately small stand-in for a full device database. The core only
//! ever consumes the category string this module produces; swapping in a
//! real parser changes nothing downstream.

use axum::http::{header, HeaderMap};

/// Derive a device-category string from request headers.
///
/// Checks the `Sec-CH-UA-Mobile` client hint first, then falls back to
/// User-Agent substrings. `None` means no category could be derived;
/// callers classify that as desktop.
pub fn device_category(headers: &HeaderMap) -> Option<String> {
    if let Some(hint) = headers
        .get("sec-ch-ua-mobile")
        .and_then(|value| value.to_str().ok())
    {
        if hint.trim() == "?1" {
            return Some("smartphone".to_string());
        }
    }

    let ua = headers
        .get(header::USER_AGENT)?
        .to_str()
        .ok()?
        .to_ascii_lowercase();

    if ua.contains("ipad") || ua.contains("tablet") {
        return Some("tablet".to_string());
    }
    // Android reports "mobile" only on phones; android-without-mobile is a
    // tablet.
    if ua.contains("android") {
        return Some(
            if ua.contains("mobile") {
                "smartphone"
            } else {
                "tablet"
            }
            .to_string(),
        );
    }
    if ua.contains("iphone") || ua.contains("mobile") {
        return Some("smartphone".to_string());
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(ua: &str) -> HeaderMap {
        let mut map = HeaderMap::new();
        map.insert(header::USER_AGENT, HeaderValue::from_str(ua).unwrap());
        map
    }

    #[test]
    fn test_iphone_is_smartphone() {
        let ua = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) Mobile/15E148";
        assert_eq!(device_category(&headers(ua)).as_deref(), Some("smartphone"));
    }

    #[test]
    fn test_ipad_is_tablet() {
        let ua = "Mozilla/5.0 (iPad; CPU OS 17_0 like Mac OS X)";
        assert_eq!(device_category(&headers(ua)).as_deref(), Some("tablet"));
    }

    #[test]
    fn test_android_phone_vs_tablet() {
        let phone = "Mozilla/5.0 (Linux; Android 14; Pixel 8) Mobile Safari/537.36";
        assert_eq!(
            device_category(&headers(phone)).as_deref(),
            Some("smartphone")
        );

        let tablet = "Mozilla/5.0 (Linux; Android 14; SM-X710) Safari/537.36";
        assert_eq!(device_category(&headers(tablet)).as_deref(), Some("tablet"));
    }

    #[test]
    fn test_desktop_is_none() {
        let ua = "Mozilla/5.0 (Macintosh; Intel Mac OS X 14_0) Safari/605.1.15";
        assert_eq!(device_category(&headers(ua)), None);
    }

    #[test]
    fn test_missing_user_agent_is_none() {
        assert_eq!(device_category(&HeaderMap::new()), None);
    }

    #[test]
    fn test_client_hint_wins() {
        let mut map = headers("Mozilla/5.0 (Macintosh)");
        map.insert("sec-ch-ua-mobile", HeaderValue::from_static("?1"));
        assert_eq!(device_category(&map).as_deref(), Some("smartphone"));
    }
}
