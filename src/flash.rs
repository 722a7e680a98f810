//! One-time status messages carried across a redirect in a cookie and
//! consumed on the next rendered page.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use serde::Serialize;
use tower_cookies::{Cookie, Cookies};

const FLASH_COOKIE: &str = "memind_flash";

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Success,
    Info,
    Error,
}

impl Level {
    fn as_str(&self) -> &'static str {
        match self {
            Level::Success => "success",
            Level::Info => "info",
            Level::Error => "error",
        }
    }

    fn parse(value: &str) -> Option<Level> {
        match value {
            "success" => Some(Level::Success),
            "info" => Some(Level::Info),
            "error" => Some(Level::Error),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Flash {
    pub level: Level,
    pub message: String,
}

/// Queue a message for the next page. Messages are our own fixed strings,
/// so a simple "level|message" encoding is enough; base64 keeps the
/// cookie value free of spaces, commas and other characters RFC 6265
/// disallows.
pub fn set(cookies: &Cookies, level: Level, message: &str) {
    let mut cookie = Cookie::new(FLASH_COOKIE, to_cookie_value(level, message));
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookies.add(cookie);
}

pub fn success(cookies: &Cookies, message: &str) {
    set(cookies, Level::Success, message);
}

pub fn info(cookies: &Cookies, message: &str) {
    set(cookies, Level::Info, message);
}

pub fn error(cookies: &Cookies, message: &str) {
    set(cookies, Level::Error, message);
}

/// Take the pending message, clearing the cookie so it shows only once.
pub fn take(cookies: &Cookies) -> Option<Flash> {
    let cookie = cookies.get(FLASH_COOKIE)?;
    let flash = from_cookie_value(cookie.value());
    let mut removal = Cookie::new(FLASH_COOKIE, "");
    removal.set_path("/");
    cookies.remove(removal);
    flash
}

fn to_cookie_value(level: Level, message: &str) -> String {
    URL_SAFE_NO_PAD.encode(encode(level, message))
}

fn from_cookie_value(value: &str) -> Option<Flash> {
    let raw = URL_SAFE_NO_PAD.decode(value).ok()?;
    decode(&String::from_utf8(raw).ok()?)
}

fn encode(level: Level, message: &str) -> String {
    format!("{}|{}", level.as_str(), message)
}

fn decode(value: &str) -> Option<Flash> {
    let (level, message) = value.split_once('|')?;
    Some(Flash {
        level: Level::parse(level)?,
        message: message.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_decode_round_trip() {
        let value = encode(Level::Success, "Entry created");
        assert_eq!(
            decode(&value),
            Some(Flash {
                level: Level::Success,
                message: "Entry created".to_string()
            })
        );
    }

    #[test]
    fn decode_rejects_garbage() {
        assert_eq!(decode("no separator"), None);
        assert_eq!(decode("shouting|hello"), None);
    }

    #[test]
    fn message_may_contain_separator() {
        let value = encode(Level::Info, "a|b");
        assert_eq!(decode(&value).unwrap().message, "a|b");
    }

    #[test]
    fn cookie_value_stays_within_rfc6265() {
        let value = to_cookie_value(Level::Success, "Welcome back, ann!");
        assert!(value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
        assert_eq!(
            from_cookie_value(&value),
            Some(Flash {
                level: Level::Success,
                message: "Welcome back, ann!".to_string()
            })
        );
    }

    #[test]
    fn unencoded_cookie_value_is_ignored() {
        assert_eq!(from_cookie_value("success|raw"), None);
    }
}
