//! Client-visible credential cookie.
//!
//! SYSTEM CONTEXT
//! ==============
//! The access token is mirrored into a non-httpOnly cookie so a server or
//! edge layer can make a cheap allow/deny decision before rendering. The
//! refresh credential stays in an httpOnly cookie this code never sees.

#[cfg(test)]
#[path = "cookies_test.rs"]
mod cookies_test;

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use cookie::time::{Duration, OffsetDateTime};
use cookie::{Cookie, SameSite};

pub trait CookieJar {
    fn set(&self, name: &str, value: &str, max_age_secs: u32);
    fn remove(&self, name: &str);
}

/// Cookie jar kept in memory. Used on the server and in tests.
#[derive(Clone, Debug, Default)]
pub struct MemoryCookieJar {
    cookies: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryCookieJar {
    pub fn get(&self, name: &str) -> Option<String> {
        self.cookies.borrow().get(name).cloned()
    }
}

impl CookieJar for MemoryCookieJar {
    fn set(&self, name: &str, value: &str, _max_age_secs: u32) {
        self.cookies.borrow_mut().insert(name.to_owned(), value.to_owned());
    }

    fn remove(&self, name: &str) {
        self.cookies.borrow_mut().remove(name);
    }
}

/// `document.cookie` assignment that stores `value` for `max_age_secs`.
pub fn set_cookie_string(name: &str, value: &str, max_age_secs: u32) -> String {
    Cookie::build((name, value))
        .path("/")
        .same_site(SameSite::Lax)
        .max_age(Duration::seconds(i64::from(max_age_secs)))
        .build()
        .to_string()
}

/// `document.cookie` assignment that deletes `name`.
///
/// Uses a fixed past `Expires` instead of `Cookie::make_removal`, which reads
/// the wall clock and has none to read on `wasm32-unknown-unknown`.
pub fn expire_cookie_string(name: &str) -> String {
    Cookie::build((name, ""))
        .path("/")
        .same_site(SameSite::Lax)
        .max_age(Duration::ZERO)
        .expires(OffsetDateTime::UNIX_EPOCH)
        .build()
        .to_string()
}

/// Look up a non-empty cookie value in a `Cookie` request header.
pub fn cookie_value(header: &str, name: &str) -> Option<String> {
    Cookie::split_parse(header)
        .filter_map(Result::ok)
        .find(|cookie| cookie.name() == name)
        .map(|cookie| cookie.value().to_owned())
        .filter(|value| !value.is_empty())
}
