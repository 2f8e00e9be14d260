//! Browser adapters for the session coordinator's storage and cookie seams.
//!
//! SYSTEM CONTEXT
//! ==============
//! The identity snapshot goes to `sessionStorage` (per tab, survives reloads)
//! and the access token is mirrored into a client-visible cookie for the
//! pre-render check. Both are hydrate-only; server builds fall back to the
//! in-memory implementations from the session crate.
//!
//! TRADE-OFFS
//! ==========
//! Storage errors are reported to the persistence bridge, which logs once and
//! degrades to memory-only. Cookie writes are best-effort and only warn.

#[cfg(test)]
#[path = "browser_test.rs"]
mod browser_test;

use std::rc::Rc;

use session::cookies::{expire_cookie_string, set_cookie_string};
use session::{CookieJar, IdentityStorage, StorageError};

/// `window.sessionStorage`.
#[derive(Clone, Copy, Debug, Default)]
pub struct SessionStorage;

#[cfg(feature = "hydrate")]
fn session_storage() -> Result<web_sys::Storage, StorageError> {
    web_sys::window()
        .ok_or_else(|| StorageError::Unavailable("no window".to_owned()))?
        .session_storage()
        .map_err(|e| StorageError::Unavailable(format!("{e:?}")))?
        .ok_or_else(|| StorageError::Unavailable("sessionStorage is disabled".to_owned()))
}

#[cfg(feature = "hydrate")]
fn rejected(err: wasm_bindgen::JsValue) -> StorageError {
    StorageError::Rejected(format!("{err:?}"))
}

#[cfg(not(feature = "hydrate"))]
fn no_browser() -> StorageError {
    StorageError::Unavailable("no browser".to_owned())
}

impl IdentityStorage for SessionStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        #[cfg(feature = "hydrate")]
        {
            session_storage()?.get_item(key).map_err(rejected)
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = key;
            Err(no_browser())
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        #[cfg(feature = "hydrate")]
        {
            session_storage()?.set_item(key, value).map_err(rejected)
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = (key, value);
            Err(no_browser())
        }
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        #[cfg(feature = "hydrate")]
        {
            session_storage()?.remove_item(key).map_err(rejected)
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = key;
            Err(no_browser())
        }
    }
}

/// `document.cookie`.
#[derive(Clone, Copy, Debug, Default)]
pub struct DocumentCookies;

fn write_cookie(assignment: &str) {
    #[cfg(feature = "hydrate")]
    {
        use wasm_bindgen::JsCast;

        let Some(doc) = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.dyn_into::<web_sys::HtmlDocument>().ok())
        else {
            return;
        };
        if doc.set_cookie(assignment).is_err() {
            leptos::logging::warn!("could not write the credential cookie");
        }
    }
    #[cfg(not(feature = "hydrate"))]
    {
        let _ = assignment;
    }
}

impl CookieJar for DocumentCookies {
    fn set(&self, name: &str, value: &str, max_age_secs: u32) {
        write_cookie(&set_cookie_string(name, value, max_age_secs));
    }

    fn remove(&self, name: &str) {
        write_cookie(&expire_cookie_string(name));
    }
}

/// Storage backing the identity snapshot in this build.
///
/// In the browser this is `sessionStorage`, or `UnavailableStorage` when the
/// tab refuses it (private mode, sandboxed iframe).
pub fn identity_storage() -> Rc<dyn IdentityStorage> {
    #[cfg(feature = "hydrate")]
    {
        match session_storage() {
            Ok(_) => Rc::new(SessionStorage),
            Err(err) => {
                leptos::logging::warn!("identity will not survive reloads: {err}");
                Rc::new(session::UnavailableStorage)
            }
        }
    }
    #[cfg(not(feature = "hydrate"))]
    {
        Rc::new(session::MemoryStorage::default())
    }
}

/// Cookie jar for the credential cookie in this build.
pub fn cookie_jar() -> Rc<dyn CookieJar> {
    #[cfg(feature = "hydrate")]
    {
        Rc::new(DocumentCookies)
    }
    #[cfg(not(feature = "hydrate"))]
    {
        Rc::new(session::MemoryCookieJar::default())
    }
}
