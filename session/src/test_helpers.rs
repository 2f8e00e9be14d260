//! Fakes shared by the coordinator tests.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use futures::channel::oneshot;
use futures::executor::LocalPool;
use futures::task::LocalSpawnExt;

use crate::api::{ApiError, AuthApi, IdentityGrant, LoginGrant, LoginRequest, RefreshGrant, SignupRequest};
use crate::config::SessionConfig;
use crate::cookies::MemoryCookieJar;
use crate::coordinator::Session;
use crate::credential::AccessToken;
use crate::persistence::{IdentityStorage, MemoryStorage};

/// Scripted reply for one fake endpoint call.
pub(crate) enum Reply<T> {
    Ready(Result<T, ApiError>),
    Deferred(oneshot::Receiver<Result<T, ApiError>>),
}

impl<T> Reply<T> {
    async fn resolve(self) -> Result<T, ApiError> {
        match self {
            Self::Ready(result) => result,
            Self::Deferred(rx) => rx.await.unwrap_or_else(|_| Err(ApiError::Network("reply dropped".into()))),
        }
    }
}

fn unauthorized<T>() -> Result<T, ApiError> {
    Err(ApiError::Status { status: 401, message: "Unauthorized".into() })
}

/// Auth API whose replies are queued by the test. An empty queue answers 401.
#[derive(Default)]
pub(crate) struct FakeAuthApi {
    pub login_calls: Cell<usize>,
    pub refresh_calls: Cell<usize>,
    pub logout_calls: Cell<usize>,
    pub identity_calls: Cell<usize>,
    pub signup_calls: Cell<usize>,
    pub last_login: RefCell<Option<(String, String)>>,
    pub last_signup: RefCell<Option<SignupRequest>>,
    login_replies: RefCell<VecDeque<Reply<LoginGrant>>>,
    refresh_replies: RefCell<VecDeque<Reply<RefreshGrant>>>,
    logout_replies: RefCell<VecDeque<Reply<()>>>,
    identity_replies: RefCell<VecDeque<Reply<IdentityGrant>>>,
    signup_replies: RefCell<VecDeque<Reply<()>>>,
}

impl FakeAuthApi {
    pub fn push_login(&self, reply: Result<LoginGrant, ApiError>) {
        self.login_replies.borrow_mut().push_back(Reply::Ready(reply));
    }

    pub fn push_refresh(&self, reply: Result<RefreshGrant, ApiError>) {
        self.refresh_replies.borrow_mut().push_back(Reply::Ready(reply));
    }

    /// Queue a refresh reply the test completes later through the sender.
    pub fn defer_refresh(&self) -> oneshot::Sender<Result<RefreshGrant, ApiError>> {
        let (tx, rx) = oneshot::channel();
        self.refresh_replies.borrow_mut().push_back(Reply::Deferred(rx));
        tx
    }

    pub fn push_logout(&self, reply: Result<(), ApiError>) {
        self.logout_replies.borrow_mut().push_back(Reply::Ready(reply));
    }

    pub fn defer_logout(&self) -> oneshot::Sender<Result<(), ApiError>> {
        let (tx, rx) = oneshot::channel();
        self.logout_replies.borrow_mut().push_back(Reply::Deferred(rx));
        tx
    }

    pub fn push_identity(&self, reply: Result<IdentityGrant, ApiError>) {
        self.identity_replies.borrow_mut().push_back(Reply::Ready(reply));
    }

    pub fn defer_identity(&self) -> oneshot::Sender<Result<IdentityGrant, ApiError>> {
        let (tx, rx) = oneshot::channel();
        self.identity_replies.borrow_mut().push_back(Reply::Deferred(rx));
        tx
    }

    pub fn push_signup(&self, reply: Result<(), ApiError>) {
        self.signup_replies.borrow_mut().push_back(Reply::Ready(reply));
    }

    pub fn network_calls(&self) -> usize {
        self.login_calls.get()
            + self.refresh_calls.get()
            + self.logout_calls.get()
            + self.identity_calls.get()
            + self.signup_calls.get()
    }
}

fn bump(counter: &Cell<usize>) {
    counter.set(counter.get() + 1);
}

#[async_trait::async_trait(?Send)]
impl AuthApi for FakeAuthApi {
    async fn login(&self, request: &LoginRequest) -> Result<LoginGrant, ApiError> {
        bump(&self.login_calls);
        *self.last_login.borrow_mut() = Some((request.email.clone(), request.password.clone()));
        let reply = self.login_replies.borrow_mut().pop_front();
        match reply {
            Some(reply) => reply.resolve().await,
            None => unauthorized(),
        }
    }

    async fn refresh(&self) -> Result<RefreshGrant, ApiError> {
        bump(&self.refresh_calls);
        let reply = self.refresh_replies.borrow_mut().pop_front();
        match reply {
            Some(reply) => reply.resolve().await,
            None => unauthorized(),
        }
    }

    async fn logout(&self) -> Result<(), ApiError> {
        bump(&self.logout_calls);
        let reply = self.logout_replies.borrow_mut().pop_front();
        match reply {
            Some(reply) => reply.resolve().await,
            None => Ok(()),
        }
    }

    async fn fetch_identity(&self, _token: &AccessToken) -> Result<IdentityGrant, ApiError> {
        bump(&self.identity_calls);
        let reply = self.identity_replies.borrow_mut().pop_front();
        match reply {
            Some(reply) => reply.resolve().await,
            None => unauthorized(),
        }
    }

    async fn sign_up(&self, request: &SignupRequest) -> Result<(), ApiError> {
        bump(&self.signup_calls);
        *self.last_signup.borrow_mut() = Some(request.clone());
        let reply = self.signup_replies.borrow_mut().pop_front();
        match reply {
            Some(reply) => reply.resolve().await,
            None => Ok(()),
        }
    }
}

/// Records every navigation target.
#[derive(Default)]
pub(crate) struct RecordingNavigator {
    pub visited: RefCell<Vec<String>>,
}

impl crate::logout::Navigator for RecordingNavigator {
    fn navigate(&self, path: &str) {
        self.visited.borrow_mut().push(path.to_owned());
    }
}

pub(crate) struct Harness {
    pub session: Session,
    pub api: Rc<FakeAuthApi>,
    pub storage: MemoryStorage,
    pub cookies: MemoryCookieJar,
}

pub(crate) fn harness() -> Harness {
    harness_with_storage(MemoryStorage::default())
}

pub(crate) fn harness_with_storage(storage: MemoryStorage) -> Harness {
    let api = Rc::new(FakeAuthApi::default());
    let cookies = MemoryCookieJar::default();
    let session = Session::new(
        SessionConfig::default(),
        api.clone(),
        Rc::new(storage.clone()),
        Rc::new(cookies.clone()),
    );
    Harness { session, api, storage, cookies }
}

pub(crate) fn session_with_storage(storage: Rc<dyn IdentityStorage>) -> (Session, Rc<FakeAuthApi>) {
    let api = Rc::new(FakeAuthApi::default());
    let session =
        Session::new(SessionConfig::default(), api.clone(), storage, Rc::new(MemoryCookieJar::default()));
    (session, api)
}

pub(crate) fn token(raw: &str) -> AccessToken {
    AccessToken::new(raw).expect("non-empty token")
}

pub(crate) fn refresh_grant(token: &str, role: Option<&str>) -> RefreshGrant {
    RefreshGrant { access_token: token.to_owned(), role: role.map(str::to_owned) }
}

pub(crate) fn login_grant(token: &str, name: &str, role: &str) -> LoginGrant {
    LoginGrant { access_token: token.to_owned(), name: Some(name.to_owned()), role: Some(role.to_owned()) }
}

pub(crate) fn identity_grant(name: &str, role: &str) -> IdentityGrant {
    IdentityGrant { name: Some(name.to_owned()), role: Some(role.to_owned()) }
}

/// Spawn `fut` on `pool` and return a slot that holds its output once done.
pub(crate) fn spawn_capture<T: 'static>(
    pool: &LocalPool,
    fut: impl std::future::Future<Output = T> + 'static,
) -> Rc<RefCell<Option<T>>> {
    let slot = Rc::new(RefCell::new(None));
    let out = slot.clone();
    pool.spawner()
        .spawn_local(async move {
            *out.borrow_mut() = Some(fut.await);
        })
        .expect("spawn on local pool");
    slot
}

/// Persisted snapshot JSON as the bridge writes it.
pub(crate) fn snapshot_json(name: &str, role: &str) -> String {
    format!(r#"{{"userName":"{name}","role":"{role}"}}"#)
}
