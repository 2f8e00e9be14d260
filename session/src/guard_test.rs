use super::*;
use crate::api::ApiError;
use crate::cookies::CookieJar;
use crate::credential::{Credential, CredentialPatch};
use crate::persistence::{IdentityStorage, MemoryStorage};
use crate::test_helpers::{
    Harness, harness, harness_with_storage, identity_grant, refresh_grant, snapshot_json, spawn_capture, token,
};
use futures::executor::{LocalPool, block_on};

type CheckSlot = Rc<RefCell<Option<Result<GuardDecision, SessionError>>>>;

fn spawn_check(pool: &LocalPool, guard: &RouteGuard, path: &'static str) -> CheckSlot {
    let guard = guard.clone();
    spawn_capture(pool, async move { guard.check(path).await })
}

fn signed_in(h: &Harness, role: Option<Role>) {
    h.session.store().set_credential(CredentialPatch::default().token(token("jwt")).role(role));
}

fn hydrated() -> Harness {
    let h = harness();
    h.session.hydrate();
    h
}

// =============================================================
// hydration
// =============================================================

#[test]
fn guard_stays_pending_until_hydration() {
    let mut pool = LocalPool::new();
    let h = harness();
    let guard = RouteGuard::new(h.session.clone(), GuardOptions::default());

    let result = spawn_check(&pool, &guard, "/dashboard");
    pool.run_until_stalled();

    assert_eq!(guard.state(), GuardState::Pending);
    assert!(result.borrow().is_none());
    assert_eq!(h.api.network_calls(), 0);

    h.session.hydrate();
    pool.run_until_stalled();

    assert_eq!(h.api.refresh_calls.get(), 1);
    assert_eq!(
        *result.borrow(),
        Some(Ok(GuardDecision::RedirectToLogin("/login?redirect=%2Fdashboard".into())))
    );
}

#[test]
fn restored_identity_without_token_still_refreshes() {
    let storage = MemoryStorage::default();
    storage.write("parkdash.identity", &snapshot_json("Ana", "admin")).expect("write");
    let h = harness_with_storage(storage);
    h.api.push_refresh(Ok(refresh_grant("jwt", Some("admin"))));
    h.session.hydrate();

    let guard = RouteGuard::new(h.session.clone(), GuardOptions::requires(Role::Admin));
    assert_eq!(block_on(guard.check("/admin/logs")), Ok(GuardDecision::Allow));
    assert_eq!(h.api.refresh_calls.get(), 1);
}

// =============================================================
// authentication
// =============================================================

#[test]
fn token_present_allows_without_network() {
    let h = hydrated();
    signed_in(&h, Some(Role::User));
    let guard = RouteGuard::new(h.session.clone(), GuardOptions::default());

    assert_eq!(block_on(guard.check("/dashboard")), Ok(GuardDecision::Allow));
    assert_eq!(guard.state(), GuardState::Allowed);
    assert_eq!(h.api.network_calls(), 0);
}

#[test]
fn refresh_success_allows() {
    let h = hydrated();
    h.api.push_refresh(Ok(refresh_grant("jwt", Some("user"))));
    let guard = RouteGuard::new(h.session.clone(), GuardOptions::default());

    assert_eq!(block_on(guard.check("/dashboard")), Ok(GuardDecision::Allow));
    assert_eq!(h.session.credential().access_token, Some(token("jwt")));
}

#[test]
fn refresh_failure_redirects_with_return_path_and_invalidates() {
    let storage = MemoryStorage::default();
    storage.write("parkdash.identity", &snapshot_json("Ana", "user")).expect("write");
    let h = harness_with_storage(storage);
    h.session.hydrate();
    h.cookies.set("access_token", "stale", 900);
    h.api.push_refresh(Err(ApiError::Status { status: 401, message: "expired".into() }));
    let guard = RouteGuard::new(h.session.clone(), GuardOptions::default());

    let decision = block_on(guard.check("/reports/daily?lot=3"));

    assert_eq!(
        decision,
        Ok(GuardDecision::RedirectToLogin("/login?redirect=%2Freports%2Fdaily%3Flot%3D3".into()))
    );
    assert_eq!(guard.state(), GuardState::Denied);
    assert_eq!(h.session.credential(), Credential::default());
    assert_eq!(h.storage.get("parkdash.identity"), None);
    assert_eq!(h.cookies.get("access_token"), None);
}

#[test]
fn logout_landing_right_after_refresh_redirects_to_login() {
    let h = hydrated();
    h.api.push_refresh(Ok(refresh_grant("jwt", Some("user"))));
    let store = h.session.store().clone();
    let _sign_out = h.session.store().subscribe(move |c| {
        if c.access_token.is_some() {
            store.clear();
        }
    });
    let guard = RouteGuard::new(h.session.clone(), GuardOptions::default());

    assert_eq!(
        block_on(guard.check("/dashboard")),
        Ok(GuardDecision::RedirectToLogin("/login?redirect=%2Fdashboard".into()))
    );
    assert_eq!(guard.state(), GuardState::Denied);
    assert_eq!(h.api.refresh_calls.get(), 1);
}

#[test]
fn concurrent_guards_share_one_refresh() {
    let mut pool = LocalPool::new();
    let h = hydrated();
    let reply = h.api.defer_refresh();
    let sidebar = RouteGuard::new(h.session.clone(), GuardOptions::default());
    let page = RouteGuard::new(h.session.clone(), GuardOptions::default());

    let first = spawn_check(&pool, &sidebar, "/dashboard");
    let second = spawn_check(&pool, &page, "/dashboard");
    pool.run_until_stalled();
    assert_eq!(h.api.refresh_calls.get(), 1);
    assert_eq!(sidebar.state(), GuardState::Checking);

    assert!(reply.send(Ok(refresh_grant("jwt", Some("user")))).is_ok());
    pool.run_until_stalled();

    assert_eq!(*first.borrow(), Some(Ok(GuardDecision::Allow)));
    assert_eq!(*second.borrow(), Some(Ok(GuardDecision::Allow)));
    assert_eq!(h.api.refresh_calls.get(), 1);
}

#[test]
fn repeated_checks_on_one_guard_join() {
    let mut pool = LocalPool::new();
    let h = hydrated();
    let reply = h.api.defer_refresh();
    let guard = RouteGuard::new(h.session.clone(), GuardOptions::default());

    let first = spawn_check(&pool, &guard, "/dashboard");
    let second = spawn_check(&pool, &guard, "/dashboard");
    pool.run_until_stalled();
    assert!(reply.send(Err(ApiError::Network("offline".into()))).is_ok());
    pool.run_until_stalled();

    let expected = Some(Ok(GuardDecision::RedirectToLogin("/login?redirect=%2Fdashboard".into())));
    assert_eq!(*first.borrow(), expected);
    assert_eq!(*second.borrow(), expected);
    assert_eq!(h.api.refresh_calls.get(), 1);
}

// =============================================================
// roles
// =============================================================

#[test]
fn role_mismatch_redirects_home() {
    let h = hydrated();
    signed_in(&h, Some(Role::User));
    let guard = RouteGuard::new(h.session.clone(), GuardOptions::requires(Role::Admin));

    assert_eq!(block_on(guard.check("/admin/logs")), Ok(GuardDecision::RedirectToHome("/dashboard".into())));
    assert_eq!(guard.state(), GuardState::RoleDenied);
    assert!(h.session.credential().is_authenticated());
}

#[test]
fn admin_may_open_user_views() {
    let h = hydrated();
    signed_in(&h, Some(Role::Admin));
    let guard = RouteGuard::new(h.session.clone(), GuardOptions::requires(Role::User));
    assert_eq!(block_on(guard.check("/account")), Ok(GuardDecision::Allow));
}

#[test]
fn absent_role_waits_instead_of_denying() {
    let mut pool = LocalPool::new();
    let h = hydrated();
    signed_in(&h, None);
    let _lookup = h.api.defer_identity();
    let guard = RouteGuard::new(h.session.clone(), GuardOptions::requires(Role::Admin));

    let result = spawn_check(&pool, &guard, "/admin/logs");
    pool.run_until_stalled();
    assert_eq!(guard.state(), GuardState::AwaitingRole);
    assert!(result.borrow().is_none());

    h.session.store().set_credential(CredentialPatch::default().user_name(Some("Ana".into())));
    pool.run_until_stalled();
    assert_eq!(guard.state(), GuardState::AwaitingRole);

    h.session.store().set_credential(CredentialPatch::default().role(Some(Role::Admin)));
    pool.run_until_stalled();
    assert_eq!(*result.borrow(), Some(Ok(GuardDecision::Allow)));
}

#[test]
fn refresh_without_role_waits_for_the_role_to_arrive() {
    let mut pool = LocalPool::new();
    let storage = MemoryStorage::default();
    storage.write("parkdash.identity", &snapshot_json("Ana", "admin")).expect("write");
    let h = harness_with_storage(storage);
    h.session.hydrate();
    h.api.push_refresh(Ok(refresh_grant("jwt", None)));
    let _lookup = h.api.defer_identity();
    let guard = RouteGuard::new(h.session.clone(), GuardOptions::requires(Role::Admin));

    let result = spawn_check(&pool, &guard, "/dashboard/userLogs");
    pool.run_until_stalled();

    assert_eq!(h.api.refresh_calls.get(), 1);
    assert_eq!(h.session.credential().access_token, Some(token("jwt")));
    assert_eq!(h.session.credential().role, None);
    assert_eq!(guard.state(), GuardState::AwaitingRole);
    assert!(result.borrow().is_none());

    h.session.store().set_credential(CredentialPatch::default().role(Some(Role::Admin)));
    pool.run_until_stalled();

    assert_eq!(*result.borrow(), Some(Ok(GuardDecision::Allow)));
    assert_eq!(guard.state(), GuardState::Allowed);
}

#[test]
fn absent_role_is_looked_up() {
    let mut pool = LocalPool::new();
    let h = hydrated();
    signed_in(&h, None);
    h.api.push_identity(Ok(identity_grant("Ana", "user")));
    let guard = RouteGuard::new(h.session.clone(), GuardOptions::requires(Role::Admin));

    let result = spawn_check(&pool, &guard, "/admin/logs");
    pool.run_until_stalled();

    assert_eq!(h.api.identity_calls.get(), 1);
    assert_eq!(*result.borrow(), Some(Ok(GuardDecision::RedirectToHome("/dashboard".into()))));
    assert_eq!(h.session.credential().role, Some(Role::User));
}

#[test]
fn failed_lookup_keeps_waiting() {
    let mut pool = LocalPool::new();
    let h = hydrated();
    signed_in(&h, None);
    h.api.push_identity(Err(ApiError::Network("offline".into())));
    let guard = RouteGuard::new(h.session.clone(), GuardOptions::requires(Role::Admin));

    let result = spawn_check(&pool, &guard, "/admin/logs");
    pool.run_until_stalled();
    assert_eq!(guard.state(), GuardState::AwaitingRole);
    assert!(result.borrow().is_none());

    h.session.store().set_credential(CredentialPatch::default().role(Some(Role::User)));
    pool.run_until_stalled();
    assert_eq!(*result.borrow(), Some(Ok(GuardDecision::RedirectToHome("/dashboard".into()))));
}

#[test]
fn token_cleared_while_awaiting_role_denies() {
    let mut pool = LocalPool::new();
    let h = hydrated();
    signed_in(&h, None);
    let _lookup = h.api.defer_identity();
    let guard = RouteGuard::new(h.session.clone(), GuardOptions::requires(Role::Admin));

    let result = spawn_check(&pool, &guard, "/admin/logs");
    pool.run_until_stalled();
    h.session.store().clear();
    pool.run_until_stalled();

    assert_eq!(
        *result.borrow(),
        Some(Ok(GuardDecision::RedirectToLogin("/login?redirect=%2Fadmin%2Flogs".into())))
    );
    assert_eq!(guard.state(), GuardState::Denied);
}

// =============================================================
// cancellation
// =============================================================

#[test]
fn cancelled_check_reports_stale_write_and_applies_nothing() {
    let mut pool = LocalPool::new();
    let storage = MemoryStorage::default();
    storage.write("parkdash.identity", &snapshot_json("Ana", "user")).expect("write");
    let h = harness_with_storage(storage);
    let guard = RouteGuard::new(h.session.clone(), GuardOptions::default());

    let result = spawn_check(&pool, &guard, "/dashboard");
    pool.run_until_stalled();
    guard.cancel();
    h.session.hydrate();
    pool.run_until_stalled();

    assert_eq!(*result.borrow(), Some(Err(SessionError::StaleWrite)));
    assert_eq!(h.session.credential().user_name.as_deref(), Some("Ana"));
    assert_eq!(h.storage.get("parkdash.identity"), Some(snapshot_json("Ana", "user")));
}

#[test]
fn cancel_releases_a_check_parked_awaiting_role() {
    let mut pool = LocalPool::new();
    let h = hydrated();
    signed_in(&h, None);
    h.api.push_identity(Err(ApiError::Network("offline".into())));
    let guard = RouteGuard::new(h.session.clone(), GuardOptions::requires(Role::Admin));
    let baseline = h.session.store().listener_count();

    let result = spawn_check(&pool, &guard, "/admin/logs");
    pool.run_until_stalled();
    assert_eq!(guard.state(), GuardState::AwaitingRole);
    assert_eq!(h.session.store().listener_count(), baseline + 1);

    guard.cancel();
    pool.run_until_stalled();

    assert_eq!(*result.borrow(), Some(Err(SessionError::StaleWrite)));
    assert_eq!(h.session.store().listener_count(), baseline);

    h.session.store().set_credential(CredentialPatch::default().role(Some(Role::Admin)));
    pool.run_until_stalled();
    assert_eq!(guard.state(), GuardState::AwaitingRole);
}

#[test]
fn check_after_cancel_starts_fresh() {
    let mut pool = LocalPool::new();
    let h = hydrated();
    let reply = h.api.defer_refresh();
    let guard = RouteGuard::new(h.session.clone(), GuardOptions::default());

    let stale = spawn_check(&pool, &guard, "/dashboard");
    pool.run_until_stalled();
    guard.cancel();
    signed_in(&h, Some(Role::User));
    let fresh = spawn_check(&pool, &guard, "/dashboard");
    pool.run_until_stalled();

    assert_eq!(*fresh.borrow(), Some(Ok(GuardDecision::Allow)));
    assert!(reply.send(Err(ApiError::Network("offline".into()))).is_ok());
    pool.run_until_stalled();
    assert_eq!(*stale.borrow(), Some(Err(SessionError::StaleWrite)));
    assert!(h.session.credential().is_authenticated());
}

#[test]
fn decision_exposes_redirect_target() {
    assert_eq!(GuardDecision::Allow.redirect_target(), None);
    assert_eq!(GuardDecision::RedirectToHome("/dashboard".into()).redirect_target(), Some("/dashboard"));
    assert!(GuardState::RoleDenied.is_settled());
    assert!(!GuardState::AwaitingRole.is_settled());
}
