// Logged-in user query tests

mod common;

use common::{FakeRunner, names};
use guest_agent::users::{NO_ACTIVE_USER, UserSessionQuery};
use std::sync::Arc;

#[test]
fn users_are_deduplicated_and_first_session_is_active() {
    let runner = FakeRunner::new().with_output(&["/usr/bin/users"], "root alice root bob\n", true);
    let query = UserSessionQuery::new(Arc::new(runner));
    assert_eq!(query.list_users(), names(&["alice", "bob", "root"]));
    assert_eq!(query.active_user(), "root");
}

#[test]
fn nobody_logged_in() {
    let runner = FakeRunner::new().with_output(&["/usr/bin/users"], "\n", true);
    let query = UserSessionQuery::new(Arc::new(runner));
    assert!(query.list_users().is_empty());
    assert_eq!(query.active_user(), NO_ACTIVE_USER);
}

#[test]
fn query_failure_reports_no_users() {
    let query = UserSessionQuery::new(Arc::new(FakeRunner::new()));
    assert!(query.list_users().is_empty());
    assert_eq!(query.active_user(), "None");

    let failing = FakeRunner::new().with_output(&["/usr/bin/users"], "root\n", false);
    let query = UserSessionQuery::new(Arc::new(failing));
    assert!(query.list_users().is_empty());
}
