//! Integration tests for refresh sessions and login-failure bookkeeping.

mod common;

use chrono::{Duration, Utc};
use common::register_company;
use ledgerline_db::models::session::CreateSession;
use ledgerline_db::repositories::{SessionRepo, UserRepo};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn session_for(user_id: i64, hash: &str) -> CreateSession {
    CreateSession {
        user_id,
        refresh_token_hash: hash.to_string(),
        expires_at: Utc::now() + Duration::days(7),
        user_agent: Some("integration-test".to_string()),
        ip_address: None,
    }
}

// ---------------------------------------------------------------------------
// Test: refresh rotation and replay
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_rotate_revokes_old_session_and_detects_replay(pool: PgPool) {
    let (_, admin) = register_company(&pool, "acme").await;
    let original = SessionRepo::create(&pool, &session_for(admin.id, "hash-1"))
        .await
        .unwrap();

    let rotated = SessionRepo::rotate(&pool, original.id, &session_for(admin.id, "hash-2"))
        .await
        .unwrap()
        .expect("first rotation should succeed");
    assert_ne!(rotated.id, original.id);

    assert!(
        SessionRepo::find_by_refresh_token_hash(&pool, "hash-1")
            .await
            .unwrap()
            .is_none(),
        "rotated-out token must no longer resolve"
    );
    assert!(SessionRepo::find_by_refresh_token_hash(&pool, "hash-2")
        .await
        .unwrap()
        .is_some());

    let replay = SessionRepo::rotate(&pool, original.id, &session_for(admin.id, "hash-3"))
        .await
        .unwrap();
    assert!(replay.is_none(), "second use of the old session is a replay");
    assert!(SessionRepo::find_by_refresh_token_hash(&pool, "hash-3")
        .await
        .unwrap()
        .is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_expired_session_does_not_resolve(pool: PgPool) {
    let (_, admin) = register_company(&pool, "acme").await;
    let mut expired = session_for(admin.id, "stale");
    expired.expires_at = Utc::now() - Duration::minutes(1);
    SessionRepo::create(&pool, &expired).await.unwrap();

    assert!(SessionRepo::find_by_refresh_token_hash(&pool, "stale")
        .await
        .unwrap()
        .is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_revoke_all_for_user(pool: PgPool) {
    let (_, admin) = register_company(&pool, "acme").await;
    SessionRepo::create(&pool, &session_for(admin.id, "a")).await.unwrap();
    SessionRepo::create(&pool, &session_for(admin.id, "b")).await.unwrap();

    assert_eq!(SessionRepo::revoke_all_for_user(&pool, admin.id).await.unwrap(), 2);
    assert!(SessionRepo::find_by_refresh_token_hash(&pool, "a")
        .await
        .unwrap()
        .is_none());
}

// ---------------------------------------------------------------------------
// Test: lockout bookkeeping
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_lock_account_restarts_failure_counter(pool: PgPool) {
    let (_, admin) = register_company(&pool, "acme").await;
    for expected in 1..=5 {
        assert_eq!(
            UserRepo::increment_failed_login(&pool, admin.id).await.unwrap(),
            expected
        );
    }

    let until = Utc::now() + Duration::minutes(15);
    UserRepo::lock_account(&pool, admin.id, until).await.unwrap();

    let locked = UserRepo::find_by_id(&pool, admin.id).await.unwrap().unwrap();
    assert_eq!(locked.failed_login_count, 0);
    assert!(locked.locked_until.is_some_and(|t| t > Utc::now()));

    // After the lock, one more failure counts from zero again.
    assert_eq!(
        UserRepo::increment_failed_login(&pool, admin.id).await.unwrap(),
        1
    );
}

#[sqlx::test(migrations = "./migrations")]
async fn test_successful_login_clears_lock(pool: PgPool) {
    let (_, admin) = register_company(&pool, "acme").await;
    UserRepo::increment_failed_login(&pool, admin.id).await.unwrap();
    UserRepo::lock_account(&pool, admin.id, Utc::now() + Duration::minutes(15))
        .await
        .unwrap();

    UserRepo::record_successful_login(&pool, admin.id).await.unwrap();

    let user = UserRepo::find_by_id(&pool, admin.id).await.unwrap().unwrap();
    assert_eq!(user.failed_login_count, 0);
    assert!(user.locked_until.is_none());
    assert!(user.last_login_at.is_some());
}
