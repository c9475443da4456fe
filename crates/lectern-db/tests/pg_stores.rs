//! PostgreSQL store tests. Require `DATABASE_URL` pointing at a server where
//! `sqlx::test` may create throwaway databases.

use std::sync::Arc;

use chrono::{Duration, Utc};
use lectern_auth::TokenCodec;
use lectern_config::JwtConfig;
use lectern_db::{NewUser, PgPool, PgRefreshTokenStore, PgSessionStore, PgUserDirectory};
use lectern_models::{FamilyId, OrganizationId, RefreshTokenRecord, Role, UserIdentity};
use lectern_session::{
    ClientInfo, DenialReason, RefreshOutcome, RefreshTokenStore, SessionManager, UserDirectory,
};

async fn create_test_user(pool: &PgPool, role: Role) -> UserIdentity {
    let organization_id = if role == Role::SystemAdmin {
        None
    } else {
        let id = sqlx::query_scalar::<_, OrganizationId>(
            "INSERT INTO organizations (name) VALUES ($1) RETURNING id",
        )
        .bind(format!("School {}", uuid::Uuid::new_v4()))
        .fetch_one(pool)
        .await
        .unwrap();
        Some(id)
    };

    PgUserDirectory::new(pool.clone())
        .create_user(&NewUser {
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
            email: format!("{}@school.example", uuid::Uuid::new_v4()),
            password_hash: "hashed".to_string(),
            role,
            organization_id,
        })
        .await
        .unwrap()
        .unwrap()
}

fn record(user: &UserIdentity, token: &str, family: FamilyId) -> RefreshTokenRecord {
    RefreshTokenRecord::issue(user.id, token.to_string(), family, Duration::days(7), Utc::now())
}

fn manager(pool: &PgPool) -> SessionManager {
    let config = JwtConfig {
        access_secret: "access-secret-key-at-least-32-characters".to_string(),
        refresh_secret: "refresh-secret-key-at-least-32-characters".to_string(),
        access_token_expiry: 900,
        refresh_token_expiry: 604800,
    };

    SessionManager::new(
        TokenCodec::new(&config),
        Arc::new(PgRefreshTokenStore::new(pool.clone())),
        Arc::new(PgSessionStore::new(pool.clone())),
        Arc::new(PgUserDirectory::new(pool.clone())),
    )
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_insert_and_find_by_token(pool: PgPool) {
    let user = create_test_user(&pool, Role::Teacher).await;
    let store = PgRefreshTokenStore::new(pool);
    let rec = record(&user, "token-a", FamilyId::new());

    store.insert(&rec).await.unwrap();

    let found = store.find_by_token("token-a").await.unwrap().unwrap();
    assert_eq!(found.id, rec.id);
    assert_eq!(found.family, rec.family);
    assert!(found.is_active());
    assert!(store.find_by_token("missing").await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_duplicate_token_is_rejected(pool: PgPool) {
    let user = create_test_user(&pool, Role::Student).await;
    let store = PgRefreshTokenStore::new(pool);
    let rec = record(&user, "token-a", FamilyId::new());

    store.insert(&rec).await.unwrap();
    let mut dup = record(&user, "token-a", FamilyId::new());
    dup.id = lectern_models::RefreshTokenId::new();
    assert!(store.insert(&dup).await.is_err());
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_revoke_if_active_affects_one_row_once(pool: PgPool) {
    let user = create_test_user(&pool, Role::Teacher).await;
    let store = PgRefreshTokenStore::new(pool);
    store
        .insert(&record(&user, "token-a", FamilyId::new()))
        .await
        .unwrap();

    assert!(store.revoke_if_active("token-a", Utc::now()).await.unwrap());
    assert!(!store.revoke_if_active("token-a", Utc::now()).await.unwrap());
    assert!(!store.revoke_if_active("missing", Utc::now()).await.unwrap());
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_concurrent_revoke_has_single_winner(pool: PgPool) {
    let user = create_test_user(&pool, Role::Teacher).await;
    let store = PgRefreshTokenStore::new(pool);
    store
        .insert(&record(&user, "token-a", FamilyId::new()))
        .await
        .unwrap();

    let (a, b) = tokio::join!(
        store.revoke_if_active("token-a", Utc::now()),
        store.revoke_if_active("token-a", Utc::now()),
    );
    assert!(a.unwrap() ^ b.unwrap());
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_revoke_family_and_user_scopes(pool: PgPool) {
    let user = create_test_user(&pool, Role::Teacher).await;
    let other = create_test_user(&pool, Role::Teacher).await;
    let store = PgRefreshTokenStore::new(pool);
    let (laptop, phone) = (FamilyId::new(), FamilyId::new());

    store.insert(&record(&user, "laptop", laptop)).await.unwrap();
    store.insert(&record(&user, "phone", phone)).await.unwrap();
    store.insert(&record(&other, "other", FamilyId::new())).await.unwrap();

    assert_eq!(
        store.revoke_all_by_family(user.id, laptop, Utc::now()).await.unwrap(),
        1
    );
    let live = store.list_active_by_user(user.id, Utc::now()).await.unwrap();
    assert_eq!(live.len(), 1);
    assert_eq!(live[0].family, phone);

    assert_eq!(store.revoke_all_by_user(user.id, Utc::now()).await.unwrap(), 1);
    assert!(store.list_active_by_user(user.id, Utc::now()).await.unwrap().is_empty());
    assert_eq!(store.list_active_by_user(other.id, Utc::now()).await.unwrap().len(), 1);
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_rotate_is_conditional(pool: PgPool) {
    let user = create_test_user(&pool, Role::Teacher).await;
    let store = PgRefreshTokenStore::new(pool);
    let family = FamilyId::new();
    store.insert(&record(&user, "t0", family)).await.unwrap();

    assert!(store.rotate("t0", &record(&user, "t1", family), Utc::now()).await.unwrap());
    assert!(!store.rotate("t0", &record(&user, "t2", family), Utc::now()).await.unwrap());

    assert!(store.find_by_token("t1").await.unwrap().unwrap().is_active());
    assert!(store.find_by_token("t2").await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_delete_expired_revoked(pool: PgPool) {
    let user = create_test_user(&pool, Role::Teacher).await;
    let store = PgRefreshTokenStore::new(pool);
    let family = FamilyId::new();
    store.insert(&record(&user, "old", family)).await.unwrap();
    store.insert(&record(&user, "live", family)).await.unwrap();
    store.revoke_if_active("old", Utc::now()).await.unwrap();

    let later = Utc::now() + Duration::days(8);
    assert_eq!(store.delete_expired_revoked(later).await.unwrap(), 1);
    assert!(store.find_by_token("live").await.unwrap().is_some());
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_user_directory(pool: PgPool) {
    let user = create_test_user(&pool, Role::Admin).await;
    let directory = PgUserDirectory::new(pool);

    assert_eq!(directory.find_user_by_id(user.id).await.unwrap(), Some(user.clone()));

    let credentials = directory
        .find_credentials_by_email(&user.email.to_uppercase())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(credentials.identity, user);
    assert_eq!(credentials.password_hash, "hashed");

    directory.touch_last_login(user.id, Utc::now()).await.unwrap();
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_create_user_rejects_duplicate_email(pool: PgPool) {
    let user = create_test_user(&pool, Role::Parent).await;
    let directory = PgUserDirectory::new(pool);

    let duplicate = directory
        .create_user(&NewUser {
            first_name: "Dup".to_string(),
            last_name: "User".to_string(),
            email: user.email.clone(),
            password_hash: "hashed".to_string(),
            role: Role::Parent,
            organization_id: user.organization_id,
        })
        .await
        .unwrap();
    assert!(duplicate.is_none());
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_manager_rotation_and_reuse_against_postgres(pool: PgPool) {
    let user = create_test_user(&pool, Role::Student).await;
    let manager = manager(&pool);
    let client = ClientInfo::default();

    let t0 = manager.create_session(&user, &client).await.unwrap();
    let RefreshOutcome::Rotated(t1) = manager.refresh_session(&t0.refresh_token, &client).await.unwrap() else {
        panic!("first refresh should rotate");
    };
    assert_eq!(t1.family, t0.family);

    assert_eq!(
        manager.refresh_session(&t0.refresh_token, &client).await.unwrap(),
        RefreshOutcome::Denied(DenialReason::ReuseDetected)
    );
    assert_eq!(
        manager.refresh_session(&t1.refresh_token, &client).await.unwrap(),
        RefreshOutcome::Denied(DenialReason::ReuseDetected)
    );

    let sessions: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sessions WHERE user_id = $1")
        .bind(user.id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(sessions, 2);
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_manager_concurrent_refresh_against_postgres(pool: PgPool) {
    let user = create_test_user(&pool, Role::Teacher).await;
    let manager = manager(&pool);
    let t0 = manager
        .create_session(&user, &ClientInfo::default())
        .await
        .unwrap();

    let client = ClientInfo::default();
    let (a, b) = tokio::join!(
        manager.refresh_session(&t0.refresh_token, &client),
        manager.refresh_session(&t0.refresh_token, &client),
    );
    let outcomes = [a.unwrap(), b.unwrap()];
    assert_eq!(outcomes.iter().filter(|o| o.is_rotated()).count(), 1);
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_logout_everywhere_wins_against_inflight_rotation(pool: PgPool) {
    let user = create_test_user(&pool, Role::Teacher).await;
    let manager = manager(&pool);
    let client = ClientInfo::default();

    for _ in 0..50 {
        let pair = manager.create_session(&user, &client).await.unwrap();

        let (refreshed, revoked) = tokio::join!(
            manager.refresh_session(&pair.refresh_token, &client),
            manager.revoke_session(user.id, None),
        );
        refreshed.unwrap();
        revoked.unwrap();

        assert!(
            manager.list_sessions(user.id).await.unwrap().is_empty(),
            "a rotated token survived logout everywhere"
        );
    }
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_emails_are_unique_regardless_of_case(pool: PgPool) {
    let directory = PgUserDirectory::new(pool);
    let new_user = |email: &str, password_hash: &str| NewUser {
        first_name: "Case".to_string(),
        last_name: "User".to_string(),
        email: email.to_string(),
        password_hash: password_hash.to_string(),
        role: Role::SystemAdmin,
        organization_id: None,
    };

    let first = directory
        .create_user(&new_user("Teacher@School.example", "hash-a"))
        .await
        .unwrap();
    assert!(first.is_some());

    let second = directory
        .create_user(&new_user("teacher@school.example", "hash-b"))
        .await
        .unwrap();
    assert!(second.is_none());

    let credentials = directory
        .find_credentials_by_email("TEACHER@school.example")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(credentials.password_hash, "hash-a");
}
