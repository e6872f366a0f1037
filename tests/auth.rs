mod common;

use std::time::Duration;

use carebase::auth::{hash_password, verify_password, AuthService, LoginRequest, RegisterRequest};
use carebase::error::{AppError, AuthError};
use carebase::models::{Role, UserProfile};
use carebase::repo::{Repository, Users};
use fake::faker::internet::en::SafeEmail;
use fake::faker::name::en::Name;
use fake::Fake;
use test_case::test_case;

fn service(store: carebase::db::DocumentStore, ttl: Duration) -> AuthService {
    AuthService::new(Repository::new(store), "test-secret", ttl)
}

fn registration(email: &str, password: &str) -> RegisterRequest {
    RegisterRequest {
        email: email.to_string(),
        password: password.to_string(),
        name: Name().fake(),
        role: Role::Caregiver,
    }
}

#[tokio::test]
async fn password_hashes_verify_and_are_salted() {
    let first = hash_password("s3cure-pass").await.unwrap();
    let second = hash_password("s3cure-pass").await.unwrap();

    assert_ne!(first, second);
    assert!(verify_password("s3cure-pass", &first).await.unwrap());
    assert!(verify_password("s3cure-pass", &second).await.unwrap());
    assert!(!verify_password("wrong", &first).await.unwrap());
}

#[tokio::test]
async fn malformed_hash_is_reported() {
    let err = verify_password("anything", "plaintext-not-a-hash").await.unwrap_err();
    assert!(matches!(err, AppError::Auth(AuthError::Malformed(_))));
}

#[tokio::test]
async fn token_expires_after_its_lifetime() {
    let (_dir, store) = common::temp_store().await;
    let auth = service(store, Duration::from_secs(1));
    let user = UserProfile {
        id: "u-1".into(),
        email: "a@example.com".into(),
        name: "A".into(),
        role: Role::Admin,
    };

    let token = auth.issue_token(&user).unwrap();
    let claims = auth.verify_token(&token).unwrap();
    assert_eq!(claims.id, "u-1");
    assert_eq!(claims.role, Role::Admin);

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(auth.verify_token(&token), Err(AuthError::Expired));
}

#[tokio::test]
async fn token_from_another_secret_is_rejected() {
    let (_dir, store) = common::temp_store().await;
    let ours = service(store.clone(), Duration::from_secs(60));
    let theirs = AuthService::new(Repository::new(store), "other-secret", Duration::from_secs(60));

    let session = theirs
        .register(registration("x@example.com", "password1"))
        .await
        .unwrap();
    assert_eq!(ours.verify_token(&session.token), Err(AuthError::InvalidSignature));
}

#[tokio::test]
async fn register_then_login_issues_tokens() {
    let (_dir, store) = common::temp_store().await;
    let auth = service(store, Duration::from_secs(60));
    let email: String = SafeEmail().fake();

    let registered = auth.register(registration(&email, "hunter22")).await.unwrap();
    assert_eq!(registered.user.email, email.to_lowercase());
    assert_eq!(auth.verify_token(&registered.token).unwrap().id, registered.user.id);

    let session = auth
        .login(LoginRequest { email: email.to_uppercase(), password: "hunter22".into() })
        .await
        .unwrap();
    assert_eq!(session.user, registered.user);

    let claims = auth.verify_token(&session.token).unwrap();
    assert_eq!(auth.me(&claims).await.unwrap(), registered.user);
}

#[tokio::test]
async fn duplicate_email_is_a_conflict() {
    let (_dir, store) = common::temp_store().await;
    let auth = service(store.clone(), Duration::from_secs(60));

    auth.register(registration("dup@example.com", "password1")).await.unwrap();
    let err = auth
        .register(registration(" DUP@example.com ", "password2"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    let users = Repository::<Users>::new(store).list().await.unwrap();
    assert_eq!(users.iter().filter(|u| u.email == "dup@example.com").count(), 1);
}

#[tokio::test]
async fn padded_email_is_normalized_before_validation() {
    let (_dir, store) = common::temp_store().await;
    let auth = service(store, Duration::from_secs(60));

    let session = auth
        .register(registration("  Padded@Example.COM ", "password1"))
        .await
        .unwrap();
    assert_eq!(session.user.email, "padded@example.com");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn racing_registrations_keep_one_account() {
    let (_dir, store) = common::temp_store().await;
    let auth = service(store.clone(), Duration::from_secs(60));

    let (a, b) = tokio::join!(
        auth.register(registration("race@example.com", "password1")),
        auth.register(registration("race@example.com", "password2")),
    );
    assert!(a.is_ok() ^ b.is_ok());

    let users = Repository::<Users>::new(store).list().await.unwrap();
    assert_eq!(users.len(), 1);
}

#[tokio::test]
async fn login_failures_do_not_reveal_which_part_was_wrong() {
    let (_dir, store) = common::temp_store().await;
    let auth = service(store, Duration::from_secs(60));
    auth.register(registration("known@example.com", "right-pass")).await.unwrap();

    let wrong_password = auth
        .login(LoginRequest { email: "known@example.com".into(), password: "wrong-pass".into() })
        .await
        .unwrap_err();
    let unknown_email = auth
        .login(LoginRequest { email: "nobody@example.com".into(), password: "right-pass".into() })
        .await
        .unwrap_err();

    assert!(matches!(wrong_password, AppError::Auth(AuthError::InvalidCredentials)));
    assert!(matches!(unknown_email, AppError::Auth(AuthError::InvalidCredentials)));
    assert_eq!(wrong_password.to_string(), unknown_email.to_string());
}

#[test_case("not-an-email", "password1", "Ann" ; "malformed email")]
#[test_case("ann@example.com", "short", "Ann" ; "short password")]
#[test_case("ann@example.com", "password1", "" ; "empty name")]
#[tokio::test]
async fn invalid_registration_is_rejected(email: &str, password: &str, name: &str) {
    let (_dir, store) = common::temp_store().await;
    let auth = service(store.clone(), Duration::from_secs(60));

    let request = RegisterRequest {
        email: email.into(),
        password: password.into(),
        name: name.into(),
        role: Role::Caregiver,
    };
    let err = auth.register(request).await.unwrap_err();

    assert!(matches!(err, AppError::Validation(_)));
    assert!(Repository::<Users>::new(store).list().await.unwrap().is_empty());
}
