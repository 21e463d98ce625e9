//! Tests for the account service.

use std::sync::{Arc, Mutex};

use rstest::{fixture, rstest};

use super::*;
use crate::domain::ports::{MockCredentialHasher, MockTokenRepository, MockUserRepository};
use crate::domain::{ErrorCode, Password, PasswordDigest, TokenDigest, UserName};

type Service = AccountServiceImpl<MockUserRepository, MockTokenRepository, MockCredentialHasher>;

fn service(
    users: MockUserRepository,
    tokens: MockTokenRepository,
    hasher: MockCredentialHasher,
) -> Service {
    AccountServiceImpl::new(Arc::new(users), Arc::new(tokens), Arc::new(hasher))
}

/// Hasher double that prefixes the plaintext, so digests are predictable.
#[fixture]
fn prefix_hasher() -> MockCredentialHasher {
    let mut hasher = MockCredentialHasher::new();
    hasher
        .expect_hash()
        .returning(|password| Ok(PasswordDigest::new(format!("hashed:{}", password.expose()))));
    hasher
        .expect_verify()
        .returning(|candidate, digest| digest.as_ref() == format!("hashed:{candidate}"));
    hasher
}

fn stored_user(flags: UserFlags) -> User {
    User::new(
        UserId::random(),
        EmailAddress::parse("test@londonappdev.com").expect("valid email"),
        UserName::new("Test").expect("valid name"),
        PasswordDigest::new("hashed:testpass"),
        flags,
    )
}

fn registration(email: &str, password: &str) -> Registration {
    Registration::try_from_parts(email, password, Some("Test")).expect("valid registration")
}

fn credentials(email: &str, password: &str) -> LoginCredentials {
    LoginCredentials::try_from_parts(email, password).expect("credentials shape")
}

#[rstest]
#[tokio::test]
async fn create_user_hashes_password_and_normalises_email(prefix_hasher: MockCredentialHasher) {
    let mut users = MockUserRepository::new();
    users
        .expect_insert()
        .withf(|user| {
            user.email().as_ref() == "test@londonappdev.com"
                && user.password().as_ref() == "hashed:testpass"
        })
        .times(1)
        .return_once(|_| Ok(()));

    let user = service(users, MockTokenRepository::new(), prefix_hasher)
        .create_user(registration("Test@LONDONAPPDEV.COM", "testpass"))
        .await
        .expect("user created");

    assert_eq!(user.flags(), UserFlags::regular());
    assert_eq!(user.name().as_ref(), "Test");
}

#[rstest]
#[tokio::test]
async fn create_superuser_grants_staff_and_superuser(prefix_hasher: MockCredentialHasher) {
    let mut users = MockUserRepository::new();
    users.expect_insert().times(1).return_once(|_| Ok(()));

    let user = service(users, MockTokenRepository::new(), prefix_hasher)
        .create_superuser(registration("admin@example.com", "test123"))
        .await
        .expect("superuser created");

    assert!(user.flags().is_staff);
    assert!(user.flags().is_superuser);
    assert!(user.is_active());
}

#[rstest]
#[tokio::test]
async fn duplicate_email_is_a_validation_failure(prefix_hasher: MockCredentialHasher) {
    let mut users = MockUserRepository::new();
    users
        .expect_insert()
        .return_once(|_| Err(UserPersistenceError::duplicate_email("test@londonappdev.com")));

    let err = service(users, MockTokenRepository::new(), prefix_hasher)
        .create_user(registration("test@londonappdev.com", "testpass"))
        .await
        .expect_err("duplicate must fail");

    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    let details = err.details().expect("details present");
    assert_eq!(details["field"], "email");
    assert_eq!(details["code"], "duplicate_email");
}

#[rstest]
#[case(UserPersistenceError::connection("refused"), ErrorCode::ServiceUnavailable)]
#[case(UserPersistenceError::query("syntax"), ErrorCode::InternalError)]
#[tokio::test]
async fn repository_failures_map_to_error_codes(
    prefix_hasher: MockCredentialHasher,
    #[case] failure: UserPersistenceError,
    #[case] expected: ErrorCode,
) {
    let mut users = MockUserRepository::new();
    users.expect_insert().return_once(move |_| Err(failure));

    let err = service(users, MockTokenRepository::new(), prefix_hasher)
        .create_user(registration("test@londonappdev.com", "testpass"))
        .await
        .expect_err("repository failure propagates");

    assert_eq!(err.code(), expected);
}

#[rstest]
#[case("testpass", true)]
#[case("wrong", false)]
#[tokio::test]
async fn authenticate_checks_the_password(
    prefix_hasher: MockCredentialHasher,
    #[case] password: &str,
    #[case] accepted: bool,
) {
    let user = stored_user(UserFlags::regular());
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_email()
        .withf(|email| email.as_ref() == "test@londonappdev.com")
        .return_once(move |_| Ok(Some(user)));

    let outcome = service(users, MockTokenRepository::new(), prefix_hasher)
        .authenticate(&credentials("TEST@londonappdev.com", password))
        .await
        .expect("lookup succeeds");

    assert_eq!(outcome.is_some(), accepted);
}

/// Hasher double that expects one decoy hash and counts verifications.
fn decoy_hasher(verifications: usize) -> MockCredentialHasher {
    let mut hasher = MockCredentialHasher::new();
    hasher
        .expect_hash()
        .withf(|password| password.expose() == DECOY_PASSWORD)
        .times(1)
        .returning(|_| Ok(PasswordDigest::new("decoy-digest")));
    hasher
        .expect_verify()
        .withf(|candidate, digest| candidate == "testpass" && digest.as_ref() == "decoy-digest")
        .times(verifications)
        .returning(|_, _| false);
    hasher
}

#[rstest]
#[tokio::test]
async fn authenticate_verifies_against_decoy_for_unknown_email() {
    let mut users = MockUserRepository::new();
    users.expect_find_by_email().times(1).return_once(|_| Ok(None));

    let outcome = service(users, MockTokenRepository::new(), decoy_hasher(1))
        .authenticate(&credentials("nobody@example.com", "testpass"))
        .await
        .expect("lookup succeeds");

    assert!(outcome.is_none());
}

#[rstest]
#[tokio::test]
async fn decoy_digest_is_derived_once_across_rejections() {
    let mut users = MockUserRepository::new();
    users.expect_find_by_email().times(2).returning(|_| Ok(None));
    let accounts = service(users, MockTokenRepository::new(), decoy_hasher(3));

    for email in ["nobody@example.com", "ghost@example.com", "not-an-email"] {
        let outcome = accounts
            .authenticate(&credentials(email, "testpass"))
            .await
            .expect("rejection succeeds");
        assert!(outcome.is_none(), "{email} must not authenticate");
    }
}

#[rstest]
#[tokio::test]
async fn authenticate_rejects_inactive_accounts_after_decoy_verification() {
    let inactive = stored_user(UserFlags {
        is_active: false,
        ..UserFlags::regular()
    });
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_email()
        .return_once(move |_| Ok(Some(inactive)));

    let outcome = service(users, MockTokenRepository::new(), decoy_hasher(1))
        .authenticate(&credentials("test@londonappdev.com", "testpass"))
        .await
        .expect("lookup succeeds");

    assert!(outcome.is_none());
}

#[rstest]
#[tokio::test]
async fn decoy_hashing_failure_is_an_internal_error() {
    let mut users = MockUserRepository::new();
    users.expect_find_by_email().return_once(|_| Ok(None));
    let mut hasher = MockCredentialHasher::new();
    hasher
        .expect_hash()
        .return_once(|_| Err(CredentialHasherError::hash("no entropy")));
    hasher.expect_verify().never();

    let error = service(users, MockTokenRepository::new(), hasher)
        .authenticate(&credentials("nobody@example.com", "testpass"))
        .await
        .expect_err("hasher failed");

    assert_eq!(error.code(), ErrorCode::InternalError);
}

#[rstest]
#[tokio::test]
async fn authenticate_rejects_malformed_email_without_lookup(prefix_hasher: MockCredentialHasher) {
    let mut users = MockUserRepository::new();
    users.expect_find_by_email().never();

    let outcome = service(users, MockTokenRepository::new(), prefix_hasher)
        .authenticate(&credentials("not-an-email", "testpass"))
        .await
        .expect("no lookup needed");

    assert!(outcome.is_none());
}

#[rstest]
#[tokio::test]
async fn issued_tokens_are_stored_by_digest(prefix_hasher: MockCredentialHasher) {
    let user = stored_user(UserFlags::regular());
    let expected_owner = *user.id();
    let stored: Arc<Mutex<Option<TokenDigest>>> = Arc::default();
    let sink = Arc::clone(&stored);
    let mut tokens = MockTokenRepository::new();
    tokens
        .expect_store()
        .withf(move |_, owner| *owner == expected_owner)
        .times(1)
        .returning(move |digest, _| {
            *sink.lock().expect("lock digest sink") = Some(digest.clone());
            Ok(())
        });

    let token = service(MockUserRepository::new(), tokens, prefix_hasher)
        .issue_token(&user)
        .await
        .expect("token issued");

    let digest = stored.lock().expect("lock digest sink").clone();
    assert_eq!(digest, Some(token.digest()));
}

#[rstest]
#[tokio::test]
async fn resolve_token_returns_none_for_unknown_digest(prefix_hasher: MockCredentialHasher) {
    let mut tokens = MockTokenRepository::new();
    tokens.expect_find_user_id().return_once(|_| Ok(None));
    let mut users = MockUserRepository::new();
    users.expect_find_by_id().never();

    let resolved = service(users, tokens, prefix_hasher)
        .resolve_token(&AuthToken::from_presented("unknown"))
        .await
        .expect("lookup succeeds");

    assert!(resolved.is_none());
}

#[rstest]
#[tokio::test]
async fn resolve_token_ignores_inactive_accounts(prefix_hasher: MockCredentialHasher) {
    let inactive = stored_user(UserFlags {
        is_active: false,
        ..UserFlags::regular()
    });
    let owner = *inactive.id();
    let mut tokens = MockTokenRepository::new();
    tokens
        .expect_find_user_id()
        .return_once(move |_| Ok(Some(owner)));
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(inactive)));

    let resolved = service(users, tokens, prefix_hasher)
        .resolve_token(&AuthToken::from_presented("abc"))
        .await
        .expect("lookup succeeds");

    assert!(resolved.is_none());
}

#[rstest]
#[tokio::test]
async fn update_profile_renames_and_rehashes(prefix_hasher: MockCredentialHasher) {
    let user = stored_user(UserFlags::regular());
    let user_id = *user.id();
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(user)));
    users
        .expect_update()
        .withf(|updated| {
            updated.name().as_ref() == "New name"
                && updated.password().as_ref() == "hashed:newpassword"
        })
        .times(1)
        .return_once(|_| Ok(()));

    let update = ProfileUpdate {
        name: Some(UserName::new("New name").expect("valid name")),
        password: Some(Password::new("newpassword").expect("valid password")),
    };
    let updated = service(users, MockTokenRepository::new(), prefix_hasher)
        .update_profile(&user_id, update)
        .await
        .expect("profile updated");

    assert_eq!(updated.name().as_ref(), "New name");
    assert_eq!(updated.email().as_ref(), "test@londonappdev.com");
}

#[rstest]
#[tokio::test]
async fn profile_of_missing_user_is_not_found(prefix_hasher: MockCredentialHasher) {
    let mut users = MockUserRepository::new();
    users.expect_find_by_id().return_once(|_| Ok(None));

    let err = service(users, MockTokenRepository::new(), prefix_hasher)
        .profile(&UserId::random())
        .await
        .expect_err("missing user");

    assert_eq!(err.code(), ErrorCode::NotFound);
}
