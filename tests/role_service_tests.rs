mod common;

use backoffice::error::AppError;
use common::{seed_role, services, user_input};

#[tokio::test]
async fn create_role_rejects_empty_and_whitespace_names() {
    let svc = services();

    assert!(matches!(
        svc.roles.create_role("").await,
        Err(AppError::Validation(_))
    ));
    assert!(matches!(
        svc.roles.create_role("   \t").await,
        Err(AppError::Validation(_))
    ));
    // Nothing was persisted.
    assert!(svc.roles.list_roles().await.unwrap().is_empty());
}

#[tokio::test]
async fn create_role_rejects_names_over_fifty_characters() {
    let svc = services();

    let err = svc.roles.create_role(&"x".repeat(51)).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn duplicate_role_name_conflicts() {
    let svc = services();
    seed_role(&svc, "Auditor").await;

    let err = svc.roles.create_role("Auditor").await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
}

#[tokio::test]
async fn role_name_collision_is_case_sensitive() {
    let svc = services();
    seed_role(&svc, "Auditor").await;

    // Observed equality is case-sensitive, so this is a different name.
    assert!(svc.roles.create_role("auditor").await.is_ok());
}

#[tokio::test]
async fn renaming_a_role_to_its_own_name_succeeds() {
    let svc = services();
    let role = seed_role(&svc, "Auditor").await;

    let updated = svc.roles.update_role(role.id, "Auditor").await.unwrap();
    assert_eq!(updated.name, "Auditor");
}

#[tokio::test]
async fn renaming_to_another_roles_name_conflicts() {
    let svc = services();
    seed_role(&svc, "Auditor").await;
    let other = seed_role(&svc, "Support").await;

    let err = svc.roles.update_role(other.id, "Auditor").await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
}

#[tokio::test]
async fn updating_a_missing_role_is_not_found() {
    let svc = services();

    let err = svc.roles.update_role(999, "Ghost").await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn deleting_a_missing_role_is_not_found() {
    let svc = services();

    let err = svc.roles.delete_role(999).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn deleting_an_unused_role_removes_it() {
    let svc = services();
    let role = seed_role(&svc, "Auditor").await;

    assert!(svc.roles.delete_role(role.id).await.unwrap());
    assert!(svc.roles.get_role(role.id).await.unwrap().is_none());
}

#[tokio::test]
async fn deleting_a_role_in_use_conflicts() {
    let svc = services();
    let role = seed_role(&svc, "Auditor").await;
    svc.users
        .create_user(user_input("jdoe", "jdoe@example.com", role.id))
        .await
        .unwrap();

    let err = svc.roles.delete_role(role.id).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
    // The role is still there.
    assert!(svc.roles.get_role(role.id).await.unwrap().is_some());
}

#[tokio::test]
async fn role_names_are_trimmed_before_storage() {
    let svc = services();

    let role = svc.roles.create_role("  Auditor  ").await.unwrap();
    assert_eq!(role.name, "Auditor");
}

#[tokio::test]
async fn list_and_get_return_persisted_roles() {
    let svc = services();
    let auditor = seed_role(&svc, "Auditor").await;
    seed_role(&svc, "Support").await;

    let all = svc.roles.list_roles().await.unwrap();
    assert_eq!(all.len(), 2);

    let fetched = svc.roles.get_role(auditor.id).await.unwrap().unwrap();
    assert_eq!(fetched, auditor);
}
