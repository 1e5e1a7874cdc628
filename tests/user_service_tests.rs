mod common;

use backoffice::error::AppError;
use backoffice::models::UserUpdate;
use common::{seed_role, services, user_input, TestServices};

fn update_from(svc_user: &backoffice::models::UserRecord) -> UserUpdate {
    UserUpdate {
        id: svc_user.id,
        first_name: svc_user.first_name.clone(),
        last_name: svc_user.last_name.clone(),
        email: svc_user.email.clone(),
        phone_number: svc_user.phone_number.clone(),
        address: svc_user.address.clone(),
        gender: svc_user.gender.clone(),
        role_id: svc_user.role_id,
        is_active: svc_user.is_active,
    }
}

/// Two roles and one admin user: the starting point for the guard tests.
async fn seed_admin_world(svc: &TestServices) -> (i32, i32, backoffice::models::UserRecord) {
    let admin_role = seed_role(svc, "Admin").await;
    let staff_role = seed_role(svc, "Staff").await;
    let admin = svc
        .users
        .create_user(user_input("admin", "admin@example.com", admin_role.id))
        .await
        .unwrap();
    (admin_role.id, staff_role.id, admin)
}

#[tokio::test]
async fn create_then_get_round_trips_every_field() {
    let svc = services();
    let role = seed_role(&svc, "Staff").await;

    let mut input = user_input("jdoe", "jdoe@example.com", role.id);
    input.phone_number = Some("555-0100".to_string());
    input.address = Some("12 Main St".to_string());
    input.gender = Some("Female".to_string());

    let created = svc.users.create_user(input).await.unwrap();
    let fetched = svc.users.get_user(created.id).await.unwrap().unwrap();

    assert_eq!(created, fetched);
    assert_eq!(fetched.login, "jdoe");
    assert_eq!(fetched.email, "jdoe@example.com");
    assert_eq!(fetched.phone_number.as_deref(), Some("555-0100"));
    assert_eq!(fetched.role_name, "Staff");
    assert!(fetched.is_active);
}

#[tokio::test]
async fn stored_credentials_never_match_the_plaintext_password() {
    let svc = services();
    let role = seed_role(&svc, "Staff").await;
    svc.users
        .create_user(user_input("jdoe", "jdoe@example.com", role.id))
        .await
        .unwrap();

    // The digest is what unlocks the account, the plaintext is not stored:
    // authenticating with the real password works, while an attacker who
    // somehow replayed the plaintext as a stored-hash value would not get in.
    assert!(svc.auth.authenticate("jdoe", "secret123").await.is_ok());
    assert_ne!(
        backoffice::utils::hash_password("secret123"),
        "secret123"
    );
}

#[tokio::test]
async fn create_requires_all_mandatory_fields() {
    let svc = services();
    let role = seed_role(&svc, "Staff").await;

    let blank = |mutate: fn(&mut backoffice::models::CreateUser)| {
        let mut input = user_input("jdoe", "jdoe@example.com", role.id);
        mutate(&mut input);
        input
    };

    for input in [
        blank(|i| i.login = "  ".to_string()),
        blank(|i| i.password = String::new()),
        blank(|i| i.email = " ".to_string()),
        blank(|i| i.first_name = String::new()),
        blank(|i| i.last_name = "\t".to_string()),
    ] {
        let err = svc.users.create_user(input).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)), "got {:?}", err);
    }

    // Nothing was persisted along the way.
    assert_eq!(svc.users.total_users().await.unwrap(), 0);
}

#[tokio::test]
async fn create_validates_login_password_and_email_shape() {
    let svc = services();
    let role = seed_role(&svc, "Staff").await;

    let mut bad_login = user_input("j d", "jdoe@example.com", role.id);
    bad_login.login = "j d".to_string();
    assert!(matches!(
        svc.users.create_user(bad_login).await,
        Err(AppError::Validation(_))
    ));

    let mut short_password = user_input("jdoe", "jdoe@example.com", role.id);
    short_password.password = "abc".to_string();
    assert!(matches!(
        svc.users.create_user(short_password).await,
        Err(AppError::Validation(_))
    ));

    let bad_email = user_input("jdoe", "not-an-email", role.id);
    assert!(matches!(
        svc.users.create_user(bad_email).await,
        Err(AppError::Validation(_))
    ));
}

#[tokio::test]
async fn create_rejects_duplicate_login_and_email() {
    let svc = services();
    let role = seed_role(&svc, "Staff").await;
    svc.users
        .create_user(user_input("jdoe", "jdoe@example.com", role.id))
        .await
        .unwrap();

    let same_login = user_input("jdoe", "other@example.com", role.id);
    assert!(matches!(
        svc.users.create_user(same_login).await,
        Err(AppError::Conflict(_))
    ));

    let same_email = user_input("other", "jdoe@example.com", role.id);
    assert!(matches!(
        svc.users.create_user(same_email).await,
        Err(AppError::Conflict(_))
    ));
}

#[tokio::test]
async fn create_rejects_unknown_role_reference() {
    let svc = services();

    let err = svc
        .users
        .create_user(user_input("jdoe", "jdoe@example.com", 42))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
}

#[tokio::test]
async fn update_missing_user_is_not_found() {
    let svc = services();
    let role = seed_role(&svc, "Staff").await;
    let user = svc
        .users
        .create_user(user_input("jdoe", "jdoe@example.com", role.id))
        .await
        .unwrap();

    let mut update = update_from(&user);
    update.id = 999;
    assert!(matches!(
        svc.users.update_user(update).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn update_rejects_email_taken_by_another_user() {
    let svc = services();
    let role = seed_role(&svc, "Staff").await;
    svc.users
        .create_user(user_input("jdoe", "jdoe@example.com", role.id))
        .await
        .unwrap();
    let other = svc
        .users
        .create_user(user_input("asmith", "asmith@example.com", role.id))
        .await
        .unwrap();

    let mut update = update_from(&other);
    update.email = "jdoe@example.com".to_string();
    assert!(matches!(
        svc.users.update_user(update).await,
        Err(AppError::Conflict(_))
    ));
}

#[tokio::test]
async fn update_keeping_own_email_succeeds() {
    let svc = services();
    let role = seed_role(&svc, "Staff").await;
    let user = svc
        .users
        .create_user(user_input("jdoe", "jdoe@example.com", role.id))
        .await
        .unwrap();

    let mut update = update_from(&user);
    update.first_name = "Joan".to_string();
    let updated = svc.users.update_user(update).await.unwrap();

    assert_eq!(updated.first_name, "Joan");
    assert_eq!(updated.email, "jdoe@example.com");
}

#[tokio::test]
async fn sole_admin_cannot_be_demoted_deleted_or_deactivated() {
    let svc = services();
    let (_, staff_role_id, admin) = seed_admin_world(&svc).await;

    let mut demote = update_from(&admin);
    demote.role_id = staff_role_id;
    assert!(matches!(
        svc.users.update_user(demote).await,
        Err(AppError::Conflict(_))
    ));
    assert!(matches!(
        svc.users.delete_user(admin.id).await,
        Err(AppError::Conflict(_))
    ));
    assert!(matches!(
        svc.users.deactivate_user(admin.id).await,
        Err(AppError::Conflict(_))
    ));

    // The account is untouched.
    let still_there = svc.users.get_user(admin.id).await.unwrap().unwrap();
    assert!(still_there.is_active);
    assert_eq!(still_there.role_name, "Admin");
}

#[tokio::test]
async fn with_two_admins_the_guarded_operations_succeed() {
    let svc = services();
    let (admin_role_id, staff_role_id, first_admin) = seed_admin_world(&svc).await;
    let second_admin = svc
        .users
        .create_user(user_input("admin2", "admin2@example.com", admin_role_id))
        .await
        .unwrap();

    // Demoting one of two admins is fine.
    let mut demote = update_from(&first_admin);
    demote.role_id = staff_role_id;
    assert!(svc.users.update_user(demote).await.is_ok());

    // Restore, then exercise delete and deactivate on the other admin.
    let mut restore = update_from(&svc.users.get_user(first_admin.id).await.unwrap().unwrap());
    restore.role_id = admin_role_id;
    svc.users.update_user(restore).await.unwrap();

    assert!(svc.users.deactivate_user(second_admin.id).await.unwrap());
    assert!(svc.users.activate_user(second_admin.id).await.unwrap());
    assert!(svc.users.delete_user(second_admin.id).await.unwrap());
}

#[tokio::test]
async fn changing_admin_to_admin_role_skips_the_guard() {
    let svc = services();
    let (_, _, admin) = seed_admin_world(&svc).await;

    // Same role id resolves to an admin-named role, so the guard does not
    // apply even though this is the only admin.
    let update = update_from(&admin);
    assert!(svc.users.update_user(update).await.is_ok());
}

#[tokio::test]
async fn deactivate_guard_fires_before_the_noop_check() {
    let svc = services();
    let (admin_role_id, _, first_admin) = seed_admin_world(&svc).await;
    let second_admin = svc
        .users
        .create_user(user_input("admin2", "admin2@example.com", admin_role_id))
        .await
        .unwrap();

    // Deactivate one admin while two are active.
    assert!(svc.users.deactivate_user(second_admin.id).await.unwrap());

    // Re-deactivating the now-inactive admin would be a no-op, but the
    // active-admin count is down to one, and the guard runs first.
    assert!(matches!(
        svc.users.deactivate_user(second_admin.id).await,
        Err(AppError::Conflict(_))
    ));
    let _ = first_admin;
}

#[tokio::test]
async fn deactivating_an_inactive_non_admin_is_a_noop() {
    let svc = services();
    let role = seed_role(&svc, "Staff").await;
    let user = svc
        .users
        .create_user(user_input("jdoe", "jdoe@example.com", role.id))
        .await
        .unwrap();

    assert!(svc.users.deactivate_user(user.id).await.unwrap());
    assert!(svc.users.deactivate_user(user.id).await.unwrap());
    assert!(!svc.users.get_user(user.id).await.unwrap().unwrap().is_active);
}

#[tokio::test]
async fn activating_an_active_user_twice_changes_nothing() {
    let svc = services();
    let role = seed_role(&svc, "Staff").await;
    let user = svc
        .users
        .create_user(user_input("jdoe", "jdoe@example.com", role.id))
        .await
        .unwrap();

    assert!(svc.users.activate_user(user.id).await.unwrap());
    assert!(svc.users.activate_user(user.id).await.unwrap());

    let fetched = svc.users.get_user(user.id).await.unwrap().unwrap();
    assert_eq!(fetched, user);
}

#[tokio::test]
async fn deactivate_preserves_every_other_field() {
    let svc = services();
    let role = seed_role(&svc, "Staff").await;
    let mut input = user_input("jdoe", "jdoe@example.com", role.id);
    input.phone_number = Some("555-0100".to_string());
    input.address = Some("12 Main St".to_string());
    let user = svc.users.create_user(input).await.unwrap();

    svc.users.deactivate_user(user.id).await.unwrap();
    let fetched = svc.users.get_user(user.id).await.unwrap().unwrap();

    assert!(!fetched.is_active);
    assert_eq!(fetched.login, user.login);
    assert_eq!(fetched.email, user.email);
    assert_eq!(fetched.phone_number, user.phone_number);
    assert_eq!(fetched.address, user.address);
    assert_eq!(fetched.role_id, user.role_id);
}

#[tokio::test]
async fn missing_targets_report_not_found() {
    let svc = services();

    assert!(matches!(
        svc.users.delete_user(999).await,
        Err(AppError::NotFound(_))
    ));
    assert!(matches!(
        svc.users.activate_user(999).await,
        Err(AppError::NotFound(_))
    ));
    assert!(matches!(
        svc.users.deactivate_user(999).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn aggregates_count_totals_actives_and_per_role() {
    let svc = services();
    let (admin_role_id, staff_role_id, _) = seed_admin_world(&svc).await;
    svc.users
        .create_user(user_input("admin2", "admin2@example.com", admin_role_id))
        .await
        .unwrap();
    let staffer = svc
        .users
        .create_user(user_input("jdoe", "jdoe@example.com", staff_role_id))
        .await
        .unwrap();
    svc.users.deactivate_user(staffer.id).await.unwrap();

    assert_eq!(svc.users.total_users().await.unwrap(), 3);
    assert_eq!(svc.users.active_users().await.unwrap(), 2);
    assert_eq!(svc.users.users_by_role(admin_role_id).await.unwrap(), 2);
    assert_eq!(svc.users.users_by_role(staff_role_id).await.unwrap(), 1);

    let grouped = svc.users.users_count_grouped_by_role().await.unwrap();
    assert_eq!(grouped.get("Admin"), Some(&2));
    assert_eq!(grouped.get("Staff"), Some(&1));
}
