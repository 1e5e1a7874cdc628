mod common;

use backoffice::bootstrap::ensure_defaults;
use common::{seed_role, services, user_input};

#[tokio::test]
async fn seeding_creates_default_roles_and_administrator() {
    let svc = services();

    ensure_defaults(&svc.roles, &svc.users, None).await.unwrap();

    let roles = svc.roles.list_roles().await.unwrap();
    let names: Vec<&str> = roles.iter().map(|r| r.name.as_str()).collect();
    assert!(names.contains(&"Admin"));
    assert!(names.contains(&"Manager"));

    let admin = svc.users.get_user_by_login("admin").await.unwrap().unwrap();
    assert_eq!(admin.role_name, "Admin");
    assert!(admin.is_active);
}

#[tokio::test]
async fn seeding_twice_is_idempotent() {
    let svc = services();

    ensure_defaults(&svc.roles, &svc.users, None).await.unwrap();
    ensure_defaults(&svc.roles, &svc.users, None).await.unwrap();

    assert_eq!(svc.roles.list_roles().await.unwrap().len(), 2);
    assert_eq!(svc.users.total_users().await.unwrap(), 1);
}

#[tokio::test]
async fn seeded_administrator_uses_the_configured_password() {
    let svc = services();

    ensure_defaults(&svc.roles, &svc.users, Some("override-pass"))
        .await
        .unwrap();

    assert!(svc.auth.authenticate("admin", "override-pass").await.is_ok());
    assert!(svc.auth.authenticate("admin", "admin123").await.is_err());
}

#[tokio::test]
async fn seeding_skips_the_admin_user_when_one_already_holds_the_role() {
    let svc = services();
    let admin_role = seed_role(&svc, "Admin").await;
    svc.users
        .create_user(user_input("boss", "boss@example.com", admin_role.id))
        .await
        .unwrap();

    ensure_defaults(&svc.roles, &svc.users, None).await.unwrap();

    // No default 'admin' account was added alongside the existing one.
    assert!(svc.users.get_user_by_login("admin").await.unwrap().is_none());
    assert_eq!(svc.users.total_users().await.unwrap(), 1);
}
