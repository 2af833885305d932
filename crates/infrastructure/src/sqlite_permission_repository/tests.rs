use chrono::{Duration, TimeZone, Utc};
use posguard_application::{
    NewPermissionOverride, PermissionCacheBuilder, PermissionCacheConfig,
    PermissionOverrideRepository, PermissionRepository,
};
use posguard_core::AppError;
use posguard_domain::{
    Operation, OperationToken, OverrideEffect, OverrideId, PermissionId, Screen, ScreenScope,
    UserId, ValidityWindow,
};
use sqlx::SqlitePool;
use sqlx::migrate::Migrator;
use sqlx::sqlite::SqlitePoolOptions;

use super::SqlitePermissionRepository;

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

async fn test_pool() -> SqlitePool {
    let pool = match SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
    {
        Ok(pool) => pool,
        Err(error) => panic!("failed to open in-memory sqlite database: {error}"),
    };

    if let Err(error) = MIGRATOR.run(&pool).await {
        panic!("failed to run migrations for sqlite permission tests: {error}");
    }

    pool
}

async fn insert_permission(
    pool: &SqlitePool,
    id: i64,
    code: &str,
    screen: Option<&str>,
    operation: Option<&str>,
    is_parent: bool,
) {
    let insert = sqlx::query(
        r#"
        INSERT INTO permissions (id, code, display_name, screen, operation, is_parent)
        VALUES (?, ?, '', ?, ?, ?)
        "#,
    )
    .bind(id)
    .bind(code)
    .bind(screen)
    .bind(operation)
    .bind(is_parent)
    .execute(pool)
    .await;

    assert!(insert.is_ok());
}

async fn insert_role(pool: &SqlitePool, id: i64, name: &str, is_active: bool, grants: &[i64]) {
    let insert = sqlx::query("INSERT INTO roles (id, name, is_active) VALUES (?, ?, ?)")
        .bind(id)
        .bind(name)
        .bind(is_active)
        .execute(pool)
        .await;
    assert!(insert.is_ok());

    for permission_id in grants {
        let grant =
            sqlx::query("INSERT INTO role_permissions (role_id, permission_id) VALUES (?, ?)")
                .bind(id)
                .bind(permission_id)
                .execute(pool)
                .await;
        assert!(grant.is_ok());
    }
}

async fn assign_role(pool: &SqlitePool, user_id: i64, role_id: i64) {
    let insert = sqlx::query("INSERT INTO user_roles (user_id, role_id) VALUES (?, ?)")
        .bind(user_id)
        .bind(role_id)
        .execute(pool)
        .await;
    assert!(insert.is_ok());
}

async fn seed_grn(pool: &SqlitePool) {
    insert_permission(pool, 100, "GRN", None, None, true).await;
    insert_permission(pool, 101, "GRN.CREATE", Some("GRN"), Some("Create"), false).await;
    insert_permission(pool, 102, "GRN.READ", Some("GRN"), Some("Read"), false).await;
    insert_permission(pool, 103, "GRN.DELETE", Some("GRN"), Some("Delete"), false).await;
    insert_permission(pool, 104, "UOM.FULL", Some("UOM"), Some("FullAccess"), false).await;
    insert_role(pool, 10, "Storekeeper", true, &[101, 102]).await;
    insert_role(pool, 11, "Retired", false, &[103]).await;
    assign_role(pool, 7, 10).await;
    assign_role(pool, 7, 11).await;
}

fn created_at() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 2, 14, 0, 0)
        .single()
        .unwrap_or_default()
}

#[tokio::test]
async fn seeded_administrator_holds_universal_grant() {
    let pool = test_pool().await;
    let repository = SqlitePermissionRepository::new(pool);

    let ids = repository.list_role_permission_ids(UserId::new(1)).await;
    assert!(ids.is_ok_and(|ids| ids == vec![PermissionId::new(1)]));

    let permission = repository.find_permission(PermissionId::new(1)).await;
    assert!(permission.is_ok_and(|permission| permission.is_some_and(|permission| {
        permission.screen() == Some(ScreenScope::All)
            && permission.operation() == Some(OperationToken::Any)
    })));
}

#[tokio::test]
async fn role_grants_skip_inactive_roles() {
    let pool = test_pool().await;
    seed_grn(&pool).await;
    let repository = SqlitePermissionRepository::new(pool);

    let ids = repository.list_role_permission_ids(UserId::new(7)).await;
    assert!(ids.is_ok_and(|ids| ids == vec![PermissionId::new(101), PermissionId::new(102)]));
}

#[tokio::test]
async fn list_permissions_decodes_tokens() {
    let pool = test_pool().await;
    seed_grn(&pool).await;
    let repository = SqlitePermissionRepository::new(pool);

    let Ok(permissions) = repository.list_permissions().await else {
        panic!("permissions should load");
    };

    let parent = permissions
        .iter()
        .find(|permission| permission.id() == PermissionId::new(100));
    assert!(parent.is_some_and(|parent| parent.is_parent() && parent.target().is_none()));

    let full = permissions
        .iter()
        .find(|permission| permission.id() == PermissionId::new(104));
    assert!(full.is_some_and(|full| {
        full.screen() == Some(ScreenScope::Only(Screen::Uom))
            && full.operation().is_some_and(|operation| operation.as_str() == "FullAccess")
    }));
}

#[tokio::test]
async fn undecodable_catalog_row_grants_nothing() {
    let pool = test_pool().await;
    seed_grn(&pool).await;
    insert_permission(&pool, 200, "LEGACY.VIEW", Some("Warehouse"), Some("View"), false).await;
    insert_permission(&pool, 201, "GRN.TELEPORT", Some("GRN"), Some("Teleport"), false).await;
    insert_role(&pool, 12, "Legacy", true, &[200, 201]).await;
    assign_role(&pool, 8, 12).await;
    let repository = std::sync::Arc::new(SqlitePermissionRepository::new(pool));

    let permissions = repository.list_permissions().await;
    assert!(permissions.is_ok_and(|permissions| permissions.iter().all(|permission| {
        permission.id() != PermissionId::new(200) && permission.id() != PermissionId::new(201)
    })));

    let missing = repository.find_permission(PermissionId::new(200)).await;
    assert!(matches!(missing, Ok(None)));

    let builder = PermissionCacheBuilder::new(repository, PermissionCacheConfig::default());
    let legacy = builder.build_cache_at(UserId::new(8), created_at()).await;
    let Ok(legacy) = legacy else {
        panic!("cache should build despite undecodable rows");
    };
    assert!(legacy.is_empty());
    assert!(!legacy.has_permission_code("LEGACY.VIEW"));

    let administrator = builder.build_cache_at(UserId::new(1), created_at()).await;
    assert!(administrator
        .is_ok_and(|cache| cache.has_permission(Screen::Grn, Operation::Delete)));
}

#[tokio::test]
async fn permission_codes_are_unique_ignoring_case() {
    let pool = test_pool().await;
    seed_grn(&pool).await;

    let duplicate = sqlx::query(
        "INSERT INTO permissions (id, code, display_name, screen, operation) VALUES (?, ?, '', ?, ?)",
    )
    .bind(105)
    .bind("grn.create")
    .bind("GRN")
    .bind("Delete")
    .execute(&pool)
    .await;
    assert!(duplicate.is_err());
}

#[tokio::test]
async fn override_lifecycle_roundtrips_through_sqlite() {
    let pool = test_pool().await;
    seed_grn(&pool).await;
    let repository = SqlitePermissionRepository::new(pool);

    let window = ValidityWindow::new(
        Some(created_at() - Duration::days(1)),
        Some(created_at() + Duration::days(1)),
    );
    let Ok(window) = window else {
        panic!("window should be valid");
    };

    let created = repository
        .create_override(NewPermissionOverride {
            user_id: UserId::new(7),
            permission_id: PermissionId::new(101),
            effect: OverrideEffect::Deny,
            window,
            reason: Some("stock count".to_owned()),
            created_at: created_at(),
        })
        .await;
    let Ok(created) = created else {
        panic!("override should be created");
    };
    assert_eq!(created.effect(), OverrideEffect::Deny);
    assert_eq!(created.window(), window);
    assert_eq!(created.reason(), Some("stock count"));
    assert!(created.revoked_at().is_none());

    let listed = repository.list_overrides_for_user(UserId::new(7)).await;
    assert!(listed.is_ok_and(|values| values == vec![created.clone()]));

    let revoked_at = created_at() + Duration::hours(2);
    assert!(repository.revoke_override(created.id(), revoked_at).await.is_ok());

    let found = repository.find_override(created.id()).await;
    assert!(found.is_ok_and(|value| value.is_some_and(|value| value.revoked_at() == Some(revoked_at))));

    let again = repository.revoke_override(created.id(), revoked_at).await;
    assert!(matches!(again, Err(AppError::Conflict(_))));

    let missing = repository.revoke_override(OverrideId::new(999), revoked_at).await;
    assert!(matches!(missing, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn builder_over_sqlite_applies_deny_override() {
    let pool = test_pool().await;
    seed_grn(&pool).await;
    let repository = std::sync::Arc::new(SqlitePermissionRepository::new(pool));

    let created = repository
        .create_override(NewPermissionOverride {
            user_id: UserId::new(7),
            permission_id: PermissionId::new(102),
            effect: OverrideEffect::Deny,
            window: ValidityWindow::unbounded(),
            reason: None,
            created_at: created_at(),
        })
        .await;
    assert!(created.is_ok());

    let builder = PermissionCacheBuilder::new(repository, PermissionCacheConfig::default());
    let cache = builder
        .build_cache_at(UserId::new(7), created_at() + Duration::minutes(5))
        .await;

    let Ok(cache) = cache else {
        panic!("cache should build");
    };
    assert!(cache.has_permission(Screen::Grn, Operation::Create));
    assert!(!cache.has_permission(Screen::Grn, Operation::Read));
    assert!(!cache.has_permission(Screen::Grn, Operation::Delete));
}
