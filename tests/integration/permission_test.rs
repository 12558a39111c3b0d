//! Integration tests for folder visibility and capability checks.

mod helpers;

use folderhub_core::error::ErrorKind;
use folderhub_entity::folder::{GetFolderQuery, UpdateFolderCommand};
use folderhub_entity::identity::Principal;
use folderhub_entity::permission::PermissionAction;

use helpers::{ORG, TestApp, assert_kind, create_cmd, granted, nobody};

#[tokio::test]
async fn test_root_children_checked_individually() {
    let app = TestApp::new();
    app.create("a", "A", "").await;
    app.create("b", "B", "").await;
    app.create("c", "C", "").await;

    let viewer = granted(2, "viewer", &[PermissionAction::FoldersRead], &["a", "c"]);
    assert_eq!(app.children("", &viewer).await.unwrap(), vec!["a", "c"]);
    assert!(app.children("", &nobody()).await.unwrap().is_empty());
    assert_eq!(
        app.children("", &app.admin).await.unwrap(),
        vec!["a", "b", "c"]
    );
}

#[tokio::test]
async fn test_subfolders_visible_through_parent() {
    let app = TestApp::new();
    app.create("a", "A", "").await;
    app.create("a1", "A1", "a").await;
    app.create("a2", "A2", "a").await;
    app.create("b", "B", "").await;

    let viewer = granted(2, "viewer", &[PermissionAction::FoldersRead], &["a"]);
    assert_eq!(app.children("a", &viewer).await.unwrap(), vec!["a1", "a2"]);
    assert_kind(app.children("b", &viewer).await, ErrorKind::AccessDenied);

    // A grant on the parent also opens the subfolder itself.
    let folder = app
        .service
        .get(&GetFolderQuery::by_uid(ORG, "a1", &viewer))
        .await
        .unwrap();
    assert_eq!(folder.parent_uid, "a");
    assert!(folder.id > 0);
}

#[tokio::test]
async fn test_shared_with_me_skips_reachable_folders() {
    let app = TestApp::new();
    app.create("team", "Team", "").await;
    app.create("proj", "Project", "team").await;
    app.create("sub", "Sub", "proj").await;
    app.create("other", "Other", "").await;
    app.create("x", "X", "other").await;

    let viewer = granted(2, "viewer", &[PermissionAction::FoldersRead], &["proj", "sub"])
        .grant(PermissionAction::DashboardsRead, "folders:uid:x");

    let shared = app.service.get_shared_with_me(ORG, &viewer).await.unwrap();
    let uids: Vec<&str> = shared.iter().map(|f| f.uid.as_str()).collect();
    assert_eq!(uids, vec!["proj", "x"]);
    assert!(shared.iter().all(|f| f.id > 0 && f.version > 0));
}

#[tokio::test]
async fn test_shared_with_me_excludes_folders_under_visible_root() {
    let app = TestApp::new();
    app.create("other", "Other", "").await;
    app.create("x", "X", "other").await;
    app.create("deep", "Deep", "x").await;

    let viewer = granted(
        2,
        "viewer",
        &[PermissionAction::FoldersRead],
        &["other", "deep"],
    );
    assert_eq!(app.children("", &viewer).await.unwrap(), vec!["other"]);
    assert!(
        app.service
            .get_shared_with_me(ORG, &viewer)
            .await
            .unwrap()
            .is_empty()
    );

    let wildcard = granted(3, "wildcard", &[PermissionAction::FoldersRead], &["*"]);
    assert!(
        app.service
            .get_shared_with_me(ORG, &wildcard)
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn test_create_at_root_requires_create_permission() {
    let app = TestApp::new();
    assert_kind(
        app.service
            .create(&create_cmd("mine", "Mine", "", &nobody()))
            .await,
        ErrorKind::AccessDenied,
    );

    let creator = nobody().grant(PermissionAction::FoldersCreate, "folders:uid:*");
    let created = app
        .service
        .create(&create_cmd("mine", "Mine", "", &creator))
        .await
        .unwrap();
    assert_eq!(created.created_by, 99);
}

#[tokio::test]
async fn test_create_under_parent_requires_write() {
    let app = TestApp::new();
    app.create("team", "Team", "").await;

    let reader = granted(
        4,
        "reader",
        &[PermissionAction::FoldersRead, PermissionAction::FoldersCreate],
        &["team"],
    );
    assert_kind(
        app.service
            .create(&create_cmd("sub", "Sub", "team", &reader))
            .await,
        ErrorKind::AccessDenied,
    );
    assert_eq!(app.db.row_counts().await, (1, 1));

    let editor = reader.grant(PermissionAction::FoldersWrite, "folders:uid:team");
    let created = app
        .service
        .create(&create_cmd("sub", "Sub", "team", &editor))
        .await
        .unwrap();
    assert_eq!(created.parent_uid, "team");
    assert_eq!(app.parents("sub").await, vec!["team"]);
}

#[tokio::test]
async fn test_update_requires_write() {
    let app = TestApp::new();
    let created = app.create("team", "Team", "").await;

    let reader = granted(4, "reader", &[PermissionAction::FoldersRead], &["team"]);
    let cmd = UpdateFolderCommand {
        org_id: ORG,
        uid: "team".to_string(),
        new_title: Some("Renamed".to_string()),
        version: created.version,
        principal: Some(reader),
        ..Default::default()
    };
    assert_kind(app.service.update(&cmd).await, ErrorKind::AccessDenied);
    assert_eq!(app.get("team").await.unwrap().title, "Team");
}

#[tokio::test]
async fn test_anonymous_updates_record_sentinel_user() {
    let app = TestApp::new();
    let created = app.create("team", "Team", "").await;

    let anonymous =
        Principal::anonymous(ORG).grant(PermissionAction::FoldersWrite, "folders:uid:team");
    let updated = app
        .service
        .update(&UpdateFolderCommand {
            org_id: ORG,
            uid: "team".to_string(),
            new_title: Some("Renamed".to_string()),
            version: created.version,
            principal: Some(anonymous),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(updated.updated_by, -1);
    assert_eq!(updated.created_by, 1);
}
