//! Integration tests for folder lookup, creation and update.

mod helpers;

use folderhub_core::error::ErrorKind;
use folderhub_core::events::{EventPayload, FolderEvent};
use folderhub_core::types::PageRequest;
use folderhub_database::{FolderDatabase, LegacyStoreError};
use folderhub_entity::folder::{
    GetChildrenQuery, GetFolderQuery, SaveLegacyFolder, UpdateFolderCommand,
};

use helpers::{ORG, TestApp, assert_kind, create_cmd, nobody};

fn legacy_row(uid: &str, title: &str) -> SaveLegacyFolder {
    SaveLegacyFolder {
        id: 0,
        org_id: ORG,
        uid: uid.to_string(),
        title: title.to_string(),
        folder_uid: String::new(),
        version: 0,
        overwrite: false,
        user_id: 1,
    }
}

fn rename(app: &TestApp, uid: &str, title: &str, version: i64) -> UpdateFolderCommand {
    UpdateFolderCommand {
        org_id: ORG,
        uid: uid.to_string(),
        new_title: Some(title.to_string()),
        version,
        principal: Some(app.admin.clone()),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_get_by_uid_id_and_title_agree() {
    let app = TestApp::new();
    let created = app.create("reports", "Reports", "").await;

    let by_uid = app.get("reports").await.unwrap();
    let by_id = app
        .service
        .get(&GetFolderQuery::by_id(ORG, created.id, &app.admin))
        .await
        .unwrap();
    let by_title = app
        .service
        .get(&GetFolderQuery::by_title(ORG, "Reports", &app.admin))
        .await
        .unwrap();

    assert_eq!(by_uid.uid, "reports");
    assert_eq!(by_uid.id, created.id);
    assert_eq!(by_uid, by_id);
    assert_eq!(by_uid, by_title);
}

#[tokio::test]
async fn test_id_zero_is_general_folder_without_permission_check() {
    let app = TestApp::new();
    let folder = app
        .service
        .get(&GetFolderQuery::by_id(ORG, 0, &nobody()))
        .await
        .unwrap();
    assert!(folder.is_general());
}

#[tokio::test]
async fn test_get_requires_selector_and_principal() {
    let app = TestApp::new();

    let no_selector = GetFolderQuery {
        org_id: ORG,
        principal: Some(app.admin.clone()),
        ..Default::default()
    };
    assert_kind(app.service.get(&no_selector).await, ErrorKind::BadRequest);

    let mut no_principal = GetFolderQuery::by_uid(ORG, "x", &app.admin);
    no_principal.principal = None;
    assert_kind(app.service.get(&no_principal).await, ErrorKind::BadRequest);
}

#[tokio::test]
async fn test_get_denied_without_view_permission() {
    let app = TestApp::new();
    app.create("private", "Private", "").await;

    let result = app
        .service
        .get(&GetFolderQuery::by_uid(ORG, "private", &nobody()))
        .await;
    assert_kind(result, ErrorKind::AccessDenied);
}

#[tokio::test]
async fn test_create_then_get_round_trip() {
    let app = TestApp::new();
    app.create("parent", "Parent", "").await;

    let mut cmd = create_cmd("child", "  Child  ", "parent", &app.admin);
    cmd.description = "quarterly numbers".to_string();
    let created = app.service.create(&cmd).await.unwrap();
    assert_eq!(created.title, "Child");
    assert_eq!(created.version, 1);
    assert_eq!(created.created_by, 1);

    let fetched = app.get("child").await.unwrap();
    assert_eq!(fetched.title, "Child");
    assert_eq!(fetched.parent_uid, "parent");
    assert_eq!(fetched.org_id, ORG);
    assert_eq!(fetched.description, "quarterly numbers");
    assert_eq!(fetched.id, created.id);
    assert_eq!(app.db.row_counts().await, (2, 2));
}

#[tokio::test]
async fn test_create_generates_uid_when_empty() {
    let app = TestApp::new();
    let created = app.create("", "Generated", "").await;
    assert!(!created.uid.is_empty());
    assert_eq!(app.get(&created.uid).await.unwrap().title, "Generated");
}

#[tokio::test]
async fn test_update_increments_version() {
    let app = TestApp::new();
    let created = app.create("ops", "Ops", "").await;

    let updated = app
        .service
        .update(&rename(&app, "ops", "Operations", created.version))
        .await
        .unwrap();
    assert_eq!(updated.title, "Operations");
    assert!(updated.version > created.version);

    let fetched = app.get("ops").await.unwrap();
    assert_eq!(fetched.title, "Operations");
    assert_eq!(fetched.version, updated.version);
}

#[tokio::test]
async fn test_stale_version_conflicts() {
    let app = TestApp::new();
    let created = app.create("ops", "Ops", "").await;
    app.service
        .update(&rename(&app, "ops", "Operations", created.version))
        .await
        .unwrap();

    let stale = app
        .service
        .update(&rename(&app, "ops", "Ops Again", created.version))
        .await;
    assert_kind(stale, ErrorKind::Conflict);
    assert_eq!(app.get("ops").await.unwrap().title, "Operations");

    let mut forced = rename(&app, "ops", "Ops Again", created.version);
    forced.overwrite = true;
    assert_eq!(
        app.service.update(&forced).await.unwrap().title,
        "Ops Again"
    );
}

#[tokio::test]
async fn test_update_cannot_change_parent() {
    let app = TestApp::new();
    let a = app.create("a", "A", "").await;
    app.create("b", "B", "a").await;

    for parent in ["ghost", "b"] {
        let mut cmd = rename(&app, "a", "Renamed", a.version);
        cmd.new_parent_uid = Some(parent.to_string());
        assert_kind(app.service.update(&cmd).await, ErrorKind::BadRequest);
    }

    let legacy = app.db.legacy().get_by_uid(ORG, "a").await.unwrap();
    assert_eq!(legacy.parent_uid(), "");
    assert_eq!(legacy.title, "A");
    assert_eq!(legacy.version, a.version);
    assert!(app.parents("a").await.is_empty());
    assert_eq!(app.parents("b").await, vec!["a"]);

    // Restating the current parent is harmless.
    let mut same = rename(&app, "b", "B2", app.get("b").await.unwrap().version);
    same.new_parent_uid = Some(" a ".to_string());
    let updated = app.service.update(&same).await.unwrap();
    assert_eq!(updated.title, "B2");
    assert_eq!(updated.parent_uid, "a");
    let legacy = app.db.legacy().get_by_uid(ORG, "b").await.unwrap();
    assert_eq!(legacy.parent_uid(), "a");
}

#[tokio::test]
async fn test_update_of_missing_folder_is_not_found() {
    let app = TestApp::new();
    assert_kind(
        app.service.update(&rename(&app, "ghost", "Ghost", 1)).await,
        ErrorKind::NotFound,
    );
}

#[tokio::test]
async fn test_empty_title_leaves_no_rows() {
    let app = TestApp::new();
    let result = app.service.create(&create_cmd("blank", "   ", "", &app.admin)).await;
    assert_kind(result, ErrorKind::BadRequest);
    assert_eq!(app.db.row_counts().await, (0, 0));
}

#[tokio::test]
async fn test_reserved_general_names_rejected() {
    let app = TestApp::new();

    let reserved_uid = app
        .service
        .create(&create_cmd("general", "Anything", "", &app.admin))
        .await;
    assert_kind(reserved_uid, ErrorKind::BadRequest);

    let reserved_title = app
        .service
        .create(&create_cmd("g2", "general", "", &app.admin))
        .await;
    assert_kind(reserved_title, ErrorKind::Conflict);

    assert_eq!(app.db.row_counts().await, (0, 0));
}

#[tokio::test]
async fn test_invalid_uid_rejected() {
    let app = TestApp::new();
    let result = app
        .service
        .create(&create_cmd("not a uid!", "Folder", "", &app.admin))
        .await;
    assert_kind(result, ErrorKind::BadRequest);

    let too_long = "a".repeat(41);
    let result = app
        .service
        .create(&create_cmd(&too_long, "Folder", "", &app.admin))
        .await;
    assert_kind(result, ErrorKind::BadRequest);
}

#[tokio::test]
async fn test_sibling_titles_are_unique() {
    let app = TestApp::new();
    app.create("a", "A", "").await;
    app.create("b", "B", "").await;
    app.create("a-reports", "Reports", "a").await;

    let duplicate = app
        .service
        .create(&create_cmd("a-reports-2", "REPORTS", "a", &app.admin))
        .await;
    assert_kind(duplicate, ErrorKind::Conflict);

    // Same title under another parent is fine.
    app.create("b-reports", "Reports", "b").await;
}

#[tokio::test]
async fn test_duplicate_uid_conflicts() {
    let app = TestApp::new();
    app.create("dup", "First", "").await;
    let result = app
        .service
        .create(&create_cmd("dup", "Second", "", &app.admin))
        .await;
    assert_kind(result, ErrorKind::Conflict);
    assert_eq!(app.db.row_counts().await, (1, 1));
}

#[tokio::test]
async fn test_nested_failure_removes_legacy_row() {
    let app = TestApp::new();
    app.db
        .insert_legacy_only(&legacy_row("orphan", "Orphan"))
        .await
        .unwrap();

    // The parent exists only in the legacy table, so the nested write fails.
    let result = app
        .service
        .create(&create_cmd("child", "Child", "orphan", &app.admin))
        .await;
    assert_kind(result, ErrorKind::NotFound);

    assert_eq!(app.db.row_counts().await, (1, 0));
    assert!(matches!(
        app.db.legacy().get_by_uid(ORG, "child").await,
        Err(LegacyStoreError::NotFound)
    ));
}

#[tokio::test]
async fn test_title_change_publishes_event() {
    let app = TestApp::new();
    let created = app.create("ops", "Ops", "").await;
    let mut events = app.service.events().subscribe();

    app.service
        .update(&rename(&app, "ops", "Operations", created.version))
        .await
        .unwrap();

    let event = events.try_recv().unwrap();
    assert_eq!(event.actor.as_deref(), Some("user:1"));

    let json = serde_json::to_value(&event).unwrap();
    assert_eq!(json["payload"]["domain"], "Folder");
    assert_eq!(json["payload"]["event"]["type"], "TitleUpdated");
    assert_eq!(json["payload"]["event"]["uid"], "ops");

    let EventPayload::Folder(FolderEvent::TitleUpdated { uid, title, .. }) = event.payload;
    assert_eq!(uid, "ops");
    assert_eq!(title, "Operations");
}

#[tokio::test]
async fn test_description_only_update_publishes_nothing() {
    let app = TestApp::new();
    let created = app.create("ops", "Ops", "").await;
    let mut events = app.service.events().subscribe();

    let updated = app
        .service
        .update(&UpdateFolderCommand {
            org_id: ORG,
            uid: "ops".to_string(),
            new_description: Some("on-call runbooks".to_string()),
            version: created.version,
            principal: Some(app.admin.clone()),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(updated.description, "on-call runbooks");
    assert_eq!(updated.title, "Ops");
    assert!(events.try_recv().is_err());
}

#[tokio::test]
async fn test_update_of_legacy_only_folder_succeeds() {
    let app = TestApp::new();
    let row = app
        .db
        .insert_legacy_only(&legacy_row("old", "Old"))
        .await
        .unwrap();

    let updated = app
        .service
        .update(&rename(&app, "old", "Older", row.version))
        .await
        .unwrap();
    assert_eq!(updated.title, "Older");
    assert_eq!(updated.id, row.id);
    assert_eq!(app.db.row_counts().await, (1, 0));
}

#[tokio::test]
async fn test_children_are_paged_in_title_order() {
    let app = TestApp::new();
    for title in ["Echo", "Alpha", "Delta", "Bravo", "Charlie"] {
        app.create(&title.to_lowercase(), title, "").await;
    }

    let mut query = GetChildrenQuery::new(ORG, "", &app.admin);
    query.page = PageRequest::new(2, 2);
    let page: Vec<String> = app
        .service
        .get_children(&query)
        .await
        .unwrap()
        .into_iter()
        .map(|f| f.title)
        .collect();
    assert_eq!(page, vec!["Charlie", "Delta"]);
}

#[tokio::test]
async fn test_startup_sync_backfills_nested_table() {
    let app = TestApp::new();
    let row = app
        .db
        .insert_legacy_only(&legacy_row("old", "Old"))
        .await
        .unwrap();
    assert_kind(app.get("old").await, ErrorKind::NotFound);

    let report = app.db.sync_nested_from_legacy().await.unwrap();
    assert_eq!(report.upserted, 1);
    assert_eq!(report.removed, 0);

    let folder = app.get("old").await.unwrap();
    assert_eq!(folder.id, row.id);
    assert_eq!(folder.version, row.version);
    assert_eq!(app.db.row_counts().await, (1, 1));
}

#[tokio::test]
async fn test_legacy_only_mode() {
    let app = TestApp::legacy_only();
    app.create("a", "A", "").await;

    // The parent is ignored while nested folders are off.
    let b = app.create("b", "B", "a").await;
    assert_eq!(b.parent_uid, "");

    assert!(app.parents("b").await.is_empty());
    assert_eq!(app.children("", &app.admin).await.unwrap(), vec!["a", "b"]);
    assert_kind(app.move_to("b", "a").await, ErrorKind::BadRequest);
    assert!(
        app.service
            .get_shared_with_me(ORG, &app.admin)
            .await
            .unwrap()
            .is_empty()
    );
}
