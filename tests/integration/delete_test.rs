//! Integration tests for cascading deletes and descendant counts.

mod helpers;

use std::sync::Arc;

use async_trait::async_trait;

use folderhub_core::error::ErrorKind;
use folderhub_core::result::AppResult;
use folderhub_database::{FolderDatabase, MemoryFolderDatabase};
use folderhub_entity::folder::{
    CreateNestedFolder, DeleteFolderCommand, GetDescendantCountsQuery, SaveLegacyFolder,
    UpdateNestedFolder,
};
use folderhub_entity::identity::Principal;
use folderhub_entity::permission::PermissionAction;
use folderhub_service::FolderContentHandler;

use helpers::{CountingHandler, ORG, TestApp, assert_kind, granted, nobody};

async fn tree(app: &TestApp) {
    app.create("a", "A", "").await;
    app.create("b", "B", "a").await;
    app.create("c", "C", "b").await;
    app.create("d", "D", "a").await;
    app.create("other", "Other", "").await;
}

/// Writes a nested row outside the delete's transaction while it runs.
struct ConcurrentWriter {
    db: Arc<MemoryFolderDatabase>,
    org_id: i64,
    uid: &'static str,
}

#[async_trait]
impl FolderContentHandler for ConcurrentWriter {
    fn kind(&self) -> &str {
        "alertrule"
    }

    async fn count_in_folder(&self, _: i64, _: &str, _: &Principal) -> AppResult<i64> {
        Ok(0)
    }

    async fn delete_in_folder(&self, _: i64, _: &str, _: &Principal) -> AppResult<()> {
        let nested = self.db.nested();
        if nested.get(self.org_id, self.uid).await.is_ok() {
            nested
                .update(&UpdateNestedFolder {
                    org_id: self.org_id,
                    uid: self.uid.to_string(),
                    new_description: Some("touched".to_string()),
                    ..Default::default()
                })
                .await?;
        } else {
            nested
                .create(&CreateNestedFolder {
                    org_id: self.org_id,
                    uid: self.uid.to_string(),
                    title: self.uid.to_string(),
                    description: String::new(),
                    parent_uid: String::new(),
                })
                .await?;
        }
        Ok(())
    }
}

fn counts_query(app: &TestApp, uid: &str) -> GetDescendantCountsQuery {
    GetDescendantCountsQuery {
        org_id: ORG,
        uid: uid.to_string(),
        principal: Some(app.admin.clone()),
    }
}

#[tokio::test]
async fn test_delete_removes_whole_subtree() {
    let app = TestApp::new();
    tree(&app).await;

    app.delete_as("a", false, &app.admin).await.unwrap();

    for uid in ["a", "b", "c", "d"] {
        assert_kind(app.get(uid).await, ErrorKind::NotFound);
    }
    assert_eq!(app.db.row_counts().await, (1, 1));
    assert_eq!(app.children("", &app.admin).await.unwrap(), vec!["other"]);
}

#[tokio::test]
async fn test_second_delete_is_not_found() {
    let app = TestApp::new();
    app.create("gone", "Gone", "").await;

    app.delete_as("gone", false, &app.admin).await.unwrap();
    assert_kind(
        app.delete_as("gone", false, &app.admin).await,
        ErrorKind::NotFound,
    );
}

#[tokio::test]
async fn test_force_delete_rules_runs_handlers() {
    let app = TestApp::new();
    tree(&app).await;
    let rules = Arc::new(CountingHandler::new("alertrule"));
    app.service.registry().register(rules.clone()).await;

    app.delete_as("a", true, &app.admin).await.unwrap();

    assert_eq!(rules.deleted().await, vec!["a", "b", "c", "d"]);
}

#[tokio::test]
async fn test_handlers_untouched_without_force() {
    let app = TestApp::new();
    tree(&app).await;
    let rules = Arc::new(CountingHandler::new("alertrule"));
    app.service.registry().register(rules.clone()).await;

    app.delete_as("b", false, &app.admin).await.unwrap();

    assert!(rules.deleted().await.is_empty());
    assert_eq!(app.db.row_counts().await, (3, 3));
}

#[tokio::test]
async fn test_delete_ignores_writes_to_other_rows() {
    let app = TestApp::new();
    tree(&app).await;
    app.service
        .registry()
        .register(Arc::new(ConcurrentWriter {
            db: app.db.clone(),
            org_id: 99,
            uid: "elsewhere",
        }))
        .await;

    app.delete_as("a", true, &app.admin).await.unwrap();

    assert_eq!(app.db.row_counts().await, (1, 2));
    assert!(app.db.nested().get(99, "elsewhere").await.is_ok());
    assert_kind(app.get("a").await, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_delete_conflicts_with_write_to_deleted_row() {
    let app = TestApp::new();
    tree(&app).await;
    app.service
        .registry()
        .register(Arc::new(ConcurrentWriter {
            db: app.db.clone(),
            org_id: ORG,
            uid: "c",
        }))
        .await;

    assert_kind(app.delete_as("a", true, &app.admin).await, ErrorKind::Conflict);

    assert_eq!(app.db.row_counts().await, (5, 5));
    assert_eq!(app.get("c").await.unwrap().description, "touched");
}

#[tokio::test]
async fn test_hidden_descendant_aborts_delete() {
    let app = TestApp::new();
    app.create("team", "Team", "").await;
    app.create("open", "Open", "team").await;
    app.create("secret", "Secret", "team").await;

    let deleter = granted(7, "deleter", &[PermissionAction::FoldersDelete], &["team"])
        .grant(PermissionAction::FoldersRead, "folders:uid:open");

    assert_kind(
        app.delete_as("team", false, &deleter).await,
        ErrorKind::AccessDenied,
    );
    assert_eq!(app.db.row_counts().await, (3, 3));
    assert_eq!(
        app.children("team", &app.admin).await.unwrap(),
        vec!["open", "secret"]
    );
}

#[tokio::test]
async fn test_delete_requires_permission_and_valid_input() {
    let app = TestApp::new();
    app.create("keep", "Keep", "").await;

    assert_kind(
        app.delete_as("keep", false, &nobody()).await,
        ErrorKind::AccessDenied,
    );
    assert_kind(app.delete_as("", false, &app.admin).await, ErrorKind::BadRequest);

    let bad_org = DeleteFolderCommand {
        org_id: 0,
        uid: "keep".to_string(),
        force_delete_rules: false,
        principal: Some(app.admin.clone()),
    };
    assert_kind(app.service.delete(&bad_org).await, ErrorKind::BadRequest);

    let anonymous = DeleteFolderCommand {
        org_id: ORG,
        principal: None,
        ..bad_org
    };
    assert_kind(app.service.delete(&anonymous).await, ErrorKind::BadRequest);

    assert_eq!(app.db.row_counts().await, (1, 1));
}

#[tokio::test]
async fn test_delete_legacy_only_folder() {
    let app = TestApp::new();
    app.db
        .insert_legacy_only(&SaveLegacyFolder {
            id: 0,
            org_id: ORG,
            uid: "old".to_string(),
            title: "Old".to_string(),
            folder_uid: String::new(),
            version: 0,
            overwrite: false,
            user_id: 1,
        })
        .await
        .unwrap();

    app.delete_as("old", false, &app.admin).await.unwrap();
    assert_eq!(app.db.row_counts().await, (0, 0));
}

#[tokio::test]
async fn test_descendant_counts() {
    let app = TestApp::new();
    tree(&app).await;
    let dashboards = Arc::new(CountingHandler::new("dashboard"));
    dashboards.put("a", 2).await;
    dashboards.put("b", 3).await;
    dashboards.put("c", 1).await;
    dashboards.put("other", 10).await;
    app.service.registry().register(dashboards).await;
    app.service
        .registry()
        .register(Arc::new(CountingHandler::new("librarypanel")))
        .await;

    let counts = app
        .service
        .get_descendant_counts(&counts_query(&app, "a"))
        .await
        .unwrap();

    assert_eq!(counts.get("folder"), Some(&3));
    assert_eq!(counts.get("dashboard"), Some(&6));
    assert_eq!(counts.get("librarypanel"), Some(&0));
    assert_eq!(counts.len(), 3);

    let leaf = app
        .service
        .get_descendant_counts(&counts_query(&app, "c"))
        .await
        .unwrap();
    assert_eq!(leaf.get("folder"), Some(&0));
    assert_eq!(leaf.get("dashboard"), Some(&1));
}

#[tokio::test]
async fn test_descendant_count_failures_propagate() {
    let app = TestApp::new();
    tree(&app).await;
    app.service
        .registry()
        .register(Arc::new(CountingHandler::failing("alertrule")))
        .await;

    assert_kind(
        app.service
            .get_descendant_counts(&counts_query(&app, "a"))
            .await,
        ErrorKind::Internal,
    );
    assert_kind(
        app.service
            .get_descendant_counts(&counts_query(&app, "missing"))
            .await,
        ErrorKind::NotFound,
    );
}
