//! Subtree traversal over the nested store.

use std::collections::HashSet;

use tracing::warn;

use folderhub_core::result::AppResult;
use folderhub_database::NestedFolderStore;
use folderhub_entity::folder::Folder;

/// Every folder below `uid`, depth-first pre-order, excluding `uid`.
///
/// Siblings are visited in title order. A folder reached twice (only
/// possible with corrupted parent pointers) is visited once.
pub async fn collect_descendants(
    nested: &dyn NestedFolderStore,
    org_id: i64,
    uid: &str,
) -> AppResult<Vec<Folder>> {
    let mut visited: HashSet<String> = HashSet::from([uid.to_string()]);
    let mut descendants = Vec::new();
    let mut stack: Vec<Folder> = nested
        .get_children(org_id, uid)
        .await?
        .into_iter()
        .rev()
        .collect();

    while let Some(folder) = stack.pop() {
        if !visited.insert(folder.uid.clone()) {
            warn!(org_id, uid = %folder.uid, "Folder reached twice during traversal");
            continue;
        }

        let children = nested.get_children(org_id, &folder.uid).await?;
        stack.extend(children.into_iter().rev());
        descendants.push(folder);
    }

    Ok(descendants)
}
