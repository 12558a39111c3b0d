//! Resource scopes of the form `folders:uid:<uid>`.

/// Prefix of folder UID scopes.
pub const FOLDER_UID_SCOPE_PREFIX: &str = "folders:uid:";

/// Scope for a single folder.
pub fn folder_uid_scope(uid: &str) -> String {
    format!("{FOLDER_UID_SCOPE_PREFIX}{uid}")
}

/// Folder UID named by a scope, if it is a concrete folder scope.
pub fn folder_uid_from_scope(scope: &str) -> Option<&str> {
    scope
        .strip_prefix(FOLDER_UID_SCOPE_PREFIX)
        .filter(|uid| !uid.is_empty() && *uid != "*")
}

/// Check whether a granted scope covers a required scope.
///
/// A granted scope ending in `*` covers every scope sharing its prefix,
/// so `*`, `folders:*` and `folders:uid:*` all cover `folders:uid:abc`.
pub fn scope_covers(granted: &str, required: &str) -> bool {
    match granted.strip_suffix('*') {
        Some(prefix) => required.starts_with(prefix),
        None => granted == required,
    }
}
