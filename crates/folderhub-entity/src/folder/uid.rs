//! Short UID validation and generation.

use uuid::Uuid;

/// Maximum length of a folder UID.
pub const MAX_UID_LENGTH: usize = 40;

/// Length of generated UIDs.
const GENERATED_UID_LENGTH: usize = 14;

/// Check that a UID only uses `[a-zA-Z0-9_-]`. The empty string is valid
/// (a UID is generated for it).
pub fn is_valid_short_uid(uid: &str) -> bool {
    uid.chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Check whether a UID exceeds [`MAX_UID_LENGTH`].
pub fn is_short_uid_too_long(uid: &str) -> bool {
    uid.len() > MAX_UID_LENGTH
}

/// Generate a new random short UID.
pub fn generate_short_uid() -> String {
    let mut uid = Uuid::new_v4().simple().to_string();
    uid.truncate(GENERATED_UID_LENGTH);
    uid
}
