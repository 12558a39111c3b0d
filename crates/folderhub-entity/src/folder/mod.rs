//! Folder domain entities.

pub mod command;
pub mod legacy;
pub mod model;
pub mod uid;

pub use command::{
    CreateFolderCommand, DeleteFolderCommand, DescendantCounts, GetChildrenQuery,
    GetDescendantCountsQuery, GetFolderQuery, GetParentsQuery, MoveFolderCommand,
    UpdateFolderCommand,
};
pub use legacy::{LegacyFolder, SaveLegacyFolder};
pub use model::{
    ANONYMOUS_PRINCIPAL_ID, CreateNestedFolder, FOLDER_KIND, Folder, GENERAL_FOLDER_TITLE,
    GENERAL_FOLDER_UID, MAX_NESTED_FOLDER_DEPTH, NestedFolderRow, UpdateNestedFolder,
};
