//! API request handlers

pub mod datasets;
pub mod objects;
pub mod projects;
pub mod tokens;

pub use datasets::{
    create_dataset, get_dataset, get_dataset_version, list_dataset_versions, release_dataset_version,
    CreateDatasetRequest, ReleaseVersionRequest,
};
pub use objects::{create_object_group, get_object, get_object_group, CreateObjectGroupRequest, NewObject};
pub use projects::{
    add_member, create_project, delete_project, get_project, list_project_datasets, list_projects,
    AddMemberRequest, CreateProjectRequest,
};
pub use tokens::{authorize, issue_token, list_tokens, AuthorizeQuery, AuthorizeResponse, IssueTokenRequest};
