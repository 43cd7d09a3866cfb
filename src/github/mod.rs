pub mod client;
#[cfg(test)]
pub mod fake;

use thiserror::Error;

pub use client::GraphqlClient;

/// Repositories requested per discovery page.
pub const PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    /// The API answered but refused or did not confirm the request.
    #[error("rejected by remote: {0}")]
    Rejected(String),
    /// The request did not complete.
    #[error("transport failure: {0}")]
    Transport(String),
}

/// One repository as listed by the fork query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoNode {
    pub id: String,
    pub name: String,
    pub url: String,
    pub owner_login: String,
    /// `None` when the upstream repository no longer exists.
    pub parent_owner: Option<ParentOwner>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentOwner {
    pub id: String,
    pub login: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ForkPage {
    pub nodes: Vec<RepoNode>,
    pub end_cursor: Option<String>,
    pub has_next_page: bool,
}

/// The remote operations the tool depends on. Each mutation returns the
/// field the caller reads back to decide success.
#[allow(async_fn_in_trait)]
pub trait RemoteApi {
    async fn fork_page(&self, cursor: Option<&str>) -> Result<ForkPage, RemoteError>;

    /// Returns the repository name after the update.
    async fn rename(&self, repo_id: &str, name: &str) -> Result<String, RemoteError>;

    /// Returns `isArchived` after the mutation.
    async fn archive(&self, repo_id: &str) -> Result<bool, RemoteError>;

    /// Returns `isArchived` after the mutation.
    async fn unarchive(&self, repo_id: &str) -> Result<bool, RemoteError>;
}
