use anyhow::Result;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Value, json};

use super::{ForkPage, PAGE_SIZE, ParentOwner, RemoteApi, RemoteError, RepoNode};
use crate::config::Config;

const FORKS_QUERY: &str = r#"
query($cursor: String, $pageSize: Int!) {
    viewer {
        repositories(isFork: true, first: $pageSize, after: $cursor, privacy: PUBLIC) {
            pageInfo {
                endCursor
                hasNextPage
            }
            nodes {
                id
                name
                url
                owner {
                    login
                }
                parent {
                    owner {
                        id
                        login
                    }
                }
            }
        }
    }
}
"#;

const RENAME_MUTATION: &str = r#"
mutation($id: ID!, $name: String!) {
    updateRepository(input: { repositoryId: $id, name: $name }) {
        repository {
            name
        }
    }
}
"#;

const ARCHIVE_MUTATION: &str = r#"
mutation($id: ID!) {
    archiveRepository(input: { repositoryId: $id }) {
        repository {
            isArchived
        }
    }
}
"#;

const UNARCHIVE_MUTATION: &str = r#"
mutation($id: ID!) {
    unarchiveRepository(input: { repositoryId: $id }) {
        repository {
            isArchived
        }
    }
}
"#;

const ERROR_BODY_LIMIT_CHARS: usize = 300;

// ── Wire types ────────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct GraphqlRequest<'a> {
    query: &'a str,
    variables: Value,
}

#[derive(Deserialize)]
struct GraphqlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphqlError>,
}

#[derive(Deserialize)]
struct GraphqlError {
    message: String,
}

#[derive(Deserialize)]
struct ForksData {
    viewer: Viewer,
}

#[derive(Deserialize)]
struct Viewer {
    repositories: RepositoryConnection,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RepositoryConnection {
    page_info: PageInfo,
    #[serde(default)]
    nodes: Vec<Option<WireRepo>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageInfo {
    end_cursor: Option<String>,
    #[serde(default)]
    has_next_page: bool,
}

#[derive(Deserialize)]
struct WireRepo {
    id: String,
    name: String,
    #[serde(default)]
    url: String,
    owner: WireOwner,
    parent: Option<WireParent>,
}

#[derive(Deserialize)]
struct WireOwner {
    #[serde(default)]
    id: String,
    login: String,
}

#[derive(Deserialize)]
struct WireParent {
    owner: WireOwner,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateRepositoryData {
    update_repository: Option<MutationPayload<NamedRepo>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ArchiveRepositoryData {
    archive_repository: Option<MutationPayload<ArchiveState>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UnarchiveRepositoryData {
    unarchive_repository: Option<MutationPayload<ArchiveState>>,
}

#[derive(Deserialize)]
struct MutationPayload<T> {
    repository: Option<T>,
}

#[derive(Deserialize)]
struct NamedRepo {
    name: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ArchiveState {
    is_archived: bool,
}

// ── HTTP client builder ───────────────────────────────────────────────────────

pub fn build_http_client() -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder()
        .user_agent(concat!("fork-archiver/", env!("CARGO_PKG_VERSION")));

    if let Ok(proxy_url) = std::env::var("HTTP_PROXY") {
        builder = builder.proxy(reqwest::Proxy::all(&proxy_url)?);
    }

    if let Ok(ms) = std::env::var("API_TIMEOUT_MS") {
        if let Ok(ms) = ms.parse::<u64>() {
            builder = builder
                .timeout(std::time::Duration::from_millis(ms))
                .connect_timeout(std::time::Duration::from_secs(10));
        }
    }

    builder.build().map_err(Into::into)
}

// ── GraphQL client ────────────────────────────────────────────────────────────

pub struct GraphqlClient {
    http: reqwest::Client,
    url: String,
    token: String,
}

impl GraphqlClient {
    pub fn new(http: reqwest::Client, config: &Config) -> Self {
        Self {
            http,
            url: config.api_url.clone(),
            token: config.token.clone(),
        }
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: Value,
    ) -> Result<T, RemoteError> {
        let resp = self
            .http
            .post(&self.url)
            .bearer_auth(&self.token)
            .json(&GraphqlRequest { query, variables })
            .send()
            .await
            .map_err(|e| RemoteError::Transport(format!("HTTP request failed: {e}")))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| RemoteError::Transport(format!("failed reading response: {e}")))?;
        decode_response(status, &body)
    }
}

impl RemoteApi for GraphqlClient {
    async fn fork_page(&self, cursor: Option<&str>) -> Result<ForkPage, RemoteError> {
        let data: ForksData = self
            .execute(
                FORKS_QUERY,
                json!({ "cursor": cursor, "pageSize": PAGE_SIZE }),
            )
            .await?;
        Ok(into_fork_page(data.viewer.repositories))
    }

    async fn rename(&self, repo_id: &str, name: &str) -> Result<String, RemoteError> {
        let data: UpdateRepositoryData = self
            .execute(RENAME_MUTATION, json!({ "id": repo_id, "name": name }))
            .await?;
        data.update_repository
            .and_then(|p| p.repository)
            .map(|r| r.name)
            .ok_or_else(|| RemoteError::Rejected("updateRepository returned no repository".into()))
    }

    async fn archive(&self, repo_id: &str) -> Result<bool, RemoteError> {
        let data: ArchiveRepositoryData = self
            .execute(ARCHIVE_MUTATION, json!({ "id": repo_id }))
            .await?;
        data.archive_repository
            .and_then(|p| p.repository)
            .map(|r| r.is_archived)
            .ok_or_else(|| RemoteError::Rejected("archiveRepository returned no repository".into()))
    }

    async fn unarchive(&self, repo_id: &str) -> Result<bool, RemoteError> {
        let data: UnarchiveRepositoryData = self
            .execute(UNARCHIVE_MUTATION, json!({ "id": repo_id }))
            .await?;
        data.unarchive_repository
            .and_then(|p| p.repository)
            .map(|r| r.is_archived)
            .ok_or_else(|| {
                RemoteError::Rejected("unarchiveRepository returned no repository".into())
            })
    }
}

/// 4xx other than 429 means the API saw the request and refused it; every
/// other failure means the request did not go through.
fn decode_response<T: DeserializeOwned>(status: StatusCode, body: &str) -> Result<T, RemoteError> {
    if !status.is_success() {
        let msg = format!("API error {status}: {}", truncate_chars(body, ERROR_BODY_LIMIT_CHARS));
        if status.is_client_error() && status != StatusCode::TOO_MANY_REQUESTS {
            return Err(RemoteError::Rejected(msg));
        }
        return Err(RemoteError::Transport(msg));
    }

    let parsed: GraphqlResponse<T> = serde_json::from_str(body)
        .map_err(|e| RemoteError::Transport(format!("failed to parse API response: {e}")))?;

    if !parsed.errors.is_empty() {
        let messages: Vec<String> = parsed.errors.into_iter().map(|e| e.message).collect();
        return Err(RemoteError::Rejected(messages.join("; ")));
    }
    parsed
        .data
        .ok_or_else(|| RemoteError::Rejected("response carried no data".into()))
}

fn into_fork_page(conn: RepositoryConnection) -> ForkPage {
    let nodes = conn
        .nodes
        .into_iter()
        .flatten()
        .map(|repo| RepoNode {
            id: repo.id,
            name: repo.name,
            url: repo.url,
            owner_login: repo.owner.login,
            parent_owner: repo.parent.map(|p| ParentOwner {
                id: p.owner.id,
                login: p.owner.login,
            }),
        })
        .collect();
    ForkPage {
        nodes,
        end_cursor: conn.page_info.end_cursor,
        has_next_page: conn.page_info.has_next_page,
    }
}

fn truncate_chars(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max).collect();
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use reqwest::StatusCode;

    use super::{
        ArchiveRepositoryData, ForksData, UpdateRepositoryData, decode_response, into_fork_page,
    };
    use crate::github::RemoteError;

    #[test]
    fn fork_page_maps_nodes_and_missing_parent() {
        let body = r#"{
            "data": { "viewer": { "repositories": {
                "pageInfo": { "endCursor": "Y3Vyc29yOjI=", "hasNextPage": true },
                "nodes": [
                    { "id": "A", "name": "Hooks-III", "url": "https://github.com/alice/Hooks-III",
                      "owner": { "login": "alice" },
                      "parent": { "owner": { "id": "ORG1", "login": "LambdaSchool" } } },
                    { "id": "B", "name": "orphan", "url": "",
                      "owner": { "login": "alice" }, "parent": null },
                    null
                ]
            } } }
        }"#;
        let data: ForksData = decode_response(StatusCode::OK, body).expect("decode");
        let page = into_fork_page(data.viewer.repositories);
        assert_eq!(page.nodes.len(), 2);
        assert_eq!(page.end_cursor.as_deref(), Some("Y3Vyc29yOjI="));
        assert!(page.has_next_page);
        let parent = page.nodes[0].parent_owner.as_ref().expect("parent");
        assert_eq!(parent.id, "ORG1");
        assert_eq!(parent.login, "LambdaSchool");
        assert!(page.nodes[1].parent_owner.is_none());
    }

    #[test]
    fn empty_last_page_has_null_cursor() {
        let body = r#"{ "data": { "viewer": { "repositories": {
            "pageInfo": { "endCursor": null, "hasNextPage": false }, "nodes": [] } } } }"#;
        let data: ForksData = decode_response(StatusCode::OK, body).expect("decode");
        let page = into_fork_page(data.viewer.repositories);
        assert!(page.nodes.is_empty());
        assert!(page.end_cursor.is_none());
    }

    #[test]
    fn graphql_errors_are_rejections() {
        let body = r#"{ "data": { "updateRepository": null },
            "errors": [ { "message": "Name already exists on this account" } ] }"#;
        let err = decode_response::<UpdateRepositoryData>(StatusCode::OK, body)
            .err()
            .expect("should fail");
        assert_eq!(
            err,
            RemoteError::Rejected("Name already exists on this account".into())
        );
    }

    #[test]
    fn server_errors_and_rate_limits_are_transport_failures() {
        for status in [StatusCode::BAD_GATEWAY, StatusCode::TOO_MANY_REQUESTS] {
            let err = decode_response::<ArchiveRepositoryData>(status, "oops")
                .err()
                .expect("should fail");
            assert!(matches!(err, RemoteError::Transport(_)), "{status}");
        }
    }

    #[test]
    fn unauthorized_is_a_rejection() {
        let err =
            decode_response::<ArchiveRepositoryData>(StatusCode::UNAUTHORIZED, "Bad credentials")
                .err()
                .expect("should fail");
        assert!(matches!(err, RemoteError::Rejected(m) if m.contains("Bad credentials")));
    }

    #[test]
    fn garbage_body_is_transport_failure() {
        let err = decode_response::<ArchiveRepositoryData>(StatusCode::OK, "<html>")
            .err()
            .expect("should fail");
        assert!(matches!(err, RemoteError::Transport(_)));
    }

    #[test]
    fn archive_payload_reads_is_archived() {
        let body = r#"{ "data": { "archiveRepository": { "repository": { "isArchived": true } } } }"#;
        let data: ArchiveRepositoryData = decode_response(StatusCode::OK, body).expect("decode");
        let archived = data
            .archive_repository
            .and_then(|p| p.repository)
            .map(|r| r.is_archived);
        assert_eq!(archived, Some(true));
    }
}
