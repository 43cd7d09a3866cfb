use crate::{
    github::{RemoteApi, RemoteError, RepoNode},
    types::Candidate,
};

/// Keeps forks of `org_id` repositories that `username` still owns.
#[derive(Debug, Clone)]
pub struct ForkFilter {
    pub org_id: String,
    pub username: String,
}

impl ForkFilter {
    pub fn matches(&self, node: &RepoNode) -> bool {
        node.owner_login == self.username
            && node
                .parent_owner
                .as_ref()
                .is_some_and(|parent| parent.id == self.org_id)
    }
}

/// Lazily walks the fork listing one page per call. Each instance makes a
/// single pass; a new run starts a new pager.
pub struct ForkPager<'a, R> {
    api: &'a R,
    filter: &'a ForkFilter,
    cursor: Option<String>,
    done: bool,
}

impl<'a, R: RemoteApi> ForkPager<'a, R> {
    pub fn new(api: &'a R, filter: &'a ForkFilter) -> Self {
        Self {
            api,
            filter,
            cursor: None,
            done: false,
        }
    }

    /// Fetches the next page and returns its matching candidates, or `None`
    /// once the listing is exhausted.
    pub async fn next_page(&mut self) -> Result<Option<Vec<Candidate>>, RemoteError> {
        if self.done {
            return Ok(None);
        }
        let page = self.api.fork_page(self.cursor.as_deref()).await?;
        if page.nodes.is_empty() {
            self.done = true;
            return Ok(None);
        }

        // The page that carries the end-of-listing cursor still has nodes.
        match page.end_cursor {
            Some(cursor) if page.has_next_page => self.cursor = Some(cursor),
            _ => self.done = true,
        }

        let matched = page
            .nodes
            .into_iter()
            .filter(|node| self.filter.matches(node))
            .map(into_candidate)
            .collect();
        Ok(Some(matched))
    }
}

/// Drains a fresh pager, calling `on_found` for every match as it arrives.
pub async fn discover<R, F>(
    api: &R,
    filter: &ForkFilter,
    mut on_found: F,
) -> Result<Vec<Candidate>, RemoteError>
where
    R: RemoteApi,
    F: FnMut(&Candidate),
{
    let mut pager = ForkPager::new(api, filter);
    let mut found = Vec::new();
    while let Some(batch) = pager.next_page().await? {
        for candidate in batch {
            on_found(&candidate);
            found.push(candidate);
        }
    }
    Ok(found)
}

fn into_candidate(node: RepoNode) -> Candidate {
    let (parent_owner_id, parent_owner_login) = node
        .parent_owner
        .map(|p| (p.id, p.login))
        .unwrap_or_default();
    Candidate {
        id: node.id,
        name: node.name,
        url: node.url,
        owner_login: node.owner_login,
        parent_owner_id,
        parent_owner_login,
    }
}
