//! In-memory stand-in for the GitHub API used by unit tests.

use std::{
    cell::{Cell, RefCell},
    collections::{BTreeMap, HashMap, VecDeque},
};

use super::{ForkPage, RemoteApi, RemoteError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ForkPage(Option<String>),
    Rename { id: String, name: String },
    Archive(String),
    Unarchive(String),
}

/// Scripted response for the next call of one kind on one repository.
#[derive(Debug, Clone)]
pub enum Script {
    Fail(RemoteError),
    /// Answer with this name instead of the requested one.
    EchoName(String),
    /// Answer with this archived state instead of the requested one.
    EchoArchived(bool),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteRepo {
    pub name: String,
    pub archived: bool,
}

#[derive(Default)]
pub struct FakeRemote {
    pub repos: RefCell<BTreeMap<String, RemoteRepo>>,
    pub calls: RefCell<Vec<Call>>,
    pages: RefCell<VecDeque<Result<ForkPage, RemoteError>>>,
    scripts: RefCell<HashMap<(String, &'static str), VecDeque<Script>>>,
    /// When set, renames of archived repositories are refused.
    pub archived_read_only: Cell<bool>,
}

impl FakeRemote {
    pub fn with_repos(repos: &[(&str, &str)]) -> Self {
        let fake = Self::default();
        for (id, name) in repos {
            fake.repos.borrow_mut().insert(
                id.to_string(),
                RemoteRepo {
                    name: name.to_string(),
                    archived: false,
                },
            );
        }
        fake
    }

    pub fn with_pages(pages: Vec<ForkPage>) -> Self {
        let fake = Self::default();
        fake.pages.borrow_mut().extend(pages.into_iter().map(Ok));
        fake
    }

    pub fn push_page_result(&self, page: Result<ForkPage, RemoteError>) {
        self.pages.borrow_mut().push_back(page);
    }

    pub fn script(&self, id: &str, op: &'static str, script: Script) {
        self.scripts
            .borrow_mut()
            .entry((id.to_string(), op))
            .or_default()
            .push_back(script);
    }

    pub fn repo(&self, id: &str) -> RemoteRepo {
        self.repos.borrow()[id].clone()
    }

    pub fn set_archived(&self, id: &str, archived: bool) {
        if let Some(repo) = self.repos.borrow_mut().get_mut(id) {
            repo.archived = archived;
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn mutation_count(&self) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|c| !matches!(c, Call::ForkPage(_)))
            .count()
    }

    pub fn clear_calls(&self) {
        self.calls.borrow_mut().clear();
    }

    fn next_script(&self, id: &str, op: &'static str) -> Option<Script> {
        self.scripts
            .borrow_mut()
            .get_mut(&(id.to_string(), op))
            .and_then(VecDeque::pop_front)
    }

    fn set_archive_state(
        &self,
        id: &str,
        op: &'static str,
        target: bool,
    ) -> Result<bool, RemoteError> {
        match self.next_script(id, op) {
            Some(Script::Fail(err)) => return Err(err),
            Some(Script::EchoArchived(state)) => return Ok(state),
            _ => {}
        }
        let mut repos = self.repos.borrow_mut();
        let repo = repos
            .get_mut(id)
            .ok_or_else(|| RemoteError::Rejected(format!("no repository with id {id}")))?;
        repo.archived = target;
        Ok(repo.archived)
    }
}

impl RemoteApi for FakeRemote {
    async fn fork_page(&self, cursor: Option<&str>) -> Result<ForkPage, RemoteError> {
        self.calls
            .borrow_mut()
            .push(Call::ForkPage(cursor.map(str::to_string)));
        self.pages
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Ok(ForkPage::default()))
    }

    async fn rename(&self, repo_id: &str, name: &str) -> Result<String, RemoteError> {
        self.calls.borrow_mut().push(Call::Rename {
            id: repo_id.to_string(),
            name: name.to_string(),
        });
        match self.next_script(repo_id, "rename") {
            Some(Script::Fail(err)) => return Err(err),
            Some(Script::EchoName(echo)) => return Ok(echo),
            _ => {}
        }
        let mut repos = self.repos.borrow_mut();
        let repo = repos
            .get_mut(repo_id)
            .ok_or_else(|| RemoteError::Rejected(format!("no repository with id {repo_id}")))?;
        if repo.archived && self.archived_read_only.get() {
            return Err(RemoteError::Rejected(
                "Repository was archived so is read-only.".into(),
            ));
        }
        repo.name = name.to_string();
        Ok(repo.name.clone())
    }

    async fn archive(&self, repo_id: &str) -> Result<bool, RemoteError> {
        self.calls
            .borrow_mut()
            .push(Call::Archive(repo_id.to_string()));
        self.set_archive_state(repo_id, "archive", true)
    }

    async fn unarchive(&self, repo_id: &str) -> Result<bool, RemoteError> {
        self.calls
            .borrow_mut()
            .push(Call::Unarchive(repo_id.to_string()));
        self.set_archive_state(repo_id, "unarchive", false)
    }
}
