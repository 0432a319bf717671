use std::{
    collections::{BTreeMap, HashMap},
    io::{self, Write},
    sync::{Arc, Mutex},
};

use labelsmith_core::{
    ApiError, ApiResult, Label, LabelApi, Labelable, LabelableKind, RepoRef,
};

/// Cloneable in-memory writer for inspecting [`Output`](crate::Output).
#[derive(Clone, Default)]
pub struct CaptureBuffer(Arc<Mutex<Vec<u8>>>);

impl CaptureBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }

    /// Output lines as a terminal would show them, with progress redraws
    /// resolved.
    pub fn lines(&self) -> Vec<String> {
        self.contents()
            .lines()
            .filter_map(|line| line.rsplit('\r').next())
            .map(String::from)
            .collect()
    }
}

impl Write for CaptureBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

struct Item {
    item: Labelable,
    label_ids: Vec<String>,
}

#[derive(Default)]
struct State {
    repos: BTreeMap<String, Vec<Label>>,
    items: HashMap<String, Vec<Item>>,
    calls: Vec<String>,
    failures: HashMap<String, ApiError>,
}

/// In-memory [`LabelApi`] that records every call.
///
/// Calls are recorded as strings such as `create o/a bug` or
/// `add I_1 o/a#bug`; [`MemoryApi::fail`] makes the call with exactly that
/// string return an error instead.
#[derive(Default)]
pub struct MemoryApi {
    state: Mutex<State>,
}

fn label_id(repo: &str, name: &str) -> String {
    format!("{repo}#{name}")
}

impl MemoryApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_repo(self, repo: &str, labels: &[Label]) -> Self {
        self.state
            .lock()
            .unwrap()
            .repos
            .insert(repo.to_string(), labels.to_vec());
        self
    }

    /// Adds an issue to `repo` carrying the given labels.
    pub fn with_item(self, repo: &str, id: &str, labels: &[&str]) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            let items = state.items.entry(repo.to_string()).or_default();
            let number = items.len() as u64 + 1;
            items.push(Item {
                item: Labelable {
                    id: id.to_string(),
                    kind: LabelableKind::Issue,
                    number,
                    title: format!("Item {number}"),
                },
                label_ids: labels.iter().map(|name| label_id(repo, name)).collect(),
            });
        }
        self
    }

    pub fn fail(self, call: &str, err: ApiError) -> Self {
        self.state
            .lock()
            .unwrap()
            .failures
            .insert(call.to_string(), err);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Recorded calls whose verb is `verb`.
    pub fn calls_to(&self, verb: &str) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|call| call.split(' ').next() == Some(verb))
            .collect()
    }

    pub fn label_names(&self, repo: &str) -> Vec<String> {
        self.state.lock().unwrap().repos[repo]
            .iter()
            .map(|label| label.name.clone())
            .collect()
    }

    pub fn label(&self, repo: &str, name: &str) -> Option<Label> {
        self.state.lock().unwrap().repos[repo]
            .iter()
            .find(|label| label.name == name)
            .cloned()
    }

    pub fn item_labels(&self, repo: &str, id: &str) -> Vec<String> {
        let state = self.state.lock().unwrap();
        state.items[repo]
            .iter()
            .find(|item| item.item.id == id)
            .map(|item| item.label_ids.clone())
            .unwrap_or_default()
    }

    fn record(&self, call: String) -> ApiResult<std::sync::MutexGuard<'_, State>> {
        let mut state = self.state.lock().unwrap();
        let failure = state.failures.get(&call).cloned();
        state.calls.push(call);
        match failure {
            Some(err) => Err(err),
            None => Ok(state),
        }
    }
}

fn repo_labels<'a>(state: &'a mut State, repo: &RepoRef) -> ApiResult<&'a mut Vec<Label>> {
    state
        .repos
        .get_mut(&repo.full_name())
        .ok_or_else(|| ApiError::not_found(format!("repository '{repo}'")))
}

impl LabelApi for MemoryApi {
    fn create_label(&self, label: &Label, repo: &RepoRef) -> ApiResult<()> {
        let mut state = self.record(format!("create {repo} {}", label.name))?;
        let labels = repo_labels(&mut state, repo)?;
        if labels.iter().any(|existing| existing.same_as(label)) {
            return Err(ApiError::already_exists(format!(
                "label '{}' in {repo}",
                label.name
            )));
        }
        labels.push(label.clone());
        Ok(())
    }

    fn update_label(&self, label: &Label, repo: &RepoRef) -> ApiResult<()> {
        let mut state = self.record(format!("update {repo} {}", label.name))?;
        let labels = repo_labels(&mut state, repo)?;
        let existing = labels
            .iter_mut()
            .find(|existing| existing.same_as(label))
            .ok_or_else(|| ApiError::not_found(format!("label '{}' in {repo}", label.name)))?;
        existing.color = label.color.clone();
        if label.description.is_some() {
            existing.description = label.description.clone();
        }
        Ok(())
    }

    fn delete_label(&self, name: &str, repo: &RepoRef) -> ApiResult<()> {
        let mut state = self.record(format!("delete {repo} {name}"))?;
        let labels = repo_labels(&mut state, repo)?;
        let before = labels.len();
        labels.retain(|label| label.name != name);
        if labels.len() == before {
            return Err(ApiError::not_found(format!("label '{name}' in {repo}")));
        }
        Ok(())
    }

    fn list_labels(&self, repo: &RepoRef) -> ApiResult<Vec<Label>> {
        let mut state = self.record(format!("list {repo}"))?;
        repo_labels(&mut state, repo).map(|labels| labels.clone())
    }

    fn repository_id(&self, repo: &RepoRef) -> ApiResult<String> {
        let mut state = self.record(format!("repository_id {repo}"))?;
        repo_labels(&mut state, repo)?;
        Ok(format!("R_{repo}"))
    }

    fn label_id(&self, repo: &RepoRef, name: &str) -> ApiResult<String> {
        let mut state = self.record(format!("label_id {repo} {name}"))?;
        let labels = repo_labels(&mut state, repo)?;
        if labels.iter().any(|label| label.name == name) {
            Ok(label_id(&repo.full_name(), name))
        } else {
            Err(ApiError::not_found(format!("label '{name}' in {repo}")))
        }
    }

    fn search_labelables(&self, repo: &RepoRef, name: &str) -> ApiResult<Vec<Labelable>> {
        let mut state = self.record(format!("search {repo} {name}"))?;
        repo_labels(&mut state, repo)?;
        let wanted = label_id(&repo.full_name(), name);
        Ok(state
            .items
            .get(&repo.full_name())
            .map(|items| {
                items
                    .iter()
                    .filter(|item| item.label_ids.contains(&wanted))
                    .map(|item| item.item.clone())
                    .collect()
            })
            .unwrap_or_default())
    }

    fn add_labels_to_item(&self, item_id: &str, label_ids: &[String]) -> ApiResult<()> {
        let mut state = self.record(format!("add {item_id} {}", label_ids.join(",")))?;
        let item = state
            .items
            .values_mut()
            .flatten()
            .find(|item| item.item.id == item_id)
            .ok_or_else(|| ApiError::not_found(format!("item '{item_id}'")))?;
        for id in label_ids {
            if !item.label_ids.contains(id) {
                item.label_ids.push(id.clone());
            }
        }
        Ok(())
    }

    fn remove_labels_from_item(&self, item_id: &str, label_ids: &[String]) -> ApiResult<()> {
        let mut state = self.record(format!("remove {item_id} {}", label_ids.join(",")))?;
        let item = state
            .items
            .values_mut()
            .flatten()
            .find(|item| item.item.id == item_id)
            .ok_or_else(|| ApiError::not_found(format!("item '{item_id}'")))?;
        item.label_ids.retain(|id| !label_ids.contains(id));
        Ok(())
    }
}

pub fn repos(names: &[&str]) -> Vec<RepoRef> {
    names.iter().map(|name| name.parse().unwrap()).collect()
}
