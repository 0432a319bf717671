//! Label management over the GitHub REST API.
//!
//! Labelable mutations and discussion search go through GraphQL since the
//! REST API has neither.

use labelsmith_core::{
    ApiError, ApiResult, Label, LabelApi, Labelable, LabelableKind, RepoIdCache, RepoRef,
};
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::debug;
use url::Url;

use crate::{
    http_client::GithubClient,
    search::{ensure_complete, search_query, SearchKind},
};

const PER_PAGE: usize = 100;

#[derive(Debug, Deserialize)]
struct RestLabel {
    node_id: String,
    name: String,
    color: String,
    description: Option<String>,
}

impl From<RestLabel> for Label {
    fn from(label: RestLabel) -> Self {
        Label {
            name: label.name,
            color: label.color,
            description: label.description.filter(|d| !d.is_empty()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RestRepository {
    node_id: String,
}

#[derive(Debug, Deserialize)]
struct SearchPage {
    total_count: usize,
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    node_id: String,
    number: u64,
    title: String,
    pull_request: Option<Value>,
}

impl From<SearchItem> for Labelable {
    fn from(item: SearchItem) -> Self {
        let kind = if item.pull_request.is_some() {
            LabelableKind::PullRequest
        } else {
            LabelableKind::Issue
        };
        Labelable {
            id: item.node_id,
            kind,
            number: item.number,
            title: item.title,
        }
    }
}

pub struct RestApi {
    client: GithubClient,
    cache: RepoIdCache,
}

impl RestApi {
    pub fn new(client: GithubClient) -> Self {
        Self {
            client,
            cache: RepoIdCache::new(),
        }
    }

    fn labels_url(&self, repo: &RepoRef) -> String {
        self.client
            .rest_url(&format!("/repos/{}/{}/labels", repo.owner(), repo.name()))
    }

    fn label_url(&self, repo: &RepoRef, name: &str) -> String {
        format!(
            "{}/{}",
            self.labels_url(repo),
            utf8_percent_encode(name, NON_ALPHANUMERIC)
        )
    }

    fn search_url(&self, repo: &RepoRef, name: &str, page: usize) -> ApiResult<String> {
        let mut url = Url::parse(&self.client.rest_url("/search/issues"))
            .map_err(|err| ApiError::Unclassified(format!("invalid search URL: {err}")))?;
        url.query_pairs_mut()
            .append_pair("q", &search_query(repo, name)?)
            .append_pair("per_page", &PER_PAGE.to_string())
            .append_pair("page", &page.to_string());
        Ok(url.into())
    }

    fn get_label(&self, repo: &RepoRef, name: &str) -> ApiResult<RestLabel> {
        self.client
            .get_json(&self.label_url(repo, name), &label_resource(repo, name))
    }
}

fn label_resource(repo: &RepoRef, name: &str) -> String {
    format!("label '{name}' in {repo}")
}

fn label_body(label: &Label, name_key: &str) -> Value {
    let mut body = Map::new();
    body.insert(name_key.into(), json!(label.name));
    body.insert("color".into(), json!(label.color));
    if let Some(description) = &label.description {
        body.insert("description".into(), json!(description));
    }
    Value::Object(body)
}

impl LabelApi for RestApi {
    fn create_label(&self, label: &Label, repo: &RepoRef) -> ApiResult<()> {
        self.client.post_json(
            &self.labels_url(repo),
            &label_body(label, "name"),
            &label_resource(repo, &label.name),
        )
    }

    fn update_label(&self, label: &Label, repo: &RepoRef) -> ApiResult<()> {
        self.client.patch_json(
            &self.label_url(repo, &label.name),
            &label_body(label, "new_name"),
            &label_resource(repo, &label.name),
        )
    }

    fn delete_label(&self, name: &str, repo: &RepoRef) -> ApiResult<()> {
        self.client
            .delete(&self.label_url(repo, name), &label_resource(repo, name))
    }

    fn list_labels(&self, repo: &RepoRef) -> ApiResult<Vec<Label>> {
        let resource = format!("repository '{repo}'");
        let mut labels = Vec::new();

        for page in 1.. {
            let url = format!(
                "{}?per_page={PER_PAGE}&page={page}",
                self.labels_url(repo)
            );
            let batch: Vec<RestLabel> = self.client.get_json(&url, &resource)?;
            let done = batch.len() < PER_PAGE;
            labels.extend(batch.into_iter().map(Label::from));
            if done {
                break;
            }
        }

        debug!(repo = %repo, count = labels.len(), "listed labels");
        Ok(labels)
    }

    fn repository_id(&self, repo: &RepoRef) -> ApiResult<String> {
        self.cache.get_or_fetch(repo, || {
            let url = self
                .client
                .rest_url(&format!("/repos/{}/{}", repo.owner(), repo.name()));
            let repository: RestRepository = self
                .client
                .get_json(&url, &format!("repository '{repo}'"))?;
            Ok(repository.node_id)
        })
    }

    fn label_id(&self, repo: &RepoRef, name: &str) -> ApiResult<String> {
        Ok(self.get_label(repo, name)?.node_id)
    }

    fn search_labelables(&self, repo: &RepoRef, name: &str) -> ApiResult<Vec<Labelable>> {
        let resource = format!("repository '{repo}'");
        let mut items = Vec::new();
        let mut total = 0;

        for page in 1.. {
            let url = self.search_url(repo, name, page)?;
            let batch: SearchPage = self.client.get_json(&url, &resource)?;
            total = total.max(batch.total_count);
            let done = batch.items.len() < PER_PAGE;
            items.extend(batch.items.into_iter().map(Labelable::from));
            if done {
                break;
            }
        }
        ensure_complete(items.len(), total, &resource)?;
        debug!(repo = %repo, label = name, count = items.len(), "searched issues");

        items.extend(
            self.client
                .search_labelables(SearchKind::Discussion, repo, name)?,
        );
        Ok(items)
    }

    fn add_labels_to_item(&self, item_id: &str, label_ids: &[String]) -> ApiResult<()> {
        self.client.add_labels_to_labelable(item_id, label_ids)
    }

    fn remove_labels_from_item(&self, item_id: &str, label_ids: &[String]) -> ApiResult<()> {
        self.client.remove_labels_from_labelable(item_id, label_ids)
    }
}
