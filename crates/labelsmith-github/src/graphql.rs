//! Label management entirely over the GitHub GraphQL API.

use labelsmith_core::{ApiError, ApiResult, Label, LabelApi, Labelable, RepoIdCache, RepoRef};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::debug;

use crate::{
    http_client::GithubClient,
    search::{PageInfo, SearchKind},
};

const REPOSITORY_ID_QUERY: &str = "query($owner: String!, $name: String!) {
  repository(owner: $owner, name: $name) { id }
}";

const LABEL_ID_QUERY: &str = "query($owner: String!, $name: String!, $label: String!) {
  repository(owner: $owner, name: $name) { label(name: $label) { id } }
}";

const LABELS_QUERY: &str = "query($owner: String!, $name: String!, $cursor: String) {
  repository(owner: $owner, name: $name) {
    labels(first: 100, after: $cursor) {
      nodes { name color description }
      pageInfo { hasNextPage endCursor }
    }
  }
}";

const CREATE_LABEL_MUTATION: &str = "mutation($input: CreateLabelInput!) {
  createLabel(input: $input) { label { id } }
}";

const UPDATE_LABEL_MUTATION: &str = "mutation($input: UpdateLabelInput!) {
  updateLabel(input: $input) { label { id } }
}";

const DELETE_LABEL_MUTATION: &str = "mutation($input: DeleteLabelInput!) {
  deleteLabel(input: $input) { clientMutationId }
}";

#[derive(Debug, Deserialize)]
struct RepositoryData<T> {
    repository: Option<T>,
}

#[derive(Debug, Deserialize)]
struct Node {
    id: String,
}

#[derive(Debug, Deserialize)]
struct LabelNode {
    label: Option<Node>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Connection<T> {
    nodes: Vec<Option<T>>,
    page_info: PageInfo,
}

impl<T> Connection<T> {
    /// Cursor for the next page, if there is one.
    fn next_cursor(&self) -> Option<String> {
        self.page_info.next_cursor()
    }
}

#[derive(Debug, Deserialize)]
struct LabelsNode {
    labels: Connection<Label>,
}

fn repository_resource(repo: &RepoRef) -> String {
    format!("repository '{repo}'")
}

fn label_resource(repo: &RepoRef, name: &str) -> String {
    format!("label '{name}' in {repo}")
}

fn label_input(label: &Label, id_key: &str, id: String) -> Value {
    let mut input = Map::new();
    input.insert(id_key.into(), json!(id));
    input.insert("name".into(), json!(label.name));
    input.insert("color".into(), json!(label.color));
    if let Some(description) = &label.description {
        input.insert("description".into(), json!(description));
    }
    json!({ "input": input })
}

pub struct GraphqlApi {
    client: GithubClient,
    cache: RepoIdCache,
}

impl GraphqlApi {
    pub fn new(client: GithubClient) -> Self {
        Self {
            client,
            cache: RepoIdCache::new(),
        }
    }
}

impl LabelApi for GraphqlApi {
    fn create_label(&self, label: &Label, repo: &RepoRef) -> ApiResult<()> {
        let repository_id = self.repository_id(repo)?;
        let _: Value = self.client.graphql(
            CREATE_LABEL_MUTATION,
            label_input(label, "repositoryId", repository_id),
            &label_resource(repo, &label.name),
        )?;
        Ok(())
    }

    fn update_label(&self, label: &Label, repo: &RepoRef) -> ApiResult<()> {
        let id = self.label_id(repo, &label.name)?;
        let _: Value = self.client.graphql(
            UPDATE_LABEL_MUTATION,
            label_input(label, "id", id),
            &label_resource(repo, &label.name),
        )?;
        Ok(())
    }

    fn delete_label(&self, name: &str, repo: &RepoRef) -> ApiResult<()> {
        let id = self.label_id(repo, name)?;
        let _: Value = self.client.graphql(
            DELETE_LABEL_MUTATION,
            json!({ "input": { "id": id } }),
            &label_resource(repo, name),
        )?;
        Ok(())
    }

    fn list_labels(&self, repo: &RepoRef) -> ApiResult<Vec<Label>> {
        let resource = repository_resource(repo);
        let mut labels = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let data: RepositoryData<LabelsNode> = self.client.graphql(
                LABELS_QUERY,
                json!({ "owner": repo.owner(), "name": repo.name(), "cursor": cursor }),
                &resource,
            )?;
            let connection = data
                .repository
                .ok_or_else(|| ApiError::not_found(&resource))?
                .labels;
            cursor = connection.next_cursor();
            labels.extend(connection.nodes.into_iter().flatten().map(|mut label| {
                label.description = label.description.filter(|d| !d.is_empty());
                label
            }));
            if cursor.is_none() {
                break;
            }
        }

        debug!(repo = %repo, count = labels.len(), "listed labels");
        Ok(labels)
    }

    fn repository_id(&self, repo: &RepoRef) -> ApiResult<String> {
        self.cache.get_or_fetch(repo, || {
            let resource = repository_resource(repo);
            let data: RepositoryData<Node> = self.client.graphql(
                REPOSITORY_ID_QUERY,
                json!({ "owner": repo.owner(), "name": repo.name() }),
                &resource,
            )?;
            data.repository
                .map(|node| node.id)
                .ok_or_else(|| ApiError::not_found(resource))
        })
    }

    fn label_id(&self, repo: &RepoRef, name: &str) -> ApiResult<String> {
        let data: RepositoryData<LabelNode> = self.client.graphql(
            LABEL_ID_QUERY,
            json!({ "owner": repo.owner(), "name": repo.name(), "label": name }),
            &repository_resource(repo),
        )?;
        let repository = data
            .repository
            .ok_or_else(|| ApiError::not_found(repository_resource(repo)))?;
        repository
            .label
            .map(|node| node.id)
            .ok_or_else(|| ApiError::not_found(label_resource(repo, name)))
    }

    fn search_labelables(&self, repo: &RepoRef, name: &str) -> ApiResult<Vec<Labelable>> {
        let mut items = self
            .client
            .search_labelables(SearchKind::Issue, repo, name)?;
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
