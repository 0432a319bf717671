//! Labelable search shared by both backends.
//!
//! Discussions are only reachable through GraphQL search, so the REST
//! backend runs the discussion pass here as well.

use labelsmith_core::{ApiError, ApiResult, Labelable, LabelableKind, RepoRef};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::http_client::GithubClient;

const ISSUE_SEARCH_QUERY: &str = "query($query: String!, $cursor: String) {
  search(query: $query, type: ISSUE, first: 100, after: $cursor) {
    issueCount
    nodes {
      __typename
      ... on Issue { id number title }
      ... on PullRequest { id number title }
    }
    pageInfo { hasNextPage endCursor }
  }
}";

const DISCUSSION_SEARCH_QUERY: &str = "query($query: String!, $cursor: String) {
  search(query: $query, type: DISCUSSION, first: 100, after: $cursor) {
    discussionCount
    nodes {
      __typename
      ... on Discussion { id number title }
    }
    pageInfo { hasNextPage endCursor }
  }
}";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PageInfo {
    has_next_page: bool,
    end_cursor: Option<String>,
}

impl PageInfo {
    /// Cursor for the next page, if there is one.
    pub(crate) fn next_cursor(&self) -> Option<String> {
        if self.has_next_page {
            self.end_cursor.clone()
        } else {
            None
        }
    }
}

#[derive(Debug, Deserialize)]
struct ItemFields {
    id: String,
    number: u64,
    title: String,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "__typename")]
enum SearchNode {
    Issue(ItemFields),
    PullRequest(ItemFields),
    Discussion(ItemFields),
    #[serde(other)]
    Other,
}

impl SearchNode {
    fn into_labelable(self) -> Option<Labelable> {
        let (kind, fields) = match self {
            Self::Issue(fields) => (LabelableKind::Issue, fields),
            Self::PullRequest(fields) => (LabelableKind::PullRequest, fields),
            Self::Discussion(fields) => (LabelableKind::Discussion, fields),
            Self::Other => return None,
        };
        Some(Labelable {
            id: fields.id,
            kind,
            number: fields.number,
            title: fields.title,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SearchConnection {
    #[serde(default)]
    issue_count: usize,
    #[serde(default)]
    discussion_count: usize,
    nodes: Vec<Option<SearchNode>>,
    page_info: PageInfo,
}

#[derive(Debug, Deserialize)]
struct SearchData {
    search: SearchConnection,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchKind {
    /// Issues and pull requests.
    Issue,
    Discussion,
}

impl SearchKind {
    fn document(self) -> &'static str {
        match self {
            Self::Issue => ISSUE_SEARCH_QUERY,
            Self::Discussion => DISCUSSION_SEARCH_QUERY,
        }
    }

    fn total(self, connection: &SearchConnection) -> usize {
        match self {
            Self::Issue => connection.issue_count,
            Self::Discussion => connection.discussion_count,
        }
    }
}

/// Builds the search query for items in `repo` carrying label `name`.
///
/// GitHub search has no escape for `"` inside a quoted qualifier, so such
/// names are rejected instead of silently matching nothing.
pub fn search_query(repo: &RepoRef, name: &str) -> ApiResult<String> {
    if name.contains('"') {
        return Err(ApiError::Unclassified(format!(
            "label '{name}' contains '\"' and cannot be searched"
        )));
    }
    Ok(format!("repo:{repo} label:\"{name}\""))
}

/// Fails when fewer items were collected than the search reported.
///
/// GitHub caps search at 1000 results and ends pagination there, so a short
/// result would otherwise look complete.
pub fn ensure_complete(collected: usize, total: usize, resource: &str) -> ApiResult<()> {
    if collected < total {
        return Err(ApiError::Unclassified(format!(
            "search results truncated for {resource}: got {collected} of {total} items"
        )));
    }
    Ok(())
}

/// Follows search pages from `fetch` until the last one, then checks the
/// result against the reported total.
pub(crate) fn collect_search<F>(
    kind: SearchKind,
    resource: &str,
    mut fetch: F,
) -> ApiResult<Vec<Labelable>>
where
    F: FnMut(Option<String>) -> ApiResult<SearchConnection>,
{
    let mut items = Vec::new();
    let mut cursor: Option<String> = None;
    let mut total = 0;

    loop {
        let connection = fetch(cursor)?;
        total = total.max(kind.total(&connection));
        cursor = connection.page_info.next_cursor();
        items.extend(
            connection
                .nodes
                .into_iter()
                .flatten()
                .filter_map(SearchNode::into_labelable),
        );
        if cursor.is_none() {
            break;
        }
    }

    ensure_complete(items.len(), total, resource)?;
    Ok(items)
}

impl GithubClient {
    /// Runs a GraphQL search of `kind` for items in `repo` labeled `name`.
    pub fn search_labelables(
        &self,
        kind: SearchKind,
        repo: &RepoRef,
        name: &str,
    ) -> ApiResult<Vec<Labelable>> {
        let query = search_query(repo, name)?;
        let resource = format!("repository '{repo}'");

        let items = collect_search(kind, &resource, |cursor| {
            let data: SearchData = self.graphql(
                kind.document(),
                json!({ "query": query, "cursor": cursor }),
                &resource,
            )?;
            Ok(data.search)
        })?;

        debug!(repo = %repo, label = name, ?kind, count = items.len(), "searched labelables");
        Ok(items)
    }
}
