use crate::{
    error::ApiError,
    types::{Label, Labelable, RepoRef},
};

pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Label management capabilities of a remote platform.
///
/// Implementations are shared across worker threads, so every method takes
/// `&self` and must be safe to call concurrently. Failures are reported
/// through the closed [`ApiError`] taxonomy.
pub trait LabelApi: Send + Sync {
    fn create_label(&self, label: &Label, repo: &RepoRef) -> ApiResult<()>;

    fn update_label(&self, label: &Label, repo: &RepoRef) -> ApiResult<()>;

    fn delete_label(&self, name: &str, repo: &RepoRef) -> ApiResult<()>;

    /// All labels of `repo`, in provider order.
    fn list_labels(&self, repo: &RepoRef) -> ApiResult<Vec<Label>>;

    /// Provider-internal repository ID. Implementations memoize this in a
    /// [`RepoIdCache`](crate::RepoIdCache).
    fn repository_id(&self, repo: &RepoRef) -> ApiResult<String>;

    fn label_id(&self, repo: &RepoRef, name: &str) -> ApiResult<String>;

    /// Every issue, pull request and discussion in `repo` carrying `name`.
    fn search_labelables(&self, repo: &RepoRef, name: &str) -> ApiResult<Vec<Labelable>>;

    fn add_labels_to_item(&self, item_id: &str, label_ids: &[String]) -> ApiResult<()>;

    fn remove_labels_from_item(&self, item_id: &str, label_ids: &[String]) -> ApiResult<()>;
}
