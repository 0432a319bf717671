use error::LabelsmithError;

pub mod api;
pub mod cache;
pub mod color;
pub mod error;
pub mod input;
pub mod types;

pub use api::{ApiResult, LabelApi};
pub use cache::RepoIdCache;
pub use error::ApiError;
pub use types::{Label, Labelable, LabelableKind, RepoRef};

pub type LabelsmithResult<T> = std::result::Result<T, LabelsmithError>;
