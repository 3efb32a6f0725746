pub mod archive;
pub mod cache;
pub mod catalog;
pub mod dependency;
pub mod digest;
pub mod error;
pub mod http;
pub mod listing;
pub mod resolver;

pub use archive::ArchiveType;
pub use cache::{CacheConfig, DependencyCache};
pub use catalog::Catalog;
pub use dependency::{format_dependencies, Dependency, License};
pub use error::{PaktError, Result};
pub use http::{HttpClient, HttpClientConfig};
pub use listing::{build_manifest, build_manifest_with_concurrency, FileEntry};
pub use resolver::DependencyResolver;
