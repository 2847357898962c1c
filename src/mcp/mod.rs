//! MCP surface: repository-scoped tools served over streamable HTTP.

pub mod scope;
pub mod service;
pub mod tools;
pub mod workspace;

pub use scope::RepositoryScope;
pub use tools::RepositoryTools;
