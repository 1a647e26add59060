//! Model definitions
//!
//! One module per resource kind. Nested entities reference their siblings by
//! name only; names are resolved on demand by the orchestrators.

mod acl;
mod gateway;
mod region;
mod route;
mod rule;
mod security_group;
mod subnet;
mod vpc;

// Re-exports
pub use acl::*;
pub use gateway::*;
pub use region::*;
pub use route::*;
pub use rule::*;
pub use security_group::*;
pub use subnet::*;
pub use vpc::*;
