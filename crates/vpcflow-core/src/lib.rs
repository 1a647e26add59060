//! vpcflow core
//!
//! The desired network topology of one provider region, expressed as a graph
//! of named entities that reference each other by name. Entities carry an
//! optional provider identifier which the orchestrators in `vpcflow-cloud`
//! fill in on creation and clear on teardown.

pub mod document;
pub mod error;
pub mod model;
pub mod validator;

pub use document::{
    CREATED_SUFFIX, DocumentFormat, REMOVED_SUFFIX, checkpoint_path, load_region, save_region,
};
pub use error::{GraphError, Result};
pub use model::*;
pub use validator::validate;
