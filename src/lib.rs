pub mod config;
pub mod error;
pub mod keys;
pub mod metadata;
pub mod store;
pub mod subtitle;
pub mod transcribe;
pub mod transcript;
pub mod translate;
pub mod workflow;

pub use config::Config;
pub use error::{Result, SubflowError};
pub use workflow::{State, Workflow, WorkflowConfig, WorkflowInput, WorkflowOutput};
