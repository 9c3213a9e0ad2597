pub mod cli;
pub mod config;
pub mod generator;
pub mod llm;
pub mod retrieval;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use generator::state::ResearchState;
pub use generator::workflow::{WorkflowEvent, launch, run_workflow};
