pub mod cli;
pub mod config;
pub mod generator;
pub mod grounding;
pub mod i18n;
pub mod llm;
pub mod logging;
pub mod server;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use generator::workflow::launch;
pub use generator::{SeminarAssembler, SeminarDocument, SeminarError, SeminarRequest};
