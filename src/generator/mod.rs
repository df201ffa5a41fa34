pub mod assembler;
pub mod context;
pub mod error;
pub mod outlet;
pub mod prompt;
pub mod retry;
pub mod splitter;
pub mod types;
pub mod workflow;

pub use assembler::SeminarAssembler;
pub use context::GeneratorContext;
pub use error::SeminarError;
pub use types::{SectionContent, SeminarDocument, SeminarRequest, Subtopic};
