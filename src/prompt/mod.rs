//! Prompt construction: the catalog context block and the full message sequence.

pub mod assembler;
pub mod context;

pub use assembler::{PromptInput, TemplateId, assemble_prompt, select_template};
pub use context::format_context;
