//! Grounded prompt assembly

mod assembler;
mod config;

pub use assembler::{AssembledPrompt, PromptAssembler, PromptContext, CHUNK_SEPARATOR};
pub use config::{
    render_instruction, PromptConfig, DEFAULT_APOLOGY, DEFAULT_FALLBACK_ANSWER,
    DEFAULT_SYSTEM_INSTRUCTION, FALLBACK_PLACEHOLDER,
};
