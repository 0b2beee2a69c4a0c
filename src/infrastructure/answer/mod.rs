//! Answer synthesis

mod synthesizer;

pub use synthesizer::{AnswerSynthesizer, SynthesizerConfig};
