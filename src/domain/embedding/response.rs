//! Embedding response

/// Vector produced for the input at `index`
#[derive(Debug, Clone, PartialEq)]
pub struct Embedding {
    index: usize,
    vector: Vec<f32>,
}

impl Embedding {
    pub fn new(index: usize, vector: Vec<f32>) -> Self {
        Self { index, vector }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn vector(&self) -> &[f32] {
        &self.vector
    }

    pub fn dimensions(&self) -> usize {
        self.vector.len()
    }

    pub fn into_vector(self) -> Vec<f32> {
        self.vector
    }
}

/// Token accounting reported by the provider
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmbeddingUsage {
    prompt_tokens: u32,
    total_tokens: u32,
}

impl EmbeddingUsage {
    pub fn new(prompt_tokens: u32, total_tokens: u32) -> Self {
        Self {
            prompt_tokens,
            total_tokens,
        }
    }

    pub fn prompt_tokens(&self) -> u32 {
        self.prompt_tokens
    }

    pub fn total_tokens(&self) -> u32 {
        self.total_tokens
    }
}

/// Vectors for one request; providers may return them in any order
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingResponse {
    model: String,
    embeddings: Vec<Embedding>,
    usage: EmbeddingUsage,
}

impl EmbeddingResponse {
    pub fn new(model: String, embeddings: Vec<Embedding>, usage: EmbeddingUsage) -> Self {
        Self {
            model,
            embeddings,
            usage,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn embeddings(&self) -> &[Embedding] {
        &self.embeddings
    }

    pub fn usage(&self) -> EmbeddingUsage {
        self.usage
    }

    /// Vectors sorted back into input order
    pub fn into_ordered_vectors(mut self) -> Vec<Vec<f32>> {
        self.embeddings.sort_by_key(Embedding::index);
        self.embeddings
            .into_iter()
            .map(Embedding::into_vector)
            .collect()
    }
}
