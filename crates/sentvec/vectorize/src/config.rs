//! Vectorizer configuration.

/// Default size of the hashed bigram region.
pub const DEFAULT_HASHING_BUCKETS: usize = 10_000_000;

/// Shape of the vectors a [`SentenceVectorizer`](crate::SentenceVectorizer)
/// produces. Fixed for the lifetime of a vectorizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct VectorizerConfig {
    /// Number of bigram buckets appended after the dense embedding.
    pub hashing_buckets: usize,
    /// Append hashed bigram indicators after the averaged embedding.
    pub use_hashing_trick: bool,
}

impl Default for VectorizerConfig {
    fn default() -> Self {
        Self {
            hashing_buckets: DEFAULT_HASHING_BUCKETS,
            use_hashing_trick: true,
        }
    }
}

impl VectorizerConfig {
    /// Configuration producing only the averaged embedding.
    #[must_use]
    pub fn dense_only() -> Self {
        Self {
            use_hashing_trick: false,
            ..Self::default()
        }
    }

    /// Configuration with hashing enabled over `buckets` buckets.
    #[must_use]
    pub fn with_buckets(buckets: usize) -> Self {
        Self {
            hashing_buckets: buckets,
            use_hashing_trick: true,
        }
    }

    /// Check that bucket placement is well defined.
    ///
    /// Buckets are chosen modulo `hashing_buckets - 1`, so hashing needs at
    /// least two of them. The bucket count is ignored when hashing is off.
    pub fn validate(&self) -> eyre::Result<()> {
        if self.use_hashing_trick && self.hashing_buckets < 2 {
            eyre::bail!(
                "hashing needs at least 2 buckets, got {}",
                self.hashing_buckets
            );
        }
        Ok(())
    }

    /// Output length for word embeddings of `word_dim` dimensions.
    pub fn output_dim(&self, word_dim: usize) -> eyre::Result<usize> {
        if !self.use_hashing_trick {
            return Ok(word_dim);
        }
        word_dim.checked_add(self.hashing_buckets).ok_or_else(|| {
            eyre::eyre!(
                "{word_dim} embedding dimensions plus {} buckets overflows usize",
                self.hashing_buckets
            )
        })
    }
}
