//! Sentence vectorization: averaged word embeddings plus hashed bigrams.
//!
//! A sentence is lowercased, trimmed and split into tokens. The embeddings
//! of all tokens are averaged into a dense prefix of `D` values. When the
//! hashing trick is enabled, every adjacent token pair is hashed into one of
//! `B` buckets and the matching position after the prefix is set to `1.0`,
//! giving a `D + B` vector whose tail is almost entirely zero.
//!
//! Bucket indices start at 1 (see [`sentvec_hash::bucket_index`]), so
//! position `D` is never set.

mod config;

pub use config::{DEFAULT_HASHING_BUCKETS, VectorizerConfig};
pub use sentvec_core::SparseVector;

/// Turns sentences into fixed-length vectors.
///
/// `vectorize` only reads the configuration and the word vector source, so a
/// vectorizer over a `Sync` source can be shared between threads.
#[derive(Debug, Clone)]
pub struct SentenceVectorizer<S> {
    source: S,
    config: VectorizerConfig,
    dim: usize,
}

impl<S: sentvec_core::WordVectorSource> SentenceVectorizer<S> {
    /// Create a vectorizer with the default configuration: hashing enabled
    /// over [`DEFAULT_HASHING_BUCKETS`] buckets.
    pub fn new(source: S) -> eyre::Result<Self> {
        Self::with_config(source, VectorizerConfig::default())
    }

    /// Create a vectorizer with an explicit configuration.
    ///
    /// Fails if the configuration is invalid, the source has zero
    /// dimensions, or the output length does not fit in `usize`.
    pub fn with_config(source: S, config: VectorizerConfig) -> eyre::Result<Self> {
        config.validate()?;

        let word_dim = source.embedding_dim();
        if word_dim == 0 {
            eyre::bail!("word vector source has zero dimensions");
        }
        let dim = config.output_dim(word_dim)?;

        tracing::debug!(
            word_dim,
            dim,
            hashing = config.use_hashing_trick,
            buckets = config.hashing_buckets,
            "created sentence vectorizer"
        );

        Ok(Self {
            source,
            config,
            dim,
        })
    }

    /// Length of every vector this vectorizer returns: `D`, or `D + B` with
    /// hashing enabled.
    #[must_use]
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Word embedding dimensionality `D`.
    #[must_use]
    pub fn word_dim(&self) -> usize {
        self.source.embedding_dim()
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &VectorizerConfig {
        &self.config
    }

    /// The underlying word vector source.
    #[must_use]
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Vectorize one sentence.
    ///
    /// Returns `None` when the sentence has no tokens (empty or whitespace
    /// only). That is distinct from an all-zero vector, which a sentence of
    /// unknown words can legitimately produce.
    #[must_use]
    pub fn vectorize(&self, sentence: &str) -> Option<SparseVector> {
        let normalized = sentvec_tokenize::normalize(sentence);
        let tokens = sentvec_tokenize::tokenize(&normalized);
        if tokens.is_empty() {
            tracing::trace!("sentence has no tokens");
            return None;
        }

        let word_dim = self.word_dim();
        let mut vector = SparseVector::with_dense_prefix(self.dim, word_dim);
        vector.copy_prefix(&self.mean_embedding(&tokens));

        if self.config.use_hashing_trick {
            for bucket in sentvec_hash::bigram_buckets(&tokens, self.config.hashing_buckets) {
                vector.set(word_dim + bucket, 1.0);
            }
        }

        tracing::trace!(tokens = tokens.len(), nnz = vector.nnz(), "vectorized sentence");
        Some(vector)
    }

    /// Mean of the token embeddings, accumulated in `f64`. A single token's
    /// embedding is returned as is.
    fn mean_embedding(&self, tokens: &[&str]) -> ndarray::Array1<f32> {
        let mut sum = ndarray::Array1::<f64>::zeros(self.word_dim());
        for token in tokens {
            sum.zip_mut_with(&self.source.embedding(token), |acc, &value| {
                *acc += f64::from(value);
            });
        }

        let count = tokens.len() as f64;
        sum.mapv(|acc| (acc / count) as f32)
    }
}

#[cfg(test)]
mod tests {
    use sentvec_core::WordVectorSource as _;
    use sentvec_wordvec::{OovPolicy, WordVectors};

    use super::*;

    const D: usize = 3;

    fn vectors() -> WordVectors {
        WordVectors::from_entries(
            D,
            [
                ("dog", vec![1.0, 0.0, 2.0]),
                ("runs", vec![0.0, 4.0, 1.0]),
                ("fast", vec![2.0, 2.0, 0.0]),
                ("a", vec![0.5, 0.5, 0.5]),
                ("b", vec![1.5, 0.0, 0.0]),
                ("c", vec![0.0, 0.0, 3.0]),
            ],
            &OovPolicy::Zero,
        )
        .unwrap()
    }

    fn hashed(buckets: usize) -> SentenceVectorizer<WordVectors> {
        SentenceVectorizer::with_config(vectors(), VectorizerConfig::with_buckets(buckets)).unwrap()
    }

    fn dense(v: &SparseVector) -> Vec<f32> {
        v.dense().to_vec()
    }

    #[test]
    fn test_default_config() {
        let vectorizer = SentenceVectorizer::new(vectors()).unwrap();
        assert_eq!(vectorizer.config().hashing_buckets, DEFAULT_HASHING_BUCKETS);
        assert_eq!(vectorizer.dim(), D + DEFAULT_HASHING_BUCKETS);
    }

    #[test]
    fn test_dimension_with_and_without_hashing() {
        let vectorizer = hashed(101);
        assert_eq!(vectorizer.dim(), D + 101);
        assert_eq!(vectorizer.word_dim(), D);
        let v = vectorizer.vectorize("dog runs fast").unwrap();
        assert_eq!(v.len(), D + 101);

        let vectorizer =
            SentenceVectorizer::with_config(vectors(), VectorizerConfig::dense_only()).unwrap();
        assert_eq!(vectorizer.dim(), D);
        let v = vectorizer.vectorize("dog runs fast").unwrap();
        assert_eq!(v.len(), D);
        assert_eq!(v.tail_indices().count(), 0);
    }

    #[test]
    fn test_no_tokens_gives_none() {
        let vectorizer = hashed(101);
        assert!(vectorizer.vectorize("").is_none());
        assert!(vectorizer.vectorize("   \t\n ").is_none());
    }

    #[test]
    fn test_single_token_is_raw_embedding() {
        let vectorizer = hashed(101);
        let v = vectorizer.vectorize("  Dog ").unwrap();
        assert_eq!(dense(&v), vec![1.0, 0.0, 2.0]);
        assert_eq!(v.tail_indices().count(), 0);
    }

    #[test]
    fn test_two_tokens_are_averaged_without_bigrams() {
        let vectorizer = hashed(101);
        let v = vectorizer.vectorize("dog runs").unwrap();
        assert_eq!(dense(&v), vec![0.5, 2.0, 1.5]);
        assert_eq!(v.tail_indices().count(), 0);
    }

    #[test]
    fn test_three_tokens_hash_two_bigrams() {
        let vectorizer = hashed(101);
        let v = vectorizer.vectorize("a b c").unwrap();

        // "ab" -> bucket 91, "bc" -> bucket 35
        assert_eq!(v.tail_indices().collect::<Vec<_>>(), vec![D + 35, D + 91]);
        assert_eq!(v[D + 35], 1.0);
        assert_eq!(v[D + 91], 1.0);

        let mean = [2.0_f32 / 3.0, 0.5 / 3.0, 3.5 / 3.0];
        for (got, want) in dense(&v).iter().zip(mean) {
            assert!((got - want).abs() < 1e-6, "{got} != {want}");
        }
    }

    #[test]
    fn test_bigrams_follow_token_order() {
        let vectorizer = hashed(101);
        let forward = vectorizer.vectorize("a b c").unwrap();
        let backward = vectorizer.vectorize("c b a").unwrap();

        assert_eq!(dense(&forward), dense(&backward));
        assert_ne!(
            forward.tail_indices().collect::<Vec<_>>(),
            backward.tail_indices().collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_colliding_bigrams_set_one_position() {
        // With two buckets every bigram lands in bucket 1.
        let vectorizer = hashed(2);
        let v = vectorizer.vectorize("dog runs fast").unwrap();

        assert_eq!(v.len(), D + 2);
        assert_eq!(v.tail_indices().collect::<Vec<_>>(), vec![D + 1]);
        assert_eq!(v[D + 1], 1.0);
    }

    #[test]
    fn test_reserved_bucket_never_set() {
        let vectorizer = hashed(11);
        for sentence in [
            "a b c",
            "dog runs fast",
            "the quick brown fox jumps over the lazy dog",
            "1 + 2 = 3 , right ?",
        ] {
            let v = vectorizer.vectorize(sentence).unwrap();
            assert_eq!(v[D], 0.0, "{sentence}");
            assert!(v.tail_indices().all(|i| i > D && i < D + 11));
        }
    }

    #[test]
    fn test_case_insensitive() {
        let vectorizer = hashed(101);
        assert_eq!(
            vectorizer.vectorize("Dog runs"),
            vectorizer.vectorize("dog runs")
        );
        assert_eq!(
            vectorizer.vectorize("DOG Runs FAST"),
            vectorizer.vectorize("dog runs fast")
        );
    }

    #[test]
    fn test_mean_accumulates_in_double_precision() {
        let vectors = WordVectors::from_entries(
            1,
            [
                ("small", vec![1.0]),
                ("big", vec![1.0e8]),
                ("neg", vec![-1.0e8]),
            ],
            &OovPolicy::Zero,
        )
        .unwrap();
        let vectorizer =
            SentenceVectorizer::with_config(vectors, VectorizerConfig::dense_only()).unwrap();

        // In f32, 1 + 1e8 rounds back to 1e8 and the small value is lost.
        let v = vectorizer.vectorize("small big neg").unwrap();
        assert_eq!(dense(&v), vec![(1.0_f64 / 3.0) as f32]);
    }

    #[test]
    fn test_unknown_words_still_produce_vector() {
        let vectorizer = hashed(101);
        let v = vectorizer.vectorize("?!").unwrap();
        assert_eq!(dense(&v), vec![0.0; D]);

        // The zero OOV row pulls the average down.
        let v = vectorizer.vectorize("dog zebra").unwrap();
        assert_eq!(dense(&v), vec![0.5, 0.0, 1.0]);
    }

    #[test]
    fn test_punctuation_and_digits_are_tokens() {
        let vectorizer = hashed(101);
        let v = vectorizer.vectorize("dog, 42").unwrap();
        // dog + "," + "42": three tokens, two bigrams.
        assert_eq!(v.tail_indices().count(), 2);
    }

    #[test]
    fn test_invalid_bucket_count_fails_fast() {
        let result = SentenceVectorizer::with_config(vectors(), VectorizerConfig::with_buckets(1));
        assert!(result.is_err());
    }

    #[test]
    fn test_output_overflow_rejected() {
        let result =
            SentenceVectorizer::with_config(vectors(), VectorizerConfig::with_buckets(usize::MAX));
        assert!(result.is_err());
    }

    struct Dimensionless;

    impl sentvec_core::WordVectorSource for Dimensionless {
        fn embedding_dim(&self) -> usize {
            0
        }

        fn embedding(&self, _word: &str) -> sentvec_core::WordEmbeddingView<'_> {
            ndarray::ArrayView1::from(&[] as &[f32])
        }
    }

    #[test]
    fn test_zero_dimension_source_rejected() {
        assert!(SentenceVectorizer::new(Dimensionless).is_err());
    }

    #[test]
    fn test_borrowed_source() {
        let table = vectors();
        let vectorizer =
            SentenceVectorizer::with_config(&table, VectorizerConfig::dense_only()).unwrap();
        assert_eq!(vectorizer.source().embedding_dim(), D);
        assert!(vectorizer.vectorize("dog").is_some());
    }

    #[test]
    fn test_shared_across_threads() {
        let vectorizer = std::sync::Arc::new(hashed(101));
        let expected = vectorizer.vectorize("dog runs fast").unwrap();

        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|_| {
                    let vectorizer = std::sync::Arc::clone(&vectorizer);
                    scope.spawn(move || vectorizer.vectorize("dog runs fast"))
                })
                .collect();

            for handle in handles {
                assert_eq!(handle.join().unwrap().as_ref(), Some(&expected));
            }
        });
    }
}
