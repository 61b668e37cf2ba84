//! Pretrained word vector tables.
//!
//! [`WordVectors`] holds a vocabulary and an embedding matrix in memory and
//! answers lookups for the sentence vectorizer. Unknown words resolve to a
//! single out-of-vocabulary row chosen by [`OovPolicy`].

use eyre::WrapErr as _;

mod text;

pub use text::parse_text;

/// What an out-of-vocabulary word maps to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum OovPolicy {
    /// The zero vector. Unknown words pull a sentence average toward zero.
    #[default]
    Zero,
    /// The mean of every vocabulary row.
    Mean,
    /// The row of a designated vocabulary word, e.g. `</s>` or `<unk>`.
    Token(String),
}

impl std::str::FromStr for OovPolicy {
    type Err = eyre::Report;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "zero" => Ok(Self::Zero),
            "mean" => Ok(Self::Mean),
            other => match other.strip_prefix("token:") {
                Some(word) if !word.is_empty() => Ok(Self::Token(word.to_string())),
                _ => eyre::bail!("unknown OOV policy {other:?}, expected zero, mean or token:<word>"),
            },
        }
    }
}

impl std::fmt::Display for OovPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Zero => f.write_str("zero"),
            Self::Mean => f.write_str("mean"),
            Self::Token(word) => write!(f, "token:{word}"),
        }
    }
}

/// Options for reading word vectors from disk.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Out-of-vocabulary handling.
    pub oov: OovPolicy,
    /// Keep only the first `max_words` distinct words. Pretrained files are
    /// usually sorted by frequency, so this keeps the most common ones.
    pub max_words: Option<usize>,
}

/// An in-memory word embedding table.
#[derive(Debug, Clone)]
pub struct WordVectors {
    vocab: std::collections::HashMap<String, usize>,
    /// Shape: [vocab_size, dim]
    matrix: ndarray::Array2<f32>,
    oov: sentvec_core::WordEmbedding,
}

impl WordVectors {
    /// Build a table from `(word, vector)` pairs.
    ///
    /// Every vector must have length `dim`. When a word repeats, its first
    /// vector wins.
    pub fn from_entries<I, W>(dim: usize, entries: I, oov: &OovPolicy) -> eyre::Result<Self>
    where
        I: IntoIterator<Item = (W, Vec<f32>)>,
        W: Into<String>,
    {
        if dim == 0 {
            eyre::bail!("word vectors must have at least one dimension");
        }

        let mut vocab = std::collections::HashMap::new();
        let mut data = Vec::new();
        let mut duplicates = 0_usize;

        for (word, vector) in entries {
            let word = word.into();
            if vector.len() != dim {
                eyre::bail!(
                    "vector for {word:?} has {} dimensions, expected {dim}",
                    vector.len()
                );
            }

            if vocab.contains_key(&word) {
                duplicates += 1;
                continue;
            }

            vocab.insert(word, vocab.len());
            data.extend_from_slice(&vector);
        }

        if duplicates > 0 {
            tracing::debug!(duplicates, "ignored repeated words");
        }

        let matrix = ndarray::Array2::from_shape_vec((vocab.len(), dim), data)
            .wrap_err("failed to shape embedding matrix")?;

        Self::from_parts(vocab, matrix, oov)
    }

    /// Assemble a table from an existing vocabulary and matrix.
    ///
    /// Every vocabulary index must address a row of `matrix`.
    pub fn from_parts(
        vocab: std::collections::HashMap<String, usize>,
        matrix: ndarray::Array2<f32>,
        oov: &OovPolicy,
    ) -> eyre::Result<Self> {
        let (rows, dim) = matrix.dim();
        if dim == 0 {
            eyre::bail!("word vectors must have at least one dimension");
        }
        if let Some((word, &row)) = vocab.iter().find(|&(_, &row)| row >= rows) {
            eyre::bail!("word {word:?} points at row {row}, but the matrix has {rows} rows");
        }

        let oov = match oov {
            OovPolicy::Zero => ndarray::Array1::zeros(dim),
            OovPolicy::Mean => matrix
                .mean_axis(ndarray::Axis(0))
                .unwrap_or_else(|| ndarray::Array1::zeros(dim)),
            OovPolicy::Token(word) => {
                let Some(&row) = vocab.get(word) else {
                    eyre::bail!("OOV token {word:?} is not in the vocabulary");
                };
                matrix.row(row).to_owned()
            }
        };

        Ok(Self { vocab, matrix, oov })
    }

    /// Read a word2vec/fastText/GloVe text file.
    ///
    /// The file is memory-mapped and parsed in place. See [`parse_text`]
    /// for the accepted layout.
    pub fn load_text(
        path: impl AsRef<std::path::Path>,
        options: &LoadOptions,
    ) -> eyre::Result<Self> {
        let path = path.as_ref();
        tracing::info!(path = %path.display(), oov = %options.oov, "loading word vectors");

        let file = std::fs::File::open(path)
            .wrap_err_with(|| format!("failed to open word vectors at {}", path.display()))?;
        let size = file
            .metadata()
            .wrap_err_with(|| format!("failed to read metadata for {}", path.display()))?
            .len();
        if size == 0 {
            eyre::bail!("word vector file {} is empty", path.display());
        }

        let mmap = unsafe {
            memmap2::Mmap::map(&file)
                .wrap_err_with(|| format!("failed to mmap {}", path.display()))?
        };
        let text = std::str::from_utf8(&mmap)
            .wrap_err_with(|| format!("{} is not valid UTF-8", path.display()))?;

        let vectors = parse_text(text, options)
            .wrap_err_with(|| format!("failed to parse {}", path.display()))?;

        tracing::info!(
            words = vectors.len(),
            dim = vectors.dim(),
            "loaded word vectors"
        );

        Ok(vectors)
    }

    /// Embedding dimensionality.
    #[must_use]
    pub fn dim(&self) -> usize {
        self.matrix.ncols()
    }

    /// Number of words in the vocabulary.
    #[must_use]
    pub fn len(&self) -> usize {
        self.vocab.len()
    }

    /// True when the vocabulary is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vocab.is_empty()
    }

    /// Whether `word` has its own row.
    #[must_use]
    pub fn contains(&self, word: &str) -> bool {
        self.vocab.contains_key(word)
    }

    /// Vocabulary words, in no particular order.
    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.vocab.keys().map(String::as_str)
    }

    /// The vector returned for unknown words.
    #[must_use]
    pub fn oov_vector(&self) -> sentvec_core::WordEmbeddingView<'_> {
        self.oov.view()
    }
}

impl sentvec_core::WordVectorSource for WordVectors {
    fn embedding_dim(&self) -> usize {
        self.dim()
    }

    fn embedding(&self, word: &str) -> sentvec_core::WordEmbeddingView<'_> {
        match self.vocab.get(word) {
            Some(&row) => self.matrix.row(row),
            None => self.oov.view(),
        }
    }
}
