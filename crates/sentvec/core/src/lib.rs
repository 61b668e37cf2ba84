//! Core types and traits for sentvec.

use std::collections::BTreeMap;

/// A single word embedding.
pub type WordEmbedding = ndarray::Array1<f32>;

/// A borrowed view of a word embedding.
pub type WordEmbeddingView<'a> = ndarray::ArrayView1<'a, f32>;

/// Anything that can map a token to a dense embedding of fixed dimensionality.
///
/// Lookups are infallible: a source decides internally what an unknown word
/// maps to, and always hands back exactly [`embedding_dim`] values.
/// Implementations shared across threads must be safe for concurrent reads.
///
/// [`embedding_dim`]: WordVectorSource::embedding_dim
pub trait WordVectorSource {
    /// Dimensionality of every embedding returned by this source.
    fn embedding_dim(&self) -> usize;

    /// The embedding for `word`. Must have length [`Self::embedding_dim`].
    fn embedding(&self, word: &str) -> WordEmbeddingView<'_>;
}

impl<T: WordVectorSource + ?Sized> WordVectorSource for &T {
    fn embedding_dim(&self) -> usize {
        (**self).embedding_dim()
    }

    fn embedding(&self, word: &str) -> WordEmbeddingView<'_> {
        (**self).embedding(word)
    }
}

impl<T: WordVectorSource + ?Sized> WordVectorSource for Box<T> {
    fn embedding_dim(&self) -> usize {
        (**self).embedding_dim()
    }

    fn embedding(&self, word: &str) -> WordEmbeddingView<'_> {
        (**self).embedding(word)
    }
}

impl<T: WordVectorSource + ?Sized> WordVectorSource for std::sync::Arc<T> {
    fn embedding_dim(&self) -> usize {
        (**self).embedding_dim()
    }

    fn embedding(&self, word: &str) -> WordEmbeddingView<'_> {
        (**self).embedding(word)
    }
}

static ZERO: f32 = 0.0;

/// A fixed-length numeric vector with a materialized dense prefix and a
/// sparse tail.
///
/// Positions below [`dense_len`](Self::dense_len) live in a contiguous array.
/// Everything after is kept as an index -> value map, so a vector with
/// millions of mostly-zero positions costs memory proportional to its
/// non-zero tail entries.
#[derive(Debug, Clone, PartialEq)]
pub struct SparseVector {
    len: usize,
    dense: ndarray::Array1<f32>,
    tail: BTreeMap<usize, f32>,
}

impl SparseVector {
    /// An all-zero vector of `len` positions with no dense prefix.
    #[must_use]
    pub fn zeros(len: usize) -> Self {
        Self::with_dense_prefix(len, 0)
    }

    /// An all-zero vector of `len` positions whose first `dense_len`
    /// positions are stored densely.
    ///
    /// # Panics
    /// Panics if `dense_len > len`.
    #[must_use]
    pub fn with_dense_prefix(len: usize, dense_len: usize) -> Self {
        assert!(
            dense_len <= len,
            "dense prefix {dense_len} exceeds vector length {len}"
        );
        Self {
            len,
            dense: ndarray::Array1::zeros(dense_len),
            tail: BTreeMap::new(),
        }
    }

    /// Copy `values` into positions `0..values.len()`.
    ///
    /// # Panics
    /// Panics if `values` is longer than the vector.
    pub fn copy_prefix<'a>(&mut self, values: impl Into<ndarray::ArrayView1<'a, f32>>) {
        let values = values.into();
        assert!(
            values.len() <= self.len,
            "cannot copy {} values into a vector of length {}",
            values.len(),
            self.len
        );

        let split = values.len().min(self.dense.len());
        self.dense
            .slice_mut(ndarray::s![..split])
            .assign(&values.slice(ndarray::s![..split]));

        for (offset, &value) in values.slice(ndarray::s![split..]).iter().enumerate() {
            self.set(split + offset, value);
        }
    }

    /// Set the value at `index`. Writing zero into the tail removes the entry.
    ///
    /// # Panics
    /// Panics if `index` is out of bounds.
    pub fn set(&mut self, index: usize, value: f32) {
        assert!(
            index < self.len,
            "index {index} out of bounds for vector of length {}",
            self.len
        );

        if index < self.dense.len() {
            self.dense[index] = value;
        } else if value == 0.0 {
            self.tail.remove(&index);
        } else {
            self.tail.insert(index, value);
        }
    }

    /// Value at `index`.
    ///
    /// # Panics
    /// Panics if `index` is out of bounds.
    #[must_use]
    pub fn get(&self, index: usize) -> f32 {
        self[index]
    }

    /// Total number of positions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// True for a zero-length vector.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of densely stored leading positions.
    #[must_use]
    pub fn dense_len(&self) -> usize {
        self.dense.len()
    }

    /// The densely stored prefix.
    #[must_use]
    pub fn dense(&self) -> ndarray::ArrayView1<'_, f32> {
        self.dense.view()
    }

    /// Indices of explicitly stored tail entries, ascending.
    pub fn tail_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.tail.keys().copied()
    }

    /// Number of non-zero positions across prefix and tail.
    #[must_use]
    pub fn nnz(&self) -> usize {
        self.dense.iter().filter(|&&v| v != 0.0).count() + self.tail.len()
    }

    /// Iterate over `(index, value)` for every non-zero position, ascending.
    pub fn iter_nonzero(&self) -> impl Iterator<Item = (usize, f32)> + '_ {
        self.dense
            .iter()
            .copied()
            .enumerate()
            .filter(|&(_, v)| v != 0.0)
            .chain(self.tail.iter().map(|(&i, &v)| (i, v)))
    }

    /// Materialize every position into a dense array.
    ///
    /// This allocates `len` floats, which can be large for hashed vectors.
    #[must_use]
    pub fn to_dense(&self) -> ndarray::Array1<f32> {
        let mut out = ndarray::Array1::zeros(self.len);
        out.slice_mut(ndarray::s![..self.dense.len()])
            .assign(&self.dense);
        for (&i, &v) in &self.tail {
            out[i] = v;
        }
        out
    }
}

impl std::ops::Index<usize> for SparseVector {
    type Output = f32;

    fn index(&self, index: usize) -> &f32 {
        assert!(
            index < self.len,
            "index {index} out of bounds for vector of length {}",
            self.len
        );

        if index < self.dense.len() {
            &self.dense[index]
        } else {
            self.tail.get(&index).unwrap_or(&ZERO)
        }
    }
}
