//! Bigram extraction and hashing-trick bucket placement.
//!
//! Bigrams of adjacent tokens are hashed into a fixed number of buckets so
//! local word order can be represented without a vocabulary. Collisions are
//! accepted in exchange for bounded memory.

/// Initial state of the rolling hash.
pub const HASH_SEED: u64 = 3_074_457_345_618_258_791;

/// Multiplier applied after each code unit.
pub const HASH_MULTIPLIER: u64 = 3_074_457_345_618_258_799;

/// Bigrams are only produced for token sequences at least this long.
pub const BIGRAM_MIN_TOKENS: usize = 3;

/// Rolling multiplicative hash over the UTF-16 code units of `token`.
///
/// Arithmetic wraps modulo 2^64. For ASCII input the code units are the
/// byte values.
#[must_use]
pub fn hash_token(token: &str) -> u64 {
    token.encode_utf16().fold(HASH_SEED, |h, unit| {
        h.wrapping_add(u64::from(unit)).wrapping_mul(HASH_MULTIPLIER)
    })
}

/// Bucket for a hash value within a region of `buckets` positions.
///
/// Returns `1 + hash % (buckets - 1)`, so bucket 0 is never produced. The
/// reserved bucket is kept for output compatibility with existing vectors.
///
/// # Panics
/// Panics if `buckets < 2`.
#[must_use]
pub fn bucket_index(hash: u64, buckets: usize) -> usize {
    assert!(buckets >= 2, "hashing needs at least 2 buckets, got {buckets}");
    let modulus = (buckets - 1) as u64;
    // The remainder is below `buckets - 1`, which already fits in usize.
    1 + (hash % modulus) as usize
}

/// Concatenate each pair of adjacent tokens, in order.
///
/// Sequences shorter than [`BIGRAM_MIN_TOKENS`] produce nothing, so a
/// two-token sentence has no bigrams.
#[must_use]
pub fn bigrams<T: AsRef<str>>(tokens: &[T]) -> Vec<String> {
    if tokens.len() < BIGRAM_MIN_TOKENS {
        return Vec::new();
    }

    tokens
        .windows(2)
        .map(|pair| {
            let (left, right) = (pair[0].as_ref(), pair[1].as_ref());
            let mut bigram = String::with_capacity(left.len() + right.len());
            bigram.push_str(left);
            bigram.push_str(right);
            bigram
        })
        .collect()
}

/// Bucket of every bigram of `tokens`, in bigram order. Duplicates are kept.
pub fn bigram_buckets<T: AsRef<str>>(
    tokens: &[T],
    buckets: usize,
) -> impl Iterator<Item = usize> {
    bigrams(tokens)
        .into_iter()
        .map(move |bigram| bucket_index(hash_token(&bigram), buckets))
}
