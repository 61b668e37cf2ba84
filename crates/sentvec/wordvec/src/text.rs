//! Text word vector format.
//!
//! One word per line followed by its space-separated components:
//!
//! ```text
//! 2 3
//! dog 0.1 0.2 0.3
//! cat 0.4 0.5 0.6
//! ```
//!
//! The `count dim` header is what word2vec and fastText `.vec` files carry.
//! GloVe files omit it, in which case the width of the first row sets the
//! dimension.
//!
//! Fields are split on ASCII spaces only. fastText vocabularies contain
//! words with other Unicode spaces (U+00A0 and friends) inside them.

use eyre::WrapErr as _;

/// Parse word vectors from the text format.
pub fn parse_text(text: &str, options: &super::LoadOptions) -> eyre::Result<super::WordVectors> {
    let mut lines = text
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim_end()))
        .filter(|(_, line)| !line.is_empty())
        .peekable();

    let mut dim = None;
    let mut expected_words = None;

    if let Some(&(_, first)) = lines.peek()
        && let Some((count, width)) = parse_header(first)
    {
        expected_words = Some(count);
        dim = Some(width);
        lines.next();
    }

    let limit = options.max_words.unwrap_or(usize::MAX);
    let mut vocab = std::collections::HashMap::new();
    let mut data = Vec::new();

    for (line_no, line) in lines {
        if vocab.len() >= limit {
            break;
        }

        let mut fields = split_fields(line);
        let Some(word) = fields.next() else {
            continue;
        };

        let start = data.len();
        for field in fields {
            let value: f32 = field
                .parse()
                .wrap_err_with(|| format!("line {line_no}: invalid component {field:?}"))?;
            data.push(value);
        }
        let width = data.len() - start;

        let dim = *dim.get_or_insert(width);
        if width != dim {
            eyre::bail!("line {line_no}: {word:?} has {width} components, expected {dim}");
        }

        if vocab.contains_key(word) {
            tracing::debug!(line_no, word, "skipping repeated word");
            data.truncate(start);
            continue;
        }
        vocab.insert(word.to_string(), vocab.len());
    }

    let Some(dim) = dim else {
        eyre::bail!("no word vectors found");
    };

    if let Some(expected) = expected_words
        && options.max_words.is_none()
        && expected != vocab.len()
    {
        tracing::warn!(
            expected,
            found = vocab.len(),
            "header word count does not match file contents"
        );
    }

    let matrix = ndarray::Array2::from_shape_vec((vocab.len(), dim), data)
        .wrap_err("failed to shape embedding matrix")?;

    super::WordVectors::from_parts(vocab, matrix, &options.oov)
}

/// Recognize a `count dim` header line.
fn parse_header(line: &str) -> Option<(usize, usize)> {
    let mut fields = split_fields(line);
    let count = fields.next()?.parse().ok()?;
    let dim = fields.next()?.parse().ok()?;
    if fields.next().is_some() {
        return None;
    }
    Some((count, dim))
}

/// Non-empty space-separated fields of a row.
fn split_fields(line: &str) -> impl Iterator<Item = &str> {
    line.split(' ').filter(|field| !field.is_empty())
}
