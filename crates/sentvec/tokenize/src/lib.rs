//! Character-class tokenizer.
//!
//! Splits text into maximal runs of ASCII letters, ASCII digits, or any
//! other non-whitespace characters. Whitespace separates tokens and is
//! never emitted.

/// The character class a token is made of.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenClass {
    /// ASCII letters `a-z` / `A-Z`.
    Alpha,
    /// ASCII digits `0-9`.
    Digit,
    /// Anything that is not an ASCII letter, ASCII digit, or whitespace.
    /// Non-ASCII letters such as `é` land here.
    Other,
}

impl TokenClass {
    /// Classify a character, or `None` for whitespace.
    #[must_use]
    pub fn of(c: char) -> Option<Self> {
        if c.is_ascii_alphabetic() {
            Some(Self::Alpha)
        } else if c.is_ascii_digit() {
            Some(Self::Digit)
        } else if c.is_whitespace() {
            None
        } else {
            Some(Self::Other)
        }
    }
}

/// Trim and lowercase a sentence ahead of tokenization.
///
/// Lowercasing maps each character on its own, so context rules such as the
/// Greek final sigma do not apply: `"ΟΣ"` becomes `"οσ"`.
#[must_use]
pub fn normalize(text: &str) -> String {
    text.trim().chars().flat_map(char::to_lowercase).collect()
}

/// Split `text` into tokens in left-to-right order.
///
/// Case is not touched here; callers that want case-insensitive tokens run
/// [`normalize`] first.
#[must_use]
pub fn tokenize(text: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut current: Option<(usize, TokenClass)> = None;

    for (i, c) in text.char_indices() {
        let class = TokenClass::of(c);

        match (current, class) {
            (Some((_, run)), Some(class)) if run == class => {}
            (Some((start, _)), _) => {
                tokens.push(&text[start..i]);
                current = class.map(|class| (i, class));
            }
            (None, _) => {
                current = class.map(|class| (i, class));
            }
        }
    }

    if let Some((start, _)) = current {
        tokens.push(&text[start..]);
    }

    tokens
}
