//! CLI for sentence vectorization.

// CLI binaries need to print user-facing output
#![allow(
    clippy::print_stdout,
    reason = "CLI binary needs stdout for user output"
)]

use eyre::WrapErr as _;

fn main() -> eyre::Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    match args.command {
        Command::Vectorize {
            vectors,
            config,
            buckets,
            no_hashing,
            json,
            sentences,
        } => {
            let config = resolve_config(config.as_deref(), buckets, no_hashing)?;
            vectorize(&vectors, config, json, sentences)?;
        }
        Command::Tokenize { sentences } => {
            tokenize(sentences)?;
        }
        Command::Info { vectors } => {
            info(&vectors)?;
        }
    }

    Ok(())
}

use clap::Parser as _;

#[derive(clap::Parser)]
#[command(name = "sentvec")]
#[command(about = "Sentence vectors from averaged word embeddings and hashed bigrams")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

/// Where word vectors come from and how unknown words are handled.
#[derive(clap::Args)]
struct VectorArgs {
    /// Word vector file in word2vec/fastText/GloVe text format
    #[arg(short, long)]
    vectors: std::path::PathBuf,

    /// Out-of-vocabulary policy: zero, mean, or token:<word>
    #[arg(long, default_value = "zero")]
    oov: sentvec_wordvec::OovPolicy,

    /// Only load the first N words
    #[arg(long)]
    max_words: Option<usize>,
}

impl VectorArgs {
    fn load(&self) -> eyre::Result<sentvec_wordvec::WordVectors> {
        let options = sentvec_wordvec::LoadOptions {
            oov: self.oov.clone(),
            max_words: self.max_words,
        };
        sentvec_wordvec::WordVectors::load_text(&self.vectors, &options)
            .wrap_err("failed to load word vectors")
    }
}

#[derive(clap::Subcommand)]
enum Command {
    /// Vectorize sentences given as arguments, or one per stdin line
    Vectorize {
        #[command(flatten)]
        vectors: VectorArgs,

        /// JSON file with vectorizer settings
        #[arg(short, long)]
        config: Option<std::path::PathBuf>,

        /// Number of bigram hashing buckets (overrides the config file)
        #[arg(short, long)]
        buckets: Option<usize>,

        /// Output only the averaged embedding, without hashed bigrams
        #[arg(long)]
        no_hashing: bool,

        /// Print one JSON object per sentence
        #[arg(long)]
        json: bool,

        /// Sentences to vectorize (reads stdin when empty)
        sentences: Vec<String>,
    },

    /// Show the tokens and bigrams of each sentence
    Tokenize {
        /// Sentences to tokenize (reads stdin when empty)
        sentences: Vec<String>,
    },

    /// Show vocabulary size and dimension of a word vector file
    Info {
        #[command(flatten)]
        vectors: VectorArgs,
    },
}

/// Merge the optional config file with command-line overrides.
fn resolve_config(
    path: Option<&std::path::Path>,
    buckets: Option<usize>,
    no_hashing: bool,
) -> eyre::Result<sentvec_vectorize::VectorizerConfig> {
    let mut config = match path {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .wrap_err_with(|| format!("failed to read config from {}", path.display()))?;
            serde_json::from_str(&text)
                .wrap_err_with(|| format!("failed to parse config from {}", path.display()))?
        }
        None => sentvec_vectorize::VectorizerConfig::default(),
    };

    if let Some(buckets) = buckets {
        config.hashing_buckets = buckets;
    }
    if no_hashing {
        config.use_hashing_trick = false;
    }

    tracing::debug!(?config, "resolved vectorizer config");
    Ok(config)
}

/// Sentences from the command line, or one per line of `input` when none
/// were given. Lines are read as the caller consumes them.
fn read_sentences<'a>(
    sentences: Vec<String>,
    input: impl std::io::BufRead + 'a,
) -> Box<dyn Iterator<Item = eyre::Result<String>> + 'a> {
    if !sentences.is_empty() {
        return Box::new(sentences.into_iter().map(Ok));
    }

    Box::new(
        input
            .lines()
            .map(|line| line.wrap_err("failed to read sentences from stdin")),
    )
}

/// JSON output for one vectorized sentence.
#[derive(serde::Serialize)]
struct JsonVector<'a> {
    sentence: &'a str,
    dim: usize,
    dense: Vec<f32>,
    /// Absolute positions set to 1.0 in the hashed region.
    hashed: Vec<usize>,
}

fn vectorize(
    vectors: &VectorArgs,
    config: sentvec_vectorize::VectorizerConfig,
    json: bool,
    sentences: Vec<String>,
) -> eyre::Result<()> {
    let source = vectors.load()?;
    let vectorizer = sentvec_vectorize::SentenceVectorizer::with_config(source, config)
        .wrap_err("invalid vectorizer configuration")?;

    let mut total = 0;
    let mut skipped = 0;

    for sentence in read_sentences(sentences, std::io::stdin().lock()) {
        let sentence = sentence?;
        total += 1;
        let Some(vector) = vectorizer.vectorize(&sentence) else {
            tracing::warn!(?sentence, "no tokens, skipping");
            skipped += 1;
            continue;
        };

        if json {
            let output = JsonVector {
                sentence: &sentence,
                dim: vector.len(),
                dense: vector.dense().to_vec(),
                hashed: vector.tail_indices().collect(),
            };
            println!(
                "{}",
                serde_json::to_string(&output).wrap_err("failed to serialize JSON")?
            );
        } else {
            let word_dim = vectorizer.word_dim();
            let buckets: Vec<_> = vector.tail_indices().map(|i| i - word_dim).collect();
            println!(
                "{sentence}: dim={} nnz={} buckets={buckets:?}",
                vector.len(),
                vector.nnz()
            );
        }
    }

    if skipped > 0 {
        eprintln!("Skipped {skipped} of {total} sentences with no tokens");
    }

    Ok(())
}

fn tokenize(sentences: Vec<String>) -> eyre::Result<()> {
    for sentence in read_sentences(sentences, std::io::stdin().lock()) {
        let sentence = sentence?;
        let normalized = sentvec_tokenize::normalize(&sentence);
        let tokens = sentvec_tokenize::tokenize(&normalized);
        let bigrams = sentvec_hash::bigrams(&tokens);
        println!("{sentence}");
        println!("  tokens:  {tokens:?}");
        println!("  bigrams: {bigrams:?}");
    }
    Ok(())
}

fn info(vectors: &VectorArgs) -> eyre::Result<()> {
    let table = vectors.load()?;
    println!("words: {}", table.len());
    println!("dim:   {}", table.dim());
    println!("oov:   {}", vectors.oov);
    Ok(())
}
