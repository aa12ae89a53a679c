//! Token estimate for the merged document.
//!
//! Reviewers feeding the document to a language model want to know how
//! large it is. Uses tiktoken-rs, falling back to a character heuristic
//! if a tokenizer cannot be loaded.

use std::sync::OnceLock;

use tiktoken_rs::CoreBPE;

/// Token encoding to use for counting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Encoding {
    /// cl100k_base: GPT-4, GPT-3.5-turbo
    #[default]
    Cl100kBase,
    /// o200k_base: GPT-4o
    O200kBase,
}

impl std::fmt::Display for Encoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Encoding::Cl100kBase => write!(f, "cl100k_base"),
            Encoding::O200kBase => write!(f, "o200k_base"),
        }
    }
}

impl std::str::FromStr for Encoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cl100k" | "cl100k_base" => Ok(Encoding::Cl100kBase),
            "o200k" | "o200k_base" => Ok(Encoding::O200kBase),
            _ => Err(format!("unknown encoding: {}", s)),
        }
    }
}

static CL100K: OnceLock<Option<CoreBPE>> = OnceLock::new();
static O200K: OnceLock<Option<CoreBPE>> = OnceLock::new();

fn tokenizer(encoding: Encoding) -> Option<&'static CoreBPE> {
    let cell = match encoding {
        Encoding::Cl100kBase => &CL100K,
        Encoding::O200kBase => &O200K,
    };
    cell.get_or_init(|| match encoding {
        Encoding::Cl100kBase => tiktoken_rs::cl100k_base().ok(),
        Encoding::O200kBase => tiktoken_rs::o200k_base().ok(),
    })
    .as_ref()
}

/// Estimate the number of tokens in `text`.
///
/// Never fails: roughly four bytes per token when no tokenizer loads.
///
/// # Examples
///
/// ```
/// use srcmerge::tokens::{estimate_tokens, Encoding};
///
/// assert!(estimate_tokens("console.log(1);", Encoding::Cl100kBase) > 0);
/// assert_eq!(estimate_tokens("", Encoding::O200kBase), 0);
/// ```
pub fn estimate_tokens(text: &str, encoding: Encoding) -> usize {
    if text.is_empty() {
        return 0;
    }
    match tokenizer(encoding) {
        Some(bpe) => bpe.encode_ordinary(text).len(),
        None => text.len().div_ceil(4),
    }
}
