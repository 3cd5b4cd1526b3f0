use biblatex::{Bibliography, Chunk, Spanned};
use lazy_static::lazy_static;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    static ref WHITESPACE_RUN: Regex = Regex::new(r"\s+").unwrap();
}

const SCRATCH_KEY: &str = "scratch";

/// Concatenate decoded chunks; math keeps its `$` delimiters
fn chunks_to_string(chunks: &[Spanned<Chunk>]) -> String {
    chunks
        .iter()
        .map(|c| match &c.v {
            Chunk::Normal(s) | Chunk::Verbatim(s) => s.clone(),
            Chunk::Math(s) => format!("${}$", s),
        })
        .collect()
}

/// Run one braced value through biblatex's field decoding
fn decode_with_biblatex(text: &str) -> Option<String> {
    let source = format!("@misc{{{}, note = {{{}}}}}", SCRATCH_KEY, text);
    let bibliography = Bibliography::parse(&source).ok()?;
    let chunks = bibliography.get(SCRATCH_KEY)?.get("note")?;
    Some(chunks_to_string(chunks))
}

/// Decode LaTeX accents, escapes and protective braces into plain Unicode.
///
/// Whitespace runs collapse to one space and the result is NFC-normalised.
/// Text biblatex cannot read (unbalanced braces, say) is only normalised.
pub fn latex_to_unicode(text: &str) -> String {
    let decoded = if text.contains(['\\', '{', '}', '$']) {
        decode_with_biblatex(text).unwrap_or_else(|| text.to_string())
    } else {
        text.to_string()
    };
    WHITESPACE_RUN.replace_all(&decoded, " ").nfc().collect()
}
