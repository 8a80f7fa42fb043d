//! Text analysis: normalization, tokenization, sentence boundaries.

use std::ops::Range;

use tracing::debug;

/// English stopwords, sorted for binary search.
const STOPWORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "am", "an", "and", "any", "are",
    "as", "at", "be", "because", "been", "before", "being", "below", "between", "both", "but",
    "by", "could", "did", "do", "does", "doing", "down", "during", "each", "few", "for", "from",
    "further", "had", "has", "have", "having", "he", "her", "here", "hers", "herself", "him",
    "himself", "his", "how", "i", "if", "in", "into", "is", "it", "its", "itself", "just", "me",
    "more", "most", "my", "myself", "no", "nor", "not", "now", "of", "off", "on", "once", "only",
    "or", "other", "our", "ours", "ourselves", "out", "over", "own", "same", "she", "should",
    "so", "some", "such", "than", "that", "the", "their", "theirs", "them", "themselves", "then",
    "there", "these", "they", "this", "those", "through", "to", "too", "under", "until", "up",
    "very", "was", "we", "were", "what", "when", "where", "which", "while", "who", "whom", "why",
    "will", "with", "would", "you", "your", "yours", "yourself", "yourselves",
];

/// Irregular plural forms not covered by the suffix rules.
const IRREGULAR_PLURALS: &[(&str, &str)] = &[
    ("children", "child"),
    ("feet", "foot"),
    ("geese", "goose"),
    ("men", "man"),
    ("mice", "mouse"),
    ("teeth", "tooth"),
    ("women", "woman"),
];

/// An annotated token.
#[derive(Debug, Clone)]
pub struct Token {
    /// Original surface form.
    pub surface: String,

    /// Trailing whitespace (after normalization, a single space or nothing).
    pub whitespace: &'static str,

    /// Base form used for the lemma projection.
    pub lemma: String,

    /// Token carries no alphanumeric content.
    pub is_punct: bool,

    /// Token is a bracket character.
    pub is_bracket: bool,

    /// Token is entirely numeric.
    pub is_digit: bool,

    /// Token is a stopword.
    pub is_stop: bool,

    /// Index of the containing sentence.
    pub sentence: usize,
}

impl Token {
    /// Whether the token survives into the lemma projection.
    pub fn is_content(&self) -> bool {
        !(self.is_punct || self.is_bracket || self.is_digit || self.is_stop)
    }
}

/// A token/sentence-annotated document.
#[derive(Debug, Clone, Default)]
pub struct AnalyzedText {
    tokens: Vec<Token>,
    sentences: Vec<Range<usize>>,
}

impl AnalyzedText {
    /// Total token count.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Whether the document contains no tokens.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// The annotated tokens in document order.
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Sentence boundaries as token ranges, contiguous and covering.
    pub fn sentences(&self) -> &[Range<usize>] {
        &self.sentences
    }

    /// Token range of the sentence containing token `index`.
    pub fn sentence_of(&self, index: usize) -> Range<usize> {
        self.sentences[self.tokens[index].sentence].clone()
    }
}

/// Analyze raw text into a token/sentence-annotated structure.
///
/// All runs of whitespace (spaces, tabs, newlines) are collapsed into a
/// single space before tokenization. Never fails; empty or whitespace-only
/// input yields an empty structure.
pub fn analyze(text: &str) -> AnalyzedText {
    let normalized = normalize_whitespace(text);
    let mut tokens = tokenize(&normalized);
    let sentences = assign_sentences(&mut tokens);

    debug!(
        tokens = tokens.len(),
        sentences = sentences.len(),
        "analyzed text"
    );

    AnalyzedText { tokens, sentences }
}

/// Collapse every whitespace run into a single space.
fn normalize_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_whitespace = false;

    for ch in text.chars() {
        if ch.is_whitespace() {
            if !in_whitespace {
                out.push(' ');
            }
            in_whitespace = true;
        } else {
            out.push(ch);
            in_whitespace = false;
        }
    }

    out
}

fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '\''
}

fn is_bracket_char(ch: char) -> bool {
    matches!(ch, '(' | ')' | '[' | ']' | '{' | '}' | '<' | '>')
}

fn is_sentence_terminal(surface: &str) -> bool {
    matches!(surface, "." | "!" | "?" | "…")
}

/// Split normalized text into word and punctuation tokens, recording the
/// trailing whitespace of each.
fn tokenize(text: &str) -> Vec<Token> {
    let mut tokens: Vec<Token> = Vec::new();
    let mut chars = text.char_indices().peekable();

    while let Some((start, ch)) = chars.next() {
        if ch.is_whitespace() {
            if let Some(last) = tokens.last_mut() {
                last.whitespace = " ";
            }
            continue;
        }

        let end = if is_word_char(ch) {
            let mut end = start + ch.len_utf8();
            while let Some(&(i, next)) = chars.peek() {
                if !is_word_char(next) {
                    break;
                }
                end = i + next.len_utf8();
                chars.next();
            }
            end
        } else {
            start + ch.len_utf8()
        };

        tokens.push(classify(&text[start..end]));
    }

    tokens
}

/// Build a token with its lemma and filter flags. Sentence index is assigned
/// in a second pass.
fn classify(surface: &str) -> Token {
    let is_punct = !surface.chars().any(|c| c.is_alphanumeric());
    let is_bracket = surface.chars().all(is_bracket_char);
    let is_digit = surface.chars().all(|c| c.is_numeric());
    let lower = surface.to_lowercase();

    let (lemma, is_stop) = if is_punct {
        (surface.to_string(), false)
    } else {
        let is_stop = STOPWORDS.binary_search(&lower.as_str()).is_ok();
        (lemmatize(&lower), is_stop)
    };

    Token {
        surface: surface.to_string(),
        whitespace: "",
        lemma,
        is_punct,
        is_bracket,
        is_digit,
        is_stop,
        sentence: 0,
    }
}

/// Reduce a lowercased word to its base form.
///
/// Rule-based: irregular plurals plus conservative plural suffix stripping.
fn lemmatize(word: &str) -> String {
    for (plural, base) in IRREGULAR_PLURALS {
        if word == *plural {
            return (*base).to_string();
        }
    }

    if word.len() > 4 {
        if let Some(stem) = word.strip_suffix("ies") {
            return format!("{}y", stem);
        }
    }

    if word.len() > 4 {
        for suffix in ["sses", "xes", "zes", "ches", "shes"] {
            if let Some(stem) = word.strip_suffix(suffix) {
                // keep the base consonant, drop the "es"
                return format!("{}{}", stem, &suffix[..suffix.len() - 2]);
            }
        }
    }

    if word.len() > 3
        && word.ends_with('s')
        && !word.ends_with("ss")
        && !word.ends_with("us")
        && !word.ends_with("is")
    {
        return word[..word.len() - 1].to_string();
    }

    word.to_string()
}

/// Assign sentence indices and return the sentence boundary ranges.
///
/// A sentence closes after a terminal punctuation token; any trailing tokens
/// without a terminal form the final sentence.
fn assign_sentences(tokens: &mut [Token]) -> Vec<Range<usize>> {
    let mut sentences = Vec::new();
    let mut sent_start = 0;

    for i in 0..tokens.len() {
        tokens[i].sentence = sentences.len();
        if is_sentence_terminal(&tokens[i].surface) {
            sentences.push(sent_start..i + 1);
            sent_start = i + 1;
        }
    }

    if sent_start < tokens.len() {
        sentences.push(sent_start..tokens.len());
    }

    sentences
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input() {
        let doc = analyze("");
        assert!(doc.is_empty());
        assert!(doc.sentences().is_empty());

        let doc = analyze("   \n\t  ");
        assert!(doc.is_empty());
    }

    #[test]
    fn test_whitespace_collapsed() {
        let doc = analyze("one\n\ttwo   three");
        let text: String = doc
            .tokens()
            .iter()
            .map(|t| format!("{}{}", t.surface, t.whitespace))
            .collect();
        assert_eq!(text, "one two three");
    }

    #[test]
    fn test_token_flags() {
        let doc = analyze("The cat sat on 3 mats!!");
        let flags: Vec<(&str, bool, bool, bool)> = doc
            .tokens()
            .iter()
            .map(|t| (t.surface.as_str(), t.is_stop, t.is_digit, t.is_punct))
            .collect();

        assert_eq!(flags[0], ("The", true, false, false));
        assert_eq!(flags[1], ("cat", false, false, false));
        assert_eq!(flags[3], ("on", true, false, false));
        assert_eq!(flags[4], ("3", false, true, false));
        assert_eq!(flags[6], ("!", false, false, true));
    }

    #[test]
    fn test_brackets_flagged() {
        let doc = analyze("value (see appendix)");
        let bracket = doc.tokens().iter().find(|t| t.surface == "(").unwrap();
        assert!(bracket.is_bracket);
        assert!(bracket.is_punct);
    }

    #[test]
    fn test_lemmatize_plurals() {
        assert_eq!(lemmatize("mats"), "mat");
        assert_eq!(lemmatize("cats"), "cat");
        assert_eq!(lemmatize("studies"), "study");
        assert_eq!(lemmatize("boxes"), "box");
        assert_eq!(lemmatize("children"), "child");
        // not stripped
        assert_eq!(lemmatize("glass"), "glass");
        assert_eq!(lemmatize("status"), "status");
        assert_eq!(lemmatize("sleep"), "sleep");
    }

    #[test]
    fn test_sentence_boundaries() {
        let doc = analyze("First one. Second two! Third three?");
        assert_eq!(doc.sentences().len(), 3);

        // every token belongs to exactly one covering range
        for (i, token) in doc.tokens().iter().enumerate() {
            let range = &doc.sentences()[token.sentence];
            assert!(range.contains(&i));
        }

        // ranges are contiguous
        let mut expected_start = 0;
        for range in doc.sentences() {
            assert_eq!(range.start, expected_start);
            expected_start = range.end;
        }
        assert_eq!(expected_start, doc.len());
    }

    #[test]
    fn test_unterminated_trailing_sentence() {
        let doc = analyze("Done here. And then some");
        assert_eq!(doc.sentences().len(), 2);
        let last = doc.sentences().last().unwrap();
        assert_eq!(last.end, doc.len());
    }

    #[test]
    fn test_stopwords_sorted() {
        let mut sorted = STOPWORDS.to_vec();
        sorted.sort_unstable();
        assert_eq!(sorted, STOPWORDS);
    }
}
