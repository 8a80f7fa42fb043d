//! Word-budgeted, sentence-aligned chunking.

use tracing::debug;

use ragdoc_core::TextChunk;

use crate::analyze::AnalyzedText;

/// Group an analyzed document into chunks of approximately `chunk_size`
/// words, each extended so that no boundary falls inside a sentence.
///
/// Windows are contiguous and non-overlapping: each window starts where the
/// previous one ended, and runs to the end of the sentence containing its
/// `chunk_size`-th token. A chunk may therefore exceed `chunk_size` by up to
/// one sentence. `chunk_size >= len` yields a single whole-document chunk.
///
/// Pure and deterministic; identical input always yields identical output.
pub fn chunk(doc: &AnalyzedText, chunk_size: usize) -> Vec<TextChunk> {
    let size = doc.len();
    if size == 0 || chunk_size == 0 {
        return Vec::new();
    }

    let mut chunks = Vec::new();
    let mut start = 0;

    while start < size {
        let end = (start + chunk_size).min(size);

        // align the window to whole sentences
        let sent_start = doc.sentence_of(start).start;
        let sent_end = doc.sentence_of(end - 1).end;

        let window = &doc.tokens()[sent_start..sent_end];

        let text: String = window
            .iter()
            .map(|t| format!("{}{}", t.surface, t.whitespace))
            .collect();

        let lemma: String = window
            .iter()
            .filter(|t| t.is_content())
            .map(|t| t.lemma.as_str())
            .collect::<Vec<_>>()
            .join(" ");

        chunks.push(TextChunk { text, lemma });

        start = sent_end;
    }

    debug!(chunks = chunks.len(), chunk_size, "chunked document");

    chunks
}
