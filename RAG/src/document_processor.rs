use crate::models::*;
use anyhow::{anyhow, Context, Result};
use pdf_extract::extract_text;
use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;
use unicode_segmentation::UnicodeSegmentation;
use uuid::Uuid;

/// Cuts normalised text into fixed-size character windows that overlap by
/// `chunk_overlap` characters. Window edges snap to word boundaries when one
/// is available.
#[derive(Debug, Clone, Copy)]
pub struct TextSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl TextSplitter {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(anyhow!("chunk size must be greater than zero"));
        }
        if chunk_overlap >= chunk_size {
            return Err(anyhow!(
                "chunk overlap ({}) must be smaller than chunk size ({})",
                chunk_overlap,
                chunk_size
            ));
        }
        Ok(Self {
            chunk_size,
            chunk_overlap,
        })
    }

    pub fn split(&self, text: &str) -> Vec<DocumentChunk> {
        let normalized = normalize_whitespace(text);
        if normalized.is_empty() {
            return Vec::new();
        }

        // char index -> byte offset
        let char_offsets: Vec<usize> = normalized.char_indices().map(|(b, _)| b).collect();
        let total = char_offsets.len();

        // Windows end where a word ends and start where a word starts, so
        // punctuation stays glued to its word.
        let mut word_ends = Vec::new();
        let mut word_starts = Vec::new();
        let mut prev_space = false;
        for (byte, segment) in normalized.split_word_bound_indices() {
            let is_space = segment.chars().all(char::is_whitespace);
            if let Ok(idx) = char_offsets.binary_search(&byte) {
                if is_space && idx > 0 {
                    word_ends.push(idx);
                } else if prev_space && !is_space {
                    word_starts.push(idx);
                }
            }
            prev_space = is_space;
        }

        let byte_at = |idx: usize| char_offsets.get(idx).copied().unwrap_or(normalized.len());

        let mut chunks = Vec::new();
        let mut start = 0;
        loop {
            let hard_end = (start + self.chunk_size).min(total);
            let end = if hard_end == total {
                total
            } else {
                word_ends
                    .iter()
                    .rev()
                    .find(|&&b| b <= hard_end && b > start + self.chunk_overlap)
                    .copied()
                    .unwrap_or(hard_end)
            };

            let window = &normalized[byte_at(start)..byte_at(end)];
            let content = window.trim();
            if !content.is_empty() {
                // offsets follow the trimmed content
                let leading = window.chars().take_while(|c| c.is_whitespace()).count();
                let trailing = window.chars().rev().take_while(|c| c.is_whitespace()).count();
                chunks.push(DocumentChunk {
                    id: Uuid::new_v4().to_string(),
                    content: content.to_string(),
                    start_position: start + leading,
                    end_position: end - trailing,
                });
            }

            if end == total {
                break;
            }

            let next = end - self.chunk_overlap;
            start = word_starts
                .iter()
                .find(|&&b| b >= next && b < end)
                .or_else(|| word_starts.iter().rev().find(|&&b| b < next && b > start))
                .copied()
                .unwrap_or(next);
        }

        log::debug!("Created {} chunks", chunks.len());
        chunks
    }
}

pub struct DocumentProcessor {
    splitter: TextSplitter,
}

impl DocumentProcessor {
    pub fn new(splitter: TextSplitter) -> Self {
        Self { splitter }
    }

    /// Loads a single document and splits it into chunks.
    pub async fn process_document(&self, file_path: &Path) -> Result<Document> {
        let filename = file_path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| file_path.display().to_string());

        log::info!("Loading document: {}", filename);

        let content = load_text(file_path).await?;
        if content.trim().is_empty() {
            return Err(anyhow!("document {} contains no text", file_path.display()));
        }

        let chunks = self.splitter.split(&content);
        log::info!("Split {} into {} chunks", filename, chunks.len());

        Ok(Document {
            id: Uuid::new_v4().to_string(),
            filename,
            content,
            chunks,
        })
    }
}

async fn load_text(file_path: &Path) -> Result<String> {
    let is_pdf = file_path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false);

    if is_pdf {
        let path = file_path.to_path_buf();
        let context = || format!("failed to extract text from {}", file_path.display());
        tokio::task::spawn_blocking(move || extract_text(&path))
            .await
            .with_context(context)?
            .with_context(context)
    } else {
        tokio::fs::read_to_string(file_path)
            .await
            .with_context(|| format!("failed to read {}", file_path.display()))
    }
}

fn normalize_whitespace(text: &str) -> String {
    static WHITESPACE: OnceLock<Regex> = OnceLock::new();
    let re = WHITESPACE.get_or_init(|| Regex::new(r"\s+").expect("valid whitespace regex"));
    re.replace_all(text, " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn sample_text() -> String {
        "The robot woke up in a quiet workshop. It looked around and saw tools everywhere. \
         Nobody had told it what to build, so it started with a small wooden bird. \
         The bird could not fly, but the robot was proud of it anyway."
            .repeat(4)
    }

    #[test]
    fn rejects_overlap_not_smaller_than_size() {
        assert!(TextSplitter::new(0, 0).is_err());
        assert!(TextSplitter::new(10, 10).is_err());
        assert!(TextSplitter::new(10, 9).is_ok());
    }

    #[test]
    fn empty_text_has_no_chunks() {
        let splitter = TextSplitter::new(100, 10).unwrap();
        assert!(splitter.split("").is_empty());
        assert!(splitter.split(" \n\t ").is_empty());
    }

    #[test]
    fn short_text_is_a_single_chunk() {
        let splitter = TextSplitter::new(100, 10).unwrap();
        let chunks = splitter.split("  hello\n\nworld  ");
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].content, "hello world");
        assert_eq!((chunks[0].start_position, chunks[0].end_position), (0, 11));
    }

    #[test]
    fn chunks_respect_size_and_overlap() {
        let splitter = TextSplitter::new(80, 20).unwrap();
        let chunks = splitter.split(&sample_text());
        assert!(chunks.len() > 3);

        for chunk in &chunks {
            assert!(chunk.content.chars().count() <= 80, "{:?}", chunk.content);
            assert!(chunk.end_position - chunk.start_position <= 80);
        }
        for pair in chunks.windows(2) {
            assert!(pair[1].start_position > pair[0].start_position);
            assert!(pair[1].start_position < pair[0].end_position, "windows must overlap");
        }
    }

    #[test]
    fn chunks_do_not_cut_words() {
        let splitter = TextSplitter::new(40, 8).unwrap();
        let text = sample_text();
        let words: std::collections::HashSet<&str> = text.split_whitespace().collect();
        for chunk in splitter.split(&text) {
            for word in chunk.content.split_whitespace() {
                assert!(words.contains(word), "cut word {:?} in {:?}", word, chunk.content);
            }
        }
    }

    #[test]
    fn covers_whole_text() {
        let splitter = TextSplitter::new(64, 16).unwrap();
        let text = sample_text();
        let normalized = normalize_whitespace(&text);
        let chunks = splitter.split(&text);
        assert_eq!(chunks.first().unwrap().start_position, 0);
        assert_eq!(chunks.last().unwrap().end_position, normalized.chars().count());
        for pair in chunks.windows(2) {
            assert!(pair[1].start_position <= pair[0].end_position);
        }
    }

    #[test]
    fn offsets_locate_the_chunk_content() {
        let text = sample_text();
        let normalized: Vec<char> = normalize_whitespace(&text).chars().collect();
        for (size, overlap) in [(40, 8), (64, 16), (100, 10)] {
            let splitter = TextSplitter::new(size, overlap).unwrap();
            for chunk in splitter.split(&text) {
                let slice: String = normalized[chunk.start_position..chunk.end_position]
                    .iter()
                    .collect();
                assert_eq!(slice, chunk.content);
            }
        }
    }

    #[test]
    fn long_unbroken_word_still_progresses() {
        let splitter = TextSplitter::new(10, 3).unwrap();
        let chunks = splitter.split(&"x".repeat(35));
        assert!(chunks.iter().all(|c| c.content.chars().count() <= 10));
        assert_eq!(chunks.last().unwrap().end_position, 35);
    }

    #[test]
    fn handles_multibyte_text() {
        let splitter = TextSplitter::new(12, 4).unwrap();
        let chunks = splitter.split("Sebuah robot kecil bermimpi tentang bintang-bintang ☆ di langit");
        assert!(!chunks.is_empty());
        assert!(chunks.iter().all(|c| c.content.chars().count() <= 12));
    }

    #[tokio::test]
    async fn processes_text_files() {
        let mut file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        write!(file, "{}", sample_text()).unwrap();

        let processor = DocumentProcessor::new(TextSplitter::new(100, 10).unwrap());
        let document = processor.process_document(file.path()).await.unwrap();

        assert!(document.filename.ends_with(".txt"));
        assert!(document.content.contains("wooden bird"));
        assert!(!document.chunks.is_empty());
    }

    #[tokio::test]
    async fn corrupt_pdf_is_an_error_naming_the_file() {
        let mut file = tempfile::Builder::new()
            .prefix("broken-report")
            .suffix(".pdf")
            .tempfile()
            .unwrap();
        write!(file, "this is not a pdf document").unwrap();

        let processor = DocumentProcessor::new(TextSplitter::new(100, 10).unwrap());
        let err = processor.process_document(file.path()).await.unwrap_err();
        assert!(format!("{:#}", err).contains("broken-report"), "{:#}", err);
    }

    #[tokio::test]
    async fn empty_or_missing_files_are_errors() {
        let processor = DocumentProcessor::new(TextSplitter::new(100, 10).unwrap());

        let empty = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        assert!(processor.process_document(empty.path()).await.is_err());

        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.txt");
        let err = processor.process_document(&missing).await.unwrap_err();
        assert!(err.to_string().contains("missing.txt"));
    }
}
