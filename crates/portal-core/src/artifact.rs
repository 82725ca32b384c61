#![forbid(unsafe_code)]

//! Synthetic artifacts handed to the platform's save-to-disk mechanism.

/// MIME type of plain-text artifacts.
pub const TEXT_PLAIN: &str = "text/plain";

/// An in-memory file ready for a save hand-off.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Artifact {
    /// Name the browser should save the file under.
    pub filename: String,
    /// MIME type of the contents.
    pub mime: &'static str,
    /// File contents.
    pub contents: String,
}

impl Artifact {
    /// Create a plain-text artifact.
    #[must_use]
    pub fn text(filename: impl Into<String>, contents: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            mime: TEXT_PLAIN,
            contents: contents.into(),
        }
    }

    /// Size of the contents in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.contents.len()
    }

    /// Whether the contents are empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_artifact_is_plain_text() {
        let a = Artifact::text("report.txt", "hello");
        assert_eq!(a.mime, TEXT_PLAIN);
        assert_eq!(a.len(), 5);
        assert!(!a.is_empty());
    }
}
