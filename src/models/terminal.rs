//! Output line types produced by the command layer.

use std::sync::atomic::{AtomicUsize, Ordering};

/// Text styling for listing entries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextStyle {
    /// Folder entries
    Folder,
    /// Regular file entries
    File,
    /// Names starting with `.`
    Hidden,
}

/// A single line of output with a unique ID.
#[derive(Clone, Debug)]
pub struct OutputLine {
    /// Unique ID for keyed rendering
    pub id: usize,
    pub data: OutputLineData,
}

/// The content of an output line.
#[derive(Clone, Debug, PartialEq)]
pub enum OutputLineData {
    Text(String),
    Error(String),
    Success(String),
    Info(String),
    /// Listing entry (`ls`)
    ListEntry { name: String, style: TextStyle },
}

static OUTPUT_LINE_COUNTER: AtomicUsize = AtomicUsize::new(0);

impl OutputLine {
    fn new(data: OutputLineData) -> Self {
        Self {
            id: OUTPUT_LINE_COUNTER.fetch_add(1, Ordering::Relaxed),
            data,
        }
    }

    pub fn text(s: impl Into<String>) -> Self {
        Self::new(OutputLineData::Text(s.into()))
    }

    pub fn error(s: impl Into<String>) -> Self {
        Self::new(OutputLineData::Error(s.into()))
    }

    pub fn success(s: impl Into<String>) -> Self {
        Self::new(OutputLineData::Success(s.into()))
    }

    pub fn info(s: impl Into<String>) -> Self {
        Self::new(OutputLineData::Info(s.into()))
    }

    pub fn folder_entry(name: impl Into<String>) -> Self {
        Self::new(OutputLineData::ListEntry {
            name: name.into(),
            style: TextStyle::Folder,
        })
    }

    pub fn file_entry(name: impl Into<String>) -> Self {
        let name = name.into();
        let style = if name.starts_with('.') {
            TextStyle::Hidden
        } else {
            TextStyle::File
        };
        Self::new(OutputLineData::ListEntry { name, style })
    }

    /// Plain text of the line, without styling.
    pub fn plain(&self) -> &str {
        match &self.data {
            OutputLineData::Text(s)
            | OutputLineData::Error(s)
            | OutputLineData::Success(s)
            | OutputLineData::Info(s) => s,
            OutputLineData::ListEntry { name, .. } => name,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self.data, OutputLineData::Error(_))
    }
}

impl PartialEq for OutputLine {
    fn eq(&self, other: &Self) -> bool {
        // IDs are unique per line; compare content only
        self.data == other.data
    }
}
