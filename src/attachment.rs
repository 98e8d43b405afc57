//! File attachments referenced by path and read at dispatch time.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::MailError;

/// Type of attachment disposition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AttachmentType {
    /// Regular attachment (shown as downloadable file)
    #[default]
    Attachment,
    /// Inline attachment (embedded in HTML via cid:)
    Inline,
}

/// Options accepted by [`Message::attach_with`](crate::Message::attach_with).
///
/// ```
/// use letterbox::AttachOptions;
///
/// let options = AttachOptions::new()
///     .filename("invoice-2024.pdf")
///     .content_type("application/pdf");
/// ```
#[derive(Debug, Clone, Default)]
pub struct AttachOptions {
    filename: Option<String>,
    content_type: Option<String>,
    inline: bool,
    content_id: Option<String>,
}

impl AttachOptions {
    /// Default options: filename and content type derived from the path.
    pub fn new() -> Self {
        Self::default()
    }

    /// Name shown to the recipient instead of the file's own name.
    pub fn filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    /// Explicit MIME type instead of guessing from the extension.
    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Embed the file inline (referenced from HTML with `cid:`).
    pub fn inline(mut self) -> Self {
        self.inline = true;
        self
    }

    /// Content-ID for inline attachments. Implies [`inline`](Self::inline).
    pub fn content_id(mut self, cid: impl Into<String>) -> Self {
        self.inline = true;
        self.content_id = Some(cid.into());
        self
    }
}

/// A reference to a file that will be attached when the message is dispatched.
///
/// Nothing is read from disk when the attachment is created; [`load`](Self::load)
/// reads the file and fails with [`MailError::AttachmentNotFound`] if it is gone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// File to read at dispatch time
    pub path: PathBuf,
    /// Filename presented to the recipient
    pub filename: String,
    /// MIME content type (e.g., "application/pdf", "image/png")
    pub content_type: String,
    /// Whether this is an inline or regular attachment
    pub disposition: AttachmentType,
    /// Content-ID for inline attachments (used as cid: reference)
    pub content_id: Option<String>,
}

impl Attachment {
    /// Reference a file with default options.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        Self::with_options(path, AttachOptions::default())
    }

    /// Reference a file, applying `options`.
    pub fn with_options(path: impl AsRef<Path>, options: AttachOptions) -> Self {
        let path = path.as_ref();

        let filename = options.filename.unwrap_or_else(|| {
            path.file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("attachment")
                .to_string()
        });

        let content_type = options.content_type.unwrap_or_else(|| {
            mime_guess::from_path(&filename)
                .first_or_octet_stream()
                .to_string()
        });

        let (disposition, content_id) = if options.inline {
            let cid = options.content_id.unwrap_or_else(|| filename.clone());
            (AttachmentType::Inline, Some(cid))
        } else {
            (AttachmentType::Attachment, None)
        };

        Self {
            path: path.to_path_buf(),
            filename,
            content_type,
            disposition,
            content_id,
        }
    }

    /// Check the referenced file can be attached without reading it.
    pub fn check(&self) -> Result<(), MailError> {
        match std::fs::metadata(&self.path) {
            Ok(meta) if meta.is_file() => Ok(()),
            _ => Err(MailError::AttachmentNotFound(self.path.display().to_string())),
        }
    }

    /// Read the file contents.
    ///
    /// # Errors
    ///
    /// - `AttachmentNotFound` - the path does not exist
    /// - `AttachmentRead` - the file exists but could not be read
    pub fn load(&self) -> Result<Vec<u8>, MailError> {
        std::fs::read(&self.path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                MailError::AttachmentNotFound(self.path.display().to_string())
            } else {
                MailError::AttachmentRead(format!("{}: {}", self.path.display(), e))
            }
        })
    }

    /// Check if this is an inline attachment.
    pub fn is_inline(&self) -> bool {
        self.disposition == AttachmentType::Inline
    }
}
