//! crates/fact_tutor_core/src/attachments.rs
//!
//! Constructors and validation for the attachments a user can submit with a
//! message: links, PDF uploads, images and plain text.

use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::domain::{Attachment, AttachmentKind};

/// Largest PDF accepted, before base64 encoding.
pub const MAX_PDF_BYTES: usize = 10 * 1024 * 1024;
const PDF_MAGIC: &[u8] = b"%PDF-";
const PDF_DATA_URL_PREFIX: &str = "data:application/pdf;base64,";
const LINK_NAME_CHARS: usize = 40;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AttachmentError {
    #[error("Invalid link '{0}': only http and https URLs are accepted")]
    InvalidUrl(String),
    #[error("The uploaded file is empty")]
    Empty,
    #[error("The uploaded file is not a PDF document")]
    NotPdf,
    #[error("The uploaded file is {0} bytes, above the {} byte limit", MAX_PDF_BYTES)]
    TooLarge(usize),
}

impl Attachment {
    /// A link to a post or article, e.g. a tweet to fact-check.
    pub fn link(url: &str) -> Result<Self, AttachmentError> {
        let url = url.trim();
        let rest = url
            .strip_prefix("https://")
            .or_else(|| url.strip_prefix("http://"))
            .ok_or_else(|| AttachmentError::InvalidUrl(url.to_string()))?;
        if rest.is_empty() || rest.contains(char::is_whitespace) {
            return Err(AttachmentError::InvalidUrl(url.to_string()));
        }
        Ok(Self {
            kind: AttachmentKind::Link,
            content: url.to_string(),
            name: Some(link_name(url)),
        })
    }

    /// Encodes an uploaded PDF as a base64 data URL.
    pub fn pdf(name: impl Into<String>, bytes: &[u8]) -> Result<Self, AttachmentError> {
        if bytes.is_empty() {
            return Err(AttachmentError::Empty);
        }
        if bytes.len() > MAX_PDF_BYTES {
            return Err(AttachmentError::TooLarge(bytes.len()));
        }
        if !bytes.starts_with(PDF_MAGIC) {
            return Err(AttachmentError::NotPdf);
        }
        Ok(Self {
            kind: AttachmentKind::Pdf,
            content: format!("{}{}", PDF_DATA_URL_PREFIX, STANDARD.encode(bytes)),
            name: Some(name.into()),
        })
    }

    pub fn text(content: impl Into<String>) -> Self {
        Self {
            kind: AttachmentKind::Text,
            content: content.into(),
            name: None,
        }
    }

    /// An image given as a URL or data URL.
    pub fn image(content: impl Into<String>, name: Option<String>) -> Self {
        Self {
            kind: AttachmentKind::Image,
            content: content.into(),
            name,
        }
    }

    /// One-line description used when handing attachments to an analyzer.
    pub fn describe(&self) -> String {
        match self.kind {
            AttachmentKind::Link => format!("Lien : {}", self.content),
            AttachmentKind::Text => format!("Texte : {}", self.content),
            AttachmentKind::Pdf => format!(
                "Document PDF : {}",
                self.name.as_deref().unwrap_or("sans nom")
            ),
            AttachmentKind::Image => format!(
                "Image : {}",
                self.name.as_deref().unwrap_or("sans nom")
            ),
        }
    }
}

/// Display name of a link: a bird marker and the first 40 characters, always
/// followed by `...`.
fn link_name(url: &str) -> String {
    let head: String = url.chars().take(LINK_NAME_CHARS).collect();
    format!("🐦 {}...", head)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn links_must_be_http_urls() {
        let link = Attachment::link("  https://twitter.com/user/status/1 ").unwrap();
        assert_eq!(link.kind, AttachmentKind::Link);
        assert_eq!(link.content, "https://twitter.com/user/status/1");
        assert_eq!(
            link.name.as_deref(),
            Some("🐦 https://twitter.com/user/status/1...")
        );

        assert!(matches!(
            Attachment::link("ftp://example.org"),
            Err(AttachmentError::InvalidUrl(_))
        ));
        assert!(Attachment::link("https://").is_err());
        assert!(Attachment::link("https://exa mple.org").is_err());
    }

    #[test]
    fn long_links_are_named_from_their_first_forty_characters() {
        let url = "https://example.org/articles/2024/une-rumeur-sur-linux-et-les-virus";
        let link = Attachment::link(url).unwrap();
        assert_eq!(
            link.name.as_deref(),
            Some("🐦 https://example.org/articles/2024/une-ru...")
        );
        assert_eq!(link.describe(), format!("Lien : {}", url));
    }

    #[test]
    fn pdf_becomes_a_data_url() {
        let pdf = Attachment::pdf("rapport.pdf", b"%PDF-1.7 body").unwrap();
        assert_eq!(pdf.kind, AttachmentKind::Pdf);
        assert_eq!(pdf.name.as_deref(), Some("rapport.pdf"));
        assert!(pdf.content.starts_with(PDF_DATA_URL_PREFIX));

        let encoded = pdf.content.trim_start_matches(PDF_DATA_URL_PREFIX);
        assert_eq!(STANDARD.decode(encoded).unwrap(), b"%PDF-1.7 body");
    }

    #[test]
    fn pdf_validation_rejects_bad_payloads() {
        assert_eq!(Attachment::pdf("a.pdf", b""), Err(AttachmentError::Empty));
        assert_eq!(Attachment::pdf("a.pdf", b"hello"), Err(AttachmentError::NotPdf));

        let mut huge = PDF_MAGIC.to_vec();
        huge.resize(MAX_PDF_BYTES + 1, 0);
        assert_eq!(
            Attachment::pdf("a.pdf", &huge),
            Err(AttachmentError::TooLarge(MAX_PDF_BYTES + 1))
        );
    }

    #[test]
    fn descriptions_name_the_attachment() {
        assert_eq!(Attachment::text("abc").describe(), "Texte : abc");
        assert_eq!(Attachment::image("data:", None).describe(), "Image : sans nom");
    }
}
