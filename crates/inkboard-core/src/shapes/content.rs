//! Object content: plain text or a validated image reference.
//!
//! Content never stores markup. Incoming markup (from imported documents) is
//! reduced to its text, or to a single image source that passed URL
//! validation. Outgoing markup is generated from these two variants only, so
//! whatever a host injects into its page is escaped text or one `<img>` tag.

use scraper::{Html, Node};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Text shown in objects created without content.
pub const PLACEHOLDER_TEXT: &str = "Double-click to edit";

/// Rejected image source.
#[derive(Debug, Error, PartialEq)]
pub enum ContentError {
    #[error("invalid image url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("unsupported image source: {0}")]
    UnsupportedSource(String),
}

/// A validated image source. Only `http`, `https` and `data:image/*` URLs pass.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ImageRef(String);

impl ImageRef {
    /// Validate an image source.
    pub fn parse(src: &str) -> Result<Self, ContentError> {
        let src = src.trim();
        let url = Url::parse(src)?;
        match url.scheme() {
            "http" | "https" => Ok(Self(url.to_string())),
            "data" if url.path().to_ascii_lowercase().starts_with("image/") => Ok(Self(src.to_string())),
            other => Err(ContentError::UnsupportedSource(other.to_string())),
        }
    }

    pub fn src(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ImageRef {
    type Error = ContentError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ImageRef> for String {
    fn from(value: ImageRef) -> Self {
        value.0
    }
}

/// What an object displays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum Content {
    Text(String),
    Image(ImageRef),
}

impl Default for Content {
    fn default() -> Self {
        Content::Text(PLACEHOLDER_TEXT.to_string())
    }
}

impl Content {
    /// Plain text content.
    pub fn text(text: impl Into<String>) -> Self {
        Content::Text(text.into())
    }

    /// Reduce untrusted markup to safe content.
    ///
    /// A fragment holding an `<img>` with an acceptable source and no other
    /// text becomes an image reference; everything else becomes its text,
    /// with `<br>` and block boundaries turned into newlines and script or
    /// style bodies dropped.
    pub fn from_markup(markup: &str) -> Self {
        let fragment = Html::parse_fragment(markup);
        let text = extract_text(&fragment);

        if text.trim().is_empty() {
            let image = fragment.root_element().descendants().find_map(|node| match node.value() {
                Node::Element(el) if el.name() == "img" => el.attr("src").map(ImageRef::parse),
                _ => None,
            });
            match image {
                Some(Ok(image)) => return Content::Image(image),
                Some(Err(e)) => log::warn!("Dropping image reference: {}", e),
                None => {}
            }
        }
        Content::Text(text)
    }

    /// Render content as markup for export. Text is escaped.
    pub fn to_markup(&self) -> String {
        match self {
            Content::Text(text) => escape_text(text),
            Content::Image(image) => format!("<img src=\"{}\" alt=\"\">", escape_text(image.src())),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Content::Text(text) => Some(text),
            Content::Image(_) => None,
        }
    }

    pub fn as_image(&self) -> Option<&ImageRef> {
        match self {
            Content::Image(image) => Some(image),
            Content::Text(_) => None,
        }
    }
}

fn extract_text(fragment: &Html) -> String {
    let mut out = String::new();
    for node in fragment.root_element().descendants() {
        match node.value() {
            Node::Text(text) => {
                let hidden = node.ancestors().any(|a| match a.value() {
                    Node::Element(el) => matches!(el.name(), "script" | "style"),
                    _ => false,
                });
                if !hidden {
                    out.push_str(&**text);
                }
            }
            Node::Element(el) => match el.name() {
                "br" => out.push('\n'),
                "div" | "p" | "li" if !out.is_empty() && !out.ends_with('\n') => out.push('\n'),
                _ => {}
            },
            _ => {}
        }
    }
    out
}

fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            '\n' => out.push_str("<br>"),
            c => out.push(c),
        }
    }
    out
}
