//! Image references accepted by the relays.
//!
//! Browsers hand us either a public URL or the `FileReader` output of a local
//! file, which is a base64 `data:` URL. Anything else is rejected before any
//! upstream call is made.

use core::fmt;

use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};

/// Base64 engine that accepts payloads with or without trailing padding.
const LENIENT_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Errors that can occur when parsing an [`ImageRef`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ImageRefError {
    /// No image was supplied (absent, not a string, or empty).
    #[error("Missing image data")]
    Missing,
    /// The input is neither an http(s) URL nor a data URL.
    #[error("Unsupported image format")]
    UnsupportedFormat,
    /// The input starts with `data:` but has no `,` separating header and payload.
    #[error("Malformed data URL")]
    MalformedDataUrl,
    /// The data URL payload is not valid base64.
    #[error("Invalid base64 payload")]
    InvalidBase64,
}

/// An image as supplied by a client.
///
/// ## Examples
///
/// ```
/// use righthair_core::{ImageExtension, ImageRef};
///
/// let remote = ImageRef::parse("https://cdn.example/face.jpg").unwrap();
/// assert!(matches!(remote, ImageRef::Remote(_)));
///
/// let inline = ImageRef::parse("data:image/webp;base64,AAAA").unwrap();
/// let ImageRef::Inline(data) = inline else { panic!("expected data URL") };
/// assert_eq!(data.extension(), ImageExtension::Webp);
///
/// assert!(ImageRef::parse("ftp://nope").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageRef {
    /// A network-addressable `http://` or `https://` URL, kept verbatim.
    Remote(String),
    /// An inline base64 data URL.
    Inline(DataUrl),
}

impl ImageRef {
    /// Parse a client-supplied image string.
    ///
    /// # Errors
    ///
    /// Returns [`ImageRefError::Missing`] for an empty string,
    /// [`ImageRefError::UnsupportedFormat`] for anything that is not an
    /// http(s) or data URL, and [`ImageRefError::MalformedDataUrl`] for a
    /// data URL without a payload separator.
    pub fn parse(input: &str) -> Result<Self, ImageRefError> {
        if input.is_empty() {
            return Err(ImageRefError::Missing);
        }

        if input.starts_with("http://") || input.starts_with("https://") {
            return Ok(Self::Remote(input.to_owned()));
        }

        if input.starts_with("data:") {
            return DataUrl::parse(input).map(Self::Inline);
        }

        Err(ImageRefError::UnsupportedFormat)
    }
}

/// A parsed `data:<mime>;base64,<payload>` URL.
///
/// The payload is kept encoded; call [`DataUrl::decode`] to get the bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUrl {
    mime: Option<String>,
    payload: String,
}

impl DataUrl {
    /// Parse a data URL.
    ///
    /// The MIME type is everything between `data:` and the last `;base64`
    /// marker in the header. A header without the marker yields no MIME type.
    ///
    /// # Errors
    ///
    /// Returns [`ImageRefError::UnsupportedFormat`] if the input does not
    /// start with `data:` and [`ImageRefError::MalformedDataUrl`] if there is
    /// no `,` separator.
    pub fn parse(input: &str) -> Result<Self, ImageRefError> {
        let rest = input
            .strip_prefix("data:")
            .ok_or(ImageRefError::UnsupportedFormat)?;
        let (header, payload) = rest
            .split_once(',')
            .ok_or(ImageRefError::MalformedDataUrl)?;

        let mime = header
            .rfind(";base64")
            .and_then(|idx| header.get(..idx))
            .filter(|mime| !mime.is_empty())
            .map(str::to_owned);

        Ok(Self {
            mime,
            payload: payload.to_owned(),
        })
    }

    /// The declared MIME type, if any.
    #[must_use]
    pub fn mime(&self) -> Option<&str> {
        self.mime.as_deref()
    }

    /// File extension to store this image under.
    #[must_use]
    pub fn extension(&self) -> ImageExtension {
        ImageExtension::from_mime(self.mime())
    }

    /// Decode the base64 payload.
    ///
    /// ASCII whitespace inside the payload is ignored and trailing padding
    /// is optional.
    ///
    /// # Errors
    ///
    /// Returns [`ImageRefError::InvalidBase64`] if the payload is not base64.
    pub fn decode(&self) -> Result<Vec<u8>, ImageRefError> {
        let compact: String = self
            .payload
            .chars()
            .filter(|c| !c.is_ascii_whitespace())
            .collect();

        LENIENT_BASE64
            .decode(compact.as_bytes())
            .map_err(|_| ImageRefError::InvalidBase64)
    }
}

/// Extensions used for stored uploads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageExtension {
    Jpg,
    Png,
    Webp,
}

impl ImageExtension {
    /// Infer the extension from a MIME type, defaulting to PNG.
    #[must_use]
    pub fn from_mime(mime: Option<&str>) -> Self {
        let Some(mime) = mime else {
            return Self::Png;
        };

        if mime.contains("jpeg") || mime.contains("jpg") {
            Self::Jpg
        } else if mime.contains("webp") {
            Self::Webp
        } else {
            Self::Png
        }
    }

    /// Extension without the leading dot.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Jpg => "jpg",
            Self::Png => "png",
            Self::Webp => "webp",
        }
    }
}

impl fmt::Display for ImageExtension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
