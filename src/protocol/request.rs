//! Render requests and their canonical byte encoding.

use crate::color::normalize_color;
use crate::error::Error;

use super::TERMINATOR;

/// The parameter tuple identifying one rendered text image.
///
/// Equality and hashing are structural over the raw fields; the color
/// strings are compared as written, not as normalized. `"white"` and
/// `"ffffff"` describe the same pixels but are distinct cache
/// identities. Canonicalization happens only inside [`encode`], never
/// at lookup time.
///
/// [`encode`]: RenderRequest::encode
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RenderRequest {
    /// Font family name, forwarded verbatim to the daemon.
    pub font: String,
    /// Point size.
    pub size: u8,
    pub bold: bool,
    pub italic: bool,
    /// Background color specification, any syntax `normalize_color` accepts.
    pub background: String,
    /// Foreground color specification.
    pub foreground: String,
    /// The text to render, at most 255 lines.
    pub text: String,
}

impl RenderRequest {
    /// Serializes the request into its canonical byte form.
    ///
    /// These bytes are both the cache-identity digest input and the wire
    /// payload of a render exchange; the layout cannot change for one
    /// without changing the other. Network byte order throughout. Color
    /// failures propagate as [`Error::InvalidColorSpec`]; a text of more
    /// than 255 lines is [`Error::TooManyLines`], never clamped.
    pub fn encode(&self) -> Result<Vec<u8>, Error> {
        let background = normalize_color(&self.background)?;
        let foreground = normalize_color(&self.foreground)?;
        let lines = self.text.lines().count();
        if lines > 255 {
            return Err(Error::TooManyLines(lines));
        }

        let mut out = Vec::with_capacity(self.font.len() + self.text.len() + 24);
        out.extend_from_slice(self.font.as_bytes());
        out.push(TERMINATOR);
        out.push(self.size);
        out.push(self.bold as u8);
        out.push(self.italic as u8);
        out.extend_from_slice(background.to_hex().as_bytes());
        out.push(TERMINATOR);
        out.extend_from_slice(foreground.to_hex().as_bytes());
        out.push(TERMINATOR);
        out.push(lines as u8);
        out.extend_from_slice(self.text.as_bytes());
        out.push(TERMINATOR);
        Ok(out)
    }
}
