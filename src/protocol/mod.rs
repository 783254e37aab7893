//! Wire protocol shared with the renderer daemon.
//!
//! One mode byte selects the operation; the rest of the exchange is
//! framed exactly as the daemon expects. The values here have to stay in
//! sync with the daemon side, which is why they are not an enum.

pub mod fonts;
pub mod request;

/// Render an encoded request into image bytes.
pub const RENDER_MODE: u8 = 0x00;
/// List the fonts the daemon knows about.
pub const FONT_LIST_MODE: u8 = 0x01;
/// Install a font from a file readable by the daemon.
pub const FONT_ADD_MODE: u8 = 0x02;

/// Status byte the daemon answers to a successful font installation.
pub const STATUS_OK: u8 = 0x00;

/// Line terminator used by every text field of the protocol.
pub const TERMINATOR: u8 = b'\n';
