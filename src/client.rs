//! Blocking TCP client for the text-rendering daemon.
//!
//! The daemon serves one request at a time per connection, so every call
//! takes the stream lock for the whole request/response exchange.

use std::io::{Read, Write};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};

use parking_lot::Mutex;
use tracing::debug;

use crate::cache::RenderBackend;
use crate::config::Config;
use crate::error::Error;
use crate::protocol::fonts::{parse_font_list, FontRecord};
use crate::protocol::{FONT_ADD_MODE, FONT_LIST_MODE, RENDER_MODE, STATUS_OK, TERMINATOR};

const FONT_LIST_CHUNK: usize = 4096;

pub struct TextwriterClient {
    stream: Mutex<TcpStream>,
}

impl TextwriterClient {
    /// Connects to the daemon named by `config`, applying its timeout to
    /// the connect itself and to every later read and write.
    pub fn connect(config: &Config) -> Result<Self, Error> {
        let addr = resolve(&config.host, config.port)?;
        let timeout = config.timeout();
        let stream = TcpStream::connect_timeout(&addr, timeout).map_err(unavailable)?;
        stream.set_read_timeout(Some(timeout)).map_err(unavailable)?;
        stream.set_write_timeout(Some(timeout)).map_err(unavailable)?;
        debug!(%addr, ?timeout, "connected to renderer");
        Ok(Self {
            stream: Mutex::new(stream),
        })
    }

    /// Sends an encoded render request and returns the image bytes from
    /// the length-prefixed response frame.
    pub fn render(&self, encoded: &[u8]) -> Result<Vec<u8>, Error> {
        let mut stream = self.stream.lock();
        stream.write_all(&[RENDER_MODE]).map_err(unavailable)?;
        stream.write_all(encoded).map_err(unavailable)?;

        let mut len_buf = [0u8; 4];
        stream.read_exact(&mut len_buf).map_err(map_io)?;
        let len = u32::from_be_bytes(len_buf) as usize;
        let mut image = vec![0u8; len];
        stream.read_exact(&mut image).map_err(map_io)?;
        debug!(bytes = len, "render response received");
        Ok(image)
    }

    /// Asks the daemon for the fonts it can render with.
    ///
    /// The response has no length prefix; it ends with a blank line, so
    /// we read until the buffer ends in two terminators.
    pub fn font_list(&self) -> Result<Vec<FontRecord>, Error> {
        let mut stream = self.stream.lock();
        stream.write_all(&[FONT_LIST_MODE]).map_err(unavailable)?;

        let mut buf = Vec::new();
        let mut chunk = [0u8; FONT_LIST_CHUNK];
        while !buf.ends_with(&[TERMINATOR, TERMINATOR]) {
            let n = stream.read(&mut chunk).map_err(map_io)?;
            if n == 0 {
                return Err(Error::Protocol(
                    "connection closed before the font list terminator".into(),
                ));
            }
            buf.extend_from_slice(&chunk[..n]);
        }
        let body = String::from_utf8(buf)
            .map_err(|err| Error::Protocol(format!("font list is not utf-8: {err}")))?;
        parse_font_list(&body)
    }

    /// Asks the daemon to load a font file from its own filesystem.
    /// Returns whether the daemon accepted it.
    pub fn add_font(&self, filename: &str) -> Result<bool, Error> {
        let mut stream = self.stream.lock();
        let mut message = Vec::with_capacity(filename.len() + 2);
        message.push(FONT_ADD_MODE);
        message.extend_from_slice(filename.as_bytes());
        message.push(TERMINATOR);
        stream.write_all(&message).map_err(unavailable)?;

        let mut status = [0u8; 1];
        stream.read_exact(&mut status).map_err(map_io)?;
        Ok(status[0] == STATUS_OK)
    }
}

impl RenderBackend for TextwriterClient {
    fn render(&self, encoded: &[u8]) -> Result<Vec<u8>, Error> {
        TextwriterClient::render(self, encoded)
    }
}

fn resolve(host: &str, port: u16) -> Result<SocketAddr, Error> {
    (host, port)
        .to_socket_addrs()
        .map_err(unavailable)?
        .next()
        .ok_or_else(|| Error::BackendUnavailable(format!("{host}:{port} resolved to no address")))
}

fn map_io(err: std::io::Error) -> Error {
    if err.kind() == std::io::ErrorKind::UnexpectedEof {
        Error::Protocol(format!("connection closed mid-frame: {err}"))
    } else {
        Error::BackendUnavailable(err.to_string())
    }
}

fn unavailable(err: std::io::Error) -> Error {
    Error::BackendUnavailable(err.to_string())
}
