use std::fmt;
use std::io::Error;
use std::result::Result;

use bytes::{BufMut, BytesMut};
use tokio::net::UnixStream;
use tokio_util::codec::{Decoder, Encoder, Framed};

pub type ControlProtocol = Framed<UnixStream, LineCodec>;

/// One line of daemon output
///
/// BIRD prefixes reply lines with a four digit code: `dddd-` continues a
/// reply, `dddd ` ends it and a leading space continues the previous code.
/// Lines without a code are taken as complete replies on their own.
#[derive(Clone, Debug, PartialEq)]
pub struct Line {
    pub code: Option<u16>,
    pub last: bool,
    pub text: String,
}

impl Line {
    fn parse(raw: &str) -> Self {
        let bytes = raw.as_bytes();
        if bytes.len() >= 5 && bytes[..4].iter().all(u8::is_ascii_digit) {
            if let Ok(code) = raw[..4].parse::<u16>() {
                match bytes[4] {
                    b'-' | b' ' => {
                        return Line {
                            code: Some(code),
                            last: bytes[4] == b' ',
                            text: raw[5..].to_string(),
                        }
                    }
                    _ => (),
                }
            }
        }
        if let Some(text) = raw.strip_prefix(' ') {
            return Line {
                code: None,
                last: false,
                text: text.to_string(),
            };
        }
        Line {
            code: None,
            last: true,
            text: raw.to_string(),
        }
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.code {
            Some(code) => write!(
                f,
                "{:04}{}{}",
                code,
                if self.last { ' ' } else { '-' },
                self.text
            ),
            None => write!(f, "{}", self.text),
        }
    }
}

/// Newline framed commands out, [`Line`]s in
#[derive(Debug, Default)]
pub struct LineCodec;

impl LineCodec {
    pub fn new() -> Self {
        Self
    }
}

fn line_from_bytes(bytes: &[u8]) -> Line {
    let text = String::from_utf8_lossy(bytes);
    Line::parse(text.trim_end_matches(|c| c == '\r' || c == '\n'))
}

impl Decoder for LineCodec {
    type Item = Line;
    type Error = Error;

    fn decode(&mut self, buf: &mut BytesMut) -> Result<Option<Self::Item>, Error> {
        match buf.iter().position(|b| *b == b'\n') {
            Some(end) => {
                let raw = buf.split_to(end + 1);
                Ok(Some(line_from_bytes(&raw)))
            }
            None => Ok(None),
        }
    }

    // A daemon closing the socket right after an unterminated reply still counts
    fn decode_eof(&mut self, buf: &mut BytesMut) -> Result<Option<Self::Item>, Error> {
        if let Some(line) = self.decode(buf)? {
            return Ok(Some(line));
        }
        if buf.is_empty() {
            return Ok(None);
        }
        let raw = buf.split_to(buf.len());
        Ok(Some(line_from_bytes(&raw)))
    }
}

impl Encoder<&str> for LineCodec {
    type Error = Error;

    fn encode(&mut self, command: &str, buf: &mut BytesMut) -> Result<(), Error> {
        let command = command.trim_end_matches(|c| c == '\r' || c == '\n');
        buf.reserve(command.len() + 1);
        buf.put_slice(command.as_bytes());
        buf.put_u8(b'\n');
        Ok(())
    }
}
