use bytes::{BufMut, Bytes, BytesMut};

use crate::core::QColor;
use super::{MessageType, MAGIC, NULL_STRING};

/// Longest string the length prefix can describe
pub const MAX_STRING_LEN: u32 = NULL_STRING - 1;

fn string_len(len: usize) -> u32 {
    u32::try_from(len).map_or(MAX_STRING_LEN, |len| len.min(MAX_STRING_LEN))
}

/// `QColor::Spec::Rgb`
const COLOR_SPEC_RGB: u8 = 1;

/// Growing big-endian output buffer for one datagram
#[derive(Debug, Default)]
pub struct Writer {
    buf: BytesMut,
}

impl Writer {
    /// Creates an empty writer
    pub fn new() -> Self {
        Writer {
            buf: BytesMut::with_capacity(64),
        }
    }

    /// Creates a writer that already holds the envelope
    pub fn with_envelope(schema: u32, message_type: MessageType) -> Self {
        let mut writer = Writer::new();
        writer.u32(MAGIC);
        writer.u32(schema);
        writer.u32(message_type.into());
        writer
    }

    pub fn boolean(&mut self, value: bool) {
        self.buf.put_u8(value as u8);
    }

    pub fn u8(&mut self, value: u8) {
        self.buf.put_u8(value);
    }

    pub fn u16(&mut self, value: u16) {
        self.buf.put_u16(value);
    }

    pub fn u32(&mut self, value: u32) {
        self.buf.put_u32(value);
    }

    pub fn i32(&mut self, value: i32) {
        self.buf.put_i32(value);
    }

    pub fn u64(&mut self, value: u64) {
        self.buf.put_u64(value);
    }

    pub fn f64(&mut self, value: f64) {
        self.buf.put_f64(value);
    }

    /// Writes a string; the empty string is written as the null length
    ///
    /// Text longer than [`MAX_STRING_LEN`] bytes is cut to that length, the
    /// length prefix cannot express more.
    pub fn utf8(&mut self, text: &str) {
        if text.is_empty() {
            self.buf.put_u32(NULL_STRING);
            return;
        }
        let len = string_len(text.len());
        self.buf.put_u32(len);
        self.buf.put_slice(&text.as_bytes()[..len as usize]);
    }

    /// Writes an RGB `QColor`, always 11 bytes
    pub fn color(&mut self, color: &QColor) {
        self.buf.put_u8(COLOR_SPEC_RGB);
        self.buf.put_u16(color.alpha);
        self.buf.put_u16(color.red);
        self.buf.put_u16(color.green);
        self.buf.put_u16(color.blue);
        self.buf.put_u16(0);
    }

    /// Number of bytes written so far
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Returns the encoded datagram
    pub fn finish(self) -> Bytes {
        self.buf.freeze()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope() {
        let writer = Writer::with_envelope(2, MessageType::Close);
        assert_eq!(
            writer.finish().as_ref(),
            &[0xad, 0xbc, 0xcb, 0xda, 0, 0, 0, 2, 0, 0, 0, 6]
        );
    }

    #[test]
    fn test_empty_string_writes_null_length() {
        let mut writer = Writer::new();
        writer.utf8("");
        assert_eq!(writer.finish().as_ref(), &[0xff, 0xff, 0xff, 0xff]);
    }

    #[test]
    fn test_string_writes_length_and_bytes() {
        let mut writer = Writer::new();
        writer.utf8("FT8");
        assert_eq!(writer.finish().as_ref(), &[0, 0, 0, 3, b'F', b'T', b'8']);
    }

    #[test]
    fn test_string_length_is_capped() {
        assert_eq!(string_len(3), 3);
        assert_eq!(string_len(MAX_STRING_LEN as usize), MAX_STRING_LEN);
        assert_eq!(string_len(NULL_STRING as usize), MAX_STRING_LEN);
        assert_eq!(string_len(usize::MAX), MAX_STRING_LEN);
    }

    #[test]
    fn test_color_is_eleven_bytes() {
        let mut writer = Writer::new();
        writer.color(&QColor::rgb(0, 0xffff, 0));
        assert_eq!(writer.len(), 11);
        assert_eq!(
            writer.finish().as_ref(),
            &[0x01, 0xff, 0xff, 0x00, 0x00, 0xff, 0xff, 0x00, 0x00, 0x00, 0x00]
        );
    }

    #[test]
    fn test_signed_and_float() {
        let mut writer = Writer::new();
        writer.i32(-12);
        writer.f64(1.3);
        writer.boolean(true);
        assert_eq!(
            writer.finish().as_ref(),
            &[0xff, 0xff, 0xff, 0xf4, 0x3f, 0xf4, 0xcc, 0xcc, 0xcc, 0xcc, 0xcc, 0xcd, 0x01]
        );
    }
}
