use bytes::Buf;
use chrono::{DateTime, NaiveDate, Utc};

use crate::core::{Error, QColor, Result};
use super::time::{self, TimeSpec};
use super::NULL_STRING;

/// Bytes taken by a serialized `QColor`
pub const COLOR_LEN: usize = 11;

/// Bytes taken by a serialized `QDateTime`
pub const DATE_TIME_LEN: usize = 13;

/// Forward-only cursor over a received datagram
///
/// Every read checks the remaining length first, so a failed read reports
/// [`Error::TooShort`] and leaves the cursor where it was.
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    buf: &'a [u8],
    today: NaiveDate,
}

impl<'a> Reader<'a> {
    /// Creates a reader; `today` anchors time-of-day fields
    pub fn new(buf: &'a [u8], today: NaiveDate) -> Self {
        Reader { buf, today }
    }

    /// Number of unread bytes
    pub fn remaining(&self) -> usize {
        self.buf.remaining()
    }

    fn ensure(&self, len: usize) -> Result<()> {
        if self.buf.remaining() < len {
            return Err(Error::TooShort);
        }
        Ok(())
    }

    /// Reads a 1-byte boolean, any nonzero value is true
    pub fn boolean(&mut self) -> Result<bool> {
        Ok(self.u8()? != 0)
    }

    pub fn u8(&mut self) -> Result<u8> {
        self.ensure(1)?;
        Ok(self.buf.get_u8())
    }

    pub fn u16(&mut self) -> Result<u16> {
        self.ensure(2)?;
        Ok(self.buf.get_u16())
    }

    pub fn u32(&mut self) -> Result<u32> {
        self.ensure(4)?;
        Ok(self.buf.get_u32())
    }

    pub fn i32(&mut self) -> Result<i32> {
        self.ensure(4)?;
        Ok(self.buf.get_i32())
    }

    pub fn u64(&mut self) -> Result<u64> {
        self.ensure(8)?;
        Ok(self.buf.get_u64())
    }

    pub fn f64(&mut self) -> Result<f64> {
        self.ensure(8)?;
        Ok(self.buf.get_f64())
    }

    /// Reads a length-prefixed UTF-8 string
    ///
    /// The null length yields an empty string. Invalid UTF-8 is replaced
    /// rather than rejected.
    pub fn utf8(&mut self) -> Result<String> {
        self.ensure(4)?;
        let len = (&self.buf[..4]).get_u32();
        if len == NULL_STRING {
            self.buf.advance(4);
            return Ok(String::new());
        }

        let len = len as usize;
        self.ensure(len.checked_add(4).ok_or(Error::TooShort)?)?;
        self.buf.advance(4);
        let (text, rest) = self.buf.split_at(len);
        self.buf = rest;
        Ok(String::from_utf8_lossy(text).into_owned())
    }

    /// Reads a `QColor`: spec byte, four channels and padding
    pub fn color(&mut self) -> Result<QColor> {
        self.ensure(COLOR_LEN)?;
        let _spec = self.buf.get_u8();
        let color = QColor {
            alpha: self.buf.get_u16(),
            red: self.buf.get_u16(),
            green: self.buf.get_u16(),
            blue: self.buf.get_u16(),
        };
        self.buf.advance(2);
        Ok(color)
    }

    /// Reads a `QDateTime` and normalizes it to UTC
    pub fn date_time(&mut self) -> Result<DateTime<Utc>> {
        self.ensure(DATE_TIME_LEN)?;
        let mut peek = &self.buf[..DATE_TIME_LEN];
        let julian_day = peek.get_u64();
        let ms = peek.get_u32();
        let spec = TimeSpec::try_from(peek.get_u8())?;
        let value = time::date_time(julian_day, ms, spec)?;
        self.buf.advance(DATE_TIME_LEN);
        Ok(value)
    }

    /// Reads a `QTime`, returning the raw milliseconds and the instant on `today`
    pub fn time_of_day(&mut self) -> Result<(u32, DateTime<Utc>)> {
        let ms = self.u32()?;
        Ok((ms, time::time_of_day(self.today, ms)?))
    }

    /// Day used to anchor time-of-day fields
    pub fn today(&self) -> NaiveDate {
        self.today
    }
}
