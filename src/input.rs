//! Unified access to sources of input text.
//!
//! An [`Input`] produces a canonical byte stream (UTF-8 for decoded sources)
//! from one of:
//!
//! - a borrowed or owned byte slice or string,
//! - a wide string (`&[u16]` with UTF-16 surrogate pairs, or `&[u32]`),
//!   converted to UTF-8 on the fly,
//! - an open [`std::fs::File`], with BOM detection for UTF-8/16/32 and
//!   on-demand decoding of single-byte code pages and EBCDIC,
//! - a generic [`std::io::Read`] stream, passed through unchanged.
//!
//! `get` fills a caller buffer with up to `n` bytes and honours `n` exactly:
//! UTF-8 spill produced from one wide code unit is held in a small carry
//! buffer and drained on the next call. `size` reports the number of
//! canonical bytes still available where that is determinable, else 0; call
//! it before reading. `good` and `eof` are orthogonal for files and readers
//! (an I/O error leaves both false), and complementary for strings.

use std::borrow::Cow;
use std::collections::VecDeque;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};

use crate::encoding::{code_page_for, CodePage, Encoding};
use crate::{LexioError, LexioErrorKind, Result};

/// Spill buffer for UTF-8 bytes generated from one decoded code point that
/// did not fit into the caller's buffer.
#[derive(Debug, Default, Clone)]
struct Carry {
    buf: [u8; 8],
    len: u8,
    off: u8,
}

impl Carry {
    #[inline]
    fn remaining(&self) -> usize {
        (self.len - self.off) as usize
    }

    fn drain(&mut self, dst: &mut [u8]) -> usize {
        let n = self.remaining().min(dst.len());
        dst[..n].copy_from_slice(&self.buf[self.off as usize..self.off as usize + n]);
        self.off += n as u8;
        if self.off == self.len {
            self.off = 0;
            self.len = 0;
        }
        n
    }

    fn stash(&mut self, bytes: &[u8]) {
        debug_assert!(self.remaining() == 0 && bytes.len() <= self.buf.len());
        self.buf[..bytes.len()].copy_from_slice(bytes);
        self.off = 0;
        self.len = bytes.len() as u8;
    }
}

/// Encode `c` into `dst[*written..]`, spilling into `carry` when it does not
/// fit. Returns false when `dst` is full afterwards.
fn emit_char(c: char, dst: &mut [u8], written: &mut usize, carry: &mut Carry) -> bool {
    let mut tmp = [0u8; 4];
    let encoded = c.encode_utf8(&mut tmp).as_bytes();
    let room = dst.len() - *written;
    if encoded.len() <= room {
        dst[*written..*written + encoded.len()].copy_from_slice(encoded);
        *written += encoded.len();
        *written < dst.len()
    } else {
        dst[*written..].copy_from_slice(&encoded[..room]);
        *written = dst.len();
        carry.stash(&encoded[room..]);
        false
    }
}

#[inline]
fn utf8_len_of_scalar(c: u32) -> u64 {
    match c {
        0..=0x7F => 1,
        0x80..=0x7FF => 2,
        0x800..=0xFFFF => 3,
        _ => 4,
    }
}

/// A file source with its detected or configured encoding.
struct FileSource {
    file: File,
    enc: Encoding,
    page: Option<CodePage>,
    /// Raw bytes pushed back in front of the file (BOM probe leftovers,
    /// unconsumed surrogate partners).
    pending: VecDeque<u8>,
    /// Decoded UTF-8 spill.
    carry: Carry,
    eof: bool,
    err: bool,
}

impl FileSource {
    fn next_raw(&mut self) -> Option<u8> {
        if let Some(b) = self.pending.pop_front() {
            return Some(b);
        }
        let mut one = [0u8; 1];
        loop {
            match self.file.read(&mut one) {
                Ok(0) => {
                    self.eof = true;
                    return None;
                }
                Ok(_) => return Some(one[0]),
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(_) => {
                    self.err = true;
                    return None;
                }
            }
        }
    }

    /// Read one 16-bit unit in this source's byte order.
    fn next_unit16(&mut self) -> Option<u16> {
        let b0 = self.next_raw()?;
        let Some(b1) = self.next_raw() else {
            // A stray trailing byte decodes to the replacement character.
            return Some(0xFFFD);
        };
        Some(if self.enc == Encoding::Utf16Be {
            ((b0 as u16) << 8) | b1 as u16
        } else {
            ((b1 as u16) << 8) | b0 as u16
        })
    }

    fn next_unit32(&mut self) -> Option<u32> {
        let mut bytes = [0u8; 4];
        bytes[0] = self.next_raw()?;
        for slot in bytes.iter_mut().skip(1) {
            match self.next_raw() {
                Some(b) => *slot = b,
                None => return Some(0xFFFD),
            }
        }
        Some(if self.enc == Encoding::Utf32Be {
            u32::from_be_bytes(bytes)
        } else {
            u32::from_le_bytes(bytes)
        })
    }

    /// Decode the next code point, or None at EOF/error.
    fn next_char(&mut self) -> Option<char> {
        match self.enc {
            Encoding::Utf16Be | Encoding::Utf16Le => {
                let u = self.next_unit16()?;
                if (0xD800..0xDC00).contains(&u) {
                    match self.next_unit16() {
                        Some(v) if (0xDC00..0xE000).contains(&v) => {
                            let c = 0x10000 + (((u as u32 - 0xD800) << 10) | (v as u32 - 0xDC00));
                            char::from_u32(c)
                        }
                        Some(v) => {
                            // Not a low surrogate: give it back and report a
                            // replacement character for the lone high half.
                            let bytes = if self.enc == Encoding::Utf16Be {
                                v.to_be_bytes()
                            } else {
                                v.to_le_bytes()
                            };
                            self.pending.push_front(bytes[1]);
                            self.pending.push_front(bytes[0]);
                            Some('\u{FFFD}')
                        }
                        None => Some('\u{FFFD}'),
                    }
                } else if (0xDC00..0xE000).contains(&u) {
                    Some('\u{FFFD}')
                } else {
                    char::from_u32(u as u32)
                }
            }
            Encoding::Utf32Be | Encoding::Utf32Le => {
                let u = self.next_unit32()?;
                Some(char::from_u32(u).unwrap_or('\u{FFFD}'))
            }
            _ => {
                let b = self.next_raw()?;
                Some(match &self.page {
                    Some(page) => page.decode(b),
                    None => b as char,
                })
            }
        }
    }

    fn get(&mut self, dst: &mut [u8]) -> usize {
        if dst.is_empty() {
            return 0;
        }
        let mut written = self.carry.drain(dst);
        match self.enc {
            Encoding::Plain | Encoding::Utf8 => {
                while written < dst.len() {
                    let Some(b) = self.pending.pop_front() else {
                        break;
                    };
                    dst[written] = b;
                    written += 1;
                }
                while written < dst.len() {
                    match self.file.read(&mut dst[written..]) {
                        Ok(0) => {
                            self.eof = true;
                            break;
                        }
                        Ok(k) => written += k,
                        Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                        Err(_) => {
                            self.err = true;
                            break;
                        }
                    }
                }
            }
            _ => {
                while written < dst.len() {
                    let Some(c) = self.next_char() else {
                        break;
                    };
                    if !emit_char(c, dst, &mut written, &mut self.carry) {
                        break;
                    }
                }
            }
        }
        written
    }

    /// Number of canonical bytes remaining, by reading ahead and seeking
    /// back. Errors and unseekable files report 0.
    fn size(&mut self) -> u64 {
        let Ok(pos) = self.file.stream_position() else {
            return 0;
        };
        let mut total = self.carry.remaining() as u64;
        match self.enc {
            Encoding::Plain | Encoding::Utf8 => {
                let Ok(end) = self.file.seek(SeekFrom::End(0)) else {
                    return 0;
                };
                let _ = self.file.seek(SeekFrom::Start(pos));
                total + self.pending.len() as u64 + (end - pos)
            }
            _ => {
                let mut hold: Vec<u8> = self.pending.iter().copied().collect();
                let mut tmp = [0u8; 4096];
                loop {
                    self.count_complete_units(&mut hold, &mut total);
                    match self.file.read(&mut tmp) {
                        Ok(0) => break,
                        Ok(k) => hold.extend_from_slice(&tmp[..k]),
                        Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                        Err(_) => {
                            let _ = self.file.seek(SeekFrom::Start(pos));
                            return 0;
                        }
                    }
                }
                if !hold.is_empty() {
                    // A truncated trailing unit decodes to one replacement.
                    total += 3;
                }
                if self.file.seek(SeekFrom::Start(pos)).is_err() {
                    self.err = true;
                    return 0;
                }
                total
            }
        }
    }

    /// Count the UTF-8 size of the complete code units at the front of
    /// `hold`, draining them.
    fn count_complete_units(&self, hold: &mut Vec<u8>, total: &mut u64) {
        let be = matches!(self.enc, Encoding::Utf16Be | Encoding::Utf32Be);
        let mut used = 0;
        match self.enc {
            Encoding::Utf16Be | Encoding::Utf16Le => {
                while hold.len() - used >= 2 {
                    let unit = |at: usize| -> u16 {
                        if be {
                            ((hold[at] as u16) << 8) | hold[at + 1] as u16
                        } else {
                            ((hold[at + 1] as u16) << 8) | hold[at] as u16
                        }
                    };
                    let u = unit(used);
                    if (0xD800..0xDC00).contains(&u) {
                        if hold.len() - used < 4 {
                            break;
                        }
                        let v = unit(used + 2);
                        if (0xDC00..0xE000).contains(&v) {
                            *total += 4;
                            used += 4;
                        } else {
                            *total += 3;
                            used += 2;
                        }
                    } else if (0xDC00..0xE000).contains(&u) {
                        *total += 3;
                        used += 2;
                    } else {
                        *total += utf8_len_of_scalar(u as u32);
                        used += 2;
                    }
                }
            }
            Encoding::Utf32Be | Encoding::Utf32Le => {
                while hold.len() - used >= 4 {
                    let bytes = [hold[used], hold[used + 1], hold[used + 2], hold[used + 3]];
                    let u = if be {
                        u32::from_be_bytes(bytes)
                    } else {
                        u32::from_le_bytes(bytes)
                    };
                    *total += match char::from_u32(u) {
                        Some(c) => utf8_len_of_scalar(c as u32),
                        None => 3,
                    };
                    used += 4;
                }
            }
            _ => {
                for &b in hold.iter() {
                    let c = match &self.page {
                        Some(page) => page.decode(b),
                        None => b as char,
                    };
                    *total += utf8_len_of_scalar(c as u32);
                }
                used = hold.len();
            }
        }
        hold.drain(..used);
    }
}

impl std::fmt::Debug for FileSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileSource")
            .field("enc", &self.enc)
            .field("eof", &self.eof)
            .field("err", &self.err)
            .finish()
    }
}

enum Source<'i> {
    Empty,
    Bytes {
        data: Cow<'i, [u8]>,
        off: usize,
    },
    Utf16 {
        units: Cow<'i, [u16]>,
        off: usize,
        carry: Carry,
    },
    Utf32 {
        units: Cow<'i, [u32]>,
        off: usize,
        carry: Carry,
    },
    File(Box<FileSource>),
    Reader {
        reader: Box<dyn Read + 'i>,
        eof: bool,
        err: bool,
    },
}

/// An input character sequence: one of a byte slice, a wide string, a file
/// with a detected or configured encoding, or a generic byte stream.
///
/// See the [module documentation](self) for the operation contract.
pub struct Input<'i> {
    source: Source<'i>,
}

impl Default for Input<'_> {
    fn default() -> Self {
        Self {
            source: Source::Empty,
        }
    }
}

impl std::fmt::Debug for Input<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match &self.source {
            Source::Empty => "Empty",
            Source::Bytes { .. } => "Bytes",
            Source::Utf16 { .. } => "Utf16",
            Source::Utf32 { .. } => "Utf32",
            Source::File(_) => "File",
            Source::Reader { .. } => "Reader",
        };
        f.debug_struct("Input").field("source", &name).finish()
    }
}

impl<'i> Input<'i> {
    /// An empty, unassigned input.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Input from an open file, with BOM auto-detection.
    ///
    /// A UTF-8 BOM is skipped; UTF-16/32 BOMs select the corresponding
    /// decoding. Without a BOM the content is treated as plain octets.
    pub fn file(file: File) -> Result<Self> {
        Self::file_with_encoding(file, Encoding::Plain, None)
    }

    /// Input from an open file with an explicit fallback encoding.
    ///
    /// The encoding applies when no UTF BOM is detected. `page` is required
    /// if and only if `enc` is [`Encoding::Custom`].
    pub fn file_with_encoding(
        mut file: File,
        enc: Encoding,
        page: Option<&CodePage>,
    ) -> Result<Self> {
        let mut probe = [0u8; 4];
        let mut got = 0;
        while got < 4 {
            match file.read(&mut probe[got..]) {
                Ok(0) => break,
                Ok(k) => got += k,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        let head = &probe[..got];
        let (detected, bom_len) = if head.starts_with(&[0x00, 0x00, 0xFE, 0xFF]) {
            (Some(Encoding::Utf32Be), 4)
        } else if head.starts_with(&[0xFF, 0xFE, 0x00, 0x00]) {
            (Some(Encoding::Utf32Le), 4)
        } else if head.starts_with(&[0xEF, 0xBB, 0xBF]) {
            (Some(Encoding::Utf8), 3)
        } else if head.starts_with(&[0xFE, 0xFF]) {
            (Some(Encoding::Utf16Be), 2)
        } else if head.starts_with(&[0xFF, 0xFE]) {
            (Some(Encoding::Utf16Le), 2)
        } else {
            (None, 0)
        };
        let enc = detected.unwrap_or(enc);
        let page = Self::resolve_page(enc, page)?;
        let mut source = FileSource {
            file,
            enc,
            page,
            pending: VecDeque::new(),
            carry: Carry::default(),
            eof: false,
            err: false,
        };
        source.pending.extend(&head[bom_len..]);
        Ok(Self {
            source: Source::File(Box::new(source)),
        })
    }

    /// Input from a generic byte stream. The size is unknown and the bytes
    /// are passed through unchanged.
    pub fn reader(reader: impl Read + 'i) -> Self {
        Self {
            source: Source::Reader {
                reader: Box::new(reader),
                eof: false,
                err: false,
            },
        }
    }

    /// Input from UTF-16 code units; surrogate pairs are combined, lone
    /// surrogates decode to the replacement character.
    pub fn from_utf16(units: impl Into<Cow<'i, [u16]>>) -> Self {
        Self {
            source: Source::Utf16 {
                units: units.into(),
                off: 0,
                carry: Carry::default(),
            },
        }
    }

    /// Input from UTF-32 code units; invalid scalar values decode to the
    /// replacement character.
    pub fn from_utf32(units: impl Into<Cow<'i, [u32]>>) -> Self {
        Self {
            source: Source::Utf32 {
                units: units.into(),
                off: 0,
                carry: Carry::default(),
            },
        }
    }

    fn resolve_page(enc: Encoding, page: Option<&CodePage>) -> Result<Option<CodePage>> {
        match enc {
            Encoding::Custom => match page {
                Some(p) => Ok(Some(p.clone())),
                None => Err(LexioError::new(LexioErrorKind::UnsupportedFeature(
                    "a custom encoding requires a code page".to_string(),
                ))),
            },
            _ => Ok(code_page_for(enc)),
        }
    }

    /// Override the encoding of a file input. Call before reading starts.
    pub fn set_encoding(&mut self, enc: Encoding, page: Option<&CodePage>) -> Result<()> {
        match &mut self.source {
            Source::File(file) => {
                file.page = Self::resolve_page(enc, page)?;
                file.enc = enc;
                Ok(())
            }
            _ => Err(LexioError::new(LexioErrorKind::UnsupportedFeature(
                "set_encoding applies to file input only".to_string(),
            ))),
        }
    }

    /// The encoding of a file input; `Plain` for all other sources.
    pub fn encoding(&self) -> Encoding {
        match &self.source {
            Source::File(file) => file.enc,
            _ => Encoding::Plain,
        }
    }

    /// Check if this input was assigned a source.
    pub fn assigned(&self) -> bool {
        !matches!(self.source, Source::Empty)
    }

    /// Unassign this input.
    pub fn clear(&mut self) {
        self.source = Source::Empty;
    }

    /// Fill `dst` with up to `dst.len()` canonical bytes. Returns the number
    /// of bytes produced; 0 means EOF or an error condition.
    pub fn get(&mut self, dst: &mut [u8]) -> usize {
        if dst.is_empty() {
            return 0;
        }
        match &mut self.source {
            Source::Empty => 0,
            Source::Bytes { data, off } => {
                let n = (data.len() - *off).min(dst.len());
                dst[..n].copy_from_slice(&data[*off..*off + n]);
                *off += n;
                n
            }
            Source::Utf16 { units, off, carry } => {
                let mut written = carry.drain(dst);
                while written < dst.len() && *off < units.len() {
                    let u = units[*off];
                    *off += 1;
                    let c = if (0xD800..0xDC00).contains(&u) {
                        if *off < units.len() && (0xDC00..0xE000).contains(&units[*off]) {
                            let v = units[*off];
                            *off += 1;
                            let c = 0x10000 + (((u as u32 - 0xD800) << 10) | (v as u32 - 0xDC00));
                            char::from_u32(c).unwrap_or('\u{FFFD}')
                        } else {
                            '\u{FFFD}'
                        }
                    } else if (0xDC00..0xE000).contains(&u) {
                        '\u{FFFD}'
                    } else {
                        char::from_u32(u as u32).unwrap_or('\u{FFFD}')
                    };
                    if !emit_char(c, dst, &mut written, carry) {
                        break;
                    }
                }
                written
            }
            Source::Utf32 { units, off, carry } => {
                let mut written = carry.drain(dst);
                while written < dst.len() && *off < units.len() {
                    let c = char::from_u32(units[*off]).unwrap_or('\u{FFFD}');
                    *off += 1;
                    if !emit_char(c, dst, &mut written, carry) {
                        break;
                    }
                }
                written
            }
            Source::File(file) => file.get(dst),
            Source::Reader { reader, eof, err } => loop {
                match reader.read(dst) {
                    Ok(0) => {
                        *eof = true;
                        return 0;
                    }
                    Ok(k) => return k,
                    Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                    Err(_) => {
                        *err = true;
                        return 0;
                    }
                }
            },
        }
    }

    /// Get a single byte, or None at end of input.
    pub fn get_byte(&mut self) -> Option<u8> {
        let mut one = [0u8; 1];
        if self.get(&mut one) == 1 {
            Some(one[0])
        } else {
            None
        }
    }

    /// The number of canonical bytes remaining, or 0 when not determinable.
    /// Use before reading with `get`.
    pub fn size(&mut self) -> usize {
        match &mut self.source {
            Source::Empty => 0,
            Source::Bytes { data, off } => data.len() - *off,
            Source::Utf16 { units, off, carry } => {
                let mut total = carry.remaining() as u64;
                let mut at = *off;
                while at < units.len() {
                    let u = units[at];
                    at += 1;
                    if (0xD800..0xDC00).contains(&u)
                        && at < units.len()
                        && (0xDC00..0xE000).contains(&units[at])
                    {
                        at += 1;
                        total += 4;
                    } else if (0xD800..0xE000).contains(&u) {
                        total += 3;
                    } else {
                        total += utf8_len_of_scalar(u as u32);
                    }
                }
                total as usize
            }
            Source::Utf32 { units, off, carry } => {
                let mut total = carry.remaining() as u64;
                for &u in &units[*off..] {
                    total += match char::from_u32(u) {
                        Some(c) => utf8_len_of_scalar(c as u32),
                        None => 3,
                    };
                }
                total as usize
            }
            Source::File(file) => file.size() as usize,
            Source::Reader { .. } => 0,
        }
    }

    /// Check if input is available: no error and not (yet) at EOF.
    pub fn good(&self) -> bool {
        match &self.source {
            Source::Empty => false,
            Source::Bytes { data, off } => *off < data.len(),
            Source::Utf16 { units, off, carry } => carry.remaining() > 0 || *off < units.len(),
            Source::Utf32 { units, off, carry } => carry.remaining() > 0 || *off < units.len(),
            Source::File(file) => {
                !file.err
                    && (!file.eof
                        || !file.pending.is_empty()
                        || file.carry.remaining() > 0)
            }
            Source::Reader { eof, err, .. } => !*eof && !*err,
        }
    }

    /// Check if the input reached EOF. For files and readers an error state
    /// leaves both `good` and `eof` false.
    pub fn eof(&self) -> bool {
        match &self.source {
            Source::Empty => true,
            Source::Bytes { data, off } => *off >= data.len(),
            Source::Utf16 { units, off, carry } => carry.remaining() == 0 && *off >= units.len(),
            Source::Utf32 { units, off, carry } => carry.remaining() == 0 && *off >= units.len(),
            Source::File(file) => {
                file.eof && file.pending.is_empty() && file.carry.remaining() == 0
            }
            Source::Reader { eof, .. } => *eof,
        }
    }
}

impl<'i> From<&'i str> for Input<'i> {
    fn from(s: &'i str) -> Self {
        Self {
            source: Source::Bytes {
                data: Cow::Borrowed(s.as_bytes()),
                off: 0,
            },
        }
    }
}

impl<'i> From<&'i [u8]> for Input<'i> {
    fn from(s: &'i [u8]) -> Self {
        Self {
            source: Source::Bytes {
                data: Cow::Borrowed(s),
                off: 0,
            },
        }
    }
}

impl From<String> for Input<'_> {
    fn from(s: String) -> Self {
        Self {
            source: Source::Bytes {
                data: Cow::Owned(s.into_bytes()),
                off: 0,
            },
        }
    }
}

impl From<Vec<u8>> for Input<'_> {
    fn from(s: Vec<u8>) -> Self {
        Self {
            source: Source::Bytes {
                data: Cow::Owned(s),
                off: 0,
            },
        }
    }
}

impl<'i> From<&'i [u16]> for Input<'i> {
    fn from(units: &'i [u16]) -> Self {
        Self::from_utf16(units)
    }
}

impl<'i> From<&'i [u32]> for Input<'i> {
    fn from(units: &'i [u32]) -> Self {
        Self::from_utf32(units)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bytes_get() {
        let mut input = Input::from("Hello");
        assert_eq!(input.size(), 5);
        assert!(input.good());
        let mut buf = [0u8; 3];
        assert_eq!(input.get(&mut buf), 3);
        assert_eq!(&buf, b"Hel");
        assert_eq!(input.get(&mut buf), 2);
        assert_eq!(&buf[..2], b"lo");
        assert_eq!(input.get(&mut buf), 0);
        assert!(input.eof());
        assert!(!input.good());
    }

    #[test]
    fn test_wide_conversion() {
        // "Copyright ©", © is U+00A9 and UTF-8 C2 A9.
        let wide: Vec<u16> = "Copyright ©".encode_utf16().collect();
        let mut input = Input::from_utf16(wide.as_slice());
        assert_eq!(input.size(), 12);
        let mut buf = [0u8; 16];
        let n = input.get(&mut buf);
        assert_eq!(&buf[..n], "Copyright ©".as_bytes());
    }

    #[test]
    fn test_wide_carry_honours_n() {
        // One three-byte code point read through a one-byte window.
        let wide: Vec<u16> = "∞".encode_utf16().collect();
        let mut input = Input::from_utf16(wide.as_slice());
        let mut out = Vec::new();
        let mut one = [0u8; 1];
        while input.get(&mut one) == 1 {
            out.push(one[0]);
        }
        assert_eq!(out, "∞".as_bytes());
    }

    #[test]
    fn test_surrogate_pair() {
        let wide: Vec<u16> = "𝄞".encode_utf16().collect();
        assert_eq!(wide.len(), 2);
        let mut input = Input::from_utf16(wide.as_slice());
        assert_eq!(input.size(), 4);
        let mut buf = [0u8; 8];
        let n = input.get(&mut buf);
        assert_eq!(&buf[..n], "𝄞".as_bytes());
    }

    #[test]
    fn test_lone_surrogate_replacement() {
        let wide: Vec<u16> = vec![0xD800, b'a' as u16];
        let mut input = Input::from_utf16(wide.as_slice());
        let mut buf = [0u8; 8];
        let n = input.get(&mut buf);
        assert_eq!(&buf[..n], "\u{FFFD}a".as_bytes());
    }

    #[test]
    fn test_utf32() {
        let wide: Vec<u32> = "a©∞".chars().map(|c| c as u32).collect();
        let mut input = Input::from_utf32(wide.as_slice());
        assert_eq!(input.size(), 6);
        let mut buf = [0u8; 8];
        let n = input.get(&mut buf);
        assert_eq!(&buf[..n], "a©∞".as_bytes());
    }

    #[test]
    fn test_switch_sources() {
        let wide: Vec<u16> = " world".encode_utf16().collect();
        let mut message = Vec::new();
        let mut input = Input::from("Hello");
        let mut one = [0u8; 1];
        while input.get(&mut one) == 1 {
            message.push(one[0]);
        }
        input = Input::from_utf16(wide.as_slice());
        while input.get(&mut one) == 1 {
            message.push(one[0]);
        }
        assert_eq!(message, b"Hello world");
    }
}
