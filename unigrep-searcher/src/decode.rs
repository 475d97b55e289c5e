/*!
Transcoding of declared source encodings to the UTF-8 byte stream that
matching runs over.

The common cases (UTF-8 pass through, BOM sniffing, the UTF-16 family and
the Windows code pages) are delegated to `encoding_rs` via
`encoding_rs_io`. The DOS code pages, EBCDIC and the UTF-32 family are
not part of the Encoding Standard, so small dedicated decoders handle
them here. In every case the bytes handed to the matcher, and therefore
all reported byte offsets, refer to the transcoded stream.
*/

use std::error;
use std::fmt;
use std::io::{self, Read};

use encoding_rs_io::{DecodeReaderBytes, DecodeReaderBytesBuilder};

/// The error returned for an encoding label that names no supported
/// encoding.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UnknownEncodingError {
    label: String,
}

impl UnknownEncodingError {
    /// The label that could not be resolved.
    pub fn label(&self) -> &str {
        &self.label
    }
}

impl error::Error for UnknownEncodingError {
    fn description(&self) -> &str {
        "unknown encoding"
    }
}

impl fmt::Display for UnknownEncodingError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "unknown encoding: {}", self.label)
    }
}

/// A declared source encoding.
///
/// An encoding can be used to configure an
/// [`EngineBuilder`](crate::EngineBuilder) to transcode source data
/// before searching. A BOM in the source always takes precedence over the
/// declared encoding.
///
/// A `SourceEncoding` is cheap to clone.
#[derive(Clone, Debug)]
pub struct SourceEncoding(pub(crate) Kind);

#[derive(Clone, Copy, Debug)]
pub(crate) enum Kind {
    /// Raw bytes: `binary`, `ascii` and `utf-8`. No transcoding happens,
    /// although a leading UTF-8 BOM is stripped and a UTF-16 BOM still
    /// takes over.
    Raw,
    /// An encoding implemented by `encoding_rs`.
    Rs(&'static encoding_rs::Encoding),
    /// ISO-8859-1, where every byte is its own code point.
    Latin1,
    /// A single byte code page given by a table for the upper half; the
    /// lower half is ASCII.
    High(&'static [u16; 128]),
    /// EBCDIC, given by a full 256 entry table.
    Full(&'static [u16; 256]),
    /// UTF-32 with the given endianness; `None` means "detect from a
    /// BOM, default big endian".
    Utf32(Option<bool>),
}

impl SourceEncoding {
    /// Create a new encoding for the specified label.
    ///
    /// If the given label does not correspond to a supported encoding,
    /// then this returns an error.
    pub fn new(label: &str) -> Result<SourceEncoding, UnknownEncodingError> {
        let norm = label
            .chars()
            .filter(|&c| c != '-' && c != '_' && c != ' ')
            .collect::<String>()
            .to_lowercase();
        let kind = match norm.as_str() {
            "binary" | "ascii" | "usascii" | "utf8" => Kind::Raw,
            "utf16" | "utf16be" => Kind::Rs(encoding_rs::UTF_16BE),
            "utf16le" => Kind::Rs(encoding_rs::UTF_16LE),
            "utf32" => Kind::Utf32(None),
            "utf32be" => Kind::Utf32(Some(true)),
            "utf32le" => Kind::Utf32(Some(false)),
            "latin1" | "iso88591" => Kind::Latin1,
            "ebcdic" => Kind::Full(&EBCDIC_1047),
            "cp437" => Kind::High(&CP437),
            "cp850" => Kind::High(&CP850),
            "cp858" => Kind::High(&CP858),
            "cp1250" => Kind::Rs(encoding_rs::WINDOWS_1250),
            "cp1251" => Kind::Rs(encoding_rs::WINDOWS_1251),
            "cp1252" => Kind::Rs(encoding_rs::WINDOWS_1252),
            "cp1253" => Kind::Rs(encoding_rs::WINDOWS_1253),
            "cp1254" => Kind::Rs(encoding_rs::WINDOWS_1254),
            "cp1255" => Kind::Rs(encoding_rs::WINDOWS_1255),
            "cp1256" => Kind::Rs(encoding_rs::WINDOWS_1256),
            "cp1257" => Kind::Rs(encoding_rs::WINDOWS_1257),
            "cp1258" => Kind::Rs(encoding_rs::WINDOWS_1258),
            _ => {
                return Err(UnknownEncodingError {
                    label: label.to_string(),
                });
            }
        };
        Ok(SourceEncoding(kind))
    }

    /// Returns true if and only if searching with this encoding requires
    /// transcoding the source.
    ///
    /// When this is false, a source can be searched in place, e.g., via a
    /// memory map.
    pub fn is_raw(&self) -> bool {
        match self.0 {
            Kind::Raw => true,
            _ => false,
        }
    }
}

/// A builder for constructing transcoding readers.
///
/// When no encoding is given, the constructed reader passes bytes
/// through, with BOM sniffing enabled so that UTF-16 sources are still
/// transcoded automatically.
#[derive(Clone, Debug, Default)]
pub struct DecodeBuilder {
    encoding: Option<SourceEncoding>,
}

impl DecodeBuilder {
    /// Create a new builder with a default (pass through) configuration.
    pub fn new() -> DecodeBuilder {
        DecodeBuilder { encoding: None }
    }

    /// Set the declared encoding. `None` reverts to BOM sniffing only.
    pub fn encoding(
        &mut self,
        encoding: Option<SourceEncoding>,
    ) -> &mut DecodeBuilder {
        self.encoding = encoding;
        self
    }

    /// Build a transcoding reader wrapping `rdr`, using `buffer` as
    /// transcoding scratch space.
    pub fn build_with_buffer<'b, R: Read>(
        &self,
        rdr: R,
        buffer: &'b mut Vec<u8>,
    ) -> io::Result<DecodeReader<'b, R>> {
        let kind = self.encoding.as_ref().map(|e| e.0).unwrap_or(Kind::Raw);
        let imp = match kind {
            Kind::Raw | Kind::Rs(_) => {
                let enc = match kind {
                    Kind::Rs(enc) => Some(enc),
                    _ => None,
                };
                let rdr = DecodeReaderBytesBuilder::new()
                    .encoding(enc)
                    .utf8_passthru(true)
                    .bom_override(true)
                    .build_with_buffer(rdr, buffer)?;
                DecodeReaderImp::Rs(rdr)
            }
            Kind::Latin1 => DecodeReaderImp::table(rdr, TableKind::Latin1),
            Kind::High(table) => {
                DecodeReaderImp::table(rdr, TableKind::High(table))
            }
            Kind::Full(table) => {
                DecodeReaderImp::table(rdr, TableKind::Full(table))
            }
            Kind::Utf32(endian) => DecodeReaderImp::Utf32(Utf32Reader {
                rdr,
                big_endian: endian.unwrap_or(true),
                sniff_bom: endian.is_none(),
                pending: Vec::new(),
                pos: 0,
            }),
        };
        Ok(DecodeReader(imp))
    }
}

/// A reader that yields the transcoded form of its underlying reader.
#[derive(Debug)]
pub struct DecodeReader<'b, R>(DecodeReaderImp<'b, R>);

#[derive(Debug)]
enum DecodeReaderImp<'b, R> {
    Rs(DecodeReaderBytes<R, &'b mut Vec<u8>>),
    Table(TableReader<R>),
    Utf32(Utf32Reader<R>),
}

impl<'b, R: Read> DecodeReaderImp<'b, R> {
    fn table(rdr: R, kind: TableKind) -> DecodeReaderImp<'b, R> {
        DecodeReaderImp::Table(TableReader {
            rdr,
            kind,
            pending: Vec::new(),
            pos: 0,
        })
    }
}

impl<'b, R: Read> Read for DecodeReader<'b, R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.0 {
            DecodeReaderImp::Rs(ref mut rdr) => rdr.read(buf),
            DecodeReaderImp::Table(ref mut rdr) => rdr.read(buf),
            DecodeReaderImp::Utf32(ref mut rdr) => rdr.read(buf),
        }
    }
}

#[derive(Clone, Copy, Debug)]
enum TableKind {
    Latin1,
    High(&'static [u16; 128]),
    Full(&'static [u16; 256]),
}

impl TableKind {
    fn decode(&self, b: u8) -> char {
        let cp = match *self {
            TableKind::Latin1 => u32::from(b),
            TableKind::High(table) => {
                if b < 0x80 {
                    u32::from(b)
                } else {
                    u32::from(table[usize::from(b - 0x80)])
                }
            }
            TableKind::Full(table) => u32::from(table[usize::from(b)]),
        };
        std::char::from_u32(cp).unwrap_or('\u{FFFD}')
    }
}

/// A reader that decodes single byte encodings via a table lookup.
#[derive(Debug)]
struct TableReader<R> {
    rdr: R,
    kind: TableKind,
    /// Transcoded bytes not yet handed to the caller.
    pending: Vec<u8>,
    pos: usize,
}

impl<R: Read> Read for TableReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.pos >= self.pending.len() {
            let mut chunk = [0u8; 4096];
            let n = self.rdr.read(&mut chunk)?;
            if n == 0 {
                return Ok(0);
            }
            self.pending.clear();
            self.pos = 0;
            let mut utf8 = [0u8; 4];
            for &b in &chunk[..n] {
                let c = self.kind.decode(b);
                self.pending
                    .extend_from_slice(c.encode_utf8(&mut utf8).as_bytes());
            }
        }
        let n = std::cmp::min(buf.len(), self.pending.len() - self.pos);
        buf[..n].copy_from_slice(&self.pending[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}

/// A reader that decodes UTF-32 in either endianness.
#[derive(Debug)]
struct Utf32Reader<R> {
    rdr: R,
    big_endian: bool,
    /// When set, the first unit is inspected for a BOM, which selects the
    /// endianness and is not emitted.
    sniff_bom: bool,
    pending: Vec<u8>,
    pos: usize,
}

impl<R: Read> Utf32Reader<R> {
    /// Read exactly one 4 byte unit, tolerating short reads. Returns
    /// `None` at EOF. A trailing partial unit decodes as a replacement
    /// character.
    fn next_unit(&mut self) -> io::Result<Option<u32>> {
        let mut unit = [0u8; 4];
        let mut have = 0;
        while have < 4 {
            let n = self.rdr.read(&mut unit[have..])?;
            if n == 0 {
                if have == 0 {
                    return Ok(None);
                }
                return Ok(Some(0xFFFD));
            }
            have += n;
        }
        let v = if self.big_endian {
            u32::from_be_bytes(unit)
        } else {
            u32::from_le_bytes(unit)
        };
        Ok(Some(v))
    }
}

impl<R: Read> Read for Utf32Reader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.pos >= self.pending.len() {
            self.pending.clear();
            self.pos = 0;
            let mut utf8 = [0u8; 4];
            for _ in 0..1024 {
                let v = match self.next_unit()? {
                    None => break,
                    Some(v) => v,
                };
                if self.sniff_bom {
                    self.sniff_bom = false;
                    if v == 0xFEFF {
                        continue;
                    }
                    if v == 0xFFFE_0000 {
                        self.big_endian = !self.big_endian;
                        continue;
                    }
                }
                let c = std::char::from_u32(v).unwrap_or('\u{FFFD}');
                self.pending
                    .extend_from_slice(c.encode_utf8(&mut utf8).as_bytes());
            }
            if self.pending.is_empty() {
                return Ok(0);
            }
        }
        let n = std::cmp::min(buf.len(), self.pending.len() - self.pos);
        buf[..n].copy_from_slice(&self.pending[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}

/// Code page 437, upper half.
#[rustfmt::skip]
static CP437: [u16; 128] = [
    0x00C7, 0x00FC, 0x00E9, 0x00E2, 0x00E4, 0x00E0, 0x00E5, 0x00E7,
    0x00EA, 0x00EB, 0x00E8, 0x00EF, 0x00EE, 0x00EC, 0x00C4, 0x00C5,
    0x00C9, 0x00E6, 0x00C6, 0x00F4, 0x00F6, 0x00F2, 0x00FB, 0x00F9,
    0x00FF, 0x00D6, 0x00DC, 0x00A2, 0x00A3, 0x00A5, 0x20A7, 0x0192,
    0x00E1, 0x00ED, 0x00F3, 0x00FA, 0x00F1, 0x00D1, 0x00AA, 0x00BA,
    0x00BF, 0x2310, 0x00AC, 0x00BD, 0x00BC, 0x00A1, 0x00AB, 0x00BB,
    0x2591, 0x2592, 0x2593, 0x2502, 0x2524, 0x2561, 0x2562, 0x2556,
    0x2555, 0x2563, 0x2551, 0x2557, 0x255D, 0x255C, 0x255B, 0x2510,
    0x2514, 0x2534, 0x252C, 0x251C, 0x2500, 0x253C, 0x255E, 0x255F,
    0x255A, 0x2554, 0x2569, 0x2566, 0x2560, 0x2550, 0x256C, 0x2567,
    0x2568, 0x2564, 0x2565, 0x2559, 0x2558, 0x2552, 0x2553, 0x256B,
    0x256A, 0x2518, 0x250C, 0x2588, 0x2584, 0x258C, 0x2590, 0x2580,
    0x03B1, 0x00DF, 0x0393, 0x03C0, 0x03A3, 0x03C3, 0x00B5, 0x03C4,
    0x03A6, 0x0398, 0x03A9, 0x03B4, 0x221E, 0x03C6, 0x03B5, 0x2229,
    0x2261, 0x00B1, 0x2265, 0x2264, 0x2320, 0x2321, 0x00F7, 0x2248,
    0x00B0, 0x2219, 0x00B7, 0x221A, 0x207F, 0x00B2, 0x25A0, 0x00A0,
];

/// Code page 850, upper half.
#[rustfmt::skip]
static CP850: [u16; 128] = [
    0x00C7, 0x00FC, 0x00E9, 0x00E2, 0x00E4, 0x00E0, 0x00E5, 0x00E7,
    0x00EA, 0x00EB, 0x00E8, 0x00EF, 0x00EE, 0x00EC, 0x00C4, 0x00C5,
    0x00C9, 0x00E6, 0x00C6, 0x00F4, 0x00F6, 0x00F2, 0x00FB, 0x00F9,
    0x00FF, 0x00D6, 0x00DC, 0x00F8, 0x00A3, 0x00D8, 0x00D7, 0x0192,
    0x00E1, 0x00ED, 0x00F3, 0x00FA, 0x00F1, 0x00D1, 0x00AA, 0x00BA,
    0x00BF, 0x00AE, 0x00AC, 0x00BD, 0x00BC, 0x00A1, 0x00AB, 0x00BB,
    0x2591, 0x2592, 0x2593, 0x2502, 0x2524, 0x00C1, 0x00C2, 0x00C0,
    0x00A9, 0x2563, 0x2551, 0x2557, 0x255D, 0x00A2, 0x00A5, 0x2510,
    0x2514, 0x2534, 0x252C, 0x251C, 0x2500, 0x253C, 0x00E3, 0x00C3,
    0x255A, 0x2554, 0x2569, 0x2566, 0x2560, 0x2550, 0x256C, 0x00A4,
    0x00F0, 0x00D0, 0x00CA, 0x00CB, 0x00C8, 0x0131, 0x00CD, 0x00CE,
    0x00CF, 0x2518, 0x250C, 0x2588, 0x2584, 0x00A6, 0x00CC, 0x2580,
    0x00D3, 0x00DF, 0x00D4, 0x00D2, 0x00F5, 0x00D5, 0x00B5, 0x00FE,
    0x00DE, 0x00DA, 0x00DB, 0x00D9, 0x00FD, 0x00DD, 0x00AF, 0x00B4,
    0x00AD, 0x00B1, 0x2017, 0x00BE, 0x00B6, 0x00A7, 0x00F7, 0x00B8,
    0x00B0, 0x00A8, 0x00B7, 0x00B9, 0x00B3, 0x00B2, 0x25A0, 0x00A0,
];

/// Code page 858: code page 850 with the euro sign at 0xD5.
#[rustfmt::skip]
static CP858: [u16; 128] = [
    0x00C7, 0x00FC, 0x00E9, 0x00E2, 0x00E4, 0x00E0, 0x00E5, 0x00E7,
    0x00EA, 0x00EB, 0x00E8, 0x00EF, 0x00EE, 0x00EC, 0x00C4, 0x00C5,
    0x00C9, 0x00E6, 0x00C6, 0x00F4, 0x00F6, 0x00F2, 0x00FB, 0x00F9,
    0x00FF, 0x00D6, 0x00DC, 0x00F8, 0x00A3, 0x00D8, 0x00D7, 0x0192,
    0x00E1, 0x00ED, 0x00F3, 0x00FA, 0x00F1, 0x00D1, 0x00AA, 0x00BA,
    0x00BF, 0x00AE, 0x00AC, 0x00BD, 0x00BC, 0x00A1, 0x00AB, 0x00BB,
    0x2591, 0x2592, 0x2593, 0x2502, 0x2524, 0x00C1, 0x00C2, 0x00C0,
    0x00A9, 0x2563, 0x2551, 0x2557, 0x255D, 0x00A2, 0x00A5, 0x2510,
    0x2514, 0x2534, 0x252C, 0x251C, 0x2500, 0x253C, 0x00E3, 0x00C3,
    0x255A, 0x2554, 0x2569, 0x2566, 0x2560, 0x2550, 0x256C, 0x00A4,
    0x00F0, 0x00D0, 0x00CA, 0x00CB, 0x00C8, 0x20AC, 0x00CD, 0x00CE,
    0x00CF, 0x2518, 0x250C, 0x2588, 0x2584, 0x00A6, 0x00CC, 0x2580,
    0x00D3, 0x00DF, 0x00D4, 0x00D2, 0x00F5, 0x00D5, 0x00B5, 0x00FE,
    0x00DE, 0x00DA, 0x00DB, 0x00D9, 0x00FD, 0x00DD, 0x00AF, 0x00B4,
    0x00AD, 0x00B1, 0x2017, 0x00BE, 0x00B6, 0x00A7, 0x00F7, 0x00B8,
    0x00B0, 0x00A8, 0x00B7, 0x00B9, 0x00B3, 0x00B2, 0x25A0, 0x00A0,
];

/// EBCDIC code page 1047.
#[rustfmt::skip]
static EBCDIC_1047: [u16; 256] = [
    0x0000, 0x0001, 0x0002, 0x0003, 0x009C, 0x0009, 0x0086, 0x007F,
    0x0097, 0x008D, 0x008E, 0x000B, 0x000C, 0x000D, 0x000E, 0x000F,
    0x0010, 0x0011, 0x0012, 0x0013, 0x009D, 0x000A, 0x0008, 0x0087,
    0x0018, 0x0019, 0x0092, 0x008F, 0x001C, 0x001D, 0x001E, 0x001F,
    0x0080, 0x0081, 0x0082, 0x0083, 0x0084, 0x0085, 0x0017, 0x001B,
    0x0088, 0x0089, 0x008A, 0x008B, 0x008C, 0x0005, 0x0006, 0x0007,
    0x0090, 0x0091, 0x0016, 0x0093, 0x0094, 0x0095, 0x0096, 0x0004,
    0x0098, 0x0099, 0x009A, 0x009B, 0x0014, 0x0015, 0x009E, 0x001A,
    0x0020, 0x00A0, 0x00E2, 0x00E4, 0x00E0, 0x00E1, 0x00E3, 0x00E5,
    0x00E7, 0x00F1, 0x00A2, 0x002E, 0x003C, 0x0028, 0x002B, 0x007C,
    0x0026, 0x00E9, 0x00EA, 0x00EB, 0x00E8, 0x00ED, 0x00EE, 0x00EF,
    0x00EC, 0x00DF, 0x0021, 0x0024, 0x002A, 0x0029, 0x003B, 0x005E,
    0x002D, 0x002F, 0x00C2, 0x00C4, 0x00C0, 0x00C1, 0x00C3, 0x00C5,
    0x00C7, 0x00D1, 0x00A6, 0x002C, 0x0025, 0x005F, 0x003E, 0x003F,
    0x00F8, 0x00C9, 0x00CA, 0x00CB, 0x00C8, 0x00CD, 0x00CE, 0x00CF,
    0x00CC, 0x0060, 0x003A, 0x0023, 0x0040, 0x0027, 0x003D, 0x0022,
    0x00D8, 0x0061, 0x0062, 0x0063, 0x0064, 0x0065, 0x0066, 0x0067,
    0x0068, 0x0069, 0x00AB, 0x00BB, 0x00F0, 0x00FD, 0x00FE, 0x00B1,
    0x00B0, 0x006A, 0x006B, 0x006C, 0x006D, 0x006E, 0x006F, 0x0070,
    0x0071, 0x0072, 0x00AA, 0x00BA, 0x00E6, 0x00B8, 0x00C6, 0x00A4,
    0x00B5, 0x007E, 0x0073, 0x0074, 0x0075, 0x0076, 0x0077, 0x0078,
    0x0079, 0x007A, 0x00A1, 0x00BF, 0x00D0, 0x005B, 0x00DE, 0x00AE,
    0x00AC, 0x00A3, 0x00A5, 0x00B7, 0x00A9, 0x00A7, 0x00B6, 0x00BC,
    0x00BD, 0x00BE, 0x00DD, 0x00A8, 0x00AF, 0x005D, 0x00B4, 0x00D7,
    0x007B, 0x0041, 0x0042, 0x0043, 0x0044, 0x0045, 0x0046, 0x0047,
    0x0048, 0x0049, 0x00AD, 0x00F4, 0x00F6, 0x00F2, 0x00F3, 0x00F5,
    0x007D, 0x004A, 0x004B, 0x004C, 0x004D, 0x004E, 0x004F, 0x0050,
    0x0051, 0x0052, 0x00B9, 0x00FB, 0x00FC, 0x00F9, 0x00FA, 0x00FF,
    0x005C, 0x00F7, 0x0053, 0x0054, 0x0055, 0x0056, 0x0057, 0x0058,
    0x0059, 0x005A, 0x00B2, 0x00D4, 0x00D6, 0x00D2, 0x00D3, 0x00D5,
    0x0030, 0x0031, 0x0032, 0x0033, 0x0034, 0x0035, 0x0036, 0x0037,
    0x0038, 0x0039, 0x00B3, 0x00DB, 0x00DC, 0x00D9, 0x00DA, 0x009F,
];
