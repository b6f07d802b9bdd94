//! Matrix Market banner and size line parsing

use crate::{Error, Result};
use mtb_core::{Datatype, MatrixType};
use std::io::BufRead;

/// Parsed header of an MTX coordinate file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MtxHeader {
    /// Banner fields: `%%MatrixMarket object format field symmetry`
    pub properties: [String; 5],
    pub nrows: u64,
    pub ncols: u64,
    /// Declared number of entries in the file
    pub nz: u64,
    /// Byte offset of the first data line
    pub data_offset: u64,
}

impl MtxHeader {
    /// Storage format field (`coordinate` or `array`)
    pub fn format(&self) -> &str {
        &self.properties[2]
    }

    /// Value field (`pattern`, `integer`, `real`, `complex`)
    pub fn field(&self) -> &str {
        &self.properties[3]
    }

    /// Symmetry field (`general`, `symmetric`, ...)
    pub fn symmetry(&self) -> &str {
        &self.properties[4]
    }

    /// Matrix type described by the format and symmetry fields
    pub fn matrix_type(&self) -> Result<MatrixType> {
        let format = self.format();
        if format.eq_ignore_ascii_case("array") {
            return Err(Error::unsupported("dense (array) matrices are not supported"));
        }
        if !format.eq_ignore_ascii_case("coordinate") {
            return Err(Error::unsupported(format!("matrix format '{format}'")));
        }

        let symmetry = self.symmetry();
        if symmetry.eq_ignore_ascii_case("general") {
            Ok(MatrixType::GeneralSparse)
        } else if symmetry.eq_ignore_ascii_case("symmetric") {
            Ok(MatrixType::SymmetricSparse)
        } else {
            Err(Error::unsupported(format!("matrix symmetry '{symmetry}'")))
        }
    }

    /// Datatype described by the value field
    pub fn datatype(&self) -> Result<Datatype> {
        let field = self.field();
        [
            ("pattern", Datatype::Pattern),
            ("integer", Datatype::Integer),
            ("real", Datatype::Real),
            ("complex", Datatype::Complex),
        ]
        .into_iter()
        .find(|(name, _)| field.eq_ignore_ascii_case(name))
        .map(|(_, datatype)| datatype)
        .ok_or_else(|| Error::unsupported(format!("matrix datatype '{field}'")))
    }

    /// Both typed properties at once
    pub fn validate(&self) -> Result<(MatrixType, Datatype)> {
        Ok((self.matrix_type()?, self.datatype()?))
    }
}

/// Parse the banner, comments and size line of an MTX file
///
/// On success the reader is positioned at the first data line and
/// [`MtxHeader::data_offset`] holds the number of bytes consumed.
pub fn parse_header<R: BufRead>(reader: &mut R) -> Result<MtxHeader> {
    let mut lines = LineReader::new(reader);

    let (banner_offset, banner) = loop {
        match lines.next_line()? {
            Some((_, line)) if line.trim().is_empty() => continue,
            Some(entry) => break entry,
            None => return Err(Error::format("missing MatrixMarket banner", 0)),
        }
    };

    let fields: Vec<&str> = banner.split_whitespace().collect();
    if fields.len() != 5 {
        return Err(Error::format(
            format!("banner has {} fields, expected 5", fields.len()),
            banner_offset,
        ));
    }
    if fields[0] != "%MatrixMarket" && fields[0] != "%%MatrixMarket" {
        return Err(Error::format(
            format!("unrecognized banner '{}'", fields[0]),
            banner_offset,
        ));
    }
    // array files have a two-value size line, so reject them before reading it
    if fields[2].eq_ignore_ascii_case("array") {
        return Err(Error::unsupported("dense (array) matrices are not supported"));
    }
    let properties: [String; 5] = std::array::from_fn(|i| fields[i].to_string());

    let (size_offset, size_line) = loop {
        match lines.next_line()? {
            Some((_, line)) if line.starts_with('%') || line.trim().is_empty() => continue,
            Some(entry) => break entry,
            None => return Err(Error::format("missing size line", lines.offset)),
        }
    };

    let sizes = size_line
        .split_whitespace()
        .map(str::parse::<u64>)
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|err| Error::format(format!("invalid size line: {err}"), size_offset))?;
    let [nrows, ncols, nz] = sizes[..] else {
        return Err(Error::format(
            format!("size line has {} values, expected 3", sizes.len()),
            size_offset,
        ));
    };

    Ok(MtxHeader {
        properties,
        nrows,
        ncols,
        nz,
        data_offset: lines.offset,
    })
}

/// Line reader that tracks the byte offset of each line
struct LineReader<'a, R> {
    reader: &'a mut R,
    buf: Vec<u8>,
    offset: u64,
}

impl<'a, R: BufRead> LineReader<'a, R> {
    fn new(reader: &'a mut R) -> Self {
        Self {
            reader,
            buf: Vec::new(),
            offset: 0,
        }
    }

    /// Next line without its terminator, with the offset it started at
    fn next_line(&mut self) -> Result<Option<(u64, String)>> {
        self.buf.clear();
        let n = self.reader.read_until(b'\n', &mut self.buf)?;
        if n == 0 {
            return Ok(None);
        }

        let start = self.offset;
        self.offset += n as u64;

        let line = String::from_utf8_lossy(&self.buf);
        Ok(Some((start, line.trim_end_matches(['\n', '\r']).to_string())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use std::io::Cursor;

    fn parse(text: &str) -> Result<MtxHeader> {
        parse_header(&mut Cursor::new(text.as_bytes()))
    }

    #[test]
    fn test_parse_basic() {
        let text = "%%MatrixMarket matrix coordinate real general\n% comment\n%another\n3 4 5\n1 1 1.0\n";
        let header = parse(text).unwrap();

        assert_eq!(header.properties[0], "%%MatrixMarket");
        assert_eq!((header.nrows, header.ncols, header.nz), (3, 4, 5));
        assert_eq!(header.data_offset as usize, text.find("1 1 1.0").unwrap());
        assert_eq!(
            header.validate().unwrap(),
            (MatrixType::GeneralSparse, Datatype::Real)
        );
    }

    #[test]
    fn test_single_percent_banner_and_crlf() {
        let text = "%MatrixMarket matrix coordinate pattern symmetric\r\n5 5 2\r\n";
        let header = parse(text).unwrap();
        assert_eq!(header.nz, 2);
        assert_eq!(header.data_offset as usize, text.len());
        assert_eq!(
            header.validate().unwrap(),
            (MatrixType::SymmetricSparse, Datatype::Pattern)
        );
    }

    #[test]
    fn test_bad_banner() {
        let err = parse("%BadFormat 1 2 3 4\n1 1 1\n").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format);

        let err = parse("%%MatrixMarket matrix coordinate real\n1 1 1\n").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format);

        let err = parse("").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format);
    }

    #[test]
    fn test_bad_size_line() {
        let banner = "%%MatrixMarket matrix coordinate real general\n";

        let err = parse(&format!("{banner}3 4\n")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format);

        let err = parse(&format!("{banner}3 4 5 6\n")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format);

        let err = parse(&format!("{banner}3 x 5\n")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format);

        let err = parse(banner).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format);
    }

    #[test]
    fn test_unsupported_properties() {
        let dense = "%%MatrixMarket matrix array real general\n2 2\n1.0\n2.0\n3.0\n4.0\n";
        let err = parse(dense).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unsupported);

        let err = parse("%%MatrixMarket matrix ARRAY real general\n3 3 9\n").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unsupported);

        let header = parse("%%MatrixMarket matrix coordinate real hermitian\n3 3 9\n").unwrap();
        assert_eq!(header.matrix_type().unwrap_err().kind(), ErrorKind::Unsupported);

        let header = parse("%%MatrixMarket matrix coordinate double general\n3 3 9\n").unwrap();
        assert_eq!(header.datatype().unwrap_err().kind(), ErrorKind::Unsupported);
    }

    #[test]
    fn test_keywords_are_case_insensitive() {
        let header = parse("%%MatrixMarket MATRIX Coordinate Integer General\n1 1 1\n").unwrap();
        assert_eq!(
            header.validate().unwrap(),
            (MatrixType::GeneralSparse, Datatype::Integer)
        );
    }
}
