//! Byte cursor with numeric scanning for MTX data lines

/// Reason a scan did not produce a value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanError {
    /// The buffer ended before a token started
    EndOfBuffer,
    /// The bytes at the cursor are not a token of the requested kind
    Invalid,
}

/// Forward-only cursor over a byte slice
///
/// Scanning functions skip leading blanks on the current line, stop at the
/// first byte that cannot continue the token, and leave the cursor untouched
/// when they fail.
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> ByteCursor<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn is_at_end(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    pub fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    /// Skip spaces, tabs and carriage returns, stopping at a newline
    pub fn skip_whitespace(&mut self) -> Result<(), ScanError> {
        while let Some(b) = self.peek() {
            if !matches!(b, b' ' | b'\t' | b'\r') {
                return Ok(());
            }
            self.pos += 1;
        }
        Err(ScanError::EndOfBuffer)
    }

    /// Skip all whitespace including newlines
    pub fn skip_blank(&mut self) {
        while matches!(self.peek(), Some(b) if b.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    /// Advance past the next newline, or to the end
    pub fn skip_line(&mut self) {
        match self.bytes[self.pos.min(self.bytes.len())..]
            .iter()
            .position(|&b| b == b'\n')
        {
            Some(i) => self.pos += i + 1,
            None => self.pos = self.bytes.len(),
        }
    }

    /// Scan an unsigned decimal integer
    pub fn read_uint(&mut self) -> Result<u64, ScanError> {
        let start = self.token_start()?;
        if self.peek() == Some(b'+') {
            self.pos += 1;
        }
        self.digits_u64().map_err(|err| {
            self.pos = start;
            err
        })
    }

    /// Scan a signed decimal integer
    pub fn read_int(&mut self) -> Result<i64, ScanError> {
        let start = self.token_start()?;

        let negative = match self.peek() {
            Some(b'-') => {
                self.pos += 1;
                true
            }
            Some(b'+') => {
                self.pos += 1;
                false
            }
            _ => false,
        };

        let result = self.digits_u64().and_then(|magnitude| {
            if negative {
                0i64.checked_sub_unsigned(magnitude).ok_or(ScanError::Invalid)
            } else {
                i64::try_from(magnitude).map_err(|_| ScanError::Invalid)
            }
        });
        if result.is_err() {
            self.pos = start;
        }
        result
    }

    /// Scan a decimal floating point number
    ///
    /// Accepts an optional sign, digits with an optional fraction, an optional
    /// exponent, and the words `inf`, `infinity` and `nan`.
    pub fn read_float(&mut self) -> Result<f64, ScanError> {
        let start = self.token_start()?;
        let text_start = self.pos;

        if matches!(self.peek(), Some(b'+' | b'-')) {
            self.pos += 1;
        }

        let end = match self.peek() {
            Some(b'i' | b'I' | b'n' | b'N') => self.word_end(),
            _ => self.number_end(),
        };

        let parsed = end.and_then(|end| {
            std::str::from_utf8(&self.bytes[text_start..end])
                .ok()
                .and_then(|text| text.parse::<f64>().ok())
                .map(|value| (end, value))
        });

        match parsed {
            Some((end, value)) => {
                self.pos = end;
                Ok(value)
            }
            None => {
                self.pos = start;
                Err(ScanError::Invalid)
            }
        }
    }

    /// Skip to the next token, returning the position to restore on failure
    fn token_start(&mut self) -> Result<usize, ScanError> {
        let start = self.pos;
        self.skip_whitespace().map_err(|err| {
            self.pos = start;
            err
        })?;
        Ok(start)
    }

    fn digits_u64(&mut self) -> Result<u64, ScanError> {
        let begin = self.pos;
        let mut value: u64 = 0;

        while let Some(b) = self.peek().filter(u8::is_ascii_digit) {
            value = value
                .checked_mul(10)
                .and_then(|v| v.checked_add((b - b'0') as u64))
                .ok_or(ScanError::Invalid)?;
            self.pos += 1;
        }

        if self.pos == begin {
            return Err(ScanError::Invalid);
        }
        Ok(value)
    }

    fn count_digits(&self, from: usize) -> usize {
        self.bytes[from.min(self.bytes.len())..]
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count()
    }

    /// End of a `digits[.digits][(e|E)[sign]digits]` token starting at the cursor
    fn number_end(&self) -> Option<usize> {
        let mut end = self.pos;

        let int_digits = self.count_digits(end);
        end += int_digits;

        let mut frac_digits = 0;
        if self.bytes.get(end) == Some(&b'.') {
            frac_digits = self.count_digits(end + 1);
            end += 1 + frac_digits;
        }

        if int_digits + frac_digits == 0 {
            return None;
        }

        if matches!(self.bytes.get(end), Some(b'e' | b'E')) {
            let mut exp = end + 1;
            if matches!(self.bytes.get(exp), Some(b'+' | b'-')) {
                exp += 1;
            }
            let exp_digits = self.count_digits(exp);
            if exp_digits > 0 {
                end = exp + exp_digits;
            }
        }

        Some(end)
    }

    /// End of an alphabetic word such as `inf` or `nan`
    fn word_end(&self) -> Option<usize> {
        let len = self.bytes[self.pos..]
            .iter()
            .take_while(|b| b.is_ascii_alphabetic())
            .count();
        (len > 0).then_some(self.pos + len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_uint() {
        let mut cursor = ByteCursor::new(b"  12\t+7 x");
        assert_eq!(cursor.read_uint(), Ok(12));
        assert_eq!(cursor.read_uint(), Ok(7));
        assert_eq!(cursor.read_uint(), Err(ScanError::Invalid));
        // failure leaves the cursor in place
        assert_eq!(cursor.position(), 7);
        let mut blank = ByteCursor::new(b"   ");
        assert_eq!(blank.read_uint(), Err(ScanError::EndOfBuffer));
        assert_eq!(blank.position(), 0);
        assert_eq!(
            ByteCursor::new(b"99999999999999999999999").read_uint(),
            Err(ScanError::Invalid)
        );
    }

    #[test]
    fn test_read_int() {
        let mut cursor = ByteCursor::new(b"-5 +6 7 -9223372036854775808");
        assert_eq!(cursor.read_int(), Ok(-5));
        assert_eq!(cursor.read_int(), Ok(6));
        assert_eq!(cursor.read_int(), Ok(7));
        assert_eq!(cursor.read_int(), Ok(i64::MIN));
        assert_eq!(cursor.read_int(), Err(ScanError::EndOfBuffer));

        assert_eq!(
            ByteCursor::new(b"9223372036854775808").read_int(),
            Err(ScanError::Invalid)
        );
        assert_eq!(ByteCursor::new(b"-").read_int(), Err(ScanError::Invalid));
    }

    #[test]
    fn test_read_float() {
        let mut cursor = ByteCursor::new(b"1.5 -2e3 .25 7. 1E-2 +3 inf -NaN");
        assert_eq!(cursor.read_float(), Ok(1.5));
        assert_eq!(cursor.read_float(), Ok(-2000.0));
        assert_eq!(cursor.read_float(), Ok(0.25));
        assert_eq!(cursor.read_float(), Ok(7.0));
        assert_eq!(cursor.read_float(), Ok(0.01));
        assert_eq!(cursor.read_float(), Ok(3.0));
        assert_eq!(cursor.read_float(), Ok(f64::INFINITY));
        assert!(cursor.read_float().unwrap().is_nan());
        assert_eq!(cursor.read_float(), Err(ScanError::EndOfBuffer));
    }

    #[test]
    fn test_read_float_stops_at_non_numeric() {
        let mut cursor = ByteCursor::new(b"4.0e+ 2");
        assert_eq!(cursor.read_float(), Ok(4.0));
        assert_eq!(cursor.peek(), Some(b'e'));

        assert_eq!(ByteCursor::new(b". 1").read_float(), Err(ScanError::Invalid));
        assert_eq!(ByteCursor::new(b"abc").read_float(), Err(ScanError::Invalid));
    }

    #[test]
    fn test_whitespace_stops_at_newline() {
        let mut cursor = ByteCursor::new(b"1 \n2");
        assert_eq!(cursor.read_uint(), Ok(1));
        assert_eq!(cursor.read_uint(), Err(ScanError::Invalid));
        cursor.skip_line();
        assert_eq!(cursor.read_uint(), Ok(2));
        assert!(cursor.is_at_end());
    }

    #[test]
    fn test_skip_blank_and_line() {
        let mut cursor = ByteCursor::new(b"\n\n  % note\n3");
        cursor.skip_blank();
        assert_eq!(cursor.peek(), Some(b'%'));
        cursor.skip_line();
        assert_eq!(cursor.read_uint(), Ok(3));
    }
}
