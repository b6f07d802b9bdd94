//! Record codec for the MTB data section
//!
//! A record is `row (i64 LE) | col (i64 LE) | value`, with the value layout
//! given by a [`ValueEncoding`]. These functions work on byte slices only;
//! batching and I/O live in the `mtb` crate.

use crate::format::constants::INDEX_SIZE;
use crate::format::{ValueEncoding, Width};
use crate::traits::{Complex, MatrixElement};
use crate::{MtbError, Result, Triplet};

/// Encode one triplet into the front of `out`
///
/// Returns the number of bytes written (the record size).
pub fn encode_record<T: MatrixElement>(
    triplet: &Triplet<T>,
    encoding: ValueEncoding,
    out: &mut [u8],
) -> Result<usize> {
    let size = encoding.record_size();
    if out.len() < size {
        return Err(MtbError::InsufficientBuffer);
    }

    out[0..8].copy_from_slice(&triplet.row.to_le_bytes());
    out[8..16].copy_from_slice(&triplet.col.to_le_bytes());

    let value = &mut out[2 * INDEX_SIZE..size];
    match encoding {
        ValueEncoding::Pattern => {}
        ValueEncoding::Integer(width) => write_integer(triplet.val.to_integer(), width, value),
        ValueEncoding::Real(width) => write_real(triplet.val.to_real(), width, value),
        ValueEncoding::Complex(width) => {
            let Complex { re, im } = triplet.val.to_complex();
            let (re_bytes, im_bytes) = value.split_at_mut(width.bytes());
            write_real(re, width, re_bytes);
            write_real(im, width, im_bytes);
        }
    }

    Ok(size)
}

/// Decode one triplet from the front of `bytes`
pub fn decode_record<T: MatrixElement>(bytes: &[u8], encoding: ValueEncoding) -> Result<Triplet<T>> {
    let size = encoding.record_size();
    if bytes.len() < size {
        return Err(MtbError::InsufficientBuffer);
    }

    let row = read_i64(&bytes[0..8]);
    let col = read_i64(&bytes[8..16]);

    let value = &bytes[2 * INDEX_SIZE..size];
    let val = match encoding {
        ValueEncoding::Pattern => T::one(),
        ValueEncoding::Integer(width) => T::from_integer(read_integer(value, width)),
        ValueEncoding::Real(width) => T::from_real(read_real(value, width)),
        ValueEncoding::Complex(width) => {
            let re = read_real(&value[..width.bytes()], width);
            let im = read_real(&value[width.bytes()..], width);
            T::from_complex(Complex::new(re, im)).ok_or(MtbError::IncompatibleElement)?
        }
    };

    Ok(Triplet { row, col, val })
}

/// Check up front that records of `encoding` can be decoded into `T`
pub fn check_compatible<T: MatrixElement>(encoding: ValueEncoding) -> Result<()> {
    match encoding {
        ValueEncoding::Complex(_) if T::from_complex(Complex::new(0.0, 0.0)).is_none() => {
            Err(MtbError::IncompatibleElement)
        }
        _ => Ok(()),
    }
}

/// Encode a batch of triplets, appending to `out`
#[cfg(feature = "alloc")]
pub fn encode_batch<T: MatrixElement>(
    triplets: &[Triplet<T>],
    encoding: ValueEncoding,
    out: &mut alloc::vec::Vec<u8>,
) -> Result<()> {
    let size = encoding.record_size();
    let start = out.len();
    out.resize(start + triplets.len() * size, 0);

    for (triplet, chunk) in triplets.iter().zip(out[start..].chunks_exact_mut(size)) {
        encode_record(triplet, encoding, chunk)?;
    }
    Ok(())
}

/// Decode every whole record in `bytes`, appending to `out`
///
/// Trailing bytes that do not form a whole record are an error.
#[cfg(feature = "alloc")]
pub fn decode_batch<T: MatrixElement>(
    bytes: &[u8],
    encoding: ValueEncoding,
    out: &mut alloc::vec::Vec<Triplet<T>>,
) -> Result<()> {
    let size = encoding.record_size();
    if bytes.len() % size != 0 {
        return Err(MtbError::InsufficientBuffer);
    }
    check_compatible::<T>(encoding)?;

    out.reserve(bytes.len() / size);
    for chunk in bytes.chunks_exact(size) {
        out.push(decode_record(chunk, encoding)?);
    }
    Ok(())
}

fn write_integer(value: i64, width: Width, out: &mut [u8]) {
    match width {
        // Low four bytes of the two's complement pattern
        Width::Four => out.copy_from_slice(&(value as i32).to_le_bytes()),
        Width::Eight => out.copy_from_slice(&value.to_le_bytes()),
    }
}

fn write_real(value: f64, width: Width, out: &mut [u8]) {
    match width {
        Width::Four => out.copy_from_slice(&(value as f32).to_le_bytes()),
        Width::Eight => out.copy_from_slice(&value.to_le_bytes()),
    }
}

fn read_integer(bytes: &[u8], width: Width) -> i64 {
    match width {
        Width::Four => i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as i64,
        Width::Eight => read_i64(bytes),
    }
}

fn read_real(bytes: &[u8], width: Width) -> f64 {
    match width {
        Width::Four => f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as f64,
        Width::Eight => f64::from_le_bytes([
            bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5], bytes[6], bytes[7],
        ]),
    }
}

fn read_i64(bytes: &[u8]) -> i64 {
    i64::from_le_bytes([
        bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5], bytes[6], bytes[7],
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::Pattern;

    #[test]
    fn test_real_record_layout() {
        let mut buf = [0u8; 24];
        let n = encode_record(
            &Triplet::new(1, 0, 3.0f64),
            ValueEncoding::Real(Width::Eight),
            &mut buf,
        )
        .unwrap();

        assert_eq!(n, 24);
        assert_eq!(&buf[0..8], &1i64.to_le_bytes());
        assert_eq!(&buf[8..16], &0i64.to_le_bytes());
        assert_eq!(&buf[16..24], &3.0f64.to_le_bytes());
    }

    #[test]
    fn test_integer_width_four() {
        let enc = ValueEncoding::Integer(Width::Four);
        let mut buf = [0u8; 20];
        encode_record(&Triplet::new(0, 0, -42i64), enc, &mut buf).unwrap();
        assert_eq!(&buf[16..20], &(-42i32).to_le_bytes());

        let back: Triplet<i64> = decode_record(&buf, enc).unwrap();
        assert_eq!(back.val, -42);

        // Values outside i32 keep only their low four bytes
        encode_record(&Triplet::new(0, 0, (1i64 << 32) + 7), enc, &mut buf).unwrap();
        let back: Triplet<i64> = decode_record(&buf, enc).unwrap();
        assert_eq!(back.val, 7);
    }

    #[test]
    fn test_real_width_four() {
        let enc = ValueEncoding::Real(Width::Four);
        let mut buf = [0u8; 20];
        encode_record(&Triplet::new(2, 3, 0.1f64), enc, &mut buf).unwrap();

        let back: Triplet<f32> = decode_record(&buf, enc).unwrap();
        assert_eq!(back, Triplet::new(2, 3, 0.1f32));
    }

    #[test]
    fn test_complex_record() {
        let enc = ValueEncoding::Complex(Width::Eight);
        let mut buf = [0u8; 32];
        let t = Triplet::new(5, 6, Complex::new(1.25f64, -0.5));
        encode_record(&t, enc, &mut buf).unwrap();

        assert_eq!(&buf[16..24], &1.25f64.to_le_bytes());
        assert_eq!(&buf[24..32], &(-0.5f64).to_le_bytes());
        assert_eq!(decode_record::<Complex<f64>>(&buf, enc).unwrap(), t);

        assert_eq!(
            decode_record::<f64>(&buf, enc),
            Err(MtbError::IncompatibleElement)
        );
    }

    #[test]
    fn test_pattern_decodes_to_one() {
        let enc = ValueEncoding::Pattern;
        let mut buf = [0u8; 16];
        assert_eq!(encode_record(&Triplet::new(7, 8, Pattern), enc, &mut buf), Ok(16));

        assert_eq!(decode_record::<f64>(&buf, enc).unwrap(), Triplet::new(7, 8, 1.0));
        assert_eq!(decode_record::<i32>(&buf, enc).unwrap(), Triplet::new(7, 8, 1));
        assert_eq!(
            decode_record::<Complex<f32>>(&buf, enc).unwrap().val,
            Complex::new(1.0, 0.0)
        );
    }

    #[test]
    fn test_short_buffers() {
        let mut buf = [0u8; 23];
        assert_eq!(
            encode_record(&Triplet::new(0, 0, 1.0f64), ValueEncoding::Real(Width::Eight), &mut buf),
            Err(MtbError::InsufficientBuffer)
        );
        assert_eq!(
            decode_record::<f64>(&buf, ValueEncoding::Real(Width::Eight)),
            Err(MtbError::InsufficientBuffer)
        );
    }

    #[cfg(feature = "alloc")]
    #[test]
    fn test_batch_round_trip() {
        use alloc::vec::Vec;

        let enc = ValueEncoding::Real(Width::Eight);
        let triplets: Vec<Triplet<f64>> = (0..100)
            .map(|i| Triplet::new(i, 99 - i, i as f64 * 0.5))
            .collect();

        let mut bytes = Vec::new();
        encode_batch(&triplets, enc, &mut bytes).unwrap();
        assert_eq!(bytes.len(), 100 * 24);

        let mut decoded = Vec::new();
        decode_batch(&bytes, enc, &mut decoded).unwrap();
        assert_eq!(decoded, triplets);

        assert_eq!(
            decode_batch(&bytes[..50], enc, &mut decoded),
            Err(MtbError::InsufficientBuffer)
        );
    }
}
