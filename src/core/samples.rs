//! Purpose: Decode raw 16-bit little-endian PCM byte buffers into samples.
//! Exports: `convert`, `convert_strict`, `samples_to_bytes`, `BYTES_PER_SAMPLE`.
//! Role: Pure transform used on captured audio before transcription.
//! Invariants: Byte `2i` is the low byte and byte `2i + 1` the high byte of sample `i`.
//! Invariants: The low byte is never sign-extended; `[0xFF, 0x00]` decodes to 255.
//! Invariants: Output length is `bytes.len() / 2`; input is never mutated.
use super::error::{Error, ErrorKind};

pub const BYTES_PER_SAMPLE: usize = 2;

/// Decodes byte pairs into signed samples, dropping a trailing odd byte.
pub fn convert(bytes: &[u8]) -> Vec<i16> {
    bytes
        .chunks_exact(BYTES_PER_SAMPLE)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
        .collect()
}

/// Like [`convert`], but rejects buffers with an unpaired trailing byte.
pub fn convert_strict(bytes: &[u8]) -> Result<Vec<i16>, Error> {
    if bytes.len() % BYTES_PER_SAMPLE != 0 {
        return Err(Error::new(ErrorKind::MalformedInput)
            .with_message("sample buffer has an odd number of bytes")
            .with_input_len(bytes.len())
            .with_hint("16-bit PCM input must contain whole low/high byte pairs."));
    }
    Ok(convert(bytes))
}

pub fn samples_to_bytes(samples: &[i16]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(samples.len() * BYTES_PER_SAMPLE);
    for sample in samples {
        bytes.extend_from_slice(&sample.to_le_bytes());
    }
    bytes
}

#[cfg(test)]
mod tests {
    use super::{convert, convert_strict, samples_to_bytes};
    use crate::core::error::ErrorKind;

    #[test]
    fn low_byte_first() {
        assert_eq!(convert(&[0x01, 0x00]), vec![1]);
        assert_eq!(convert(&[0x00, 0x01]), vec![256]);
        assert_eq!(convert(&[0x01, 0x20]), vec![0x2001]);
    }

    #[test]
    fn high_bit_in_low_byte_is_not_sign_extended() {
        assert_eq!(convert(&[0xFF, 0x00]), vec![255]);
        assert_eq!(convert(&[0x80, 0x01]), vec![384]);
    }

    #[test]
    fn samples_are_signed() {
        assert_eq!(convert(&[0xFF, 0xFF]), vec![-1]);
        assert_eq!(convert(&[0x00, 0x80]), vec![i16::MIN]);
        assert_eq!(convert(&[0xFF, 0x7F]), vec![i16::MAX]);
    }

    #[test]
    fn even_length_yields_half_as_many_samples() {
        for len in [0usize, 2, 4, 64, 4096] {
            let bytes: Vec<u8> = (0..len).map(|i| (i * 7) as u8).collect();
            assert_eq!(convert(&bytes).len(), len / 2);
        }
    }

    #[test]
    fn odd_length_drops_trailing_byte() {
        assert_eq!(convert(&[0x7F]), Vec::<i16>::new());
        assert_eq!(convert(&[0x01, 0x00, 0xAB]), vec![1]);
        assert_eq!(
            convert(&[0x01, 0x00, 0x02, 0x00, 0xFF]),
            convert(&[0x01, 0x00, 0x02, 0x00])
        );
    }

    #[test]
    fn strict_rejects_odd_length() {
        let err = convert_strict(&[0x01, 0x00, 0xAB]).expect_err("odd length");
        assert_eq!(err.kind(), ErrorKind::MalformedInput);
        assert_eq!(err.input_len(), Some(3));
        assert_eq!(convert_strict(&[0x01, 0x00]).expect("even"), vec![1]);
    }

    #[test]
    fn decodes_what_was_encoded() {
        let samples = [0i16, 1, -1, 255, -256, 12_345, -12_345, i16::MIN, i16::MAX];
        let bytes = samples_to_bytes(&samples);
        assert_eq!(bytes.len(), samples.len() * 2);
        assert_eq!(convert(&bytes), samples);
    }
}
