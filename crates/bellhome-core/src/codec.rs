//! Text codec for bit sequences.
//!
//! One character per bit (`'0'`/`'1'`), wrapped at a fixed width, each line
//! terminated by `\n`. No header, length prefix or checksum: consumers check
//! the decoded length against what they expect.
//!
//! ```text
//! 0110100101...  (64 chars)
//! 1100101        (remainder)
//! ```

use crate::error::{BellError, Result};

/// Default number of bits per line.
pub const LINE_WIDTH: usize = 64;

/// Converts bit sequences to and from their persisted text form.
pub trait BitCodec {
    fn encode(&self, bits: &[u8]) -> Result<String>;
    fn decode(&self, text: &str) -> Result<Vec<u8>>;
}

/// Line-wrapped `'0'`/`'1'` encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineCodec {
    width: usize,
}

impl LineCodec {
    pub fn new(width: usize) -> Result<Self> {
        if width == 0 {
            return Err(BellError::InvalidConfig(
                "codec line width must be positive".to_string(),
            ));
        }
        Ok(Self { width })
    }

    pub fn width(&self) -> usize {
        self.width
    }
}

impl Default for LineCodec {
    fn default() -> Self {
        Self { width: LINE_WIDTH }
    }
}

impl BitCodec for LineCodec {
    fn encode(&self, bits: &[u8]) -> Result<String> {
        let lines = bits.len().div_ceil(self.width);
        let mut text = String::with_capacity(bits.len() + lines);
        for (line, chunk) in bits.chunks(self.width).enumerate() {
            for &bit in chunk {
                match bit {
                    0 => text.push('0'),
                    1 => text.push('1'),
                    other => {
                        return Err(BellError::Encoding {
                            line: line + 1,
                            reason: format!("value {other} needs more than one character"),
                        });
                    }
                }
            }
            text.push('\n');
        }
        Ok(text)
    }

    fn decode(&self, text: &str) -> Result<Vec<u8>> {
        let lines: Vec<&str> = text.lines().collect();
        let mut bits = Vec::with_capacity(lines.len() * self.width);
        for (i, line) in lines.iter().enumerate() {
            let line_no = i + 1;
            let width = line.chars().count();
            let is_last = i + 1 == lines.len();
            let width_ok = if is_last {
                (1..=self.width).contains(&width)
            } else {
                width == self.width
            };
            if !width_ok {
                return Err(BellError::Encoding {
                    line: line_no,
                    reason: format!("expected {} characters, found {width}", self.width),
                });
            }
            for c in line.chars() {
                match c {
                    '0' => bits.push(0),
                    '1' => bits.push(1),
                    other => {
                        return Err(BellError::Encoding {
                            line: line_no,
                            reason: format!("non-binary character {other:?}"),
                        });
                    }
                }
            }
        }
        Ok(bits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_short() {
        let text = LineCodec::default().encode(&[0, 1, 1, 0]).unwrap();
        assert_eq!(text, "0110\n");
    }

    #[test]
    fn test_encode_wraps_at_width() {
        let codec = LineCodec::new(4).unwrap();
        let text = codec.encode(&[1, 0, 1, 0, 1, 1, 0]).unwrap();
        assert_eq!(text, "1010\n110\n");
    }

    #[test]
    fn test_encode_exact_multiple() {
        let bits = vec![1u8; 128];
        let text = LineCodec::default().encode(&bits).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines.iter().all(|l| l.len() == 64));
        assert!(text.ends_with('\n'));
    }

    #[test]
    fn test_encode_empty() {
        assert_eq!(LineCodec::default().encode(&[]).unwrap(), "");
        assert!(LineCodec::default().decode("").unwrap().is_empty());
    }

    #[test]
    fn test_roundtrip_odd_lengths() {
        let codec = LineCodec::default();
        for len in [1, 63, 64, 65, 130, 1000] {
            let bits: Vec<u8> = (0..len).map(|i| ((i * 7 + 3) % 5 % 2) as u8).collect();
            let text = codec.encode(&bits).unwrap();
            assert_eq!(codec.decode(&text).unwrap(), bits, "len={len}");
        }
    }

    #[test]
    fn test_encode_rejects_non_binary() {
        let err = LineCodec::default().encode(&[0, 1, 2]).unwrap_err();
        assert!(matches!(err, BellError::Encoding { line: 1, .. }));
    }

    #[test]
    fn test_decode_rejects_non_binary() {
        let err = LineCodec::default().decode("01x1\n").unwrap_err();
        assert!(matches!(err, BellError::Encoding { line: 1, .. }));
    }

    #[test]
    fn test_decode_rejects_short_inner_line() {
        let codec = LineCodec::new(4).unwrap();
        let err = codec.decode("101\n1100\n").unwrap_err();
        assert!(matches!(err, BellError::Encoding { line: 1, .. }));
    }

    #[test]
    fn test_decode_rejects_long_last_line() {
        let codec = LineCodec::new(4).unwrap();
        let err = codec.decode("1010\n11001\n").unwrap_err();
        assert!(matches!(err, BellError::Encoding { line: 2, .. }));
    }

    #[test]
    fn test_decode_rejects_blank_line() {
        let codec = LineCodec::new(4).unwrap();
        assert!(codec.decode("1010\n\n").is_err());
    }

    #[test]
    fn test_decode_accepts_crlf_and_missing_final_newline() {
        let codec = LineCodec::new(4).unwrap();
        assert_eq!(codec.decode("1010\r\n01").unwrap(), vec![1, 0, 1, 0, 0, 1]);
    }

    #[test]
    fn test_zero_width_rejected() {
        assert!(LineCodec::new(0).is_err());
    }
}
