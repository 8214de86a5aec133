//! Consistent Overhead Byte Stuffing. Removes every `0x00` byte from the
//! stream so it can be used unambiguously as a packet terminator.

/// Worst-case encoded length for `src_len` raw bytes: one code byte per
/// up to 254 data bytes, plus the data itself.
pub const fn max_encoded_len(src_len: usize) -> usize {
    src_len + src_len / 254 + 1
}

/// Encodes `src` into `dst`, returning the number of bytes written.
/// `dst` must be at least `max_encoded_len(src.len())` bytes. Returns
/// `None` if `dst` is too small.
pub fn encode(src: &[u8], dst: &mut [u8]) -> Option<usize> {
    if src.is_empty() {
        return Some(0);
    }
    if dst.len() < max_encoded_len(src.len()) {
        return None;
    }

    let mut write = 0usize;
    let mut code_index = 0usize;
    write += 1; // reserve the code byte slot
    let mut code: u8 = 1;

    for &byte in src {
        if byte == 0 {
            dst[code_index] = code;
            code_index = write;
            write += 1;
            code = 1;
        } else {
            dst[write] = byte;
            write += 1;
            code += 1;

            if code == 0xFF {
                dst[code_index] = code;
                code_index = write;
                write += 1;
                code = 1;
            }
        }
    }

    dst[code_index] = code;
    Some(write)
}

/// Decodes a COBS-encoded packet (without its terminator) into `dst`.
/// Returns the decoded length, or `None` if the input is malformed (an
/// in-stream zero byte, a truncated group) or `dst` is too small.
pub fn decode(src: &[u8], dst: &mut [u8]) -> Option<usize> {
    if src.is_empty() {
        return Some(0);
    }

    let mut read = 0usize;
    let mut write = 0usize;

    while read < src.len() {
        let code = src[read];
        read += 1;

        if code == 0 {
            return None;
        }

        let run = (code - 1) as usize;
        if read + run > src.len() {
            return None;
        }
        if write + run > dst.len() {
            return None;
        }
        dst[write..write + run].copy_from_slice(&src[read..read + run]);
        write += run;
        read += run;

        if code < 0xFF && read < src.len() {
            if write >= dst.len() {
                return None;
            }
            dst[write] = 0;
            write += 1;
        }
    }

    Some(write)
}

#[cfg(test)]
mod tests {
    #[macro_use]
    extern crate std;
    use std::vec::Vec;

    use super::*;

    fn round_trip(input: &[u8]) {
        let mut enc = vec![0u8; max_encoded_len(input.len())];
        let enc_len = encode(input, &mut enc).expect("encode should fit");
        let enc = &enc[..enc_len];
        assert!(!enc.contains(&0), "encoded output must contain no zero byte");

        let mut dec = vec![0u8; input.len().max(1)];
        let dec_len = decode(enc, &mut dec).expect("decode should succeed");
        assert_eq!(&dec[..dec_len], input);
    }

    #[test]
    fn empty_input() {
        round_trip(&[]);
    }

    #[test]
    fn no_zeros() {
        round_trip(&[1, 2, 3, 4, 5]);
    }

    #[test]
    fn with_embedded_zeros() {
        round_trip(&[0x11, 0x00, 0x22, 0x00, 0x00, 0x33]);
    }

    #[test]
    fn long_run_without_zero_crosses_254_boundary() {
        let input: Vec<u8> = (0..300).map(|i| (i % 255 + 1) as u8).collect();
        round_trip(&input);
    }

    #[test]
    fn decode_rejects_embedded_zero_in_encoded_stream() {
        let mut dst = [0u8; 8];
        assert_eq!(decode(&[0x02, 0x41, 0x00, 0x01], &mut dst), None);
    }

    #[test]
    fn decode_rejects_truncated_group() {
        let mut dst = [0u8; 8];
        assert_eq!(decode(&[0x05, 0x41, 0x42], &mut dst), None);
    }

    #[test]
    fn max_raw_frame_round_trips() {
        let input: Vec<u8> = (0..265u32).map(|i| (i % 256) as u8).collect();
        round_trip(&input);
    }
}
