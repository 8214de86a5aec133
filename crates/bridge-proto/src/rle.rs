//! Run-length payload compression. Runs of four or more identical bytes
//! are encoded as `(ESCAPE, run_len - 2, byte)`; isolated escape bytes
//! are escaped as `(ESCAPE, 255, ESCAPE)` so every byte value round-trips.

pub const ESCAPE_BYTE: u8 = 0xFF;
pub const MIN_RUN_LENGTH: usize = 4;
pub const MAX_RUN_LENGTH: usize = 256;
pub const MIN_COMPRESS_INPUT_SIZE: usize = 8;
pub const MIN_COMPRESS_SAVINGS: usize = 4;

pub const fn max_encoded_len(src_len: usize) -> usize {
    src_len * 3
}

/// Heuristic: is RLE likely to save at least `MIN_COMPRESS_SAVINGS` net
/// bytes over `src`? Used to decide whether to set the compression flag
/// before spending the cycles to actually encode.
pub fn should_compress(src: &[u8]) -> bool {
    if src.len() < MIN_COMPRESS_INPUT_SIZE {
        return false;
    }

    let mut savings: isize = 0;
    let mut escape_count: usize = 0;
    let mut i = 0;
    while i < src.len() {
        let current = src[i];
        if current == ESCAPE_BYTE {
            escape_count += 1;
            i += 1;
            continue;
        }

        let mut run_len = 1;
        while i + run_len < src.len() && src[i + run_len] == current {
            run_len += 1;
        }

        if run_len >= MIN_RUN_LENGTH {
            savings += run_len as isize - 3;
        }

        i += run_len;
    }

    let escape_cost = (escape_count * 2) as isize;
    savings > escape_cost + MIN_COMPRESS_SAVINGS as isize
}

/// Encodes `src` into `dst`. Returns the encoded length, or `None` on
/// overflow.
pub fn encode(src: &[u8], dst: &mut [u8]) -> Option<usize> {
    let mut src_pos = 0usize;
    let mut dst_pos = 0usize;

    while src_pos < src.len() {
        let current = src[src_pos];

        let mut run_len = 1usize;
        while src_pos + run_len < src.len()
            && src[src_pos + run_len] == current
            && run_len < MAX_RUN_LENGTH
        {
            run_len += 1;
        }

        if run_len >= MIN_RUN_LENGTH {
            if dst_pos + 3 > dst.len() {
                return None;
            }
            dst[dst_pos] = ESCAPE_BYTE;
            dst[dst_pos + 1] = (run_len - 2) as u8;
            dst[dst_pos + 2] = current;
            dst_pos += 3;
            src_pos += run_len;
        } else if current == ESCAPE_BYTE {
            if dst_pos + 3 > dst.len() {
                return None;
            }
            dst[dst_pos] = ESCAPE_BYTE;
            dst[dst_pos + 1] = if run_len == 1 { 255 } else { (run_len - 2) as u8 };
            dst[dst_pos + 2] = ESCAPE_BYTE;
            dst_pos += 3;
            src_pos += run_len;
        } else {
            if dst_pos + 1 > dst.len() {
                return None;
            }
            dst[dst_pos] = current;
            dst_pos += 1;
            src_pos += 1;
        }
    }

    Some(dst_pos)
}

/// Decodes RLE-encoded `src` into `dst`. Returns the decoded length, or
/// `None` on a malformed stream (truncated escape sequence) or overflow.
pub fn decode(src: &[u8], dst: &mut [u8]) -> Option<usize> {
    let mut src_pos = 0usize;
    let mut dst_pos = 0usize;

    while src_pos < src.len() {
        let current = src[src_pos];
        src_pos += 1;

        if current == ESCAPE_BYTE {
            if src_pos + 2 > src.len() {
                return None;
            }
            let count_minus_2 = src[src_pos];
            let byte_val = src[src_pos + 1];
            src_pos += 2;

            let run_len = if count_minus_2 == 255 {
                1usize
            } else {
                count_minus_2 as usize + 2
            };

            if dst_pos + run_len > dst.len() {
                return None;
            }
            dst[dst_pos..dst_pos + run_len].fill(byte_val);
            dst_pos += run_len;
        } else {
            if dst_pos + 1 > dst.len() {
                return None;
            }
            dst[dst_pos] = current;
            dst_pos += 1;
        }
    }

    Some(dst_pos)
}
