use zeroize::Zeroize;

/// Zeroes a buffer in a way the compiler cannot optimize away, for
/// clearing handshake secrets, derived tags and nonces after use.
pub fn secure_wipe(buf: &mut [u8]) {
    buf.zeroize();
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;

    #[test]
    fn zeroes_buffer() {
        let mut buf = [0xAAu8; 16];
        secure_wipe(&mut buf);
        assert_eq!(buf, [0u8; 16]);
    }
}
