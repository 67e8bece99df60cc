/// Growable WKB output buffer with a fixed endianness.
pub(crate) struct WkbWriter {
    buf: Vec<u8>,
    little_endian: bool,
}

impl WkbWriter {
    pub(crate) fn new(little_endian: bool) -> Self {
        let mut writer = WkbWriter {
            buf: Vec::with_capacity(64),
            little_endian,
        };
        writer.write_u8(if little_endian { 0x01 } else { 0x00 });
        writer
    }

    pub(crate) fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    pub(crate) fn write_u8(&mut self, value: u8) {
        self.buf.push(value);
    }

    pub(crate) fn write_u16(&mut self, value: u16) {
        let bytes = if self.little_endian {
            value.to_le_bytes()
        } else {
            value.to_be_bytes()
        };
        self.buf.extend_from_slice(&bytes);
    }

    pub(crate) fn write_u32(&mut self, value: u32) {
        let bytes = if self.little_endian {
            value.to_le_bytes()
        } else {
            value.to_be_bytes()
        };
        self.buf.extend_from_slice(&bytes);
    }

    pub(crate) fn write_i32(&mut self, value: i32) {
        self.write_u32(value as u32);
    }

    pub(crate) fn write_i64(&mut self, value: i64) {
        let bytes = if self.little_endian {
            value.to_le_bytes()
        } else {
            value.to_be_bytes()
        };
        self.buf.extend_from_slice(&bytes);
    }

    pub(crate) fn write_f64(&mut self, value: f64) {
        self.write_i64(value.to_bits() as i64);
    }

    pub(crate) fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }
}

/// Encode bytes as uppercase hex.
pub(crate) fn encode_hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        out.push_str(&format!("{byte:02X}"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endian_flag_is_first() {
        let w = WkbWriter::new(true);
        assert_eq!(w.into_bytes()[0], 0x01);
        let w = WkbWriter::new(false);
        assert_eq!(w.into_bytes()[0], 0x00);
    }

    #[test]
    fn big_endian_layout() {
        let mut w = WkbWriter::new(false);
        w.write_u16(0x1234);
        assert_eq!(w.into_bytes(), vec![0x00, 0x12, 0x34]);
    }

    #[test]
    fn hex_is_uppercase() {
        assert_eq!(encode_hex(&[0x01, 0xab]), "01AB");
    }
}
