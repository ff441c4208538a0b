pub fn u8_array_to_u32(data: &[u8; 4]) -> u32 {
    ((data[0] as u32) << 0)
        + ((data[1] as u32) << 8)
        + ((data[2] as u32) << 16)
        + ((data[3] as u32) << 24)
}

pub fn u32_to_u8_array(x: u32) -> [u8; 4] {
    let b3 = ((x >> 24) & 0xff) as u8;
    let b2 = ((x >> 16) & 0xff) as u8;
    let b1 = ((x >> 8) & 0xff) as u8;
    let b0 = ((x >> 0) & 0xff) as u8;

    [b0, b1, b2, b3]
}

/**
Render a byte array like this, for trace logging:
0000 | 0d 01 00 00 00 00 00 00 00 00 00 00 db 07 00 00
0010 | 00 00 00 00 61 64 6d 69 6e 2e 24 63 6d 64 00 00
**/
pub fn hex_dump(buffer: &[u8]) -> String {
    let mut dump = String::with_capacity(buffer.len() * 3 + buffer.len() / 16 * 8);
    for (i, byte) in buffer.iter().enumerate() {
        if i % 16 == 0 {
            if i > 0 {
                dump.push('\n');
            }
            dump.push_str(&format!("{:04x} | ", i));
        }
        dump.push_str(&format!("{:02x} ", byte));
    }
    dump
}
