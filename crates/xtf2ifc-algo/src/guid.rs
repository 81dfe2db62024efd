use uuid::Uuid;

const ALPHABET: &[u8; 64] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz_$";

/// Fresh IFC GlobalId: a random UUID in the 22 character IFC base64 form.
pub fn new_ifc_guid() -> String {
    compress(Uuid::new_v4().as_bytes())
}

/// First byte as two characters, then five groups of three bytes as four
/// characters each.
pub fn compress(bytes: &[u8; 16]) -> String {
    let mut out = String::with_capacity(22);
    push_base64(&mut out, bytes[0] as u32, 2);
    for chunk in bytes[1..].chunks(3) {
        let value = (chunk[0] as u32) << 16 | (chunk[1] as u32) << 8 | chunk[2] as u32;
        push_base64(&mut out, value, 4);
    }
    out
}

fn push_base64(out: &mut String, value: u32, digits: u32) {
    for i in (0..digits).rev() {
        let index = (value >> (6 * i)) & 0x3f;
        out.push(ALPHABET[index as usize] as char);
    }
}
