/// `x * y / 255`, rounded, for 8-bit channel math carried in `u16`.
pub(crate) fn mul_div255_u16(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

/// Convert one premultiplied RGBA8 pixel back to straight alpha.
pub(crate) fn unpremultiply_rgba8(px: [u8; 4]) -> [u8; 4] {
    let a = px[3];
    if a == 0 {
        return [0, 0, 0, 0];
    }
    if a == 255 {
        return px;
    }
    let a32 = u32::from(a);
    let channel = |c: u8| ((u32::from(c) * 255 + a32 / 2) / a32).min(255) as u8;
    [channel(px[0]), channel(px[1]), channel(px[2]), a]
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
