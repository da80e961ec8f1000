/// Lossy field-length codec: one byte per document per field.
///
/// Encoding packs `boost / sqrt(field_length)` into an 8-bit minifloat: the
/// top twelve bits of the IEEE-754 single (sign, 8-bit exponent, 3 bits of
/// mantissa precision counting the hidden bit), rebased so that a zero
/// exponent of 15 maps to byte 0. Byte 0 is the sentinel for an empty field.
///
/// Decoding goes through a 256-entry table built once per process. The table
/// stores `1 / f^2` for the minifloat `f` of each byte, because every
/// consumer wants the `length / boost^2` shape directly:
/// `decode(encode(1.0, len)) ~= len` within the quantization error.
use once_cell::sync::Lazy;

/// Number of IEEE-754 mantissa bits dropped by the quantization.
const MANTISSA_SHIFT: u32 = 21;
/// Zero point in quantized space (exponent bias 63, zero exponent 15, three
/// mantissa bits counting the hidden bit).
const ZERO_POINT: i32 = (63 - 15) << 3;

/// Decode table: byte -> approximate field length. Entry 0 is the empty-field
/// sentinel and decodes to 0.
static NORM_TABLE: Lazy<[f32; 256]> = Lazy::new(|| {
    let mut table = [0.0f32; 256];
    for (i, slot) in table.iter_mut().enumerate().skip(1) {
        let f = byte_to_minifloat(i as u8);
        *slot = 1.0 / (f * f);
    }
    table
});

/// Quantize a positive float to the 8-bit minifloat. Non-positive values map
/// to 0, values below the representable range to 1, values above to 255.
fn minifloat_to_byte(f: f32) -> u8 {
    let bits = f.to_bits() as i32;
    let small = bits >> MANTISSA_SHIFT;
    if small <= ZERO_POINT {
        if bits <= 0 {
            0
        } else {
            1
        }
    } else if small >= ZERO_POINT + 0x100 {
        255
    } else {
        (small - ZERO_POINT) as u8
    }
}

/// Expand an 8-bit minifloat back to an f32. Exact inverse of
/// `minifloat_to_byte` on its quantization grid.
fn byte_to_minifloat(b: u8) -> f32 {
    if b == 0 {
        return 0.0;
    }
    let bits = ((b as u32) << MANTISSA_SHIFT) + ((ZERO_POINT as u32) << MANTISSA_SHIFT);
    f32::from_bits(bits)
}

/// Encode a raw field length (token count) into a single byte, folding in the
/// index-time field boost. Length 0 encodes to the empty-field sentinel.
pub fn encode_field_length(boost: f32, field_length: u32) -> u8 {
    if field_length == 0 {
        return 0;
    }
    minifloat_to_byte(boost / (field_length as f32).sqrt())
}

/// Decode a stored length byte into an approximate field length.
pub fn decode_field_length(b: u8) -> f32 {
    NORM_TABLE[b as usize]
}
