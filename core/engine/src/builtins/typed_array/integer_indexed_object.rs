//! The integer-indexed view record backing every typed array.

use super::TypedArrayKind;
use crate::{
    bigint::JsBigInt,
    builtins::array_buffer::{with_buffer_bytes, with_buffer_bytes_mut},
    error::JsNativeError,
    object::JsObject,
    value::JsValue,
    Context, JsResult,
};

/// The internal slots of a typed array: `[[ViewedArrayBuffer]]`,
/// `[[TypedArrayName]]`, `[[ByteOffset]]`, `[[ByteLength]]` and
/// `[[ArrayLength]]`.
#[derive(Debug, Clone)]
pub struct IntegerIndexed {
    viewed_array_buffer: JsObject,
    kind: TypedArrayKind,
    byte_offset: u64,
    byte_length: u64,
    array_length: u64,
}

impl IntegerIndexed {
    pub(crate) fn new(
        viewed_array_buffer: JsObject,
        kind: TypedArrayKind,
        byte_offset: u64,
        byte_length: u64,
        array_length: u64,
    ) -> Self {
        Self {
            viewed_array_buffer,
            kind,
            byte_offset,
            byte_length,
            array_length,
        }
    }

    /// The viewed buffer object.
    #[must_use]
    pub fn viewed_array_buffer(&self) -> &JsObject {
        &self.viewed_array_buffer
    }

    /// The element kind of the view.
    #[must_use]
    pub fn kind(&self) -> TypedArrayKind {
        self.kind
    }

    /// The `[[ByteOffset]]` slot.
    #[must_use]
    pub fn byte_offset(&self) -> u64 {
        self.byte_offset
    }

    /// The `[[ByteLength]]` slot.
    #[must_use]
    pub fn byte_length(&self) -> u64 {
        self.byte_length
    }

    /// The `[[ArrayLength]]` slot.
    #[must_use]
    pub fn array_length(&self) -> u64 {
        self.array_length
    }

    /// Reads the element at `index`, returning `None` out of bounds and
    /// `TypeError` on a detached buffer.
    pub(crate) fn get_element(
        &self,
        index: u64,
        _context: &mut Context,
    ) -> JsResult<Option<JsValue>> {
        if index >= self.array_length {
            // Accesses on a detached buffer fail even out of bounds.
            with_buffer_bytes(&self.viewed_array_buffer, |_| ())?;
            return Ok(None);
        }
        let size = self.kind.element_size();
        let offset = (self.byte_offset + index * size) as usize;
        let kind = self.kind;
        let value = with_buffer_bytes(&self.viewed_array_buffer, move |bytes| {
            read_element(kind, &bytes[offset..offset + size as usize])
        })?;
        Ok(Some(value))
    }

    /// Writes the element at `index`, coercing `value` to the element type
    /// first. Out-of-bounds writes are dropped; a detached buffer raises
    /// `TypeError`.
    pub(crate) fn set_element(
        &self,
        index: u64,
        value: JsValue,
        context: &mut Context,
    ) -> JsResult<bool> {
        // The coercion may run user code, so it happens before the buffer
        // is touched.
        let raw = coerce_element(self.kind, &value, context)?;
        if index >= self.array_length {
            with_buffer_bytes(&self.viewed_array_buffer, |_| ())?;
            return Ok(false);
        }
        let size = self.kind.element_size() as usize;
        let offset = (self.byte_offset + index * self.kind.element_size()) as usize;
        with_buffer_bytes_mut(&self.viewed_array_buffer, move |bytes| {
            bytes[offset..offset + size].copy_from_slice(&raw[..size]);
        })?;
        Ok(true)
    }
}

/// Reads one element from `bytes` in the platform's byte order.
fn read_element(kind: TypedArrayKind, bytes: &[u8]) -> JsValue {
    macro_rules! read {
        ($ty:ty) => {{
            let mut raw = [0u8; std::mem::size_of::<$ty>()];
            raw.copy_from_slice(bytes);
            <$ty>::from_ne_bytes(raw)
        }};
    }

    match kind {
        TypedArrayKind::Int8 => JsValue::from(i32::from(bytes[0] as i8)),
        TypedArrayKind::Uint8 | TypedArrayKind::Uint8Clamped => {
            JsValue::from(i32::from(bytes[0]))
        }
        TypedArrayKind::Int16 => JsValue::from(i32::from(read!(i16))),
        TypedArrayKind::Uint16 => JsValue::from(i32::from(read!(u16))),
        TypedArrayKind::Int32 => JsValue::from(read!(i32)),
        TypedArrayKind::Uint32 => JsValue::from(read!(u32)),
        TypedArrayKind::BigInt64 => JsValue::from(JsBigInt::from(read!(i64))),
        TypedArrayKind::BigUint64 => JsValue::from(JsBigInt::from(read!(u64))),
        TypedArrayKind::Float32 => JsValue::from(f64::from(read!(f32))),
        TypedArrayKind::Float64 => JsValue::from(read!(f64)),
    }
}

/// `ToUint8Clamp ( argument )`: clamps into `0..=255`, rounding ties to
/// even.
fn to_uint8_clamp(number: f64) -> u8 {
    if number.is_nan() || number <= 0.0 {
        return 0;
    }
    if number >= 255.0 {
        return 255;
    }
    let floor = number.floor();
    let diff = number - floor;
    if diff > 0.5 || (diff == 0.5 && floor % 2.0 != 0.0) {
        (floor + 1.0) as u8
    } else {
        floor as u8
    }
}

/// Truncates an `f64` into the bottom `bits` bits, modulo 2^bits.
fn to_uint_bits(number: f64, bits: u32) -> u64 {
    if number.is_nan() || number.is_infinite() || number == 0.0 {
        return 0;
    }
    let modulus = 2f64.powi(bits as i32);
    let truncated = number.trunc().rem_euclid(modulus);
    truncated as u64
}

/// Coerces `value` into the raw bytes of one element of `kind`.
fn coerce_element(
    kind: TypedArrayKind,
    value: &JsValue,
    context: &mut Context,
) -> JsResult<[u8; 8]> {
    let mut raw = [0u8; 8];
    if kind.is_bigint() {
        let bigint = value.as_bigint().ok_or_else(|| {
            JsNativeError::typ().with_message("cannot convert value to a BigInt element")
        })?;
        match kind {
            TypedArrayKind::BigInt64 => raw.copy_from_slice(&bigint.to_big_int64().to_ne_bytes()),
            TypedArrayKind::BigUint64 => {
                raw.copy_from_slice(&bigint.to_big_uint64().to_ne_bytes())
            }
            _ => unreachable!("checked bigint kinds above"),
        }
        return Ok(raw);
    }

    let number = value.to_number(context)?;
    match kind {
        TypedArrayKind::Int8 | TypedArrayKind::Uint8 => {
            raw[0] = to_uint_bits(number, 8) as u8;
        }
        TypedArrayKind::Uint8Clamped => {
            raw[0] = to_uint8_clamp(number);
        }
        TypedArrayKind::Int16 | TypedArrayKind::Uint16 => {
            raw[..2].copy_from_slice(&(to_uint_bits(number, 16) as u16).to_ne_bytes());
        }
        TypedArrayKind::Int32 | TypedArrayKind::Uint32 => {
            raw[..4].copy_from_slice(&(to_uint_bits(number, 32) as u32).to_ne_bytes());
        }
        TypedArrayKind::Float32 => {
            raw[..4].copy_from_slice(&(number as f32).to_ne_bytes());
        }
        TypedArrayKind::Float64 => {
            raw.copy_from_slice(&number.to_ne_bytes());
        }
        TypedArrayKind::BigInt64 | TypedArrayKind::BigUint64 => {
            unreachable!("handled bigint kinds above")
        }
    }
    Ok(raw)
}

#[cfg(test)]
mod tests {
    use super::{to_uint8_clamp, to_uint_bits};

    #[test]
    fn uint8_clamp_rounds_ties_to_even() {
        assert_eq!(to_uint8_clamp(0.5), 0);
        assert_eq!(to_uint8_clamp(1.5), 2);
        assert_eq!(to_uint8_clamp(2.5), 2);
        assert_eq!(to_uint8_clamp(-3.0), 0);
        assert_eq!(to_uint8_clamp(300.0), 255);
        assert_eq!(to_uint8_clamp(f64::NAN), 0);
    }

    #[test]
    fn uint_bits_wraps() {
        assert_eq!(to_uint_bits(-1.0, 8), 255);
        assert_eq!(to_uint_bits(256.0, 8), 0);
        assert_eq!(to_uint_bits(65_537.0, 16), 1);
    }
}
