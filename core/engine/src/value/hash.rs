//! Hashing consistent with `SameValueZero` equality: `2` and `2.0` hash the
//! same, `-0` hashes like `+0`, and every `NaN` hashes alike.

use super::JsValue;
use std::hash::{Hash, Hasher};

impl Eq for JsValue {}

fn hash_f64<H: Hasher>(number: f64, state: &mut H) {
    if number.is_nan() {
        state.write_u64(u64::MAX);
        return;
    }
    // Canonicalize -0 to +0 so it lands in the same bucket.
    let number = if number == 0.0 { 0.0 } else { number };
    state.write_u64(number.to_bits());
}

impl Hash for JsValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Self::Undefined => state.write_u8(0),
            Self::Null => state.write_u8(1),
            Self::Boolean(b) => {
                state.write_u8(2);
                b.hash(state);
            }
            Self::String(s) => {
                state.write_u8(3);
                s.hash(state);
            }
            Self::Rational(r) => {
                state.write_u8(4);
                hash_f64(*r, state);
            }
            Self::Integer(i) => {
                state.write_u8(4);
                hash_f64(f64::from(*i), state);
            }
            Self::BigInt(b) => {
                state.write_u8(5);
                b.hash(state);
            }
            Self::Symbol(s) => {
                state.write_u8(6);
                state.write_u64(s.hash());
            }
            Self::Object(o) => {
                state.write_u8(7);
                state.write_usize(o.addr());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::JsValue;
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    fn hash_of(value: &JsValue) -> u64 {
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn numeric_variants_hash_alike() {
        assert_eq!(hash_of(&JsValue::Integer(7)), hash_of(&JsValue::Rational(7.0)));
        assert_eq!(
            hash_of(&JsValue::Rational(0.0)),
            hash_of(&JsValue::Rational(-0.0))
        );
        assert_eq!(hash_of(&JsValue::nan()), hash_of(&JsValue::nan()));
    }
}
