//! An interned, cheaply clonable UTF-8 string type used for property keys and
//! string values.
//!
//! Equality first compares the interned pointers, falling back to a content
//! comparison for strings created outside the interner (e.g. by
//! concatenation).

use rustc_hash::FxHashSet;
use std::{
    cell::RefCell,
    fmt,
    hash::{Hash, Hasher},
    ops::Deref,
    rc::Rc,
};

thread_local! {
    static STRING_CACHE: RefCell<FxHashSet<Rc<str>>> = RefCell::new(FxHashSet::default());
}

/// A shared, interned UTF-8 string.
#[derive(Clone, Eq, PartialOrd, Ord)]
pub struct JsString {
    inner: Rc<str>,
}

impl JsString {
    /// Creates a `JsString` from a string slice, interning it.
    pub fn new(string: &str) -> Self {
        STRING_CACHE.with(|cache| {
            let mut cache = cache.borrow_mut();
            if let Some(inner) = cache.get(string) {
                return Self {
                    inner: inner.clone(),
                };
            }
            let inner: Rc<str> = Rc::from(string);
            cache.insert(inner.clone());
            Self { inner }
        })
    }

    /// Creates a `JsString` by concatenating `strings`, without interning the
    /// result.
    pub fn concat_array(strings: &[&str]) -> Self {
        let mut buffer = String::with_capacity(strings.iter().map(|s| s.len()).sum());
        for string in strings {
            buffer.push_str(string);
        }
        Self {
            inner: Rc::from(buffer.as_str()),
        }
    }

    /// Obtains the underlying string slice.
    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// Copies the string into an owned [`String`].
    pub fn to_std_string(&self) -> String {
        self.inner.to_string()
    }

    /// Checks if the string contains only whitespace per the language's
    /// trimming rules.
    pub(crate) fn trimmed(&self) -> &str {
        self.inner.trim_matches(is_trimmable_whitespace)
    }

    /// Converts the string to a canonical array index, if it is one.
    ///
    /// `"0"`..=`"4294967294"` without leading zeros are array indices;
    /// everything else is a plain string key.
    pub(crate) fn as_array_index(&self) -> Option<u32> {
        let s = self.as_str();
        if s == "0" {
            return Some(0);
        }
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) || s.starts_with('0') {
            return None;
        }
        let index = s.parse::<u32>().ok()?;
        (index < u32::MAX).then_some(index)
    }
}

/// Whitespace characters that `String.prototype.trim` and string-to-number
/// coercion remove.
pub(crate) fn is_trimmable_whitespace(c: char) -> bool {
    // The rust implementation of `trim` treats these differently from the
    // language, which additionally trims the BOM and line terminators.
    matches!(
        c,
        '\u{0009}' | '\u{000B}' | '\u{000C}' | '\u{0020}' | '\u{00A0}' | '\u{FEFF}' |
        '\u{000A}' | '\u{000D}' | '\u{2028}' | '\u{2029}' |
        '\u{1680}' | '\u{2000}'..='\u{200A}' | '\u{202F}' | '\u{205F}' | '\u{3000}'
    )
}

impl Default for JsString {
    fn default() -> Self {
        Self::new("")
    }
}

impl PartialEq for JsString {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner) || self.inner == other.inner
    }
}

impl Hash for JsString {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.inner.hash(state);
    }
}

impl AsRef<str> for JsString {
    fn as_ref(&self) -> &str {
        &self.inner
    }
}

impl Deref for JsString {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl fmt::Debug for JsString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.inner.fmt(f)
    }
}

impl fmt::Display for JsString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.inner.fmt(f)
    }
}

impl From<&str> for JsString {
    fn from(string: &str) -> Self {
        Self::new(string)
    }
}

impl From<String> for JsString {
    fn from(string: String) -> Self {
        Self::new(&string)
    }
}

impl From<char> for JsString {
    fn from(c: char) -> Self {
        let mut buf = [0; 4];
        Self::new(c.encode_utf8(&mut buf))
    }
}

impl PartialEq<str> for JsString {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for JsString {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

/// Creates a [`JsString`] from string literals, concatenating multiple
/// arguments into a fresh string.
#[macro_export]
macro_rules! js_string {
    () => {
        $crate::string::JsString::default()
    };
    ($s:expr) => {
        $crate::string::JsString::from($s)
    };
    ($($s:expr),+ $(,)?) => {
        $crate::string::JsString::concat_array(&[$(::std::convert::AsRef::<str>::as_ref(&$s)),+])
    };
}

#[cfg(test)]
mod tests {
    use super::JsString;

    #[test]
    fn interning_shares_storage() {
        let a = JsString::new("hello");
        let b = JsString::new("hello");
        assert_eq!(a, b);
        assert!(std::rc::Rc::ptr_eq(&a.inner, &b.inner));
    }

    #[test]
    fn concat_compares_by_content() {
        let a = js_string!("foo", "bar");
        assert_eq!(a, JsString::new("foobar"));
    }

    #[test]
    fn array_indices() {
        assert_eq!(JsString::new("0").as_array_index(), Some(0));
        assert_eq!(JsString::new("42").as_array_index(), Some(42));
        assert_eq!(JsString::new("01").as_array_index(), None);
        assert_eq!(JsString::new("-1").as_array_index(), None);
        assert_eq!(JsString::new("4294967295").as_array_index(), None);
    }
}
