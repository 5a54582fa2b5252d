use crate::object::{InternedString, StringInterner};
use std::fmt;

/// A compile-time constant as stored in a chunk's constant pool.
///
/// `nil`, `true` and `false` have dedicated opcodes and never land here.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    Number(f64),
    String(InternedString),
}

impl Value {
    /// Pair the value with the interner needed to print strings.
    pub fn display<'v>(&'v self, strings: &'v StringInterner) -> DisplayValue<'v> {
        DisplayValue {
            value: self,
            strings,
        }
    }
}

pub struct DisplayValue<'v> {
    value: &'v Value,
    strings: &'v StringInterner,
}

impl fmt::Display for DisplayValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value {
            Value::Number(n) => {
                if n.fract() == 0.0 {
                    write!(f, "{:.0}", n)
                } else {
                    write!(f, "{}", n)
                }
            }

            Value::String(s) => write!(f, "{}", self.strings.resolve(*s)),
        }
    }
}
