use std::{fmt, str::FromStr};

use super::ContainerError;

/// The element type of a dataset, named the way numpy/h5py name them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dtype {
    Bool,
    /// Signed integer with the given number of bits.
    Int(u8),
    /// Unsigned integer with the given number of bits.
    UInt(u8),
    Float(u8),
    /// Complex float; the bits cover both components (i.e. complex64 is two
    /// float32s).
    Complex(u8),
    /// Fixed- or variable-length string/bytes.
    Str,
}

impl fmt::Display for Dtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dtype::Bool => write!(f, "bool"),
            Dtype::Int(b) => write!(f, "int{b}"),
            Dtype::UInt(b) => write!(f, "uint{b}"),
            Dtype::Float(b) => write!(f, "float{b}"),
            Dtype::Complex(b) => write!(f, "complex{b}"),
            Dtype::Str => write!(f, "str"),
        }
    }
}

impl FromStr for Dtype {
    type Err = ContainerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || ContainerError::UnknownDtype(s.to_string());
        let bits = |digits: &str, allowed: &[u8]| -> Result<u8, ContainerError> {
            match digits.parse::<u8>() {
                Ok(b) if allowed.contains(&b) => Ok(b),
                _ => Err(bad()),
            }
        };

        match s {
            "bool" => Ok(Dtype::Bool),
            "str" | "bytes" | "object" => Ok(Dtype::Str),
            _ => {
                if let Some(d) = s.strip_prefix("uint") {
                    bits(d, &[8, 16, 32, 64]).map(Dtype::UInt)
                } else if let Some(d) = s.strip_prefix("int") {
                    bits(d, &[8, 16, 32, 64]).map(Dtype::Int)
                } else if let Some(d) = s.strip_prefix("float") {
                    bits(d, &[16, 32, 64]).map(Dtype::Float)
                } else if let Some(d) = s.strip_prefix("complex") {
                    bits(d, &[64, 128]).map(Dtype::Complex)
                } else if let Some(n) = s.strip_prefix('S').or_else(|| s.strip_prefix('U')) {
                    // Fixed-width numpy strings, e.g. S8 or U16.
                    match n.parse::<usize>() {
                        Ok(_) => Ok(Dtype::Str),
                        Err(_) => Err(bad()),
                    }
                } else {
                    Err(bad())
                }
            }
        }
    }
}

impl TryFrom<String> for Dtype {
    type Error = ContainerError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Array element types with a known [Dtype].
pub trait Element {
    const DTYPE: Dtype;
}

macro_rules! impl_element {
    ($($t:ty => $d:expr),* $(,)?) => {
        $(impl Element for $t {
            const DTYPE: Dtype = $d;
        })*
    };
}

impl_element!(
    bool => Dtype::Bool,
    i8 => Dtype::Int(8),
    i16 => Dtype::Int(16),
    i32 => Dtype::Int(32),
    i64 => Dtype::Int(64),
    u8 => Dtype::UInt(8),
    u16 => Dtype::UInt(16),
    u32 => Dtype::UInt(32),
    u64 => Dtype::UInt(64),
    f32 => Dtype::Float(32),
    f64 => Dtype::Float(64),
    String => Dtype::Str,
    &str => Dtype::Str,
);
