//! NDS2 sample encodings and their Rust storage types.

use std::fmt;
use std::str::FromStr;

use num_complex::Complex;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::error::LookupError;
use crate::flags::{FlagIndex, NdsFlag};

static INDEX: Lazy<FlagIndex<DataType>> = Lazy::new(FlagIndex::build);

/// Numeric encoding of a channel's samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DataType {
    /// 16-bit signed integer
    Int16,
    /// 32-bit signed integer
    Int32,
    /// 64-bit signed integer
    Int64,
    /// 32-bit float
    Float32,
    /// 64-bit float
    Float64,
    /// Complex pair of 32-bit floats
    Complex32,
    /// 32-bit unsigned integer
    UInt32,
}

impl DataType {
    /// All data types in flag order.
    pub const ALL: [DataType; 7] = [
        DataType::Int16,
        DataType::Int32,
        DataType::Int64,
        DataType::Float32,
        DataType::Float64,
        DataType::Complex32,
        DataType::UInt32,
    ];

    /// The data type stored as `T`.
    #[must_use]
    pub fn of<T: Sample>() -> Self {
        T::DATA_TYPE
    }

    /// Size of one sample in bytes.
    #[must_use]
    pub fn size_bytes(self) -> usize {
        match self {
            DataType::Int16 => std::mem::size_of::<i16>(),
            DataType::Int32 => std::mem::size_of::<i32>(),
            DataType::Int64 => std::mem::size_of::<i64>(),
            DataType::Float32 => std::mem::size_of::<f32>(),
            DataType::Float64 => std::mem::size_of::<f64>(),
            DataType::Complex32 => std::mem::size_of::<Complex<f32>>(),
            DataType::UInt32 => std::mem::size_of::<u32>(),
        }
    }

    /// Name of the Rust storage type.
    #[must_use]
    pub fn rust_type(self) -> &'static str {
        match self {
            DataType::Int16 => "i16",
            DataType::Int32 => "i32",
            DataType::Int64 => "i64",
            DataType::Float32 => "f32",
            DataType::Float64 => "f64",
            DataType::Complex32 => "Complex<f32>",
            DataType::UInt32 => "u32",
        }
    }
}

impl NdsFlag for DataType {
    const TYPE_NAME: &'static str = "DataType";

    fn members() -> &'static [Self] {
        &Self::ALL
    }

    fn value(self) -> u32 {
        match self {
            DataType::Int16 => 1,
            DataType::Int32 => 2,
            DataType::Int64 => 4,
            DataType::Float32 => 8,
            DataType::Float64 => 16,
            DataType::Complex32 => 32,
            DataType::UInt32 => 64,
        }
    }

    fn name(self) -> &'static str {
        match self {
            DataType::Int16 => "INT16",
            DataType::Int32 => "INT32",
            DataType::Int64 => "INT64",
            DataType::Float32 => "FLOAT32",
            DataType::Float64 => "FLOAT64",
            DataType::Complex32 => "COMPLEX32",
            DataType::UInt32 => "UINT32",
        }
    }

    fn nds2name(self) -> &'static str {
        match self {
            DataType::Int16 => "int_2",
            DataType::Int32 => "int_4",
            DataType::Int64 => "int_8",
            DataType::Float32 => "real_4",
            DataType::Float64 => "real_8",
            DataType::Complex32 => "complex_8",
            DataType::UInt32 => "uint_4",
        }
    }

    fn synonyms(self) -> &'static [&'static str] {
        match self {
            DataType::Int16 => &["i16", "short"],
            DataType::Int32 => &["i32", "int"],
            DataType::Int64 => &["i64", "long"],
            DataType::Float32 => &["f32", "single"],
            DataType::Float64 => &["f64", "float", "double"],
            DataType::Complex32 => &["complex64", "complex"],
            DataType::UInt32 => &["u32"],
        }
    }

    fn index() -> &'static FlagIndex<Self> {
        &INDEX
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.nds2name())
    }
}

impl FromStr for DataType {
    type Err = LookupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::find(s)
    }
}

impl TryFrom<String> for DataType {
    type Error = LookupError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::find(&value)
    }
}

impl From<DataType> for String {
    fn from(value: DataType) -> Self {
        value.nds2name().to_string()
    }
}

/// A Rust type that stores samples of one [`DataType`].
pub trait Sample: Copy + 'static {
    /// The encoding this type stores.
    const DATA_TYPE: DataType;
}

impl Sample for i16 {
    const DATA_TYPE: DataType = DataType::Int16;
}

impl Sample for i32 {
    const DATA_TYPE: DataType = DataType::Int32;
}

impl Sample for i64 {
    const DATA_TYPE: DataType = DataType::Int64;
}

impl Sample for f32 {
    const DATA_TYPE: DataType = DataType::Float32;
}

impl Sample for f64 {
    const DATA_TYPE: DataType = DataType::Float64;
}

impl Sample for Complex<f32> {
    const DATA_TYPE: DataType = DataType::Complex32;
}

impl Sample for u32 {
    const DATA_TYPE: DataType = DataType::UInt32;
}
