//! Encoding conversion registry.
//!
//! Each field role resolves its encoding tag to a pair of plain function
//! pointers once, when an accessor is built. Getters then call through the
//! pointer without matching on the encoding again.

use std::error::Error;
use std::fmt;

use bytemuck::Pod;
use cloudpage_core::{EncodingType, PointCloudDataDescriptor};

use crate::raw;

/// Raw field bytes to `raw * scale + offset`.
pub type ToDouble = fn(&[u8], f64, f64) -> f64;

/// Raw field bytes to `raw * scale + offset`, truncated toward zero.
pub type ToInteger = fn(&[u8], f64, f64) -> i64;

/// The role a field plays in the record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldRole {
    /// X, Y, and Z.
    Spatial,
    /// Return intensity.
    Intensity,
    /// Classification code.
    Classification,
}

impl fmt::Display for FieldRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Spatial => f.write_str("spatial"),
            Self::Intensity => f.write_str("intensity"),
            Self::Classification => f.write_str("classification"),
        }
    }
}

/// A role whose encoding has no conversion.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UnsupportedEncoding {
    /// The role that failed to resolve.
    pub role: FieldRole,
    /// Its encoding.
    pub encoding: EncodingType,
}

impl fmt::Display for UnsupportedEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} encoding {} has no point conversion",
            self.role, self.encoding
        )
    }
}

impl Error for UnsupportedEncoding {}

fn to_double<T: Pod + Into<f64>>(bytes: &[u8], scale: f64, offset: f64) -> f64 {
    raw::read::<T>(bytes).into() * scale + offset
}

fn to_integer<T: Pod + Into<f64>>(bytes: &[u8], scale: f64, offset: f64) -> i64 {
    to_double::<T>(bytes, scale, offset) as i64
}

fn pair<T: Pod + Into<f64>>() -> (ToDouble, ToInteger) {
    (to_double::<T>, to_integer::<T>)
}

/// The conversion pair for one encoding.
#[derive(Clone, Copy)]
pub struct Conversion {
    to_double: ToDouble,
    to_integer: ToInteger,
}

impl Conversion {
    /// Look up the pair for `encoding`. Complex encodings have none.
    pub fn for_encoding(encoding: EncodingType) -> Option<Self> {
        let (to_double, to_integer) = match encoding {
            EncodingType::Int1SByte => pair::<i8>(),
            EncodingType::Int1UByte => pair::<u8>(),
            EncodingType::Int2SBytes => pair::<i16>(),
            EncodingType::Int2UBytes => pair::<u16>(),
            EncodingType::Int4SBytes => pair::<i32>(),
            EncodingType::Int4UBytes => pair::<u32>(),
            EncodingType::Flt4Bytes => pair::<f32>(),
            EncodingType::Flt8Bytes => pair::<f64>(),
            EncodingType::Int4SComplex | EncodingType::Flt8Complex => return None,
        };
        Some(Self {
            to_double,
            to_integer,
        })
    }

    /// Convert field bytes to a double.
    #[inline]
    pub fn to_double(&self, bytes: &[u8], scale: f64, offset: f64) -> f64 {
        (self.to_double)(bytes, scale, offset)
    }

    /// Convert field bytes to an integer.
    #[inline]
    pub fn to_integer(&self, bytes: &[u8], scale: f64, offset: f64) -> i64 {
        (self.to_integer)(bytes, scale, offset)
    }
}

impl fmt::Debug for Conversion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Conversion").finish_non_exhaustive()
    }
}

/// Conversions for all three roles of one descriptor.
#[derive(Clone, Copy, Debug)]
pub struct ConversionTable {
    /// X, Y, and Z.
    pub spatial: Conversion,
    /// Intensity.
    pub intensity: Conversion,
    /// Classification.
    pub classification: Conversion,
}

impl ConversionTable {
    /// Resolve every role of `descriptor`.
    ///
    /// Intensity and classification are resolved even when the descriptor
    /// marks them absent, so an unsupported tag fails either way.
    pub fn resolve(descriptor: &PointCloudDataDescriptor) -> Result<Self, UnsupportedEncoding> {
        let lookup = |role, encoding| {
            Conversion::for_encoding(encoding).ok_or(UnsupportedEncoding { role, encoding })
        };
        Ok(Self {
            spatial: lookup(FieldRole::Spatial, descriptor.spatial_type)?,
            intensity: lookup(FieldRole::Intensity, descriptor.intensity_type)?,
            classification: lookup(FieldRole::Classification, descriptor.classification_type)?,
        })
    }
}
