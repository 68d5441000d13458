//! Numeric storage formats for record fields.

use std::fmt;

/// The numeric encoding of a stored field.
///
/// The complex encodings exist so descriptors can describe them, but no
/// accessor can convert them; see the conversion registry in
/// `cloudpage-access`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EncodingType {
    /// Signed 8-bit integer.
    Int1SByte,
    /// Unsigned 8-bit integer.
    Int1UByte,
    /// Signed 16-bit integer.
    Int2SBytes,
    /// Unsigned 16-bit integer.
    Int2UBytes,
    /// Complex pair of signed 16-bit integers.
    Int4SComplex,
    /// Signed 32-bit integer.
    Int4SBytes,
    /// Unsigned 32-bit integer.
    Int4UBytes,
    /// 32-bit IEEE float.
    Flt4Bytes,
    /// Complex pair of 32-bit floats.
    Flt8Complex,
    /// 64-bit IEEE float.
    Flt8Bytes,
}

impl EncodingType {
    /// Every encoding, in declaration order.
    pub const ALL: [EncodingType; 10] = [
        Self::Int1SByte,
        Self::Int1UByte,
        Self::Int2SBytes,
        Self::Int2UBytes,
        Self::Int4SComplex,
        Self::Int4SBytes,
        Self::Int4UBytes,
        Self::Flt4Bytes,
        Self::Flt8Complex,
        Self::Flt8Bytes,
    ];

    /// Size of one stored value in bytes.
    pub const fn bytes(self) -> usize {
        match self {
            Self::Int1SByte | Self::Int1UByte => 1,
            Self::Int2SBytes | Self::Int2UBytes => 2,
            Self::Int4SComplex | Self::Int4SBytes | Self::Int4UBytes | Self::Flt4Bytes => 4,
            Self::Flt8Complex | Self::Flt8Bytes => 8,
        }
    }

    /// Whether this is one of the complex (two-component) encodings.
    pub const fn is_complex(self) -> bool {
        matches!(self, Self::Int4SComplex | Self::Flt8Complex)
    }

    /// Whether values are floating point.
    pub const fn is_float(self) -> bool {
        matches!(self, Self::Flt4Bytes | Self::Flt8Complex | Self::Flt8Bytes)
    }
}

impl fmt::Display for EncodingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Int1SByte => "int1s",
            Self::Int1UByte => "int1u",
            Self::Int2SBytes => "int2s",
            Self::Int2UBytes => "int2u",
            Self::Int4SComplex => "int4s-complex",
            Self::Int4SBytes => "int4s",
            Self::Int4UBytes => "int4u",
            Self::Flt4Bytes => "flt4",
            Self::Flt8Complex => "flt8-complex",
            Self::Flt8Bytes => "flt8",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes_match_storage_width() {
        assert_eq!(EncodingType::Int1SByte.bytes(), 1);
        assert_eq!(EncodingType::Int2UBytes.bytes(), 2);
        assert_eq!(EncodingType::Int4SComplex.bytes(), 4);
        assert_eq!(EncodingType::Flt4Bytes.bytes(), 4);
        assert_eq!(EncodingType::Flt8Complex.bytes(), 8);
        assert_eq!(EncodingType::Flt8Bytes.bytes(), 8);
    }

    #[test]
    fn exactly_two_complex_encodings() {
        let complex: Vec<_> = EncodingType::ALL
            .iter()
            .filter(|e| e.is_complex())
            .collect();
        assert_eq!(
            complex,
            vec![&EncodingType::Int4SComplex, &EncodingType::Flt8Complex]
        );
    }
}
