//! Enumerated mode parameters shared by the matrix routines.
//!
//! Each enum carries its conventional ASCII code so the host path can hand
//! the value straight to a Fortran character argument. Decoding an
//! arbitrary byte goes through `TryFrom<u8>`, which rejects unrecognized
//! codes with [`InvalidArgument`](crate::BlasError::InvalidArgument);
//! a value that made it into the enum is valid by construction.

use crate::BlasError;

/// Matrix storage order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Layout {
    ColMajor = b'C',
    RowMajor = b'R',
}

/// Side on which a matrix factor is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Side {
    Left = b'L',
    Right = b'R',
}

/// Which triangle of a matrix is referenced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Uplo {
    Upper = b'U',
    Lower = b'L',
}

/// Transposition applied to a matrix operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Op {
    NoTrans = b'N',
    Trans = b'T',
    ConjTrans = b'C',
}

/// Whether a triangular matrix has an implicit unit diagonal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Diag {
    NonUnit = b'N',
    Unit = b'U',
}

macro_rules! impl_try_from_u8 {
    ($ty:ident, $what:literal, $($variant:ident),+) => {
        impl TryFrom<u8> for $ty {
            type Error = BlasError;

            fn try_from(code: u8) -> Result<Self, BlasError> {
                match code {
                    $(code if code == $ty::$variant as u8 => Ok($ty::$variant),)+
                    _ => Err(BlasError::InvalidArgument {
                        func: concat!(stringify!($ty), "::try_from"),
                        what: format!(concat!("unrecognized ", $what, " code {:?}"), code as char),
                    }),
                }
            }
        }
    };
}

impl_try_from_u8!(Layout, "layout", ColMajor, RowMajor);
impl_try_from_u8!(Side, "side", Left, Right);
impl_try_from_u8!(Uplo, "uplo", Upper, Lower);
impl_try_from_u8!(Op, "transpose", NoTrans, Trans, ConjTrans);
impl_try_from_u8!(Diag, "diag", NonUnit, Unit);

impl Side {
    /// The opposite side, used when mapping a row-major call onto the
    /// column-major native convention.
    pub(crate) fn flipped(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

impl Uplo {
    /// The opposite triangle, used together with [`Side::flipped`].
    pub(crate) fn flipped(self) -> Uplo {
        match self {
            Uplo::Upper => Uplo::Lower,
            Uplo::Lower => Uplo::Upper,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_valid_codes() {
        assert_eq!(Layout::try_from(b'C').unwrap(), Layout::ColMajor);
        assert_eq!(Layout::try_from(b'R').unwrap(), Layout::RowMajor);
        assert_eq!(Side::try_from(b'L').unwrap(), Side::Left);
        assert_eq!(Uplo::try_from(b'U').unwrap(), Uplo::Upper);
        assert_eq!(Op::try_from(b'N').unwrap(), Op::NoTrans);
        assert_eq!(Op::try_from(b'T').unwrap(), Op::Trans);
        assert_eq!(Op::try_from(b'C').unwrap(), Op::ConjTrans);
        assert_eq!(Diag::try_from(b'U').unwrap(), Diag::Unit);
    }

    #[test]
    fn decode_invalid_code_is_invalid_argument() {
        for code in [0u8, b'X', b'c', b'r'] {
            let err = Layout::try_from(code).unwrap_err();
            assert!(matches!(err, BlasError::InvalidArgument { .. }));
        }
        assert!(Side::try_from(b'U').is_err());
        assert!(Op::try_from(b'Z').is_err());
        assert!(Diag::try_from(b'D').is_err());
    }

    #[test]
    fn flips() {
        assert_eq!(Side::Left.flipped(), Side::Right);
        assert_eq!(Side::Right.flipped(), Side::Left);
        assert_eq!(Uplo::Upper.flipped(), Uplo::Lower);
        assert_eq!(Uplo::Lower.flipped(), Uplo::Upper);
    }
}
