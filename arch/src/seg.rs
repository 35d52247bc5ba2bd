use crate::reg::Reg;
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use strum::{Display, EnumString};

/// Symbolic memory segments of the VM.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Segment {
    Constant,
    Local,
    Argument,
    This,
    That,
    Pointer,
    Temp,
    Static,
}

/// Physical base of a segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Base {
    /// No memory cell: the index itself is the value.
    Literal,
    /// A register holding a pointer to the segment base.
    Indirect(Reg),
    /// Fixed offset into the register file.
    Direct(u16),
    /// Per-unit symbol, left to the assembler to place (from 16 up).
    Unit,
}

/// Segment Address Table: symbolic segment -> physical base.
pub static SEGMENTS: Lazy<IndexMap<Segment, Base>> = Lazy::new(|| {
    IndexMap::from([
        (Segment::Constant, Base::Literal),
        (Segment::Local, Base::Indirect(Reg::LCL)),
        (Segment::Argument, Base::Indirect(Reg::ARG)),
        (Segment::This, Base::Indirect(Reg::THIS)),
        (Segment::That, Base::Indirect(Reg::THAT)),
        (Segment::Pointer, Base::Direct(3)),
        (Segment::Temp, Base::Direct(5)),
        (Segment::Static, Base::Unit),
    ])
});

impl Segment {
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.to_ascii_lowercase().parse::<Self>() {
            Ok(a) => Ok(a),
            Err(_) => Err(format!("Unknown segment: {s}")),
        }
    }

    pub fn base(self) -> Base {
        SEGMENTS[&self]
    }

    /// Cell count of a fixed-size segment. Unbounded segments return None.
    pub fn capacity(self) -> Option<u16> {
        match self {
            Segment::Pointer => Some(2),
            Segment::Temp => Some(8),
            _ => None,
        }
    }
}

#[test]
fn test() {
    assert_eq!(Segment::parse("argument"), Ok(Segment::Argument));
    assert!(Segment::parse("stack").is_err());
    assert_eq!(Segment::Local.base(), Base::Indirect(Reg::LCL));
    assert_eq!(Segment::Pointer.base(), Base::Direct(3));
    assert_eq!(Segment::Temp.base(), Base::Direct(5));
    assert_eq!(Segment::Static.base(), Base::Unit);
    assert_eq!(Segment::Constant.base(), Base::Literal);
    assert_eq!(Segment::Pointer.capacity(), Some(2));
    assert_eq!(Segment::Temp.capacity(), Some(8));
    assert_eq!(Segment::Local.capacity(), None);
    assert_eq!(SEGMENTS.len(), 8);
}
