//! C representation of the modes the generator handles.

use a68_ir::{MoidId, MoidKind, Program};

/// Mode of a value the generator keeps in a C variable.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum CMode {
    Int,
    Real,
    Bool,
    Char,
    Bits,
    LongInt,
    LongReal,
    Complex,
    /// Any name.
    Ref,
}

impl CMode {
    pub fn of(program: &Program, m: MoidId) -> Option<CMode> {
        let m = program.moids.canonical(m);
        Some(match m {
            MoidId::INT => CMode::Int,
            MoidId::REAL => CMode::Real,
            MoidId::BOOL => CMode::Bool,
            MoidId::CHAR => CMode::Char,
            MoidId::BITS => CMode::Bits,
            MoidId::LONG_INT => CMode::LongInt,
            MoidId::LONG_REAL => CMode::LongReal,
            MoidId::COMPLEX => CMode::Complex,
            _ if program.moids.is(m, MoidKind::Ref) => CMode::Ref,
            _ => return None,
        })
    }

    /// Mode of the object a name of mode `m` refers to.
    pub fn referred(program: &Program, m: MoidId) -> Option<CMode> {
        let m = program.moids.canonical(m);
        if !program.moids.is(m, MoidKind::Ref) {
            return None;
        }
        CMode::of(program, program.moids.sub(m)).filter(|c| *c != CMode::Ref)
    }

    /// Run-time object type: status word plus value.
    pub fn object(self) -> &'static str {
        match self {
            CMode::Int => "A68_INT",
            CMode::Real => "A68_REAL",
            CMode::Bool => "A68_BOOL",
            CMode::Char => "A68_CHAR",
            CMode::Bits => "A68_BITS",
            CMode::LongInt => "A68_LONG_INT",
            CMode::LongReal => "A68_LONG_REAL",
            CMode::Complex => "A68_COMPLEX",
            CMode::Ref => "A68_REF",
        }
    }

    /// C type of a bare value, for the modes held in registers.
    pub fn value(self) -> Option<&'static str> {
        match self {
            CMode::Int => Some("INT_T"),
            CMode::Real => Some("REAL_T"),
            CMode::Bool => Some("BOOL_T"),
            CMode::Char => Some("CHAR_T"),
            CMode::Bits => Some("UNSIGNED_T"),
            _ => None,
        }
    }

    pub fn is_primitive(self) -> bool {
        self.value().is_some()
    }

    /// Values the generator only ever handles through a pointer.
    pub fn is_long(self) -> bool {
        matches!(self, CMode::LongInt | CMode::LongReal | CMode::Complex)
    }
}

/// C type of the frame object holding a value of mode `m`.
pub fn frame_type(program: &Program, m: MoidId) -> Option<&'static str> {
    let m = program.moids.canonical(m);
    if let Some(c) = CMode::of(program, m) {
        return Some(c.object());
    }
    match program.moids.kind(m) {
        MoidKind::Row | MoidKind::Flex => Some("A68_ROW"),
        MoidKind::Proc => Some("A68_PROCEDURE"),
        MoidKind::Struct => Some("BYTE_T"),
        _ => None,
    }
}

/// Dimension and element mode of a row, seen through one name and FLEX.
pub fn row_of(program: &Program, m: MoidId) -> Option<(i32, CMode)> {
    let moids = &program.moids;
    let mut r = moids.canonical(m);
    if moids.is(r, MoidKind::Ref) {
        r = moids.canonical(moids.sub(r));
    }
    if moids.is(r, MoidKind::Flex) {
        r = moids.canonical(moids.sub(r));
    }
    if !moids.is(r, MoidKind::Row) {
        return None;
    }
    let element = CMode::of(program, moids.sub(r)).filter(|c| c.is_primitive())?;
    Some((moids[r].dim, element))
}

/// Structure mode of `m`, seen through one name.
pub fn struct_of(program: &Program, m: MoidId) -> Option<MoidId> {
    let moids = &program.moids;
    let mut s = moids.canonical(m);
    if moids.is(s, MoidKind::Ref) {
        s = moids.canonical(moids.sub(s));
    }
    moids.is(s, MoidKind::Struct).then_some(s)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    use a68_ir::Options;

    #[test]
    fn test_standard_modes() {
        let program = Program::new(Options::default());
        assert_eq!(CMode::of(&program, MoidId::INT), Some(CMode::Int));
        assert_eq!(CMode::of(&program, MoidId::REF_REAL), Some(CMode::Ref));
        assert_eq!(CMode::of(&program, MoidId::ROW_CHAR), None);
        assert_eq!(CMode::referred(&program, MoidId::REF_REAL), Some(CMode::Real));
        assert_eq!(CMode::Bits.value(), Some("UNSIGNED_T"));
        assert!(CMode::Complex.is_long());
    }

    #[test]
    fn test_rows_and_frames() {
        let program = Program::new(Options::default());
        assert_eq!(row_of(&program, MoidId::ROW_INT), Some((1, CMode::Int)));
        assert_eq!(row_of(&program, MoidId::STRING), Some((1, CMode::Char)));
        assert_eq!(row_of(&program, MoidId::INT), None);
        assert_eq!(frame_type(&program, MoidId::ROW_REAL), Some("A68_ROW"));
        assert_eq!(frame_type(&program, MoidId::PROC_VOID), Some("A68_PROCEDURE"));
    }
}
