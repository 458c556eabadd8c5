//! Modes.
//!
//! Modes ("moids") form a graph that may be cyclic through REF and PROC.
//! They live in one arena addressed by [`MoidId`]; the standard modes are
//! installed first at fixed indices so the rest of the compiler can name
//! them as constants.

mod render;

use std::ops::{Index, IndexMut};

use crate::{Name, NodeId, StringInterner};

pub use render::moid_to_string;

/// Index of a mode in a [`MoidArena`].
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
#[repr(transparent)]
pub struct MoidId(u32);

macro_rules! standard_moids {
    ($($name:ident = $index:literal,)*) => {
        impl MoidId {
            $(pub const $name: MoidId = MoidId($index);)*
        }

        /// Number of modes installed before any user mode.
        pub const STANDARD_MOID_COUNT: usize = [$($index,)*].len();
    };
}

standard_moids! {
    VOID = 0,
    HIP = 1,
    UNDEFINED = 2,
    ERROR = 3,
    VACUUM = 4,
    INT = 5,
    LONG_INT = 6,
    LONG_LONG_INT = 7,
    REAL = 8,
    LONG_REAL = 9,
    LONG_LONG_REAL = 10,
    COMPLEX = 11,
    LONG_COMPLEX = 12,
    LONG_LONG_COMPLEX = 13,
    BOOL = 14,
    CHAR = 15,
    BITS = 16,
    LONG_BITS = 17,
    LONG_LONG_BITS = 18,
    BYTES = 19,
    LONG_BYTES = 20,
    FORMAT = 21,
    FILE = 22,
    CHANNEL = 23,
    SEMA = 24,
    ROWS = 25,
    REF_INT = 26,
    REF_LONG_INT = 27,
    REF_REAL = 28,
    REF_LONG_REAL = 29,
    REF_COMPLEX = 30,
    REF_BOOL = 31,
    REF_CHAR = 32,
    REF_BITS = 33,
    REF_FILE = 34,
    ROW_CHAR = 35,
    STRING = 36,
    REF_STRING = 37,
    ROW_INT = 38,
    ROW_REAL = 39,
    ROW_BOOL = 40,
    ROW_ROW_REAL = 41,
    PROC_VOID = 42,
    PROC_REF_FILE_VOID = 43,
    SIMPLOUT = 44,
    ROW_SIMPLOUT = 45,
    SIMPLIN = 46,
    ROW_SIMPLIN = 47,
}

impl MoidId {
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub const fn is_standard(self) -> bool {
        (self.0 as usize) < STANDARD_MOID_COUNT
    }
}

/// Mode constructor.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum MoidKind {
    Standard,
    Indicant,
    Ref,
    Flex,
    Row,
    Struct,
    Union,
    Proc,
    Series,
    Stowed,
    Void,
    Hip,
    Undefined,
    Error,
    Vacuum,
}

/// One entry of a STRUCT, UNION, PROC or SERIES pack.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PackEntry {
    pub moid: MoidId,
    /// Field name, for STRUCT packs.
    pub text: Option<Name>,
    pub node: Option<NodeId>,
    /// Byte offset within a STRUCT.
    pub offset: usize,
}

impl PackEntry {
    pub fn new(moid: MoidId) -> Self {
        PackEntry {
            moid,
            text: None,
            node: None,
            offset: 0,
        }
    }

    pub fn field(moid: MoidId, text: Name) -> Self {
        PackEntry {
            moid,
            text: Some(text),
            node: None,
            offset: 0,
        }
    }
}

/// A mode.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Moid {
    pub kind: MoidKind,
    /// Rows: number of dimensions. Standard modes: LONG count (negative
    /// for SHORT). Packed modes: pack length.
    pub dim: i32,
    pub number: u32,
    /// Standard or indicant text; also the display name of a few
    /// standard compound modes.
    pub symbol: Name,
    pub sub: Option<MoidId>,
    pub pack: Vec<PackEntry>,
    /// Canonical representative, or an indicant's definition.
    pub equivalent: Option<MoidId>,
    pub slice: Option<MoidId>,
    pub deflexed: Option<MoidId>,
    pub name: Option<MoidId>,
    pub multiple: Option<MoidId>,
    pub trim: Option<MoidId>,
    pub rowed: Option<MoidId>,
    pub has_ref: bool,
    pub has_flex: bool,
    pub has_rows: bool,
    pub well_formed: bool,
    pub size: usize,
    pub node: Option<NodeId>,
    pub portable: bool,
    /// Built by the compiler rather than written by the user.
    pub derivate: bool,
}

impl Moid {
    pub fn new(kind: MoidKind) -> Self {
        Moid {
            kind,
            dim: 0,
            number: 0,
            symbol: Name::EMPTY,
            sub: None,
            pack: Vec::new(),
            equivalent: None,
            slice: None,
            deflexed: None,
            name: None,
            multiple: None,
            trim: None,
            rowed: None,
            has_ref: false,
            has_flex: false,
            has_rows: false,
            well_formed: true,
            size: 0,
            node: None,
            portable: true,
            derivate: false,
        }
    }

    fn standard(symbol: Name, dim: i32) -> Self {
        Moid {
            symbol,
            dim,
            ..Moid::new(MoidKind::Standard)
        }
    }

    fn compound(kind: MoidKind, sub: MoidId) -> Self {
        Moid {
            sub: Some(sub),
            ..Moid::new(kind)
        }
    }

    fn packed(kind: MoidKind, pack: Vec<PackEntry>, sub: Option<MoidId>) -> Self {
        Moid {
            dim: pack.len() as i32,
            pack,
            sub,
            ..Moid::new(kind)
        }
    }

    /// Same constructor and same immediate components.
    fn same_shape(&self, other: &Moid) -> bool {
        self.kind == other.kind
            && self.dim == other.dim
            && self.symbol == other.symbol
            && self.sub == other.sub
            && self.pack.len() == other.pack.len()
            && self
                .pack
                .iter()
                .zip(&other.pack)
                .all(|(a, b)| a.moid == b.moid && a.text == b.text)
    }
}

/// All modes of a compilation.
#[derive(Clone, Debug)]
pub struct MoidArena {
    moids: Vec<Moid>,
}

impl MoidArena {
    /// Arena holding the standard modes at their fixed indices.
    pub fn new(interner: &StringInterner) -> Self {
        let mut arena = MoidArena { moids: Vec::new() };
        arena.install_standard_modes(interner);
        arena
    }

    fn install(&mut self, expected: MoidId, moid: Moid) {
        let id = self.push(moid);
        debug_assert_eq!(id, expected, "standard mode installed out of order");
    }

    fn install_standard_modes(&mut self, interner: &StringInterner) {
        let sym = |s: &str| interner.intern(s);
        self.install(MoidId::VOID, Moid::new(MoidKind::Void));
        self.install(MoidId::HIP, Moid::new(MoidKind::Hip));
        self.install(MoidId::UNDEFINED, Moid::new(MoidKind::Undefined));
        self.install(MoidId::ERROR, Moid::new(MoidKind::Error));
        self.install(MoidId::VACUUM, Moid::new(MoidKind::Vacuum));
        for (id, text, dim) in [
            (MoidId::INT, "INT", 0),
            (MoidId::LONG_INT, "INT", 1),
            (MoidId::LONG_LONG_INT, "INT", 2),
            (MoidId::REAL, "REAL", 0),
            (MoidId::LONG_REAL, "REAL", 1),
            (MoidId::LONG_LONG_REAL, "REAL", 2),
            (MoidId::COMPLEX, "COMPLEX", 0),
            (MoidId::LONG_COMPLEX, "COMPLEX", 1),
            (MoidId::LONG_LONG_COMPLEX, "COMPLEX", 2),
            (MoidId::BOOL, "BOOL", 0),
            (MoidId::CHAR, "CHAR", 0),
            (MoidId::BITS, "BITS", 0),
            (MoidId::LONG_BITS, "BITS", 1),
            (MoidId::LONG_LONG_BITS, "BITS", 2),
            (MoidId::BYTES, "BYTES", 0),
            (MoidId::LONG_BYTES, "BYTES", 1),
            (MoidId::FORMAT, "FORMAT", 0),
            (MoidId::FILE, "FILE", 0),
            (MoidId::CHANNEL, "CHANNEL", 0),
            (MoidId::SEMA, "SEMA", 0),
            (MoidId::ROWS, "ROWS", 0),
        ] {
            self.install(id, Moid::standard(sym(text), dim));
        }
        for (id, sub) in [
            (MoidId::REF_INT, MoidId::INT),
            (MoidId::REF_LONG_INT, MoidId::LONG_INT),
            (MoidId::REF_REAL, MoidId::REAL),
            (MoidId::REF_LONG_REAL, MoidId::LONG_REAL),
            (MoidId::REF_COMPLEX, MoidId::COMPLEX),
            (MoidId::REF_BOOL, MoidId::BOOL),
            (MoidId::REF_CHAR, MoidId::CHAR),
            (MoidId::REF_BITS, MoidId::BITS),
            (MoidId::REF_FILE, MoidId::FILE),
        ] {
            self.install(id, Moid::compound(MoidKind::Ref, sub));
        }
        self.install(MoidId::ROW_CHAR, self.row_moid(MoidId::CHAR, 1));
        let mut string = Moid::compound(MoidKind::Flex, MoidId::ROW_CHAR);
        string.symbol = sym("STRING");
        self.install(MoidId::STRING, string);
        self.install(MoidId::REF_STRING, Moid::compound(MoidKind::Ref, MoidId::STRING));
        self.install(MoidId::ROW_INT, self.row_moid(MoidId::INT, 1));
        self.install(MoidId::ROW_REAL, self.row_moid(MoidId::REAL, 1));
        self.install(MoidId::ROW_BOOL, self.row_moid(MoidId::BOOL, 1));
        self.install(MoidId::ROW_ROW_REAL, self.row_moid(MoidId::REAL, 2));
        self.install(MoidId::PROC_VOID, Moid::packed(MoidKind::Proc, Vec::new(), Some(MoidId::VOID)));
        self.install(
            MoidId::PROC_REF_FILE_VOID,
            Moid::packed(MoidKind::Proc, vec![PackEntry::new(MoidId::REF_FILE)], Some(MoidId::VOID)),
        );

        let outs = [
            MoidId::INT,
            MoidId::LONG_INT,
            MoidId::LONG_LONG_INT,
            MoidId::REAL,
            MoidId::LONG_REAL,
            MoidId::LONG_LONG_REAL,
            MoidId::COMPLEX,
            MoidId::LONG_COMPLEX,
            MoidId::BOOL,
            MoidId::CHAR,
            MoidId::BITS,
            MoidId::LONG_BITS,
            MoidId::ROW_CHAR,
            MoidId::PROC_REF_FILE_VOID,
        ];
        let mut simplout = Moid::packed(MoidKind::Union, outs.iter().map(|&m| PackEntry::new(m)).collect(), None);
        simplout.symbol = sym("SIMPLOUT");
        self.install(MoidId::SIMPLOUT, simplout);
        self.install(MoidId::ROW_SIMPLOUT, self.row_moid(MoidId::SIMPLOUT, 1));

        let ins = [
            MoidId::REF_INT,
            MoidId::REF_LONG_INT,
            MoidId::REF_REAL,
            MoidId::REF_LONG_REAL,
            MoidId::REF_COMPLEX,
            MoidId::REF_BOOL,
            MoidId::REF_CHAR,
            MoidId::REF_BITS,
            MoidId::REF_STRING,
            MoidId::PROC_REF_FILE_VOID,
        ];
        let mut simplin = Moid::packed(MoidKind::Union, ins.iter().map(|&m| PackEntry::new(m)).collect(), None);
        simplin.symbol = sym("SIMPLIN");
        self.install(MoidId::SIMPLIN, simplin);
        self.install(MoidId::ROW_SIMPLIN, self.row_moid(MoidId::SIMPLIN, 1));
    }

    fn row_moid(&self, sub: MoidId, dim: i32) -> Moid {
        Moid {
            dim,
            ..Moid::compound(MoidKind::Row, sub)
        }
    }

    fn push(&mut self, mut moid: Moid) -> MoidId {
        let id = MoidId(self.moids.len() as u32);
        moid.number = id.0;
        self.moids.push(moid);
        id
    }

    /// Append a mode without looking for an existing one.
    pub fn add(&mut self, moid: Moid) -> MoidId {
        self.push(moid)
    }

    /// Existing mode of the same shape, or a new one.
    pub fn find_or_add(&mut self, moid: Moid) -> MoidId {
        if let Some(i) = self
            .moids
            .iter()
            .position(|m| m.equivalent.is_none() && m.same_shape(&moid))
        {
            return MoidId(i as u32);
        }
        self.push(moid)
    }

    pub fn ref_of(&mut self, sub: MoidId) -> MoidId {
        self.find_or_add(Moid::compound(MoidKind::Ref, sub))
    }

    pub fn flex_of(&mut self, sub: MoidId) -> MoidId {
        self.find_or_add(Moid::compound(MoidKind::Flex, sub))
    }

    /// Row of `dim` dimensions over `sub`.
    pub fn row_of(&mut self, sub: MoidId, dim: i32) -> MoidId {
        let moid = self.row_moid(sub, dim.max(1));
        self.find_or_add(moid)
    }

    pub fn proc_of(&mut self, params: &[MoidId], result: MoidId) -> MoidId {
        let pack = params.iter().map(|&m| PackEntry::new(m)).collect();
        self.find_or_add(Moid::packed(MoidKind::Proc, pack, Some(result)))
    }

    pub fn union_of(&mut self, members: &[MoidId]) -> MoidId {
        let pack = members.iter().map(|&m| PackEntry::new(m)).collect();
        self.find_or_add(Moid::packed(MoidKind::Union, pack, None))
    }

    pub fn struct_of(&mut self, fields: &[(MoidId, Name)]) -> MoidId {
        let pack = fields.iter().map(|&(m, t)| PackEntry::field(m, t)).collect();
        self.find_or_add(Moid::packed(MoidKind::Struct, pack, None))
    }

    pub fn series_of(&mut self, members: &[MoidId]) -> MoidId {
        let pack = members.iter().map(|&m| PackEntry::new(m)).collect();
        self.find_or_add(Moid::packed(MoidKind::Series, pack, None))
    }

    pub fn stowed_of(&mut self, members: &[MoidId]) -> MoidId {
        let pack = members.iter().map(|&m| PackEntry::new(m)).collect();
        self.find_or_add(Moid::packed(MoidKind::Stowed, pack, None))
    }

    /// Placeholder for a mode indicant, resolved by the equivalencer.
    pub fn indicant(&mut self, symbol: Name, node: Option<NodeId>) -> MoidId {
        let moid = Moid {
            symbol,
            node,
            ..Moid::new(MoidKind::Indicant)
        };
        self.push(moid)
    }

    pub fn len(&self) -> usize {
        self.moids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moids.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = MoidId> {
        (0..self.moids.len() as u32).map(MoidId)
    }

    /// Follow `equivalent` links to the representative.
    pub fn canonical(&self, mut m: MoidId) -> MoidId {
        let mut steps = 0;
        while let Some(e) = self[m].equivalent {
            if e == m || steps > self.moids.len() {
                break;
            }
            m = e;
            steps += 1;
        }
        m
    }

    #[inline]
    pub fn kind(&self, m: MoidId) -> MoidKind {
        self[m].kind
    }

    #[inline]
    pub fn is(&self, m: MoidId, kind: MoidKind) -> bool {
        self[m].kind == kind
    }

    /// Sub-mode, or ERROR for modes without one.
    #[inline]
    pub fn sub(&self, m: MoidId) -> MoidId {
        self[m].sub.unwrap_or(MoidId::ERROR)
    }

    /// Mode with FLEX stripped, once derived forms exist.
    #[inline]
    pub fn deflex(&self, m: MoidId) -> MoidId {
        self[m].deflexed.unwrap_or(m)
    }

    /// Parameter-less procedure.
    pub fn is_proc_void_args(&self, m: MoidId) -> bool {
        self.is(m, MoidKind::Proc) && self[m].pack.is_empty()
    }

    /// REF or parameter-less PROC: can be dereferenced or deprocedured.
    pub fn is_deprefable(&self, m: MoidId) -> bool {
        self.is(m, MoidKind::Ref) || self.is_proc_void_args(m)
    }

    /// ROW or FLEX ROW, seen through one REF at most.
    pub fn is_row_like(&self, m: MoidId) -> bool {
        let d = self.deflex(m);
        self.is(d, MoidKind::Row) || (self.is(m, MoidKind::Flex) && self.is(self.sub(m), MoidKind::Row))
    }

    /// Modes the garbage collector traces.
    pub fn has_gc_references(&self, m: MoidId) -> bool {
        let moid = &self[m];
        let compound = matches!(
            moid.kind,
            MoidKind::Ref | MoidKind::Row | MoidKind::Flex | MoidKind::Proc | MoidKind::Union
        );
        let long = moid.kind == MoidKind::Standard && moid.dim > 0 && m != MoidId::LONG_BITS;
        compound || moid.has_ref || moid.has_rows || long || m == MoidId::FORMAT
    }
}

impl Index<MoidId> for MoidArena {
    type Output = Moid;

    #[inline]
    fn index(&self, id: MoidId) -> &Moid {
        &self.moids[id.index()]
    }
}

impl IndexMut<MoidId> for MoidArena {
    #[inline]
    fn index_mut(&mut self, id: MoidId) -> &mut Moid {
        &mut self.moids[id.index()]
    }
}

#[cfg(test)]
mod tests;
