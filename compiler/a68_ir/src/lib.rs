//! Data model of the Algol 68 compiler core.
//!
//! Interned tokens, source lines, the syntax tree, symbol tables and the
//! mode graph. All cross links (node to tag, node to mode, tag to mode) are
//! plain indices into the arenas held by [`Program`].

mod attribute;
mod interner;
mod keywords;
mod moid;
mod name;
mod node;
mod options;
mod program;
mod source;
mod span;
mod table;

pub use attribute::Attribute;
pub use interner::{InternError, StringInterner};
pub use keywords::KeywordTable;
pub use moid::{moid_to_string, Moid, MoidArena, MoidId, MoidKind, PackEntry, STANDARD_MOID_COUNT};
pub use name::Name;
pub use node::{GenieInfo, Node, NodeId, Siblings, Status, Tree};
pub use options::{Options, Stropping, MAX_OPTIMISE};
pub use program::Program;
pub use source::{LineId, SourceLine, SourceMap};
pub use span::Span;
pub use table::{HeapQualifier, SymbolTable, TableId, Tag, TagId, TagKind, Tables, PRIMAL_SCOPE};

/// Compile-time size check for hot data structures.
#[macro_export]
macro_rules! static_assert_size {
    ($ty:ty, $size:expr) => {
        const _: [(); $size] = [(); ::std::mem::size_of::<$ty>()];
    };
}

static_assert_size!(Span, 12);
static_assert_size!(NodeId, 4);
static_assert_size!(MoidId, 4);
