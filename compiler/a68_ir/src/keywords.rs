//! Reserved words and structural symbols.

use std::collections::BTreeMap;

use crate::Attribute;

/// Bold words reserved by the language, with their attribute.
const BOLD_KEYWORDS: &[(&str, Attribute)] = &[
    ("AT", Attribute::AtSymbol),
    ("BEGIN", Attribute::BeginSymbol),
    ("BY", Attribute::BySymbol),
    ("CASE", Attribute::CaseSymbol),
    ("DO", Attribute::DoSymbol),
    ("DOWNTO", Attribute::DowntoSymbol),
    ("ELIF", Attribute::ElifSymbol),
    ("ELSE", Attribute::ElseSymbol),
    ("EMPTY", Attribute::EmptySymbol),
    ("END", Attribute::EndSymbol),
    ("ESAC", Attribute::EsacSymbol),
    ("EXIT", Attribute::ExitSymbol),
    ("FALSE", Attribute::FalseSymbol),
    ("FI", Attribute::FiSymbol),
    ("FLEX", Attribute::FlexSymbol),
    ("FOR", Attribute::ForSymbol),
    ("FROM", Attribute::FromSymbol),
    ("GOTO", Attribute::GotoSymbol),
    ("HEAP", Attribute::HeapSymbol),
    ("IF", Attribute::IfSymbol),
    ("IN", Attribute::InSymbol),
    ("IS", Attribute::IsSymbol),
    ("ISNT", Attribute::IsntSymbol),
    ("LOC", Attribute::LocSymbol),
    ("LONG", Attribute::LongSymbol),
    ("MODE", Attribute::ModeSymbol),
    ("NIL", Attribute::NilSymbol),
    ("OD", Attribute::OdSymbol),
    ("OF", Attribute::OfSymbol),
    ("OP", Attribute::OpSymbol),
    ("OUSE", Attribute::OuseSymbol),
    ("OUT", Attribute::OutSymbol),
    ("PAR", Attribute::ParSymbol),
    ("PRIO", Attribute::PrioSymbol),
    ("PROC", Attribute::ProcSymbol),
    ("REF", Attribute::RefSymbol),
    ("SHORT", Attribute::ShortSymbol),
    ("SKIP", Attribute::SkipSymbol),
    ("STRUCT", Attribute::StructSymbol),
    ("THEN", Attribute::ThenSymbol),
    ("TO", Attribute::ToSymbol),
    ("TRUE", Attribute::TrueSymbol),
    ("UNION", Attribute::UnionSymbol),
    ("UNTIL", Attribute::UntilSymbol),
    ("VOID", Attribute::VoidSymbol),
    ("WHILE", Attribute::WhileSymbol),
];

/// Punctuation with a fixed meaning.
const SYMBOLS: &[(&str, Attribute)] = &[
    ("$", Attribute::FormatDelimiterSymbol),
    ("(", Attribute::OpenSymbol),
    (")", Attribute::CloseSymbol),
    (",", Attribute::CommaSymbol),
    (".", Attribute::PointSymbol),
    (":", Attribute::ColonSymbol),
    (":/=:", Attribute::IsntSymbol),
    (":=", Attribute::AssignSymbol),
    (":=:", Attribute::IsSymbol),
    (";", Attribute::SemiSymbol),
    ("=", Attribute::EqualsSymbol),
    ("@", Attribute::AtSymbol),
    ("[", Attribute::SubSymbol),
    ("]", Attribute::BusSymbol),
    ("{", Attribute::AccoSymbol),
    ("|", Attribute::BarSymbol),
    ("|:", Attribute::BriefElifSymbol),
    ("}", Attribute::OccaSymbol),
];

/// Ordered keyword table.
#[derive(Clone, Debug, Default)]
pub struct KeywordTable {
    entries: BTreeMap<&'static str, Attribute>,
}

impl KeywordTable {
    /// Table holding every reserved word and structural symbol.
    pub fn standard() -> Self {
        let mut table = KeywordTable::default();
        for &(text, attr) in BOLD_KEYWORDS.iter().chain(SYMBOLS) {
            table.add_keyword(attr, text);
        }
        table
    }

    pub fn add_keyword(&mut self, attr: Attribute, text: &'static str) {
        self.entries.insert(text, attr);
    }

    pub fn find_keyword(&self, text: &str) -> Option<Attribute> {
        self.entries.get(text).copied()
    }

    /// Reverse lookup, used to print the expected closer of a bracket.
    pub fn text_of(&self, attr: Attribute) -> Option<&'static str> {
        BOLD_KEYWORDS
            .iter()
            .chain(SYMBOLS)
            .find(|(_, a)| *a == attr)
            .map(|(text, _)| *text)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
