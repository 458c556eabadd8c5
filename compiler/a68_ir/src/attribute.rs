//! Grammatical roles of tree nodes.
//!
//! Tokens and reduced phrases share one enum. Terminals are the symbols the
//! lexer produces; everything else is built by the parser or inserted by the
//! mode checker (coercions).

use std::fmt;

macro_rules! attributes {
    (@kind T) => { true };
    (@kind N) => { false };
    ($($variant:ident => $text:literal, $kind:ident;)*) => {
        /// Role of a node in the tree.
        #[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
        pub enum Attribute {
            $($variant,)*
        }

        impl Attribute {
            pub const ALL: &'static [Attribute] = &[$(Attribute::$variant,)*];

            /// Upper-case name used in listings and diagnostics.
            pub const fn name(self) -> &'static str {
                match self {
                    $(Attribute::$variant => $text,)*
                }
            }

            /// Whether the lexer produces this attribute.
            pub const fn is_terminal(self) -> bool {
                match self {
                    $(Attribute::$variant => attributes!(@kind $kind),)*
                }
            }
        }
    };
}

attributes! {
    // Structural symbols
    AccoSymbol => "ACCO_SYMBOL", T;
    AssignSymbol => "ASSIGN_SYMBOL", T;
    AtSymbol => "AT_SYMBOL", T;
    BarSymbol => "BAR_SYMBOL", T;
    BeginSymbol => "BEGIN_SYMBOL", T;
    BriefElifSymbol => "BRIEF_ELIF_SYMBOL", T;
    BusSymbol => "BUS_SYMBOL", T;
    BySymbol => "BY_SYMBOL", T;
    CaseSymbol => "CASE_SYMBOL", T;
    CloseSymbol => "CLOSE_SYMBOL", T;
    ColonSymbol => "COLON_SYMBOL", T;
    CommaSymbol => "COMMA_SYMBOL", T;
    DoSymbol => "DO_SYMBOL", T;
    DowntoSymbol => "DOWNTO_SYMBOL", T;
    ElifSymbol => "ELIF_SYMBOL", T;
    ElseSymbol => "ELSE_SYMBOL", T;
    EmptySymbol => "EMPTY_SYMBOL", T;
    EndSymbol => "END_SYMBOL", T;
    EqualsSymbol => "EQUALS_SYMBOL", T;
    EsacSymbol => "ESAC_SYMBOL", T;
    ExitSymbol => "EXIT_SYMBOL", T;
    FalseSymbol => "FALSE_SYMBOL", T;
    FiSymbol => "FI_SYMBOL", T;
    FlexSymbol => "FLEX_SYMBOL", T;
    ForSymbol => "FOR_SYMBOL", T;
    FormatCloseSymbol => "FORMAT_CLOSE_SYMBOL", T;
    FormatDelimiterSymbol => "FORMAT_DELIMITER_SYMBOL", T;
    FormatItem => "FORMAT_ITEM", T;
    FormatOpenSymbol => "FORMAT_OPEN_SYMBOL", T;
    FromSymbol => "FROM_SYMBOL", T;
    GotoSymbol => "GOTO_SYMBOL", T;
    HeapSymbol => "HEAP_SYMBOL", T;
    IfSymbol => "IF_SYMBOL", T;
    InSymbol => "IN_SYMBOL", T;
    IsSymbol => "IS_SYMBOL", T;
    IsntSymbol => "ISNT_SYMBOL", T;
    LocSymbol => "LOC_SYMBOL", T;
    LongSymbol => "LONG_SYMBOL", T;
    ModeSymbol => "MODE_SYMBOL", T;
    NilSymbol => "NIL_SYMBOL", T;
    OccaSymbol => "OCCA_SYMBOL", T;
    OdSymbol => "OD_SYMBOL", T;
    OfSymbol => "OF_SYMBOL", T;
    OpSymbol => "OP_SYMBOL", T;
    OpenSymbol => "OPEN_SYMBOL", T;
    OuseSymbol => "OUSE_SYMBOL", T;
    OutSymbol => "OUT_SYMBOL", T;
    ParSymbol => "PAR_SYMBOL", T;
    PointSymbol => "POINT_SYMBOL", T;
    PrioSymbol => "PRIO_SYMBOL", T;
    ProcSymbol => "PROC_SYMBOL", T;
    RefSymbol => "REF_SYMBOL", T;
    Replicator => "REPLICATOR", T;
    SemiSymbol => "SEMI_SYMBOL", T;
    ShortSymbol => "SHORT_SYMBOL", T;
    SkipSymbol => "SKIP_SYMBOL", T;
    StructSymbol => "STRUCT_SYMBOL", T;
    SubSymbol => "SUB_SYMBOL", T;
    ThenSymbol => "THEN_SYMBOL", T;
    ToSymbol => "TO_SYMBOL", T;
    TrueSymbol => "TRUE_SYMBOL", T;
    UnionSymbol => "UNION_SYMBOL", T;
    UntilSymbol => "UNTIL_SYMBOL", T;
    VoidSymbol => "VOID_SYMBOL", T;
    WhileSymbol => "WHILE_SYMBOL", T;

    // Tokens with their own text
    BitsDenotation => "BITS_DENOTATION", T;
    BoldTag => "BOLD_TAG", T;
    Identifier => "IDENTIFIER", T;
    IntDenotation => "INT_DENOTATION", T;
    Operator => "OPERATOR", T;
    RealDenotation => "REAL_DENOTATION", T;
    RowCharDenotation => "ROW_CHAR_DENOTATION", T;

    // Tags bound by the parser
    DefiningIdentifier => "DEFINING_IDENTIFIER", N;
    DefiningIndicant => "DEFINING_INDICANT", N;
    DefiningOperator => "DEFINING_OPERATOR", N;
    FieldIdentifier => "FIELD_IDENTIFIER", N;
    Indicant => "INDICANT", N;
    Label => "LABEL", N;
    Priority => "PRIORITY", N;

    // Declarers
    Bounds => "BOUNDS", N;
    Bound => "BOUND", N;
    Declarer => "DECLARER", N;
    FormalDeclarers => "FORMAL_DECLARERS", N;
    Longety => "LONGETY", N;
    OperatorPlan => "OPERATOR_PLAN", N;
    Parameter => "PARAMETER", N;
    ParameterPack => "PARAMETER_PACK", N;
    Shortety => "SHORTETY", N;
    StructurePack => "STRUCTURE_PACK", N;
    StructuredField => "STRUCTURED_FIELD", N;
    UnionPack => "UNION_PACK", N;

    // Declarations
    BriefOperatorDeclaration => "BRIEF_OPERATOR_DECLARATION", N;
    DeclarationList => "DECLARATION_LIST", N;
    IdentityDeclaration => "IDENTITY_DECLARATION", N;
    ModeDeclaration => "MODE_DECLARATION", N;
    OperatorDeclaration => "OPERATOR_DECLARATION", N;
    PriorityDeclaration => "PRIORITY_DECLARATION", N;
    ProcedureDeclaration => "PROCEDURE_DECLARATION", N;
    ProcedureVariableDeclaration => "PROCEDURE_VARIABLE_DECLARATION", N;
    VariableDeclaration => "VARIABLE_DECLARATION", N;

    // Units
    Assignation => "ASSIGNATION", N;
    Call => "CALL", N;
    Cast => "CAST", N;
    Denotation => "DENOTATION", N;
    Formula => "FORMULA", N;
    Generator => "GENERATOR", N;
    GenericArgument => "GENERIC_ARGUMENT", N;
    Argument => "ARGUMENT", N;
    IdentityRelation => "IDENTITY_RELATION", N;
    Indexer => "INDEXER", N;
    Jump => "JUMP", N;
    LabeledUnit => "LABELED_UNIT", N;
    MonadicFormula => "MONADIC_FORMULA", N;
    Nihil => "NIHIL", N;
    Primary => "PRIMARY", N;
    RoutineText => "ROUTINE_TEXT", N;
    Secondary => "SECONDARY", N;
    Selection => "SELECTION", N;
    Skip => "SKIP", N;
    Slice => "SLICE", N;
    Specification => "SPECIFICATION", N;
    Tertiary => "TERTIARY", N;
    Trimmer => "TRIMMER", N;
    Unit => "UNIT", N;

    // Clauses
    ByPart => "BY_PART", N;
    CasePart => "CASE_PART", N;
    ClosedClause => "CLOSED_CLAUSE", N;
    CollateralClause => "COLLATERAL_CLAUSE", N;
    ConditionalClause => "CONDITIONAL_CLAUSE", N;
    DoPart => "DO_PART", N;
    ElifClause => "ELIF_CLAUSE", N;
    ElifPart => "ELIF_PART", N;
    ElsePart => "ELSE_PART", N;
    EnclosedClause => "ENCLOSED_CLAUSE", N;
    ForPart => "FOR_PART", N;
    FromPart => "FROM_PART", N;
    IfPart => "IF_PART", N;
    InPart => "IN_PART", N;
    IntegerCaseClause => "INTEGER_CASE_CLAUSE", N;
    LoopClause => "LOOP_CLAUSE", N;
    OuseClause => "OUSE_CLAUSE", N;
    OusePart => "OUSE_PART", N;
    OutPart => "OUT_PART", N;
    ParallelClause => "PARALLEL_CLAUSE", N;
    ParticularProgram => "PARTICULAR_PROGRAM", N;
    SerialClause => "SERIAL_CLAUSE", N;
    SpecifiedUnit => "SPECIFIED_UNIT", N;
    Specifier => "SPECIFIER", N;
    ThenPart => "THEN_PART", N;
    ToPart => "TO_PART", N;
    UnitedCaseClause => "UNITED_CASE_CLAUSE", N;
    UntilPart => "UNTIL_PART", N;
    WhilePart => "WHILE_PART", N;

    // Format texts
    Collection => "COLLECTION", N;
    DynamicReplicator => "DYNAMIC_REPLICATOR", N;
    FormatText => "FORMAT_TEXT", N;
    Picture => "PICTURE", N;

    // Coercions
    Dereferencing => "DEREFERENCING", N;
    Deproceduring => "DEPROCEDURING", N;
    Proceduring => "PROCEDURING", N;
    Rowing => "ROWING", N;
    Uniting => "UNITING", N;
    Voiding => "VOIDING", N;
    Widening => "WIDENING", N;
}

impl Attribute {
    /// Coercion nodes inserted around units.
    pub const fn is_coercion(self) -> bool {
        matches!(
            self,
            Attribute::Dereferencing
                | Attribute::Deproceduring
                | Attribute::Proceduring
                | Attribute::Rowing
                | Attribute::Uniting
                | Attribute::Voiding
                | Attribute::Widening
        )
    }

    /// Tokens that open a bracketed construct, with their closer.
    pub const fn closer(self) -> Option<Attribute> {
        match self {
            Attribute::BeginSymbol => Some(Attribute::EndSymbol),
            Attribute::OpenSymbol => Some(Attribute::CloseSymbol),
            Attribute::SubSymbol => Some(Attribute::BusSymbol),
            Attribute::AccoSymbol => Some(Attribute::OccaSymbol),
            Attribute::IfSymbol => Some(Attribute::FiSymbol),
            Attribute::CaseSymbol => Some(Attribute::EsacSymbol),
            Attribute::DoSymbol => Some(Attribute::OdSymbol),
            Attribute::FormatOpenSymbol => Some(Attribute::FormatCloseSymbol),
            _ => None,
        }
    }

    /// Tokens that close a bracketed construct.
    pub const fn is_closer(self) -> bool {
        matches!(
            self,
            Attribute::EndSymbol
                | Attribute::CloseSymbol
                | Attribute::BusSymbol
                | Attribute::OccaSymbol
                | Attribute::FiSymbol
                | Attribute::EsacSymbol
                | Attribute::OdSymbol
                | Attribute::FormatCloseSymbol
        )
    }

    pub const fn is_denotation(self) -> bool {
        matches!(
            self,
            Attribute::IntDenotation
                | Attribute::RealDenotation
                | Attribute::BitsDenotation
                | Attribute::RowCharDenotation
                | Attribute::TrueSymbol
                | Attribute::FalseSymbol
                | Attribute::EmptySymbol
        )
    }

    pub const fn is_declaration(self) -> bool {
        matches!(
            self,
            Attribute::BriefOperatorDeclaration
                | Attribute::IdentityDeclaration
                | Attribute::ModeDeclaration
                | Attribute::OperatorDeclaration
                | Attribute::PriorityDeclaration
                | Attribute::ProcedureDeclaration
                | Attribute::ProcedureVariableDeclaration
                | Attribute::VariableDeclaration
        )
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
