//! The standard environ.
//!
//! Predeclared indicants, priorities, operators and identifiers, all bound
//! in [`TableId::STANDENV`]. Operators and identifiers record the runtime
//! routine they stand for; the code generator keys its inline C on it.

use a68_ir::{MoidId, Program, TableId, TagId, TagKind};

/// Standard priorities of dyadic operators.
const PRIORITIES: &[(u8, &[&str])] = &[
    (1, &["+:=", "-:=", "*:=", "/:=", "%:=", "%*:=", "PLUSAB", "MINUSAB", "TIMESAB", "DIVAB", "OVERAB", "MODAB"]),
    (2, &["OR"]),
    (3, &["AND", "&"]),
    (4, &["=", "/=", "~=", "^=", "EQ", "NE"]),
    (5, &["<", "<=", ">", ">=", "LT", "LE", "GT", "GE"]),
    (6, &["+", "-"]),
    (7, &["*", "/", "%", "%*", "OVER", "MOD", "ELEM"]),
    (8, &["**", "UP", "^", "SHL", "SHR", "LWB", "UPB"]),
    (9, &["+*", "I"]),
];

/// Spellings of one operator and the slug its runtime name is built from.
const SPELLINGS: &[(&str, &[&str])] = &[
    ("add", &["+"]),
    ("sub", &["-"]),
    ("mul", &["*"]),
    ("div", &["/"]),
    ("over", &["%", "OVER"]),
    ("mod", &["%*", "MOD"]),
    ("pow", &["**", "UP", "^"]),
    ("eq", &["=", "EQ"]),
    ("ne", &["/=", "~=", "^=", "NE"]),
    ("lt", &["<", "LT"]),
    ("le", &["<=", "LE"]),
    ("gt", &[">", "GT"]),
    ("ge", &[">=", "GE"]),
    ("and", &["AND", "&"]),
    ("or", &["OR"]),
    ("not", &["NOT", "~"]),
    ("plusab", &["+:=", "PLUSAB"]),
    ("minusab", &["-:=", "MINUSAB"]),
    ("timesab", &["*:=", "TIMESAB"]),
    ("divab", &["/:=", "DIVAB"]),
    ("overab", &["%:=", "OVERAB"]),
    ("modab", &["%*:=", "MODAB"]),
    ("i", &["+*", "I"]),
];

const INTEGRAL: &[MoidId] = &[MoidId::INT, MoidId::LONG_INT, MoidId::LONG_LONG_INT];
const FLOATING: &[MoidId] = &[MoidId::REAL, MoidId::LONG_REAL, MoidId::LONG_LONG_REAL];
const COMPLEX: &[(MoidId, MoidId)] = &[
    (MoidId::COMPLEX, MoidId::REAL),
    (MoidId::LONG_COMPLEX, MoidId::LONG_REAL),
    (MoidId::LONG_LONG_COMPLEX, MoidId::LONG_LONG_REAL),
];

/// Bind the standard environ, once per program.
pub fn install(program: &mut Program) {
    if !program.tables.table(TableId::STANDENV).is_empty() {
        return;
    }
    let mut env = Environ { program };
    env.indicants();
    env.priorities();
    env.arithmetic();
    env.logic();
    env.characters();
    env.rows();
    env.vectors();
    env.assigning();
    env.identifiers();
}

struct Environ<'a> {
    program: &'a mut Program,
}

impl Environ<'_> {
    fn bind(&mut self, kind: TagKind, text: &str) -> TagId {
        let name = self.program.interner.intern(text);
        self.program.tables.add_tag(TableId::STANDENV, kind, name)
    }

    fn runtime(&self, text: String) -> &'static str {
        let name = self.program.interner.intern(&text);
        self.program.interner.lookup(name)
    }

    fn indicants(&mut self) {
        let standard = [
            ("INT", MoidId::INT),
            ("REAL", MoidId::REAL),
            ("COMPLEX", MoidId::COMPLEX),
            ("COMPL", MoidId::COMPLEX),
            ("BOOL", MoidId::BOOL),
            ("CHAR", MoidId::CHAR),
            ("BITS", MoidId::BITS),
            ("BYTES", MoidId::BYTES),
            ("FORMAT", MoidId::FORMAT),
            ("FILE", MoidId::FILE),
            ("CHANNEL", MoidId::CHANNEL),
            ("SEMA", MoidId::SEMA),
            ("STRING", MoidId::STRING),
            ("SIMPLOUT", MoidId::SIMPLOUT),
            ("SIMPLIN", MoidId::SIMPLIN),
        ];
        for (text, moid) in standard {
            let tag = self.bind(TagKind::Indicant, text);
            self.program.tables.tag_mut(tag).moid = Some(moid);
        }
    }

    fn priorities(&mut self) {
        for &(priority, names) in PRIORITIES {
            for name in names {
                let tag = self.bind(TagKind::Priority, name);
                self.program.tables.tag_mut(tag).priority = priority;
            }
        }
    }

    /// Bind every spelling of operator `slug` with mode `params -> result`.
    fn operator(&mut self, slug: &str, params: &[MoidId], result: MoidId) {
        let spellings = SPELLINGS
            .iter()
            .find(|(s, _)| *s == slug)
            .map_or(&[][..], |(_, names)| *names);
        let moid = self.program.moids.proc_of(params, result);
        let suffix: Vec<_> = params.iter().map(|&m| mode_slug(m)).collect();
        let runtime = self.runtime(format!("genie_{slug}_{}", suffix.join("_")));
        let fallback = [slug.to_ascii_uppercase()];
        let names: Vec<&str> = if spellings.is_empty() {
            fallback.iter().map(String::as_str).collect()
        } else {
            spellings.to_vec()
        };
        for name in names {
            let tag = self.bind(TagKind::Operator, name);
            let tag = self.program.tables.tag_mut(tag);
            tag.moid = Some(moid);
            tag.runtime = Some(runtime);
        }
    }

    fn arithmetic(&mut self) {
        for &m in INTEGRAL.iter().chain(FLOATING) {
            for slug in ["add", "sub", "mul"] {
                self.operator(slug, &[m, m], m);
            }
            for slug in ["eq", "ne", "lt", "le", "gt", "ge"] {
                self.operator(slug, &[m, m], MoidId::BOOL);
            }
            self.operator("sub", &[m], m);
            self.operator("add", &[m], m);
            self.operator("abs", &[m], m);
            self.operator("sign", &[m], MoidId::INT);
        }
        for (&i, &r) in INTEGRAL.iter().zip(FLOATING) {
            self.operator("div", &[i, i], r);
            self.operator("over", &[i, i], i);
            self.operator("mod", &[i, i], i);
            self.operator("pow", &[i, MoidId::INT], i);
            self.operator("odd", &[i], MoidId::BOOL);
            self.operator("i", &[i, i], complex_of(r));
        }
        for &r in FLOATING {
            self.operator("div", &[r, r], r);
            self.operator("pow", &[r, MoidId::INT], r);
            self.operator("pow", &[r, r], r);
            self.operator("entier", &[r], MoidId::INT);
            self.operator("round", &[r], MoidId::INT);
            self.operator("i", &[r, r], complex_of(r));
        }
        for &(c, r) in COMPLEX {
            for slug in ["add", "sub", "mul", "div"] {
                self.operator(slug, &[c, c], c);
            }
            self.operator("eq", &[c, c], MoidId::BOOL);
            self.operator("ne", &[c, c], MoidId::BOOL);
            self.operator("pow", &[c, MoidId::INT], c);
            self.operator("sub", &[c], c);
            self.operator("add", &[c], c);
            self.operator("abs", &[c], r);
            self.operator("re", &[c], r);
            self.operator("im", &[c], r);
        }
        self.operator("leng", &[MoidId::INT], MoidId::LONG_INT);
        self.operator("leng", &[MoidId::REAL], MoidId::LONG_REAL);
        self.operator("shorten", &[MoidId::LONG_INT], MoidId::INT);
        self.operator("shorten", &[MoidId::LONG_REAL], MoidId::REAL);
    }

    fn logic(&mut self) {
        for m in [MoidId::BOOL, MoidId::BITS, MoidId::LONG_BITS] {
            self.operator("and", &[m, m], m);
            self.operator("or", &[m, m], m);
            self.operator("not", &[m], m);
            self.operator("eq", &[m, m], MoidId::BOOL);
            self.operator("ne", &[m, m], MoidId::BOOL);
        }
        self.operator("abs", &[MoidId::BOOL], MoidId::INT);
        self.operator("abs", &[MoidId::BITS], MoidId::INT);
        self.operator("bin", &[MoidId::INT], MoidId::BITS);
        self.operator("shl", &[MoidId::BITS, MoidId::INT], MoidId::BITS);
        self.operator("shr", &[MoidId::BITS, MoidId::INT], MoidId::BITS);
        self.operator("elem", &[MoidId::INT, MoidId::BITS], MoidId::BOOL);
    }

    fn characters(&mut self) {
        for slug in ["eq", "ne", "lt", "le", "gt", "ge"] {
            self.operator(slug, &[MoidId::CHAR, MoidId::CHAR], MoidId::BOOL);
            self.operator(slug, &[MoidId::ROW_CHAR, MoidId::ROW_CHAR], MoidId::BOOL);
        }
        self.operator("abs", &[MoidId::CHAR], MoidId::INT);
        self.operator("repr", &[MoidId::INT], MoidId::CHAR);
        self.operator("add", &[MoidId::ROW_CHAR, MoidId::ROW_CHAR], MoidId::STRING);
        self.operator("add", &[MoidId::CHAR, MoidId::CHAR], MoidId::STRING);
        self.operator("mul", &[MoidId::INT, MoidId::ROW_CHAR], MoidId::STRING);
    }

    fn rows(&mut self) {
        self.operator("lwb", &[MoidId::ROWS], MoidId::INT);
        self.operator("upb", &[MoidId::ROWS], MoidId::INT);
        self.operator("lwb", &[MoidId::INT, MoidId::ROWS], MoidId::INT);
        self.operator("upb", &[MoidId::INT, MoidId::ROWS], MoidId::INT);
    }

    /// Vector and matrix arithmetic over rows of REAL.
    fn vectors(&mut self) {
        let (v, m, x) = (MoidId::ROW_REAL, MoidId::ROW_ROW_REAL, MoidId::REAL);
        for row in [v, m] {
            self.operator("add", &[row, row], row);
            self.operator("sub", &[row, row], row);
            self.operator("mul", &[x, row], row);
            self.operator("mul", &[row, x], row);
        }
        self.operator("sub", &[v], v);
        self.operator("mul", &[v, v], x);
        self.operator("mul", &[m, m], m);
        self.operator("mul", &[m, v], v);
        self.operator("mul", &[v, m], v);
        self.operator("norm", &[v], x);
        self.operator("det", &[m], x);
        self.operator("trace", &[m], x);
    }

    fn assigning(&mut self) {
        let pairs = [
            (MoidId::REF_INT, MoidId::INT),
            (MoidId::REF_LONG_INT, MoidId::LONG_INT),
            (MoidId::REF_REAL, MoidId::REAL),
            (MoidId::REF_LONG_REAL, MoidId::LONG_REAL),
            (MoidId::REF_COMPLEX, MoidId::COMPLEX),
        ];
        for (name, value) in pairs {
            for slug in ["plusab", "minusab", "timesab"] {
                self.operator(slug, &[name, value], name);
            }
        }
        for (name, value) in [(MoidId::REF_INT, MoidId::INT), (MoidId::REF_LONG_INT, MoidId::LONG_INT)] {
            self.operator("overab", &[name, value], name);
            self.operator("modab", &[name, value], name);
        }
        for (name, value) in [(MoidId::REF_REAL, MoidId::REAL), (MoidId::REF_LONG_REAL, MoidId::LONG_REAL)] {
            self.operator("divab", &[name, value], name);
        }
        self.operator("plusab", &[MoidId::REF_STRING, MoidId::ROW_CHAR], MoidId::REF_STRING);
    }

    fn identifiers(&mut self) {
        let real_to_real = self.program.moids.proc_of(&[MoidId::REAL], MoidId::REAL);
        let proc_real = self.program.moids.proc_of(&[], MoidId::REAL);
        let put = self.program.moids.proc_of(&[MoidId::ROW_SIMPLOUT], MoidId::VOID);
        let get = self.program.moids.proc_of(&[MoidId::ROW_SIMPLIN], MoidId::VOID);
        let standard = [
            ("pi", MoidId::REAL),
            ("maxint", MoidId::INT),
            ("maxreal", MoidId::REAL),
            ("smallreal", MoidId::REAL),
            ("intwidth", MoidId::INT),
            ("bitswidth", MoidId::INT),
            ("blank", MoidId::CHAR),
            ("standin", MoidId::REF_FILE),
            ("standout", MoidId::REF_FILE),
            ("newline", MoidId::PROC_REF_FILE_VOID),
            ("newpage", MoidId::PROC_REF_FILE_VOID),
            ("space", MoidId::PROC_REF_FILE_VOID),
            ("backspace", MoidId::PROC_REF_FILE_VOID),
            ("print", put),
            ("write", put),
            ("read", get),
            ("sqrt", real_to_real),
            ("exp", real_to_real),
            ("ln", real_to_real),
            ("sin", real_to_real),
            ("cos", real_to_real),
            ("tan", real_to_real),
            ("arctan", real_to_real),
            ("random", proc_real),
        ];
        for (text, moid) in standard {
            let runtime = self.runtime(format!("genie_{text}"));
            let tag = self.bind(TagKind::Identifier, text);
            let tag = self.program.tables.tag_mut(tag);
            tag.moid = Some(moid);
            tag.runtime = Some(runtime);
            tag.is_routine = matches!(text, "print" | "write" | "read") || moid == real_to_real;
        }
    }
}

fn complex_of(real: MoidId) -> MoidId {
    COMPLEX
        .iter()
        .find(|&&(_, r)| r == real)
        .map_or(MoidId::COMPLEX, |&(c, _)| c)
}

/// Short name of a standard mode inside a runtime routine name.
fn mode_slug(m: MoidId) -> &'static str {
    match m {
        MoidId::INT => "int",
        MoidId::LONG_INT => "long_int",
        MoidId::LONG_LONG_INT => "long_long_int",
        MoidId::REAL => "real",
        MoidId::LONG_REAL => "long_real",
        MoidId::LONG_LONG_REAL => "long_long_real",
        MoidId::COMPLEX => "complex",
        MoidId::LONG_COMPLEX => "long_complex",
        MoidId::LONG_LONG_COMPLEX => "long_long_complex",
        MoidId::BOOL => "bool",
        MoidId::CHAR => "char",
        MoidId::BITS => "bits",
        MoidId::LONG_BITS => "long_bits",
        MoidId::ROWS => "rows",
        MoidId::ROW_CHAR => "row_char",
        MoidId::ROW_REAL => "row_real",
        MoidId::ROW_ROW_REAL => "row_row_real",
        MoidId::REF_INT => "ref_int",
        MoidId::REF_LONG_INT => "ref_long_int",
        MoidId::REF_REAL => "ref_real",
        MoidId::REF_LONG_REAL => "ref_long_real",
        MoidId::REF_COMPLEX => "ref_complex",
        MoidId::REF_STRING => "ref_string",
        _ => "any",
    }
}
