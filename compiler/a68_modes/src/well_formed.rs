//! Well-formedness of mode declarations.
//!
//! A mode declaration must not define an indicant in terms of itself
//! alone (`MODE A = B, B = A`), and every cycle through a mode's structure
//! must be shielded by a REF or a PROC. A cycle through rows, structures
//! and unions only would describe a value of infinite size.

use a68_diagnostic::{error_at, DiagnosticQueue, ErrorCode, PhaseResult};
use a68_ir::{MoidId, MoidKind, Program, Span};
use a68_stack::ensure_sufficient_stack;
use rustc_hash::FxHashSet;
use smallvec::SmallVec;

/// Report ill-formed modes and cut the cycles they contain.
///
/// Indicants resolved by the caller are expected: an indicant placeholder's
/// `equivalent` points at its definition. An offending indicant is
/// re-pointed at ERROR.
pub fn check(program: &mut Program, diags: &mut DiagnosticQueue) -> PhaseResult {
    indicant_cycles(program, diags)?;
    unshielded_cycles(program, diags)
}

fn span_of(program: &Program, m: MoidId) -> Span {
    program.moids[m].node.map_or(Span::DUMMY, |p| program.tree[p].span)
}

/// `MODE A = B, B = C, C = A`: an occurs check along indicant chains.
fn indicant_cycles(program: &mut Program, diags: &mut DiagnosticQueue) -> PhaseResult {
    let indicants: Vec<MoidId> = program
        .moids
        .ids()
        .filter(|&m| program.moids.is(m, MoidKind::Indicant))
        .collect();
    let mut cut = FxHashSet::default();
    for &m in &indicants {
        if cut.contains(&m) {
            continue;
        }
        let mut chain: SmallVec<[MoidId; 8]> = SmallVec::from_elem(m, 1);
        let mut current = m;
        while let Some(next) = program.moids[current].equivalent {
            if !program.moids.is(next, MoidKind::Indicant) {
                break;
            }
            if next == m {
                let text = program.moid_text(m);
                diags.report(error_at(
                    ErrorCode::E2001,
                    span_of(program, m),
                    format!("mode {text} is defined in terms of itself"),
                ))?;
                cut.extend(chain.iter().copied());
                break;
            }
            if chain.contains(&next) {
                break;
            }
            chain.push(next);
            current = next;
        }
    }
    for m in cut {
        program.moids[m].equivalent = Some(MoidId::ERROR);
        program.moids[m].well_formed = false;
    }
    Ok(())
}

/// Successors of `m` that are reached without passing a REF or PROC.
fn unshielded(program: &Program, m: MoidId) -> SmallVec<[MoidId; 8]> {
    let moid = &program.moids[m];
    match moid.kind {
        MoidKind::Indicant => moid.equivalent.into_iter().collect(),
        MoidKind::Row | MoidKind::Flex => moid.sub.into_iter().collect(),
        MoidKind::Struct | MoidKind::Union | MoidKind::Series | MoidKind::Stowed => {
            moid.pack.iter().map(|e| e.moid).collect()
        }
        _ => SmallVec::new(),
    }
}

#[derive(Copy, Clone, PartialEq, Eq)]
enum Visit {
    New,
    OnPath,
    Done,
}

struct Cycles<'a> {
    program: &'a Program,
    state: Vec<Visit>,
    path: Vec<MoidId>,
    found: Vec<Vec<MoidId>>,
}

impl Cycles<'_> {
    fn visit(&mut self, m: MoidId) {
        self.state[m.index()] = Visit::OnPath;
        self.path.push(m);
        for s in unshielded(self.program, m) {
            match self.state[s.index()] {
                Visit::New => ensure_sufficient_stack(|| self.visit(s)),
                Visit::OnPath => {
                    if let Some(at) = self.path.iter().position(|&q| q == s) {
                        self.found.push(self.path[at..].to_vec());
                    }
                }
                Visit::Done => {}
            }
        }
        self.path.pop();
        self.state[m.index()] = Visit::Done;
    }
}

fn unshielded_cycles(program: &mut Program, diags: &mut DiagnosticQueue) -> PhaseResult {
    let found = {
        let mut cycles = Cycles {
            program: &*program,
            state: vec![Visit::New; program.moids.len()],
            path: Vec::new(),
            found: Vec::new(),
        };
        for m in program.moids.ids() {
            if cycles.state[m.index()] == Visit::New {
                cycles.visit(m);
            }
        }
        cycles.found
    };
    for cycle in found {
        let Some(&indicant) = cycle.iter().find(|&&m| program.moids.is(m, MoidKind::Indicant)) else {
            continue;
        };
        if program.moids[indicant].equivalent == Some(MoidId::ERROR) {
            continue;
        }
        for &m in &cycle {
            program.moids[m].well_formed = false;
        }
        let text = program.moid_text(indicant);
        program.moids[indicant].equivalent = Some(MoidId::ERROR);
        diags.report(error_at(
            ErrorCode::E2002,
            span_of(program, indicant),
            format!("mode {text} is not well formed: it contains itself without REF or PROC"),
        ))?;
    }
    Ok(())
}
