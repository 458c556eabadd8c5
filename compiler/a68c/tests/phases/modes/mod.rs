//! Modes, coercions and scope on whole programs.

mod coercions;
mod equivalence;
mod scope;
