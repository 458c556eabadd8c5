//! Fixed text at the head of every generated C file.
//!
//! The run time's headers supply the stack, frame and heap macros the
//! compiled functions use. The prelude adds the few shorthands the
//! generator writes that the headers do not have.

const INCLUDES: &str = "\
#include \"a68g-config.h\"
#include \"a68g.h\"
#include \"a68g-genie.h\"
#include \"a68g-prelude.h\"
#include \"a68g-frames.h\"
#include \"a68g-mp.h\"
#include \"a68g-optimiser.h\"
";

/// `CODE (f) ... EDOC (f, q)` is a function with the propagator signature
/// returning itself, so the run time can replace the node's propagator.
const PROPAGATOR: &str = "\
#define CODE(n) PROPAGATOR_T n (NODE_T * p) {\\
  PROPAGATOR_T self;
#define EDOC(n, q) PROCEDURE (&self) = n;\\
  SOURCE (&self) = q;\\
  (void) p;\\
  return (self);}
";

const REGISTERS: &str = "\
#define N(n) (node_register[n])
#define M(n) (moid_register[n])
";

const NAMES: &str = "\
#define ELEMENT_NAME(a, k) ({A68_REF _z = ARRAY (a); OFFSET (&_z) += ELEMENT_OFFSET (a, k); _z;})
#define FIELD_NAME(z, offset) ({A68_REF _z = (z); OFFSET (&_z) += (offset); _z;})
";

/// Prelude of a C file generated at optimise `level`.
pub fn prelude(level: u8) -> String {
    let mut output = String::with_capacity(1024);
    output.push_str("/* Generated by a68c, optimise level ");
    output.push_str(&level.to_string());
    output.push_str(" */\n\n");
    output.push_str(INCLUDES);
    output.push('\n');
    output.push_str(PROPAGATOR);
    output.push_str(REGISTERS);
    // Row elements and fields are only named from level 2 on.
    if level >= 2 {
        output.push_str(NAMES);
    }
    output
}
