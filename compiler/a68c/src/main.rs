//! a68c command line.

use std::io::IsTerminal;
use std::process::ExitCode;

use a68c::{init_tracing, modes_listing, parse_args, tree_listing, Command, Compiler, Config};

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let (command, config) = match parse_args(&args) {
        Ok(parsed) => parsed,
        Err(e) => {
            eprintln!("error: {e}");
            eprintln!();
            print_usage();
            return ExitCode::from(2);
        }
    };
    init_tracing(config.options.reductions);

    match command {
        Command::Help => {
            print_usage();
            ExitCode::SUCCESS
        }
        Command::Version => {
            println!("a68c {}", env!("CARGO_PKG_VERSION"));
            ExitCode::SUCCESS
        }
        command => run(&command, config),
    }
}

fn run(command: &Command, config: Config) -> ExitCode {
    let Some(path) = command.file() else {
        return ExitCode::FAILURE;
    };
    let mut compiler = Compiler::new(config);
    let result = match command {
        Command::Compile(_) => compiler.compile_file(path),
        _ => compiler.check_file(path),
    };
    let outcome = match result {
        Ok(outcome) => outcome,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let is_tty = std::io::stderr().is_terminal();
    compiler.report(&outcome, std::io::stderr(), is_tty);

    if compiler.config().listing && compiler.top().is_some() {
        print!("{}", tree_listing(&compiler.program));
    }
    if matches!(command, Command::Modes(_)) && outcome.is_ok() {
        print!("{}", modes_listing(&compiler.program));
    }
    if let Some(result) = &outcome.codegen {
        if compiler.config().emit_c.is_none() {
            print!("{}", result.code);
        } else if result.is_empty() {
            eprintln!("note: no unit of {} could be compiled", path.display());
        }
    }

    if outcome.is_ok() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn print_usage() {
    println!("a68c: Algol 68 front end and C generator");
    println!();
    println!("Usage: a68c <command> <file.a68> [options]");
    println!();
    println!("Commands:");
    println!("  check <file>         Lex, parse and mode-check a program");
    println!("  compile <file>       Check, then generate C for the units that compile");
    println!("  modes <file>         Check, then list every mode of the program");
    println!("  help                 Show this help message");
    println!("  version              Show version information");
    println!();
    println!("Options:");
    println!("  --upper-stropping    Bold words are upper case (default)");
    println!("  --quote-stropping    Bold words are quoted: 'BEGIN'");
    println!("  --portcheck          Warn about constructs that are not portable");
    println!("  --reductions         Log every parser reduction");
    println!("  --brackets           Accept {{ }} and [ ] as parentheses");
    println!("  -O[N], --optimise[=N]  C generator level 0-4 (bare: {})", a68c::DEFAULT_OPTIMISE);
    println!("  --emit-c <file>      Write the generated C to <file>");
    println!("  --error-limit <n>    Errors before a phase gives up (0: no limit)");
    println!("  --color <mode>       auto, always or never");
    println!("  --tree               Print the tree after checking");
    println!("  -I <dir>             Search <dir> for PR INCLUDE files");
    println!();
    println!("Examples:");
    println!("  a68c check hello.a68");
    println!("  a68c compile prog.a68 -O3 --emit-c prog.c");
    println!("  RUST_LOG=a68_parse=debug a68c check prog.a68");
}
