use pretty_assertions::assert_eq;

use super::*;

fn parse(args: &[&str]) -> Result<(Command, Config), DriverError> {
    let args: Vec<String> = args.iter().map(|&a| a.to_owned()).collect();
    parse_args(&args)
}

#[test]
fn test_check_with_defaults() {
    let (command, config) = parse(&["check", "prog.a68"]).unwrap();
    assert_eq!(command, Command::Check(PathBuf::from("prog.a68")));
    assert_eq!(config, Config::default());
}

#[test]
fn test_flags_in_any_position() {
    let (command, config) = parse(&["--portcheck", "check", "--quote-stropping", "prog.a68", "--tree"]).unwrap();
    assert_eq!(command, Command::Check(PathBuf::from("prog.a68")));
    assert!(config.options.portcheck);
    assert!(config.listing);
    assert_eq!(config.options.stropping, Stropping::Quote);
}

#[test]
fn test_optimise_levels() {
    let level = |args: &[&str]| parse(args).unwrap().1.options.optimise;
    assert_eq!(level(&["check", "p.a68"]), 0);
    assert_eq!(level(&["compile", "p.a68"]), DEFAULT_OPTIMISE);
    assert_eq!(level(&["compile", "p.a68", "-O0"]), 0);
    assert_eq!(level(&["check", "p.a68", "-O"]), DEFAULT_OPTIMISE);
    assert_eq!(level(&["check", "p.a68", "-O3"]), 3);
    assert_eq!(level(&["check", "p.a68", "--optimise=4"]), 4);
    assert_eq!(level(&["check", "p.a68", "--optimise=9"]), 4);
    assert_eq!(level(&["check", "p.a68", "--optimise"]), DEFAULT_OPTIMISE);
}

#[test]
fn test_values_after_flag_or_equals() {
    let (_, config) = parse(&[
        "compile",
        "p.a68",
        "--emit-c",
        "out.c",
        "--error-limit=12",
        "--color",
        "never",
        "-I",
        "lib",
        "-Iinclude",
    ])
    .unwrap();
    assert_eq!(config.emit_c, Some(PathBuf::from("out.c")));
    assert_eq!(config.error_limit, 12);
    assert_eq!(config.color, ColorMode::Never);
    assert_eq!(config.include_paths, vec![PathBuf::from("lib"), PathBuf::from("include")]);
}

#[test]
fn test_help_and_version() {
    assert_eq!(parse(&[]).unwrap().0, Command::Help);
    assert_eq!(parse(&["--help"]).unwrap().0, Command::Help);
    assert_eq!(parse(&["check", "p.a68", "-V"]).unwrap().0, Command::Version);
}

#[test]
fn test_usage_errors() {
    let message = |args: &[&str]| parse(args).unwrap_err().to_string();
    assert_eq!(message(&["check"]), "\"check\" needs a source file");
    assert_eq!(message(&["run", "p.a68"]), "unknown command \"run\"");
    assert_eq!(message(&["check", "p.a68", "--fast"]), "unknown option \"--fast\"");
    assert_eq!(message(&["check", "p.a68", "-Ox"]), "invalid optimise level \"x\"");
    assert_eq!(message(&["check", "p.a68", "--emit-c"]), "--emit-c needs a value");
    assert_eq!(message(&["check", "p.a68", "--color=loud"]), "unknown color mode 'loud'");
    assert_eq!(message(&["check", "a.a68", "b.a68"]), "unexpected argument \"b.a68\"");
}
