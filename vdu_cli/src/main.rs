extern crate clap;
#[macro_use]
extern crate log;
extern crate loggerv;
extern crate vdu_cli;

use std::process;

use clap::{App, Arg, SubCommand};

fn rules_arg<'a, 'b>() -> Arg<'a, 'b> {
    Arg::with_name("rules")
        .long("rules")
        .value_name("PATH")
        .help("Path to the rule catalogue YAML document")
        .takes_value(true)
        .required(true)
}

fn request_arg<'a, 'b>() -> Arg<'a, 'b> {
    Arg::with_name("request")
        .long("request")
        .value_name("PATH")
        .help("Path to the deployment request document (YAML or JSON)")
        .takes_value(true)
        .required(true)
}

fn main() {
    let app = App::new("vdu")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Deterministic vDU pod-placement rule engine")
        .arg(Arg::with_name("verbose").short("v").multiple(true).help("Increase log verbosity"))
        .subcommand(
            SubCommand::with_name("validate")
                .about("Validate a deployment request, printing the outcome as JSON")
                .arg(rules_arg())
                .arg(request_arg()),
        )
        .subcommand(
            SubCommand::with_name("explain")
                .about("Validate a deployment request and print a human-readable report")
                .arg(rules_arg())
                .arg(request_arg()),
        )
        .subcommand(
            SubCommand::with_name("catalogue")
                .about("Summarise a rule catalogue document")
                .arg(rules_arg()),
        );

    let args = app.clone().get_matches();
    loggerv::Logger::new()
        .verbosity(args.occurrences_of("verbose"))
        .level(true)
        .module_path(false)
        .init()
        .expect("logger can only be initialised once");

    let result = match args.subcommand() {
        ("validate", Some(sub)) => vdu_cli::validate(sub.value_of("rules").unwrap(), sub.value_of("request").unwrap()),
        ("explain", Some(sub)) => vdu_cli::explain(sub.value_of("rules").unwrap(), sub.value_of("request").unwrap()),
        ("catalogue", Some(sub)) => vdu_cli::catalogue(sub.value_of("rules").unwrap()),
        _ => {
            let mut help = Vec::new();
            app.write_help(&mut help).ok();
            eprintln!("{}", String::from_utf8_lossy(&help));
            process::exit(1);
        }
    };

    if let Err(err) = result {
        error!("{}", err);
        process::exit(1);
    }
}
