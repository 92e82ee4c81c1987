use std::env;
use std::fs;
use std::process;

use risplet::{Config, Interpreter, LiteralRules, SetScope, Value};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

const USAGE: &str = "usage: cli [--set-nearest] [--numeric-literals] [--max-depth N] [FILE]";

struct Args {
    config: Config,
    file_name: Option<String>,
}

fn parse_args() -> Result<Args, String> {
    let mut config = Config::default();
    let mut file_name = None;

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--set-nearest" => config = config.with_set_scope(SetScope::Nearest),
            "--numeric-literals" => config = config.with_literal_rules(LiteralRules::Numeric),
            "--max-depth" => {
                let depth = args
                    .next()
                    .and_then(|n| n.parse().ok())
                    .ok_or("--max-depth expects a number")?;
                config = config.with_max_call_depth(depth);
            }
            "-h" | "--help" => return Err(USAGE.to_string()),
            flag if flag.starts_with("--") => return Err(format!("unknown flag {}\n{}", flag, USAGE)),
            _ if file_name.is_none() => file_name = Some(arg.clone()),
            _ => return Err(USAGE.to_string()),
        }
    }

    Ok(Args { config, file_name })
}

fn main() {
    env_logger::init();

    let args = match parse_args() {
        Ok(args) => args,
        Err(message) => {
            eprintln!("{}", message);
            process::exit(2);
        }
    };

    let interpreter = Interpreter::with_config(args.config);
    if let Some(file_name) = args.file_name {
        if let Err(err) = load(&interpreter, &file_name) {
            eprintln!("{}: {}", file_name, err);
            process::exit(1);
        }
    }

    if let Err(err) = run_repl(&interpreter) {
        eprintln!("failed to run repl: {}", err);
        process::exit(1);
    }
}

fn load(interpreter: &Interpreter, file_name: &str) -> Result<(), Box<dyn std::error::Error>> {
    let source = fs::read_to_string(file_name)?;
    interpreter.run(&source)?;
    Ok(())
}

fn run_repl(interpreter: &Interpreter) -> Result<(), ReadlineError> {
    let mut rl = DefaultEditor::new()?;
    let mut input_count = 0;

    loop {
        match rl.readline(&format!("In  [{}]: ", input_count)) {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(line.as_str());

                match interpreter.run(&line) {
                    Ok(values) => {
                        match values.last() {
                            None | Some(Value::Unspecified) => (),
                            Some(value) => println!("Out [{}]: {}", input_count, value),
                        }
                        input_count += 1;
                    }
                    Err(err) => eprintln!("{}", err),
                }
            }
            Err(ReadlineError::Eof) => {
                let answer = rl.readline("Exit interpreter? ([y]/n): ").unwrap_or_default();
                if !answer.to_lowercase().contains('n') {
                    return Ok(());
                }
            }
            Err(ReadlineError::Interrupted) => return Ok(()),
            Err(err) => return Err(err),
        }
    }
}
