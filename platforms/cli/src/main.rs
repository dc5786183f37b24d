use clap::{Parser, Subcommand};
use formlang::{
    add_unary, multiply_unary, recognize, tokenize, Execution, ExpressionError, Language,
    ProgramLoader, ProgramManager, Record, RecursiveDescent, ShiftReduceParser, TraceStep,
    TuringMachine,
};
use serde::Serialize;
use serde_json::json;
use std::error::Error;
use std::io::{self, BufRead};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[clap(author, version, about, long_about = None, arg_required_else_help = true)]
struct Cli {
    /// Print results as JSON
    #[clap(long, global = true)]
    json: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[clap(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the tokens of an expression
    Tokenize { expression: String },

    /// Recognize and evaluate expressions with the shift-reduce parser.
    /// Variables assigned by one expression are visible to the following ones.
    /// Reads one expression per line from stdin when none are given.
    ShiftReduce {
        expressions: Vec<String>,

        /// Print the shift/reduce trace
        #[clap(short, long)]
        trace: bool,
    },

    /// Evaluate an expression with the recursive-descent parser
    Descent {
        expression: String,

        /// Print the derivation
        #[clap(short, long)]
        trace: bool,
    },

    /// Add two numbers on the unary addition machine
    Add {
        a: usize,
        b: usize,

        /// Print the execution history
        #[clap(long)]
        history: bool,
    },

    /// Multiply two numbers on the unary multiplication machine
    Multiply {
        a: usize,
        b: usize,

        /// Print the execution history
        #[clap(long)]
        history: bool,
    },

    /// Decide membership with a built-in recognizer (anbncn, palindrome, anb2n)
    Recognize {
        language: String,
        input: String,

        /// Print the execution history
        #[clap(long)]
        history: bool,
    },

    /// Execute a Turing machine program file
    Run {
        /// The Turing machine program file to execute
        #[clap(short, long)]
        program: PathBuf,

        /// The initial tape content
        #[clap(short, long, default_value = "")]
        input: String,

        /// Override the program's step limit
        #[clap(long)]
        max_steps: Option<usize>,

        /// Print the execution history
        #[clap(long)]
        history: bool,
    },

    /// List the built-in machines
    List,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Executes the selected command. `Ok(false)` means the command ran but the input was
/// rejected or could not be evaluated.
fn run(cli: &Cli) -> Result<bool, Box<dyn Error>> {
    match &cli.command {
        Command::Tokenize { expression } => match tokenize(expression) {
            Ok(tokens) => {
                if cli.json {
                    print_json(&tokens)?;
                } else {
                    for token in &tokens {
                        println!("{:<8} {}", token.kind.name(), token.text);
                    }
                }
                Ok(true)
            }
            Err(e) => report(cli, &e),
        },

        Command::ShiftReduce { expressions, trace } => {
            let expressions = if expressions.is_empty() {
                read_stdin_lines()?
            } else {
                expressions.clone()
            };

            let mut parser = ShiftReduceParser::new();
            let mut ok = true;

            for expression in &expressions {
                log::info!("shift-reduce: {expression}");
                ok &= shift_reduce(cli, &mut parser, expression, *trace)?;
            }

            if cli.json {
                print_json(&json!({ "variables": parser.variables() }))?;
            }
            Ok(ok)
        }

        Command::Descent { expression, trace } => {
            let mut parser = RecursiveDescent::new();
            let result = parser.parse(expression);

            if cli.json {
                print_json(&json!({
                    "value": result.as_ref().ok(),
                    "errors": result.as_ref().err().map(ExpressionError::diagnostics),
                    "derivation": parser.derivation(),
                }))?;
                return Ok(result.is_ok());
            }

            if *trace {
                for (i, line) in parser.derivation().iter().enumerate() {
                    println!("{:>3}. {line}", i + 1);
                }
            }

            match result {
                Ok(value) => {
                    println!("{value}");
                    Ok(true)
                }
                Err(e) => report(cli, &e),
            }
        }

        Command::Add { a, b, history } => print_execution(cli, &add_unary(*a, *b)?, *history),

        Command::Multiply { a, b, history } => {
            print_execution(cli, &multiply_unary(*a, *b)?, *history)
        }

        Command::Recognize {
            language,
            input,
            history,
        } => {
            let language: Language = language.parse()?;
            print_execution(cli, &recognize(language, input)?, *history)
        }

        Command::Run {
            program,
            input,
            max_steps,
            history,
        } => {
            let program = ProgramLoader::load_program(program)?;
            let mut machine = TuringMachine::new(program, input);
            if let Some(max_steps) = max_steps {
                machine = machine.with_max_steps(*max_steps);
            }

            print_execution(cli, &machine.execute(), *history)
        }

        Command::List => {
            let infos = (0..ProgramManager::get_program_count())
                .map(ProgramManager::get_program_info)
                .collect::<Result<Vec<_>, _>>()?;

            if cli.json {
                print_json(&infos)?;
            } else {
                for info in infos {
                    println!(
                        "{:>2}  {:<22} {} states, {} transitions, limit {}",
                        info.index,
                        info.name,
                        info.state_count,
                        info.transition_count,
                        info.max_steps
                    );
                }
            }
            Ok(true)
        }
    }
}

fn shift_reduce(
    cli: &Cli,
    parser: &mut ShiftReduceParser,
    expression: &str,
    trace: bool,
) -> Result<bool, Box<dyn Error>> {
    let evaluation = match parser.evaluate(expression) {
        Ok(evaluation) => evaluation,
        Err(e) => {
            // Show how far the recognizer got
            if trace && !cli.json {
                if let Ok(analysis) = parser.parse(expression) {
                    print_trace(&analysis.trace);
                }
            }
            return report(cli, &e);
        }
    };

    if cli.json {
        print_json(&evaluation)?;
        return Ok(true);
    }

    if trace {
        print_trace(&evaluation.trace);
    }

    match &evaluation.name {
        Some(name) => println!("{name} = {}", evaluation.value),
        None => println!("{}", evaluation.value),
    }
    Ok(true)
}

fn read_stdin_lines() -> Result<Vec<String>, Box<dyn Error>> {
    if atty::is(atty::Stream::Stdin) {
        return Err("no expressions given and stdin is a terminal".into());
    }

    let mut lines = Vec::new();
    for line in io::stdin().lock().lines() {
        let line = line?;
        if !line.trim().is_empty() {
            lines.push(line);
        }
    }
    Ok(lines)
}

fn report(cli: &Cli, error: &ExpressionError) -> Result<bool, Box<dyn Error>> {
    if cli.json {
        print_json(&json!({
            "category": error.category(),
            "errors": error.diagnostics(),
        }))?;
    } else {
        for line in error.diagnostics() {
            eprintln!("{line}");
        }
    }
    Ok(false)
}

fn print_trace(trace: &[TraceStep]) {
    let width = trace
        .iter()
        .map(|s| s.stack_text().chars().count())
        .max()
        .unwrap_or(0);

    for step in trace {
        println!(
            "{:>3}  {:<width$}  {:>20}  {}",
            step.step,
            step.stack_text(),
            step.input,
            step.action
        );
    }
}

fn print_execution(
    cli: &Cli,
    execution: &Execution,
    history: bool,
) -> Result<bool, Box<dyn Error>> {
    if cli.json {
        let records = history.then_some(&execution.history);
        print_json(&json!({
            "accepted": execution.accepted(),
            "halt": execution.halt.to_string(),
            "result": execution.result(),
            "steps": execution.steps,
            "tape": execution.tape.trimmed(),
            "history": records,
        }))?;
        return Ok(execution.accepted());
    }

    if history {
        for record in &execution.history {
            println!(
                "{:>5}  {:<8} {}  {}",
                record.step,
                record.state,
                render_tape(record),
                record.action
            );
        }
        println!();
    }

    println!("{} after {} steps", execution.halt, execution.steps);
    if let Some(result) = execution.result() {
        println!("result: {result}");
    }
    println!("tape: {}", execution.tape.trimmed());

    Ok(execution.accepted())
}

/// Renders a history tape with the head cell in brackets, padding with blanks when the
/// head is outside the recorded region.
fn render_tape(record: &Record) -> String {
    let cells: Vec<char> = record.tape.chars().collect();
    let end = record.origin + cells.len() as isize;
    let start = record.origin.min(record.head);
    let end = end.max(record.head + 1);

    (start..end)
        .map(|position| {
            let symbol = usize::try_from(position - record.origin)
                .ok()
                .and_then(|i| cells.get(i).copied())
                .unwrap_or('_');

            if position == record.head {
                format!("[{symbol}]")
            } else {
                symbol.to_string()
            }
        })
        .collect()
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), Box<dyn Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
