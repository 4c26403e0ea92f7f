use std::{env, fs::read_to_string, path::PathBuf, process::ExitCode, time::Instant};

use log::LevelFilter;
use scopec::{
    ast::ast::{Link, Node},
    lexer::lexer::tokenize,
    logging,
    parser::{options::ParseOptions, parser::parse_with_options},
    render_error,
};

const USAGE: &str = "usage: scopec <file> [--max-depth N] [--log FILE]";

struct Args {
    file: PathBuf,
    options: ParseOptions,
    log: Option<PathBuf>,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Args, String> {
    let mut file = None;
    let mut options = ParseOptions::default();
    let mut log = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--max-depth" => {
                let value = args.next().ok_or("--max-depth needs a value")?;
                let max_depth = value
                    .parse()
                    .map_err(|_| format!("invalid --max-depth value `{}`", value))?;
                options = options.with_max_depth(max_depth);
            }
            "--log" => {
                log = Some(PathBuf::from(args.next().ok_or("--log needs a file")?));
            }
            _ if file.is_none() => file = Some(PathBuf::from(arg)),
            _ => return Err(format!("unexpected argument `{}`", arg)),
        }
    }

    Ok(Args {
        file: file.ok_or("no input file given")?,
        options,
        log,
    })
}

/// Prints one line per link, with conditional bodies indented below their
/// head.
fn print_chain(root: &Link, indent: usize) {
    for link in root.iter() {
        match link.command.as_deref() {
            Some(Node::Conditional { keyword, cond, body }) => {
                println!("{:indent$}{:?} {} ({:?})", "", link.marker, keyword, cond);
                print_chain(body, indent + 4);
            }
            Some(command) => println!("{:indent$}{:?} {:?}", "", link.marker, command),
            None => println!("{:indent$}{:?}", "", link.marker),
        }
    }
}

fn main() -> ExitCode {
    let args = match parse_args(env::args().skip(1)) {
        Ok(args) => args,
        Err(message) => {
            eprintln!("{}\n{}", message, USAGE);
            return ExitCode::FAILURE;
        }
    };

    if let Some(log) = &args.log {
        if let Err(err) = logging::init(log, LevelFilter::Trace) {
            eprintln!("Failed to install logger: {}", err);
        }
    }

    let file_name = args
        .file
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| args.file.to_string_lossy().into_owned());

    let source = match read_to_string(&args.file) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("Failed to read {}: {}", args.file.display(), err);
            return ExitCode::FAILURE;
        }
    };

    let start = Instant::now();

    let tokens = match tokenize(&source, Some(file_name)) {
        Ok(tokens) => tokens,
        Err(error) => {
            eprint!("{}", render_error(&error, &source));
            return ExitCode::FAILURE;
        }
    };

    eprintln!("Tokenized in {:?}", start.elapsed());

    let parse_start = Instant::now();
    let (_, result) = parse_with_options(&tokens, args.options);

    eprintln!("Parsed in {:?}", parse_start.elapsed());
    log::logger().flush();

    match result {
        Ok(root) => {
            print_chain(&root, 0);
            ExitCode::SUCCESS
        }
        Err(error) => {
            eprint!("{}", render_error(&error, &source));
            ExitCode::FAILURE
        }
    }
}
