use clap::{Parser as ClapParser, Subcommand};
use jmesq::cli::{self, CliError, SearchOptions, SearchResult};
use jmesq::{DEFAULT_MAX_DEPTH, ParserOptions};
use std::io::{self, Read};
use tracing_subscriber::EnvFilter;

#[derive(ClapParser)]
#[command(name = "jmesq")]
#[command(about = "jmesq - Query and reshape JSON with JMESPath expressions")]
#[command(version)]
struct Cli {
    /// Log compilation and function dispatch to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate an expression against JSON input
    Search {
        /// The expression to evaluate
        expression: String,

        /// JSON input (reads from stdin if not provided)
        #[arg(short, long)]
        input: Option<String>,

        /// Pretty-print the output
        #[arg(short, long)]
        pretty: bool,

        /// Only validate syntax, don't evaluate
        #[arg(long)]
        syntax_only: bool,

        /// Maximum expression nesting depth
        #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
        max_depth: usize,
    },

    /// Print the tokens of an expression
    Tokenize {
        expression: String,
    },

    /// Print the syntax tree of an expression
    Ast {
        expression: String,

        /// Maximum expression nesting depth
        #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
        max_depth: usize,
    },

    /// List builtin functions, or describe one
    Functions {
        /// Function name
        name: Option<String>,
    },
}

fn init_logging(verbose: bool) {
    let default = if verbose { "jmesq=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Search {
            expression,
            input,
            pretty,
            syntax_only,
            max_depth,
        } => run_search(expression, input, pretty, syntax_only, max_depth),
        Commands::Tokenize { expression } => {
            cli::render_tokens(&expression).map(|tokens| print!("{}", tokens))
        }
        Commands::Ast {
            expression,
            max_depth,
        } => cli::render_ast(&expression, ParserOptions { max_depth })
            .map(|tree| print!("{}", tree)),
        Commands::Functions { name: None } => {
            print!("{}", cli::list_functions());
            Ok(())
        }
        Commands::Functions { name: Some(name) } => {
            cli::describe_function(&name).map(|doc| print!("{}", doc))
        }
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn run_search(
    expression: String,
    input: Option<String>,
    pretty: bool,
    syntax_only: bool,
    max_depth: usize,
) -> Result<(), CliError> {
    let input = match input {
        Some(s) => Some(s),
        None if !syntax_only && !atty::is(atty::Stream::Stdin) => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Some(buffer)
        }
        None => None,
    };

    let options = SearchOptions {
        expression,
        input,
        syntax_only,
        parser: ParserOptions { max_depth },
    };

    match cli::execute_search(&options)? {
        SearchResult::SyntaxValid => println!("Syntax is valid"),
        SearchResult::Success(output) => {
            let json = if pretty {
                jmesq::to_json_pretty(&output)
            } else {
                jmesq::to_json(&output)
            };
            println!("{}", json);
        }
    }
    Ok(())
}
