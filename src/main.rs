use clap::{Parser, ValueEnum};
use sql2doc::convert::{ConvertError, Converter};
use sql2doc::ir::{FixedStrategy, Strategy};
use sql2doc::report::Report;
use sql2doc::serializer::outline;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process;

/// Convert SQL CREATE TABLE DDL into a document-store schema proposal
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input .sql file, or `-` for stdin
    #[arg(default_value = "-")]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    /// Modeling strategy applied to one-to-many relationships
    #[arg(short, long, value_enum, env = "SQL2DOC_STRATEGY", default_value_t = StrategyArg::Embedding)]
    strategy: StrategyArg,

    /// Emit single-line JSON
    #[arg(long)]
    compact: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Report envelope as JSON
    Json,
    /// Indented plain-text outline
    Outline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum StrategyArg {
    /// Nest related documents
    Embedding,
    /// Store identifiers of related documents
    Reference,
}

impl From<StrategyArg> for Strategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Embedding => Strategy::Embedding,
            StrategyArg::Reference => Strategy::Reference,
        }
    }
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("input file must be a .sql file: {0}")]
    NotSql(PathBuf),
    #[error("Failed to read {path}: {source}")]
    Read { path: String, source: io::Error },
    #[error("Failed to write {path}: {source}")]
    Write { path: String, source: io::Error },
    #[error("{0}")]
    Convert(#[from] ConvertError),
}

fn main() {
    // Quiet by default, RUST_LOG overrides
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match run(&cli) {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("{}", e);
            process::exit(1);
        }
    }
}

/// Returns whether the conversion succeeded.
fn run(cli: &Cli) -> Result<bool, CliError> {
    let input = read_input(&cli.input)?;
    let converter = Converter::default().with_strategy_policy(FixedStrategy(cli.strategy.into()));

    let (rendered, success) = match cli.format {
        OutputFormat::Json => {
            let report = Report::from_source(&converter, &input);
            (report.to_json(!cli.compact)?, report.success)
        }
        OutputFormat::Outline => (outline(&converter.convert(&input)?), true),
    };

    match &cli.output {
        Some(path) => fs::write(path, &rendered).map_err(|source| CliError::Write {
            path: path.display().to_string(),
            source,
        })?,
        None => println!("{}", rendered.trim_end()),
    }

    Ok(success)
}

fn read_input(path: &Path) -> Result<String, CliError> {
    if path == Path::new("-") {
        let mut input = String::new();
        io::stdin()
            .read_to_string(&mut input)
            .map_err(|source| CliError::Read {
                path: "stdin".to_string(),
                source,
            })?;
        return Ok(input);
    }

    let is_sql = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("sql"));
    if !is_sql {
        return Err(CliError::NotSql(path.to_path_buf()));
    }

    fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.display().to_string(),
        source,
    })
}
