//! Reference CLI (§6): thin shell over `Index::build`/`save`/`load`/
//! `count`/`locate`. Owns argument parsing, file I/O, and exit-code mapping
//! only; no indexing logic lives here.

use std::env;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read};
use std::process::ExitCode;

use bwt_fmindex::{Error, Index, IndexBuilder, OracleVariant};

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", err);
            match err {
                CliError::Index(Error::InputContainsTerminator(_)) => ExitCode::from(2),
                _ => ExitCode::from(1),
            }
        }
    }
}

enum CliError {
    Usage(String),
    Index(Error),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{}", msg),
            CliError::Index(err) => write!(f, "{}", err),
        }
    }
}

impl From<Error> for CliError {
    fn from(err: Error) -> Self {
        CliError::Index(err)
    }
}

fn run(args: &[String]) -> Result<(), CliError> {
    match args.get(1).map(String::as_str) {
        Some("build") => run_build(&args[2..]),
        Some("search") => run_search(&args[2..]),
        _ => Err(CliError::Usage(usage(&args[0]))),
    }
}

fn usage(program: &str) -> String {
    format!(
        "Usage:\n  {p} build [--variant naive|full|checkpointed] [--step <n>] <input-path> <index-path>\n  {p} search <index-path> <pattern>",
        p = program
    )
}

fn run_build(args: &[String]) -> Result<(), CliError> {
    let mut variant = OracleVariant::default();
    let mut positional = Vec::new();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--variant" => {
                let name = args
                    .get(i + 1)
                    .ok_or_else(|| CliError::Usage("--variant requires a value".to_string()))?;
                let step = current_step(variant);
                variant = parse_variant(name, step)?;
                i += 2;
            }
            "--step" => {
                let value = args
                    .get(i + 1)
                    .ok_or_else(|| CliError::Usage("--step requires a value".to_string()))?;
                let step: u32 = value
                    .parse()
                    .map_err(|_| CliError::Usage(format!("invalid --step value: {}", value)))?;
                variant = with_step(variant, step);
                i += 2;
            }
            other => {
                positional.push(other.to_string());
                i += 1;
            }
        }
    }

    let [input_path, index_path] = positional.as_slice() else {
        return Err(CliError::Usage(
            "build requires <input-path> and <index-path>".to_string(),
        ));
    };

    let mut text = Vec::new();
    File::open(input_path)
        .map_err(Error::from)?
        .read_to_end(&mut text)
        .map_err(Error::from)?;

    let index = IndexBuilder::new().variant(variant).build(&text)?;

    let mut out = BufWriter::new(File::create(index_path).map_err(Error::from)?);
    bwt_fmindex::serialize::save(&index, &mut out).map_err(CliError::Index)?;

    Ok(())
}

fn run_search(args: &[String]) -> Result<(), CliError> {
    let [index_path, pattern] = args else {
        return Err(CliError::Usage(
            "search requires <index-path> and <pattern>".to_string(),
        ));
    };

    let mut input = BufReader::new(File::open(index_path).map_err(Error::from)?);
    let index = bwt_fmindex::serialize::load(&mut input).map_err(CliError::Index)?;

    let pattern = pattern.as_bytes();
    let count = index.count(pattern);
    let offsets = index.locate(pattern);

    println!("{}", count);
    println!(
        "{}",
        offsets
            .iter()
            .map(u64::to_string)
            .collect::<Vec<_>>()
            .join(" ")
    );

    Ok(())
}

fn current_step(variant: OracleVariant) -> u32 {
    match variant {
        OracleVariant::Checkpointed { step } => step,
        _ => bwt_fmindex::DEFAULT_CHECKPOINT_STEP,
    }
}

fn with_step(variant: OracleVariant, step: u32) -> OracleVariant {
    match variant {
        OracleVariant::Checkpointed { .. } => OracleVariant::Checkpointed { step },
        other => other,
    }
}

fn parse_variant(name: &str, step: u32) -> Result<OracleVariant, CliError> {
    match name {
        "naive" => Ok(OracleVariant::Naive),
        "full" => Ok(OracleVariant::Full),
        "checkpointed" => Ok(OracleVariant::Checkpointed { step }),
        other => Err(CliError::Usage(format!(
            "unknown oracle variant '{}', expected naive|full|checkpointed",
            other
        ))),
    }
}
