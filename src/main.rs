//! Reference command-line runner for the sliver tokenizer.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::{Parser, ValueEnum};

use sliver::{
    default_pool, encode_fast_external, encode_fast_file, encode_linear_external,
    encode_linear_file,
};

#[derive(Parser)]
#[command(name = "sliver")]
#[command(about = "WordPiece tokenization for large UTF-8 streams", long_about = None)]
#[command(version)]
struct Args {
    /// Encoding engine and execution mode
    #[arg(value_enum)]
    mode: Mode,

    /// UTF-8 text file to tokenize
    text_file: PathBuf,

    /// Vocabulary file, one token per line (ids assigned top down)
    vocab_file: PathBuf,

    /// Worker threads; 0 selects hardware concurrency
    #[arg(default_value_t = 0)]
    n_threads: usize,

    /// Output file for the ids (stdout if not specified; required for
    /// external modes)
    out_file: Option<PathBuf>,

    /// Memory budget in megabytes for external modes
    #[arg(value_parser = clap::value_parser!(u64).range(50..))]
    memory_limit_mb: Option<u64>,
}

#[derive(ValueEnum, Clone, Copy)]
enum Mode {
    /// Greedy longest-match encoder, in memory
    Fast,
    /// Worst-case-linear encoder, in memory
    Linear,
    /// Greedy encoder streaming over a memory budget
    FastExternal,
    /// Linear encoder streaming over a memory budget
    LinearExternal,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp(None)
        .init();

    let args = Args::parse();
    default_pool(args.n_threads);
    let started = Instant::now();

    match args.mode {
        Mode::Fast | Mode::Linear => {
            let ids = match args.mode {
                Mode::Fast => encode_fast_file(&args.text_file, &args.vocab_file)?,
                _ => encode_linear_file(&args.text_file, &args.vocab_file)?,
            };
            match &args.out_file {
                Some(path) => {
                    let mut out = BufWriter::new(
                        File::create(path).with_context(|| format!("cannot create {path:?}"))?,
                    );
                    for id in &ids {
                        write!(out, "{id} ")?;
                    }
                    out.flush()?;
                    println!(
                        "encoded {} tokens in {} ms to {}",
                        ids.len(),
                        started.elapsed().as_millis(),
                        path.display()
                    );
                }
                None => {
                    let rendered: Vec<String> = ids.iter().map(|id| id.to_string()).collect();
                    println!("{}", rendered.join(" "));
                }
            }
        }
        Mode::FastExternal | Mode::LinearExternal => {
            let out_file = args
                .out_file
                .as_ref()
                .context("external modes require an output file")?;
            let memory_limit_mb = args
                .memory_limit_mb
                .context("external modes require a memory limit in MB")?
                as usize;
            match args.mode {
                Mode::FastExternal => encode_fast_external(
                    &args.text_file,
                    &args.vocab_file,
                    out_file,
                    memory_limit_mb,
                )?,
                _ => encode_linear_external(
                    &args.text_file,
                    &args.vocab_file,
                    out_file,
                    memory_limit_mb,
                )?,
            }
            println!(
                "encoded {} in {} ms to {}",
                args.text_file.display(),
                started.elapsed().as_millis(),
                out_file.display()
            );
        }
    }

    Ok(())
}
