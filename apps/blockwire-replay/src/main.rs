mod script;

use std::fs::{read_to_string, write};

use anyhow::{Context, Result};
use blockwire_core::{info, BlockRegistry, DomainModel, EditorConfig, EditorSession, MemoryWorkspace};
use clap::Parser;
use script::{Replay, Script};

/// Replay recorded edits against an in-memory workspace and dump the result
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path of the domain model json
    #[arg(short, long)]
    model: String,

    /// Path of the edit script json
    #[arg(short, long)]
    script: String,

    /// Output file, stdout when omitted
    #[arg(short, long)]
    output: Option<String>,
}

fn main() -> Result<()> {
    blockwire_logger::init_logger();
    let args = Args::parse();

    let config = EditorConfig::from_env()?;
    let domain = DomainModel::from_json(
        read_to_string(&args.model).with_context(|| format!("failed to read model {}", args.model))?,
    )?;
    let script: Script = serde_json::from_str(
        &read_to_string(&args.script).with_context(|| format!("failed to read script {}", args.script))?,
    )?;

    let registry = BlockRegistry::shared(&config);
    let mut workspace = MemoryWorkspace::new(registry.clone());
    let session = EditorSession::attach(&mut workspace, domain, registry, config);

    Replay::new(&mut workspace).run(&script)?;
    session.detach(&mut workspace);

    let json = serde_json::to_string_pretty(&workspace)?;
    match &args.output {
        Some(output) => {
            write(output, json)?;
            info!("workspace written to {}", output);
        }
        None => println!("{json}"),
    }

    Ok(())
}
