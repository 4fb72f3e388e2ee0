//! CLI entry point for the casebook operator shell
//!
//! Supports two execution modes:
//! - Interactive: Read instructions from stdin line-by-line
//! - Batch: Read instructions from a playbook file
//!
//! Every response is printed as JSON on stdout.
//!
//! # Examples
//!
//! Interactive mode:
//! ```bash
//! ./casebook
//! > LOGIN admin@example.com
//! > CASES
//! > ^D
//! ```
//!
//! Batch mode:
//! ```bash
//! CASEBOOK_SEED_EMAIL=mbah@firm.cm ./casebook --playbook onboarding.casebook
//! ```

use std::io::{self, BufRead, Write};

use casebook_core::casebook::{
    api::PortalResponse,
    config::{CasebookConfig, DEFAULT_SEED_EMAIL, DEFAULT_SEED_NAME},
};
use casebook_interactive::{Instruction, Session};
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser, Debug)]
#[command(name = "casebook")]
#[command(about = "Operate a casebook from instructions", long_about = None)]
struct Args {
    /// Path to a playbook file containing instructions to execute (batch mode)
    #[arg(short, long)]
    playbook: Option<String>,

    /// Name of the Managing Partner account created at startup
    #[arg(long, env = "CASEBOOK_SEED_NAME", default_value = DEFAULT_SEED_NAME)]
    seed_name: String,

    /// Email of the Managing Partner account created at startup
    #[arg(long, env = "CASEBOOK_SEED_EMAIL", default_value = DEFAULT_SEED_EMAIL)]
    seed_email: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?;
    fmt().with_writer(std::io::stderr).with_target(false).with_env_filter(filter).init();

    let args = Args::parse();
    let config = CasebookConfig::default().with_seed_partner(args.seed_name, args.seed_email);
    info!(seed = %config.seed_email, "Casebook initialized");

    let mut session = Session::new(&config);

    if let Some(playbook_path) = args.playbook {
        // Batch mode: read from file
        run_batch_mode(&mut session, &playbook_path).await?;
    } else {
        // Interactive mode: read from stdin
        run_interactive_mode(&mut session).await?;
    }

    Ok(())
}

fn print_response(response: &PortalResponse) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(response)?);
    Ok(())
}

/// Run in batch mode, reading instructions from a file
async fn run_batch_mode(session: &mut Session, file_path: &str) -> anyhow::Result<()> {
    info!("Running batch mode from file: {}", file_path);

    let file = std::fs::File::open(file_path)?;
    let reader = io::BufReader::new(file);

    let start_time = std::time::Instant::now();
    for (line_num, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();

        // Skip empty lines and comments
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        debug!("[{}] {}", line_num + 1, line);

        match Instruction::try_from(line) {
            Ok(instruction) => match session.execute(&instruction).await {
                Ok(Some(response)) => print_response(&response)?,
                Ok(None) => {}
                Err(e) => {
                    info!("✗ Error at line {}: {}", line_num + 1, e);
                    return Err(e);
                }
            },
            Err(e) => {
                info!("✗ Parse error at line {}: {}", line_num + 1, e);
                return Err(e);
            }
        }
    }

    info!(execution_time = ?start_time.elapsed(), "Batch execution completed successfully.");
    Ok(())
}

/// Run in interactive mode, reading instructions from stdin
async fn run_interactive_mode(session: &mut Session) -> anyhow::Result<()> {
    println!("casebook - Interactive Mode");
    println!("===========================");
    println!("Type HELP for the instruction list, Ctrl+D to exit");
    println!();

    let stdin = io::stdin();
    let mut reader = stdin.lock();
    let mut line = String::new();

    loop {
        match session.actor() {
            Some(actor) => print!("{actor}> "),
            None => print!("> "),
        }
        io::stdout().flush()?;

        line.clear();
        let bytes_read = reader.read_line(&mut line)?;

        // EOF reached
        if bytes_read == 0 {
            println!();
            println!("Goodbye!");
            break;
        }

        let trimmed = line.trim();

        // Skip empty lines and comments
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        match Instruction::try_from(trimmed) {
            Ok(instruction) => match session.execute(&instruction).await {
                Ok(Some(response)) => print_response(&response)?,
                Ok(None) => {}
                // Continue in interactive mode even after errors
                Err(e) => eprintln!("✗ Error: {}", e),
            },
            Err(e) => {
                eprintln!("✗ Parse error: {}", e);
            }
        }
    }

    Ok(())
}
