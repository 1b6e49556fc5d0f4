mod commands;
mod provider;

use anyhow::Result;
use clap::{Parser, Subcommand};
use smith::tasks::{TaskKind, TaskTemplate};
use std::path::PathBuf;

use commands::compile::handle_compile;
use commands::task::handle_task;
use commands::templates::handle_templates;
use commands::version::print_version;
use provider::ProviderArgs;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run one drafting task and print the reply
    Task {
        /// Template to fill, see `smith templates`
        template: TaskTemplate,

        /// Specialist persona for the system instruction
        #[arg(short, long, default_value = "general")]
        kind: TaskKind,

        /// Subject bound to the template's next slot
        #[arg(short, long = "subject", value_name = "TEXT")]
        subjects: Vec<String>,

        /// Read a subject from a file, bound after any --subject values
        #[arg(long = "subject-file", value_name = "PATH")]
        subject_files: Vec<PathBuf>,

        /// Ask for a JSON object reply
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        provider: ProviderArgs,
    },

    /// List the templates and the subjects each one expects
    Templates,

    /// Print the version
    Version,

    /// Compile a contract with the compiler service
    Compile {
        /// Contract source file
        #[arg(long, value_name = "FILE")]
        code: PathBuf,

        /// Contract configuration file
        #[arg(long, value_name = "FILE")]
        config: PathBuf,

        /// Compiler service base url (can also be set via SMITH_COMPILER_HOST)
        #[arg(long)]
        compiler_host: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Command::Task {
            template,
            kind,
            subjects,
            subject_files,
            json,
            provider,
        }) => handle_task(template, kind, subjects, subject_files, json, provider).await,
        Some(Command::Templates) => {
            handle_templates();
            Ok(())
        }
        Some(Command::Version) => {
            print_version();
            Ok(())
        }
        Some(Command::Compile {
            code,
            config,
            compiler_host,
        }) => handle_compile(code, config, compiler_host).await,
        None => {
            println!("No command provided - Run 'smith help' to see available commands.");
            Ok(())
        }
    }
}
