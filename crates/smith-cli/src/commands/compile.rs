use anyhow::{Context, Result};
use cliclack::spinner;
use console::style;
use smith::compiler::{CompilerClient, CompilerConfig};
use std::env;
use std::fs;
use std::path::PathBuf;

pub async fn handle_compile(
    code: PathBuf,
    config: PathBuf,
    compiler_host: Option<String>,
) -> Result<()> {
    let host = compiler_host
        .or_else(|| env::var("SMITH_COMPILER_HOST").ok())
        .context(
            "Compiler host must be provided via --compiler-host or SMITH_COMPILER_HOST environment variable",
        )?;

    let code = fs::read_to_string(&code)
        .with_context(|| format!("failed to read contract from {}", code.display()))?;
    let config = fs::read_to_string(&config)
        .with_context(|| format!("failed to read config from {}", config.display()))?;

    let client = CompilerClient::new(CompilerConfig::new(host))?;

    let spin = spinner();
    spin.start("compiling");
    let result = client.compile(&code, &config).await;
    spin.stop("");
    let artifact = result?;

    println!("{}", style("manifest").bold().green());
    println!("{}", serde_json::to_string_pretty(&artifact.manifest)?);
    println!();
    println!("{}", style("nef").bold().green());
    println!("{}", artifact.nef);
    Ok(())
}
