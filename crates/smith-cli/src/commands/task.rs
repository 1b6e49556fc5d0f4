use anyhow::{Context, Result};
use bat::PrettyPrinter;
use cliclack::spinner;
use smith::{
    assembler::{AssemblerConfig, PromptAssembler, TaskRequest},
    providers::base::ResponseFormat,
    tasks::{TaskKind, TaskTemplate},
};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use crate::provider::ProviderArgs;

/// Gather subjects in slot order: inline values first, then file contents
pub fn collect_subjects(subjects: Vec<String>, files: &[PathBuf]) -> Result<Vec<String>> {
    let mut collected = subjects;
    for path in files {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read subject from {}", path.display()))?;
        collected.push(text);
    }
    Ok(collected)
}

pub async fn handle_task(
    template: TaskTemplate,
    kind: TaskKind,
    subjects: Vec<String>,
    subject_files: Vec<PathBuf>,
    json: bool,
    provider: ProviderArgs,
) -> Result<()> {
    let subjects = collect_subjects(subjects, &subject_files)?;
    let assembler = PromptAssembler::new(Arc::from(provider.build()?), AssemblerConfig::default());

    let mut request = TaskRequest::new(template, subjects).with_kind(kind);
    if json {
        request = request.with_response_format(ResponseFormat::JsonObject);
    }

    let spin = spinner();
    spin.start("awaiting reply");
    let result = assembler.build_and_run(&request).await;
    spin.stop("");

    render(&result?, json)
}

fn render(content: &str, json: bool) -> Result<()> {
    PrettyPrinter::new()
        .input_from_bytes(content.as_bytes())
        .language(if json { "json" } else { "markdown" })
        .print()?;
    println!();
    Ok(())
}
