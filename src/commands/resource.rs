use anyhow::{Context as AnyhowContext, Result, bail};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde::Serialize;
use serde_json::{Map, Value as Json};
use std::path::Path;

use crate::Context;
use crate::cli::ModelInput;
use crate::commands::connect;
use crate::provider::Provider;
use crate::ui;
use binding::{ResourceSchema, Response, Severity, ValueKind};

// ============================================================================
// Lifecycle Commands
// ============================================================================

/// Create a new section from `--file` or `--set`
pub fn create(ctx: &Context, provider: &Provider, type_name: &str, input: &ModelInput) -> Result<()> {
    let handler = provider.resource(type_name)?;
    let planned = build_model(&handler.schema(), input, None)?;
    let session = connect(ctx)?;

    let response = handler.create(&session.client, planned);
    session.save()?;
    report(ctx, &format!("Created {type_name}"), &response)?;
    if let Some(id) = response.state.as_ref().and_then(|s| s["id"].as_str())
        && !ctx.json
    {
        ui::success(&format!("Created {id}"));
    }
    Ok(())
}

/// Read a section
pub fn read(ctx: &Context, provider: &Provider, type_name: &str, id: &str) -> Result<()> {
    let handler = provider.resource(type_name)?;
    let session = connect(ctx)?;

    let response = handler.read(&session.client, id_document(id));
    report(ctx, &format!("{type_name} {id}"), &response)?;
    if response.state.is_none() && !ctx.json {
        ui::warn(&format!("{id} does not exist"));
        ui::dim("A host would drop this resource from its state");
    }
    Ok(())
}

/// Rewrite an existing section
pub fn update(
    ctx: &Context,
    provider: &Provider,
    type_name: &str,
    id: &str,
    input: &ModelInput,
) -> Result<()> {
    let handler = provider.resource(type_name)?;
    let planned = build_model(&handler.schema(), input, Some(id))?;
    let session = connect(ctx)?;

    let response = handler.update(&session.client, planned);
    session.save()?;
    report(ctx, &format!("Updated {type_name} {id}"), &response)
}

/// Delete a section
pub fn delete(ctx: &Context, provider: &Provider, type_name: &str, id: &str) -> Result<()> {
    let handler = provider.resource(type_name)?;
    let session = connect(ctx)?;

    let response = handler.delete(&session.client, id_document(id));
    session.save()?;
    report(ctx, type_name, &response)?;
    if !ctx.json && response.diagnostics.is_empty() {
        ui::success(&format!("Deleted {id}"));
    }
    Ok(())
}

/// Look up a section through the data source
pub fn lookup(ctx: &Context, provider: &Provider, type_name: &str, id: &str) -> Result<()> {
    let handler = provider.data_source(type_name)?;
    let session = connect(ctx)?;

    let response = handler.read(&session.client, id_document(id));
    report(ctx, &format!("{type_name} {id}"), &response)
}

#[derive(Serialize)]
struct ImportResult<'a> {
    id: &'a str,
    #[serde(flatten)]
    response: Response,
}

/// Import sections in parallel; each import is an independent read
pub fn import(
    ctx: &Context,
    provider: &Provider,
    type_name: &str,
    ids: &[String],
    jobs: usize,
) -> Result<()> {
    let handler = provider.resource(type_name)?;
    let session = connect(ctx)?;

    let pb = if ctx.quiet || ctx.json {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new(ids.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );
        pb
    };

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(jobs.max(1))
        .build()
        .context("Could not start import workers")?;

    let results: Vec<ImportResult<'_>> = pool.install(|| {
        ids.par_iter()
            .map(|id| {
                let response = handler.import(&session.client, id);
                pb.set_message(id.clone());
                pb.inc(1);
                ImportResult { id, response }
            })
            .collect()
    });
    pb.finish_and_clear();

    let failed = results.iter().filter(|r| !r.response.is_ok()).count();

    if ctx.json {
        ui::json(&results)?;
    } else {
        for result in &results {
            print_diagnostics(&result.response);
            if let Some(state) = &result.response.state {
                print_state(&format!("Imported {}", result.id), state);
            }
        }
        println!();
        if failed == 0 {
            ui::success(&format!("Imported {} section(s)", results.len()));
        } else {
            ui::warn(&format!(
                "Imported {}, {failed} failed",
                results.len() - failed
            ));
        }
    }

    if failed > 0 {
        bail!("{failed} import(s) failed");
    }
    Ok(())
}

// ============================================================================
// Model Input
// ============================================================================

fn id_document(id: &str) -> Json {
    let mut document = Map::new();
    document.insert("id".to_string(), Json::String(id.to_string()));
    Json::Object(document)
}

/// Build the planned model document from a JSON file or assignments.
fn build_model(schema: &ResourceSchema, input: &ModelInput, id: Option<&str>) -> Result<Json> {
    let mut document = match &input.file {
        Some(path) => read_model_file(path)?,
        None => Map::new(),
    };

    for assignment in &input.set {
        let (key, value) = parse_assignment(schema, assignment)?;
        document.insert(key, value);
    }

    if let Some(id) = id {
        document.insert("id".to_string(), Json::String(id.to_string()));
    }
    Ok(Json::Object(document))
}

fn read_model_file(path: &Path) -> Result<Map<String, Json>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Could not read {}", path.display()))?;
    match serde_json::from_str(&content)
        .with_context(|| format!("Invalid JSON in {}", path.display()))?
    {
        Json::Object(map) => Ok(map),
        _ => bail!("{} must contain a JSON object", path.display()),
    }
}

/// Parse `key=value` into a JSON attribute value according to the schema.
fn parse_assignment(schema: &ResourceSchema, assignment: &str) -> Result<(String, Json)> {
    let (key, raw) = assignment
        .split_once('=')
        .with_context(|| format!("Expected KEY=VALUE, got '{assignment}'"))?;
    let key = key.trim();

    let Some(spec) = schema.attributes.get(key) else {
        bail!(
            "Unknown attribute '{key}'. Attributes: {}",
            schema.attributes.keys().cloned().collect::<Vec<_>>().join(", ")
        );
    };
    if spec.computed {
        bail!("Attribute '{key}' is computed and cannot be set");
    }

    let value = match spec.kind {
        ValueKind::String => Json::String(raw.to_string()),
        ValueKind::Int64 => {
            let n: i64 = raw
                .trim()
                .parse()
                .with_context(|| format!("Attribute '{key}' expects an integer, got '{raw}'"))?;
            Json::from(n)
        }
        ValueKind::ListOfString => Json::Array(
            raw.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| Json::String(s.to_string()))
                .collect(),
        ),
    };
    Ok((key.to_string(), value))
}

// ============================================================================
// Output
// ============================================================================

fn report(ctx: &Context, title: &str, response: &Response) -> Result<()> {
    if ctx.json {
        ui::json(response)?;
    } else {
        print_diagnostics(response);
        if let Some(state) = &response.state {
            print_state(title, state);
        }
    }

    if !response.is_ok() {
        let errors = response
            .diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .count();
        bail!("{errors} error(s) reported");
    }
    Ok(())
}

fn print_diagnostics(response: &Response) {
    for diagnostic in &response.diagnostics {
        match diagnostic.severity {
            Severity::Error => ui::error(&diagnostic.to_string()),
            Severity::Warning => ui::warn(&diagnostic.to_string()),
        }
    }
}

fn print_state(title: &str, state: &Json) {
    ui::header(title);
    if let Some(id) = state.get("id") {
        ui::kv("id", &ui::format_value(id).cyan().to_string());
    }
    if let Some(fields) = state.as_object() {
        for (key, value) in fields.iter().filter(|(k, _)| k.as_str() != "id") {
            ui::kv(key, &ui::format_value(value));
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
