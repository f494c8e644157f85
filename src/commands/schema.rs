use anyhow::Result;
use colored::Colorize;
use std::collections::BTreeMap;

use crate::Context;
use crate::provider::Provider;
use crate::ui;
use binding::{AttributeSchema, ResourceSchema};

/// List the supported resource types
pub fn list_types(ctx: &Context, provider: &Provider) -> Result<()> {
    if ctx.json {
        return ui::json(&provider.type_names().collect::<Vec<_>>());
    }

    ui::header("Resource types");
    for name in provider.type_names() {
        let description = provider.resource(name)?.schema().description;
        ui::kv(name, &description);
    }
    Ok(())
}

/// Show the schema of one type, or of every type
pub fn show(
    ctx: &Context,
    provider: &Provider,
    type_name: Option<&str>,
    data_source: bool,
) -> Result<()> {
    let names: Vec<&str> = match type_name {
        Some(name) => vec![name],
        None => provider.type_names().collect(),
    };

    let mut schemas = BTreeMap::new();
    for name in names {
        let schema = if data_source {
            provider.data_source(name)?.schema()
        } else {
            provider.resource(name)?.schema()
        };
        schemas.insert(name, schema);
    }

    if ctx.json {
        return ui::json(&schemas);
    }

    for (name, schema) in &schemas {
        print_schema(name, schema);
    }
    Ok(())
}

fn print_schema(name: &str, schema: &ResourceSchema) {
    ui::header(name);
    ui::dim(&schema.description);
    println!();

    for (attribute, spec) in &schema.attributes {
        println!(
            "  {} {} {}",
            attribute.bold(),
            format!("({})", spec.kind).dimmed(),
            existence_label(spec)
        );
        println!("      {}", spec.description);
        for validator in &spec.validators {
            println!("      {} {}", "•".dimmed(), validator.dimmed());
        }
    }
}

fn existence_label(spec: &AttributeSchema) -> String {
    if spec.required {
        "required".yellow().to_string()
    } else if spec.computed {
        "computed".cyan().to_string()
    } else {
        "optional".green().to_string()
    }
}
