use anyhow::{Context, Result, anyhow};
use log::info;

use crate::{
    cli::{SchemaArgs, SchemaCheckArgs, SchemaCommand, SchemaShowArgs},
    schema::{DEFAULT_PRESET, Schema},
    table,
};

pub fn execute(args: &SchemaArgs) -> Result<()> {
    match &args.command {
        SchemaCommand::List => list_presets(),
        SchemaCommand::Show(show) => show_preset(show),
        SchemaCommand::Check(check) => check_schema(check),
    }
}

fn list_presets() -> Result<()> {
    let headers = vec![
        "preset".to_string(),
        "columns".to_string(),
        "policy".to_string(),
        "total_units".to_string(),
    ];
    let rows = preset_rows()?;
    print!("{}", table::render_table(&headers, &rows));
    Ok(())
}

fn preset_rows() -> Result<Vec<Vec<String>>> {
    Schema::preset_names()
        .iter()
        .map(|name| {
            let schema = Schema::preset(name).ok_or_else(|| anyhow!("Missing preset '{name}'"))?;
            let label = if *name == DEFAULT_PRESET {
                format!("{name} (default)")
            } else {
                name.to_string()
            };
            Ok(vec![
                label,
                schema.source_names().join(", "),
                schema.column_policy.to_string(),
                schema.derivation.describe(),
            ])
        })
        .collect()
}

fn show_preset(args: &SchemaShowArgs) -> Result<()> {
    let schema = Schema::preset(&args.preset).ok_or_else(|| {
        anyhow!(
            "Unknown preset '{}'. Available presets: {}",
            args.preset,
            Schema::preset_names().join(", ")
        )
    })?;
    match &args.output {
        Some(path) => {
            schema
                .save(path)
                .with_context(|| format!("Writing schema to {path:?}"))?;
            info!("Preset '{}' written to {:?}", args.preset, path);
        }
        None => print!("{}", schema.to_yaml_string()?),
    }
    Ok(())
}

fn check_schema(args: &SchemaCheckArgs) -> Result<()> {
    let schema = Schema::load(&args.schema)?;
    println!(
        "Schema {:?} is valid: {} column(s), required [{}], {}",
        args.schema,
        schema.expected_columns(),
        schema
            .required
            .iter()
            .map(|f| f.to_string())
            .collect::<Vec<_>>()
            .join(", "),
        schema.derivation.describe()
    );
    Ok(())
}
