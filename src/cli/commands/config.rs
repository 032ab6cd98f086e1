//! taskctx config - Show the effective configuration

use clap::Args;

use crate::app::AppContext;
use crate::cli::output::{self, OutputFormat};
use crate::config::Config;
use crate::error::{CtxError, Result};

#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Dotted key to show (e.g. `selection.lambda`); omit for everything
    pub key: Option<String>,
}

pub fn run(ctx: &AppContext, args: &ConfigArgs) -> Result<()> {
    match &args.key {
        Some(key) => get_key(ctx, key),
        None => emit_config(ctx),
    }
}

fn emit_config(ctx: &AppContext) -> Result<()> {
    if ctx.output_format.is_machine_readable() {
        return output::emit_json(&ctx.config);
    }

    let rendered = toml::to_string_pretty(&ctx.config)
        .map_err(|err| CtxError::Config(format!("render config: {err}")))?;
    println!("{}", rendered.trim_end());
    Ok(())
}

fn get_key(ctx: &AppContext, key: &str) -> Result<()> {
    let value = config_value_at(&ctx.config, key)?;
    if ctx.output_format == OutputFormat::Json {
        return output::emit_json(&value);
    }
    println!("{}", format_value(&value));
    Ok(())
}

fn config_value_at(config: &Config, key: &str) -> Result<toml::Value> {
    let doc = toml::Value::try_from(config)
        .map_err(|err| CtxError::Config(format!("serialize config: {err}")))?;
    get_path(&doc, key)
}

fn get_path(doc: &toml::Value, key: &str) -> Result<toml::Value> {
    let mut current = doc;
    for part in key.split('.') {
        current = current
            .get(part)
            .ok_or_else(|| CtxError::Config(format!("unknown key: {key}")))?;
    }
    Ok(current.clone())
}

fn format_value(value: &toml::Value) -> String {
    match value {
        toml::Value::String(s) => s.clone(),
        _ => value.to_string(),
    }
}
