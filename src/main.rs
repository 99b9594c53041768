//! Access control schema resolver
//!
//! Command line front end: validates a schema and answers resolution queries.

use access_schema::{
    access_control::{AccessControl, AccessControlProvider, AccessResolver},
    config::{LogFormat, LoggingConfig, SchemaDocument, load_config_with_schema, load_resolver},
};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::collections::HashSet;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Access control schema resolver - validate schemas and resolve permission groups
#[derive(Parser, Debug)]
#[command(name = "access-schema")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, env = "ACCESS_SCHEMA_CONFIG")]
    config: Option<String>,

    /// Path to the schema document (overrides schema.path)
    #[arg(short, long, env = "ACCESS_SCHEMA_FILE")]
    schema: Option<String>,

    /// Log level (trace, debug, info, warn, error); defaults to logging.level
    #[arg(long, env = "ACCESS_SCHEMA_LOG_LEVEL")]
    log_level: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    output: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate the schema and print a summary
    Check,

    /// Print the identifiers granted by one or more groups or permissions
    Resolve {
        /// Group or permission ids (a principal's roles)
        #[arg(required = true)]
        ids: Vec<String>,

        /// Leave out the ids of traversed groups
        #[arg(long)]
        permissions_only: bool,
    },

    /// Show what an identifier is bound to
    Lookup {
        /// Group or permission id
        id: String,
    },

    /// Print the schema as a TOML document
    Export,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Serialize)]
struct Summary {
    groups: usize,
    permissions: usize,
    top_level: usize,
}

#[derive(Serialize)]
struct Resolution {
    ids: Vec<String>,
    unknown: Vec<String>,
}

#[derive(Serialize)]
struct Lookup<'a> {
    id: &'a str,
    kind: &'static str,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    group_type: Option<&'a str>,
    permissions: Vec<&'a str>,
    inherits: Vec<&'a str>,
}

fn init_logging(config: &LoggingConfig, level_override: Option<&str>) {
    let level = level_override.unwrap_or(&config.level);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let registry = tracing_subscriber::registry().with(filter);
    match config.format {
        LogFormat::Pretty => registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
    }
}

fn emit<T: Serialize>(
    output: OutputFormat,
    value: &T,
    text: impl FnOnce() -> String,
) -> anyhow::Result<()> {
    match output {
        OutputFormat::Text => println!("{}", text()),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
    }
    Ok(())
}

fn run(command: Command, output: OutputFormat, resolver: &AccessResolver) -> anyhow::Result<()> {
    match command {
        Command::Check => {
            let (groups, permissions) = resolver.counts();
            let summary = Summary {
                groups,
                permissions,
                top_level: resolver.schema().top_level().len(),
            };
            emit(output, &summary, || {
                format!(
                    "Schema OK: {} groups ({} top-level), {} permissions",
                    summary.groups, summary.top_level, summary.permissions
                )
            })
        }
        Command::Resolve {
            ids,
            permissions_only,
        } => {
            let mut granted = HashSet::new();
            let unknown = resolver.collect_principal_ids(&ids, &mut granted);
            for id in &unknown {
                warn!(id = %id, "Unknown access control id, treated as a flat permission");
            }
            if permissions_only {
                granted.retain(|id| {
                    !matches!(resolver.get_access_control(id), Some(AccessControl::Group(_)))
                });
            }

            let mut ids: Vec<String> = granted.into_iter().collect();
            ids.sort();
            let resolution = Resolution { ids, unknown };
            emit(output, &resolution, || resolution.ids.join("\n"))
        }
        Command::Lookup { id } => {
            let Some(node) = resolver.get_access_control(&id) else {
                anyhow::bail!("Unknown access control id '{}'", id);
            };

            let lookup = match node {
                AccessControl::Group(group) => Lookup {
                    id: group.id(),
                    kind: node.kind().as_str(),
                    group_type: group.group_type(),
                    permissions: group.permissions().iter().map(|p| p.id()).collect(),
                    inherits: group
                        .inherits()
                        .iter()
                        .filter_map(|handle| resolver.schema().group(*handle))
                        .map(|parent| parent.id())
                        .collect(),
                },
                AccessControl::Permission(permission) => Lookup {
                    id: permission.id(),
                    kind: node.kind().as_str(),
                    group_type: None,
                    permissions: Vec::new(),
                    inherits: Vec::new(),
                },
            };

            emit(output, &lookup, || {
                let mut text = format!("{} ({})", lookup.id, lookup.kind);
                if let Some(group_type) = lookup.group_type {
                    text.push_str(&format!("\n  type: {}", group_type));
                }
                if !lookup.inherits.is_empty() {
                    text.push_str(&format!("\n  inherits: {}", lookup.inherits.join(", ")));
                }
                if !lookup.permissions.is_empty() {
                    text.push_str(&format!("\n  permissions: {}", lookup.permissions.join(", ")));
                }
                text
            })
        }
        Command::Export => {
            let document = SchemaDocument::from_schema(resolver.schema());
            match output {
                OutputFormat::Text => print!("{}", document.to_toml()?),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&document)?),
            }
            Ok(())
        }
    }
}

fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Load configuration before logging so logging.format applies
    let config = load_config_with_schema(args.config.as_deref(), args.schema.as_deref());
    let logging = config
        .as_ref()
        .map(|config| config.logging.clone())
        .unwrap_or_default();
    init_logging(&logging, args.log_level.as_deref());

    let config = config.inspect_err(|e| error!(error = %e, "Failed to load configuration"))?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting access control schema resolver"
    );

    // Load and initialize the schema
    let resolver = load_resolver(&config.schema)
        .inspect_err(|e| error!(error = %e, "Failed to initialize access control schema"))?;

    run(args.command, args.output, &resolver)
}
