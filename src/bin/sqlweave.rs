//! sqlweave — compile record schemas into dialect SQL
//!
//! # Usage
//!
//! ```bash
//! # Show the SELECT for a record schema
//! sqlweave --schema activity.toml select --where Id=3
//!
//! # Same statement for MySQL
//! sqlweave --schema activity.toml --dialect mysql select --where Id=3
//!
//! # Run it
//! sqlweave --schema activity.toml --execute select --where Id=3
//! ```

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use sqlweave::config::Config;
use sqlweave::driver::SqlxConnection;
use sqlweave::executor::{self, Command};
use sqlweave::prelude::*;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sqlweave")]
#[command(version)]
#[command(about = "Compile record schemas into dialect-specific SQL", long_about = None)]
#[command(after_help = "EXAMPLES:
    sqlweave --schema activity.toml describe
    sqlweave --schema activity.toml select --where Id=3 --inline
    sqlweave --schema activity.toml --dialect mysql insert --identity Id
    sqlweave --schema activity.toml update --set Level=4 --where Id=3")]
struct Cli {
    /// Record schema file (TOML)
    #[arg(short, long, global = true)]
    schema: Option<PathBuf>,

    /// SQL dialect (mssql, mysql, oracle, default)
    #[arg(short, long, global = true)]
    dialect: Option<Dialect>,

    /// Database connection URL
    #[arg(long, global = true, env = "SQLWEAVE_DATABASE_URL")]
    database_url: Option<String>,

    /// Run the statement instead of printing it
    #[arg(short, long, global = true)]
    execute: bool,

    /// Output format for query results
    #[arg(short, long, value_enum, default_value = "table", global = true)]
    format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the persisted fields of a schema
    Describe,
    /// Build a SELECT
    Select {
        /// Filter as FIELD=VALUE (repeatable)
        #[arg(short = 'w', long = "where", value_parser = parse_pair)]
        filter: Vec<(String, Value)>,
        /// Render filters as inline literals instead of parameters
        #[arg(long)]
        inline: bool,
    },
    /// Build an INSERT
    Insert {
        /// Identity field, left out of the column list and read back
        #[arg(long)]
        identity: Option<String>,
        /// Record value as FIELD=VALUE (repeatable)
        #[arg(long = "value", value_parser = parse_pair)]
        values: Vec<(String, Value)>,
        /// Pre-seeded parameter as FIELD=VALUE, removed from the column list
        #[arg(long, value_parser = parse_pair)]
        preset: Vec<(String, Value)>,
    },
    /// Build an UPDATE (every row unless --where is given)
    Update {
        /// SET field as FIELD=VALUE; all fields when omitted
        #[arg(long, value_parser = parse_pair)]
        set: Vec<(String, Value)>,
        /// Record value for the all-fields form as FIELD=VALUE
        #[arg(long = "value", value_parser = parse_pair)]
        values: Vec<(String, Value)>,
        /// Filter as FIELD=VALUE (repeatable)
        #[arg(short = 'w', long = "where", value_parser = parse_pair)]
        filter: Vec<(String, Value)>,
    },
    /// Build a DELETE
    Delete {
        /// Filter as FIELD=VALUE (repeatable)
        #[arg(short = 'w', long = "where", value_parser = parse_pair, required = true)]
        filter: Vec<(String, Value)>,
    },
    /// List dialects and their naming rules
    Dialects,
}

fn parse_pair(input: &str) -> Result<(String, Value), String> {
    let (field, value) = input
        .split_once('=')
        .ok_or_else(|| format!("expected FIELD=VALUE, got '{input}'"))?;
    if field.is_empty() {
        return Err(format!("missing field name in '{input}'"));
    }
    Ok((field.to_string(), Value::parse_loose(value)))
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(&cli) {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "sqlweave=debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)))
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    if let Commands::Dialects = cli.command {
        show_dialects();
        return Ok(());
    }

    let mut config = Config::load().context("Failed to load configuration")?;
    if let Some(url) = &cli.database_url {
        config.database.url = Some(url.clone());
    }
    if let Some(dialect) = cli.dialect {
        config.database.dialect = Some(dialect);
    }

    let Some(path) = &cli.schema else {
        bail!("No schema given. Use --schema <FILE>");
    };
    let schema = EntitySchema::load(path)
        .with_context(|| format!("Failed to read schema {}", path.display()))?;
    let desc = EntityDescriptor::from_schema(&schema);
    let compiler = SqlCompiler::new(config.dialect());

    if cli.verbose {
        println!("{} {}", "Dialect:".dimmed(), compiler.dialect().to_string().cyan());
    }

    let (stmt, returns_rows) = match &cli.command {
        Commands::Describe => {
            describe_schema(&schema, &desc);
            return Ok(());
        }
        Commands::Select { filter, inline } => {
            let stmt = if *inline {
                compiler.select_where_inline(&desc, &filter.iter().cloned().collect())
            } else {
                compiler.select_where(&desc, &filter.iter().cloned().collect())
            };
            (stmt, true)
        }
        Commands::Insert {
            identity,
            values,
            preset,
        } => {
            let identity = identity.as_deref().or(config.compiler.identity.as_deref());
            let preset: Parameters = preset.iter().cloned().collect();
            let explicit = (!preset.is_empty()).then_some(&preset);
            let mut stmt = compiler.insert(&desc, identity, explicit);
            for column in desc.columns() {
                if Some(column) == identity || preset.contains(column) {
                    continue;
                }
                stmt.bind(compiler.profile().param_name(column), lookup(values, column));
            }
            let reads_back = identity.is_some() && compiler.profile().identity.function().is_some();
            (stmt, reads_back)
        }
        Commands::Update { set, values, filter } => {
            let set: Parameters = set.iter().cloned().collect();
            let filter: Parameters = filter.iter().cloned().collect();
            let mut stmt = compiler.update(
                &desc,
                (!set.is_empty()).then_some(&set),
                (!filter.is_empty()).then_some(&filter),
            );
            if set.is_empty() {
                for column in desc.columns() {
                    stmt.bind(compiler.profile().param_name(column), lookup(values, column));
                }
            }
            (stmt, false)
        }
        Commands::Delete { filter } => {
            let filter: Parameters = filter.iter().cloned().collect();
            (compiler.delete(&desc, &filter), false)
        }
        Commands::Dialects => unreachable!(), // Handled above
    };

    if !cli.execute {
        print_statement(&stmt);
        if config.database.url.is_none() && cli.verbose {
            println!();
            println!(
                "{}",
                "⚠ No database URL. Use --database-url or set SQLWEAVE_DATABASE_URL".yellow()
            );
        }
        return Ok(());
    }

    let Some(url) = config.database.url.as_deref() else {
        bail!("--execute needs a database URL. Use --database-url or set SQLWEAVE_DATABASE_URL");
    };
    if cli.verbose {
        println!("{} {}", "Connecting to:".dimmed(), url);
    }

    let mut conn = SqlxConnection::new(url)?;
    let command = Command::text(stmt);
    if returns_rows {
        let rows = executor::query(&mut conn, &command)?;
        format_output(&rows, &cli.format);
    } else {
        let affected = executor::execute(&mut conn, &command)?;
        println!("{} {} rows affected", "✓".green(), affected);
    }
    conn.close()?;

    Ok(())
}

fn lookup(values: &[(String, Value)], field: &str) -> Value {
    values
        .iter()
        .find(|(name, _)| name == field)
        .map_or(Value::Null, |(_, value)| value.clone())
}

fn print_statement(stmt: &Statement) {
    println!("{}", "Generated SQL:".green().bold());
    println!("{}", stmt.sql.white());

    if !stmt.params.is_empty() {
        println!();
        println!("{}", "Bindings:".cyan());
        for param in &stmt.params {
            println!("  {} = {}", param.name, param.value.to_string().yellow());
        }
    }
}

fn describe_schema(schema: &EntitySchema, desc: &EntityDescriptor) {
    println!("{} {}", "Table:".dimmed(), desc.table().white().bold());
    println!();
    println!(
        "{:4} {:20} {:18} {}",
        "#".white().bold(),
        "Field".white().bold(),
        "Kind".white().bold(),
        "Note".white().bold()
    );
    println!("{}", "─".repeat(60).dimmed());

    for (ordinal, member) in schema.members.iter().enumerate() {
        match desc.fields().iter().find(|f| f.ordinal == ordinal) {
            Some(field) => {
                let note = if field.ignored { "ignored" } else { "" };
                println!(
                    "{:4} {:20} {:18} {}",
                    ordinal,
                    field.name.cyan(),
                    format!("{:?}", field.kind),
                    note.dimmed()
                );
            }
            None => println!(
                "{:4} {:20} {:18} {}",
                ordinal,
                member.name.dimmed(),
                format!("{:?}", member.kind).dimmed(),
                "skipped".yellow()
            ),
        }
    }
}

fn format_output(rows: &[Row], format: &OutputFormat) {
    if rows.is_empty() {
        println!("{}", "(no results)".dimmed());
        return;
    }

    match format {
        OutputFormat::Json => {
            let maps: Vec<BTreeMap<&str, serde_json::Value>> = rows
                .iter()
                .map(|row| row.columns().map(|(k, v)| (k, to_json(v))).collect())
                .collect();
            println!("{}", serde_json::to_string_pretty(&maps).unwrap_or_default());
        }
        OutputFormat::Table => {
            let columns: Vec<&str> = rows[0].columns().map(|(name, _)| name).collect();

            // Calculate column widths
            let mut widths: Vec<usize> = columns.iter().map(|c| c.len()).collect();
            for row in rows {
                for (i, (_, value)) in row.columns().enumerate() {
                    if let Some(w) = widths.get_mut(i) {
                        *w = (*w).max(value.to_string().len());
                    }
                }
            }

            let header: Vec<String> = columns
                .iter()
                .zip(&widths)
                .map(|(c, w)| format!("{c:width$}", width = *w))
                .collect();
            println!("{}", header.join(" │ ").white().bold());

            let sep: Vec<String> = widths.iter().map(|w| "─".repeat(*w)).collect();
            println!("{}", sep.join("─┼─").dimmed());

            for row in rows {
                let cells: Vec<String> = row
                    .columns()
                    .zip(&widths)
                    .map(|((_, v), w)| format!("{:width$}", v.to_string(), width = *w))
                    .collect();
                println!("{}", cells.join(" │ "));
            }

            println!();
            println!("{} row(s) returned", rows.len().to_string().cyan());
        }
    }
}

fn to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::Int(n) | Value::Enum(n) => serde_json::Value::from(*n),
        Value::UInt(n) => serde_json::Value::from(*n),
        Value::Float(f) => serde_json::Value::from(*f),
        other => serde_json::Value::String(other.to_string()),
    }
}

fn show_dialects() {
    println!("{}", "Dialect Reference".cyan().bold());
    println!();
    println!(
        "{:10} {:8} {:12} {}",
        "Dialect".white().bold(),
        "Marker".white().bold(),
        "Where name".white().bold(),
        "Identity read-back".white().bold()
    );
    println!("{}", "─".repeat(60).dimmed());

    for dialect in Dialect::ALL {
        let profile = dialect.profile();
        println!(
            "{:10} {:8} {:12} {}",
            dialect.to_string().cyan().bold(),
            profile.marker.to_string().yellow(),
            profile.where_param_name("Field"),
            profile.identity.function().unwrap_or("none").dimmed()
        );
    }
}
