//! gtkdoc-rst CLI: translate gtk-doc markup to reStructuredText

use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use gtkdoc_rst::gir::{Entry, MemberKind};
use gtkdoc_rst::{Options, Registry, RegistryCache, SymbolResolver, Unresolved, translate_with_options};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "gtkdoc-rst")]
#[command(version)]
#[command(about = "Translate gtk-doc API documentation into reStructuredText", long_about = None)]
struct Cli {
    /// Log resolution misses and registry loads to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Directory to search for .gir files (repeatable; replaces XDG_DATA_DIRS)
    #[arg(long = "gir-dir", global = true)]
    gir_dirs: Vec<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Translate a file (or stdin) to stdout
    Convert {
        /// Input file; `-` or nothing reads stdin
        file: Option<PathBuf>,

        /// Resolve references against this namespace, e.g. Gtk-4.0
        #[arg(long, value_parser = parse_gir_spec, conflicts_with = "gir_file")]
        gir: Option<(String, String)>,

        /// Resolve references against this .gir file
        #[arg(long)]
        gir_file: Option<PathBuf>,

        /// Namespace for unqualified cross-references
        #[arg(long)]
        namespace: Option<String>,

        /// Prefix for relative image paths
        #[arg(long, default_value = "")]
        image_base_url: String,
    },

    /// Print the translated documentation of a registry entry
    Doc {
        /// Namespace and version, e.g. Gtk-4.0
        #[arg(value_parser = parse_gir_spec)]
        gir: (String, String),

        /// Entry name, e.g. Widget or init
        symbol: String,

        /// Look the symbol up as a member, e.g. method:Widget
        #[arg(long, value_parser = parse_member_spec)]
        member: Option<(MemberKind, String)>,

        /// Prefix for relative image paths
        #[arg(long, default_value = "")]
        image_base_url: String,
    },
}

/// Parse `Name-Version`.
fn parse_gir_spec(spec: &str) -> std::result::Result<(String, String), String> {
    match spec.rsplit_once('-') {
        Some((namespace, version)) if !namespace.is_empty() && !version.is_empty() => {
            Ok((namespace.to_string(), version.to_string()))
        }
        _ => Err(format!("expected NAMESPACE-VERSION, got '{spec}'")),
    }
}

/// Parse `kind:Class`.
fn parse_member_spec(spec: &str) -> std::result::Result<(MemberKind, String), String> {
    let (kind, class) = spec
        .rsplit_once(':')
        .filter(|(_, class)| !class.is_empty())
        .ok_or_else(|| format!("expected KIND:CLASS, got '{spec}'"))?;
    Ok((kind.parse()?, class.to_string()))
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(io::stderr)
        .init();
}

fn read_input(file: Option<&PathBuf>) -> Result<String> {
    match file {
        Some(path) if path.as_os_str() != "-" => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read '{}'", path.display())),
        _ => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf).context("failed to read stdin")?;
            Ok(buf)
        }
    }
}

/// Write a directive with an optional indented body.
fn write_directive(out: &mut String, name: &str, argument: &str, body: &str) {
    out.push_str("\n\n.. ");
    out.push_str(name);
    out.push_str("::");
    if !argument.is_empty() {
        out.push(' ');
        out.push_str(argument);
    }
    if !body.is_empty() {
        out.push('\n');
        for line in body.lines() {
            out.push('\n');
            if !line.is_empty() {
                out.push_str("   ");
                out.push_str(line);
            }
        }
    }
}

/// Translate an entry's documentation, parameters and markers.
fn render_entry(entry: &Entry, registry: &Registry, options: &Options) -> String {
    let translate = |text: Option<&str>| translate_with_options(text, registry, options);
    let mut out = translate(entry.doc.as_deref());

    let mut fields = String::new();
    for param in &entry.parameters {
        if param.doc.is_some() {
            let doc = translate(param.doc.as_deref());
            fields.push_str(&format!("\n:param {}: {}", param.name, doc.replace('\n', "\n    ")));
        }
    }
    if entry.return_doc.is_some() {
        let doc = translate(entry.return_doc.as_deref());
        fields.push_str(&format!("\n:returns: {}", doc.replace('\n', "\n    ")));
    }
    if !fields.is_empty() {
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str(&fields);
    }

    if let Some(deprecation) = &entry.deprecated {
        let body = translate(deprecation.doc.as_deref());
        write_directive(&mut out, "deprecated", deprecation.version.as_deref().unwrap_or(""), &body);
    }
    if let Some(since) = &entry.since {
        write_directive(&mut out, "versionadded", since, "");
    }

    out.trim().to_string()
}

/// Load the registry at `path`, translating without cross-references when
/// it cannot be read.
fn file_resolver(path: &Path) -> Arc<dyn SymbolResolver + Send + Sync> {
    match Registry::from_file(path) {
        Ok(registry) => Arc::new(registry),
        Err(err) => {
            tracing::warn!(%err, "translating without cross-references");
            Arc::new(Unresolved)
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let cache = if cli.gir_dirs.is_empty() {
        RegistryCache::new()
    } else {
        RegistryCache::with_search_dirs(cli.gir_dirs)
    };

    let output = match cli.command {
        Commands::Convert {
            file,
            gir,
            gir_file,
            namespace,
            image_base_url,
        } => {
            let input = read_input(file.as_ref())?;
            let resolver: Arc<dyn SymbolResolver + Send + Sync> = match (gir, gir_file) {
                (Some((namespace, version)), _) => cache.resolver(&namespace, &version),
                (None, Some(path)) => file_resolver(&path),
                (None, None) => Arc::new(Unresolved),
            };
            let options = Options {
                default_namespace: namespace,
                image_base_url,
                ..Options::default()
            };
            translate_with_options(input.as_str(), &*resolver, &options)
        }
        Commands::Doc {
            gir: (namespace, version),
            symbol,
            member,
            image_base_url,
        } => {
            let registry = cache.load(&namespace, &version)?;
            let entry = match &member {
                Some((kind, class)) => registry.member(*kind, class, &symbol),
                None => registry.entry(&symbol),
            };
            let Some(entry) = entry else {
                match member {
                    Some((kind, class)) => {
                        bail!("no {kind} '{symbol}' on '{class}' in {namespace}-{version}")
                    }
                    None => bail!("no entry '{symbol}' in {namespace}-{version}"),
                }
            };
            let options = Options {
                image_base_url,
                ..Options::default()
            };
            render_entry(entry, &registry, &options)
        }
    };

    let mut stdout = io::stdout().lock();
    stdout.write_all(output.as_bytes())?;
    if !output.is_empty() {
        stdout.write_all(b"\n")?;
    }
    Ok(())
}
