use std::path::PathBuf;

use clap::{AppSettings, Parser, Subcommand};
use indicatif::{ParallelProgressIterator, ProgressBar, ProgressDrawTarget, ProgressStyle};
use itertools::Itertools;
use log::{debug, info, warn};
use rayon::prelude::*;

use uvx_schema::{
    builtin, validate_container, Container, Error, NodeDescriptor, NodePath, SchemaDocument,
    SchemaRegistry, ValidationReport,
};

#[derive(Parser)]
#[clap(version, about)]
#[clap(global_setting(AppSettings::DeriveDisplayOrder))]
#[clap(disable_help_subcommand = true)]
#[clap(infer_long_args = true)]
struct Args {
    #[clap(subcommand)]
    command: Command,

    /// The verbosity of the program. Increase by specifying multiple times
    /// (e.g. -vv). The default is to print only high-level information.
    #[clap(short, long, parse(from_occurrences), global = true)]
    verbosity: u8,
}

#[derive(Subcommand)]
enum Command {
    /// Validate container structure manifests against a schema.
    Validate {
        /// A built-in schema name (uvx, cal), "auto" to pick a built-in
        /// schema per container, or the path to a schema file.
        schema: String,

        /// The container structure manifests (YAML) to validate.
        #[clap(required = true)]
        containers: Vec<PathBuf>,

        /// Disable progress bars.
        #[clap(long)]
        no_progress_bars: bool,
    },

    /// Print what a schema says about a node.
    Describe {
        /// A built-in schema name (uvx, cal) or the path to a schema file.
        schema: String,

        /// The node path, e.g. uvx/antennas/ecef.
        path: String,

        /// Decode this sample value with the node's time format (mjd or
        /// unix).
        #[clap(long, allow_hyphen_values = true)]
        decode: Option<f64>,
    },

    /// Print a schema's node hierarchy.
    Tree {
        /// A built-in schema name (uvx, cal) or the path to a schema file.
        schema: String,
    },
}

fn main() {
    let args = Args::parse();
    setup_logging(args.verbosity);

    match try_main(args.command) {
        Ok(true) => (),
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}

/// Returns whether everything that was checked is valid.
fn try_main(command: Command) -> Result<bool, Error> {
    match command {
        Command::Validate {
            schema,
            containers,
            no_progress_bars,
        } => validate(&schema, &containers, no_progress_bars),

        Command::Describe {
            schema,
            path,
            decode,
        } => {
            let doc = load_schema(&schema)?;
            describe(&doc, &path, decode)?;
            Ok(true)
        }

        Command::Tree { schema } => {
            let doc = load_schema(&schema)?;
            match (doc.class_name(), doc.version()) {
                (Some(c), Some(v)) => println!("{c} {v}"),
                (Some(c), None) => println!("{c}"),
                _ => (),
            }
            for top in doc.top_level() {
                print_tree(&doc, top, 0)?;
            }
            Ok(true)
        }
    }
}

enum SchemaChoice {
    Fixed(SchemaDocument),
    Detect(SchemaRegistry),
}

fn load_schema(schema: &str) -> Result<SchemaDocument, Error> {
    match builtin::by_name(schema) {
        Some(doc) => {
            debug!("Using built-in schema '{schema}'");
            Ok(doc.clone())
        }
        None => SchemaDocument::from_file(schema),
    }
}

fn validate(schema: &str, containers: &[PathBuf], no_progress_bars: bool) -> Result<bool, Error> {
    let choice = if schema == "auto" {
        SchemaChoice::Detect(builtin::registry())
    } else {
        let doc = load_schema(schema)?;
        info!(
            "Validating {} container(s) against {} {}",
            containers.len(),
            doc.class_name().unwrap_or(schema),
            doc.version().unwrap_or("")
        );
        SchemaChoice::Fixed(doc)
    };

    let progress = ProgressBar::with_draw_target(
        Some(containers.len() as _),
        if no_progress_bars {
            ProgressDrawTarget::hidden()
        } else {
            ProgressDrawTarget::stdout()
        },
    )
    .with_style(
        ProgressStyle::default_bar()
            .template("{msg:17}: [{wide_bar:.blue}] {pos:2}/{len:2} containers ({elapsed_precise}<{eta_precise})")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> "),
    )
    .with_message("Validating");

    let results: Vec<Result<ValidationReport, Error>> = containers
        .par_iter()
        .progress_with(progress.clone())
        .map(|file| {
            let container = Container::from_manifest_file(file)?;
            let report = match &choice {
                SchemaChoice::Fixed(doc) => validate_container(doc, &container),
                SchemaChoice::Detect(registry) => {
                    validate_container(registry.require(&container)?, &container)
                }
            };
            Ok(report)
        })
        .collect();
    progress.finish_and_clear();

    let mut all_valid = true;
    for (file, result) in containers.iter().zip(results) {
        match result {
            Ok(report) => {
                if !report.is_valid() {
                    all_valid = false;
                }
                print!("{}: {report}", file.display());
            }
            Err(e) => {
                all_valid = false;
                println!("{}: {e}", file.display());
            }
        }
    }
    if !all_valid {
        warn!("Not every container is valid");
    }
    Ok(all_valid)
}

fn describe(doc: &SchemaDocument, path: &str, decode: Option<f64>) -> Result<(), Error> {
    let descriptor = doc.describe(path)?;
    println!("{path}");
    println!("  hdf5_type:   {}", descriptor.hdf5_type());
    if let Some(d) = descriptor.description() {
        println!("  description: {d}");
    }

    match descriptor {
        NodeDescriptor::Root(root) => {
            if let Some(c) = &root.class_name {
                println!("  class_name:  {c}");
            }
            if let Some(v) = &root.version {
                println!("  version:     {v}");
            }
        }
        NodeDescriptor::Group(_) => (),
        NodeDescriptor::Dataset(dataset) => {
            if dataset.dims.is_empty() {
                println!("  dims:        (scalar)");
            } else {
                println!("  dims:        [{}]", dataset.dims.iter().join(", "));
            }
            if let Some(u) = &dataset.units {
                println!("  units:       {u}");
            }
            if let Some(f) = &dataset.format {
                println!("  format:      {f}");
            }
        }
    }

    let children = doc.list_children(path)?;
    if !children.is_empty() {
        println!("  children:    {}", children.iter().map(|c| c.name()).join(", "));
    }

    if let Some(value) = decode {
        match descriptor.format().and_then(|f| f.decode(value)) {
            Some(epoch) => println!("  {value} is {epoch}"),
            None => warn!("{path} doesn't have a time format; can't decode {value}"),
        }
    }
    Ok(())
}

fn print_tree(doc: &SchemaDocument, path: &NodePath, depth: usize) -> Result<(), Error> {
    let descriptor = doc.describe(path)?;
    let indent = "  ".repeat(depth);
    match descriptor {
        NodeDescriptor::Root(_) | NodeDescriptor::Group(_) => {
            println!("{indent}{}/ ({})", path.name(), descriptor.hdf5_type())
        }
        NodeDescriptor::Dataset(d) => {
            println!("{indent}{} [{}]", path.name(), d.dims.iter().join(", "))
        }
    }
    for child in doc.list_children(path)? {
        print_tree(doc, child, depth + 1)?;
    }
    Ok(())
}

fn setup_logging(verbosity: u8) {
    let mut builder = env_logger::Builder::from_default_env();
    builder.target(env_logger::Target::Stdout);
    builder.format_target(false);
    match verbosity {
        0 => builder.filter_level(log::LevelFilter::Info),
        1 => builder.filter_level(log::LevelFilter::Debug),
        2 => builder.filter_level(log::LevelFilter::Trace),
        _ => {
            builder.filter_level(log::LevelFilter::Trace);
            builder.format(|buf, record| {
                use std::io::Write;

                let timestamp = buf.timestamp();
                let level = record.level();
                let target = record.target();
                let line = record.line().unwrap_or(0);
                let message = record.args();

                writeln!(buf, "[{timestamp} {level} {target}:{line}] {message}")
            })
        }
    };
    builder.init();
}
