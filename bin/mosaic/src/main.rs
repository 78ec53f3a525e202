//! Mosaic command line.
//!
//! Loads every `*.kdl` declaration file from a directory on top of the admin
//! built-ins, then inspects, renders or lists the composed components.

use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use mosaic_registry::{CompositionContext, load_declarations_from_dir};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "mosaic")]
#[command(about = "Inspect and render composed components")]
struct Args {
	/// Verbose logging
	#[arg(short, long, global = true)]
	verbose: bool,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Print the materialized component as JSON
	Inspect {
		/// Directory of declaration files
		#[arg(value_name = "DIR")]
		dir: PathBuf,
		/// Component name
		name: String,
	},
	/// Print the merged template with block tags stripped
	Render {
		#[arg(value_name = "DIR")]
		dir: PathBuf,
		name: String,
	},
	/// List registered component names
	List {
		#[arg(value_name = "DIR")]
		dir: PathBuf,
	},
}

fn main() -> anyhow::Result<()> {
	let args = Args::parse();
	setup_tracing(args.verbose);

	match args.command {
		Command::Inspect { dir, name } => {
			let mut ctx = load_context(&dir)?;
			let component = ctx
				.materialize(&name)
				.with_context(|| format!("materializing '{name}'"))?;
			println!("{}", serde_json::to_string_pretty(&component.summary())?);
		}
		Command::Render { dir, name } => {
			let mut ctx = load_context(&dir)?;
			let component = ctx
				.materialize(&name)
				.with_context(|| format!("materializing '{name}'"))?;
			match component.template() {
				Some(template) => println!("{}", template.render()),
				None => bail!("component '{name}' has no template"),
			}
		}
		Command::List { dir } => {
			let ctx = load_context(&dir)?;
			for name in ctx.component_names() {
				println!("{name}");
			}
		}
	}

	Ok(())
}

fn load_context(dir: &Path) -> anyhow::Result<CompositionContext> {
	let mut ctx = CompositionContext::new();
	mosaic_admin::register_builtins(&mut ctx).context("registering built-in components")?;

	let report = load_declarations_from_dir(dir, &mosaic_admin::handlers());
	if !report.errors.is_empty() {
		for (path, error) in &report.errors {
			eprintln!("{}: {error}", path.display());
		}
		bail!("{} declaration file(s) failed to load", report.errors.len());
	}

	report
		.declarations
		.apply(&mut ctx)
		.with_context(|| format!("applying declarations from {}", dir.display()))?;
	info!(
		dir = %dir.display(),
		declarations = report.declarations.len(),
		"Loaded declarations"
	);
	Ok(ctx)
}

fn setup_tracing(verbose: bool) {
	use tracing_subscriber::EnvFilter;

	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
		if verbose {
			EnvFilter::new("mosaic=debug,mosaic_registry=debug,mosaic_admin=debug,info")
		} else {
			EnvFilter::new("warn")
		}
	});

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.init();
}
