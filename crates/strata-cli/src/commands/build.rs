//! `strata build` command implementation.
//!
//! Runs the primary desktop pass and one secondary pass per additional
//! distinct device root, then writes the merged asset map to the output
//! directory.

use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;

use strata_core::bundler::{BuildInput, Bundler, VariantOrchestrator};
use strata_core::config::load_project_config;
use strata_core::roots::{RootOptions, RootRegistry};

/// Build command action.
#[derive(Debug, Clone)]
pub struct BuildAction {
    /// Working directory (project root).
    pub cwd: PathBuf,
    /// Entry document (overrides the config file).
    pub entry: Option<String>,
    /// Output directory (overrides the config file).
    pub out_dir: Option<PathBuf>,
    /// Device root overrides (override the config file).
    pub roots: RootOptions,
}

/// JSON output for the build command.
#[derive(Serialize)]
struct BuildResultJson {
    ok: bool,
    entry: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    out_dir: Option<String>,
    assets: Vec<String>,
    duration_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<BuildErrorJson>,
}

#[derive(Serialize)]
struct BuildErrorJson {
    code: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<String>,
}

/// Run the build command.
pub fn run(action: BuildAction, json: bool) -> Result<()> {
    let start = Instant::now();
    let cwd = dunce::canonicalize(&action.cwd).into_diagnostic()?;

    // Project config file first; CLI flags override its values.
    let project = match load_project_config(&cwd).into_diagnostic()? {
        Some((path, config)) => {
            if !json {
                let rel = path.strip_prefix(&cwd).unwrap_or(&path);
                println!("  Loaded config from {}", rel.display());
            }
            config
        }
        None => strata_core::ProjectConfig::default(),
    };

    let roots = project.roots.clone().merge(action.roots);
    let entry = action
        .entry
        .or(project.entry)
        .unwrap_or_else(|| "index.html".to_string());
    let out_dir = action
        .out_dir
        .or(project.out_dir.map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("dist"));
    let out_dir = if out_dir.is_absolute() {
        out_dir
    } else {
        cwd.join(out_dir)
    };

    let registry = RootRegistry::new(&roots).into_diagnostic()?;
    tracing::debug!(entry = %entry, roots = ?registry, "starting variant build");

    let host = Bundler::new();
    let orchestrator = VariantOrchestrator::new(&host, registry);
    let result = orchestrator.run(BuildInput::new(cwd.clone(), entry.clone()));

    let duration_ms = start.elapsed().as_millis() as u64;

    match result {
        Ok(assets) => {
            // Persist the merged map; the orchestrator itself never touches
            // disk.
            for (name, asset) in &assets {
                let path = out_dir.join(name);
                if let Some(parent) = path.parent() {
                    if !parent.exists() {
                        std::fs::create_dir_all(parent).into_diagnostic()?;
                    }
                }
                std::fs::write(&path, &asset.content).into_diagnostic()?;
            }

            if json {
                let json_result = BuildResultJson {
                    ok: true,
                    entry,
                    out_dir: Some(out_dir.display().to_string()),
                    assets: assets.keys().cloned().collect(),
                    duration_ms,
                    error: None,
                };
                println!(
                    "{}",
                    serde_json::to_string(&json_result).into_diagnostic()?
                );
            } else {
                println!(
                    "  {} -> {} ({} assets, {}ms)",
                    entry,
                    out_dir.display(),
                    assets.len(),
                    duration_ms
                );
                for (name, asset) in &assets {
                    let size_kb = asset.content.len() as f64 / 1024.0;
                    println!("    + {name} ({size_kb:.1}KB)");
                }
            }

            Ok(())
        }
        Err(e) => {
            // An incomplete device variant is not an acceptable release
            // artifact.
            if json {
                let json_result = BuildResultJson {
                    ok: false,
                    entry,
                    out_dir: None,
                    assets: Vec::new(),
                    duration_ms,
                    error: Some(BuildErrorJson {
                        code: e.code.to_string(),
                        message: e.message.clone(),
                        path: e.path.clone(),
                    }),
                };
                println!(
                    "{}",
                    serde_json::to_string(&json_result).unwrap_or_default()
                );
            } else {
                eprintln!("error: {e}");
                if let Some(path) = &e.path {
                    eprintln!("  at {path}");
                }
            }
            std::process::exit(1);
        }
    }
}
