//! `aion lint` — static analysis pipeline.
//!
//! Discovers source files, parses them, elaborates to IR, runs lint rules,
//! and renders diagnostics to the terminal. The full pipeline:
//!
//! 1. Find project root (walk up looking for `aion.toml`)
//! 2. Load config via `aion_config`
//! 3. Discover `.v`, `.sv`, `.vhd`, `.vhdl` files in `src/`
//! 4. Parse each file with the appropriate parser
//! 5. Elaborate into unified IR
//! 6. Run lint engine
//! 7. Render diagnostics

use aion_config::{LintConfig, ProjectConfig};
use aion_diagnostics::{DiagnosticRenderer, DiagnosticSink, Severity, TerminalRenderer};
use aion_lint::LintEngine;

use crate::pipeline::{discover_source_files, parse_all_files, resolve_project_root};
use crate::{GlobalArgs, LintArgs, ReportFormat};

/// Runs the `aion lint` command.
///
/// Discovers source files, parses, elaborates, lints, and renders diagnostics.
/// Returns exit code 0 if no errors, 1 if there are errors.
pub fn run(args: &LintArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    // Step 1: Find project root
    let project_dir = resolve_project_root(global)?;

    // Step 2: Load config
    let config = aion_config::load_config(&project_dir)?;

    if !global.quiet {
        eprintln!(
            "   Checking {} v{}",
            config.project.name, config.project.version
        );
    }

    // Step 3: Discover source files
    let src_dir = project_dir.join("src");
    let source_files = if src_dir.is_dir() {
        discover_source_files(&src_dir)?
    } else {
        Vec::new()
    };

    if source_files.is_empty() {
        if !global.quiet {
            eprintln!(
                "warning: no HDL source files found in {}",
                src_dir.display()
            );
        }
        return Ok(0);
    }

    // Step 4: Load and parse source files
    let mut source_db = aion_source::SourceDb::new();
    let interner = aion_common::Interner::new();
    let sink = DiagnosticSink::new();

    let parsed = parse_all_files(&source_files, &mut source_db, &interner, &sink)?;

    // Step 5: Elaborate
    let design = aion_elaborate::elaborate(&parsed, &config, &source_db, &interner, &sink)?;

    // Step 6: Merge CLI args with config lint section and run lint
    let merged_config = merge_lint_config(&config, args);
    let engine = LintEngine::new(&merged_config);
    engine.run(&design, &sink);

    // Step 7: Render diagnostics
    let diagnostics = sink.diagnostics();

    match args.format {
        ReportFormat::Text => {
            let renderer = TerminalRenderer::new(global.color, 80);
            for diag in &diagnostics {
                eprintln!("{}", renderer.render(diag, &source_db));
            }
        }
        ReportFormat::Json => {
            let json =
                serde_json::to_string_pretty(&diagnostics).unwrap_or_else(|_| "[]".to_string());
            println!("{json}");
        }
    }

    // Summary
    let error_count = diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Error)
        .count();
    let warning_count = diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Warning)
        .count();

    if !global.quiet && args.format == ReportFormat::Text {
        eprintln!(
            "   Result: {} error(s), {} warning(s)",
            error_count, warning_count
        );
    }

    if sink.has_errors() {
        Ok(1)
    } else {
        Ok(0)
    }
}

/// Merges CLI `--allow`/`--deny` flags with the config file's lint section.
///
/// CLI flags take precedence: if a rule appears in both CLI `--allow` and
/// config `deny`, the CLI `--allow` wins.
fn merge_lint_config(config: &ProjectConfig, args: &LintArgs) -> LintConfig {
    let mut deny: Vec<String> = config.lint.deny.clone();
    let mut allow: Vec<String> = config.lint.allow.clone();
    let warn: Vec<String> = config.lint.warn.clone();

    // CLI args override config: remove from opposite list
    for rule in &args.deny {
        allow.retain(|r| r != rule);
        if !deny.contains(rule) {
            deny.push(rule.clone());
        }
    }
    for rule in &args.allow {
        deny.retain(|r| r != rule);
        if !allow.contains(rule) {
            allow.push(rule.clone());
        }
    }

    LintConfig {
        deny,
        allow,
        warn,
        naming: config
            .lint
            .naming
            .as_ref()
            .map(|n| aion_config::NamingConfig {
                module: n.module.as_ref().map(clone_naming_convention),
                signal: n.signal.as_ref().map(clone_naming_convention),
                parameter: n.parameter.as_ref().map(clone_naming_convention),
                constant: n.constant.as_ref().map(clone_naming_convention),
            }),
    }
}

/// Clones a `NamingConvention` value (since it doesn't derive Clone).
fn clone_naming_convention(nc: &aion_config::NamingConvention) -> aion_config::NamingConvention {
    match nc {
        aion_config::NamingConvention::SnakeCase => aion_config::NamingConvention::SnakeCase,
        aion_config::NamingConvention::CamelCase => aion_config::NamingConvention::CamelCase,
        aion_config::NamingConvention::UpperSnakeCase => {
            aion_config::NamingConvention::UpperSnakeCase
        }
        aion_config::NamingConvention::PascalCase => aion_config::NamingConvention::PascalCase,
    }
}
