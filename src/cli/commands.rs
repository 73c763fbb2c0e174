//! CLI command implementations
//!
//! All command functions return `CliResult<ExitCode>` instead of calling
//! `process::exit`. Error handling and exits happen in the top-level `run()`.

use std::collections::BTreeMap;
use std::path::Path;

use refine_core::{
    Analysis, Compilation, Diagnostic, GeneratorConfig, ModulePath, SourceUnit, WrapperDescriptor, analyze,
};
use serde_json::{Value, json};

use super::{CliError, CliResult, ExitCode, OutputFormat};
use crate::project::{self, DriverConfig, LoadedProject};
use crate::report;

// ============================================================================
// generate
// ============================================================================

/// Generate one unit per wrapper under `config.src_dir` into `config.out_dir`.
///
/// Failing candidates are reported and skipped; the remaining units are still written. Units of wrappers that no
/// longer exist are removed, but only on a run without failures. The exit code is a failure when any candidate or
/// file failed, or (in check mode) when any unit is stale or orphaned.
pub fn generate(config: &DriverConfig) -> CliResult<ExitCode> {
    let generator = GeneratorConfig::default();
    let project = project::load(config, &generator)?;
    let analysis = analyze(&project.compilation, &generator);
    let mut failed = report_analysis(&project, &analysis);

    let descriptors: Vec<WrapperDescriptor> = analysis.descriptors().cloned().collect();
    let units = project::render_all(&descriptors, &generator, config.jobs)?;

    let mut ready = Vec::new();
    for unit in &units {
        match &unit.result {
            Ok(text) => ready.push((unit.file_name.as_str(), text.as_str())),
            Err(err) => {
                report::emit(&Diagnostic::error(err, None), &project.sources);
                failed = true;
            }
        }
    }

    let summary = project::write_units(&config.out_dir, ready.iter().copied(), config.check)?;
    let current: Vec<_> = ready.iter().map(|(file_name, _)| config.out_dir.join(file_name)).collect();
    let orphans = project::find_orphans(&config.out_dir, &current);
    if config.check {
        for path in &summary.stale {
            println!("Stale: {}", path.display());
        }
        for path in &orphans {
            println!("Orphaned: {}", path.display());
        }
        let out_of_date = summary.stale.len() + orphans.len();
        if out_of_date > 0 {
            return Err(CliError::failure(format!(
                "\n{out_of_date} generated file(s) out of date; run `refine-gen generate`"
            )));
        }
        println!("✓ {} wrapper(s) up to date", summary.unchanged.len());
    } else {
        for path in &summary.written {
            println!("Generated: {}", path.display());
        }
        // units of wrappers that failed this run are indistinguishable from orphans
        if !failed {
            project::remove_units(&orphans)?;
            for path in &orphans {
                println!("Removed: {}", path.display());
            }
        }
        println!(
            "\n✓ {} wrapper(s): {} written, {} unchanged",
            ready.len(),
            summary.written.len(),
            summary.unchanged.len()
        );
    }

    if failed {
        return Err(CliError::new("", ExitCode::FAILURE));
    }
    Ok(ExitCode::SUCCESS)
}

/// Print every diagnostic of the run to stderr. Returns `true` when any of them is an error.
fn report_analysis(project: &LoadedProject, analysis: &Analysis) -> bool {
    let mut failed = false;
    for err in &project.parse_errors {
        report::emit(&Diagnostic::error(err, None), &project.sources);
        failed = true;
    }
    for diagnostic in analysis.all_diagnostics() {
        report::emit(&diagnostic, &project.sources);
        failed |= diagnostic.is_error();
    }
    failed
}

// ============================================================================
// inspect
// ============================================================================

/// Print the descriptor of every wrapper under `src`.
pub fn inspect(src: &Path, format: OutputFormat) -> CliResult<ExitCode> {
    let generator = GeneratorConfig::default();
    let config = DriverConfig {
        src_dir: src.to_path_buf(),
        ..DriverConfig::default()
    };
    let project = project::load(&config, &generator)?;
    let analysis = analyze(&project.compilation, &generator);

    match format {
        OutputFormat::Json => {
            let doc = inspect_json(&project, &analysis);
            let text = serde_json::to_string_pretty(&doc)
                .map_err(|e| CliError::failure(format!("Error serializing report: {e}")))?;
            println!("{text}");
        }
        OutputFormat::Text => {
            for desc in analysis.descriptors() {
                print!("{}", describe_text(desc));
            }
            report_analysis(&project, &analysis);
        }
    }

    if analysis.has_errors() || !project.parse_errors.is_empty() {
        return Err(CliError::new("", ExitCode::FAILURE));
    }
    Ok(ExitCode::SUCCESS)
}

fn describe_text(desc: &WrapperDescriptor) -> String {
    let hooks = desc.hooks.to_string();
    let traits: Vec<&str> = desc.traits.iter().map(|t| t.name()).collect();
    let mut out = String::new();
    out.push_str(&format!("{}\n", desc.qualified_name()));
    out.push_str(&format!("  base type:  {}\n", desc.base_type_qualified));
    out.push_str(&format!("  options:    {}\n", desc.options));
    out.push_str(&format!("  hooks:      {hooks}\n"));
    out.push_str(&format!("  operators:  {}\n", desc.operators));
    out.push_str(&format!(
        "  equatable:  {}, comparable: {}\n",
        desc.implements_equatable_self, desc.implements_comparable_self
    ));
    out.push_str(&format!("  traits:     {}\n\n", traits.join(", ")));
    out
}

fn descriptor_json(desc: &WrapperDescriptor) -> Value {
    let operators: serde_json::Map<String, Value> = desc
        .operators
        .iter()
        .map(|(op, supported)| (op.method_name().to_string(), Value::Bool(supported)))
        .collect();
    json!({
        "name": desc.qualified_name(),
        "visibility": desc.visibility,
        "base_type": desc.base_type,
        "base_type_qualified": desc.base_type_qualified,
        "options": desc.options.names(),
        "hooks": desc.hooks.names(),
        "operators": operators,
        "implements_equatable_self": desc.implements_equatable_self,
        "implements_comparable_self": desc.implements_comparable_self,
        "traits": desc.traits.iter().map(|t| t.name()).collect::<Vec<_>>(),
    })
}

fn inspect_json(project: &LoadedProject, analysis: &Analysis) -> Value {
    let wrappers: Vec<Value> = analysis.descriptors().map(descriptor_json).collect();
    let mut diagnostics: Vec<Value> = project
        .parse_errors
        .iter()
        .map(|err| diagnostic_json(&Diagnostic::error(err, None)))
        .collect();
    diagnostics.extend(analysis.all_diagnostics().iter().map(diagnostic_json));
    json!({
        "wrappers": wrappers,
        "diagnostics": diagnostics,
    })
}

fn diagnostic_json(diagnostic: &Diagnostic) -> Value {
    let location = diagnostic.location.as_ref().map(|loc| {
        json!({
            "unit": loc.unit,
            "line": loc.line,
            "column": loc.column + 1,
        })
    });
    json!({
        "severity": diagnostic.severity.to_string(),
        "code": diagnostic.code,
        "message": diagnostic.message,
        "location": location,
    })
}

// ============================================================================
// emit
// ============================================================================

/// Print the generated units of a single file, treated as a crate root.
pub fn emit(file: &Path) -> CliResult<ExitCode> {
    let source = project::read_source(file)?;
    let name = file.display().to_string();
    let mut sources = BTreeMap::new();
    sources.insert(name.clone(), source.clone());

    let unit = match SourceUnit::parse(name, ModulePath::crate_root(), &source) {
        Ok(unit) => unit,
        Err(err) => {
            report::emit(&Diagnostic::error(&err, None), &sources);
            return Err(CliError::new("", ExitCode::FAILURE));
        }
    };
    let (rendered, analysis) = refine_core::generate(&Compilation::from_units(vec![unit]), &GeneratorConfig::default());

    let texts: Vec<&str> = rendered.iter().map(|(_, text)| text.as_str()).collect();
    print!("{}", texts.join("\n"));

    let mut failed = false;
    for diagnostic in analysis.all_diagnostics() {
        report::emit(&diagnostic, &sources);
        failed |= diagnostic.is_error();
    }
    if failed {
        return Err(CliError::new("", ExitCode::FAILURE));
    }
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn analysis_of(source: &str) -> (LoadedProject, Analysis) {
        let unit = SourceUnit::parse("lib.rs", ModulePath::crate_root(), source).unwrap();
        let project = LoadedProject {
            compilation: Compilation::from_units(vec![unit]),
            ..LoadedProject::default()
        };
        let analysis = analyze(&project.compilation, &GeneratorConfig::default());
        (project, analysis)
    }

    #[test]
    fn test_inspect_json_shape() {
        let (project, analysis) = analysis_of(
            "use refine::refined;\n#[refined(String, Equals | EqualityOperators)]\npub struct FullName;\n",
        );
        let doc = inspect_json(&project, &analysis);
        let wrapper = &doc["wrappers"][0];
        assert_eq!(wrapper["name"], "crate::FullName");
        assert_eq!(wrapper["options"], json!(["Equals", "EqualityOperators"]));
        assert_eq!(wrapper["operators"]["eq"], true);
        assert_eq!(wrapper["operators"]["lt"], false);
        assert_eq!(wrapper["implements_equatable_self"], true);
        assert_eq!(doc["diagnostics"], json!([]));
    }

    #[test]
    fn test_inspect_json_lists_failures() {
        let (project, analysis) = analysis_of("use refine::refined;\n#[refined(i32, Nope)]\npub struct Bad;\n");
        let doc = inspect_json(&project, &analysis);
        assert_eq!(doc["wrappers"], json!([]));
        assert_eq!(doc["diagnostics"][0]["code"], "refine::options");
        assert_eq!(doc["diagnostics"][0]["location"]["line"], 2);
    }

    #[test]
    fn test_emit_renders_a_single_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("lib.rs");
        std::fs::write(&file, "use refine::refined;\n#[refined(u16)]\npub struct Port;\n").unwrap();
        assert_eq!(emit(&file).unwrap(), ExitCode::SUCCESS);
    }

    #[test]
    fn test_emit_fails_on_bad_options() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("lib.rs");
        std::fs::write(&file, "use refine::refined;\n#[refined(u16, Nope)]\npub struct Port;\n").unwrap();
        assert_eq!(emit(&file).unwrap_err().exit_code, ExitCode::FAILURE);
    }

    #[test]
    fn test_describe_text_lists_hooks() {
        let (_, analysis) = analysis_of(
            "use refine::prelude::*;\n#[refined(i32)]\npub struct X10;\n\
             impl Transformer<i32> for X10 { fn transform(v: i32) -> i32 { v * 10 } }\n",
        );
        let desc = analysis.descriptors().next().unwrap();
        let text = describe_text(desc);
        assert!(text.starts_with("crate::X10\n"));
        assert!(text.contains("hooks:      Transformer"));
    }
}
