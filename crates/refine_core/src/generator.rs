//! Generation entry point: compilation in, descriptors and diagnostics out.
//!
//! ## Notes
//! - Analysis is sequential because syntax trees are not `Send`. Its output ([`WrapperDescriptor`]) is plain data,
//!   so callers may render descriptors in parallel.
//! - A failing candidate never affects the others; its error is kept in its own [`CandidateOutcome`].
//! - The "no candidates" warning is decided only after every unit has been scanned.

use proc_macro2::Span;

use crate::catalog::TypeCatalog;
use crate::compilation::Compilation;
use crate::config::GeneratorConfig;
use crate::descriptor::{Declaration, WrapperDescriptor};
use crate::diagnostics::{Diagnostic, GenerationError, Location};
use crate::hooks;
use crate::options::{self, Options};
use crate::paths::ModulePath;
use crate::prober;
use crate::scanner::{self, Candidate, RefinedArgs};
use crate::semantic::SemanticModel;
use crate::synth;

/// A generation error tied to the attribute it concerns.
#[derive(Debug, Clone)]
pub struct CandidateError {
    pub error: GenerationError,
    pub span: Span,
}

impl CandidateError {
    pub fn to_diagnostic(&self, unit: &str) -> Diagnostic {
        Diagnostic::error(&self.error, Some(Location::from_span(unit, self.span)))
    }
}

/// The result of analyzing one candidate.
#[derive(Debug, Clone)]
pub struct CandidateOutcome {
    pub name: String,
    pub module: ModulePath,
    /// Name of the source unit the candidate was found in.
    pub unit: String,
    pub span: Span,
    pub result: Result<WrapperDescriptor, CandidateError>,
}

/// Everything one analysis pass produced.
#[derive(Debug, Clone, Default)]
pub struct Analysis {
    pub outcomes: Vec<CandidateOutcome>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Analysis {
    pub fn descriptors(&self) -> impl Iterator<Item = &WrapperDescriptor> {
        self.outcomes.iter().filter_map(|o| o.result.as_ref().ok())
    }

    pub fn failures(&self) -> impl Iterator<Item = (&CandidateOutcome, &CandidateError)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|err| (o, err)))
    }

    pub fn has_errors(&self) -> bool {
        self.failures().next().is_some() || self.diagnostics.iter().any(Diagnostic::is_error)
    }

    /// Every diagnostic of the run: per-candidate errors in source order, then run-level diagnostics.
    pub fn all_diagnostics(&self) -> Vec<Diagnostic> {
        let mut out: Vec<Diagnostic> = self
            .failures()
            .map(|(outcome, err)| err.to_diagnostic(&outcome.unit))
            .collect();
        out.extend(self.diagnostics.iter().cloned());
        out
    }
}

/// Analyze every candidate of `compilation`.
#[tracing::instrument(skip_all, fields(units = compilation.units.len(), root = %config.module_root))]
pub fn analyze(compilation: &Compilation, config: &GeneratorConfig) -> Analysis {
    let catalog = TypeCatalog::build(compilation, config.implicit_prelude);
    let candidates = scanner::find_candidates(compilation, &catalog);

    let outcomes: Vec<CandidateOutcome> = candidates
        .iter()
        .map(|(module, candidate)| {
            let result = describe(&catalog, module, candidate).map_err(|error| CandidateError {
                error,
                span: candidate.span(),
            });
            if let Err(err) = &result {
                tracing::warn!(wrapper = %candidate.name(), error = %err.error, "candidate skipped");
            }
            CandidateOutcome {
                name: candidate.name(),
                module: module.clone(),
                unit: candidate.unit.to_string(),
                span: candidate.span(),
                result,
            }
        })
        .collect();

    let mut diagnostics = Vec::new();
    if outcomes.is_empty() {
        tracing::warn!("no refined declarations found");
        diagnostics.push(Diagnostic::no_candidates());
    }
    tracing::info!(candidates = outcomes.len(), "analysis finished");
    Analysis { outcomes, diagnostics }
}

/// Build the descriptor of one candidate.
fn describe(
    catalog: &TypeCatalog,
    module: &ModulePath,
    candidate: &Candidate<'_>,
) -> Result<WrapperDescriptor, GenerationError> {
    let name = candidate.name();
    if !candidate.item.generics.params.is_empty() {
        return Err(GenerationError::UnsupportedGeneric { wrapper: name });
    }

    let args = RefinedArgs::from_attribute(candidate.marker)?;
    let options = match &args.flags {
        Some(expr) => options::fold(expr)?,
        None => Options::default(),
    };

    let scope = catalog.scope_for(module);
    let base = catalog
        .resolve_type(&args.base, &scope)
        .map_err(|err| err.attributed_to(&name))?;
    let wrapper_path = module.child(&name).to_string();
    let hooks = hooks::discover(catalog, &wrapper_path, &base.key);
    let capabilities = prober::probe(catalog, &base);

    let decl = Declaration {
        name,
        namespace: module.clone(),
        visibility: candidate.visibility(),
        attributes: candidate.carried_attributes(catalog, module),
        options,
    };
    Ok(WrapperDescriptor::new(decl, &base, hooks, capabilities))
}

/// Analyze and render every candidate in one call, sequentially.
///
/// Returns `(qualified wrapper name, rendered unit)` pairs for successful candidates, plus the analysis for
/// diagnostics.
pub fn generate(compilation: &Compilation, config: &GeneratorConfig) -> (Vec<(String, String)>, Analysis) {
    let mut analysis = analyze(compilation, config);
    let mut rendered = Vec::new();
    for outcome in &mut analysis.outcomes {
        let Ok(desc) = &outcome.result else {
            continue;
        };
        match synth::render(desc, config) {
            Ok(text) => rendered.push((desc.qualified_name(), text)),
            Err(error) => {
                outcome.result = Err(CandidateError {
                    error,
                    span: outcome.span,
                })
            }
        }
    }
    (rendered, analysis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::{NO_CANDIDATES_CODE, Severity};

    #[test]
    fn test_no_candidates_warns_once() {
        let compilation = Compilation::from_units(vec![
            crate::compilation::SourceUnit::parse("a.rs", ModulePath::crate_root(), "struct A;").unwrap(),
            crate::compilation::SourceUnit::parse("b.rs", ModulePath::crate_root().child("b"), "struct B;").unwrap(),
        ]);
        let analysis = analyze(&compilation, &GeneratorConfig::default());
        assert_eq!(analysis.diagnostics.len(), 1);
        assert_eq!(analysis.diagnostics[0].code, NO_CANDIDATES_CODE);
        assert_eq!(analysis.diagnostics[0].severity, Severity::Warning);
        assert!(!analysis.has_errors());
    }

    #[test]
    fn test_failure_is_isolated() {
        let source = r#"
            use refine::refined;
            #[refined(i32, Bogus)] pub struct Bad;
            #[refined(i32)] pub struct Good;
        "#;
        let compilation = Compilation::single("lib.rs", "crate", source).unwrap();
        let analysis = analyze(&compilation, &GeneratorConfig::default());
        assert_eq!(analysis.outcomes.len(), 2);
        assert!(analysis.has_errors());
        let names: Vec<&str> = analysis.descriptors().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["Good"]);
        let diags = analysis.all_diagnostics();
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code, "refine::options");
    }

    #[test]
    fn test_generic_wrapper_is_rejected() {
        let source = r#"
            use refine::refined;
            #[refined(T)] pub struct Boxed<T>;
        "#;
        let compilation = Compilation::single("lib.rs", "crate", source).unwrap();
        let analysis = analyze(&compilation, &GeneratorConfig::default());
        let (_, err) = analysis.failures().next().unwrap();
        assert!(matches!(err.error, GenerationError::UnsupportedGeneric { .. }));
    }
}
