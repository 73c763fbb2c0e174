//! Wrapper synthesis: descriptor in, Rust tokens (or formatted text) out.
//!
//! Synthesis is a pure function of the [`WrapperDescriptor`]. It holds no state and may run concurrently for any
//! number of descriptors; identical descriptors always produce byte-identical output.
//!
//! ## See also
//! - [`plan`]: the member decision table
//! - [`members`]: token emission per member

pub mod members;
pub mod plan;

use proc_macro2::TokenStream;
use syn::visit_mut::{self, VisitMut};

use self::members::EmitContext;
use self::plan::MemberPlan;
use crate::config::GeneratorConfig;
use crate::descriptor::WrapperDescriptor;
use crate::diagnostics::GenerationError;
use crate::paths::ModulePath;

/// Marker line that starts every rendered unit.
pub const GENERATED_MARKER: &str = "// @generated by refine-gen. Do not edit by hand.";

/// Build the items of one wrapper.
///
/// ## Errors
/// - [`GenerationError::Render`] when the wrapper name, visibility, attributes or base type do not re-parse as Rust.
pub fn synthesize(desc: &WrapperDescriptor) -> Result<TokenStream, GenerationError> {
    let render_error = |what: &str, err: &dyn std::fmt::Display| GenerationError::Render {
        wrapper: desc.name.clone(),
        reason: format!("invalid {what}: {err}"),
    };

    let wrapper: syn::Ident = syn::parse_str(&desc.name).map_err(|e| render_error("wrapper name", &e))?;
    let vis: syn::Visibility = syn::parse_str(&desc.visibility).map_err(|e| render_error("visibility", &e))?;
    let attrs = desc
        .attributes
        .iter()
        .map(|a| a.parse::<TokenStream>().map_err(|e| render_error("attribute", &e)))
        .collect::<Result<Vec<_>, _>>()?;
    let base = base_type(desc)?;

    let plan = MemberPlan::decide(desc);
    tracing::debug!(wrapper = %desc.name, plan = ?plan, "synthesizing wrapper");

    let ctx = EmitContext {
        wrapper,
        base,
        hooks: desc.hooks,
    };
    let vis = quote::ToTokens::to_token_stream(&vis);

    let mut out = members::storage(&ctx, &plan, &vis, &attrs);
    out.extend(members::inherent(&ctx, &plan));
    if let Some(via) = plan.display {
        out.extend(members::display(&ctx, via));
    }
    if let Some(via) = plan.equality {
        out.extend(members::equality(&ctx, &plan, via));
        if plan.partial_ord {
            out.extend(members::ordering(&ctx, &plan, via));
        }
    }
    if let Some(explicit_ne) = plan.cross_eq {
        out.extend(members::cross_equality(&ctx, explicit_ne));
    }
    if !plan.cross_ord.is_empty() {
        out.extend(members::cross_ordering(&ctx, &plan.cross_ord));
    }
    if let Some(conversion) = plan.conversion {
        out.extend(members::conversion(&ctx, conversion));
    }
    Ok(out)
}

/// Render one wrapper as a formatted source unit.
///
/// ## Errors
/// - [`GenerationError::Render`] when the synthesized tokens do not form a valid file.
pub fn render(desc: &WrapperDescriptor, config: &GeneratorConfig) -> Result<String, GenerationError> {
    let tokens = synthesize(desc)?;
    let file: syn::File = syn::parse2(tokens).map_err(|err| GenerationError::Render {
        wrapper: desc.name.clone(),
        reason: err.to_string(),
    })?;
    let code = prettyplease::unparse(&file);
    if config.emit_header {
        Ok(format!("{}\n{code}", header(desc)))
    } else {
        Ok(code)
    }
}

/// Summary comment placed at the top of rendered units.
pub fn header(desc: &WrapperDescriptor) -> String {
    let lines = [
        GENERATED_MARKER.to_string(),
        "//".to_string(),
        format!("// wrapper:   {}", desc.qualified_name()),
        format!("// base type: {}", desc.base_type_qualified),
        format!("// hooks:     {}", desc.hooks),
        format!("// operators: {}", desc.operators),
        format!("// options:   {}", desc.options),
    ];
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// The base type as it must be spelled inside the generated unit.
fn base_type(desc: &WrapperDescriptor) -> Result<syn::Type, GenerationError> {
    let qualified = desc.needs_qualified_base();
    let text = if qualified {
        &desc.base_type_qualified
    } else {
        &desc.base_type
    };
    let mut ty: syn::Type = syn::parse_str(text).map_err(|err| GenerationError::Render {
        wrapper: desc.name.clone(),
        reason: format!("base type `{text}` does not re-parse: {err}"),
    })?;
    BaseSpelling {
        from: &desc.namespace,
        respell_relative: qualified,
    }
    .visit_type_mut(&mut ty);
    Ok(ty)
}

/// Adjust a base type for use as a field type in the wrapper's module.
///
/// - Elided reference lifetimes become `'static` (the wrapper has no lifetime parameter).
/// - Qualified `self::` paths are rewritten relative to the wrapper's module.
struct BaseSpelling<'a> {
    from: &'a ModulePath,
    respell_relative: bool,
}

impl VisitMut for BaseSpelling<'_> {
    fn visit_type_reference_mut(&mut self, r: &mut syn::TypeReference) {
        if r.lifetime.is_none() {
            r.lifetime = Some(syn::Lifetime::new("'static", proc_macro2::Span::call_site()));
        }
        visit_mut::visit_type_reference_mut(self, r);
    }

    fn visit_path_mut(&mut self, path: &mut syn::Path) {
        let relative = path.leading_colon.is_none() && path.segments.first().is_some_and(|s| s.ident == "self");
        if self.respell_relative && relative && path.segments.len() > 1 {
            let names: Vec<String> = path.segments.iter().map(|s| s.ident.to_string()).collect();
            let module = ModulePath::from_segments(names[..names.len() - 1].iter().cloned());
            let spelled = module.spelled_from(self.from);
            let last = path.segments.pop().map(|pair| pair.into_value());
            path.segments = spelled
                .iter()
                .map(|name| syn::PathSegment::from(syn::Ident::new(name, proc_macro2::Span::call_site())))
                .collect();
            if let Some(last) = last {
                path.segments.push(last);
            }
        }
        visit_mut::visit_path_mut(self, path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::Declaration;
    use crate::hooks::HookSet;
    use crate::options::Options;
    use crate::prober::{Capabilities, OperatorSupport};
    use crate::semantic::{PrimitiveKind, TraitId, TypeDescriptor, TypeKind};

    fn descriptor(base: TypeDescriptor, namespace: ModulePath, options: Options, hooks: HookSet) -> WrapperDescriptor {
        WrapperDescriptor::new(
            Declaration {
                name: "Score".into(),
                namespace,
                visibility: "pub".into(),
                attributes: vec!["#[doc = \" A score.\"]".into()],
                options,
            },
            &base,
            hooks,
            Capabilities {
                operators: OperatorSupport::all(),
                equatable_self: true,
                comparable_self: true,
                traits: [TraitId::Debug, TraitId::Clone, TraitId::Copy, TraitId::Display, TraitId::Hash]
                    .into_iter()
                    .collect(),
            },
        )
    }

    fn int() -> TypeDescriptor {
        TypeDescriptor {
            key: "i32".into(),
            written: "i32".into(),
            name: "i32".into(),
            namespace: ModulePath::none(),
            kind: TypeKind::Primitive(PrimitiveKind::Integer),
        }
    }

    #[test]
    fn test_render_has_header_and_members() {
        let desc = descriptor(int(), ModulePath::crate_root(), Options::default(), HookSet::default());
        let text = render(&desc, &GeneratorConfig::default()).unwrap();
        assert!(text.starts_with(GENERATED_MARKER));
        assert!(text.contains("// wrapper:   crate::Score"));
        assert!(text.contains("pub struct Score {"));
        assert!(text.contains("#[derive(Debug, Clone, Copy)]"));
        assert!(text.contains("impl ::core::cmp::Ord for Score"));
        assert!(text.contains("impl ::core::cmp::PartialOrd<i32> for Score"));
        assert!(!text.contains("try_create"));
        assert!(!text.contains("TryFrom"));
    }

    #[test]
    fn test_render_without_header() {
        let desc = descriptor(int(), ModulePath::crate_root(), Options::empty(), HookSet::default());
        let text = render(&desc, &GeneratorConfig::macro_expansion()).unwrap();
        assert!(!text.contains("@generated"));
        assert!(text.contains("pub fn create(value: i32)"));
        assert!(!text.contains("PartialEq"));
    }

    #[test]
    fn test_reference_base_gets_static_lifetime() {
        let base = TypeDescriptor {
            key: "&str".into(),
            written: "&str".into(),
            name: "&str".into(),
            namespace: ModulePath::none(),
            kind: TypeKind::Textual,
        };
        let desc = descriptor(base, ModulePath::crate_root(), Options::empty(), HookSet::default());
        let text = render(&desc, &GeneratorConfig::default()).unwrap();
        assert!(text.contains("value: &'static str"));
    }

    #[test]
    fn test_base_from_other_module_is_qualified() {
        let base = TypeDescriptor {
            key: "self::model::Person".into(),
            written: "Person".into(),
            name: "Person".into(),
            namespace: ModulePath::root("self").child("model"),
            kind: TypeKind::Opaque,
        };
        let desc = descriptor(
            base,
            ModulePath::root("self").child("wrappers"),
            Options::empty(),
            HookSet::default(),
        );
        let text = render(&desc, &GeneratorConfig::macro_expansion()).unwrap();
        assert!(text.contains("value: super::model::Person"));
    }

    #[test]
    fn test_render_is_deterministic() {
        let hooks = HookSet {
            try_validate: true,
            transform: true,
            ..HookSet::default()
        };
        let desc = descriptor(int(), ModulePath::crate_root(), Options::all(), hooks);
        let first = render(&desc, &GeneratorConfig::default()).unwrap();
        let second = render(&desc.clone(), &GeneratorConfig::default()).unwrap();
        assert_eq!(first, second);
        assert!(first.contains("fn validate(value: &i32)"));
        assert!(first.contains("pub fn try_create(value: i32)"));
    }

    #[test]
    fn test_invalid_base_is_a_render_error() {
        let mut desc = descriptor(int(), ModulePath::crate_root(), Options::empty(), HookSet::default());
        desc.base_type = "(i32".into();
        assert!(matches!(synthesize(&desc), Err(GenerationError::Render { .. })));
    }
}
