//! Declaration scanner and attribute parsing.
//!
//! Scanning is two-phase:
//! 1. [`is_candidate`] is a purely syntactic filter: a unit struct carrying at least one attribute.
//! 2. [`find_candidates`] resolves each attribute path through the enclosing module's `use` declarations and keeps the
//!    structs whose attribute *is* `refine::refined`. A user attribute that merely shares the spelling is ignored.

use proc_macro2::Span;
use quote::ToTokens;
use syn::parse::{Parse, ParseStream};
use syn::spanned::Spanned;

use crate::catalog::{TypeCatalog, std_trait};
use crate::compilation::Compilation;
use crate::diagnostics::GenerationError;
use crate::paths::{ModulePath, is_runtime_item};

/// Name of the marker attribute in the runtime crate.
pub const MARKER: &str = "refined";

/// Cheap syntactic pre-filter: a unit struct with at least one attribute.
pub fn is_candidate(item: &syn::Item) -> Option<&syn::ItemStruct> {
    match item {
        syn::Item::Struct(s) if matches!(s.fields, syn::Fields::Unit) && !s.attrs.is_empty() => Some(s),
        _ => None,
    }
}

/// A placeholder whose marker attribute was confirmed by resolution.
#[derive(Debug, Clone, Copy)]
pub struct Candidate<'a> {
    pub item: &'a syn::ItemStruct,
    pub marker: &'a syn::Attribute,
    pub unit: &'a str,
}

impl Candidate<'_> {
    pub fn name(&self) -> String {
        self.item.ident.to_string()
    }

    /// Span of the marker attribute, used to locate per-candidate diagnostics.
    pub fn span(&self) -> Span {
        self.marker.span()
    }

    pub fn visibility(&self) -> String {
        self.item.vis.to_token_stream().to_string()
    }

    /// Attributes to carry over to the generated struct: everything except the marker, with derives of std traits
    /// removed (the generator decides those).
    pub fn carried_attributes(&self, catalog: &TypeCatalog, module: &ModulePath) -> Vec<String> {
        let scope = catalog.scope_for(module);
        let mut out = Vec::new();
        for attr in &self.item.attrs {
            if std::ptr::eq(attr, self.marker) {
                continue;
            }
            if !attr.path().is_ident("derive") {
                out.push(attr.to_token_stream().to_string());
                continue;
            }
            let Ok(paths) =
                attr.parse_args_with(syn::punctuated::Punctuated::<syn::Path, syn::Token![,]>::parse_terminated)
            else {
                out.push(attr.to_token_stream().to_string());
                continue;
            };
            let kept: Vec<&syn::Path> = paths
                .iter()
                .filter(|p| std_trait(&scope.resolve_path(p, catalog.index())).is_none())
                .collect();
            if !kept.is_empty() {
                out.push(quote::quote!(#[derive(#(#kept),*)]).to_string());
            }
        }
        out
    }
}

/// Find every candidate of the compilation, in unit and source order, paired with its module.
#[tracing::instrument(skip_all)]
pub fn find_candidates<'a>(compilation: &'a Compilation, catalog: &TypeCatalog) -> Vec<(ModulePath, Candidate<'a>)> {
    let mut found = Vec::new();
    for unit in &compilation.units {
        for (module, items) in unit.modules() {
            let scope = catalog.scope_for(&module);
            for item in items.iter().filter_map(is_candidate) {
                let marker = item
                    .attrs
                    .iter()
                    .find(|attr| is_runtime_item(&scope.resolve_path(attr.path(), catalog.index()), MARKER));
                match marker {
                    Some(marker) => {
                        tracing::debug!(module = %module, name = %item.ident, "found candidate");
                        found.push((
                            module.clone(),
                            Candidate {
                                item,
                                marker,
                                unit: &unit.name,
                            },
                        ));
                    }
                    None => tracing::trace!(name = %item.ident, "unit struct without marker"),
                }
            }
        }
    }
    found
}

/// Arguments of `#[refined(Base)]` / `#[refined(Base, FLAGS)]`.
#[derive(Debug, Clone)]
pub struct RefinedArgs {
    pub base: syn::Type,
    pub flags: Option<syn::Expr>,
}

impl Parse for RefinedArgs {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let base: syn::Type = input.parse()?;
        let mut flags = None;
        if input.peek(syn::Token![,]) {
            input.parse::<syn::Token![,]>()?;
            if !input.is_empty() {
                flags = Some(input.parse::<syn::Expr>()?);
                if input.peek(syn::Token![,]) {
                    input.parse::<syn::Token![,]>()?;
                }
            }
        }
        if !input.is_empty() {
            return Err(input.error("unexpected tokens after the options"));
        }
        Ok(Self { base, flags })
    }
}

impl RefinedArgs {
    /// Parse the arguments of a marker attribute.
    ///
    /// ## Errors
    /// - [`GenerationError::MalformedAttribute`] when the attribute has no argument list or the arguments do not
    ///   match `Base` / `Base, FLAGS`.
    pub fn from_attribute(attr: &syn::Attribute) -> Result<Self, GenerationError> {
        match &attr.meta {
            syn::Meta::List(list) => list.parse_args().map_err(|err| GenerationError::MalformedAttribute {
                reason: err.to_string(),
            }),
            syn::Meta::Path(_) => Err(GenerationError::MalformedAttribute {
                reason: "missing base type".to_string(),
            }),
            syn::Meta::NameValue(_) => Err(GenerationError::MalformedAttribute {
                reason: "expected a parenthesized argument list".to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidates(source: &str, implicit: bool) -> Vec<String> {
        let compilation = Compilation::single("lib.rs", "crate", source).unwrap();
        let catalog = TypeCatalog::build(&compilation, implicit);
        find_candidates(&compilation, &catalog)
            .into_iter()
            .map(|(module, c)| module.child(&c.name()).to_string())
            .collect()
    }

    #[test]
    fn test_syntactic_filter() {
        let unit: syn::Item = syn::parse_str("#[refined(i32)] pub struct A;").unwrap();
        let fields: syn::Item = syn::parse_str("#[refined(i32)] pub struct A { v: i32 }").unwrap();
        let bare: syn::Item = syn::parse_str("pub struct A;").unwrap();
        assert!(is_candidate(&unit).is_some());
        assert!(is_candidate(&fields).is_none());
        assert!(is_candidate(&bare).is_none());
    }

    #[test]
    fn test_marker_matched_by_identity() {
        let found = candidates(
            r#"
            use refine::refined;
            #[refined(i32)] pub struct A;
            mod other {
                use crate::attrs::refined;
                #[refined(i32)] pub struct B;
            }
            "#,
            false,
        );
        assert_eq!(found, vec!["crate::A"]);
    }

    #[test]
    fn test_qualified_and_renamed_markers() {
        let found = candidates(
            r#"
            use refine::refined as wrap;
            #[refine::refined(i32)] pub struct A;
            #[wrap(u8)] pub struct B;
            "#,
            false,
        );
        assert_eq!(found, vec!["crate::A", "crate::B"]);
    }

    #[test]
    fn test_unimported_marker_needs_implicit_prelude() {
        let source = "#[refined(i32)] pub struct A;";
        assert!(candidates(source, false).is_empty());
        assert_eq!(candidates(source, true), vec!["crate::A"]);
    }

    #[test]
    fn test_args_parse() {
        let args: RefinedArgs = syn::parse_str("(i32, i32), ToString | Equals,").unwrap();
        assert!(matches!(args.base, syn::Type::Tuple(_)));
        assert!(args.flags.is_some());
        let bare: RefinedArgs = syn::parse_str("String").unwrap();
        assert!(bare.flags.is_none());
        assert!(syn::parse_str::<RefinedArgs>("String, A, B").is_err());
    }

    #[test]
    fn test_path_only_marker_is_malformed() {
        let item: syn::ItemStruct = syn::parse_str("#[refined] pub struct A;").unwrap();
        assert!(matches!(
            RefinedArgs::from_attribute(&item.attrs[0]),
            Err(GenerationError::MalformedAttribute { .. })
        ));
    }

    #[test]
    fn test_std_derives_are_not_carried() {
        let source = r#"
            use refine::refined;
            /// A score.
            #[derive(Debug, serde::Serialize)]
            #[refined(i32)]
            pub struct A;
        "#;
        let compilation = Compilation::single("lib.rs", "crate", source).unwrap();
        let catalog = TypeCatalog::build(&compilation, false);
        let found = find_candidates(&compilation, &catalog);
        let (module, candidate) = &found[0];
        let carried = candidate.carried_attributes(&catalog, module);
        assert_eq!(carried.len(), 2);
        assert!(carried[0].contains("doc"));
        assert!(carried[1].contains("Serialize") && !carried[1].contains("Debug"));
    }
}
