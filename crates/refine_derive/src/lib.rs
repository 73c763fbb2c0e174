//! Procedural macros for refined wrapper types.
//!
//! - `refine! { ... }`: expands a block of items in place, replacing every `#[refined(...)]` placeholder with its
//!   generated wrapper
//! - `#[refined(...)]`: checks a placeholder and erases it, for crates that `include!` units written by `refine-gen`
//!
//! Both macros run the same engine as the CLI (`refine_core`), so a wrapper expanded here and one rendered to a file
//! have identical members.

use std::collections::BTreeMap;

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{ToTokens, quote};
use refine_core::generator::CandidateOutcome;
use refine_core::scanner::RefinedArgs;
use refine_core::{Compilation, GeneratorConfig, ModulePath, SourceUnit, analyze, synthesize};

/// Expand a block of items, generating the wrappers declared in it.
///
/// The marker and hook traits resolve without an import inside the block; imports still work (and are needed by the
/// hook impls themselves). A candidate that cannot be generated becomes a `compile_error!` at its attribute while the
/// rest of the block expands normally.
///
/// # Example
/// ```ignore
/// refine::refine! {
///     #[refined(i32)]
///     pub struct X10;
///
///     impl refine::Transformer<i32> for X10 {
///         fn transform(value: i32) -> i32 { value * 10 }
///     }
/// }
///
/// assert_eq!(*X10::create(2).unwrap().value(), 20);
/// ```
#[proc_macro]
pub fn refine(input: TokenStream) -> TokenStream {
    let file = match syn::parse::<syn::File>(input) {
        Ok(file) => file,
        Err(err) => return err.to_compile_error().into(),
    };
    let config = GeneratorConfig::macro_expansion();
    let root = config.root_module();
    let compilation = Compilation::from_units(vec![SourceUnit::new("refine!", root.clone(), file.clone())]);
    let analysis = analyze(&compilation, &config);

    let outcomes: BTreeMap<String, &CandidateOutcome> = analysis
        .outcomes
        .iter()
        .map(|outcome| (outcome.module.child(&outcome.name).to_string(), outcome))
        .collect();

    let items = expand_items(file.items, &root, &outcomes);
    let attrs = file.attrs;
    quote! {
        #(#attrs)*
        #(#items)*
    }
    .into()
}

/// Rewrite `items`, descending into inline modules.
fn expand_items(
    items: Vec<syn::Item>,
    module: &ModulePath,
    outcomes: &BTreeMap<String, &CandidateOutcome>,
) -> Vec<TokenStream2> {
    items
        .into_iter()
        .map(|item| match item {
            syn::Item::Mod(mut item_mod) => {
                if let Some((brace, content)) = item_mod.content.take() {
                    let child = module.child(&item_mod.ident.to_string());
                    let expanded = expand_items(content, &child, outcomes);
                    let syn::ItemMod {
                        attrs,
                        vis,
                        unsafety,
                        mod_token,
                        ident,
                        ..
                    } = item_mod;
                    let mut body = TokenStream2::new();
                    brace.surround(&mut body, |tokens| tokens.extend(expanded));
                    quote! { #(#attrs)* #vis #unsafety #mod_token #ident #body }
                } else {
                    item_mod.into_token_stream()
                }
            }
            syn::Item::Struct(item_struct) => {
                let key = module.child(&item_struct.ident.to_string()).to_string();
                match outcomes.get(&key) {
                    Some(outcome) => expand_candidate(outcome),
                    None => item_struct.into_token_stream(),
                }
            }
            other => other.into_token_stream(),
        })
        .collect()
}

fn expand_candidate(outcome: &CandidateOutcome) -> TokenStream2 {
    let generated = match &outcome.result {
        Ok(desc) => synthesize(desc).map_err(|err| (err, outcome.span)),
        Err(err) => Err((err.error.clone(), err.span)),
    };
    match generated {
        Ok(tokens) => tokens,
        Err((error, span)) => syn::Error::new(span, format!("{error} [{}]", error.code())).to_compile_error(),
    }
}

/// Marker for a wrapper whose body is generated by `refine-gen`.
///
/// The placeholder is erased; `include!` the generated unit next to it. Inside `refine! { ... }` the marker is
/// consumed by the block expansion instead and this attribute never runs.
///
/// # Example
/// ```ignore
/// #[refined(String, Equals | EqualityOperators)]
/// pub struct FullName;
/// include!(concat!(env!("OUT_DIR"), "/full_name.rs"));
/// ```
#[proc_macro_attribute]
pub fn refined(args: TokenStream, item: TokenStream) -> TokenStream {
    match check_placeholder(args.into(), item.into()) {
        Ok(()) => TokenStream::new(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn check_placeholder(args: TokenStream2, item: TokenStream2) -> syn::Result<()> {
    let item: syn::ItemStruct = syn::parse2(item)?;
    if !matches!(item.fields, syn::Fields::Unit) {
        return Err(syn::Error::new_spanned(
            &item.fields,
            "`#[refined]` placeholders must be unit structs; the wrapper's storage is generated",
        ));
    }
    if !item.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &item.generics,
            "refined wrappers over type parameters are not supported",
        ));
    }
    syn::parse2::<RefinedArgs>(args)?;
    Ok(())
}
