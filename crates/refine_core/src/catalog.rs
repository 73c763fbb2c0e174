//! Lightweight type catalog backing the [`SemanticModel`] interface.
//!
//! The catalog is built once per compilation and is read-only afterwards. It knows:
//! - every module and nameable item (for `use`-aware path resolution),
//! - every struct/enum/union declared in the compilation with its `#[derive(...)]` list,
//! - every `impl Trait for Type` block, wherever it appears,
//! - the std trait tables of builtin and structural types.
//!
//! ## Notes
//! - Trait tables for structural types (tuples, arrays, references, `Option`, `Vec`, `Box`, `Rc`/`Arc`) follow the std
//!   blanket impls: the composite implements a trait when every component does.
//! - Declared generic types only keep a derived trait when every type argument implements it, matching the bounds
//!   `#[derive]` generates.
//! - Anything the catalog cannot identify resolves to [`TypeKind::Opaque`] with no traits at all.

use std::collections::{BTreeMap, BTreeSet};

use syn::punctuated::Punctuated;
use syn::visit_mut::{self, VisitMut};

use crate::compilation::Compilation;
use crate::diagnostics::GenerationError;
use crate::paths::{ImportTable, ItemIndex, ModulePath, Scope};
use crate::semantic::{
    ContainerKind, InterfaceRef, PrimitiveKind, SemanticModel, TraitId, TypeDescriptor, TypeKind, render_type,
};

const INTEGERS: &[&str] = &[
    "i8", "i16", "i32", "i64", "i128", "isize", "u8", "u16", "u32", "u64", "u128", "usize",
];
const FLOATS: &[&str] = &["f32", "f64"];
const SHARED_POINTERS: &[&str] = &["Box", "Rc", "Arc", "Cow"];
const STD_ROOTS: &[&str] = &["std", "core", "alloc"];
const MAX_TUPLE_ARITY: usize = 12;

/// Traits a tuple, array or `Vec` can inherit from its elements.
const ELEMENTWISE: &[TraitId] = &[
    TraitId::PartialEq,
    TraitId::Eq,
    TraitId::PartialOrd,
    TraitId::Ord,
    TraitId::Hash,
    TraitId::Debug,
    TraitId::Clone,
    TraitId::Copy,
    TraitId::Default,
];

/// A struct, enum or union declared somewhere in the compilation.
#[derive(Debug, Clone, Default)]
pub struct DeclaredType {
    /// `true` for enums whose variants carry no data.
    pub fieldless_enum: bool,
    /// Names of the type parameters, in declaration order.
    pub generics: Vec<String>,
    pub derives: BTreeSet<TraitId>,
    /// Std trait impls written by hand (`impl PartialOrd for T`).
    pub impls: BTreeSet<InterfaceRef>,
}

/// One `impl Trait for Type` block.
#[derive(Debug, Clone)]
pub struct TraitImpl {
    /// Canonical path of the implementing type, without generic arguments.
    pub self_path: String,
    /// Canonical key of the implementing type, with generic arguments.
    pub self_key: String,
    /// Canonical path of the implemented trait.
    pub trait_path: Vec<String>,
    /// Canonical keys of the trait's type arguments.
    pub trait_args: Vec<String>,
    /// Whether the impl block declares its own generic parameters.
    pub generic: bool,
}

/// Read-only view of the types and trait impls of one compilation.
#[derive(Debug, Clone, Default)]
pub struct TypeCatalog {
    index: ItemIndex,
    scopes: BTreeMap<ModulePath, Scope>,
    declared: BTreeMap<String, DeclaredType>,
    impls: Vec<TraitImpl>,
}

impl TypeCatalog {
    /// Build the catalog for `compilation`.
    ///
    /// `implicit_prelude` makes unbound runtime names (`refined`, `Validator`, ...) resolve into the runtime crate.
    #[tracing::instrument(skip_all, fields(units = compilation.units.len()))]
    pub fn build(compilation: &Compilation, implicit_prelude: bool) -> Self {
        let mut catalog = Self::default();

        for unit in &compilation.units {
            for (module, items) in unit.modules() {
                catalog.index.add_module(module.clone());
                for item in items {
                    if let Some(name) = item_name(item) {
                        catalog.index.add_item(&module, &name);
                    }
                }
                let imports = ImportTable::from_items(items, &module);
                catalog
                    .scopes
                    .insert(module.clone(), Scope::new(module, imports, implicit_prelude));
            }
        }

        for unit in &compilation.units {
            for (module, items) in unit.modules() {
                let scope = catalog.scope_for(&module);
                for item in items {
                    catalog.record_item(item, &scope);
                }
            }
        }

        catalog.attach_std_impls();
        tracing::debug!(
            declared = catalog.declared.len(),
            impls = catalog.impls.len(),
            "type catalog built"
        );
        catalog
    }

    pub fn index(&self) -> &ItemIndex {
        &self.index
    }

    /// Resolution scope of `module`; an empty scope for modules outside the compilation.
    pub fn scope_for(&self, module: &ModulePath) -> Scope {
        self.scopes
            .get(module)
            .cloned()
            .unwrap_or_else(|| Scope::new(module.clone(), ImportTable::new(), false))
    }

    pub fn declared(&self, path: &str) -> Option<&DeclaredType> {
        self.declared.get(path)
    }

    /// All non-generic trait impls whose implementing type is `self_path`.
    pub fn impls_for<'a>(&'a self, self_path: &'a str) -> impl Iterator<Item = &'a TraitImpl> + 'a {
        self.impls.iter().filter(move |i| i.self_path == self_path && !i.generic)
    }

    /// Canonical identity of a type reference written in `scope`.
    pub fn canonical_key(&self, ty: &syn::Type, scope: &Scope) -> String {
        render_type(&self.canonicalize(ty, scope))
    }

    fn canonicalize(&self, ty: &syn::Type, scope: &Scope) -> syn::Type {
        let mut ty = ty.clone();
        Canonicalizer {
            scope,
            index: &self.index,
        }
        .visit_type_mut(&mut ty);
        ty
    }

    fn record_item(&mut self, item: &syn::Item, scope: &Scope) {
        match item {
            syn::Item::Struct(s) => {
                let decl = DeclaredType {
                    fieldless_enum: false,
                    generics: type_params(&s.generics),
                    derives: self.derives(&s.attrs, scope),
                    impls: BTreeSet::new(),
                };
                self.declared.insert(scope.module.child(&s.ident.to_string()).to_string(), decl);
            }
            syn::Item::Enum(e) => {
                let decl = DeclaredType {
                    fieldless_enum: e.variants.iter().all(|v| matches!(v.fields, syn::Fields::Unit)),
                    generics: type_params(&e.generics),
                    derives: self.derives(&e.attrs, scope),
                    impls: BTreeSet::new(),
                };
                self.declared.insert(scope.module.child(&e.ident.to_string()).to_string(), decl);
            }
            syn::Item::Union(u) => {
                let decl = DeclaredType {
                    fieldless_enum: false,
                    generics: type_params(&u.generics),
                    derives: self.derives(&u.attrs, scope),
                    impls: BTreeSet::new(),
                };
                self.declared.insert(scope.module.child(&u.ident.to_string()).to_string(), decl);
            }
            syn::Item::Impl(imp) => {
                if let Some(record) = self.trait_impl(imp, scope) {
                    self.impls.push(record);
                }
            }
            _ => {}
        }
    }

    fn derives(&self, attrs: &[syn::Attribute], scope: &Scope) -> BTreeSet<TraitId> {
        let mut out = BTreeSet::new();
        for attr in attrs.iter().filter(|a| a.path().is_ident("derive")) {
            let Ok(paths) = attr.parse_args_with(Punctuated::<syn::Path, syn::Token![,]>::parse_terminated) else {
                continue;
            };
            for path in paths {
                if let Some(trait_id) = std_trait(&scope.resolve_path(&path, &self.index)) {
                    out.insert(trait_id);
                }
            }
        }
        out
    }

    fn trait_impl(&self, imp: &syn::ItemImpl, scope: &Scope) -> Option<TraitImpl> {
        let (negative, trait_path, _) = imp.trait_.as_ref()?;
        if negative.is_some() {
            return None;
        }
        let self_path = match imp.self_ty.as_ref() {
            syn::Type::Path(tp) if tp.qself.is_none() => scope.resolve_path(&tp.path, &self.index).join("::"),
            other => self.canonical_key(other, scope),
        };
        let trait_args = trait_path
            .segments
            .last()
            .map(|seg| type_args(&seg.arguments))
            .unwrap_or_default()
            .into_iter()
            .map(|ty| self.canonical_key(ty, scope))
            .collect();
        Some(TraitImpl {
            self_path,
            self_key: self.canonical_key(&imp.self_ty, scope),
            trait_path: scope.resolve_path(trait_path, &self.index),
            trait_args,
            generic: !imp.generics.params.is_empty(),
        })
    }

    /// Fold hand-written std trait impls into the declared types they target.
    fn attach_std_impls(&mut self) {
        let mut found: Vec<(String, InterfaceRef)> = Vec::new();
        for imp in &self.impls {
            let Some(trait_id) = std_trait(&imp.trait_path) else {
                continue;
            };
            let interface = match imp.trait_args.first() {
                Some(rhs) if trait_id.has_rhs() && rhs != "Self" && *rhs != imp.self_key => {
                    InterfaceRef::with_rhs(trait_id, rhs.clone())
                }
                _ => InterfaceRef::closed(trait_id),
            };
            found.push((imp.self_path.clone(), interface));
        }
        for (path, interface) in found {
            if let Some(decl) = self.declared.get_mut(&path) {
                decl.impls.insert(interface);
            }
        }
    }

    fn describe(&self, ty: &syn::Type, scope: &Scope, by_value: bool) -> Result<TypeDescriptor, GenerationError> {
        let written = render_type(ty);
        let unresolvable = |reason: &str| GenerationError::UnresolvableBaseType {
            wrapper: String::new(),
            base: written.clone(),
            reason: reason.to_string(),
        };
        let structural = |kind: TypeKind| TypeDescriptor {
            key: self.canonical_key(ty, scope),
            written: written.clone(),
            name: written.clone(),
            namespace: ModulePath::none(),
            kind,
        };

        match ty {
            syn::Type::Paren(p) => self.describe(&p.elem, scope, by_value),
            syn::Type::Group(g) => self.describe(&g.elem, scope, by_value),
            syn::Type::Infer(_) => Err(unresolvable("an inferred type cannot be wrapped")),
            syn::Type::ImplTrait(_) => Err(unresolvable("`impl Trait` has no nameable type")),
            syn::Type::TraitObject(_) if by_value => Err(unresolvable("trait objects are unsized")),
            syn::Type::Never(_) => Err(unresolvable("`!` has no values")),
            syn::Type::Macro(_) => Err(unresolvable("type macros are not expanded")),
            syn::Type::Slice(_) if by_value => Err(unresolvable("slices are unsized")),
            syn::Type::Slice(s) => {
                let elem = self.describe(&s.elem, scope, true)?;
                Ok(structural(TypeKind::Array(Box::new(elem))))
            }
            syn::Type::Array(a) => {
                let elem = self.describe(&a.elem, scope, true)?;
                Ok(structural(TypeKind::Array(Box::new(elem))))
            }
            syn::Type::Tuple(t) if t.elems.len() > MAX_TUPLE_ARITY => Ok(structural(TypeKind::Opaque)),
            syn::Type::Tuple(t) => {
                let elems = t
                    .elems
                    .iter()
                    .map(|e| self.describe(e, scope, true))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(structural(TypeKind::Tuple(elems)))
            }
            syn::Type::Reference(r) if r.mutability.is_some() => Ok(structural(TypeKind::Opaque)),
            syn::Type::Reference(r) => {
                let inner = self.describe(&r.elem, scope, false)?;
                if inner.key == "str" {
                    return Ok(structural(TypeKind::Textual));
                }
                Ok(structural(TypeKind::Reference(Box::new(inner))))
            }
            syn::Type::Path(tp) if tp.qself.is_none() => self.describe_path(ty, &tp.path, scope, by_value, &written),
            _ => Ok(structural(TypeKind::Opaque)),
        }
    }

    fn describe_path(
        &self,
        ty: &syn::Type,
        path: &syn::Path,
        scope: &Scope,
        by_value: bool,
        written: &str,
    ) -> Result<TypeDescriptor, GenerationError> {
        let resolved = scope.resolve_path(path, &self.index);
        let path_key = resolved.join("::");
        let last = path.segments.last();
        let args: Vec<&syn::Type> = last.map(|seg| type_args(&seg.arguments)).unwrap_or_default();

        if path_key == "str" && by_value {
            return Err(GenerationError::UnresolvableBaseType {
                wrapper: String::new(),
                base: written.to_string(),
                reason: "`str` is unsized; wrap `String` or `&str` instead".to_string(),
            });
        }

        let kind = match path_key.as_str() {
            p if INTEGERS.contains(&p) => TypeKind::Primitive(PrimitiveKind::Integer),
            p if FLOATS.contains(&p) => TypeKind::Primitive(PrimitiveKind::Float),
            "char" => TypeKind::Primitive(PrimitiveKind::Char),
            "Decimal" => TypeKind::Primitive(PrimitiveKind::Decimal),
            "bool" => TypeKind::Boolean,
            "String" | "str" => TypeKind::Textual,
            p if SHARED_POINTERS.contains(&p) && args.len() == 1 && is_str(args[0]) => TypeKind::Textual,
            "Option" | "Vec" | "Box" | "Rc" | "Arc" if args.len() == 1 => {
                let container = match path_key.as_str() {
                    "Option" => ContainerKind::Option,
                    "Vec" => ContainerKind::Vec,
                    "Box" => ContainerKind::Box,
                    _ => ContainerKind::Shared,
                };
                let inner = self.describe(args[0], scope, path_key != "Box" && path_key != "Rc" && path_key != "Arc")?;
                TypeKind::Container(container, Box::new(inner))
            }
            p => match self.declared.get(p) {
                Some(decl) if decl.fieldless_enum => TypeKind::Primitive(PrimitiveKind::Enum),
                Some(_) => TypeKind::Declared {
                    path: path_key.clone(),
                    args: args
                        .iter()
                        .map(|a| self.describe(a, scope, true))
                        .collect::<Result<Vec<_>, _>>()?,
                },
                None => TypeKind::Opaque,
            },
        };

        let namespace = if resolved.len() > 1 {
            ModulePath::from_segments(resolved[..resolved.len() - 1].iter().cloned())
        } else {
            ModulePath::none()
        };
        let name = match last {
            Some(seg) => render_type(&syn::Type::Path(syn::TypePath {
                qself: None,
                path: syn::Path::from(seg.clone()),
            })),
            None => written.to_string(),
        };

        Ok(TypeDescriptor {
            key: self.canonical_key(ty, scope),
            written: written.to_string(),
            name,
            namespace,
            kind,
        })
    }

    fn declared_interfaces(&self, path: &str, args: &[TypeDescriptor]) -> BTreeSet<InterfaceRef> {
        let Some(decl) = self.declared.get(path) else {
            return BTreeSet::new();
        };
        let arg_traits: Vec<BTreeSet<TraitId>> = args.iter().map(|a| self.closed_traits(a)).collect();
        let mut out: BTreeSet<InterfaceRef> = decl
            .derives
            .iter()
            .filter(|t| arg_traits.iter().all(|set| set.contains(t)))
            .map(|t| InterfaceRef::closed(*t))
            .collect();
        out.extend(decl.impls.iter().cloned());
        out
    }

    fn closed_traits(&self, ty: &TypeDescriptor) -> BTreeSet<TraitId> {
        self.list_interfaces(ty)
            .into_iter()
            .filter(|i| i.rhs.is_none())
            .map(|i| i.trait_id)
            .collect()
    }
}

impl SemanticModel for TypeCatalog {
    fn resolve_type(&self, ty: &syn::Type, scope: &Scope) -> Result<TypeDescriptor, GenerationError> {
        self.describe(ty, scope, true)
    }

    fn list_interfaces(&self, ty: &TypeDescriptor) -> BTreeSet<InterfaceRef> {
        let traits: BTreeSet<TraitId> = match &ty.kind {
            TypeKind::Primitive(PrimitiveKind::Float) => [
                TraitId::PartialEq,
                TraitId::PartialOrd,
                TraitId::Display,
                TraitId::Debug,
                TraitId::Clone,
                TraitId::Copy,
                TraitId::Default,
            ]
            .into_iter()
            .collect(),
            TypeKind::Primitive(PrimitiveKind::Enum) => return self.declared_interfaces(&ty.key, &[]),
            TypeKind::Primitive(_) | TypeKind::Boolean => TraitId::ALL.into_iter().collect(),
            TypeKind::Textual => TraitId::ALL
                .into_iter()
                .filter(|t| *t != TraitId::Copy || ty.key.starts_with('&'))
                .collect(),
            TypeKind::Tuple(elems) => intersect(ELEMENTWISE, elems.iter().map(|e| self.closed_traits(e))),
            TypeKind::Array(elem) => intersect(ELEMENTWISE, [self.closed_traits(elem)]),
            TypeKind::Reference(inner) => {
                let mut set = intersect(
                    &[
                        TraitId::PartialEq,
                        TraitId::Eq,
                        TraitId::PartialOrd,
                        TraitId::Ord,
                        TraitId::Hash,
                        TraitId::Display,
                        TraitId::Debug,
                    ],
                    [self.closed_traits(inner)],
                );
                set.extend([TraitId::Clone, TraitId::Copy]);
                set
            }
            TypeKind::Container(container, inner) => {
                let inner = self.closed_traits(inner);
                match container {
                    ContainerKind::Option => {
                        let mut set = intersect(&ELEMENTWISE[..8], [inner]);
                        set.insert(TraitId::Default);
                        set
                    }
                    ContainerKind::Vec => {
                        let mut set = intersect(&ELEMENTWISE[..7], [inner]);
                        set.insert(TraitId::Default);
                        set
                    }
                    ContainerKind::Box => intersect(
                        &[
                            TraitId::PartialEq,
                            TraitId::Eq,
                            TraitId::PartialOrd,
                            TraitId::Ord,
                            TraitId::Hash,
                            TraitId::Display,
                            TraitId::Debug,
                            TraitId::Clone,
                            TraitId::Default,
                        ],
                        [inner],
                    ),
                    ContainerKind::Shared => {
                        let mut set = intersect(
                            &[
                                TraitId::PartialEq,
                                TraitId::Eq,
                                TraitId::PartialOrd,
                                TraitId::Ord,
                                TraitId::Hash,
                                TraitId::Display,
                                TraitId::Debug,
                                TraitId::Default,
                            ],
                            [inner],
                        );
                        set.insert(TraitId::Clone);
                        set
                    }
                }
            }
            TypeKind::Declared { path, args } => return self.declared_interfaces(path, args),
            TypeKind::Opaque => BTreeSet::new(),
        };
        traits.into_iter().map(InterfaceRef::closed).collect()
    }
}

/// Traits from `candidates` that every component set contains.
fn intersect<I>(candidates: &[TraitId], components: I) -> BTreeSet<TraitId>
where
    I: IntoIterator<Item = BTreeSet<TraitId>>,
{
    let mut out: BTreeSet<TraitId> = candidates.iter().copied().collect();
    for set in components {
        out.retain(|t| set.contains(t));
    }
    out
}

/// Identify a std trait by its canonical path (`PartialEq`, `std::cmp::PartialEq`, `core::fmt::Display`).
pub fn std_trait(segments: &[String]) -> Option<TraitId> {
    match segments {
        [name] => TraitId::from_name(name),
        [root, module, name] if STD_ROOTS.contains(&root.as_str()) => {
            TraitId::from_name(name).filter(|t| t.home_module() == module)
        }
        _ => None,
    }
}

fn item_name(item: &syn::Item) -> Option<String> {
    let ident = match item {
        syn::Item::Struct(i) => &i.ident,
        syn::Item::Enum(i) => &i.ident,
        syn::Item::Union(i) => &i.ident,
        syn::Item::Type(i) => &i.ident,
        syn::Item::Trait(i) => &i.ident,
        syn::Item::Fn(i) => &i.sig.ident,
        syn::Item::Const(i) => &i.ident,
        syn::Item::Static(i) => &i.ident,
        _ => return None,
    };
    Some(ident.to_string())
}

fn type_params(generics: &syn::Generics) -> Vec<String> {
    generics.type_params().map(|p| p.ident.to_string()).collect()
}

/// Type arguments of a path segment (`Vec<u8>` -> `[u8]`), lifetimes and consts skipped.
pub fn type_args(arguments: &syn::PathArguments) -> Vec<&syn::Type> {
    match arguments {
        syn::PathArguments::AngleBracketed(args) => args
            .args
            .iter()
            .filter_map(|arg| match arg {
                syn::GenericArgument::Type(ty) => Some(ty),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

fn is_str(ty: &syn::Type) -> bool {
    matches!(ty, syn::Type::Path(tp) if tp.qself.is_none() && tp.path.is_ident("str"))
}

/// Rewrite every path in a type to its canonical absolute spelling and drop lifetimes.
struct Canonicalizer<'a> {
    scope: &'a Scope,
    index: &'a ItemIndex,
}

impl VisitMut for Canonicalizer<'_> {
    fn visit_type_path_mut(&mut self, tp: &mut syn::TypePath) {
        if tp.qself.is_none() {
            let resolved = self.scope.resolve_path(&tp.path, self.index);
            let arguments = tp
                .path
                .segments
                .last()
                .map(|seg| seg.arguments.clone())
                .unwrap_or(syn::PathArguments::None);
            let count = resolved.len();
            tp.path.leading_colon = None;
            tp.path.segments = resolved
                .iter()
                .enumerate()
                .map(|(i, name)| syn::PathSegment {
                    ident: ident(name),
                    arguments: if i + 1 == count {
                        arguments.clone()
                    } else {
                        syn::PathArguments::None
                    },
                })
                .collect();
        }
        visit_mut::visit_type_path_mut(self, tp);
    }

    fn visit_type_reference_mut(&mut self, r: &mut syn::TypeReference) {
        r.lifetime = None;
        visit_mut::visit_type_reference_mut(self, r);
    }

    fn visit_generic_argument_mut(&mut self, arg: &mut syn::GenericArgument) {
        if let syn::GenericArgument::Type(ty) = arg {
            self.visit_type_mut(ty);
        }
    }
}

fn ident(name: &str) -> syn::Ident {
    match name.strip_prefix("r#") {
        Some(raw) => syn::Ident::new_raw(raw, proc_macro2::Span::call_site()),
        None => syn::Ident::new(name, proc_macro2::Span::call_site()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semantic::Operator;

    fn catalog(source: &str) -> (TypeCatalog, Scope) {
        let compilation = Compilation::single("lib.rs", "crate", source).unwrap();
        let catalog = TypeCatalog::build(&compilation, false);
        let scope = catalog.scope_for(&ModulePath::crate_root());
        (catalog, scope)
    }

    fn resolve(catalog: &TypeCatalog, scope: &Scope, ty: &str) -> TypeDescriptor {
        catalog.resolve_type(&syn::parse_str(ty).unwrap(), scope).unwrap()
    }

    #[test]
    fn test_std_aliases_share_a_key() {
        let (catalog, scope) = catalog("");
        let a = resolve(&catalog, &scope, "String");
        let b = resolve(&catalog, &scope, "::std::string::String");
        assert_eq!(a.key, b.key);
        assert_eq!(a.kind, TypeKind::Textual);
    }

    #[test]
    fn test_reference_to_str_is_textual_and_lifetime_free() {
        let (catalog, scope) = catalog("");
        let desc = resolve(&catalog, &scope, "&'static str");
        assert_eq!(desc.kind, TypeKind::Textual);
        assert_eq!(desc.key, "&str");
        assert!(
            catalog
                .list_interfaces(&desc)
                .contains(&InterfaceRef::closed(TraitId::Copy))
        );
    }

    #[test]
    fn test_bare_str_is_rejected() {
        let (catalog, scope) = catalog("");
        let err = catalog
            .resolve_type(&syn::parse_str("str").unwrap(), &scope)
            .unwrap_err();
        assert!(matches!(err, GenerationError::UnresolvableBaseType { .. }));
    }

    #[test]
    fn test_derives_feed_interfaces() {
        let (catalog, scope) = catalog("#[derive(Debug, Clone, PartialEq)] pub struct Person { name: String }");
        let desc = resolve(&catalog, &scope, "Person");
        assert_eq!(desc.key, "crate::Person");
        let interfaces = catalog.list_interfaces(&desc);
        assert!(interfaces.contains(&InterfaceRef::closed(TraitId::PartialEq)));
        assert!(!interfaces.contains(&InterfaceRef::closed(TraitId::Eq)));
        let ops = catalog.list_operators(&desc);
        assert!(ops.contains(&Operator::Eq) && ops.contains(&Operator::Ne));
        assert!(!ops.contains(&Operator::Lt));
    }

    #[test]
    fn test_cross_type_impl_is_not_self_equatable() {
        let (catalog, scope) = catalog(
            r#"
            pub struct Meters(f64);
            impl PartialEq<f64> for Meters { fn eq(&self, other: &f64) -> bool { self.0 == *other } }
            impl std::cmp::PartialOrd<Self> for Meters {
                fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> { self.0.partial_cmp(&other.0) }
            }
            "#,
        );
        let desc = resolve(&catalog, &scope, "Meters");
        let interfaces = catalog.list_interfaces(&desc);
        assert!(interfaces.contains(&InterfaceRef::with_rhs(TraitId::PartialEq, "f64")));
        assert!(!interfaces.contains(&InterfaceRef::closed(TraitId::PartialEq)));
        assert!(interfaces.contains(&InterfaceRef::closed(TraitId::PartialOrd)));
    }

    #[test]
    fn test_fieldless_enum_is_primitive_like() {
        let (catalog, scope) = catalog("#[derive(PartialEq, Eq)] enum Color { Red, Green }");
        let desc = resolve(&catalog, &scope, "Color");
        assert_eq!(desc.kind, TypeKind::Primitive(PrimitiveKind::Enum));
        assert!(
            catalog
                .list_interfaces(&desc)
                .contains(&InterfaceRef::closed(TraitId::Eq))
        );
    }

    #[test]
    fn test_tuple_intersects_components() {
        let (catalog, scope) = catalog("");
        let desc = resolve(&catalog, &scope, "(i32, f64)");
        let interfaces = catalog.list_interfaces(&desc);
        assert!(interfaces.contains(&InterfaceRef::closed(TraitId::PartialOrd)));
        assert!(!interfaces.contains(&InterfaceRef::closed(TraitId::Ord)));
        assert!(!interfaces.contains(&InterfaceRef::closed(TraitId::Display)));
    }

    #[test]
    fn test_generic_declared_type_needs_bounded_args() {
        let (catalog, scope) = catalog("#[derive(PartialEq, Eq, Hash)] pub struct Pair<T> { a: T, b: T }");
        let ints = resolve(&catalog, &scope, "Pair<i32>");
        let floats = resolve(&catalog, &scope, "Pair<f32>");
        assert!(
            catalog
                .list_interfaces(&ints)
                .contains(&InterfaceRef::closed(TraitId::Eq))
        );
        let float_traits = catalog.list_interfaces(&floats);
        assert!(float_traits.contains(&InterfaceRef::closed(TraitId::PartialEq)));
        assert!(!float_traits.contains(&InterfaceRef::closed(TraitId::Eq)));
    }

    #[test]
    fn test_unknown_type_is_opaque() {
        let (catalog, scope) = catalog("");
        let desc = resolve(&catalog, &scope, "chrono::NaiveDate");
        assert_eq!(desc.kind, TypeKind::Opaque);
        assert_eq!(desc.namespace.to_string(), "chrono");
        assert!(catalog.list_interfaces(&desc).is_empty());
    }

    #[test]
    fn test_std_trait_paths() {
        let segs = |s: &str| s.split("::").map(str::to_string).collect::<Vec<_>>();
        assert_eq!(std_trait(&segs("core::fmt::Display")), Some(TraitId::Display));
        assert_eq!(std_trait(&segs("std::fmt::PartialEq")), None);
        assert_eq!(std_trait(&segs("mycrate::Hash")), None);
    }
}
