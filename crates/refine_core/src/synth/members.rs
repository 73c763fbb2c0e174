//! Token emission for individual wrapper members.
//!
//! Generated code only uses absolute paths (`::core::...`, `::refine::...`) so it compiles regardless of what the
//! surrounding module imports.

use proc_macro2::TokenStream;
use quote::{format_ident, quote};

use super::plan::{Conversion, DisplayVia, EqualityVia, MemberPlan};
use crate::hooks::HookSet;
use crate::semantic::Operator;

/// Names and types shared by every member emitter.
pub struct EmitContext {
    pub wrapper: syn::Ident,
    pub base: syn::Type,
    pub hooks: HookSet,
}

impl EmitContext {
    /// `let value = <Self as Transformer<B>>::transform(value);` when a transform hook exists.
    fn transform_step(&self) -> TokenStream {
        let base = &self.base;
        if self.hooks.transform {
            quote! { let value = <Self as ::refine::Transformer<#base>>::transform(value); }
        } else {
            TokenStream::new()
        }
    }
}

pub fn storage(ctx: &EmitContext, plan: &MemberPlan, vis: &TokenStream, attrs: &[TokenStream]) -> TokenStream {
    let EmitContext { wrapper, base, .. } = ctx;
    let derives: Vec<syn::Ident> = plan.derives.iter().map(|t| format_ident!("{}", t.name())).collect();
    let derive_attr = if derives.is_empty() {
        TokenStream::new()
    } else {
        quote! { #[derive(#(#derives),*)] }
    };
    quote! {
        #(#attrs)*
        #derive_attr
        #vis struct #wrapper {
            value: #base,
        }
    }
}

pub fn inherent(ctx: &EmitContext, plan: &MemberPlan) -> TokenStream {
    let EmitContext { wrapper, base, hooks } = ctx;
    let transform = ctx.transform_step();

    let validate_call = if hooks.validate {
        quote! { <Self as ::refine::Validator<#base>>::validate(&value)?; }
    } else if plan.synthetic_validate {
        quote! { Self::validate(&value)?; }
    } else {
        TokenStream::new()
    };

    let synthetic_validate = if plan.synthetic_validate {
        quote! {
            fn validate(value: &#base) -> ::core::result::Result<(), ::refine::RefineError> {
                if <Self as ::refine::FallibleValidator<#base>>::try_validate(value) {
                    ::core::result::Result::Ok(())
                } else {
                    ::core::result::Result::Err(::refine::RefineError::rejected::<Self>())
                }
            }
        }
    } else {
        TokenStream::new()
    };

    let try_create = if plan.try_create {
        let also_validate = if hooks.validate {
            quote! {
                if <Self as ::refine::Validator<#base>>::validate(&value).is_err() {
                    return ::core::option::Option::None;
                }
            }
        } else {
            TokenStream::new()
        };
        quote! {
            /// Builds the wrapper, returning `None` instead of an error when validation fails.
            pub fn try_create(value: #base) -> ::core::option::Option<Self> {
                #transform
                if !<Self as ::refine::FallibleValidator<#base>>::try_validate(&value) {
                    return ::core::option::Option::None;
                }
                #also_validate
                ::core::option::Option::Some(Self { value })
            }
        }
    } else {
        TokenStream::new()
    };

    quote! {
        impl #wrapper {
            /// Builds the wrapper, applying the transform hook and then validation.
            pub fn create(value: #base) -> ::core::result::Result<Self, ::refine::RefineError> {
                #transform
                #validate_call
                ::core::result::Result::Ok(Self { value })
            }

            #try_create

            #synthetic_validate

            /// The wrapped value.
            pub fn value(&self) -> &#base {
                &self.value
            }

            pub fn into_value(self) -> #base {
                self.value
            }
        }
    }
}

pub fn display(ctx: &EmitContext, via: DisplayVia) -> TokenStream {
    let wrapper = &ctx.wrapper;
    let delegate = match via {
        DisplayVia::Display => quote! { ::core::fmt::Display::fmt(&self.value, f) },
        DisplayVia::Debug => quote! { ::core::fmt::Debug::fmt(&self.value, f) },
    };
    quote! {
        impl ::core::fmt::Display for #wrapper {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                #delegate
            }
        }
    }
}

pub fn equality(ctx: &EmitContext, plan: &MemberPlan, via: EqualityVia) -> TokenStream {
    let wrapper = &ctx.wrapper;
    let compare = match via {
        EqualityVia::Direct => quote! { self.value == other.value },
        EqualityVia::Structural => quote! { ::refine::structural_eq(&self.value, &other.value) },
    };
    let hash = if plan.hash {
        quote! {
            impl ::core::hash::Hash for #wrapper {
                fn hash<H: ::core::hash::Hasher>(&self, state: &mut H) {
                    ::core::hash::Hash::hash(&self.value, state);
                }
            }
        }
    } else {
        TokenStream::new()
    };
    let eq = if plan.eq {
        quote! { impl ::core::cmp::Eq for #wrapper {} }
    } else {
        TokenStream::new()
    };
    quote! {
        impl ::core::cmp::PartialEq for #wrapper {
            fn eq(&self, other: &Self) -> bool {
                #compare
            }
        }
        #eq
        #hash
    }
}

pub fn ordering(ctx: &EmitContext, plan: &MemberPlan, via: EqualityVia) -> TokenStream {
    let wrapper = &ctx.wrapper;
    if plan.ord {
        return quote! {
            impl ::core::cmp::PartialOrd for #wrapper {
                fn partial_cmp(&self, other: &Self) -> ::core::option::Option<::core::cmp::Ordering> {
                    ::core::option::Option::Some(::core::cmp::Ord::cmp(self, other))
                }
            }

            impl ::core::cmp::Ord for #wrapper {
                fn cmp(&self, other: &Self) -> ::core::cmp::Ordering {
                    ::core::cmp::Ord::cmp(&self.value, &other.value)
                }
            }
        };
    }
    let body = match via {
        EqualityVia::Direct => quote! { ::core::cmp::PartialOrd::partial_cmp(&self.value, &other.value) },
        // keep `partial_cmp == Some(Equal)` in step with the structural `eq`
        EqualityVia::Structural => quote! {
            if ::refine::structural_eq(&self.value, &other.value) {
                ::core::option::Option::Some(::core::cmp::Ordering::Equal)
            } else {
                ::core::cmp::PartialOrd::partial_cmp(&self.value, &other.value)
            }
        },
    };
    quote! {
        impl ::core::cmp::PartialOrd for #wrapper {
            fn partial_cmp(&self, other: &Self) -> ::core::option::Option<::core::cmp::Ordering> {
                #body
            }
        }
    }
}

/// `PartialEq<B> for W` and `PartialEq<W> for B`.
pub fn cross_equality(ctx: &EmitContext, explicit_ne: bool) -> TokenStream {
    let EmitContext { wrapper, base, .. } = ctx;
    let (forward_ne, backward_ne) = if explicit_ne {
        (
            quote! {
                fn ne(&self, other: &#base) -> bool {
                    self.value != *other
                }
            },
            quote! {
                fn ne(&self, other: &#wrapper) -> bool {
                    *self != other.value
                }
            },
        )
    } else {
        (TokenStream::new(), TokenStream::new())
    };
    quote! {
        impl ::core::cmp::PartialEq<#base> for #wrapper {
            fn eq(&self, other: &#base) -> bool {
                self.value == *other
            }
            #forward_ne
        }

        impl ::core::cmp::PartialEq<#wrapper> for #base {
            fn eq(&self, other: &#wrapper) -> bool {
                *self == other.value
            }
            #backward_ne
        }
    }
}

/// `PartialOrd<B> for W` and `PartialOrd<W> for B`, with one method per supported operator.
pub fn cross_ordering(ctx: &EmitContext, operators: &[Operator]) -> TokenStream {
    let EmitContext { wrapper, base, .. } = ctx;
    let forward = operators.iter().map(|op| {
        let method = format_ident!("{}", op.method_name());
        quote! {
            fn #method(&self, other: &#base) -> bool {
                ::core::cmp::PartialOrd::#method(&self.value, other)
            }
        }
    });
    let backward = operators.iter().map(|op| {
        let method = format_ident!("{}", op.method_name());
        quote! {
            fn #method(&self, other: &#wrapper) -> bool {
                ::core::cmp::PartialOrd::#method(self, &other.value)
            }
        }
    });
    quote! {
        impl ::core::cmp::PartialOrd<#base> for #wrapper {
            fn partial_cmp(&self, other: &#base) -> ::core::option::Option<::core::cmp::Ordering> {
                ::core::cmp::PartialOrd::partial_cmp(&self.value, other)
            }
            #(#forward)*
        }

        impl ::core::cmp::PartialOrd<#wrapper> for #base {
            fn partial_cmp(&self, other: &#wrapper) -> ::core::option::Option<::core::cmp::Ordering> {
                ::core::cmp::PartialOrd::partial_cmp(self, &other.value)
            }
            #(#backward)*
        }
    }
}

pub fn conversion(ctx: &EmitContext, conversion: Conversion) -> TokenStream {
    let EmitContext { wrapper, base, .. } = ctx;
    let into_base = quote! {
        impl ::core::convert::From<#wrapper> for #base {
            fn from(wrapper: #wrapper) -> Self {
                wrapper.value
            }
        }
    };
    let try_from = quote! {
        impl ::core::convert::TryFrom<#base> for #wrapper {
            type Error = ::refine::RefineError;

            fn try_from(value: #base) -> ::core::result::Result<Self, Self::Error> {
                Self::create(value)
            }
        }
    };
    let borrow = quote! {
        impl ::core::ops::Deref for #wrapper {
            type Target = #base;

            fn deref(&self) -> &Self::Target {
                &self.value
            }
        }

        impl ::core::convert::AsRef<#base> for #wrapper {
            fn as_ref(&self) -> &#base {
                &self.value
            }
        }
    };
    match conversion {
        Conversion::Explicit => quote! { #try_from #into_base },
        Conversion::ImplicitFallible => quote! { #try_from #into_base #borrow },
        Conversion::Implicit => {
            let transform = ctx.transform_step();
            quote! {
                impl ::core::convert::From<#base> for #wrapper {
                    fn from(value: #base) -> Self {
                        #transform
                        Self { value }
                    }
                }
                #into_base
                #borrow
            }
        }
    }
}

