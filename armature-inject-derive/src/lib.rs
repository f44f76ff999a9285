//! Derive macros for armature-inject
//!
//! Provides `#[derive(InjectTarget)]`, which generates the injection metadata
//! the engine needs: the list of injection points, a bare constructor, and a
//! field-name based assignment method.
//!
//! # Example
//!
//! ```rust,ignore
//! use armature_inject::{InjectTarget, Injector};
//! use std::sync::Arc;
//!
//! #[derive(Clone)]
//! struct Database {
//!     url: String,
//! }
//!
//! #[derive(Clone)]
//! struct Cache {
//!     size: usize,
//! }
//!
//! #[derive(InjectTarget)]
//! struct UserService {
//!     #[inject]
//!     db: Option<Arc<Database>>,
//!     #[inject(name = "hot")]
//!     cache: Option<Arc<Cache>>,
//!     // Non-injected fields use Default
//!     request_count: u64,
//! }
//!
//! let injector = Injector::new();
//! injector.map_value(Database { url: "postgres://localhost".into() });
//! injector.map_value_named("hot", Cache { size: 1024 });
//!
//! let service = injector.instantiate::<UserService>().unwrap();
//! ```

use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, Attribute, Data, DeriveInput, Fields, LitStr, Type};

/// Derive macro for the `InjectTarget` trait.
///
/// # Field attributes
///
/// - `#[inject]` - Required injection point. The field type must be
///   `Option<Arc<T>>`; the engine fills it with `Some(Arc<T>)`.
/// - `#[inject(name = "...")]` - Injection point for a named request.
/// - `#[inject(optional)]` - Optional point: skipped instead of failing when
///   the request is unmapped.
///
/// Attribute arguments combine: `#[inject(optional, name = "hot")]`.
/// Fields without `#[inject]` are initialized with `Default::default()`.
///
/// # Struct attributes
///
/// - `#[inject_target(post_construct = "method")]` - Invoke the named
///   `&mut self` method once after all points have been applied.
///
/// # Generated code
///
/// ```rust,ignore
/// #[derive(InjectTarget)]
/// #[inject_target(post_construct = "connect")]
/// struct Worker {
///     #[inject]
///     db: Option<Arc<Database>>,
/// }
///
/// // impl InjectTarget for Worker {
/// //     fn injection_points() -> Vec<InjectionPoint> {
/// //         vec![InjectionPoint::required::<Database>("db")]
/// //     }
/// //     fn construct_bare() -> Self {
/// //         Self { db: None }
/// //     }
/// //     fn assign(&mut self, field, value) -> Result<()> { ... }
/// //     fn post_construct(&mut self) {
/// //         self.connect();
/// //     }
/// // }
/// ```
#[proc_macro_derive(InjectTarget, attributes(inject, inject_target))]
pub fn derive_inject_target(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let name = &input.ident;
    let generics = &input.generics;
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    // Only support structs with named fields
    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return syn::Error::new_spanned(
                    &input,
                    "InjectTarget can only be derived for structs with named fields",
                )
                .to_compile_error()
                .into();
            }
        },
        _ => {
            return syn::Error::new_spanned(&input, "InjectTarget can only be derived for structs")
                .to_compile_error()
                .into();
        }
    };

    let post_construct = match find_post_construct(&input.attrs) {
        Ok(method) => method,
        Err(err) => return err.to_compile_error().into(),
    };

    let mut points = Vec::new();
    let mut bare_inits = Vec::new();
    let mut assign_arms = Vec::new();

    for field in fields.iter() {
        let field_name = field.ident.as_ref().unwrap();
        let field_type = &field.ty;
        let field_str = field_name.to_string();

        let inject_attr = match find_inject_attr(&field.attrs) {
            Ok(attr) => attr,
            Err(err) => return err.to_compile_error().into(),
        };

        let Some(inject) = inject_attr else {
            // Non-injected field - use Default
            bare_inits.push(quote! {
                #field_name: ::std::default::Default::default()
            });
            continue;
        };

        // Injection points are filled after construction, so the field must
        // be able to hold "not injected yet"
        let Some(inner_type) = extract_option_arc_inner_type(field_type) else {
            return syn::Error::new_spanned(
                field_type,
                "Fields marked with #[inject] must have type Option<Arc<T>>",
            )
            .to_compile_error()
            .into();
        };

        points.push(match (&inject.name, inject.optional) {
            (None, false) => quote! {
                ::armature_inject::InjectionPoint::required::<#inner_type>(#field_str)
            },
            (Some(name), false) => quote! {
                ::armature_inject::InjectionPoint::named::<#inner_type>(#field_str, #name)
            },
            (None, true) => quote! {
                ::armature_inject::InjectionPoint::optional::<#inner_type>(#field_str)
            },
            (Some(name), true) => quote! {
                ::armature_inject::InjectionPoint::optional_named::<#inner_type>(#field_str, #name)
            },
        });

        bare_inits.push(quote! {
            #field_name: ::std::option::Option::None
        });

        assign_arms.push(quote! {
            #field_str => {
                self.#field_name = ::std::option::Option::Some(
                    value.downcast::<#inner_type>().map_err(|_| {
                        ::armature_inject::InjectorError::TypeMismatch {
                            expected: ::std::any::type_name::<#inner_type>(),
                            key_type: ::std::any::type_name::<#inner_type>(),
                        }
                    })?,
                );
                ::std::result::Result::Ok(())
            }
        });
    }

    let post_construct_impl = post_construct.map(|method| {
        quote! {
            fn post_construct(&mut self) {
                self.#method();
            }
        }
    });

    let expanded = quote! {
        impl #impl_generics ::armature_inject::InjectTarget for #name #ty_generics #where_clause {
            fn injection_points() -> ::std::vec::Vec<::armature_inject::InjectionPoint> {
                ::std::vec![#(#points),*]
            }

            fn construct_bare() -> Self {
                Self {
                    #(#bare_inits),*
                }
            }

            fn assign(
                &mut self,
                field: &'static str,
                value: ::armature_inject::SharedValue,
            ) -> ::armature_inject::Result<()> {
                match field {
                    #(#assign_arms)*
                    other => ::std::result::Result::Err(
                        ::armature_inject::InjectorError::UnknownField {
                            target: ::std::any::type_name::<Self>(),
                            field: other.to_string(),
                        },
                    ),
                }
            }

            #post_construct_impl
        }
    };

    TokenStream::from(expanded)
}

/// Parsed #[inject] attribute arguments
struct InjectArgs {
    name: Option<LitStr>,
    optional: bool,
}

/// Find and parse the #[inject] attribute on a field
fn find_inject_attr(attrs: &[Attribute]) -> syn::Result<Option<InjectArgs>> {
    for attr in attrs {
        if !attr.path().is_ident("inject") {
            continue;
        }

        let mut args = InjectArgs {
            name: None,
            optional: false,
        };

        // Bare #[inject] is a required unnamed point
        if attr.meta.require_path_only().is_ok() {
            return Ok(Some(args));
        }

        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("optional") {
                args.optional = true;
                Ok(())
            } else if meta.path.is_ident("name") {
                args.name = Some(meta.value()?.parse()?);
                Ok(())
            } else {
                Err(meta.error("expected `optional` or `name = \"...\"`"))
            }
        })?;

        return Ok(Some(args));
    }
    Ok(None)
}

/// Find the struct-level #[inject_target(post_construct = "...")] attribute
fn find_post_construct(attrs: &[Attribute]) -> syn::Result<Option<syn::Ident>> {
    for attr in attrs {
        if !attr.path().is_ident("inject_target") {
            continue;
        }

        let mut method = None;
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("post_construct") {
                let lit: LitStr = meta.value()?.parse()?;
                method = Some(syn::Ident::new(&lit.value(), lit.span()));
                Ok(())
            } else {
                Err(meta.error("expected `post_construct = \"...\"`"))
            }
        })?;

        return Ok(method);
    }
    Ok(None)
}

/// Extract T from Arc<T>
fn extract_arc_inner_type(ty: &Type) -> Option<&Type> {
    if let Type::Path(type_path) = ty {
        let segment = type_path.path.segments.last()?;
        if segment.ident == "Arc" {
            if let syn::PathArguments::AngleBracketed(args) = &segment.arguments {
                if let Some(syn::GenericArgument::Type(inner)) = args.args.first() {
                    return Some(inner);
                }
            }
        }
    }
    None
}

/// Extract T from Option<Arc<T>>
fn extract_option_arc_inner_type(ty: &Type) -> Option<&Type> {
    if let Type::Path(type_path) = ty {
        let segment = type_path.path.segments.last()?;
        if segment.ident == "Option" {
            if let syn::PathArguments::AngleBracketed(args) = &segment.arguments {
                if let Some(syn::GenericArgument::Type(inner)) = args.args.first() {
                    return extract_arc_inner_type(inner);
                }
            }
        }
    }
    None
}
