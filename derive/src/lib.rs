//! # Storefront Derive Macros
//!
//! This crate provides the `Ordered` derive macro for the storefront library.
//!
//! ## Ordered Derive Macro
//!
//! `Ordered` implements `storefront::Ordered` for a write-side row that carries an
//! `order: Option<Order>` field.  The order is unique among rows sharing the field named by
//! `unique_for`, and the macro refuses to compile when that field is missing:
//!
//! ```ignore
//! use storefront::{Order, Ordered, ProductId};
//!
//! #[derive(storefront_derive::Ordered)]
//! #[ordered(unique_for = "product_id")]
//! struct NewLine {
//!     product_id: ProductId,
//!     order: Option<Order>,
//! }
//! ```
//!
//! The order field defaults to `order`; `#[ordered(unique_for = "...", field = "position")]`
//! names another one.
//!
//! ## Definition Errors
//!
//! - no `unique_for` option: "Ordered must define a `unique_for` attribute"
//! - `unique_for` names no field of the struct: "`unique_for` does not match an existing field"
//! - the order field is absent: "ordering field does not match an existing field"

#![recursion_limit = "128"]

extern crate proc_macro;
#[macro_use]
extern crate quote;
extern crate syn;

use proc_macro2::{Span, TokenStream};
use syn::{DeriveInput, parse_macro_input};

use derive_util::StructVisitor;

/// Derive the Ordered trait for structs with named fields.
#[proc_macro_derive(Ordered, attributes(ordered))]
pub fn derive_ordered(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand_ordered(&input) {
        Ok(generated) => generated.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand_ordered(input: &DeriveInput) -> Result<TokenStream, syn::Error> {
    let ty_name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let options = OrderedOptions::from_attributes(&input.attrs, ty_name)?;

    let ds = match &input.data {
        syn::Data::Struct(ds) if matches!(ds.fields, syn::Fields::Named(_)) => ds,
        _ => {
            return Err(syn::Error::new_spanned(
                ty_name,
                "Ordered can only be derived for structs with named fields",
            ));
        }
    };
    let mut visitor = OrderedStructVisitor { options: &options };
    let OrderedFields { parent, order } = visitor.visit_struct(ty_name, ds);
    let (parent_ident, parent_ty) = parent.ok_or_else(|| {
        syn::Error::new_spanned(
            &options.unique_for,
            "`unique_for` does not match an existing field",
        )
    })?;
    let order_ident = order.ok_or_else(|| {
        syn::Error::new_spanned(
            &options.field,
            "ordering field does not match an existing field",
        )
    })?;
    let unique_for = options.unique_for.value();

    Ok(quote! {
        impl #impl_generics storefront::Ordered for #ty_name #ty_generics #where_clause {
            type Parent = #parent_ty;

            const UNIQUE_FOR_FIELD: &'static str = #unique_for;

            fn parent_key(&self) -> &Self::Parent {
                &self.#parent_ident
            }

            fn order(&self) -> Option<storefront::Order> {
                self.#order_ident
            }

            fn set_order(&mut self, order: storefront::Order) {
                self.#order_ident = Some(order);
            }
        }
    })
}

////////////////////////////////////////////// OrderedOptions //////////////////////////////////////////////

struct OrderedOptions {
    unique_for: syn::LitStr,
    field: syn::LitStr,
}

impl OrderedOptions {
    fn from_attributes(attrs: &[syn::Attribute], ty_name: &syn::Ident) -> Result<Self, syn::Error> {
        let mut unique_for = None;
        let mut field = None;
        for attr in attrs.iter().filter(|attr| attr.path.is_ident("ordered")) {
            let list = match attr.parse_meta()? {
                syn::Meta::List(list) => list,
                other => {
                    return Err(syn::Error::new_spanned(
                        other,
                        "expected #[ordered(unique_for = \"field\")]",
                    ));
                }
            };
            for nested in list.nested.iter() {
                let nv = match nested {
                    syn::NestedMeta::Meta(syn::Meta::NameValue(nv)) => nv,
                    other => {
                        return Err(syn::Error::new_spanned(
                            other,
                            "expected `name = \"value\"` inside #[ordered(...)]",
                        ));
                    }
                };
                let value = match &nv.lit {
                    syn::Lit::Str(value) => value.clone(),
                    other => {
                        return Err(syn::Error::new_spanned(other, "expected a string literal"));
                    }
                };
                if nv.path.is_ident("unique_for") {
                    unique_for = Some(value);
                } else if nv.path.is_ident("field") {
                    field = Some(value);
                } else {
                    return Err(syn::Error::new_spanned(&nv.path, "unknown ordered option"));
                }
            }
        }
        let unique_for = unique_for.ok_or_else(|| {
            syn::Error::new_spanned(ty_name, "Ordered must define a `unique_for` attribute")
        })?;
        let field = field.unwrap_or_else(|| syn::LitStr::new("order", Span::call_site()));
        Ok(Self { unique_for, field })
    }
}

/////////////////////////////////////////// OrderedStructVisitor ///////////////////////////////////////////

#[derive(Default)]
struct OrderedFields {
    parent: Option<(syn::Ident, syn::Type)>,
    order: Option<syn::Ident>,
}

struct OrderedStructVisitor<'a> {
    options: &'a OrderedOptions,
}

impl StructVisitor for OrderedStructVisitor<'_> {
    type Output = OrderedFields;

    fn visit_struct_named_fields(
        &mut self,
        _ty_name: &syn::Ident,
        _ds: &syn::DataStruct,
        fields: &syn::FieldsNamed,
    ) -> Self::Output {
        let unique_for = self.options.unique_for.value();
        let order_field = self.options.field.value();
        let mut found = OrderedFields::default();
        for field in fields.named.iter() {
            if let Some(field_ident) = &field.ident {
                let name = field_ident.to_string();
                let name = name.strip_prefix("r#").unwrap_or(&name);
                if name == unique_for {
                    found.parent = Some((field_ident.clone(), field.ty.clone()));
                }
                if name == order_field {
                    found.order = Some(field_ident.clone());
                }
            }
        }
        found
    }
}
