//! Derive macros for querykit models.
//!
//! This crate provides the `#[derive(Model)]` macro, which implements
//! `querykit::Model` and `querykit::Record` for a struct and generates a typed
//! `Attribute` accessor for every field.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{parse_macro_input, Attribute, Data, DeriveInput, Fields, Ident, LitStr, Meta, Type};

/// Derives `Model` and `Record` for a struct with named fields.
///
/// # Attributes
///
/// - `#[model(entity = "Name")]` - Entity name used in fetch requests
///   (optional, defaults to the struct name)
/// - `#[model(rename_all = "camelCase")]` - Derives attribute names from
///   field names in camelCase instead of verbatim
///
/// # Field Attributes
///
/// - `#[attribute(name = "key")]` - Attribute name (optional, defaults to the
///   field name)
/// - `#[attribute(relation)]` - The field is a to-one relation to another
///   `Model + Record`; key paths are followed through it
/// - `#[attribute(to_many)]` - The field is a `Vec` (or other
///   `querykit::Collection`) of `Model + Record`s; supports `@count` and the
///   other collection operators
/// - `#[attribute(skip)]` - The field is not an attribute
///
/// Plain fields must implement `querykit::ToValue` and `Clone`.
///
/// # Generated Items
///
/// For a struct `Person` with a field `age: i64`, this macro generates:
///
/// - `impl querykit::Model for Person`
/// - `impl querykit::Record for Person`
/// - `Person::age() -> querykit::Attribute<i64>`
#[proc_macro_derive(Model, attributes(model, attribute))]
pub fn derive_model(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    derive_model_impl(&input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}

fn derive_model_impl(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let struct_name = &input.ident;
    let model_attrs = parse_model_attrs(&input.attrs)?;
    let entity_name = model_attrs
        .entity
        .unwrap_or_else(|| struct_name.to_string());

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    input,
                    "Model derive only supports structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                input,
                "Model derive only supports structs",
            ));
        }
    };

    let mut attribute_infos: Vec<AttributeInfo> = Vec::new();
    for field in fields {
        let Some(field_name) = field.ident.clone() else {
            continue;
        };
        let field_attrs = parse_field_attrs(&field.attrs)?;
        if field_attrs.skip {
            continue;
        }
        let kind = match (field_attrs.relation, field_attrs.to_many) {
            (true, true) => {
                return Err(syn::Error::new_spanned(
                    field,
                    "an attribute cannot be both `relation` and `to_many`",
                ));
            }
            (true, false) => AttributeKind::Relation,
            (false, true) => AttributeKind::ToMany,
            (false, false) => AttributeKind::Value,
        };
        let attribute_name = field_attrs.name.unwrap_or_else(|| {
            if model_attrs.camel_case {
                to_camel_case(&field_name.to_string())
            } else {
                field_name.to_string()
            }
        });
        attribute_infos.push(AttributeInfo {
            field_name,
            field_type: field.ty.clone(),
            attribute_name,
            kind,
        });
    }

    let all_attribute_names: Vec<&str> = attribute_infos
        .iter()
        .map(|a| a.attribute_name.as_str())
        .collect();

    let value_arms = attribute_infos
        .iter()
        .filter(|a| a.kind == AttributeKind::Value)
        .map(|a| {
            let key = &a.attribute_name;
            let field = &a.field_name;
            quote! {
                #key => ::core::option::Option::Some(::querykit::ToValue::to_value(
                    ::core::clone::Clone::clone(&self.#field),
                )),
            }
        });

    let relation_arms = attribute_infos
        .iter()
        .filter(|a| a.kind == AttributeKind::Relation)
        .map(|a| {
            let key = &a.attribute_name;
            let field = &a.field_name;
            quote! {
                #key => ::core::option::Option::Some(&self.#field),
            }
        });

    let to_many_arms = attribute_infos
        .iter()
        .filter(|a| a.kind == AttributeKind::ToMany)
        .map(|a| {
            let key = &a.attribute_name;
            let field = &a.field_name;
            quote! {
                #key => ::core::option::Option::Some(
                    self.#field
                        .iter()
                        .map(|record| record as &dyn ::querykit::Record)
                        .collect(),
                ),
            }
        });

    let relationship_arms = attribute_infos.iter().filter_map(|a| {
        let key = &a.attribute_name;
        let field_type = &a.field_type;
        match a.kind {
            AttributeKind::Value => None,
            AttributeKind::Relation => Some(quote! {
                #key => ::core::option::Option::Some(::querykit::Relationship::ToOne(
                    ::querykit::Schema::of::<#field_type>(),
                )),
            }),
            AttributeKind::ToMany => Some(quote! {
                #key => ::core::option::Option::Some(::querykit::Relationship::ToMany(
                    ::querykit::Schema::of::<
                        <#field_type as ::querykit::Collection>::Element,
                    >(),
                )),
            }),
        }
    });

    let accessors = attribute_infos.iter().map(|a| {
        let method_name = &a.field_name;
        let field_type = &a.field_type;
        let key = &a.attribute_name;
        let doc = format!("Returns the `{key}` attribute for building predicates.");
        quote! {
            #[doc = #doc]
            #[must_use]
            pub fn #method_name() -> ::querykit::Attribute<#field_type> {
                ::querykit::Attribute::new(#key)
            }
        }
    });

    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::querykit::Model for #struct_name #ty_generics #where_clause {
            const ENTITY_NAME: &'static str = #entity_name;
            const ATTRIBUTE_NAMES: &'static [&'static str] = &[#(#all_attribute_names),*];

            fn relationship(
                key: &str,
            ) -> ::core::option::Option<::querykit::Relationship> {
                match key {
                    #(#relationship_arms)*
                    _ => ::core::option::Option::None,
                }
            }
        }

        impl #impl_generics ::querykit::Record for #struct_name #ty_generics #where_clause {
            fn value_for_key(
                &self,
                key: &str,
            ) -> ::core::option::Option<::querykit::Value> {
                match key {
                    #(#value_arms)*
                    _ => ::core::option::Option::None,
                }
            }

            fn record_for_key(
                &self,
                key: &str,
            ) -> ::core::option::Option<&dyn ::querykit::Record> {
                match key {
                    #(#relation_arms)*
                    _ => ::core::option::Option::None,
                }
            }

            fn records_for_key(
                &self,
                key: &str,
            ) -> ::core::option::Option<::std::vec::Vec<&dyn ::querykit::Record>> {
                match key {
                    #(#to_many_arms)*
                    _ => ::core::option::Option::None,
                }
            }
        }

        impl #impl_generics #struct_name #ty_generics #where_clause {
            #(#accessors)*
        }
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AttributeKind {
    Value,
    Relation,
    ToMany,
}

struct AttributeInfo {
    field_name: Ident,
    field_type: Type,
    attribute_name: String,
    kind: AttributeKind,
}

#[derive(Default)]
struct ModelAttrs {
    entity: Option<String>,
    camel_case: bool,
}

#[derive(Default)]
struct FieldAttrs {
    name: Option<String>,
    relation: bool,
    to_many: bool,
    skip: bool,
}

fn parse_model_attrs(attrs: &[Attribute]) -> syn::Result<ModelAttrs> {
    let mut result = ModelAttrs::default();

    for attr in attrs {
        if !attr.path().is_ident("model") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("entity") {
                let value: LitStr = meta.value()?.parse()?;
                result.entity = Some(value.value());
            } else if meta.path.is_ident("rename_all") {
                let value: LitStr = meta.value()?.parse()?;
                if value.value() != "camelCase" {
                    return Err(syn::Error::new_spanned(
                        value,
                        "only `rename_all = \"camelCase\"` is supported",
                    ));
                }
                result.camel_case = true;
            } else {
                return Err(meta.error("unknown model option"));
            }
            Ok(())
        })?;
    }

    Ok(result)
}

fn parse_field_attrs(attrs: &[Attribute]) -> syn::Result<FieldAttrs> {
    let mut result = FieldAttrs::default();

    for attr in attrs {
        if !attr.path().is_ident("attribute") {
            continue;
        }
        // Handle empty attribute like #[attribute]
        if matches!(attr.meta, Meta::Path(_)) {
            continue;
        }

        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("relation") {
                result.relation = true;
            } else if meta.path.is_ident("to_many") {
                result.to_many = true;
            } else if meta.path.is_ident("skip") {
                result.skip = true;
            } else if meta.path.is_ident("name") {
                let value: LitStr = meta.value()?.parse()?;
                result.name = Some(value.value());
            } else {
                return Err(meta.error("unknown attribute option"));
            }
            Ok(())
        })?;
    }

    Ok(result)
}

fn to_camel_case(s: &str) -> String {
    let mut result = String::new();
    let mut capitalize_next = false;
    for c in s.chars() {
        if c == '_' {
            capitalize_next = !result.is_empty();
        } else if capitalize_next {
            result.push(c.to_ascii_uppercase());
            capitalize_next = false;
        } else {
            result.push(c);
        }
    }
    result
}
