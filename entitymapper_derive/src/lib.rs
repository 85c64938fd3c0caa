use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use std::collections::HashSet;
use syn::{Data, DeriveInput, Fields, Ident, LitStr, Type, parse_macro_input, spanned::Spanned};

/// Implements `entitymapper::Mappable` for a struct with named fields.
///
/// Field options:
/// - `#[mapper(rename = "Name")]` exposes the field under another member name
/// - `#[mapper(skip)]` hides the field from reflection
#[proc_macro_derive(Mappable, attributes(mapper))]
pub fn derive_mappable(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand_mappable(input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

#[derive(Default)]
struct MapperFieldOptions {
    rename: Option<String>,
    skip: bool,
}

struct ReflectedField {
    ident: Ident,
    ty: Type,
    member_name: String,
}

fn expand_mappable(input: DeriveInput) -> syn::Result<TokenStream2> {
    let struct_name = input.ident;

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            input.generics,
            "Mappable does not support generic structs",
        ));
    }

    let data_struct = match input.data {
        Data::Struct(data) => data,
        _ => {
            return Err(syn::Error::new(
                struct_name.span(),
                "Mappable can only be derived for structs",
            ));
        }
    };

    let named_fields = match data_struct.fields {
        Fields::Named(fields) => fields,
        _ => {
            return Err(syn::Error::new(
                struct_name.span(),
                "Mappable requires named fields",
            ));
        }
    };

    let mut fields = Vec::<ReflectedField>::new();
    let mut seen = HashSet::<String>::new();

    for field in named_fields.named {
        let ident = field
            .ident
            .clone()
            .ok_or_else(|| syn::Error::new(field.span(), "Mappable requires named fields"))?;
        let options = parse_mapper_field_options(&field.attrs)?;
        if options.skip {
            continue;
        }

        let member_name = options.rename.unwrap_or_else(|| ident.to_string());
        if !seen.insert(member_name.clone()) {
            return Err(syn::Error::new(
                field.span(),
                format!("Duplicate member name '{}'", member_name),
            ));
        }

        fields.push(ReflectedField {
            ident,
            ty: field.ty,
            member_name,
        });
    }

    let member_entries = fields.iter().map(|field| {
        let name = &field.member_name;
        let ty = &field.ty;
        quote! {
            ::entitymapper::Member::new(
                #name,
                ::std::any::type_name::<#ty>,
                ::std::any::TypeId::of::<#ty>,
            )
        }
    });

    let read_arms = fields.iter().map(|field| {
        let name = &field.member_name;
        let ident = &field.ident;
        quote! {
            #name => ::std::option::Option::Some(::entitymapper::MemberValue::new(
                ::std::clone::Clone::clone(&self.#ident),
            )),
        }
    });

    let write_arms = fields.iter().map(|field| {
        let name = &field.member_name;
        let ident = &field.ident;
        let ty = &field.ty;
        quote! {
            #name => {
                self.#ident = value.downcast::<#ty>(name)?;
                ::std::result::Result::Ok(())
            }
        }
    });

    Ok(quote! {
        impl ::entitymapper::Mappable for #struct_name {
            fn members() -> &'static [::entitymapper::Member] {
                const MEMBERS: &[::entitymapper::Member] = &[#(#member_entries),*];
                MEMBERS
            }

            fn read_member(&self, name: &str) -> ::std::option::Option<::entitymapper::MemberValue> {
                match name {
                    #(#read_arms)*
                    _ => ::std::option::Option::None,
                }
            }

            #[allow(unused_variables)]
            fn write_member(
                &mut self,
                name: &str,
                value: ::entitymapper::MemberValue,
            ) -> ::entitymapper::Result<()> {
                match name {
                    #(#write_arms)*
                    _ => ::std::result::Result::Err(::entitymapper::MapperError::UnknownMember(
                        name.to_string(),
                        ::std::any::type_name::<Self>(),
                    )),
                }
            }
        }
    })
}

fn parse_mapper_field_options(attrs: &[syn::Attribute]) -> syn::Result<MapperFieldOptions> {
    let mut options = MapperFieldOptions::default();

    for attr in attrs {
        if !attr.path().is_ident("mapper") {
            continue;
        }

        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("skip") {
                options.skip = true;
                return Ok(());
            }

            if meta.path.is_ident("rename") {
                let value = meta.value()?;
                let lit: LitStr = value.parse()?;
                options.rename = Some(lit.value());
                return Ok(());
            }

            Err(meta.error(
                "Unsupported #[mapper(...)] option. Supported: skip, rename = \"...\"",
            ))
        })?;

        if options.skip && options.rename.is_some() {
            return Err(syn::Error::new(
                attr.span(),
                "#[mapper(skip)] cannot be combined with rename",
            ));
        }
    }

    Ok(options)
}
