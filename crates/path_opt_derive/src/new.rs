use proc_macro::TokenStream;
use quote::{format_ident, quote};
use syn::{Data, DeriveInput, Fields, parse_macro_input, spanned::Spanned};

use crate::utils;

/// `new(..)` takes every required field in declaration order.
/// `Option<_>` fields and fields marked `#[new(default)]` are left out of
/// `new` and get a `with_<field>` builder instead.
pub fn derive_new_inner(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = input.ident;
    let generics = input.generics;
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => &named.named,
            _ => {
                return syn::Error::new_spanned(&name, "`New` requires named fields")
                    .to_compile_error()
                    .into();
            }
        },
        _ => {
            return syn::Error::new_spanned(&name, "`New` can only be derived for structs")
                .to_compile_error()
                .into();
        }
    };

    let mut new_args = Vec::new();
    let mut inits = Vec::new();
    let mut builders = Vec::new();

    for field in fields {
        let Some(ident) = field.ident.as_ref() else {
            continue;
        };
        let ty = &field.ty;

        let mut use_default = false;
        for attr in &field.attrs {
            if !attr.path().is_ident("new") {
                continue;
            }
            let parse_result = attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("default") {
                    use_default = true;
                    return Ok(());
                }
                Err(meta.error("unsupported new attribute; expected default"))
            });
            if let Err(err) = parse_result {
                return err.to_compile_error().into();
            }
        }

        let method = format_ident!("with_{}", ident);

        if let Some(inner) = utils::inner_of_option(ty) {
            if use_default {
                return syn::Error::new(field.span(), "`Option` fields already default to None")
                    .to_compile_error()
                    .into();
            }
            inits.push(quote! { #ident: None });
            builders.push(quote! {
                pub fn #method(mut self, #ident: #inner) -> Self {
                    self.#ident = Some(#ident);
                    self
                }
            });
        } else if use_default {
            inits.push(quote! { #ident: ::core::default::Default::default() });
            builders.push(quote! {
                pub fn #method(mut self, #ident: #ty) -> Self {
                    self.#ident = #ident;
                    self
                }
            });
        } else {
            new_args.push(quote! { #ident: #ty });
            inits.push(quote! { #ident });
        }
    }

    let expanded = quote! {
        impl #impl_generics #name #ty_generics #where_clause {
            pub fn new(#(#new_args),*) -> Self {
                Self { #(#inits),* }
            }

            #(#builders)*
        }
    };

    TokenStream::from(expanded)
}
