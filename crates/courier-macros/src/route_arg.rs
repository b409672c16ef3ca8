//! `#[derive(RouteArg)]` for structs carried in the query string.
//!
//! Each named field is written and read under its own lowerCamel wire name,
//! so a `Filter { min_price, max_price }` parameter travels as
//! `?minPrice=..&maxPrice=..`. Reading starts from `Default::default()` and
//! only overwrites fields whose key is bound.

use proc_macro2::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Field, Fields};

use crate::case::lower_camel;
use crate::parse::string_value;

struct RouteField<'a> {
    field: &'a Field,
    wire_name: String,
}

fn route_field(field: &Field) -> syn::Result<Option<RouteField<'_>>> {
    let Some(ident) = &field.ident else {
        return Ok(None);
    };
    let mut wire_name = lower_camel(&ident.to_string());

    for attr in field.attrs.iter().filter(|a| a.path().is_ident("courier")) {
        let mut skip = false;
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("skip") {
                skip = true;
                Ok(())
            } else if meta.path.is_ident("rename") {
                wire_name = string_value(&meta.value()?.parse()?)?;
                Ok(())
            } else {
                Err(meta.error("expected `skip` or `rename = \"...\"`"))
            }
        })?;
        if skip {
            return Ok(None);
        }
    }

    Ok(Some(RouteField { field, wire_name }))
}

/// Expands the derive.
pub fn expand_route_arg(input: TokenStream) -> syn::Result<TokenStream> {
    let input: DeriveInput = syn::parse2(input)?;
    let ident = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let Data::Struct(data) = &input.data else {
        return Err(syn::Error::new_spanned(
            ident,
            "RouteArg can only be derived for structs with named fields",
        ));
    };
    let Fields::Named(named) = &data.fields else {
        return Err(syn::Error::new_spanned(
            ident,
            "RouteArg can only be derived for structs with named fields",
        ));
    };

    let mut fields = Vec::new();
    for field in &named.named {
        if let Some(route) = route_field(field)? {
            fields.push(route);
        }
    }

    let writes = fields.iter().map(|f| {
        let (name, ty, wire) = (&f.field.ident, &f.field.ty, &f.wire_name);
        quote!(<#ty as ::courier::__private::RouteArg>::write_route(&self.#name, #wire, out);)
    });
    let reads = fields.iter().map(|f| {
        let (name, ty, wire) = (&f.field.ident, &f.field.ty, &f.wire_name);
        quote! {
            if bindings.contains(#wire) {
                value.#name = <#ty as ::courier::__private::RouteArg>::read_route(#wire, bindings)?;
            }
        }
    });

    Ok(quote! {
        impl #impl_generics ::courier::__private::RouteArg for #ident #ty_generics #where_clause {
            fn write_route(
                &self,
                _name: &str,
                out: &mut ::std::vec::Vec<(::std::string::String, ::std::string::String)>,
            ) {
                #(#writes)*
            }

            #[allow(unused_mut)]
            fn read_route(
                _name: &str,
                bindings: &::courier::__private::Bindings,
            ) -> ::core::result::Result<Self, ::courier::__private::BindingError> {
                let mut value = <Self as ::core::default::Default>::default();
                #(#reads)*
                ::core::result::Result::Ok(value)
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fields_use_wire_names() {
        let out = expand_route_arg(quote! {
            #[derive(Default)]
            struct Filter {
                min_price: u32,
                #[courier(rename = "q")]
                text: String,
                #[courier(skip)]
                cache: Option<u8>,
            }
        })
        .unwrap()
        .to_string();

        assert!(out.contains("\"minPrice\""));
        assert!(out.contains("\"q\""));
        assert!(!out.contains("\"text\""));
        assert!(!out.contains("cache"));
    }

    #[test]
    fn test_rejects_enums_and_tuples() {
        assert!(expand_route_arg(quote!(enum Mode { A, B })).is_err());
        assert!(expand_route_arg(quote!(struct Pair(u32, u32);)).is_err());
    }

    #[test]
    fn test_rejects_unknown_field_option() {
        assert!(expand_route_arg(quote! {
            struct Filter {
                #[courier(flatten)]
                inner: u32,
            }
        })
        .is_err());
    }
}
