//! Expansion of `#[contract]`.
//!
//! For a trait `Orders` the macro emits:
//!
//! 1. The trait itself, attributes stripped, `Send + Sync` added and passed
//!    through `async_trait`.
//! 2. `impl Contract for dyn Orders`, holding the static method table.
//! 3. `impl Dispatch for dyn Orders`, which binds each method's arguments
//!    from a `ServerCall` and invokes it by declaration index.
//! 4. `OrdersClient`, a proxy implementing `Orders` over HTTP.

use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{parse_quote, ItemTrait, TypeParamBound};

use crate::parse::{ContractArgs, ContractDef, ContractMethod};

/// Expands a contract trait.
pub fn expand_contract(attr: TokenStream, item: TokenStream) -> syn::Result<TokenStream> {
    let args: ContractArgs = syn::parse2(attr)?;
    let item: ItemTrait = syn::parse2(item)?;
    let def = ContractDef::parse(item)?;

    let trait_item = emit_trait(def.item.clone());
    let contract_impl = emit_contract(&args, &def);
    let dispatch_impl = emit_dispatch(&def);
    let client = emit_client(&def);

    Ok(quote! {
        #trait_item
        #contract_impl
        #dispatch_impl
        #client
    })
}

fn has_bound(item: &ItemTrait, name: &str) -> bool {
    item.supertraits.iter().any(|bound| match bound {
        TypeParamBound::Trait(t) => t.path.segments.last().is_some_and(|s| s.ident == name),
        _ => false,
    })
}

fn emit_trait(mut item: ItemTrait) -> TokenStream {
    for name in ["Send", "Sync"] {
        if !has_bound(&item, name) {
            let ident = format_ident!("{}", name);
            item.supertraits.push(parse_quote!(::core::marker::#ident));
        }
    }
    quote! {
        #[::courier::__private::async_trait]
        #item
    }
}

fn emit_method_spec(method: &ContractMethod) -> TokenStream {
    let name = &method.wire_name;
    let params = method.params.iter().map(|param| {
        let wire = &param.wire_name;
        let type_name = param.type_name();
        if param.is_body {
            quote!(::courier::__private::ParamSpec::body(#wire, #type_name))
        } else {
            quote!(::courier::__private::ParamSpec::route(#wire, #type_name))
        }
    });

    let mut spec = quote! {
        ::courier::__private::MethodSpec::new(#name, &[#(#params),*])
    };
    if let Some(verb) = method.verb {
        let verb = format_ident!("{}", verb);
        spec = quote!(#spec.with_verb(::courier::__private::Verb::#verb));
    }
    if let Some(route) = &method.route {
        spec = quote!(#spec.with_route(#route));
    }
    if method.returns_unit() {
        spec = quote!(#spec.returning_unit());
    }
    spec
}

fn emit_contract(args: &ContractArgs, def: &ContractDef) -> TokenStream {
    let ident = &def.item.ident;
    let name = ident.to_string();
    let prefix = match &args.prefix {
        Some(prefix) => quote!(::core::option::Option::Some(#prefix)),
        None => quote!(::core::option::Option::None),
    };
    let methods = def.methods.iter().map(emit_method_spec);

    quote! {
        impl ::courier::__private::Contract for dyn #ident {
            fn spec() -> &'static ::courier::__private::ContractSpec {
                static SPEC: ::courier::__private::ContractSpec = ::courier::__private::ContractSpec {
                    name: #name,
                    prefix: #prefix,
                    methods: &[#(#methods),*],
                };
                &SPEC
            }
        }
    }
}

fn emit_dispatch(def: &ContractDef) -> TokenStream {
    let ident = &def.item.ident;

    let arms = def.methods.iter().enumerate().map(|(index, method)| {
        let method_ident = &method.ident;
        let locals: Vec<_> = method
            .params
            .iter()
            .map(|p| format_ident!("__courier_{}", p.ident))
            .collect();
        let binds = method.params.iter().zip(&locals).map(|(param, local)| {
            let ty = &param.ty;
            let wire = &param.wire_name;
            if param.is_body {
                quote!(let #local: #ty = __courier_call.body(#wire)?;)
            } else {
                quote!(let #local: #ty = __courier_call.param(#wire)?;)
            }
        });

        quote! {
            #index => {
                #(#binds)*
                let __courier_value = <Self as #ident>::#method_ident(self, #(#locals),*).await?;
                __courier_call.reply(&__courier_value)
            }
        }
    });

    quote! {
        #[::courier::__private::async_trait]
        impl ::courier::__private::Dispatch for dyn #ident {
            async fn dispatch(
                &self,
                __courier_index: usize,
                __courier_call: &::courier::__private::ServerCall,
            ) -> ::core::result::Result<::std::string::String, ::courier::__private::CourierError> {
                match __courier_index {
                    #(#arms)*
                    _ => ::core::result::Result::Err(__courier_call.missing_method()),
                }
            }
        }
    }
}

fn emit_client(def: &ContractDef) -> TokenStream {
    let ident = &def.item.ident;
    let vis = &def.item.vis;
    let client = format_ident!("{}Client", ident);
    let doc = format!("HTTP client for [`{ident}`], generated by `#[courier::contract]`.");

    let methods = def.methods.iter().map(|method| {
        let method_ident = &method.ident;
        let wire_name = &method.wire_name;
        let output = &method.output;
        let inputs = method.params.iter().map(|p| {
            let (name, ty) = (&p.ident, &p.ty);
            quote!(#name: #ty)
        });
        let type_names = method.params.iter().map(|p| p.type_name());
        let args = method.params.iter().filter(|p| !p.is_body).map(|p| {
            let (name, wire) = (&p.ident, &p.wire_name);
            quote!(.arg(#wire, &#name))
        });
        let body = method.params.iter().find(|p| p.is_body).map(|p| {
            let name = &p.ident;
            quote!(.body(&#name)?)
        });

        quote! {
            async fn #method_ident(&self, #(#inputs),*) -> #output {
                self.proxy
                    .call(#wire_name, &[#(#type_names),*])?
                    #(#args)*
                    #body
                    .send()
                    .await
            }
        }
    });

    quote! {
        #[doc = #doc]
        #[derive(Debug)]
        #vis struct #client {
            proxy: ::courier::__private::ClientProxy,
        }

        impl #client {
            /// Wraps a proxy bound to this contract.
            #vis fn new(proxy: ::courier::__private::ClientProxy) -> Self {
                Self { proxy }
            }

            /// Returns the underlying proxy.
            #vis fn proxy(&self) -> &::courier::__private::ClientProxy {
                &self.proxy
            }
        }

        impl ::courier::__private::ContractClient for #client {
            type Contract = dyn #ident;

            fn from_proxy(proxy: ::courier::__private::ClientProxy) -> Self {
                Self::new(proxy)
            }

            fn into_contract(self) -> ::std::sync::Arc<dyn #ident> {
                ::std::sync::Arc::new(self)
            }
        }

        #[::courier::__private::async_trait]
        impl #ident for #client {
            #(#methods)*
        }
    }
}
