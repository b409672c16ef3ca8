//! Parsing of contract traits.
//!
//! A contract trait is read into a [`ContractDef`]: its arguments, and one
//! [`ContractMethod`] per method with the courier attributes removed so the
//! trait can be re-emitted as plain Rust.

use proc_macro2::Span;
use syn::{
    parse::{Parse, ParseStream},
    punctuated::Punctuated,
    spanned::Spanned,
    Attribute, Expr, ExprLit, FnArg, GenericArgument, Ident, ItemTrait, Lit, LitStr, Meta, Pat,
    PathArguments, ReturnType, Token, TraitItem, TraitItemFn, Type,
};

use crate::case::{lower_camel, upper_camel};

/// Verb attributes accepted on contract methods.
const VERBS: [(&str, &str); 5] = [
    ("get", "Get"),
    ("put", "Put"),
    ("post", "Post"),
    ("patch", "Patch"),
    ("delete", "Delete"),
];

/// Arguments of `#[contract(...)]`.
#[derive(Debug, Default)]
pub struct ContractArgs {
    /// Literal prefix of every route of the contract.
    pub prefix: Option<String>,
}

impl Parse for ContractArgs {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut args = Self::default();
        let metas: Punctuated<Meta, Token![,]> = Punctuated::parse_terminated(input)?;

        for meta in metas {
            let nv = meta.require_name_value()?;
            let ident = nv
                .path
                .get_ident()
                .ok_or_else(|| syn::Error::new(nv.path.span(), "expected identifier"))?
                .to_string();
            match ident.as_str() {
                "prefix" => args.prefix = Some(string_value(&nv.value)?),
                _ => {
                    return Err(syn::Error::new(
                        nv.path.span(),
                        format!("unknown contract argument: {ident}"),
                    ))
                }
            }
        }

        Ok(args)
    }
}

/// A parsed contract trait.
#[derive(Debug)]
pub struct ContractDef {
    /// The trait with courier attributes stripped.
    pub item: ItemTrait,
    /// The methods, in declaration order.
    pub methods: Vec<ContractMethod>,
}

impl ContractDef {
    /// Reads a trait, stripping the attributes it consumes.
    pub fn parse(mut item: ItemTrait) -> syn::Result<Self> {
        if !item.generics.params.is_empty() || item.generics.where_clause.is_some() {
            return Err(syn::Error::new(
                item.generics.span(),
                "contracts cannot be generic",
            ));
        }

        let mut methods = Vec::new();
        for trait_item in &mut item.items {
            match trait_item {
                TraitItem::Fn(method) => methods.push(ContractMethod::parse(method)?),
                other => {
                    return Err(syn::Error::new(
                        other.span(),
                        "contracts may only declare methods",
                    ))
                }
            }
        }

        Ok(Self { item, methods })
    }
}

/// One contract method.
#[derive(Debug)]
pub struct ContractMethod {
    /// The Rust identifier.
    pub ident: Ident,
    /// Wire name, `AddOrder` for `add_order` unless renamed.
    pub wire_name: String,
    /// Verb variant name (`Put`) when overridden.
    pub verb: Option<&'static str>,
    /// Route template override.
    pub route: Option<String>,
    /// Parameters after `&self`.
    pub params: Vec<MethodParam>,
    /// The success type of the returned `Result`.
    pub ok_type: Type,
    /// The full declared return type.
    pub output: Type,
}

impl ContractMethod {
    fn parse(method: &mut TraitItemFn) -> syn::Result<Self> {
        let sig = &mut method.sig;
        if sig.asyncness.is_none() {
            return Err(syn::Error::new(sig.fn_token.span, "contract methods must be async"));
        }
        if !sig.generics.params.is_empty() {
            return Err(syn::Error::new(
                sig.generics.span(),
                "contract methods cannot be generic",
            ));
        }
        if method.default.is_some() {
            return Err(syn::Error::new(
                sig.ident.span(),
                "contract methods cannot have a default body",
            ));
        }

        let mut wire_name = upper_camel(&sig.ident.to_string());
        let mut verb = None;
        let mut route = None;
        let mut kept: Vec<Attribute> = Vec::new();

        for attr in method.attrs.drain(..) {
            let path = attr.path();
            if let Some((_, variant)) = VERBS.iter().find(|(name, _)| path.is_ident(name)) {
                attr.meta.require_path_only()?;
                if verb.replace(*variant).is_some() {
                    return Err(syn::Error::new(attr.span(), "only one verb attribute is allowed"));
                }
            } else if path.is_ident("route") {
                let template: LitStr = attr.parse_args()?;
                route = Some(template.value());
            } else if path.is_ident("name") {
                wire_name = string_value(&attr.meta.require_name_value()?.value)?;
            } else {
                kept.push(attr);
            }
        }
        method.attrs = kept;

        let mut has_receiver = false;
        let mut params = Vec::new();
        for input in &mut sig.inputs {
            match input {
                FnArg::Receiver(receiver) => {
                    if receiver.reference.is_none() || receiver.mutability.is_some() {
                        return Err(syn::Error::new(receiver.span(), "contract methods take `&self`"));
                    }
                    has_receiver = true;
                }
                FnArg::Typed(typed) => params.push(MethodParam::parse(typed)?),
            }
        }
        if !has_receiver {
            return Err(syn::Error::new(sig.ident.span(), "contract methods take `&self`"));
        }

        if params.iter().filter(|p| p.is_body).count() > 1 {
            return Err(syn::Error::new(
                sig.ident.span(),
                "only one parameter may be marked #[body]",
            ));
        }

        if let Some(template) = &route {
            check_placeholders(template, &params, sig.ident.span())?;
        }

        let output = match &sig.output {
            ReturnType::Type(_, ty) => (**ty).clone(),
            ReturnType::Default => {
                return Err(syn::Error::new(
                    sig.ident.span(),
                    "contract methods must return Result<T, CourierError>",
                ))
            }
        };
        let ok_type = ok_type(&output).ok_or_else(|| {
            syn::Error::new(
                output.span(),
                "contract methods must return Result<T, CourierError>",
            )
        })?;

        Ok(Self {
            ident: sig.ident.clone(),
            wire_name,
            verb,
            route,
            params,
            ok_type,
            output,
        })
    }

    /// Returns `true` for `Result<(), _>`.
    pub fn returns_unit(&self) -> bool {
        matches!(&self.ok_type, Type::Tuple(tuple) if tuple.elems.is_empty())
    }
}

/// One parameter of a contract method.
#[derive(Debug)]
pub struct MethodParam {
    /// The Rust identifier.
    pub ident: Ident,
    /// The declared type.
    pub ty: Type,
    /// The lowerCamel wire name.
    pub wire_name: String,
    /// Marked `#[body]`.
    pub is_body: bool,
}

impl MethodParam {
    fn parse(typed: &mut syn::PatType) -> syn::Result<Self> {
        let ident = match &*typed.pat {
            Pat::Ident(pat) if pat.by_ref.is_none() && pat.subpat.is_none() => pat.ident.clone(),
            other => {
                return Err(syn::Error::new(
                    other.span(),
                    "contract parameters must be plain identifiers",
                ))
            }
        };

        let before = typed.attrs.len();
        typed.attrs.retain(|attr| !attr.path().is_ident("body"));
        let is_body = typed.attrs.len() != before;

        Ok(Self {
            wire_name: lower_camel(&ident.to_string()),
            ident,
            ty: (*typed.ty).clone(),
            is_body,
        })
    }

    /// The declared type as text, used to resolve overloads.
    pub fn type_name(&self) -> String {
        let ty = &self.ty;
        quote::quote!(#ty).to_string().replace(' ', "")
    }
}

/// Extracts `T` from `Result<T, E>` or `CourierResult<T>`.
fn ok_type(output: &Type) -> Option<Type> {
    let Type::Path(path) = output else {
        return None;
    };
    let segment = path.path.segments.last()?;
    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    let expected = match segment.ident.to_string().as_str() {
        "Result" => 2,
        "CourierResult" => 1,
        _ => return None,
    };
    if args.args.len() != expected {
        return None;
    }
    match args.args.first()? {
        GenericArgument::Type(ty) => Some(ty.clone()),
        _ => None,
    }
}

/// Every `{name}` of a route must name a non-body parameter.
fn check_placeholders(template: &str, params: &[MethodParam], span: Span) -> syn::Result<()> {
    for segment in template.trim_matches('/').split('/') {
        let Some(name) = segment.strip_prefix('{').map(|s| s.trim_end_matches('}')) else {
            continue;
        };
        let bound = params
            .iter()
            .any(|p| !p.is_body && p.wire_name.eq_ignore_ascii_case(name));
        if !bound {
            return Err(syn::Error::new(
                span,
                format!("route placeholder {{{name}}} does not name a parameter"),
            ));
        }
    }
    Ok(())
}

/// Reads a string literal expression.
pub fn string_value(expr: &Expr) -> syn::Result<String> {
    match expr {
        Expr::Lit(ExprLit {
            lit: Lit::Str(s), ..
        }) => Ok(s.value()),
        _ => Err(syn::Error::new(expr.span(), "expected string literal")),
    }
}
