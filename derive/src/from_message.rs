use std::collections::HashSet;

use proc_macro::TokenStream;
use quote::quote;
use syn::{
    Data, DeriveInput, Error, ExprClosure, Field, Fields, Ident, LitStr, Pat, Result, Token, Type,
    parse::{Parse, ParseStream},
    spanned::Spanned,
};

pub(crate) fn expand_from_message(input: &DeriveInput) -> Result<TokenStream> {
    let Data::Struct(data) = &input.data else {
        Err(Error::new(
            input.span(),
            "`FromMessage` may only be derived on structs.",
        ))?
    };

    let Fields::Named(fields) = &data.fields else {
        Err(Error::new(
            input.span(),
            "`FromMessage` may only be derived on structs with named fields.",
        ))?
    };

    let fields = fields
        .named
        .iter()
        .map(FieldMetadata::parse)
        .filter_map(Result::transpose) // Skip fields without an attribute.
        .collect::<Result<Vec<_>>>()?;

    let mut seen = HashSet::new();
    for field in &fields {
        if let Source::Name(name) = &field.source {
            if !seen.insert(name.value()) {
                Err(Error::new(name.span(), "Field names must be unique."))?;
            }
        }
    }

    if fields.iter().filter(|f| matches!(f.source, Source::Point)).count() > 1 {
        Err(Error::new(
            input.span(),
            "Only one field may receive the point.",
        ))?;
    }

    let assignments = fields.iter().map(|field| {
        let FieldMetadata {
            ident,
            ty,
            source,
            handler,
        } = field;

        let lookup = match (source, handler) {
            (Source::Name(name), Some(Handler { value_type, .. })) => {
                quote! { message.get::<#value_type>(#name) }
            }
            (Source::Name(name), None) => quote! { message.get(#name) },
            (Source::Point, _) => quote! { message.point },
        };

        let assignment = if let Some(Handler { closure, .. }) = handler {
            let body = &closure.body;
            let acc = &closure.inputs[0];
            let val = &closure.inputs[1];

            quote! {
                (|#acc: &mut #ty, #val| { #body })(&mut this.#ident, value)
            }
        } else {
            quote! { this.#ident = Some(value) }
        };

        quote! {
            if let Some(value) = #lookup {
                #assignment;
            }
        }
    });

    let name = &input.ident;

    let expanded = quote! {
        impl ::cassette::avec::FromMessage for #name {
            fn from_message(message: &::cassette::avec::Message) -> Self {
                let mut this: Self = ::core::default::Default::default();
                #(#assignments)*
                this
            }
        }
    };

    Ok(expanded.into())
}

struct FieldMetadata {
    ident: Ident,
    ty: Type,
    source: Source,
    handler: Option<Handler>,
}

enum Source {
    Name(LitStr),
    Point,
}

struct Handler {
    closure: ExprClosure,
    value_type: Type,
}

impl FieldMetadata {
    fn parse(field: &Field) -> Result<Option<Self>> {
        let Some(ident) = field.ident.clone() else {
            Err(Error::new_spanned(field, "Field must be named."))?
        };

        let Some(attr) = field.attrs.iter().find(|a| a.path().is_ident("field")) else {
            return Ok(None);
        };

        let FieldAttribute { source, closure } = attr.meta.require_list()?.parse_args()?;

        let handler = closure.map(Handler::parse).transpose()?;

        Ok(Some(Self {
            ident,
            ty: field.ty.clone(),
            source,
            handler,
        }))
    }
}

impl Handler {
    fn parse(closure: ExprClosure) -> Result<Self> {
        if closure.inputs.len() != 2 {
            Err(Error::new_spanned(
                &closure,
                "Handler closure must have two parameters.",
            ))?;
        }

        let Pat::Type(pat_type) = &closure.inputs[1] else {
            Err(Error::new_spanned(
                &closure.inputs[1],
                "Handler closure's second parameter must be annotated with the expected value type.",
            ))?
        };

        let value_type = (*pat_type.ty).clone();

        Ok(Self {
            closure,
            value_type,
        })
    }
}

struct FieldAttribute {
    source: Source,
    closure: Option<ExprClosure>,
}

impl Parse for FieldAttribute {
    fn parse(input: ParseStream) -> Result<Self> {
        let source = if input.peek(LitStr) {
            Source::Name(input.parse()?)
        } else {
            let ident = input.parse::<Ident>()?;
            if ident == "point" {
                Source::Point
            } else {
                Err(Error::new_spanned(
                    ident,
                    "Field source must be a string literal or `point`.",
                ))?
            }
        };

        let closure = if !input.is_empty() {
            input.parse::<Token![,]>()?;
            Some(input.parse::<ExprClosure>()?)
        } else {
            None
        };

        Ok(Self { source, closure })
    }
}
