use std::fmt;

use proc_macro::TokenStream;
use quote::{format_ident, quote};

enum Visibility {
    Public(proc_macro2::Span),
    Private,
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Public(..) => "public",
            Self::Private => "private",
        }
        .fmt(f)
    }
}

impl syn::parse::Parse for Visibility {
    fn parse(input: syn::parse::ParseStream) -> syn::Result<Self> {
        let identifier = input.parse::<syn::Ident>()?;
        match identifier.to_string().as_str() {
            "public" => Ok(Self::Public(identifier.span())),
            "private" => Ok(Self::Private),
            _ => Err(syn::Error::new_spanned(
                identifier,
                "Unexpected visibility: expected `public` or `private`",
            )),
        }
    }
}

struct EnumTagsArgs {
    visibility: Visibility,
    repr_type: syn::Type,
}

impl syn::parse::Parse for EnumTagsArgs {
    fn parse(input: syn::parse::ParseStream) -> syn::Result<Self> {
        mod kw {
            use syn::custom_keyword;

            custom_keyword!(repr);
        }

        let visibility = input.parse()?;

        input.parse::<syn::Token![,]>().map_err(|mut error| {
            error.combine(syn::Error::new(
                input.span(),
                format!("Missing comma after `{}` visibility", visibility),
            ));
            error
        })?;

        input.parse::<kw::repr>().map_err(|mut error| {
            error.combine(syn::Error::new(
                input.span(),
                format!("Missing `repr` after `{},`", visibility),
            ));
            error
        })?;

        let content;
        syn::parenthesized!(content in input);
        let repr_type = content.parse()?;

        Ok(Self {
            visibility,
            repr_type,
        })
    }
}

/// One parsed variant: its name, its tag, and whether it carries fields.
struct TaggedVariant {
    name: syn::Ident,
    tag_ident: syn::Ident,
    discriminant: usize,
    fields: syn::Fields,
}

fn parse_discriminant(expr: &syn::Expr) -> syn::Result<usize> {
    match expr {
        syn::Expr::Lit(syn::ExprLit {
            lit: syn::Lit::Int(int_literal),
            ..
        }) => int_literal.base10_parse::<usize>(),
        other => Err(syn::Error::new_spanned(
            other,
            "Only literal discriminants are allowed",
        )),
    }
}

fn tag_variants(
    variants: impl Iterator<Item = syn::Variant>,
) -> syn::Result<Vec<TaggedVariant>> {
    let mut tagged = vec![];
    let mut next_discriminant = 0;

    for variant in variants {
        let discriminant = match &variant.discriminant {
            Some((_, expr)) => parse_discriminant(expr)?,
            None => next_discriminant,
        };
        next_discriminant = discriminant + 1;

        let tag_ident = format_ident!(
            "{}_TAG",
            variant.ident.to_string().to_ascii_uppercase()
        );

        tagged.push(TaggedVariant {
            name: variant.ident,
            tag_ident,
            discriminant,
            fields: variant.fields,
        });
    }

    Ok(tagged)
}

fn impl_enum_tags(
    enum_visibility: syn::Visibility,
    enum_name: syn::Ident,
    repr_type: syn::Type,
    variants: &[TaggedVariant],
) -> proc_macro2::TokenStream {
    let tag_consts = variants.iter().map(|variant| {
        let TaggedVariant {
            name,
            tag_ident,
            discriminant,
            ..
        } = variant;
        quote! {
            #[doc = concat!("`#[enum_tags]`-generated tag for the variant `Self::", stringify!(#name), "`.")]
            #enum_visibility const #tag_ident: #repr_type = #discriminant as _;
        }
    });

    let tag_cases = variants.iter().map(|variant| {
        let TaggedVariant {
            name, tag_ident, ..
        } = variant;
        match variant.fields {
            syn::Fields::Named(_) => quote! { Self::#name { .. } => Self::#tag_ident },
            syn::Fields::Unnamed(_) => quote! { Self::#name(..) => Self::#tag_ident },
            syn::Fields::Unit => quote! { Self::#name => Self::#tag_ident },
        }
    });

    // lookup by tag only makes sense when a tag alone rebuilds the variant
    let all_unit = variants
        .iter()
        .all(|variant| matches!(variant.fields, syn::Fields::Unit));
    let lookup = if all_unit {
        let count = variants.len();
        let names: Vec<_> = variants.iter().map(|variant| &variant.name).collect();
        let tag_idents = variants.iter().map(|variant| &variant.tag_ident);
        quote! {
            #[doc = "`#[enum_tags]`-generated list of every variant, in declaration order."]
            #enum_visibility const VARIANTS: [Self; #count] = [#(Self::#names),*];

            #[doc = "`#[enum_tags]`-generated inverse of [`Self::tag`]."]
            #enum_visibility const fn from_tag(tag: #repr_type) -> Option<Self> {
                match tag {
                    #(Self::#tag_idents => Some(Self::#names),)*
                    _ => None,
                }
            }
        }
    } else {
        quote! {}
    };

    quote! {
        impl #enum_name {
            #(#tag_consts)*

            #[doc = "`#[enum_tags]`-generated getter for this variant's tag."]
            #enum_visibility const fn tag(&self) -> #repr_type {
                match self {
                    #(#tag_cases),*
                }
            }

            #lookup
        }
    }
}

/// Constructs an `impl` for the given `enum` with constants for the
/// discriminant value of each variant.
///
/// Usage examples:
///
/// * `#[enum_tags(public, repr(u8))]`
/// * `#[enum_tags(private, repr(u16))]`
///
/// Note that the `repr` type can be any numerical type to which a `usize` can
/// be casted to implicitly with the `as` keyword --- it is not the same as the
/// type for which you may `#[repr(...)]` the `enum`.
///
/// If every variant is a unit variant, the `impl` also gets a `VARIANTS`
/// array and a `from_tag` constructor returning `None` for unknown tags.
#[proc_macro_attribute]
pub fn enum_tags(args: TokenStream, input: TokenStream) -> TokenStream {
    let args = syn::parse_macro_input!(args as EnumTagsArgs);

    let input_item = syn::parse_macro_input!(input as syn::DeriveInput);
    let input_item_cloned = input_item.clone();

    let data_enum = match input_item.data {
        syn::Data::Enum(data_enum) => data_enum,
        syn::Data::Struct(syn::DataStruct {
            struct_token: syn::token::Struct { span },
            ..
        })
        | syn::Data::Union(syn::DataUnion {
            union_token: syn::token::Union { span },
            ..
        }) => {
            return syn::Error::new(span, "Item must be an `enum`")
                .into_compile_error()
                .into();
        }
    };

    let variants = match tag_variants(data_enum.variants.into_iter()) {
        Ok(variants) => variants,
        Err(error) => return error.into_compile_error().into(),
    };

    let visibility = match args.visibility {
        Visibility::Public(span) => {
            syn::Visibility::Public(syn::token::Pub { span })
        }
        Visibility::Private => syn::Visibility::Inherited,
    };

    let tags_impl = impl_enum_tags(
        visibility,
        input_item.ident,
        args.repr_type,
        &variants,
    );

    quote! {
        #input_item_cloned

        #tags_impl
    }
    .into()
}
