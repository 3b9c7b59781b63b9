//! `#[derive(Component)]` implementation

use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, Attribute, DeriveInput, Field, Fields, LitStr, Meta};

/// Parsed `#[param(...)]` attribute
#[derive(Default)]
struct ParamAttr {
    name: Option<String>,
    optional: bool,
}

/// Parsed `#[property(...)]` attribute
#[derive(Default)]
struct PropertyAttr {
    name: Option<String>,
    readonly: bool,
}

fn find_attr<'a>(field: &'a Field, ident: &str) -> Option<&'a Attribute> {
    field.attrs.iter().find(|attr| attr.path().is_ident(ident))
}

fn parse_param(attr: &Attribute) -> syn::Result<ParamAttr> {
    let mut parsed = ParamAttr::default();
    if let Meta::List(_) = attr.meta {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("name") {
                let value: LitStr = meta.value()?.parse()?;
                parsed.name = Some(value.value());
                Ok(())
            } else if meta.path.is_ident("optional") {
                parsed.optional = true;
                Ok(())
            } else {
                Err(meta.error("expected `name = \"..\"` or `optional`"))
            }
        })?;
    }
    Ok(parsed)
}

fn parse_property(attr: &Attribute) -> syn::Result<PropertyAttr> {
    let mut parsed = PropertyAttr::default();
    if let Meta::List(_) = attr.meta {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("name") {
                let value: LitStr = meta.value()?.parse()?;
                parsed.name = Some(value.value());
                Ok(())
            } else if meta.path.is_ident("readonly") {
                parsed.readonly = true;
                Ok(())
            } else {
                Err(meta.error("expected `name = \"..\"` or `readonly`"))
            }
        })?;
    }
    Ok(parsed)
}

/// `timeout_secs` -> `TimeoutSecs`
fn pascal_case(ident: &str) -> String {
    ident
        .trim_start_matches("r#")
        .split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

pub fn derive_component_impl(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand(&input) {
        Ok(expanded) => TokenStream::from(expanded),
        Err(err) => TokenStream::from(err.to_compile_error()),
    }
}

fn expand(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let name = &input.ident;

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "Component cannot be derived for generic structs",
        ));
    }

    let data = match &input.data {
        syn::Data::Struct(data) => data,
        _ => {
            return Err(syn::Error::new_spanned(
                input,
                "Component can only be derived for structs",
            ))
        }
    };

    let fields = match &data.fields {
        Fields::Named(fields) => fields.named.iter().collect::<Vec<_>>(),
        Fields::Unit => Vec::new(),
        Fields::Unnamed(_) => {
            return Err(syn::Error::new_spanned(
                input,
                "Component does not support tuple structs. Use named fields instead.",
            ))
        }
    };

    let mut parameters = Vec::new();
    let mut properties = Vec::new();
    let mut initializers = Vec::new();

    for field in &fields {
        let Some(field_name) = field.ident.as_ref() else {
            continue;
        };
        let field_ty = &field.ty;

        match find_attr(field, "param") {
            Some(attr) => {
                let param = parse_param(attr)?;
                let param_name = param.name.unwrap_or_else(|| field_name.to_string());
                if param.optional {
                    parameters.push(quote! { .optional_parameter(#param_name) });
                    initializers.push(quote! {
                        #field_name: args
                            .get_optional::<#field_ty>(#param_name)?
                            .unwrap_or_default()
                    });
                } else {
                    parameters.push(quote! { .parameter(#param_name) });
                    initializers.push(quote! {
                        #field_name: args.get::<#field_ty>(#param_name)?
                    });
                }
            }
            None => initializers.push(quote! {
                #field_name: ::std::default::Default::default()
            }),
        }

        if let Some(attr) = find_attr(field, "property") {
            let property = parse_property(attr)?;
            let property_name = property
                .name
                .unwrap_or_else(|| pascal_case(&field_name.to_string()));

            let info = if property.readonly {
                quote! { ::wirekit::PropertyInfo::read_only(#property_name) }
            } else {
                let constructor = match field.vis {
                    syn::Visibility::Public(_) => quote! { public },
                    _ => quote! { private },
                };
                quote! {
                    ::wirekit::PropertyInfo::#constructor::<Self, #field_ty, _>(
                        #property_name,
                        |target: &mut Self, value: #field_ty| target.#field_name = value,
                    )
                }
            };
            properties.push(quote! { .property(#info) });
        }
    }

    let args_ident = if parameters.is_empty() {
        quote! { _args }
    } else {
        quote! { args }
    };

    let body = match &data.fields {
        Fields::Unit => quote! { Self },
        _ => quote! { Self { #(#initializers),* } },
    };

    Ok(quote! {
        impl ::wirekit::Component for #name {
            fn limit_type() -> ::wirekit::LimitType {
                ::wirekit::LimitType::of::<Self>()
                    #(#parameters)*
                    #(#properties)*
            }

            fn construct(
                #args_ident: &::wirekit::ConstructorArguments<'_>,
            ) -> ::std::result::Result<Self, ::wirekit::ContainerError> {
                ::std::result::Result::Ok(#body)
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::pascal_case;

    #[test]
    fn test_pascal_case() {
        assert_eq!(pascal_case("value1"), "Value1");
        assert_eq!(pascal_case("timeout_secs"), "TimeoutSecs");
        assert_eq!(pascal_case("r#type"), "Type");
        assert_eq!(pascal_case("_leading"), "Leading");
    }
}
