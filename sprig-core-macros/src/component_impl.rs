use proc_macro2::TokenStream;
use proc_macro_error::abort;
use quote::quote;
use syn::{Data, DeriveInput, Fields};

use crate::attribute_helpers::{
    get_autowired_name, get_bean_name, get_constructor, get_scope, is_autowired, to_camel_case,
};

/// 一个需要注入的字段
struct InjectionPoint {
    /// 字段标识符
    ident: syn::Ident,
    /// 注入名称，也就是依赖的 bean 名称
    name: String,
}

pub(crate) fn derive_component_impl(input: DeriveInput) -> TokenStream {
    let name = &input.ident;

    if !input.generics.params.is_empty() {
        abort!(
            input.generics,
            "#[derive(Component)] does not support generic types";
            help = "register a concrete wrapper type instead"
        );
    }

    let data_struct = match &input.data {
        Data::Struct(data_struct) => data_struct,
        _ => abort!(name, "#[derive(Component)] can only be used on structs"),
    };

    // 默认使用类型名的 camelCase 形式，例如: UserService -> userService
    let bean_name = get_bean_name(&input.attrs).unwrap_or_else(|| to_camel_case(&name.to_string()));
    let type_name = name.to_string();

    let scope = match get_scope(&input.attrs) {
        Some(scope) => quote! { ::core::option::Option::Some(#scope) },
        None => quote! { ::core::option::Option::None },
    };

    // 提取需要自动注入的字段
    let injection_points: Vec<InjectionPoint> = match &data_struct.fields {
        Fields::Named(fields) => fields
            .named
            .iter()
            .filter(|field| is_autowired(&field.attrs))
            .filter_map(|field| {
                let ident = field.ident.clone()?;
                let name = get_autowired_name(&field.attrs).unwrap_or_else(|| ident.to_string());
                Some(InjectionPoint { ident, name })
            })
            .collect(),
        Fields::Unit => Vec::new(),
        Fields::Unnamed(fields) => abort!(
            fields,
            "#[derive(Component)] requires named fields";
            help = "dependencies are injected by field name"
        ),
    };

    let instantiate = match get_constructor(&input.attrs) {
        Some(constructor) => {
            let constructor = syn::Ident::new(&constructor, proc_macro2::Span::call_site());
            quote! {
                Self::#constructor().map_err(::core::convert::Into::<::sprig_core::anyhow::Error>::into)
            }
        }
        None => default_construction(&data_struct.fields),
    };

    let injection_names: Vec<&str> = injection_points.iter().map(|p| p.name.as_str()).collect();
    let injection_arms = injection_points.iter().map(|point| {
        let ident = &point.ident;
        let name = &point.name;
        quote! {
            #name => self.#ident.inject(field, value),
        }
    });

    quote! {
        impl ::sprig_core::Component for #name {
            fn instantiate() -> ::sprig_core::anyhow::Result<Self> {
                #instantiate
            }

            fn injectable_fields() -> &'static [&'static str] {
                &[#(#injection_names),*]
            }

            fn inject_field(
                &self,
                field: &str,
                value: ::sprig_core::BeanRef,
            ) -> ::core::result::Result<(), ::sprig_core::InjectionError> {
                match field {
                    #(#injection_arms)*
                    _ => ::core::result::Result::Err(::sprig_core::InjectionError::UnknownField {
                        type_name: ::core::any::type_name::<Self>(),
                        field: field.to_string(),
                    }),
                }
            }
        }

        ::sprig_core::inventory::submit! {
            ::sprig_core::ComponentRegistration {
                type_path: ::core::concat!(::core::module_path!(), "::", #type_name),
                bean_name: ::core::option::Option::Some(#bean_name),
                scope: #scope,
                descriptor: ::sprig_core::component_type::<#name>,
            }
        }
    }
}

/// 每个字段取 `Default::default()`
fn default_construction(fields: &Fields) -> TokenStream {
    match fields {
        Fields::Named(fields) => {
            let idents = fields.named.iter().map(|f| &f.ident);
            quote! {
                ::core::result::Result::Ok(Self {
                    #(#idents: ::core::default::Default::default()),*
                })
            }
        }
        _ => quote! { ::core::result::Result::Ok(Self) },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    #[test]
    fn test_generates_injection_match() {
        let input: DeriveInput = parse_quote! {
            #[component("userService")]
            #[scope("prototype")]
            struct UserService {
                #[autowired("orderService")]
                order_service: Autowired<OrderService>,
                #[autowired]
                clock: Autowired<Clock>,
                visits: u64,
            }
        };

        let output = derive_component_impl(input).to_string();
        assert!(output.contains("\"orderService\" => self . order_service . inject"));
        assert!(output.contains("\"clock\" => self . clock . inject"));
        assert!(output.contains("Some (\"prototype\")"));
        assert!(output.contains("visits : :: core :: default :: Default :: default ()"));
    }

    #[test]
    fn test_default_bean_name_and_unit_struct() {
        let input: DeriveInput = parse_quote! {
            struct OrderService;
        };

        let output = derive_component_impl(input).to_string();
        assert!(output.contains("Some (\"orderService\")"));
        assert!(output.contains("Ok (Self)"));
        assert!(output.contains("scope : :: core :: option :: Option :: None"));
    }

    #[test]
    fn test_custom_constructor() {
        let input: DeriveInput = parse_quote! {
            #[constructor("connect")]
            struct Pool {
                size: usize,
            }
        };

        let output = derive_component_impl(input).to_string();
        assert!(output.contains("Self :: connect ()"));
    }
}
