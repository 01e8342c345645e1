use proc_macro2::TokenStream;
use quote::quote;
use syn::DeriveInput;

use crate::attribute_helpers::get_scan_root;

/// 根配置类型：未指定扫描根时使用类型所在的模块路径
pub(crate) fn derive_component_scan_impl(input: DeriveInput) -> TokenStream {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let scan_root = match get_scan_root(&input.attrs) {
        Some(root) => quote! { #root },
        None => quote! { ::core::module_path!() },
    };

    quote! {
        impl #impl_generics ::sprig_core::ComponentScan for #name #ty_generics #where_clause {
            fn scan_root() -> &'static str {
                #scan_root
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    #[test]
    fn test_explicit_scan_root() {
        let input: DeriveInput = parse_quote! {
            #[component_scan("shop::service")]
            struct AppConfig;
        };
        let output = derive_component_scan_impl(input).to_string();
        assert!(output.contains("\"shop::service\""));
    }

    #[test]
    fn test_default_scan_root_is_module_path() {
        let input: DeriveInput = parse_quote! {
            struct AppConfig;
        };
        let output = derive_component_scan_impl(input).to_string();
        assert!(output.contains("module_path !"));
    }
}
