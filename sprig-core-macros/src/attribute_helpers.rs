use proc_macro_error::abort;
use syn::{Attribute, LitStr};

/// 读取形如 `#[name("value")]` 的字符串参数
///
/// 属性不存在时返回 `None`；属性存在但参数不是字符串字面量时报编译错误。
fn get_str_arg(attrs: &[Attribute], ident: &str) -> Option<String> {
    let attr = attrs.iter().find(|attr| attr.path().is_ident(ident))?;
    match attr.parse_args::<LitStr>() {
        Ok(lit) => Some(lit.value()),
        Err(_) => abort!(
            attr,
            "expected a string literal, e.g. #[{}(\"...\")]",
            ident
        ),
    }
}

/// 从 `#[component("name")]` 中提取 bean 名称
pub(crate) fn get_bean_name(attrs: &[Attribute]) -> Option<String> {
    get_str_arg(attrs, "component")
}

/// 从 `#[scope("...")]` 中提取作用域
///
/// 原样保留字符串，未识别的值在扫描时按单例处理
pub(crate) fn get_scope(attrs: &[Attribute]) -> Option<String> {
    get_str_arg(attrs, "scope")
}

/// 从 `#[constructor("fn")]` 中提取构造函数名
pub(crate) fn get_constructor(attrs: &[Attribute]) -> Option<String> {
    get_str_arg(attrs, "constructor")
}

/// 从 `#[component_scan("path")]` 中提取扫描根
pub(crate) fn get_scan_root(attrs: &[Attribute]) -> Option<String> {
    get_str_arg(attrs, "component_scan")
}

/// 字段是否标记了 `#[autowired]`
pub(crate) fn is_autowired(attrs: &[Attribute]) -> bool {
    attrs.iter().any(|attr| attr.path().is_ident("autowired"))
}

/// 从 `#[autowired("beanName")]` 中提取注入名称
///
/// 只写 `#[autowired]` 时返回 `None`，注入名称即字段名
pub(crate) fn get_autowired_name(attrs: &[Attribute]) -> Option<String> {
    let attr = attrs.iter().find(|attr| attr.path().is_ident("autowired"))?;
    if matches!(attr.meta, syn::Meta::Path(_)) {
        return None;
    }
    match attr.parse_args::<LitStr>() {
        Ok(lit) => Some(lit.value()),
        Err(_) => abort!(attr, "expected #[autowired] or #[autowired(\"beanName\")]"),
    }
}

/// 将 PascalCase 转换为 camelCase
pub(crate) fn to_camel_case(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_lowercase().collect::<String>() + chars.as_str(),
    }
}
