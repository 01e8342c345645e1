mod attribute_helpers;
mod component_impl;
mod component_scan_impl;

use proc_macro::TokenStream;
use proc_macro_error::proc_macro_error;
use syn::{parse_macro_input, DeriveInput};

/// Component派生宏
///
/// 生成 `sprig_core::Component` 实现，并把类型注册到组件目录中，
/// 启动扫描时按模块路径发现。
///
/// 用法：
/// ```ignore
/// #[derive(Component)]
/// #[component("userService")]  // 可选：指定bean名称，默认为类型名的 camelCase
/// #[scope("prototype")]        // 可选：指定作用域，未识别的值按 singleton 处理
/// #[constructor("connect")]    // 可选：构造函数，返回 Result<Self, E>
/// struct UserService {
///     #[autowired("orderService")]  // 注入名称即依赖的bean名称，默认为字段名
///     order_service: Autowired<OrderService>,
/// }
/// ```
///
/// 未指定构造函数时，每个字段都使用 `Default::default()` 构造。
#[proc_macro_derive(Component, attributes(component, scope, constructor, autowired))]
#[proc_macro_error]
pub fn derive_component(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    component_impl::derive_component_impl(input).into()
}

/// ComponentScan派生宏
///
/// 标记根配置类型，声明组件扫描的根路径
///
/// ```ignore
/// #[derive(ComponentScan)]
/// #[component_scan("my_app::service")]  // 可选：默认为该类型所在的模块路径
/// struct AppConfig;
/// ```
#[proc_macro_derive(ComponentScan, attributes(component_scan))]
#[proc_macro_error]
pub fn derive_component_scan(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    component_scan_impl::derive_component_scan_impl(input).into()
}
