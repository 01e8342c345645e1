use std::sync::Arc;

use crate::bean::{BeanRef, BeanType};
use crate::error::InjectionError;

/// Component trait - 可以由容器构造和装配的类型
///
/// 通常通过 `#[derive(Component)]` 自动实现
///
/// # 示例
///
/// ```ignore
/// use sprig_core::prelude::*;
/// use sprig_core_macros::Component;
///
/// #[derive(Component, Default)]
/// #[component("userService")]
/// #[scope("prototype")]
/// struct UserService {
///     #[autowired]
///     order_service: Autowired<OrderService>,
/// }
/// ```
pub trait Component: Sized + Send + Sync + 'static {
    /// 默认构造实例，注入字段此时尚未赋值
    fn instantiate() -> anyhow::Result<Self>;

    /// 需要容器注入的字段名
    fn injectable_fields() -> &'static [&'static str] {
        &[]
    }

    /// 给指定字段赋值
    fn inject_field(&self, field: &str, _value: BeanRef) -> Result<(), InjectionError> {
        Err(InjectionError::UnknownField {
            type_name: std::any::type_name::<Self>(),
            field: field.to_string(),
        })
    }
}

/// 组件元数据：Bean 名称和声明的作用域
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentMetadata {
    pub name: String,
    /// 原始作用域字符串，由扫描器解释
    pub scope: Option<String>,
}

impl ComponentMetadata {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            scope: None,
        }
    }

    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }
}

/// 派生宏在编译期生成的组件注册项 - 用于 inventory 收集
pub struct ComponentRegistration {
    /// 类型标识，形如 `app::service::UserService`
    pub type_path: &'static str,
    /// Bean 名称，`None` 表示该类型不是组件
    pub bean_name: Option<&'static str>,
    pub scope: Option<&'static str>,
    pub descriptor: fn() -> Arc<dyn BeanType>,
}

impl ComponentRegistration {
    pub fn metadata(&self) -> Option<ComponentMetadata> {
        self.bean_name.map(|name| ComponentMetadata {
            name: name.to_string(),
            scope: self.scope.map(str::to_string),
        })
    }
}

inventory::collect!(ComponentRegistration);

/// 根配置 - 指定组件扫描的根路径
///
/// 通过 `#[derive(ComponentScan)]` 和 `#[component_scan("my_app::service")]` 实现
pub trait ComponentScan {
    fn scan_root() -> &'static str;
}
