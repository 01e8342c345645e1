// sprig-core: 轻量级依赖注入容器
//
// 提供按名称获取组件实例的容器，支持：
// - 单例和原型作用域
// - 启动时按模块路径扫描组件
// - 字段注入（通过宏）
// - 并发安全的单例创建

pub mod app;
pub mod bean;
pub mod bean_factory;
pub mod component;
pub mod config;
pub mod context;
pub mod error;
pub mod logging;
pub mod registry;
pub mod scan;
pub mod scope;
pub mod singleton;

// 重新导出常用类型
pub use app::SprigApplication;
pub use bean::{component_type, Autowired, BeanDefinition, BeanRef, BeanType, ComponentType};
pub use bean_factory::{BeanFactory, BeanFactoryExt, DefaultBeanFactory, ListableBeanFactory};
pub use component::{Component, ComponentMetadata, ComponentRegistration, ComponentScan};
pub use config::{
    ConfigValue, Environment, EnvironmentPropertySource, MapPropertySource, PropertySource,
    TomlPropertySource,
};
pub use context::{ApplicationContext, ApplicationContextBuilder};
pub use error::{
    ApplicationError, ApplicationResult, ConstructionError, ContainerError, ContainerResult,
    InjectionError, ScanError,
};
pub use logging::{LogFormat, LogLevel, LoggingConfig};
pub use registry::BeanDefinitionRegistry;
pub use scan::{
    ComponentCatalog, ComponentCatalogBuilder, ComponentScanner, MetadataProvider, ScanRoot,
    TypeLoader, TypeSource,
};
pub use scope::Scope;
pub use singleton::SingletonRegistry;

// 导出 inventory 和 anyhow，供宏使用
pub use anyhow;
pub use inventory;

/// Prelude 模块，包含常用的 traits 和类型
pub mod prelude {
    pub use crate::app::SprigApplication;
    pub use crate::bean::{Autowired, BeanRef};
    pub use crate::bean_factory::{BeanFactory, BeanFactoryExt, ListableBeanFactory};
    pub use crate::component::{Component, ComponentScan};
    pub use crate::config::{ConfigValue, Environment};
    pub use crate::context::ApplicationContext;
    pub use crate::error::{ApplicationResult, ContainerError, ContainerResult};
    pub use crate::logging::{LogFormat, LogLevel, LoggingConfig};
    pub use crate::scope::Scope;
    // Re-export anyhow for convenience
    pub use anyhow::{anyhow, Context};
}
