use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::bean_factory::{BeanFactory, DefaultBeanFactory, ListableBeanFactory};
use crate::{
    bean::{BeanDefinition, BeanRef},
    component::ComponentScan,
    config::Environment,
    error::ContainerResult,
    scan::{ComponentCatalog, ComponentScanner, MetadataProvider, ScanRoot, TypeLoader, TypeSource},
};

/// 应用上下文 - 容器的唯一入口
///
/// 上下文只能通过扫描构建出来，拿到实例即表示定义注册表已经就绪。
/// 之后的所有 `get_bean` 调用都委托给内部的 Bean 工厂。
pub struct ApplicationContext {
    /// Bean 工厂 - 负责 Bean 的创建和管理
    bean_factory: DefaultBeanFactory,

    /// 配置环境
    environment: Arc<Environment>,

    /// 扫描根
    scan_root: ScanRoot,

    /// 扫描完成的时刻
    started_at: Instant,
}

impl ApplicationContext {
    /// 以根配置类型指定扫描根，使用 inventory 收集到的全部组件
    pub fn new<C: ComponentScan>() -> ContainerResult<Self> {
        Self::builder().scan_root(C::scan_root()).build()
    }

    pub fn builder() -> ApplicationContextBuilder {
        ApplicationContextBuilder::new()
    }

    pub fn bean_factory(&self) -> &DefaultBeanFactory {
        &self.bean_factory
    }

    pub fn environment(&self) -> &Arc<Environment> {
        &self.environment
    }

    pub fn scan_root(&self) -> &ScanRoot {
        &self.scan_root
    }

    pub fn started_at(&self) -> Instant {
        self.started_at
    }

    /// 上下文启动以来经过的时间
    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// 已创建的单例数量
    pub fn singleton_count(&self) -> usize {
        self.bean_factory.singleton_count()
    }
}

impl std::fmt::Debug for ApplicationContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApplicationContext")
            .field("scan_root", &self.scan_root)
            .field("bean_definitions", &self.bean_factory.get_bean_definition_count())
            .field("singletons", &self.bean_factory.singleton_count())
            .finish()
    }
}

impl BeanFactory for ApplicationContext {
    fn get_bean(&self, name: &str) -> ContainerResult<BeanRef> {
        self.bean_factory.get_bean(name)
    }

    fn contains_bean(&self, name: &str) -> bool {
        self.bean_factory.contains_bean(name)
    }

    fn is_singleton(&self, name: &str) -> ContainerResult<bool> {
        self.bean_factory.is_singleton(name)
    }

    fn is_prototype(&self, name: &str) -> ContainerResult<bool> {
        self.bean_factory.is_prototype(name)
    }

    fn type_name_of(&self, name: &str) -> Option<&'static str> {
        self.bean_factory.type_name_of(name)
    }
}

impl ListableBeanFactory for ApplicationContext {
    fn get_bean_names(&self) -> Vec<String> {
        self.bean_factory.get_bean_names()
    }

    fn get_bean_definition_count(&self) -> usize {
        self.bean_factory.get_bean_definition_count()
    }

    fn get_bean_definition(&self, name: &str) -> ContainerResult<BeanDefinition> {
        self.bean_factory.get_bean_definition(name)
    }
}

/// ApplicationContext 构建器
///
/// 未指定的协作者默认使用 inventory 收集的组件目录。
#[derive(Default)]
pub struct ApplicationContextBuilder {
    scan_root: Option<String>,
    catalog: Option<Arc<ComponentCatalog>>,
    type_source: Option<Arc<dyn TypeSource>>,
    type_loader: Option<Arc<dyn TypeLoader>>,
    metadata_provider: Option<Arc<dyn MetadataProvider>>,
    environment: Option<Arc<Environment>>,
}

impl ApplicationContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scan_root(mut self, root: impl Into<String>) -> Self {
        self.scan_root = Some(root.into());
        self
    }

    /// 使用指定的组件目录代替 inventory
    pub fn catalog(mut self, catalog: ComponentCatalog) -> Self {
        self.catalog = Some(Arc::new(catalog));
        self
    }

    pub fn type_source(mut self, source: Arc<dyn TypeSource>) -> Self {
        self.type_source = Some(source);
        self
    }

    pub fn type_loader(mut self, loader: Arc<dyn TypeLoader>) -> Self {
        self.type_loader = Some(loader);
        self
    }

    pub fn metadata_provider(mut self, provider: Arc<dyn MetadataProvider>) -> Self {
        self.metadata_provider = Some(provider);
        self
    }

    pub fn environment(mut self, environment: Arc<Environment>) -> Self {
        self.environment = Some(environment);
        self
    }

    /// 扫描并构建上下文
    ///
    /// 扫描根缺失或格式错误时返回 `ScanRoot` 错误，不会产生上下文。
    pub fn build(self) -> ContainerResult<ApplicationContext> {
        let scan_root = ScanRoot::parse(self.scan_root.unwrap_or_default())?;

        // 未显式提供的协作者由同一个组件目录补齐
        let fallback = match self.catalog {
            Some(catalog) => catalog,
            None => Arc::new(ComponentCatalog::from_inventory()),
        };
        let scanner = ComponentScanner::new(
            self.type_source
                .unwrap_or_else(|| fallback.clone() as Arc<dyn TypeSource>),
            self.type_loader
                .unwrap_or_else(|| fallback.clone() as Arc<dyn TypeLoader>),
            self.metadata_provider.unwrap_or(fallback),
        );

        let registry = scanner.scan(&scan_root)?;
        tracing::info!(
            "Application context ready: {} bean definition(s) under '{}'",
            registry.len(),
            scan_root
        );

        Ok(ApplicationContext {
            bean_factory: DefaultBeanFactory::new(registry),
            environment: self.environment.unwrap_or_default(),
            scan_root,
            started_at: Instant::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bean::Autowired;
    use crate::bean_factory::BeanFactoryExt;
    use crate::error::{ContainerError, InjectionError};
    use crate::{Component, ComponentMetadata};

    struct OrderService;

    impl Component for OrderService {
        fn instantiate() -> anyhow::Result<Self> {
            Ok(OrderService)
        }
    }

    #[derive(Default)]
    struct UserService {
        order_service: Autowired<OrderService>,
    }

    impl Component for UserService {
        fn instantiate() -> anyhow::Result<Self> {
            Ok(UserService::default())
        }

        fn injectable_fields() -> &'static [&'static str] {
            &["orderService"]
        }

        fn inject_field(&self, field: &str, value: BeanRef) -> Result<(), InjectionError> {
            self.order_service.inject(field, value)
        }
    }

    fn catalog() -> ComponentCatalog {
        ComponentCatalog::builder()
            .component::<OrderService>(
                "shop::orders::OrderService",
                ComponentMetadata::new("orderService"),
            )
            .component::<UserService>(
                "shop::users::UserService",
                ComponentMetadata::new("userService").with_scope("prototype"),
            )
            .component::<OrderService>(
                "billing::InvoiceService",
                ComponentMetadata::new("invoiceService"),
            )
            .build()
    }

    #[test]
    fn test_build_from_catalog() {
        let context = ApplicationContext::builder()
            .scan_root("shop")
            .catalog(catalog())
            .build()
            .unwrap();

        assert_eq!(context.scan_root().as_str(), "shop");
        assert_eq!(context.get_bean_definition_count(), 2);
        assert!(!context.contains_bean("invoiceService"));

        let user = context.get_bean_as::<UserService>("userService").unwrap();
        let order = context.get_bean_as::<OrderService>("orderService").unwrap();
        assert!(Arc::ptr_eq(&user.order_service.get().unwrap(), &order));
        assert_eq!(context.singleton_count(), 1);
    }

    #[test]
    fn test_invalid_scan_root() {
        let err = ApplicationContext::builder()
            .scan_root("shop::")
            .catalog(catalog())
            .build()
            .unwrap_err();
        assert!(matches!(err, ContainerError::ScanRoot { .. }));
    }

    #[test]
    fn test_missing_scan_root() {
        let err = ApplicationContext::builder()
            .catalog(catalog())
            .build()
            .unwrap_err();
        assert!(matches!(err, ContainerError::ScanRoot { root, .. } if root.is_empty()));
    }

    #[test]
    fn test_explicit_collaborators() {
        let catalog = Arc::new(catalog());
        let context = ApplicationContext::builder()
            .scan_root("billing")
            .type_source(catalog.clone())
            .type_loader(catalog.clone())
            .metadata_provider(catalog)
            .build()
            .unwrap();

        assert_eq!(context.get_bean_names(), vec!["invoiceService".to_string()]);
        assert!(context.is_singleton("invoiceService").unwrap());
    }
}
