//! Bean Factory - 核心容器接口
//!
//! 参考 Spring 的 BeanFactory 架构设计

use std::any::Any;
use std::sync::Arc;

use crate::{
    bean::{BeanDefinition, BeanRef},
    error::{ContainerError, ContainerResult},
    registry::BeanDefinitionRegistry,
    singleton::SingletonRegistry,
};

/// BeanFactory - 最基础的容器接口
///
/// 注意：此 trait 不包含泛型方法，因此可以作为 trait object 使用
pub trait BeanFactory: Send + Sync {
    /// 通过名称获取 Bean
    fn get_bean(&self, name: &str) -> ContainerResult<BeanRef>;

    /// 检查是否包含指定名称的 Bean
    fn contains_bean(&self, name: &str) -> bool;

    /// 指定名称的 Bean 是否为单例
    fn is_singleton(&self, name: &str) -> ContainerResult<bool>;

    /// 指定名称的 Bean 是否为原型
    fn is_prototype(&self, name: &str) -> ContainerResult<bool>;

    /// 指定名称的 Bean 的类型名称
    fn type_name_of(&self, name: &str) -> Option<&'static str>;
}

/// BeanFactoryExt - BeanFactory 的扩展 trait
///
/// 提供泛型方法，不能作为 trait object 使用
pub trait BeanFactoryExt: BeanFactory {
    /// 通过名称获取 Bean 并转换为具体类型
    fn get_bean_as<T: Any + Send + Sync>(&self, name: &str) -> ContainerResult<Arc<T>>;
}

impl<F: BeanFactory + ?Sized> BeanFactoryExt for F {
    fn get_bean_as<T: Any + Send + Sync>(&self, name: &str) -> ContainerResult<Arc<T>> {
        let bean = self.get_bean(name)?;
        bean.downcast::<T>()
            .map_err(|_| ContainerError::TypeMismatch {
                name: name.to_string(),
                expected: std::any::type_name::<T>(),
                found: self.type_name_of(name).unwrap_or("unknown"),
            })
    }
}

/// ListableBeanFactory - 可列举的 Bean 工厂
pub trait ListableBeanFactory: BeanFactory {
    /// 获取所有 Bean 的名称
    fn get_bean_names(&self) -> Vec<String>;

    /// 获取 Bean 定义的数量
    fn get_bean_definition_count(&self) -> usize;

    /// 获取单个 Bean 定义
    fn get_bean_definition(&self, name: &str) -> ContainerResult<BeanDefinition>;
}

/// DefaultBeanFactory - 默认的 Bean 工厂实现
///
/// 持有只读的定义注册表和单例缓存。获取 Bean 的流程：
/// 1. 查找定义
/// 2. 原型直接构造；单例先查缓存，未命中时在创建锁内构造一次并缓存
/// 3. 无论作用域，返回前为每个注入字段递归获取依赖并赋值
///
/// 依赖的 Bean 名称就是字段名。递归解析没有循环检测，
/// 存在循环依赖时会一直递归直到栈溢出。
pub struct DefaultBeanFactory {
    /// Bean 定义存储（只读）
    definitions: BeanDefinitionRegistry,

    /// 单例 Bean 缓存
    singletons: SingletonRegistry,
}

impl DefaultBeanFactory {
    /// 用构建完成的注册表创建 Bean 工厂
    pub fn new(definitions: BeanDefinitionRegistry) -> Self {
        Self {
            definitions,
            singletons: SingletonRegistry::new(),
        }
    }

    pub fn definitions(&self) -> &BeanDefinitionRegistry {
        &self.definitions
    }

    /// 已创建的单例数量
    pub fn singleton_count(&self) -> usize {
        self.singletons.len()
    }

    /// 默认构造实例
    fn instantiate(&self, name: &str, definition: &BeanDefinition) -> ContainerResult<BeanRef> {
        definition
            .bean_type()
            .instantiate()
            .map_err(|source| ContainerError::Construction {
                name: name.to_string(),
                source,
            })
    }

    /// 为实例的注入字段赋值
    fn inject_fields(
        &self,
        name: &str,
        definition: &BeanDefinition,
        bean: &BeanRef,
    ) -> ContainerResult<()> {
        let bean_type = definition.bean_type();

        for field in bean_type.injectable_fields() {
            tracing::trace!("Injecting field '{}' of bean '{}'", field, name);

            let dependency = self.get_bean(field).map_err(|e| {
                tracing::debug!("Cannot resolve dependency '{}' for bean '{}': {}", field, name, e);
                ContainerError::InjectionFailed {
                    bean: name.to_string(),
                    field: field.to_string(),
                    source: Box::new(e),
                }
            })?;

            bean_type
                .set_field(bean, field, dependency)
                .map_err(|e| ContainerError::InjectionFailed {
                    bean: name.to_string(),
                    field: field.to_string(),
                    source: Box::new(ContainerError::Injection(e)),
                })?;
        }

        Ok(())
    }
}

impl BeanFactory for DefaultBeanFactory {
    fn get_bean(&self, name: &str) -> ContainerResult<BeanRef> {
        tracing::trace!("Requesting bean: '{}'", name);

        let definition = self.definitions.lookup(name).map_err(|e| {
            tracing::debug!("Bean '{}' not found in container", name);
            e
        })?;

        let bean = if definition.is_prototype() {
            tracing::debug!("Creating new instance of prototype bean '{}'", name);
            self.instantiate(name, definition)?
        } else {
            self.singletons
                .get_or_create(name, || self.instantiate(name, definition))?
        };

        self.inject_fields(name, definition, &bean)?;

        Ok(bean)
    }

    fn contains_bean(&self, name: &str) -> bool {
        self.definitions.contains(name)
    }

    fn is_singleton(&self, name: &str) -> ContainerResult<bool> {
        Ok(self.definitions.lookup(name)?.is_singleton())
    }

    fn is_prototype(&self, name: &str) -> ContainerResult<bool> {
        Ok(self.definitions.lookup(name)?.is_prototype())
    }

    fn type_name_of(&self, name: &str) -> Option<&'static str> {
        self.definitions
            .lookup(name)
            .ok()
            .map(|definition| definition.bean_type().type_name())
    }
}

impl ListableBeanFactory for DefaultBeanFactory {
    fn get_bean_names(&self) -> Vec<String> {
        self.definitions.names()
    }

    fn get_bean_definition_count(&self) -> usize {
        self.definitions.len()
    }

    fn get_bean_definition(&self, name: &str) -> ContainerResult<BeanDefinition> {
        self.definitions.lookup(name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bean::Autowired;
    use crate::error::InjectionError;
    use crate::{Component, Scope};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug)]
    struct OrderService;

    impl Component for OrderService {
        fn instantiate() -> anyhow::Result<Self> {
            Ok(OrderService)
        }
    }

    static CLOCK_CREATED: AtomicUsize = AtomicUsize::new(0);

    struct Clock;

    impl Component for Clock {
        fn instantiate() -> anyhow::Result<Self> {
            CLOCK_CREATED.fetch_add(1, Ordering::SeqCst);
            Ok(Clock)
        }
    }

    #[derive(Default, Debug)]
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
            match field {
                "orderService" => self.order_service.inject(field, value),
                _ => Err(InjectionError::UnknownField {
                    type_name: std::any::type_name::<Self>(),
                    field: field.to_string(),
                }),
            }
        }
    }

    struct Broken;

    impl Component for Broken {
        fn instantiate() -> anyhow::Result<Self> {
            Err(anyhow::anyhow!("no default constructor"))
        }
    }

    fn factory() -> DefaultBeanFactory {
        let mut registry = BeanDefinitionRegistry::new();
        registry.register("orderService", BeanDefinition::of::<OrderService>());
        registry.register(
            "userService",
            BeanDefinition::of::<UserService>().with_scope(Scope::Prototype),
        );
        registry.register("broken", BeanDefinition::of::<Broken>());
        DefaultBeanFactory::new(registry)
    }

    #[test]
    fn test_prototype_with_singleton_dependency() {
        let factory = factory();

        let first = factory.get_bean_as::<UserService>("userService").unwrap();
        let second = factory.get_bean_as::<UserService>("userService").unwrap();
        assert!(!Arc::ptr_eq(&first, &second));

        let direct = factory.get_bean_as::<OrderService>("orderService").unwrap();
        let first_dep = first.order_service.get().unwrap();
        let second_dep = second.order_service.get().unwrap();
        assert!(Arc::ptr_eq(&first_dep, &second_dep));
        assert!(Arc::ptr_eq(&first_dep, &direct));
    }

    #[test]
    fn test_unknown_bean() {
        let factory = factory();
        let err = factory.get_bean("paymentService").unwrap_err();
        assert!(matches!(err, ContainerError::UnknownBean(name) if name == "paymentService"));
        assert_eq!(factory.singleton_count(), 0);
    }

    #[test]
    fn test_construction_failure_is_not_cached() {
        let factory = factory();

        for _ in 0..2 {
            let err = factory.get_bean("broken").unwrap_err();
            assert!(matches!(err, ContainerError::Construction { ref name, .. } if name == "broken"));
        }
        assert_eq!(factory.singleton_count(), 0);
    }

    #[test]
    fn test_type_mismatch() {
        let factory = factory();
        let err = factory.get_bean_as::<UserService>("orderService").unwrap_err();
        match err {
            ContainerError::TypeMismatch { name, expected, found } => {
                assert_eq!(name, "orderService");
                assert_eq!(expected, std::any::type_name::<UserService>());
                assert_eq!(found, std::any::type_name::<OrderService>());
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(factory.type_name_of("missing"), None);
    }

    #[test]
    fn test_scope_queries() {
        let factory = factory();
        assert!(factory.is_singleton("orderService").unwrap());
        assert!(factory.is_prototype("userService").unwrap());
        assert!(factory.is_singleton("missing").is_err());
        assert!(factory.contains_bean("broken"));
        assert_eq!(factory.get_bean_definition_count(), 3);

        let mut names = factory.get_bean_names();
        names.sort();
        assert_eq!(names, vec!["broken", "orderService", "userService"]);
    }

    #[test]
    fn test_missing_dependency_fails_injection() {
        let mut registry = BeanDefinitionRegistry::new();
        registry.register("userService", BeanDefinition::of::<UserService>());
        let factory = DefaultBeanFactory::new(registry);

        let err = factory.get_bean("userService").unwrap_err();
        match &err {
            ContainerError::InjectionFailed { bean, field, .. } => {
                assert_eq!(bean, "userService");
                assert_eq!(field, "orderService");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(matches!(err.root_cause(), ContainerError::UnknownBean(name) if name == "orderService"));
    }

    #[test]
    fn test_singleton_constructed_once() {
        let mut registry = BeanDefinitionRegistry::new();
        registry.register("clock", BeanDefinition::of::<Clock>());
        let factory = DefaultBeanFactory::new(registry);

        let a = factory.get_bean("clock").unwrap();
        let b = factory.get_bean("clock").unwrap();

        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(CLOCK_CREATED.load(Ordering::SeqCst), 1);
        assert_eq!(factory.singleton_count(), 1);
    }
}
