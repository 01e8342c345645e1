use std::any::{Any, TypeId};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::component::Component;
use crate::error::{ConstructionError, InjectionError};
use crate::Scope;

/// 容器中的 Bean 实例
pub type BeanRef = Arc<dyn Any + Send + Sync>;

/// Bean 类型描述 - 容器创建和装配 Bean 所需的全部能力
///
/// 容器不关心字段的具体类型，只需要能默认构造实例、列出注入字段并给字段赋值。
pub trait BeanType: Send + Sync {
    /// 类型名称（用于日志和错误信息）
    fn type_name(&self) -> &'static str;

    /// 实例的 TypeId
    fn instance_type_id(&self) -> TypeId;

    /// 默认构造一个新实例
    fn instantiate(&self) -> Result<BeanRef, ConstructionError>;

    /// 标记为注入目标的字段名，字段名即依赖的 Bean 名称
    fn injectable_fields(&self) -> &'static [&'static str];

    /// 将依赖赋值给实例的字段
    fn set_field(&self, instance: &BeanRef, field: &str, value: BeanRef)
        -> Result<(), InjectionError>;
}

/// 由 [`Component`] 实现派生出的类型描述
pub struct ComponentType<T> {
    _phantom: PhantomData<fn() -> T>,
}

impl<T: Component> ComponentType<T> {
    pub fn new() -> Self {
        Self {
            _phantom: PhantomData,
        }
    }
}

impl<T: Component> Default for ComponentType<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Component> BeanType for ComponentType<T> {
    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }

    fn instance_type_id(&self) -> TypeId {
        TypeId::of::<T>()
    }

    fn instantiate(&self) -> Result<BeanRef, ConstructionError> {
        let instance = T::instantiate()
            .map_err(|e| ConstructionError::new(std::any::type_name::<T>(), e))?;
        Ok(Arc::new(instance))
    }

    fn injectable_fields(&self) -> &'static [&'static str] {
        T::injectable_fields()
    }

    fn set_field(
        &self,
        instance: &BeanRef,
        field: &str,
        value: BeanRef,
    ) -> Result<(), InjectionError> {
        let target = instance
            .downcast_ref::<T>()
            .ok_or(InjectionError::InstanceMismatch {
                expected: std::any::type_name::<T>(),
            })?;
        target.inject_field(field, value)
    }
}

/// 返回类型 `T` 的描述，供派生宏生成的注册项使用
pub fn component_type<T: Component>() -> Arc<dyn BeanType> {
    Arc::new(ComponentType::<T>::new())
}

/// 可注入字段
///
/// 实例构造完成后由容器赋值。每次从容器获取宿主 Bean 时都会重新赋值，
/// 因此内部用读写锁保护。
pub struct Autowired<T> {
    slot: RwLock<Option<Arc<T>>>,
}

impl<T: Any + Send + Sync> Autowired<T> {
    /// 创建一个尚未注入的字段
    pub fn new() -> Self {
        Self {
            slot: RwLock::new(None),
        }
    }

    /// 获取已注入的依赖
    pub fn get(&self) -> Option<Arc<T>> {
        self.slot.read().clone()
    }

    pub fn is_injected(&self) -> bool {
        self.slot.read().is_some()
    }

    /// 注入依赖，值的类型必须是 `T`
    pub fn inject(&self, field: &str, value: BeanRef) -> Result<(), InjectionError> {
        let bean = value
            .downcast::<T>()
            .map_err(|_| InjectionError::TypeMismatch {
                field: field.to_string(),
                expected: std::any::type_name::<T>(),
            })?;
        *self.slot.write() = Some(bean);
        Ok(())
    }
}

impl<T: Any + Send + Sync> Default for Autowired<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Autowired<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Autowired")
            .field("type_name", &std::any::type_name::<T>())
            .field("injected", &self.slot.read().is_some())
            .finish()
    }
}

/// Bean 定义 - 描述如何创建和管理 Bean
///
/// 注册后不可变，克隆只增加类型描述的引用计数。
#[derive(Clone)]
pub struct BeanDefinition {
    bean_type: Arc<dyn BeanType>,
    scope: Scope,
}

impl BeanDefinition {
    /// 创建新的 Bean 定义
    pub fn new(bean_type: Arc<dyn BeanType>, scope: Scope) -> Self {
        Self { bean_type, scope }
    }

    /// 以单例作用域描述组件类型 `T`
    pub fn of<T: Component>() -> Self {
        Self::new(component_type::<T>(), Scope::default())
    }

    /// 设置作用域
    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    pub fn bean_type(&self) -> &Arc<dyn BeanType> {
        &self.bean_type
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    pub fn is_singleton(&self) -> bool {
        self.scope == Scope::Singleton
    }

    pub fn is_prototype(&self) -> bool {
        self.scope == Scope::Prototype
    }
}

impl fmt::Debug for BeanDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BeanDefinition")
            .field("scope", &self.scope)
            .field("type_name", &self.bean_type.type_name())
            .field("injectable_fields", &self.bean_type.injectable_fields())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Repository;

    impl Component for Repository {
        fn instantiate() -> anyhow::Result<Self> {
            Ok(Repository)
        }
    }

    #[derive(Default)]
    struct Service {
        repository: Autowired<Repository>,
    }

    impl Component for Service {
        fn instantiate() -> anyhow::Result<Self> {
            Ok(Service::default())
        }

        fn injectable_fields() -> &'static [&'static str] {
            &["repository"]
        }

        fn inject_field(&self, field: &str, value: BeanRef) -> Result<(), InjectionError> {
            match field {
                "repository" => self.repository.inject(field, value),
                _ => Err(InjectionError::UnknownField {
                    type_name: std::any::type_name::<Self>(),
                    field: field.to_string(),
                }),
            }
        }
    }

    #[test]
    fn test_definition_predicates() {
        let definition = BeanDefinition::of::<Repository>();
        assert!(definition.is_singleton());
        assert!(!definition.is_prototype());

        let definition = definition.with_scope(Scope::Prototype);
        assert!(definition.is_prototype());
        assert!(!definition.is_singleton());
        assert_eq!(definition.bean_type().instance_type_id(), TypeId::of::<Repository>());
    }

    #[test]
    fn test_component_type_sets_fields() {
        let bean_type = component_type::<Service>();
        assert_eq!(bean_type.injectable_fields(), &["repository"]);

        let instance = bean_type.instantiate().unwrap();
        let repository: BeanRef = Arc::new(Repository);
        bean_type
            .set_field(&instance, "repository", Arc::clone(&repository))
            .unwrap();

        let service = instance.downcast_ref::<Service>().unwrap();
        let injected = service.repository.get().unwrap();
        let expected = repository.downcast::<Repository>().unwrap();
        assert!(Arc::ptr_eq(&injected, &expected));
    }

    #[test]
    fn test_set_field_rejects_unknown_field_and_wrong_type() {
        let bean_type = component_type::<Service>();
        let instance = bean_type.instantiate().unwrap();

        let err = bean_type
            .set_field(&instance, "cache", Arc::new(Repository))
            .unwrap_err();
        assert!(matches!(err, InjectionError::UnknownField { .. }));

        let err = bean_type
            .set_field(&instance, "repository", Arc::new(42u32))
            .unwrap_err();
        assert!(matches!(err, InjectionError::TypeMismatch { .. }));

        let other: BeanRef = Arc::new(Repository);
        let err = bean_type
            .set_field(&other, "repository", Arc::new(Repository))
            .unwrap_err();
        assert!(matches!(err, InjectionError::InstanceMismatch { .. }));
    }

    #[test]
    fn test_autowired_starts_empty() {
        let field: Autowired<Repository> = Autowired::default();
        assert!(!field.is_injected());
        assert!(field.get().is_none());
        assert!(format!("{:?}", field).contains("injected: false"));
    }
}
