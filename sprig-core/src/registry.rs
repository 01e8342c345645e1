//! Bean 定义注册表
//!
//! 启动扫描时构建一次，之后移交给 Bean 工厂只读使用，读取无需加锁。

use std::collections::HashMap;

use crate::bean::BeanDefinition;
use crate::error::{ContainerError, ContainerResult};

#[derive(Debug, Default, Clone)]
pub struct BeanDefinitionRegistry {
    definitions: HashMap<String, BeanDefinition>,
}

impl BeanDefinitionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册 Bean 定义，同名定义会被覆盖
    pub fn register(&mut self, name: impl Into<String>, definition: BeanDefinition) {
        let name = name.into();

        tracing::trace!(
            "Registering bean: name='{}', type='{}', scope={}",
            name,
            definition.bean_type().type_name(),
            definition.scope()
        );

        if let Some(previous) = self.definitions.insert(name.clone(), definition) {
            tracing::warn!(
                "Bean definition '{}' of type '{}' overridden",
                name,
                previous.bean_type().type_name()
            );
        } else {
            tracing::debug!("Bean definition registered successfully: '{}'", name);
        }
    }

    /// 查找 Bean 定义
    pub fn lookup(&self, name: &str) -> ContainerResult<&BeanDefinition> {
        self.definitions
            .get(name)
            .ok_or_else(|| ContainerError::UnknownBean(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.definitions.contains_key(name)
    }

    pub fn names(&self) -> Vec<String> {
        self.definitions.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &BeanDefinition)> {
        self.definitions
            .iter()
            .map(|(name, definition)| (name.as_str(), definition))
    }
}
