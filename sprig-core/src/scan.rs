//! 组件扫描
//!
//! 扫描器本身不关心候选类型从哪里来，只依赖三个协作者：
//! - [`TypeSource`]：列出扫描根下的候选类型标识
//! - [`TypeLoader`]：把类型标识解析为类型描述
//! - [`MetadataProvider`]：读取类型声明的组件名称和作用域
//!
//! [`ComponentCatalog`] 同时实现这三者，默认由 `#[derive(Component)]` 生成的
//! inventory 注册项填充，也可以手动构建。

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::bean::{component_type, BeanDefinition, BeanType};
use crate::component::{Component, ComponentMetadata, ComponentRegistration};
use crate::error::{ContainerError, ContainerResult, ScanError};
use crate::registry::BeanDefinitionRegistry;
use crate::Scope;

/// 扫描根 - 一个 Rust 模块路径，例如 `my_app::service`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScanRoot(String);

impl ScanRoot {
    /// 校验并创建扫描根
    pub fn parse(root: impl Into<String>) -> ContainerResult<Self> {
        let root = root.into();
        let root_err = |reason: &str| ContainerError::ScanRoot {
            root: root.clone(),
            reason: reason.to_string(),
        };

        if root.trim().is_empty() {
            return Err(root_err("scan root is empty"));
        }

        for segment in root.split("::") {
            if !is_identifier(segment) {
                return Err(root_err(&format!("'{}' is not a valid path segment", segment)));
            }
        }

        Ok(Self(root))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 类型标识是否位于扫描根之下
    pub fn contains(&self, type_id: &str) -> bool {
        type_id == self.0
            || type_id
                .strip_prefix(self.0.as_str())
                .is_some_and(|rest| rest.starts_with("::"))
    }
}

impl fmt::Display for ScanRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn is_identifier(segment: &str) -> bool {
    let segment = segment.strip_prefix("r#").unwrap_or(segment);
    let mut chars = segment.chars();
    match chars.next() {
        Some(first) if first == '_' || first.is_alphabetic() => {
            chars.all(|c| c == '_' || c.is_alphanumeric())
        }
        _ => false,
    }
}

/// 类型发现源
pub trait TypeSource: Send + Sync {
    /// 列出扫描根下的全部候选类型标识
    ///
    /// 扫描根不可访问时返回 [`ContainerError::ScanRoot`]，容器启动失败。
    fn candidate_types(&self, root: &ScanRoot) -> ContainerResult<Vec<String>>;
}

/// 类型加载器
pub trait TypeLoader: Send + Sync {
    fn load(&self, type_id: &str) -> Result<Arc<dyn BeanType>, ScanError>;
}

/// 元数据提供者
pub trait MetadataProvider: Send + Sync {
    /// 返回组件元数据，`None` 表示不是组件
    fn describe(&self, type_id: &str) -> Option<ComponentMetadata>;
}

/// 目录中的一个类型
#[derive(Clone)]
struct CatalogEntry {
    descriptor: Arc<dyn BeanType>,
    metadata: Option<ComponentMetadata>,
}

/// 组件目录 - 类型标识到类型描述和元数据的映射
#[derive(Clone, Default)]
pub struct ComponentCatalog {
    entries: BTreeMap<String, CatalogEntry>,
}

impl ComponentCatalog {
    pub fn builder() -> ComponentCatalogBuilder {
        ComponentCatalogBuilder::default()
    }

    /// 收集所有通过 `#[derive(Component)]` 声明的类型
    pub fn from_inventory() -> Self {
        let mut builder = Self::builder();
        for registration in inventory::iter::<ComponentRegistration>() {
            builder.insert(
                registration.type_path,
                (registration.descriptor)(),
                registration.metadata(),
            );
        }
        builder.build()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn type_ids(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

impl fmt::Debug for ComponentCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentCatalog")
            .field("types", &self.entries.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl TypeSource for ComponentCatalog {
    fn candidate_types(&self, root: &ScanRoot) -> ContainerResult<Vec<String>> {
        Ok(self
            .entries
            .keys()
            .filter(|type_id| root.contains(type_id))
            .cloned()
            .collect())
    }
}

impl TypeLoader for ComponentCatalog {
    fn load(&self, type_id: &str) -> Result<Arc<dyn BeanType>, ScanError> {
        self.entries
            .get(type_id)
            .map(|entry| Arc::clone(&entry.descriptor))
            .ok_or_else(|| ScanError::Unresolvable {
                type_id: type_id.to_string(),
            })
    }
}

impl MetadataProvider for ComponentCatalog {
    fn describe(&self, type_id: &str) -> Option<ComponentMetadata> {
        self.entries
            .get(type_id)
            .and_then(|entry| entry.metadata.clone())
    }
}

/// 手动构建组件目录
#[derive(Default)]
pub struct ComponentCatalogBuilder {
    entries: BTreeMap<String, CatalogEntry>,
}

impl ComponentCatalogBuilder {
    /// 声明一个组件类型
    pub fn component<T: Component>(
        mut self,
        type_id: impl Into<String>,
        metadata: ComponentMetadata,
    ) -> Self {
        self.insert(type_id, component_type::<T>(), Some(metadata));
        self
    }

    /// 声明一个可加载但不是组件的类型
    pub fn plain_type<T: Component>(mut self, type_id: impl Into<String>) -> Self {
        self.insert(type_id, component_type::<T>(), None);
        self
    }

    /// 用任意类型描述声明条目
    pub fn descriptor(
        mut self,
        type_id: impl Into<String>,
        descriptor: Arc<dyn BeanType>,
        metadata: Option<ComponentMetadata>,
    ) -> Self {
        self.insert(type_id, descriptor, metadata);
        self
    }

    fn insert(
        &mut self,
        type_id: impl Into<String>,
        descriptor: Arc<dyn BeanType>,
        metadata: Option<ComponentMetadata>,
    ) {
        self.entries.insert(
            type_id.into(),
            CatalogEntry {
                descriptor,
                metadata,
            },
        );
    }

    pub fn build(self) -> ComponentCatalog {
        ComponentCatalog {
            entries: self.entries,
        }
    }
}

/// 组件扫描器 - 启动时构建一次定义注册表
pub struct ComponentScanner {
    source: Arc<dyn TypeSource>,
    loader: Arc<dyn TypeLoader>,
    metadata: Arc<dyn MetadataProvider>,
}

impl ComponentScanner {
    pub fn new(
        source: Arc<dyn TypeSource>,
        loader: Arc<dyn TypeLoader>,
        metadata: Arc<dyn MetadataProvider>,
    ) -> Self {
        Self {
            source,
            loader,
            metadata,
        }
    }

    /// 用同一个组件目录充当全部协作者
    pub fn from_catalog(catalog: Arc<ComponentCatalog>) -> Self {
        Self::new(catalog.clone(), catalog.clone(), catalog)
    }

    /// 扫描并构建定义注册表
    ///
    /// 单个候选类型加载失败只记录日志并跳过；扫描根不可访问则整体失败。
    pub fn scan(&self, root: &ScanRoot) -> ContainerResult<BeanDefinitionRegistry> {
        tracing::info!("Starting component scan under '{}'", root);

        let candidates = self.source.candidate_types(root).map_err(|e| {
            tracing::error!("Component scan under '{}' failed: {}", root, e);
            e
        })?;
        let total = candidates.len();

        if total == 0 {
            tracing::warn!("No candidate types found under '{}'", root);
        }

        let mut registry = BeanDefinitionRegistry::new();
        let mut skipped = 0usize;

        for (idx, type_id) in candidates.iter().enumerate() {
            let bean_type = match self.loader.load(type_id) {
                Ok(bean_type) => bean_type,
                Err(e) => {
                    tracing::warn!("Skipping candidate '{}': {}", type_id, e);
                    skipped += 1;
                    continue;
                }
            };

            let Some(metadata) = self.metadata.describe(type_id) else {
                tracing::trace!("'{}' is not a component", type_id);
                continue;
            };

            let scope = Scope::parse_or_default(metadata.scope.as_deref());
            tracing::debug!(
                "Registering component [{}/{}]: '{}' ({}, {})",
                idx + 1,
                total,
                metadata.name,
                type_id,
                scope
            );
            registry.register(metadata.name, BeanDefinition::new(bean_type, scope));
        }

        tracing::info!(
            "Component scan completed, registered {} bean(s), skipped {} candidate(s)",
            registry.len(),
            skipped
        );
        Ok(registry)
    }
}
