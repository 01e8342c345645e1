//! 单例缓存
//!
//! 每个单例名称经历三个状态：未请求 → 构造中 → 已缓存。
//! 读路径只取共享读锁；缓存未命中时获取容器级的创建锁，再次检查缓存后才构造，
//! 并在释放创建锁之前写入缓存，保证同名单例最多构造一次。

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::bean::BeanRef;
use crate::error::ContainerResult;

#[derive(Default)]
pub struct SingletonRegistry {
    /// 单例 Bean 缓存，条目写入后不再替换或移除
    singletons: RwLock<HashMap<String, BeanRef>>,

    /// 容器级创建锁
    creation_lock: Mutex<()>,
}

impl SingletonRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 获取已缓存的单例
    pub fn get(&self, name: &str) -> Option<BeanRef> {
        self.singletons.read().get(name).map(Arc::clone)
    }

    /// 获取单例，不存在时调用 `create` 构造并缓存
    ///
    /// 构造失败时不写入缓存，下一次调用会重新构造。创建锁由守卫持有，
    /// 任何返回路径上都会释放。
    pub fn get_or_create<F>(&self, name: &str, create: F) -> ContainerResult<BeanRef>
    where
        F: FnOnce() -> ContainerResult<BeanRef>,
    {
        if let Some(bean) = self.get(name) {
            tracing::debug!("Returning cached instance of singleton bean '{}'", name);
            return Ok(bean);
        }

        let _guard = self.creation_lock.lock();

        // 等待创建锁期间可能已有其他线程完成构造
        if let Some(bean) = self.get(name) {
            tracing::debug!(
                "Singleton bean '{}' was created while waiting for the creation lock",
                name
            );
            return Ok(bean);
        }

        tracing::info!("Creating shared instance of singleton bean '{}'", name);
        let bean = create()?;

        self.singletons
            .write()
            .insert(name.to_string(), Arc::clone(&bean));

        tracing::debug!("Singleton bean '{}' created and cached", name);
        Ok(bean)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.singletons.read().contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.singletons.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.singletons.read().is_empty()
    }

    pub fn names(&self) -> Vec<String> {
        self.singletons.read().keys().cloned().collect()
    }
}
