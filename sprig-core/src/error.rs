//! 错误类型
//!
//! 容器内部使用 `thiserror` 定义结构化错误，用户提供的构造函数则返回
//! `anyhow::Result`，由 [`ConstructionError`] 包装后进入容器错误链。

use thiserror::Error;

/// 容器操作的统一结果类型
pub type ContainerResult<T> = std::result::Result<T, ContainerError>;

/// 应用启动的统一结果类型
pub type ApplicationResult<T> = std::result::Result<T, ApplicationError>;

/// 容器错误
#[derive(Debug, Error)]
pub enum ContainerError {
    /// 请求的 Bean 名称没有对应的定义
    #[error("No bean named '{0}' is defined")]
    UnknownBean(String),

    /// Bean 无法被默认构造
    #[error("Failed to instantiate bean '{name}': {source}")]
    Construction {
        name: String,
        #[source]
        source: ConstructionError,
    },

    /// 注入字段时解析依赖失败
    #[error("Failed to inject field '{field}' of bean '{bean}': {source}")]
    InjectionFailed {
        bean: String,
        field: String,
        #[source]
        source: Box<ContainerError>,
    },

    /// 字段赋值被类型描述拒绝
    #[error(transparent)]
    Injection(#[from] InjectionError),

    /// 类型化访问时类型不匹配
    #[error("Bean '{name}' is of type '{found}', expected '{expected}'")]
    TypeMismatch {
        name: String,
        expected: &'static str,
        found: &'static str,
    },

    /// 扫描根不可访问，容器无法启动
    #[error("Cannot scan components under '{root}': {reason}")]
    ScanRoot { root: String, reason: String },
}

impl ContainerError {
    /// 沿着注入链找到最内层的错误
    pub fn root_cause(&self) -> &ContainerError {
        match self {
            ContainerError::InjectionFailed { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

/// 默认构造失败
#[derive(Debug, Error)]
#[error("{type_name} could not be constructed: {source}")]
pub struct ConstructionError {
    pub type_name: &'static str,
    #[source]
    pub source: anyhow::Error,
}

impl ConstructionError {
    pub fn new(type_name: &'static str, source: impl Into<anyhow::Error>) -> Self {
        Self {
            type_name,
            source: source.into(),
        }
    }
}

/// 字段注入错误
#[derive(Debug, Error)]
pub enum InjectionError {
    /// 类型上不存在该注入字段
    #[error("{type_name} has no injectable field '{field}'")]
    UnknownField {
        type_name: &'static str,
        field: String,
    },

    /// 注入值的类型与字段声明不符
    #[error("field '{field}' expects '{expected}', got a bean of another type")]
    TypeMismatch {
        field: String,
        expected: &'static str,
    },

    /// 被注入的实例不是描述所对应的类型
    #[error("instance is not a {expected}")]
    InstanceMismatch { expected: &'static str },
}

/// 扫描单个候选类型时的错误，只记录日志，不中断扫描
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("type '{type_id}' cannot be resolved")]
    Unresolvable { type_id: String },

    #[error("type '{type_id}' failed to load: {reason}")]
    Load { type_id: String, reason: String },
}

/// 应用启动错误
#[derive(Debug, Error)]
pub enum ApplicationError {
    #[error(transparent)]
    Container(#[from] ContainerError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to initialize logging: {0}")]
    LoggingInitFailed(String),
}
