use std::fmt;

/// Bean 的作用域
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Scope {
    /// 单例模式 - 容器中只有一个实例
    #[default]
    Singleton,

    /// 原型模式 - 每次请求都创建新实例
    Prototype,
}

impl Scope {
    pub const SINGLETON: &'static str = "singleton";
    pub const PROTOTYPE: &'static str = "prototype";

    /// 解析元数据中声明的作用域
    ///
    /// 未声明、空字符串或无法识别的值都按单例处理。
    pub fn parse_or_default(declared: Option<&str>) -> Self {
        match declared {
            None | Some("") | Some(Self::SINGLETON) => Scope::Singleton,
            Some(Self::PROTOTYPE) => Scope::Prototype,
            Some(other) => {
                tracing::warn!(
                    "Unrecognized scope '{}', falling back to '{}'",
                    other,
                    Self::SINGLETON
                );
                Scope::Singleton
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Singleton => Self::SINGLETON,
            Scope::Prototype => Self::PROTOTYPE,
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
