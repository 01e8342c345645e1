use crate::bean_factory::ListableBeanFactory;
use crate::component::ComponentScan;
use crate::config::{Environment, EnvironmentPropertySource, TomlPropertySource};
use crate::context::ApplicationContext;
use crate::error::{ApplicationError, ApplicationResult};
use crate::logging::LoggingConfig;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

/// 配置键：应用名称
pub const APPLICATION_NAME_KEY: &str = "application.name";

/// 配置键：覆盖根配置类型声明的扫描根
pub const SCAN_ROOT_KEY: &str = "application.scan-root";

/// Sprig 应用程序
///
/// 提供便捷的应用启动方式：加载配置、初始化日志、扫描组件并构建上下文
pub struct SprigApplication {
    /// 应用名称
    name: String,

    /// 配置文件路径
    config_files: Vec<String>,

    /// 环境变量前缀
    env_prefix: String,

    /// 是否显示 banner
    show_banner: bool,

    /// 日志配置
    logging_config: Option<LoggingConfig>,

    /// 是否初始化全局日志订阅者
    init_logging: bool,
}

impl SprigApplication {
    /// 创建新的应用
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            config_files: vec!["application.toml".to_string()],
            env_prefix: "APP_".to_string(),
            show_banner: true,
            logging_config: None,
            init_logging: true,
        }
    }

    /// 设置配置文件路径
    pub fn config_file(mut self, path: impl Into<String>) -> Self {
        self.config_files = vec![path.into()];
        self
    }

    /// 添加多个配置文件，后面的文件优先级更高
    pub fn config_files(mut self, paths: Vec<String>) -> Self {
        self.config_files = paths;
        self
    }

    /// 设置环境变量前缀
    pub fn env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// 设置是否显示 banner
    pub fn banner(mut self, show: bool) -> Self {
        self.show_banner = show;
        self
    }

    /// 设置日志配置
    ///
    /// 如果不设置，优先使用配置文件的 `[logging]` 段，否则从环境变量读取
    pub fn logging(mut self, config: LoggingConfig) -> Self {
        self.logging_config = Some(config);
        self
    }

    /// 设置是否初始化日志系统
    ///
    /// 宿主程序已经安装了自己的订阅者时关闭
    pub fn init_logging(mut self, init: bool) -> Self {
        self.init_logging = init;
        self
    }

    /// 运行应用
    ///
    /// `C` 声明默认扫描根，配置项 `application.scan-root` 可以覆盖它。
    pub fn run<C: ComponentScan>(self) -> ApplicationResult<ApplicationContext> {
        // 记录启动开始时间
        let start_time = Instant::now();

        let environment = Arc::new(self.load_environment()?);

        if self.init_logging {
            let logging_config = match self.logging_config.clone() {
                Some(config) => config,
                None if environment.has_section("logging") => {
                    LoggingConfig::from_environment(&environment)?
                }
                None => LoggingConfig::from_env(),
            };
            logging_config.init()?;
        }

        if self.show_banner {
            self.print_banner();
        }

        let name = environment.get_string_or(APPLICATION_NAME_KEY, &self.name);
        tracing::info!("Starting {} application", name);
        tracing::info!("Configuration sources: {:?}", environment.source_names());

        let scan_root = match environment.get_string(SCAN_ROOT_KEY) {
            Some(root) => {
                tracing::info!("Scan root '{}' taken from '{}'", root, SCAN_ROOT_KEY);
                root
            }
            None => C::scan_root().to_string(),
        };

        let context = ApplicationContext::builder()
            .scan_root(scan_root)
            .environment(environment)
            .build()
            .map_err(|e| {
                tracing::error!("Failed to start {}: {}", name, e);
                e
            })?;

        tracing::info!(
            "Started {} in {}ms ({} bean definitions)",
            name,
            start_time.elapsed().as_millis(),
            context.get_bean_definition_count()
        );

        Ok(context)
    }

    /// 构建配置环境
    ///
    /// 优先级从低到高：配置文件（按顺序）、环境变量
    fn load_environment(&self) -> ApplicationResult<Environment> {
        let environment = Environment::new();

        for (index, config_file) in self.config_files.iter().enumerate() {
            self.try_load_config_file(&environment, config_file, index as i32)?;
        }

        environment.add_property_source(Box::new(EnvironmentPropertySource::new(
            &self.env_prefix,
        )));

        Ok(environment)
    }

    /// 尝试加载配置文件，文件不存在时跳过
    fn try_load_config_file(
        &self,
        environment: &Environment,
        config_file: &str,
        priority: i32,
    ) -> ApplicationResult<()> {
        if !Path::new(config_file).exists() {
            tracing::debug!("Configuration file not found: {}", config_file);
            return Ok(());
        }

        let source = TomlPropertySource::from_file(config_file).map_err(|e| {
            tracing::error!("Failed to load {}: {}", config_file, e);
            ApplicationError::Config(e)
        })?;
        tracing::info!(
            "Loaded configuration from: {} (priority: {})",
            config_file,
            priority
        );
        environment.add_property_source(Box::new(source.with_priority(priority)));
        Ok(())
    }

    /// 打印 banner
    fn print_banner(&self) {
        println!();
        println!(r"  ___ _ __  _ __(_) __ _ ");
        println!(r" / __| '_ \| '__| |/ _` |");
        println!(r" \__ \ |_) | |  | | (_| |");
        println!(r" |___/ .__/|_|  |_|\__, |");
        println!(r"     |_|           |___/ ");
        println!();
        println!("  :: Sprig ::        (v{})", env!("CARGO_PKG_VERSION"));
        println!();
    }
}

impl Default for SprigApplication {
    fn default() -> Self {
        Self::new("SprigApplication")
    }
}
