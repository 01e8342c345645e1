use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use sprig_core::prelude::*;
use sprig_core::SprigApplication;
use sprig_core_macros::{Component, ComponentScan};

mod catalog {
    use super::*;

    #[derive(ComponentScan)]
    #[component_scan("application::catalog")]
    pub struct CatalogConfig;

    #[derive(Component)]
    pub struct ProductService;

    pub mod pricing {
        use super::*;

        #[derive(Component)]
        #[scope("prototype")]
        pub struct PriceQuote {
            #[autowired("productService")]
            pub products: Autowired<ProductService>,
        }
    }
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
struct ApplicationSection {
    name: String,
    scan_root: Option<String>,
}

fn write_config(name: &str, content: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("sprig-{}-{}.toml", name, std::process::id()));
    fs::write(&path, content).unwrap();
    path
}

fn application(config: &Path, env_prefix: &str) -> SprigApplication {
    SprigApplication::new("catalog")
        .config_file(config.to_string_lossy())
        .env_prefix(env_prefix)
        .banner(false)
        .init_logging(false)
}

#[test]
fn runs_with_declared_scan_root() {
    let context = SprigApplication::new("catalog")
        .config_files(Vec::new())
        .env_prefix("SPRIG_IT_DECLARED_")
        .banner(false)
        .init_logging(false)
        .run::<catalog::CatalogConfig>()
        .unwrap();

    assert_eq!(context.scan_root().as_str(), "application::catalog");
    assert_eq!(context.get_bean_definition_count(), 2);

    let quote = context
        .get_bean_as::<catalog::pricing::PriceQuote>("priceQuote")
        .unwrap();
    let products = context.get_bean_as::<catalog::ProductService>("productService").unwrap();
    assert!(std::sync::Arc::ptr_eq(&quote.products.get().unwrap(), &products));
}

#[test]
fn config_file_overrides_scan_root() {
    let config = write_config(
        "scan-root",
        r#"
        [application]
        name = "pricing"
        scan-root = "application::catalog::pricing"
        "#,
    );

    let context = application(&config, "SPRIG_IT_OVERRIDE_")
        .run::<catalog::CatalogConfig>()
        .unwrap();
    fs::remove_file(&config).ok();

    assert_eq!(context.scan_root().as_str(), "application::catalog::pricing");
    assert_eq!(context.get_bean_names(), vec!["priceQuote".to_string()]);

    // 依赖不在扫描根下，注入失败
    assert!(context.get_bean("priceQuote").is_err());

    let section: ApplicationSection = context.environment().bind("application").unwrap();
    assert_eq!(section.name, "pricing");
}

#[test]
fn environment_variables_take_priority_over_file() {
    let config = write_config(
        "env-priority",
        r#"
        [application]
        name = "catalog"
        "#,
    );
    std::env::set_var("SPRIG_IT_ENV_APPLICATION_NAME", "catalog-from-env");

    let context = application(&config, "SPRIG_IT_ENV_")
        .run::<catalog::CatalogConfig>()
        .unwrap();
    fs::remove_file(&config).ok();

    assert_eq!(
        context.environment().get_string("application.name").as_deref(),
        Some("catalog-from-env")
    );
    assert!(context.contains_bean("productService"));
}

#[test]
fn invalid_configured_scan_root_fails_startup() {
    let config = write_config(
        "bad-root",
        r#"
        [application]
        scan-root = "application::"
        "#,
    );

    let result = application(&config, "SPRIG_IT_BAD_ROOT_").run::<catalog::CatalogConfig>();
    fs::remove_file(&config).ok();

    assert!(matches!(
        result,
        Err(sprig_core::ApplicationError::Container(ContainerError::ScanRoot { .. }))
    ));
}
