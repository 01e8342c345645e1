use serde::Deserialize;
use sprig_core::prelude::*;
use sprig_core_macros::{Component, ComponentScan};
use std::sync::Arc;

// ==================== 根配置 ====================

/// 扫描根默认为本模块路径 `app_demo`，
/// 也可以在 application.toml 中用 `application.scan-root` 覆盖
#[derive(ComponentScan)]
struct DemoApplication;

/// 商店配置 - 从 `[shop]` 段绑定
#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct ShopProperties {
    currency: String,
    #[serde(default = "default_max_items")]
    max_items: usize,
}

fn default_max_items() -> usize {
    10
}

// ==================== 业务服务 ====================

mod service {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};

    /// 订单服务 - 单例，所有用户共享同一个订单计数器
    #[derive(Component)]
    pub struct OrderService {
        next_id: AtomicU64,
    }

    impl OrderService {
        pub fn place_order(&self, item: &str) -> u64 {
            let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
            tracing::info!("Order #{} placed for '{}'", id, item);
            id
        }
    }

    /// 用户会话 - 原型，每次获取都是新实例
    #[derive(Component)]
    #[scope("prototype")]
    pub struct UserService {
        #[autowired("orderService")]
        order_service: Autowired<OrderService>,
    }

    impl UserService {
        pub fn checkout(&self, items: &[&str]) -> anyhow::Result<Vec<u64>> {
            let orders = self
                .order_service
                .get()
                .ok_or_else(|| anyhow!("orderService was not injected"))?;
            Ok(items.iter().map(|item| orders.place_order(item)).collect())
        }
    }

    /// 价目表 - 构造函数可能失败
    #[derive(Component)]
    #[component("priceList")]
    #[constructor("load")]
    pub struct PriceList {
        prices: Vec<(&'static str, u32)>,
    }

    impl PriceList {
        fn load() -> anyhow::Result<Self> {
            Ok(PriceList {
                prices: vec![("coffee", 350), ("croissant", 280), ("juice", 420)],
            })
        }

        pub fn price_of(&self, item: &str) -> Option<u32> {
            self.prices
                .iter()
                .find(|(name, _)| *name == item)
                .map(|(_, price)| *price)
        }
    }
}

// ==================== 主程序 ====================

fn main() -> anyhow::Result<()> {
    // 查找配置文件
    let config_file = ["demos/app-demo/application.toml", "application.toml"]
        .into_iter()
        .find(|path| std::path::Path::new(path).exists())
        .unwrap_or("application.toml");

    let context = SprigApplication::new("SprigDemo")
        .config_file(config_file)
        .env_prefix("APP_")
        .run::<DemoApplication>()?;

    let shop: ShopProperties = context
        .environment()
        .bind("shop")
        .map_err(|e| anyhow!(e))?;
    tracing::info!("Shop configuration: {:?}", shop);

    let prices = context.get_bean_as::<service::PriceList>("priceList")?;

    // 两个用户会话是不同的实例，但共享同一个订单服务
    let alice = context.get_bean_as::<service::UserService>("userService")?;
    let bob = context.get_bean_as::<service::UserService>("userService")?;
    println!("\nSessions are distinct: {}", !Arc::ptr_eq(&alice, &bob));

    let basket = ["coffee", "croissant", "juice", "tea"];
    let basket = &basket[..basket.len().min(shop.max_items)];

    for (user, session) in [("alice", &alice), ("bob", &bob)] {
        let orders = session.checkout(basket)?;
        let total: u32 = basket.iter().filter_map(|item| prices.price_of(item)).sum();
        println!(
            "{} placed orders {:?}, total {}.{:02} {}",
            user,
            orders,
            total / 100,
            total % 100,
            shop.currency
        );
    }

    println!(
        "\n{} bean definitions, {} singletons created",
        context.get_bean_definition_count(),
        context.singleton_count()
    );

    match context.get_bean("inventoryService") {
        Ok(_) => println!("inventoryService unexpectedly found"),
        Err(e) => println!("Expected failure: {}", e),
    }

    println!("\n💡 Try these commands:");
    println!("   APP_SHOP_CURRENCY=USD cargo run -p app-demo");
    println!("   APP_LOGGING_LEVEL=debug cargo run -p app-demo");
    println!();

    Ok(())
}
