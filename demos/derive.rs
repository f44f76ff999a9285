//! Example demonstrating the #[derive(InjectTarget)] macro
//!
//! Run with:
//!   cargo run --example derive --features derive

use armature_inject::{InjectTarget, Injector};
use std::sync::Arc;

// Dependencies
#[allow(dead_code)]
#[derive(Clone)]
struct Database {
    url: String,
}

#[allow(dead_code)]
#[derive(Clone)]
struct Cache {
    size: usize,
}

#[allow(dead_code)]
#[derive(Clone)]
struct Logger {
    level: String,
}

// Service with injected fields
#[derive(InjectTarget)]
#[inject_target(post_construct = "on_ready")]
struct UserService {
    #[inject]
    db: Option<Arc<Database>>,
    #[inject(name = "hot")]
    cache: Option<Arc<Cache>>,
    #[inject(optional)]
    logger: Option<Arc<Logger>>,
    // Non-injected field uses Default
    request_count: u64,
}

impl UserService {
    fn on_ready(&mut self) {
        println!("  [UserService] post_construct hook ran");
    }

    fn describe(&self) -> String {
        let logger_status = if self.logger.is_some() {
            "with logging"
        } else {
            "without logging"
        };
        let db_url = self.db.as_ref().map(|db| db.url.as_str()).unwrap_or("?");
        let cache_size = self.cache.as_ref().map(|c| c.size).unwrap_or(0);
        format!(
            "UserService connected to {} with cache size {} ({}, requests: {})",
            db_url, cache_size, logger_status, self.request_count
        )
    }
}

fn main() {
    println!("=== Armature Inject Derive Macro Demo ===\n");

    // Create an injector and register mapping rules
    let injector = Injector::new();
    injector.map_value(Database {
        url: "postgres://localhost:5432/myapp".into(),
    });
    injector.map_value_named("hot", Cache { size: 1024 });
    // Note: Logger is NOT mapped, so the optional point stays None

    println!("Instantiating UserService...");
    let service = injector
        .instantiate::<UserService>()
        .expect("failed to build UserService");
    println!("  {}", service.describe());
    println!();

    // Map a logger, then resolve through a singleton rule
    injector.map_value(Logger {
        level: "DEBUG".into(),
    });
    injector.map_singleton::<UserService>();

    println!("Resolving UserService singleton with Logger...");
    let singleton = injector
        .get_instance::<UserService>()
        .expect("failed to resolve UserService");
    println!("  {}", singleton.describe());

    let again = injector.get_instance::<UserService>().unwrap();
    println!(
        "  Second resolution is the same instance: {}",
        Arc::ptr_eq(&singleton, &again)
    );
    println!();

    println!("=== Demo Complete ===");
    println!("\nThe #[derive(InjectTarget)] macro generated metadata that:");
    println!("  - Lists injection points for #[inject] fields in declaration order");
    println!("  - Resolves #[inject(name = \"...\")] fields through named rules");
    println!("  - Skips #[inject(optional)] fields when no rule is mapped");
    println!("  - Runs the #[inject_target(post_construct)] hook after injection");
}
