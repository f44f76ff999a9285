//! Example demonstrating logging capabilities
//!
//! Run with JSON logging (production):
//! ```bash
//! cargo run --example logging --features logging-json
//! ```
//!
//! Run with pretty logging (development):
//! ```bash
//! cargo run --example logging --features logging-pretty
//! ```

use armature_inject::Injector;

// Example services
#[allow(dead_code)]
#[derive(Clone)]
struct Database {
    url: String,
}

#[allow(dead_code)]
#[derive(Clone)]
struct UserService {
    name: String,
}

#[allow(dead_code)]
#[derive(Clone)]
struct RequestContext {
    request_id: String,
}

fn main() {
    // Uses JSON if logging-json is enabled, pretty if logging-pretty
    #[cfg(feature = "logging")]
    {
        armature_inject::logging::init();
    }

    println!("=== Armature Inject Logging Demo ===\n");

    // Create root injector (logs: "Creating root injector")
    let injector = Injector::new();

    // Register mapping rules (logs: "Registering mapping rule")
    injector.map_value(Database {
        url: "postgres://localhost/mydb".into(),
    });

    injector.map_value(UserService {
        name: "UserService".into(),
    });

    // Resolve requests (logs: "Resolving request")
    let _db = injector.get_instance::<Database>().unwrap();
    let _users = injector.get_instance::<UserService>().unwrap();

    // Request something that is not mapped (no panic, returns None)
    let missing = injector.try_get_instance::<i32>();
    assert!(missing.is_none());

    // Create a child injector (logs: "Created child injector")
    let request_scope = injector.create_child_injector();

    // Add a request-local rule on the child
    request_scope.map_value(RequestContext {
        request_id: "req-12345".into(),
    });

    // Resolve from the child: local rule
    let _ctx = request_scope.get_instance::<RequestContext>().unwrap();

    // Resolve from the child: inherited rule
    let _db_from_child = request_scope.get_instance::<Database>().unwrap();

    // Remove a rule (logs: "Unmapping rule")
    request_scope.unmap::<RequestContext>().unwrap();
    assert!(!request_scope.has_mapping::<RequestContext>());

    println!("\n=== Demo Complete ===");
    println!("Check the log output above to see structured logging in action!");
    println!("\nTip: Use --features logging-json for production (JSON output)");
    println!("     Use --features logging-pretty for development (colorful output)");
}
