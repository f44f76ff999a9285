#![no_main]

//! Fuzz target for concurrent injector operations
//!
//! Tests thread-safety of mapping, resolution and child creation under
//! concurrent access.

use arbitrary::Arbitrary;
use armature_inject::Injector;
use libfuzzer_sys::fuzz_target;
use std::thread;

/// Service for concurrent testing
#[derive(Clone, Debug, Arbitrary)]
struct ConcurrentService {
    id: u64,
    data: Vec<u8>,
}

#[derive(Clone, Debug, Arbitrary)]
struct SharedConfig {
    value: u32,
}

/// Thread operation
#[derive(Debug, Clone, Arbitrary)]
enum ThreadOp {
    Get,
    TryGet,
    Has,
    Map(ConcurrentService),
    MapNamed(String, ConcurrentService),
    Unmap,
    CreateChildAndResolve,
}

/// Concurrent test scenario
#[derive(Debug, Arbitrary)]
struct ConcurrentScenario {
    // Initial services to map
    initial_services: Vec<ConcurrentService>,
    // Number of threads (clamped to 1-8)
    thread_count: u8,
    // Operations per thread (clamped)
    ops_per_thread: Vec<ThreadOp>,
}

fuzz_target!(|scenario: ConcurrentScenario| {
    let injector = Injector::new();

    for svc in scenario.initial_services.into_iter().take(10) {
        injector.map_value(svc);
    }

    injector.map_value(SharedConfig { value: 42 });

    let thread_count = (scenario.thread_count % 8).max(1) as usize;
    let ops = scenario.ops_per_thread;

    let mut handles = Vec::new();

    for _ in 0..thread_count {
        let injector = injector.clone();
        let ops = ops.clone();

        let handle = thread::spawn(move || {
            for op in ops.into_iter().take(50) {
                match op {
                    ThreadOp::Get => {
                        let _ = injector.get_instance::<SharedConfig>();
                    }
                    ThreadOp::TryGet => {
                        let _ = injector.try_get_instance::<ConcurrentService>();
                    }
                    ThreadOp::Has => {
                        let _ = injector.has_mapping::<SharedConfig>();
                        let _ = injector.has_mapping::<ConcurrentService>();
                    }
                    ThreadOp::Map(svc) => {
                        injector.map_value(svc);
                    }
                    ThreadOp::MapNamed(name, svc) => {
                        injector.map_value_named(&name, svc);
                    }
                    ThreadOp::Unmap => {
                        let _ = injector.unmap::<ConcurrentService>();
                    }
                    ThreadOp::CreateChildAndResolve => {
                        let child = injector.create_child_injector();
                        let _ = child.get_instance::<SharedConfig>();
                    }
                }
            }
        });

        handles.push(handle);
    }

    for handle in handles {
        handle.join().unwrap();
    }
});
