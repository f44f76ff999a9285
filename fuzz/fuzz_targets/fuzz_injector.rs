#![no_main]

//! Fuzz target for basic mapping and resolution
//!
//! Exercises mapping, re-mapping, unmapping and resolution with arbitrary
//! data patterns and qualifier names.

use arbitrary::Arbitrary;
use armature_inject::Injector;
use libfuzzer_sys::fuzz_target;

/// Service types for fuzzing
#[derive(Clone, Debug, Arbitrary)]
struct SmallService {
    id: u32,
    name: String,
}

#[derive(Clone, Debug, Arbitrary)]
struct MediumService {
    id: u64,
    data: Vec<u8>,
    config: ServiceConfig,
}

#[derive(Clone, Debug, Arbitrary)]
struct ServiceConfig {
    enabled: bool,
    timeout_ms: u32,
    retries: u8,
    tags: Vec<String>,
}

/// Operations to perform on the injector
#[derive(Debug, Arbitrary)]
enum InjectorOp {
    MapSmall(SmallService),
    MapSmallNamed(String, SmallService),
    MapMedium(MediumService),
    MapMediumNamed(String, MediumService),
    GetSmall,
    GetSmallNamed(String),
    GetMedium,
    TryGetSmall,
    TryGetMediumNamed(String),
    HasSmall,
    HasMediumNamed(String),
    UnmapSmall,
    UnmapSmallNamed(String),
    UnmapMedium,
    Len,
    IsEmpty,
}

fuzz_target!(|ops: Vec<InjectorOp>| {
    let injector = Injector::new();

    for op in ops.into_iter().take(200) {
        match op {
            InjectorOp::MapSmall(svc) => {
                injector.map_value(svc);
            }
            InjectorOp::MapSmallNamed(name, svc) => {
                injector.map_value_named(&name, svc);
            }
            InjectorOp::MapMedium(svc) => {
                injector.map_value(svc);
            }
            InjectorOp::MapMediumNamed(name, svc) => {
                injector.map_value_named(&name, svc);
            }
            InjectorOp::GetSmall => {
                let _ = injector.get_instance::<SmallService>();
            }
            InjectorOp::GetSmallNamed(name) => {
                let _ = injector.get_instance_named::<SmallService>(&name);
            }
            InjectorOp::GetMedium => {
                let _ = injector.get_instance::<MediumService>();
            }
            InjectorOp::TryGetSmall => {
                let _ = injector.try_get_instance::<SmallService>();
            }
            InjectorOp::TryGetMediumNamed(name) => {
                let _ = injector.try_get_instance_named::<MediumService>(&name);
            }
            InjectorOp::HasSmall => {
                let _ = injector.has_mapping::<SmallService>();
            }
            InjectorOp::HasMediumNamed(name) => {
                let _ = injector.has_mapping_named::<MediumService>(&name);
            }
            InjectorOp::UnmapSmall => {
                let _ = injector.unmap::<SmallService>();
            }
            InjectorOp::UnmapSmallNamed(name) => {
                let _ = injector.unmap_named::<SmallService>(&name);
            }
            InjectorOp::UnmapMedium => {
                let _ = injector.unmap::<MediumService>();
            }
            InjectorOp::Len => {
                let _ = injector.len();
            }
            InjectorOp::IsEmpty => {
                let _ = injector.is_empty();
            }
        }
    }
});
