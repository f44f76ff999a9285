#![no_main]

//! Fuzz target for injector hierarchies
//!
//! Exercises child creation, write-time rule propagation, local overrides
//! and unmap shadowing across arbitrary parent/child sequences.

use arbitrary::Arbitrary;
use armature_inject::Injector;
use libfuzzer_sys::fuzz_target;

/// Service types
#[derive(Clone, Debug, Arbitrary)]
struct RootService {
    id: u32,
}

#[derive(Clone, Debug, Arbitrary)]
struct ScopedService {
    scope_id: u32,
    data: Vec<u8>,
}

/// Operations for hierarchical injectors
#[derive(Debug, Arbitrary)]
enum HierarchyOp {
    // Root operations
    MapInRoot(RootService),
    MapScopedInRoot(ScopedService),
    GetFromRoot,
    UnmapInRoot,

    // Child creation
    CreateChild,
    CreateGrandchild,
    DropChild,

    // Child operations (index into the child list)
    MapInChild(u8, ScopedService),
    OverrideRootInChild(u8, RootService),
    GetFromChild(u8),
    GetRootFromChild(u8),
    UnmapInChild(u8),
    HasInChild(u8),
    AncestorMapping(u8),
}

fuzz_target!(|ops: Vec<HierarchyOp>| {
    let root = Injector::new();
    let mut children: Vec<Injector> = Vec::new();

    for op in ops.into_iter().take(100) {
        match op {
            HierarchyOp::MapInRoot(svc) => {
                root.map_value(svc);
            }
            HierarchyOp::MapScopedInRoot(svc) => {
                root.map_value(svc);
            }
            HierarchyOp::GetFromRoot => {
                let _ = root.try_get_instance::<RootService>();
            }
            HierarchyOp::UnmapInRoot => {
                let _ = root.unmap::<RootService>();
            }
            HierarchyOp::CreateChild => {
                if children.len() < 10 {
                    children.push(root.create_child_injector());
                }
            }
            HierarchyOp::CreateGrandchild => {
                if let Some(child) = children.last() {
                    if children.len() < 10 {
                        let grandchild = child.create_child_injector();
                        children.push(grandchild);
                    }
                }
            }
            HierarchyOp::DropChild => {
                children.pop();
            }
            HierarchyOp::MapInChild(idx, svc) => {
                if let Some(child) = pick(&children, idx) {
                    child.map_value(svc);
                }
            }
            HierarchyOp::OverrideRootInChild(idx, svc) => {
                if let Some(child) = pick(&children, idx) {
                    child.map_value(svc);
                }
            }
            HierarchyOp::GetFromChild(idx) => {
                if let Some(child) = pick(&children, idx) {
                    let _ = child.try_get_instance::<ScopedService>();
                }
            }
            HierarchyOp::GetRootFromChild(idx) => {
                if let Some(child) = pick(&children, idx) {
                    let _ = child.try_get_instance::<RootService>();
                }
            }
            HierarchyOp::UnmapInChild(idx) => {
                if let Some(child) = pick(&children, idx) {
                    let _ = child.unmap::<RootService>();
                }
            }
            HierarchyOp::HasInChild(idx) => {
                if let Some(child) = pick(&children, idx) {
                    let _ = child.has_mapping::<RootService>();
                    let _ = child.has_mapping::<ScopedService>();
                }
            }
            HierarchyOp::AncestorMapping(idx) => {
                if let Some(child) = pick(&children, idx) {
                    let _ = child.get_ancestor_mapping::<RootService>();
                }
            }
        }
    }
});

fn pick(children: &[Injector], idx: u8) -> Option<&Injector> {
    if children.is_empty() {
        None
    } else {
        children.get(idx as usize % children.len())
    }
}
