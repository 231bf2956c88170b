// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com
//
// Class registry behaviour: global lazy registration, lookups, relations,
// uniqueness and concurrent first use.

use mirror::reflect::{class_of, type_identity_hash};
use mirror::{
    describe_class, reflect_class, try_describe_class, Class, ClassRegistry, Reflect, ReflectError,
    TypeRef,
};
use std::sync::{Arc, Barrier};
use std::thread;

#[derive(Default)]
#[allow(dead_code)]
struct Vehicle {
    wheels: u8,
}
reflect_class!(Vehicle { wheels });

#[derive(Default)]
#[allow(dead_code)]
struct Truck {
    payload_kg: u32,
}
reflect_class!(Truck: Vehicle { payload_kg });

#[derive(Default)]
#[allow(dead_code)]
struct Trailer {
    axles: u8,
}
reflect_class!(Trailer: Truck { axles = "max = 4" });

#[derive(Default)]
#[allow(dead_code)]
struct RaceProbe {
    counter: u64,
}
reflect_class!(RaceProbe { counter });

#[allow(dead_code)]
struct Impostor;

#[test]
fn global_lookup_by_name_and_type_hash() {
    let class = class_of::<Vehicle>().expect("class");
    let registry = ClassRegistry::global();

    let by_name = registry.find_class_by_name("Vehicle").expect("by name");
    let by_hash = registry
        .find_class_by_type_hash(type_identity_hash::<Vehicle>())
        .expect("by type hash");
    assert!(Arc::ptr_eq(&by_name, class));
    assert!(Arc::ptr_eq(&by_hash, class));
    assert_eq!(class.type_hash(), type_identity_hash::<Vehicle>());

    assert!(registry.find_class_by_name("NotRegistered").is_none());
    assert!(registry
        .find_class_by_type_hash(type_identity_hash::<Impostor>())
        .is_none());
}

#[test]
fn parent_relations_are_bidirectional() {
    let trailer = class_of::<Trailer>().expect("trailer");
    let truck = class_of::<Truck>().expect("truck");
    let vehicle = class_of::<Vehicle>().expect("vehicle");

    assert!(trailer.is_child_of(truck));
    assert!(trailer.is_child_of(vehicle));
    assert!(!vehicle.is_child_of(trailer));

    assert!(truck.children().iter().any(|c| Arc::ptr_eq(c, trailer)));
    assert!(vehicle.children().iter().any(|c| Arc::ptr_eq(c, truck)));

    // Inherited members are not flattened into the child.
    let names: Vec<_> = trailer.members().iter().map(|m| m.name()).collect();
    assert_eq!(names, ["axles"]);
    assert_eq!(
        trailer
            .member("axles")
            .and_then(|m| m.metadata("max"))
            .and_then(|m| m.as_int()),
        Some(4)
    );
}

#[test]
fn duplicate_global_name_is_rejected() {
    // Make sure the real class owns the name first.
    class_of::<Vehicle>().expect("class");

    let err = try_describe_class::<Impostor>("Vehicle", |_| Ok(())).expect_err("name taken");
    assert_eq!(
        err,
        ReflectError::DuplicateClassName {
            name: "Vehicle".into()
        }
    );
    assert!(ClassRegistry::global()
        .find_class_by_type_hash(type_identity_hash::<Impostor>())
        .is_none());
}

#[test]
#[should_panic(expected = "failed to register class `Broken`")]
fn describe_class_panics_on_bad_description() {
    #[allow(dead_code)]
    struct Broken;
    unsafe impl Reflect for Broken {
        fn type_desc() -> TypeRef {
            describe_class::<Self>("Broken", |class| {
                class.member_of::<u8>("a", 0, "")?.member_of::<u8>("a", 0, "")?;
                Ok(())
            })
        }
    }
    let _ = Broken::type_desc();
}

// A scene embeds its hero by value while the hero names the scene as its
// parent, so describing either needs the other first.
#[derive(Default)]
#[allow(dead_code)]
struct Scene {
    hero: Hero,
}
reflect_class!(Scene { hero });

#[derive(Default)]
#[allow(dead_code)]
struct Hero {
    level: u8,
}
reflect_class!(Hero: Scene { level });

#[test]
#[should_panic(expected = "class `Scene` depends on itself while being described")]
fn cyclic_description_fails_fast() {
    let _ = Scene::type_desc();
}

#[test]
fn concurrent_first_use_registers_once() {
    const THREADS: usize = 8;
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                RaceProbe::type_desc() as *const _ as usize
            })
        })
        .collect();

    let addresses: Vec<usize> = handles
        .into_iter()
        .map(|h| h.join().expect("thread"))
        .collect();
    assert!(addresses.windows(2).all(|w| w[0] == w[1]));

    let matching = ClassRegistry::global()
        .classes()
        .iter()
        .filter(|c| c.name() == "RaceProbe")
        .count();
    assert_eq!(matching, 1);
}

#[test]
fn owned_registry_lifecycle() {
    let registry = ClassRegistry::new();
    let base = registry
        .register_class("Base", 1, |class| {
            class.member_of::<f64>("mass", 0, "unit = kg")?;
            Ok(())
        })
        .expect("base");
    let derived = registry
        .register_class("Derived", 2, |class| {
            class.add_parent(Arc::clone(&base));
            class.member_of::<u16>("id", 0, "")?;
            Ok(())
        })
        .expect("derived");

    assert_eq!(registry.len(), 2);
    assert!(derived.is_child_of(&base));
    assert_eq!(
        base.member("mass")
            .and_then(|m| m.metadata("unit"))
            .map(|m| m.as_str()),
        Some("kg")
    );

    let err = registry
        .add_class(Class::new("Other", 2))
        .expect_err("type hash taken");
    assert!(matches!(err, ReflectError::DuplicateTypeHash { type_hash: 2, .. }));

    registry.remove_class(&derived).expect("remove");
    assert!(registry.find_class_by_name("Derived").is_none());
    assert!(registry.find_class_by_type_hash(2).is_none());
    assert_eq!(registry.len(), 1);

    // Removal makes both keys available again.
    registry
        .add_class(Class::new("Derived", 2))
        .expect("re-register");
    assert_eq!(registry.len(), 2);
}

#[test]
fn registry_drop_releases_classes() {
    let registry = ClassRegistry::new();
    let class = registry
        .register_class("Transient", 99, |_| Ok(()))
        .expect("register");
    let weak = Arc::downgrade(&class);
    drop(class);
    assert!(weak.upgrade().is_some());
    drop(registry);
    assert!(weak.upgrade().is_none());
}

#[test]
fn reflective_field_access() {
    let mut truck = Truck { payload_kg: 1200 };
    let class = class_of::<Truck>().expect("class");

    assert_eq!(class.field::<Truck, u32>(&truck, "payload_kg"), Some(&1200));
    // Wrong field type, unknown member, or a class that does not describe the value.
    assert!(class.field::<Truck, u64>(&truck, "payload_kg").is_none());
    assert!(class.field::<Truck, u32>(&truck, "wheels").is_none());
    let vehicle = class_of::<Vehicle>().expect("vehicle");
    assert!(vehicle.field::<Truck, u32>(&truck, "payload_kg").is_none());

    *class
        .field_mut::<Truck, u32>(&mut truck, "payload_kg")
        .expect("field") += 300;
    assert_eq!(truck.payload_kg, 1500);

    let member = class.member("payload_kg").expect("member");
    let address = member.instance_member_ptr((&truck as *const Truck).cast());
    assert_eq!(address, (&truck.payload_kg as *const u32).cast::<u8>());
}
