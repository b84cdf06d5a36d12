//! Declarative hierarchy definition and discriminator resolution.
//!
//! This example shows how to:
//! - Define an entity hierarchy with the `entity_hierarchy!` macro
//! - Build the runtime class graph from the generated definition table
//! - Drive the listener with load events and inspect the injected metadata

use discr_map::*;
use discr_map_macro::entity_hierarchy;

// A single-table-inheritance family: Animal is the root, subclasses
// declare their own discriminator tags.
entity_hierarchy! {
    pub mod Entities {
        Animal {
            #[discr = "dog"]
            Dog {
                #[discr = "puppy"]
                Puppy;
            }
            #[discr = "cat"]
            Cat;
        }
    }
}

fn main() {
    println!("=== Animal Hierarchy Example ===\n");

    // 1. Compile-time class identities
    println!("Class identities:");
    println!("  Animal::ID = {:#018x}", Entities::Animal::ID);
    println!("  Dog::ID    = {:#018x}", Entities::Animal::Dog::ID);
    println!("  Puppy::ID  = {:#018x}", Entities::Animal::Dog::Puppy::ID);
    println!("  Cat::TAG   = {:?}", Entities::Animal::Cat::TAG);
    println!();

    // 2. Build the class graph and the listener around it
    let graph = ClassGraph::build(Entities::DEFINITIONS).unwrap();
    println!("Graph: {} classes", graph.len());
    let mut listener = DiscriminatorListener::new(graph);

    // 3. Simulate the mapping layer loading Puppy's metadata: the record
    //    arrives carrying only Puppy's own declared tag.
    let mut puppy = ClassMetadata::new(Entities::Animal::Dog::Puppy::ID);
    puppy
        .discriminator_map
        .insert("puppy", Entities::Animal::Dog::Puppy::ID);

    listener.load_class_metadata(&mut puppy).unwrap();

    println!("Puppy after load:");
    println!("  own tag: {:?}", puppy.discriminator_value);
    for (tag, class) in puppy.discriminator_map.iter() {
        println!("  map: {:<6} -> {:#018x}", tag, class);
    }
    println!();

    // 4. The root's own load event now hits the cached family map and
    //    additionally receives the subclass list.
    let mut animal = ClassMetadata::new(Entities::Animal::ID);
    listener.load_class_metadata(&mut animal).unwrap();

    println!("Animal after load:");
    println!("  own tag: {:?}", animal.discriminator_value);
    println!("  subclasses:");
    for class in &animal.sub_classes {
        let name = listener.graph().name_of(*class).unwrap();
        println!("    {:<6} ({:#018x})", name, class);
    }
}
