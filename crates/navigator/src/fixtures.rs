//! Factory functions for test data.
//!
//! Builds a deterministic shelf model shaped like the exported asset (a shelf
//! frame group plus one group per book, each holding a pages mesh and a cover
//! mesh) and a matching catalog for the `web-dev` room.

use glam::Vec3;
use shared::Rgb;

use crate::catalog::Catalog;
use crate::scene::{Euler, SceneGraph, Transform};

/// Room the fixture catalog is written for
pub const ROOM: &str = "web-dev";

/// Books per fixture shelf model
pub const BOOKS_PER_SHELF: usize = 10;

/// Position whose cover has no material color
pub const UNTINTED_POSITION: usize = 3;

/// Numeric part of the first book group's name
const FIRST_BOOK_GROUP: usize = 35;

const COVER_COLORS: [Rgb; 5] = [
    Rgb(0x8b, 0x1e, 0x3f),
    Rgb(0x1d, 0x4e, 0x89),
    Rgb(0x2f, 0x6b, 0x3a),
    Rgb(0xc2, 0x8a, 0x1b),
    Rgb(0x4a, 0x2c, 0x6d),
];

pub fn group_name(position: usize) -> String {
    format!("group{}", FIRST_BOOK_GROUP + position)
}

pub fn pages_name(position: usize) -> String {
    format!("mesh{}", FIRST_BOOK_GROUP + position)
}

pub fn cover_name(position: usize) -> String {
    format!("mesh{}_1", FIRST_BOOK_GROUP + position)
}

/// Cover color of the book at `position` (none for `UNTINTED_POSITION`)
pub fn cover_color(position: usize) -> Option<Rgb> {
    if position == UNTINTED_POSITION {
        None
    } else {
        Some(COVER_COLORS[position % COVER_COLORS.len()])
    }
}

/// Shelf model with `book_count` books
pub fn shelf_model(book_count: usize) -> SceneGraph {
    let mut g = SceneGraph::new("Scene");
    let root = g.root();

    let frame = g.add_group(root, "group1295511530");
    g.add_mesh(frame, "mesh1295511530", Some(Rgb(0x6b, 0x4f, 0x2a)));

    for i in 0..book_count {
        let group = g.add_group(root, &group_name(i));
        g.set_transform(
            group,
            Transform::at(Vec3::new(-0.9 + 0.2 * i as f32, 0.4 * (i / 5) as f32, 0.0)),
        );
        let pages = g.add_mesh(group, &pages_name(i), Some(Rgb(0xf5, 0xf0, 0xe1)));
        g.set_transform(
            pages,
            Transform {
                position: Vec3::new(0.01, 0.0, 0.05),
                rotation: Euler::new(0.0, 0.0, 0.0),
            },
        );
        let cover = g.add_mesh(group, &cover_name(i), cover_color(i));
        g.set_transform(
            cover,
            Transform {
                position: Vec3::new(0.0, 0.0, 0.05 + 0.003 * i as f32),
                rotation: Euler::new(0.0, 0.1 * i as f32, 0.0),
            },
        );
    }
    g
}

const CATALOG_JSON: &str = r#"{
    "group35-web-dev-0-0": {"name": "Eloquent JavaScript", "author": "Marijn Haverbeke", "description": "A modern introduction to programming in JavaScript."},
    "group36-web-dev-0-1": {"name": "You Don't Know JS Yet", "author": "Kyle Simpson", "description": "Scope, closures and the engine underneath."},
    "group38-web-dev-0-3": {"name": "JavaScript: The Good Parts", "author": "Douglas Crockford", "description": "The subset of the language worth using."},
    "group35-web-dev-1-0": {"name": "Programming TypeScript", "author": "Boris Cherny", "description": "Making JavaScript applications scale."},
    "group37-web-dev-1-2": {"name": "Effective TypeScript", "author": "Dan Vanderkam", "description": "Specific ways to improve your TypeScript."},
    "group35-web-dev-2-0": {"name": "The Go Programming Language", "author": "Alan Donovan", "description": "Goroutines, channels and interfaces."},
    "group39-web-dev-2-4": {"name": "Concurrency in Go", "author": "Katherine Cox-Buday", "description": "Tools and techniques for developers."},
    "group42-web-dev-2-7": {"name": "Learning Go", "author": "Jon Bodner", "description": "An idiomatic approach to real-world Go programming."},
    "group35-web-dev-3-0": {"name": "A Tour of C++", "author": "Bjarne Stroustrup", "description": "The language and its standard library."},
    "group36-web-dev-3-1": {"name": "Effective Modern C++", "author": "Scott Meyers", "description": "Move semantics and smart pointers."},
    "group35-web-dev-4-0": {"name": "The Rust Programming Language", "author": "Steve Klabnik", "description": "Ownership, lifetimes and the borrow checker."},
    "group36-web-dev-4-1": {"name": "Rust for Rustaceans", "author": "Jon Gjengset", "description": "Idiomatic programming for experienced developers."},
    "group35-web-dev-5-0": {"name": "Fluent Python", "author": "Luciano Ramalho", "description": "Clear, concise and effective programming."},
    "group40-web-dev-5-5": {"name": "Automate the Boring Stuff", "author": "Al Sweigart", "description": "Practical programming for total beginners."}
}"#;

/// Catalog for the fixture room
pub fn catalog() -> Catalog {
    Catalog::from_json(CATALOG_JSON).unwrap_or_default()
}
