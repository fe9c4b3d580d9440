// quill-embed - Embedding API for Quill
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! # quill-embed
//!
//! A high-level embedding API for the Quill scripting language.
//!
//! This crate provides a simple, ergonomic interface for running
//! Quill scripts inside Rust applications. It handles context setup,
//! type conversion, and function binding.
//!
//! ## Quick Start
//!
//! ```rust
//! use quill_embed::Engine;
//!
//! let engine = Engine::new();
//! let result = engine.eval("return 1 + 2;").unwrap();
//! println!("{}", result); // 3
//! ```
//!
//! ## Binding Rust Functions
//!
//! ```rust
//! use quill_embed::Engine;
//!
//! let mut engine = Engine::new();
//! engine.register_fn("double", |n: i64| n * 2);
//! let result = engine.eval("return double(21);").unwrap();
//! assert_eq!(result.to_string(), "42");
//! ```
//!
//! ## Sharing State
//!
//! ```rust
//! use quill_embed::Engine;
//!
//! let engine = Engine::new();
//! engine.set("health", 75i64).unwrap();
//! engine.eval("health = health - 25;").unwrap();
//! assert_eq!(engine.get_as::<i64>("health"), Some(50));
//! ```

mod convert;
mod engine;

pub use convert::{from_val, to_val, FromVal, FromValArg, HostResult, IntoVal};
pub use engine::{Engine, HostFn};

// Re-export core types for convenience
pub use quill_core::{Context, Error, ErrorKind, Result, Script, Trace};
pub use quill_parser::{ArrayVal, ElemKind, Kind, Scope, Val};
