//! # famdex - family tree of graphs with label inheritance and search
//!
//! famdex organizes a collection of visual items ("graphs") into a tree of
//! families, propagates colored labels through that tree, and answers a
//! small keyword/free-text search language against it.
//!
//! ## Architecture
//!
//! - [`tree`] - the path-addressed family tree and its records
//! - [`load`] - building the tree from a data root and a families file
//! - [`normalize`] - the fixed sequence of passes establishing tree invariants
//! - [`query`] - query parsing, matching, ratio mode and memoization
//! - [`tags`] - autocomplete tag ranking
//! - [`config`] - layered application configuration
//! - [`output`] - terminal rendering
//! - [`utils`] - progress display and word cleaning
//!
//! ## Quick Start
//!
//! ```no_run
//! use famdex::load::{build_tree, LoadMode};
//! use famdex::normalize::normalize;
//! use famdex::query::SearchEngine;
//! use std::path::Path;
//!
//! let mut tree = build_tree(Path::new("/path/to/graphs"), LoadMode::Structured);
//! normalize(&mut tree);
//!
//! let engine = SearchEngine::new(tree);
//! let result = engine.search(&engine.parse("#finance -draft"), false);
//!
//! for family in &result.families {
//!     println!("{}: {} items", family, result.matches[family].len());
//! }
//! ```
//!
//! The tree is only mutated while loading and normalizing. [`SearchEngine`]
//! takes ownership of it, after which searches may run from many threads.
//!
//! [`SearchEngine`]: query::SearchEngine

pub mod config;
pub mod load;
pub mod normalize;
pub mod output;
pub mod query;
pub mod tags;
pub mod tree;
pub mod utils;
