//! # Abstract Syntax Tree
//!
//! Types shared by the lexer, the parser and the interpreter:
//!
//! - **[tokens]** - Lexical tokens produced by the lexer
//! - **[nodes]** - The [`Ast`] produced by the parser
//! - **[operators]** - Comparison operators carried by `Comparator` nodes
//!
//! ## Quick Start
//!
//! ```text
//! people[?age > `20`].name | sort(@)
//! ```
//!
//! parses into a `Pipe` whose left side is a `FilterProjection` over the
//! `people` field (condition `age > 20`, per-element expression `name`) and
//! whose right side is a `Function` call of `sort` on the current value.
//!
//! ## Core Concepts
//!
//! ### Projections
//!
//! `[*]`, `*`, `[]`, `[?...]` and slices start a *projection*: everything to the
//! right of them (up to a pipe or an operator with lower binding power) is
//! applied to each element, and `null` results are dropped.
//!
//! ### Expression references
//!
//! `&expr` captures `expr` unevaluated. The captured node is shared through an
//! [`std::sync::Arc`], so a compiled tree can be evaluated from several threads
//! and expression references never copy subtrees.
//!
//! ### Immutability
//!
//! A parsed tree is never mutated. It can be cached and evaluated against any
//! number of documents.
pub mod nodes;
pub mod operators;
pub mod tokens;

pub use nodes::{Ast, KeyValuePair};
pub use operators::Comparator;
pub use tokens::{Token, TokenKind};
