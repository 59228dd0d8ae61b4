// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 Brepkit Team

//! Declarative shape model and its evaluator

pub mod node;
pub mod resolve;

pub use node::Shape;
pub use resolve::{Evaluator, Value, DEFAULT_TOLERANCE};
