//! rtboot Resource Budget Descriptor
//!
//! This crate contains the **static capacity plan** the kernel start-up
//! routine reads exactly once: per-class object limits, tick granularity,
//! optional subsystem switches and stack sizes.
//!
//! # Design Principles
//!
//! 1. **Resolved at build time**: every budget is a `const`/`static` built by
//!    `const fn`; out-of-range literals fail const evaluation
//! 2. **Immutable**: no setter takes `&mut self`; the kernel only ever sees
//!    `&'static ResourceBudget`
//! 3. **No usage checks**: a class used but never declared fails at runtime
//!    as allocation failure, not here
//!
//! # Module Organization
//!
//! - `types` - Object classes, limits, ticks, priorities, stack sizes
//! - `subsystems` - Optional subsystem switches
//! - `budget` - The `ResourceBudget` descriptor and its const builder
//! - `invariants` - Cross-field rules checked before kernel start
//! - `constants` - Rendering as named configuration constants
//! - `presets` - Shipped board budgets

#![no_std]
extern crate alloc;

pub mod budget;
pub mod constants;
pub mod invariants;
pub mod presets;
pub mod subsystems;
pub mod types;

// Re-export all public types for convenient access
pub use budget::{ResourceBudget, UNLIMITED_ALLOCATION_SIZE};
pub use constants::{configuration_constants, ConfigurationConstant, ConstantValue};
pub use invariants::ConfigViolation;
pub use subsystems::{Subsystem, Subsystems};
pub use types::{
    InitTaskConfig, Limit, ObjectClass, ResourceLimit, StackSize, TaskPriority, Ticks, TimeBase,
};
