// genlink — naming and call-site linkage for runtime-generated code
//
// Library root. `naming` mints unit names; `bootstrap` resolves indirect
// call sites; the remaining modules are the registry, loader and execution
// scaffolding around them.

pub mod binding;
pub mod bootstrap;
pub mod builtins;
pub mod callsite;
pub mod config;
pub mod diag;
pub mod loader;
pub mod manifest;
pub mod naming;
pub mod registry;
pub mod unit;
