pub mod diagnostics;
pub mod language;
pub mod runtime;

pub use runtime::bridge::HostType;
pub use runtime::error::{RuntimeError, RuntimeResult};
pub use runtime::machine::{Machine, MachineOptions};
pub use runtime::types::{Kind, Type};
pub use runtime::value::Value;

#[cfg(test)]
mod tests;
