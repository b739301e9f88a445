pub mod bindings;
pub mod console;
