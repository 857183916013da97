pub mod template;

pub use template::{Signature, Slot, Substitution, Template};
