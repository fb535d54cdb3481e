mod rule;

pub use rule::{NewRule, Rule};
