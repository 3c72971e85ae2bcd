//! Integration tests for the LDP resource store

mod concurrent_writes;
mod config_layering;
mod constraint_properties;
mod constraint_rules;
mod direct_container;
mod memento_history;
mod test_utils;
