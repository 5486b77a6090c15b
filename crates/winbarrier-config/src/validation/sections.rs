//! Per-section validation.

use std::collections::HashSet;

use crate::schema::{BarrierConfig, KNOWN_METHODS};

use super::helpers::validate_range;

pub(crate) fn validate_proxy(errors: &mut Vec<String>, config: &BarrierConfig) {
    let proxy = &config.proxy;

    if proxy.source_path.is_empty() {
        errors.push("proxy.source_path must not be empty".into());
    } else if proxy.source_path.chars().any(char::is_whitespace) {
        errors.push(format!(
            "proxy.source_path = {:?} must not contain whitespace",
            proxy.source_path
        ));
    }

    let mut seen = HashSet::new();
    for method in &proxy.allowed_methods {
        if !KNOWN_METHODS.contains(&method.as_str()) {
            errors.push(format!(
                "proxy.allowed_methods: unknown method {method:?} (known: {})",
                KNOWN_METHODS.join(", ")
            ));
        }
        if !seen.insert(method.as_str()) {
            errors.push(format!("proxy.allowed_methods: duplicate method {method:?}"));
        }
    }

    validate_range(errors, "proxy.command_queue", proxy.command_queue, 1, 4096);
}

pub(crate) fn validate_bus(errors: &mut Vec<String>, config: &BarrierConfig) {
    validate_range(errors, "bus.capacity", config.bus.capacity, 1, 65536);
}
