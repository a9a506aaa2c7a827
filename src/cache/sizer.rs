//! Value Sizer Module
//!
//! Approximate byte-size estimation for stored JSON values. The estimate is
//! deliberately coarse; it feeds the memory accounting, not an allocator. The
//! same formula must be used everywhere so the byte bound behaves predictably.

use serde_json::Value;

/// Fixed per-entry overhead added on top of key and value bytes.
pub const ENTRY_OVERHEAD: usize = 64;

/// Container overhead charged per array or object.
const CONTAINER_OVERHEAD: usize = 16;

// == Value Size ==
/// Estimates the byte footprint of a JSON value.
///
/// - null: 8
/// - boolean: 1
/// - number: 8
/// - string: UTF-8 byte length
/// - array: 16 + sum of element sizes
/// - object: 16 + sum of (key UTF-8 bytes + value size)
pub fn estimate_value_bytes(value: &Value) -> usize {
    match value {
        Value::Null => 8,
        Value::Bool(_) => 1,
        Value::Number(_) => 8,
        Value::String(s) => s.len(),
        Value::Array(items) => {
            CONTAINER_OVERHEAD + items.iter().map(estimate_value_bytes).sum::<usize>()
        }
        Value::Object(map) => {
            CONTAINER_OVERHEAD
                + map
                    .iter()
                    .map(|(k, v)| k.len() + estimate_value_bytes(v))
                    .sum::<usize>()
        }
    }
}

// == Entry Size ==
/// Estimates the total footprint of an entry: key bytes + value bytes + overhead.
pub fn estimate_entry_bytes(key: &str, value: &Value) -> usize {
    key.len() + estimate_value_bytes(value) + ENTRY_OVERHEAD
}
