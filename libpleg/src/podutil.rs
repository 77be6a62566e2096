//! Encoding and decoding of runtime container names.
//!
//! The runtime stores each container under a full name that encodes all the
//! identifying fields of the container:
//!
//! ```text
//! {pod namespace}_{pod name}_{pod uid}_{container name}_{attempt}
//! ```
//!
//! `_` is the separator; none of the fields may contain it (pod and container
//! names follow DNS label rules, which exclude underscores). A name that does
//! not decode this way belongs to a container this node did not create, and
//! the PLEG treats it as removable.

use uuid::Uuid;

pub const CONTAINER_NAME_SEPARATOR: char = '_';

/// Identifying fields decoded from a full container name.
///
/// Fields are kept as the raw strings found in the name; consumers that need
/// typed values convert them themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedContainerName {
    pub pod_namespace: String,
    pub pod_name: String,
    pub pod_uid: String,
    pub container_name: String,
    pub attempt: String,
}

/// Encodes the full container name for the given identifying fields.
pub fn build_container_full_name(
    pod_namespace: &str,
    pod_name: &str,
    pod_uid: Uuid,
    container_name: &str,
    attempt: u32,
) -> String {
    format!("{pod_namespace}_{pod_name}_{pod_uid}_{container_name}_{attempt}")
}

/// Decodes a full container name.
///
/// Returns `None` unless the name splits into exactly five non-empty fields.
pub fn parse_container_full_name(full_name: &str) -> Option<ParsedContainerName> {
    let parts: Vec<&str> = full_name.split(CONTAINER_NAME_SEPARATOR).collect();
    if parts.len() != 5 || parts.iter().any(|p| p.is_empty()) {
        return None;
    }

    Some(ParsedContainerName {
        pod_namespace: parts[0].to_string(),
        pod_name: parts[1].to_string(),
        pod_uid: parts[2].to_string(),
        container_name: parts[3].to_string(),
        attempt: parts[4].to_string(),
    })
}
