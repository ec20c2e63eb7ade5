//! # Frame and topic name resolution
//!
//! Topic and frame names may carry a robot namespace prefix so that multiple
//! bases can share one simulation. An empty namespace resolves to the bare
//! name.

// ------------------------------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Resolve a frame or topic name against a namespace prefix.
///
/// Leading and trailing separators in either part are ignored, so
/// `resolve("triton/", "/odom")` and `resolve("triton", "odom")` both give
/// `"triton/odom"`.
pub fn resolve(namespace: &str, name: &str) -> String {
    let namespace = namespace.trim_matches('/');
    let name = name.trim_start_matches('/');

    if namespace.is_empty() {
        String::from(name)
    }
    else {
        format!("{}/{}", namespace, name)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_resolve() {
        assert_eq!(resolve("", "odom"), "odom");
        assert_eq!(resolve("triton", "odom"), "triton/odom");
        assert_eq!(resolve("triton/", "/odom"), "triton/odom");
        assert_eq!(resolve("/triton", "cmd_vel"), "triton/cmd_vel");
        assert_eq!(resolve("", "/base_footprint"), "base_footprint");
    }
}
