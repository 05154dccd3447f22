//! Request paths for the index service and namespace resolution.

pub(crate) const UPSERT_PATH: &str = "upsert";
pub(crate) const UPSERT_DATA_PATH: &str = "upsert-data";
pub(crate) const QUERY_PATH: &str = "query";
pub(crate) const QUERY_DATA_PATH: &str = "query-data";
pub(crate) const DELETE_PATH: &str = "delete";
pub(crate) const RESET_PATH: &str = "reset";
pub(crate) const RESET_ALL_PATH: &str = "reset?all=true";
pub(crate) const RANGE_PATH: &str = "range";
pub(crate) const FETCH_PATH: &str = "fetch";
pub(crate) const INFO_PATH: &str = "info";
pub(crate) const UPDATE_PATH: &str = "update";
pub(crate) const LIST_NAMESPACES_PATH: &str = "list-namespaces";
pub(crate) const DELETE_NAMESPACE_PATH: &str = "delete-namespace";
pub(crate) const RESUMABLE_QUERY_PATH: &str = "resumable-query";
pub(crate) const RESUMABLE_QUERY_DATA_PATH: &str = "resumable-query-data";
pub(crate) const RESUMABLE_QUERY_NEXT_PATH: &str = "resumable-query-next";
pub(crate) const RESUMABLE_QUERY_END_PATH: &str = "resumable-query-end";

/// Namespace used when the caller does not name one explicitly.
pub const DEFAULT_NAMESPACE: &str = "";

/// Resolves the request path for an operation in a namespace.
///
/// The default namespace maps to the un-suffixed base path; any other
/// namespace is appended as a path segment.
pub(crate) fn path_for(base: &str, namespace: &str) -> String {
    if namespace == DEFAULT_NAMESPACE {
        base.to_string()
    } else {
        format!("{base}/{namespace}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_namespace_is_unsuffixed() {
        assert_eq!(path_for(RANGE_PATH, ""), "range");
    }

    #[test]
    fn named_namespace_is_appended() {
        assert_eq!(path_for(RANGE_PATH, "ns1"), "range/ns1");
        assert_eq!(path_for(QUERY_DATA_PATH, "prod"), "query-data/prod");
    }
}
