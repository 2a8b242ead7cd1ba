//! MCP tool annotations derived from HTTP method semantics (RFC 9110).

use reqwest::Method;
use rmcp::model::ToolAnnotations;

/// Build annotations for a tool backed by `method`, titled with the operation summary.
///
/// `openWorldHint` is always set: every tool talks to an external API. Extension methods only
/// get that hint; nothing else is guessed about them.
#[must_use]
pub fn annotations_for_operation(method: &Method, summary: Option<&str>) -> ToolAnnotations {
    let (read_only, destructive, idempotent) = match *method {
        Method::GET | Method::HEAD | Method::OPTIONS | Method::TRACE => {
            (Some(true), Some(false), Some(true))
        }
        Method::POST => (Some(false), Some(false), Some(false)),
        Method::PUT | Method::DELETE => (Some(false), Some(true), Some(true)),
        // PATCH may or may not be idempotent.
        Method::PATCH => (Some(false), Some(true), None),
        _ => (None, None, None),
    };

    ToolAnnotations {
        title: summary
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string),
        read_only_hint: read_only,
        destructive_hint: destructive,
        idempotent_hint: idempotent,
        open_world_hint: Some(true),
    }
}

#[cfg(test)]
mod tests {
    use super::annotations_for_operation;
    use reqwest::Method;

    #[test]
    fn every_method_is_open_world() {
        let custom: Method = "PROPFIND".parse().expect("valid method token");
        for m in [
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            custom,
        ] {
            assert_eq!(annotations_for_operation(&m, None).open_world_hint, Some(true));
        }
    }

    #[test]
    fn get_is_read_only_and_delete_is_destructive() {
        let get = annotations_for_operation(&Method::GET, Some("List pets"));
        assert_eq!(get.read_only_hint, Some(true));
        assert_eq!(get.idempotent_hint, Some(true));
        assert_eq!(get.title.as_deref(), Some("List pets"));

        let delete = annotations_for_operation(&Method::DELETE, Some("  "));
        assert_eq!(delete.destructive_hint, Some(true));
        assert_eq!(delete.title, None);
    }

    #[test]
    fn patch_leaves_idempotence_unknown() {
        let a = annotations_for_operation(&Method::PATCH, None);
        assert_eq!(a.read_only_hint, Some(false));
        assert_eq!(a.idempotent_hint, None);
    }
}
