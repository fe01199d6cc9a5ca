use http::Uri;

/// Split a request-target into `(path, query)`.
///
/// Everything before the first `?` is the path, everything after it is the
/// query. A `#fragment` is dropped first. No `?` means an empty query.
/// Absolute-form targets (`http://host/path?q`) are reduced to their path
/// and query.
///
/// Targets are read as request-targets, not as generic URI references:
/// `//foo/bar` stays a path (no authority is split off), and an absolute
/// target with no path yields `/`, the path `http::Uri` reports for it.
pub fn split_target(target: &str) -> (String, String) {
    let without_fragment = match target.find('#') {
        Some(pos) => &target[..pos],
        None => target,
    };

    if without_fragment.contains("://") {
        if let Ok(uri) = without_fragment.parse::<Uri>() {
            if uri.scheme().is_some() {
                let path = uri.path().to_string();
                let query = uri.query().unwrap_or_default().to_string();
                return (path, query);
            }
        }
    }

    match without_fragment.find('?') {
        Some(pos) => (
            without_fragment[..pos].to_string(),
            without_fragment[pos + 1..].to_string(),
        ),
        None => (without_fragment.to_string(), String::new()),
    }
}
