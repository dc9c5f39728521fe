//! URI template paths: normalization, segments and parameter tokens.

/// Normalize a URI template.
///
/// The result has a single leading `/`, no empty segments, no trailing `/`
/// and `{name:pattern}` tokens reduced to `{name}`. The root path is `/`.
pub fn normalize_path(path: &str) -> String {
    let stripped = strip_patterns(path);
    let segments: Vec<&str> = stripped.split('/').filter(|s| !s.is_empty()).collect();
    format!("/{}", segments.join("/"))
}

/// Drop regular-expression constraints from parameter tokens. Braces inside a
/// constraint are balanced, so `{id:[0-9]{3}}` becomes `{id}`.
fn strip_patterns(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    let mut chars = path.chars();

    while let Some(c) = chars.next() {
        out.push(c);
        if c != '{' {
            continue;
        }
        let mut depth = 1usize;
        let mut in_pattern = false;
        for c in chars.by_ref() {
            match c {
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        out.push('}');
                        break;
                    }
                }
                ':' if depth == 1 => {
                    in_pattern = true;
                    continue;
                }
                _ => {}
            }
            if !in_pattern {
                out.push(c);
            }
        }
    }
    out
}

/// Non-empty segments of a normalized path.
pub fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

/// Number of non-empty segments.
pub fn segment_count(path: &str) -> usize {
    segments(path).count()
}

/// Parameter tokens of `path` with the zero-based index of the segment that
/// holds them, in the order they appear.
pub fn parameters(path: &str) -> Vec<(String, usize)> {
    segments(path)
        .enumerate()
        .flat_map(|(position, segment)| {
            segment_parameters(segment)
                .into_iter()
                .map(move |name| (name, position))
        })
        .collect()
}

fn segment_parameters(segment: &str) -> Vec<String> {
    let mut names = Vec::new();
    let mut rest = segment;
    while let Some(start) = rest.find('{') {
        let body = &rest[start + 1..];
        let Some(end) = body.find('}') else {
            break;
        };
        let name = body[..end].trim();
        if !name.is_empty() {
            names.push(name.to_string());
        }
        rest = &body[end + 1..];
    }
    names
}

/// Whether `prefix` is a proper segment-wise prefix of `path`. Both paths
/// must be normalized.
pub fn is_proper_prefix(prefix: &str, path: &str) -> bool {
    if prefix == path {
        return false;
    }
    if prefix == "/" {
        return true;
    }
    path.strip_prefix(prefix)
        .is_some_and(|rest| rest.starts_with('/'))
}

/// Portion of `path` below `parent`, with a leading `/`. Both paths must be
/// normalized and `parent` must be a proper prefix of `path`.
pub fn relative_to(parent: &str, path: &str) -> String {
    if parent == "/" {
        return path.to_string();
    }
    path.strip_prefix(parent).unwrap_or(path).to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_slashes() {
        assert_eq!(normalize_path("mount//api/v1/"), "/mount/api/v1");
        assert_eq!(normalize_path(""), "/");
        assert_eq!(normalize_path("///"), "/");
        assert_eq!(normalize_path("/widgets"), "/widgets");
    }

    #[test]
    fn test_normalize_strips_patterns() {
        assert_eq!(
            normalize_path("/widgets/{id:[0-9]{3}}/gizmos/{name: .+}"),
            "/widgets/{id}/gizmos/{name}"
        );
    }

    #[test]
    fn test_parameters_with_positions() {
        let params = parameters("/mount/api/v1/widgets/{id1}/gizmos/{id2}");
        assert_eq!(
            params,
            vec![("id1".to_string(), 4), ("id2".to_string(), 6)]
        );
        assert_eq!(
            parameters("/files/{name}.{ext}"),
            vec![("name".to_string(), 1), ("ext".to_string(), 1)]
        );
    }

    #[test]
    fn test_proper_prefix_is_segment_wise() {
        assert!(is_proper_prefix("/widgets", "/widgets/{id}"));
        assert!(is_proper_prefix("/", "/widgets"));
        assert!(!is_proper_prefix("/widgets", "/widgets"));
        assert!(!is_proper_prefix("/widget", "/widgets/{id}"));
    }

    #[test]
    fn test_relative_to_parent() {
        assert_eq!(relative_to("/widgets", "/widgets/{id}/gizmos"), "/{id}/gizmos");
        assert_eq!(relative_to("/", "/widgets"), "/widgets");
    }
}
