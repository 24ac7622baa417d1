use axum::{extract::Request, middleware::Next, response::Response};
use metrics::{counter, histogram};
use std::time::Instant;

/// Collapse path segments that look like identifiers (UUIDs, numeric ids,
/// dates) so the path label stays low-cardinality.
fn normalize_path(path: &str) -> String {
    path.split('/')
        .map(|segment| {
            let is_id = !segment.is_empty()
                && segment
                    .chars()
                    .all(|c| c.is_ascii_hexdigit() || c == '-')
                && segment.chars().any(|c| c.is_ascii_digit());
            if is_id { ":id" } else { segment }
        })
        .collect::<Vec<_>>()
        .join("/")
}

pub async fn metrics_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().to_string();
    let path = normalize_path(req.uri().path());

    let response = next.run(req).await;

    let duration = start.elapsed();
    let status = response.status().as_u16().to_string();

    let labels = [("method", method), ("path", path), ("status", status)];

    counter!("http_requests_total", &labels).increment(1);
    histogram!("http_request_duration_seconds", &labels).record(duration.as_secs_f64());

    response
}

#[cfg(test)]
mod tests {
    use super::normalize_path;

    #[test]
    fn normalize_path_collapses_uuid_segments() {
        assert_eq!(
            normalize_path("/api/v1/farms/550e8400-e29b-41d4-a716-446655440000"),
            "/api/v1/farms/:id"
        );
    }

    #[test]
    fn normalize_path_keeps_static_segments() {
        assert_eq!(normalize_path("/health"), "/health");
        assert_eq!(
            normalize_path("/api/v1/operations/2026-08-29"),
            "/api/v1/operations/:id"
        );
    }
}
