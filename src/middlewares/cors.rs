use crate::config::ClientConfig;
use actix_cors::Cors;

/// Any origin in debug; otherwise the storefront plus `allowed_origins`.
pub fn create_cors(client: &ClientConfig) -> Cors {
    let cors = Cors::default()
        .allowed_methods(vec!["GET", "POST", "PUT", "PATCH", "DELETE", "OPTIONS"])
        .allow_any_header()
        .supports_credentials()
        .max_age(3600);

    if client.debug {
        return cors.allowed_origin_fn(|_, _req_head| true);
    }

    let mut origins: Vec<String> = client
        .allowed_origins
        .iter()
        .map(|o| normalize_origin(o))
        .collect();
    origins.push(normalize_origin(&client.frontend_url));

    cors.allowed_origin_fn(move |origin, _req_head| {
        origin
            .to_str()
            .map(|o| origins.iter().any(|allowed| allowed == o))
            .unwrap_or(false)
    })
}

/// Bare hosts become `https://host`; trailing slashes are dropped.
fn normalize_origin(origin: &str) -> String {
    let origin = origin.trim().trim_end_matches('/');
    if origin.contains("://") {
        origin.to_string()
    } else {
        format!("https://{origin}")
    }
}
