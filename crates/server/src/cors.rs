use config::{AnyOrAsciiStringArray, AnyOrHttpMethodArray, AnyOrUrlArray, CorsConfig};
use http::{HeaderName, HeaderValue};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer, ExposeHeaders};

/// Builds the CORS layer. Browsers reject a wildcard together with credentials, so with
/// `allow_credentials` a `"*"` mirrors the request instead.
pub(super) fn generate(
    CorsConfig {
        allow_credentials,
        allow_origins,
        max_age,
        allow_methods,
        allow_headers,
        expose_headers,
        allow_private_network,
    }: &CorsConfig,
) -> CorsLayer {
    let mut cors_layer = CorsLayer::new()
        .allow_credentials(*allow_credentials)
        .allow_private_network(*allow_private_network);

    if let Some(allow_origins) = allow_origins {
        cors_layer = cors_layer.allow_origin(match allow_origins {
            AnyOrUrlArray::Any if *allow_credentials => AllowOrigin::mirror_request(),
            AnyOrUrlArray::Any => AllowOrigin::any(),
            AnyOrUrlArray::Explicit(origins) => explicit_origins(origins),
        });
    }

    if let Some(max_age) = max_age {
        cors_layer = cors_layer.max_age(*max_age);
    }

    if let Some(allow_methods) = allow_methods {
        cors_layer = cors_layer.allow_methods(match allow_methods {
            AnyOrHttpMethodArray::Any if *allow_credentials => AllowMethods::mirror_request(),
            AnyOrHttpMethodArray::Any => AllowMethods::any(),
            AnyOrHttpMethodArray::Explicit(methods) => {
                let mut methods: Vec<http::Method> = methods.iter().map(|method| http::Method::from(*method)).collect();

                if !methods.contains(&http::Method::OPTIONS) {
                    methods.push(http::Method::OPTIONS);
                }

                AllowMethods::list(methods)
            }
        });
    }

    if let Some(allow_headers) = allow_headers {
        cors_layer = cors_layer.allow_headers(match allow_headers {
            AnyOrAsciiStringArray::Any if *allow_credentials => AllowHeaders::mirror_request(),
            AnyOrAsciiStringArray::Any => AllowHeaders::any(),
            AnyOrAsciiStringArray::Explicit(headers) => AllowHeaders::list(header_names(headers)),
        });
    }

    if let Some(expose_headers) = expose_headers {
        match expose_headers {
            AnyOrAsciiStringArray::Any if *allow_credentials => {
                log::warn!("Ignoring expose_headers = \"*\": it cannot be combined with allow_credentials");
            }
            AnyOrAsciiStringArray::Any => cors_layer = cors_layer.expose_headers(ExposeHeaders::any()),
            AnyOrAsciiStringArray::Explicit(headers) => {
                cors_layer = cors_layer.expose_headers(ExposeHeaders::list(header_names(headers)));
            }
        }
    }

    cors_layer
}

fn explicit_origins(origins: &[url::Url]) -> AllowOrigin {
    let mut constants = Vec::new();
    let mut globs = Vec::new();

    for origin in origins {
        let origin = &origin[..url::Position::BeforePath];

        if origin.chars().any(|c| "?*[]{}!\\".contains(c)) {
            globs.push(origin.to_owned());
            continue;
        }

        match HeaderValue::from_str(origin) {
            Ok(value) => constants.push(value),
            Err(_) => log::warn!("Ignoring CORS origin {origin}: not a valid header value"),
        }
    }

    if globs.is_empty() {
        return AllowOrigin::list(constants);
    }

    AllowOrigin::predicate(move |origin, _| {
        if constants.iter().any(|constant| origin == constant) {
            return true;
        }

        let Ok(origin) = origin.to_str() else {
            return false;
        };

        globs.iter().any(|glob| fast_glob::glob_match(glob, origin))
    })
}

fn header_names(headers: &[ascii::AsciiString]) -> Vec<HeaderName> {
    headers
        .iter()
        .filter_map(|header| match HeaderName::from_bytes(header.as_bytes()) {
            Ok(name) => Some(name),
            Err(_) => {
                log::warn!("Ignoring CORS header {header}: not a valid header name");
                None
            }
        })
        .collect()
}
