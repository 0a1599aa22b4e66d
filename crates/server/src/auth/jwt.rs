use std::str::FromStr;

use super::AuthResult;
use super::error::AuthError;
use super::jwks::{Alg, Jwks, JwksCache};
use config::OauthConfig;
use http::{header::AUTHORIZATION, request::Parts};
use identity::{Claims, Token};
use jwt_compact::{Algorithm, AlgorithmExt, TimeOptions, UntrustedToken, jwk::JsonWebKey};

const BEARER_TOKEN_LENGTH: usize = 6;

pub struct JwtAuth {
    config: OauthConfig,
    jwks_cache: JwksCache,
}

impl JwtAuth {
    pub fn new(config: OauthConfig) -> Self {
        let jwks_cache = JwksCache::new(config.url.clone(), config.poll_interval);

        JwtAuth { config, jwks_cache }
    }

    /// Validates the bearer token of the request, if there is one.
    ///
    /// `Ok(None)` means the request carries no `Authorization` header at all. A header that is
    /// present but unusable is always an error, whatever the route.
    pub async fn authenticate(&self, parts: &Parts) -> AuthResult<Option<Token>> {
        let Some(token_header) = parts.headers.get(AUTHORIZATION) else {
            return Ok(None);
        };

        let token_str = token_header
            .to_str()
            .map_err(|_| AuthError::InvalidToken("invalid token"))?;

        // RFC 7235: authentication scheme is case-insensitive
        if token_str.len() > BEARER_TOKEN_LENGTH
            && token_str.is_char_boundary(BEARER_TOKEN_LENGTH)
            && token_str[..BEARER_TOKEN_LENGTH].eq_ignore_ascii_case("bearer")
            && token_str[BEARER_TOKEN_LENGTH..].starts_with(' ')
        {
            let token_str = token_str[BEARER_TOKEN_LENGTH + 1..].trim();

            if token_str.is_empty() {
                return Err(AuthError::InvalidToken("missing token"));
            }

            let token = UntrustedToken::new(token_str).map_err(|_| AuthError::InvalidToken("malformed token"))?;

            let jwks = self.jwks_cache.get().await.map_err(|err| {
                log::error!("Failed to fetch JWKS from {}: {err}", self.config.url);
                AuthError::Internal
            })?;

            let token = self
                .validate_token(&jwks, token)
                .ok_or(AuthError::InvalidToken("token validation failed"))?;

            let claims = token.claims();

            let token = Token::new(claims.custom.clone())
                .with_issued_at(claims.issued_at)
                .with_expires_at(claims.expiration);

            Ok(Some(token))
        } else if token_str.eq_ignore_ascii_case("bearer") {
            Err(AuthError::InvalidToken("missing token"))
        } else {
            Err(AuthError::InvalidToken("token must be prefixed with Bearer"))
        }
    }

    fn validate_token(&self, jwks: &Jwks<'_>, untrusted_token: UntrustedToken<'_>) -> Option<jwt_compact::Token<Claims>> {
        use jwt_compact::alg::*;

        let Ok(alg) = Alg::from_str(untrusted_token.algorithm()) else {
            log::debug!("Token rejected: unsupported algorithm {}", untrusted_token.algorithm());
            return None;
        };

        let time_options = TimeOptions::default();
        let mut validation_results = Vec::new();

        // Every key is tried so that timing does not reveal which key matched.
        for jwk in &jwks.keys {
            let kid_matches = match (&untrusted_token.header().key_id, &jwk.key_id) {
                (Some(expected), Some(kid)) => expected == kid,
                (Some(_), None) => false,
                (None, _) => true,
            };

            let decode_result = match alg {
                Alg::HS256 => decode(Hs256, &jwk.key, &untrusted_token),
                Alg::HS384 => decode(Hs384, &jwk.key, &untrusted_token),
                Alg::HS512 => decode(Hs512, &jwk.key, &untrusted_token),
                Alg::ES256 => decode(Es256, &jwk.key, &untrusted_token),
                Alg::RS256 => decode(Rsa::rs256(), &jwk.key, &untrusted_token),
                Alg::RS384 => decode(Rsa::rs384(), &jwk.key, &untrusted_token),
                Alg::RS512 => decode(Rsa::rs512(), &jwk.key, &untrusted_token),
                Alg::PS256 => decode(Rsa::ps256(), &jwk.key, &untrusted_token),
                Alg::PS384 => decode(Rsa::ps384(), &jwk.key, &untrusted_token),
                Alg::PS512 => decode(Rsa::ps512(), &jwk.key, &untrusted_token),
                Alg::EdDSA => decode(Ed25519, &jwk.key, &untrusted_token),
            };

            if let Some(token) = decode_result {
                let claims = token.claims();

                let time_valid = claims.validate_expiration(&time_options).is_ok()
                    && (claims.not_before.is_none() || claims.validate_maturity(&time_options).is_ok());

                let issuer_valid = self.validate_issuer(&claims.custom);
                let audience_valid = self.validate_audience(&claims.custom);

                validation_results.push((kid_matches, time_valid, issuer_valid, audience_valid, token));
            }
        }

        validation_results
            .into_iter()
            .find(|(kid_matches, time_valid, issuer_valid, audience_valid, _)| {
                *kid_matches && *time_valid && *issuer_valid && *audience_valid
            })
            .map(|(_, _, _, _, token)| token)
    }

    fn validate_issuer(&self, claims: &Claims) -> bool {
        let Some(expected_issuer) = &self.config.expected_issuer else {
            return true;
        };

        match claims.string("iss") {
            Some(issuer) if issuer == expected_issuer => true,
            Some(_) => {
                log::debug!("Token rejected: invalid issuer");
                false
            }
            None => {
                log::debug!("Token rejected: missing issuer claim");
                false
            }
        }
    }

    fn validate_audience(&self, claims: &Claims) -> bool {
        let Some(expected_audience) = &self.config.expected_audience else {
            return true;
        };

        if claims.has_audience(expected_audience) {
            true
        } else {
            log::debug!("Token rejected: audience validation failed");
            false
        }
    }
}

fn decode<A: Algorithm>(
    alg: A,
    jwk: &JsonWebKey<'_>,
    untrusted_token: &UntrustedToken<'_>,
) -> Option<jwt_compact::Token<Claims>>
where
    A::VerifyingKey: std::fmt::Debug + for<'a> TryFrom<&'a JsonWebKey<'a>>,
{
    let key = A::VerifyingKey::try_from(jwk).ok()?;
    alg.validator(&key).validate(untrusted_token).ok()
}
