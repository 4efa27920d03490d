//! Bearer-token authentication for HTTP handlers.
//!
//! Handlers declare an [`Identity`] parameter; the extractor reads the
//! `Authorization: Bearer` header, validates the token against the configured
//! [`TokenService`](crate::domain::ports::TokenService), and rejects the
//! request before the handler body runs.

use std::future::{Ready, ready};

use actix_web::{FromRequest, HttpRequest, dev::Payload, http::header, web};

use crate::domain::ports::TokenError;
use crate::domain::{Error, Identity};
use crate::inbound::http::state::HttpState;

fn bearer_token(req: &HttpRequest) -> Result<&str, Error> {
    let header = req
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or_else(|| Error::unauthorized("access denied: no token provided"))?;
    let value = header
        .to_str()
        .map_err(|_| Error::unauthorized("malformed authorization header"))?;
    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| Error::unauthorized("malformed authorization header"))
}

fn identity_from_request(req: &HttpRequest) -> Result<Identity, Error> {
    let state = req
        .app_data::<web::Data<HttpState>>()
        .ok_or_else(|| Error::internal("HttpState not configured"))?;
    let token = bearer_token(req)?;
    state.tokens.validate(token).map_err(|err| match err {
        TokenError::Expired => Error::token_expired("token expired"),
        TokenError::Invalid => Error::unauthorized("invalid token"),
    })
}

impl FromRequest for Identity {
    type Error = Error;
    type Future = Ready<Result<Self, Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(identity_from_request(req))
    }
}
