//! Bearer token handling for authenticated upstreams

mod credential;
pub use credential::{Credential, CredentialCache, TokenExchange, TokenGrant, TOKEN_REFRESH_BUFFER};

mod opensky;
pub use opensky::{OpenSkyTokenClient, OPENSKY_TOKEN_URL, REQUEST_TIMEOUT, parse_token_response};
