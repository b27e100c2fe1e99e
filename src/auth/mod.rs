//! Authentication module for recap
//!
//! Bearer token extraction and HMAC token signing.

mod request;
mod token;

pub use request::{token_from_headers, TOKEN_COOKIE};
pub use token::{Claims, TokenSigner};
