/// Authentication module
///
/// Handles JWT token generation/validation, password hashing,
/// refresh token bookkeeping and the session lifecycle.

mod claims;
mod cookies;
mod credentials;
mod extractor;
mod jwt;
mod ledger;
mod password;
mod session;

pub use claims::{Claims, Identity};
pub use cookies::{removal_cookie, token_cookie, ACCESS_COOKIE, REFRESH_COOKIE};
pub use credentials::{validate_credentials, IdentifierKind};
pub use extractor::access_token_from;
pub use jwt::{generate_token, validate_token, TokenKind};
pub use ledger::{hash_token, RefreshTokenLedger};
pub use password::PasswordHasher;
pub use session::{SessionController, TokenPair};
