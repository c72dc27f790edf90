//! Authentication for the Critique review API.
//!
//! The flow has two steps:
//!
//! 1. **Signup**: the client posts an email and username. The service
//!    creates (or finds) the account, issues a short numeric
//!    confirmation code, stores only its hash, and emails the code.
//!    Repeating the request for the same pair re-issues a fresh code.
//! 2. **Token**: the client posts the username and code. On a match
//!    the code is consumed and a signed access token is returned.
//!
//! Email delivery sits behind [`EmailProvider`] so tests can record
//! messages instead of sending them.

pub mod code;
pub mod email;
pub mod signup;
pub mod token;

#[cfg(any(test, feature = "test-utils"))]
pub mod mocks;

pub use email::{ConsoleEmailProvider, EmailProvider, SmtpEmailProvider};
pub use signup::{SignupOutcome, SignupService};
pub use token::{Claims, TokenSigner};
