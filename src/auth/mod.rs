//! Bearer-token authentication.
//!
//! - [`JwtHandler`]: HS256 token issue and validation
//! - [`UserStore`]: fixed bcrypt-hashed account set
//! - [`AuthGate`]: the request pipeline stage tools call before running

mod gate;
mod jwt;
mod users;

pub use gate::{bearer_token, AuthGate, Identity};
pub use jwt::{AuthToken, Claims, JwtHandler, AUDIENCE, ISSUER};
pub use users::{Account, Role, UserStore};
