mod actor;
mod nonce;
mod token;

pub use actor::{Actor, Capability};
pub use nonce::{NonceAge, NonceIssuer};
pub use token::{generate_token, hash_token};
