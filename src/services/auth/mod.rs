pub mod factory;
pub mod firebase;
pub mod keys;
pub mod verifier;

pub use factory::build_token_verifier;
pub use firebase::FirebaseVerifier;
pub use keys::{KeyStore, KeyStoreError};
pub use verifier::{Identity, TokenVerifier, VerifyError};
