use thiserror::Error;

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("OS entropy source unavailable: {0}")]
    Entropy(String),
}
