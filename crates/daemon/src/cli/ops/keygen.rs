use clap::Args;

use common::crypto::{KeyError, PiiKey};

/// Print a fresh base64 key, e.g. for SANTA_PII_KEY
#[derive(Args, Debug, Clone)]
pub struct Keygen;

#[async_trait::async_trait]
impl crate::cli::op::Op for Keygen {
    type Error = KeyError;
    type Output = String;

    async fn execute(&self, _ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        Ok(PiiKey::generate()?.to_base64())
    }
}
