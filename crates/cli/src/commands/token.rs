use anyhow::{Result, anyhow};
use ecotoken_core::RelayConfig;
use ecotoken_warehouse::KeyPairSigner;

pub(crate) fn run(config: &RelayConfig) -> Result<()> {
    let signer = KeyPairSigner::new(
        config.identity.clone(),
        config.private_key_path.clone(),
        config.private_key_passphrase.clone(),
    );

    let token = signer.mint().map_err(|e| {
        if e.is_credential_error() {
            anyhow!("{e} (check SF_PRIVATE_KEY_PATH and SF_PRIVATE_KEY_PASSPHRASE)")
        } else {
            anyhow!(e)
        }
    })?;
    tracing::info!(issuer = %config.identity.issuer(), "minted key-pair token");
    println!("{token}");
    Ok(())
}
