// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use rustls::crypto::CryptoProvider;
use rustls::{ClientConfig, RootCertStore};
use tracing::debug;

use crate::error::DialError;

/// Installs the process-wide rustls crypto provider if none is installed yet.
pub fn init_crypto_provider() -> Result<(), String> {
    if CryptoProvider::get_default().is_some() {
        return Ok(());
    }
    match rustls::crypto::aws_lc_rs::default_provider().install_default() {
        Ok(_) => Ok(()),
        // Another thread installed one first
        Err(_) if CryptoProvider::get_default().is_some() => Ok(()),
        Err(e) => Err(format!("failed to initialize crypto library: {:?}", e)),
    }
}

/// Client configuration trusting the platform's native root certificates.
pub fn native_roots_client_config() -> Result<ClientConfig, DialError> {
    init_crypto_provider().map_err(DialError::TlsConfig)?;

    let native_certs = rustls_native_certs::load_native_certs();
    for err in &native_certs.errors {
        debug!("Failed to load native certificate: {}", err);
    }

    let mut root_cert_store = RootCertStore::empty();
    let (valid_count, invalid_count) = root_cert_store.add_parsable_certificates(native_certs.certs);
    if invalid_count > 0 {
        debug!("Ignored {} unparseable native certificates", invalid_count);
    }
    if valid_count == 0 {
        return Err(DialError::TlsConfig(
            "No valid certificates found in native root store".to_string(),
        ));
    }

    Ok(ClientConfig::builder()
        .with_root_certificates(root_cert_store)
        .with_no_client_auth())
}
