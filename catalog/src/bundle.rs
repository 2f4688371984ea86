//! Hashed schema bundles.
//!
//! A bundle is a [`SchemaPackage`] whose `bundle_hash` is the hex SHA-256 of
//! the compact JSON serialization of its `types`. Loaders verify the hash
//! whenever one is present.

use docschema_core::{SchemaPackage, SchemaType};
use sha2::{Digest, Sha256};

use crate::error::{CatalogError, Result};

/// Computes the hex SHA-256 digest of `types`.
///
/// # Errors
///
/// Returns [`JsonError`](CatalogError::JsonError) if the types cannot be
/// serialized.
pub fn bundle_hash(types: &[SchemaType]) -> Result<String> {
    let bytes = serde_json::to_vec(types)?;
    let hash = Sha256::digest(&bytes);
    Ok(format!("{:x}", hash))
}

/// Packages `types` into a hashed bundle.
///
/// # Examples
///
/// ```
/// use docschema_catalog::{build_bundle, verify_bundle};
/// use docschema_core::{Kind, SchemaType};
///
/// let types = vec![SchemaType::new("post", Kind::Document)];
/// let bundle = build_bundle(types, "1.0.0", "2024-01-15T10:30:00Z").unwrap();
/// assert_eq!(bundle.bundle_hash.as_ref().map(String::len), Some(64));
/// verify_bundle(&bundle).unwrap();
/// ```
pub fn build_bundle(
    types: Vec<SchemaType>,
    version: &str,
    generated_at: &str,
) -> Result<SchemaPackage> {
    let mut package = SchemaPackage::new(version, generated_at);
    package.bundle_hash = Some(bundle_hash(&types)?);
    package.types = types;
    Ok(package)
}

/// Checks a bundle's recorded hash against its types.
///
/// Bundles without a hash pass unchecked.
///
/// # Errors
///
/// Returns [`InvalidChecksum`](CatalogError::InvalidChecksum) on mismatch.
pub fn verify_bundle(package: &SchemaPackage) -> Result<()> {
    let Some(expected) = package.bundle_hash.as_deref() else {
        return Ok(());
    };
    let actual = bundle_hash(&package.types)?;
    if actual != expected {
        return Err(CatalogError::InvalidChecksum(format!(
            "bundle declares {expected}, types hash to {actual}"
        )));
    }
    Ok(())
}
