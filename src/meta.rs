/// Argument checks applied before a request leaves the client.
use crate::error::{AvsError, Result};
use crate::types::{IndexId, Vector};

pub struct IndexNames;

impl IndexNames {
    /// Namespace and set names are limited to this many bytes by the server.
    pub const MAX_NAMESPACE_LEN: usize = 31;

    /// Validate the identity of an index.
    ///
    /// Current rules:
    /// - namespace must be non-empty and at most `MAX_NAMESPACE_LEN` bytes
    /// - name must be non-empty and must not contain `.`
    pub fn validate(id: &IndexId) -> Result<()> {
        validate_namespace(&id.namespace)?;
        if id.name.is_empty() {
            return Err(AvsError::InvalidInput("index name must not be empty".into()));
        }
        if id.name.contains('.') {
            return Err(AvsError::InvalidInput(format!(
                "index name must not contain '.': {}",
                id.name
            )));
        }
        Ok(())
    }
}

pub fn validate_namespace(namespace: &str) -> Result<()> {
    if namespace.is_empty() {
        return Err(AvsError::InvalidInput("namespace must not be empty".into()));
    }
    if namespace.len() > IndexNames::MAX_NAMESPACE_LEN {
        return Err(AvsError::InvalidInput(format!(
            "namespace longer than {} bytes: {namespace}",
            IndexNames::MAX_NAMESPACE_LEN
        )));
    }
    Ok(())
}

pub fn validate_dimensions(dimensions: u32) -> Result<()> {
    if dimensions == 0 {
        return Err(AvsError::InvalidInput(
            "index dimensions must be greater than zero".into(),
        ));
    }
    Ok(())
}

pub fn validate_search(query: &Vector, limit: u32) -> Result<()> {
    if query.is_empty() {
        return Err(AvsError::InvalidInput("query vector must not be empty".into()));
    }
    if limit == 0 {
        return Err(AvsError::InvalidInput("search limit must be greater than zero".into()));
    }
    Ok(())
}
