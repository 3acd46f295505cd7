//! Typed errors for the catalog and input layers.
//!
//! Catalog errors decide whether a run aborts (product list) or degrades
//! (single product). Input errors are reported per file and never stop the scan.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("request to {url} failed: {message}")]
    Network { url: String, message: String },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("could not parse response from {url}: {message}")]
    Parse { url: String, message: String },

    #[error("catalog product list is empty")]
    EmptyProductList,
}

impl CatalogError {
    /// Whether another attempt could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            CatalogError::Network { .. } => true,
            CatalogError::Status { status, .. } => *status == 429 || *status >= 500,
            CatalogError::Parse { .. } | CatalogError::EmptyProductList => false,
        }
    }
}

#[derive(Error, Debug)]
pub enum InputError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("no package-name column in {path} (headers: {headers})")]
    MissingNameColumn { path: PathBuf, headers: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        let net = CatalogError::Network {
            url: "x".into(),
            message: "refused".into(),
        };
        assert!(net.is_transient());

        let throttled = CatalogError::Status { url: "x".into(), status: 429 };
        assert!(throttled.is_transient());

        let gone = CatalogError::Status { url: "x".into(), status: 404 };
        assert!(!gone.is_transient());

        let bad = CatalogError::Parse {
            url: "x".into(),
            message: "eof".into(),
        };
        assert!(!bad.is_transient());
    }
}
