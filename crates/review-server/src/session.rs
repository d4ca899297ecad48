use review_core::{render_document_with, Document, RenderOptions, RenderTree};
use sha2::{Digest, Sha256};

use crate::error::AppError;

const DOCUMENT_ID_HEX_CHARS: usize = 16;

/// The document currently under review and its rendered tree.
///
/// A new load replaces the whole session; nothing is patched in place.
#[derive(Debug)]
pub struct Session {
    pub document: Document,
    pub document_type: Option<String>,
    pub document_id: String,
    pub tree: RenderTree,
}

impl Session {
    pub fn load(document: Document, document_type: Option<String>, options: &RenderOptions) -> Self {
        let document_id = fingerprint(&document);
        let tree = render_document_with(&document.raw_text, &document.risks, options);
        Self {
            document,
            document_type,
            document_id,
            tree,
        }
    }

    /// Reject calls that name a document other than the loaded one.
    pub fn check_id(&self, requested: Option<&str>) -> Result<(), AppError> {
        match requested.map(str::trim).filter(|id| !id.is_empty()) {
            Some(id) if id != self.document_id => Err(AppError::StaleDocument {
                requested: id.to_string(),
                current: self.document_id.clone(),
            }),
            _ => Ok(()),
        }
    }
}

/// Deterministic identifier for a document: SHA-256 over the text and every
/// risk, truncated to a short hex prefix.
pub fn fingerprint(document: &Document) -> String {
    let mut hasher = Sha256::new();
    hasher.update(document.raw_text.as_bytes());
    for risk in &document.risks {
        hasher.update(b"\x1f");
        hasher.update(risk.risk_level.as_str().as_bytes());
        hasher.update(b"|");
        hasher.update(risk.clause.as_bytes());
        hasher.update(b"|");
        hasher.update(risk.description.as_bytes());
    }
    let hash = format!("{:x}", hasher.finalize());
    hash[..DOCUMENT_ID_HEX_CHARS].to_string()
}
