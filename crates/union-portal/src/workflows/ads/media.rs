use mime::Mime;
use serde::{Deserialize, Serialize};

use crate::workflows::store::StoreError;
use crate::workflows::tenancy::UnionId;

/// What an uploaded file is for; decides which content types are allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    /// Banner image for MAIN and SUB ads.
    Creative,
    /// Signed contract scan, PDF or image.
    ContractDocument,
}

impl MediaKind {
    pub const fn expected(self) -> &'static str {
        match self {
            Self::Creative => "image/*",
            Self::ContractDocument => "application/pdf or image/*",
        }
    }

    fn accepts(self, content_type: &Mime) -> bool {
        let image = content_type.type_() == mime::IMAGE;
        match self {
            Self::Creative => image,
            Self::ContractDocument => {
                image || content_type.essence_str() == mime::APPLICATION_PDF.essence_str()
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MediaUpload {
    pub url: String,
    pub content_type: String,
    pub size: usize,
}

/// Object storage bucket. Returns the public URL of the stored file.
pub trait MediaStore: Send + Sync {
    fn put(
        &self,
        union_id: &UnionId,
        file_name: &str,
        content_type: &Mime,
        bytes: &[u8],
    ) -> Result<String, StoreError>;
}

/// Parse the declared content type and check it against the upload kind.
/// Returns `None` when the type is malformed or not allowed.
pub fn validate_content_type(kind: MediaKind, raw: &str) -> Option<Mime> {
    let parsed: Mime = raw.trim().parse().ok()?;
    kind.accepts(&parsed).then_some(parsed)
}
