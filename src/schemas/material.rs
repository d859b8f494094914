use serde::Serialize;

use crate::services::workflow::StoredObject;

#[derive(Debug, Serialize)]
pub(crate) struct MaterialResponse {
    pub(crate) key: String,
    pub(crate) url: String,
    pub(crate) size: i64,
    pub(crate) sha256: String,
}

impl From<StoredObject> for MaterialResponse {
    fn from(object: StoredObject) -> Self {
        Self { key: object.key, url: object.url, size: object.size, sha256: object.sha256 }
    }
}
