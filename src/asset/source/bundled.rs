use async_trait::async_trait;

use super::{AssetLoader, LoadStatus};
use crate::asset::{AssetData, AssetError, AssetRecord, LoadContext};

/// Content fixed at construction time.
///
/// Every load restores the pristine content, so finalizing it again yields
/// the same bytes.
#[derive(Debug, Clone)]
pub struct BundledSource {
    pristine: AssetData,
}

impl BundledSource {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            pristine: AssetData::Text(text.into()),
        }
    }

    pub fn bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            pristine: AssetData::Bytes(bytes.into()),
        }
    }
}

#[async_trait]
impl AssetLoader for BundledSource {
    async fn load(
        &mut self,
        record: &mut AssetRecord,
        _ctx: &LoadContext,
    ) -> Result<LoadStatus, AssetError> {
        record.data = self.pristine.clone();
        record.source_stat.size = self.pristine.len() as u64;
        Ok(LoadStatus::Changed)
    }
}
