use crate::types::media::Asset;
use crate::types::timeline::Timeline;
use serde::{Deserialize, Serialize};

/// Backend-confirmed project state. Every "project updated" event carries one
/// of these and it replaces the previous snapshot wholesale.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSnapshot {
    pub project_id: String,
    pub name: String,
    #[serde(default)]
    pub timeline: Timeline,
    #[serde(default)]
    pub assets: Vec<Asset>,
}

impl ProjectSnapshot {
    pub fn new(project_id: impl Into<String>, name: impl Into<String>, timeline: Timeline) -> Self {
        Self {
            project_id: project_id.into(),
            name: name.into(),
            timeline,
            assets: Vec::new(),
        }
    }

    pub fn with_asset(mut self, asset: Asset) -> Self {
        self.assets.push(asset);
        self
    }

    pub fn asset(&self, asset_id: &str) -> Option<&Asset> {
        self.assets.iter().find(|a| a.asset_id == asset_id)
    }
}
