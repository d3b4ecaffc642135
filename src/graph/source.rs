use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use serde_json::Value;

use crate::util::leading_integer;

#[derive(Clone, Debug, Deserialize)]
pub struct GraphData {
    pub center: EntityRecord,
    #[serde(default)]
    pub nodes: Vec<EntityRecord>,
    #[serde(default)]
    pub connections: Vec<ConnectionRecord>,
    #[serde(default, rename = "visualSettings")]
    pub visual_settings: Option<VisualSettings>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct EntityRecord {
    pub id: String,
    pub name: String,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub shape: Option<String>,
    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ConnectionRecord {
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub value: Option<Value>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
}

impl ConnectionRecord {
    /// Edge weight; anything missing, non-numeric or below 1 reads as 1.
    pub fn weight(&self) -> u32 {
        let parsed = match &self.value {
            Some(Value::Number(number)) => number
                .as_i64()
                .or_else(|| number.as_f64().map(|value| value.trunc() as i64)),
            Some(Value::String(text)) => leading_integer(text),
            _ => None,
        };

        match parsed {
            Some(value) if value >= 1 => u32::try_from(value).unwrap_or(u32::MAX),
            _ => 1,
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct VisualSettings {
    #[serde(default)]
    pub colors: HashMap<String, String>,
    #[serde(default, rename = "nodeSize")]
    pub node_size: HashMap<String, f32>,
}

pub fn parse_graph_data(raw: &str) -> Result<GraphData> {
    let data: GraphData = serde_json::from_str(raw).context("invalid graph JSON")?;

    if data.center.id.trim().is_empty() {
        return Err(anyhow!("graph data has a center entity without an id"));
    }

    Ok(data)
}

pub fn load_graph_file(path: &Path) -> Result<GraphData> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read graph data from {}", path.display()))?;
    parse_graph_data(&raw).with_context(|| format!("failed to parse {}", path.display()))
}
