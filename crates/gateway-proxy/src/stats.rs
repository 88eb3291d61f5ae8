//! Typed payloads for the upstream stats endpoints
//!
//! The search engine reports index statistics as plain JSON numbers, but
//! device figures come back as display strings with unit suffixes
//! ("1.7 GiB", "0.0 %"). `MetricValue` accepts both and exposes the
//! leading numeric prefix.

use serde::Deserialize;

/// Response of `GET /indexes`
#[derive(Debug, Deserialize)]
pub struct IndexListResponse {
    #[serde(default)]
    pub results: Vec<IndexEntry>,
}

#[derive(Debug, Deserialize)]
pub struct IndexEntry {
    #[serde(rename = "indexName")]
    pub index_name: String,
}

/// Response of `GET /indexes/{name}/stats`
#[derive(Debug, Clone, Deserialize)]
pub struct IndexStats {
    #[serde(rename = "numberOfDocuments")]
    pub number_of_documents: u64,
    #[serde(rename = "numberOfVectors")]
    pub number_of_vectors: u64,
}

/// Response of `GET /models`
#[derive(Debug, Deserialize)]
pub struct ModelListResponse {
    #[serde(default)]
    pub models: Vec<ModelInfo>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelInfo {
    #[serde(default)]
    pub model_name: String,
    #[serde(default)]
    pub model_device: String,
}

impl ModelInfo {
    /// Whether this model is loaded on an accelerator device.
    pub fn on_cuda(&self) -> bool {
        self.model_device == "cuda"
    }
}

/// Response of `GET /device/cuda`
#[derive(Debug, Deserialize)]
pub struct CudaInfoResponse {
    #[serde(default)]
    pub cuda_devices: Vec<CudaDevice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CudaDevice {
    pub device_id: i64,
    #[serde(default)]
    pub device_name: String,
    #[serde(default)]
    pub memory_used: MetricValue,
    #[serde(default)]
    pub total_memory: MetricValue,
    #[serde(default)]
    pub utilization: MetricValue,
}

/// A numeric reading reported either as a bare number or as a string
/// carrying a unit suffix.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    Number(f64),
    Text(String),
}

impl Default for MetricValue {
    fn default() -> Self {
        MetricValue::Text(String::new())
    }
}

impl MetricValue {
    /// Extract the numeric value, parsing the leading float out of
    /// strings like "15.0 GiB". Returns `None` when nothing numeric
    /// is present.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            MetricValue::Number(n) => Some(*n),
            MetricValue::Text(s) => parse_leading_float(s),
        }
    }
}

fn parse_leading_float(input: &str) -> Option<f64> {
    let trimmed = input.trim_start();
    let mut end = 0;
    for (idx, ch) in trimmed.char_indices() {
        let numeric = ch.is_ascii_digit() || ch == '.' || (idx == 0 && (ch == '-' || ch == '+'));
        if !numeric {
            break;
        }
        end = idx + ch.len_utf8();
    }
    trimmed[..end].parse().ok()
}
