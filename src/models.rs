use serde::{Deserialize, Serialize};

use crate::labels::{CT_SCAN_LABELS, HISTOPATHOLOGY_LABELS};

pub const INPUT_SIZE: u32 = 150;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelKind {
    CtScan,
    Histopathology,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelOrder {
    Rgb,
    Bgr,
}

// neither variant anti-aliases when downscaling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resize {
    /// 2x2 neighbourhood at `(dst + 0.5) * scale - 0.5`, edges clamped
    Linear,
    /// Source pixel at `floor((dst + 0.5) * scale)`
    Nearest,
}

#[derive(Debug, Clone, Copy)]
pub struct ModelSpec {
    pub kind: ModelKind,
    pub width: u32,
    pub height: u32,
    pub channel_order: ChannelOrder,
    pub resize: Resize,
    pub labels: &'static [&'static str],
}

impl ModelKind {
    pub fn spec(self) -> ModelSpec {
        match self {
            // trained on OpenCV-decoded images
            ModelKind::CtScan => ModelSpec {
                kind: self,
                width: INPUT_SIZE,
                height: INPUT_SIZE,
                channel_order: ChannelOrder::Bgr,
                resize: Resize::Linear,
                labels: &CT_SCAN_LABELS,
            },
            ModelKind::Histopathology => ModelSpec {
                kind: self,
                width: INPUT_SIZE,
                height: INPUT_SIZE,
                channel_order: ChannelOrder::Rgb,
                resize: Resize::Nearest,
                labels: &HISTOPATHOLOGY_LABELS,
            },
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            ModelKind::CtScan => "CT scan",
            ModelKind::Histopathology => "histopathology",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub class_index: usize,
    pub label: &'static str,
    pub confidence: f32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub result: String,
    pub class_index: usize,
    pub confidence: f32,
}

impl From<Prediction> for PredictionResponse {
    fn from(p: Prediction) -> Self {
        Self {
            result: p.label.to_string(),
            class_index: p.class_index,
            confidence: p.confidence,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}
