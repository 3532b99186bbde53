use std::path::Path;
use std::sync::Arc;

use image::DynamicImage;
use ndarray::Array4;
use tract_onnx::prelude::*;

use crate::error::{AppError, Result};
use crate::labels;
use crate::models::{ModelKind, ModelSpec, Prediction};
use crate::preprocess;

pub trait Classifier: Send + Sync {
    fn infer(&self, input: Array4<f32>) -> Result<Vec<f32>>;
}

type OnnxPlan = TypedRunnableModel<TypedModel>;

pub struct OnnxClassifier {
    plan: OnnxPlan,
    input_shape: (usize, usize, usize, usize),
}

impl OnnxClassifier {
    pub fn load(path: &Path, spec: &ModelSpec) -> Result<Self> {
        let path_str = path.display().to_string();
        let input_shape = (1, spec.height as usize, spec.width as usize, 3);

        let plan = tract_onnx::onnx()
            .model_for_path(path)
            .map_err(|e| AppError::model_load(&path_str, e))?
            .with_input_fact(
                0,
                InferenceFact::dt_shape(
                    f32::datum_type(),
                    tvec!(input_shape.0, input_shape.1, input_shape.2, input_shape.3),
                ),
            )
            .map_err(|e| AppError::model_load(&path_str, e))?
            .into_optimized()
            .map_err(|e| AppError::model_load(&path_str, e))?
            .into_runnable()
            .map_err(|e| AppError::model_load(&path_str, e))?;

        tracing::info!("loaded {} model from {}", spec.kind.display_name(), path_str);
        Ok(Self { plan, input_shape })
    }
}

impl Classifier for OnnxClassifier {
    fn infer(&self, input: Array4<f32>) -> Result<Vec<f32>> {
        let data = input.into_raw_vec();
        let tensor = tract_ndarray::Array4::from_shape_vec(self.input_shape, data)
            .map_err(AppError::inference)?
            .into_tensor();

        let outputs = self
            .plan
            .run(tvec!(tensor.into()))
            .map_err(AppError::inference)?;
        let output = outputs
            .first()
            .ok_or_else(|| AppError::inference("model produced no outputs"))?;
        let scores = output
            .to_array_view::<f32>()
            .map_err(AppError::inference)?;
        Ok(scores.iter().copied().collect())
    }
}

/// Index and value of the highest score. Ties go to the lowest index and NaN
/// never wins.
pub fn argmax(scores: &[f32]) -> Option<(usize, f32)> {
    scores
        .iter()
        .copied()
        .enumerate()
        .filter(|(_, s)| !s.is_nan())
        .fold(None, |best, (i, s)| match best {
            Some((_, b)) if s <= b => best,
            _ => Some((i, s)),
        })
}

#[derive(Clone)]
pub struct Predictor {
    spec: ModelSpec,
    classifier: Arc<dyn Classifier>,
}

impl Predictor {
    pub fn new(kind: ModelKind, classifier: Arc<dyn Classifier>) -> Self {
        Self {
            spec: kind.spec(),
            classifier,
        }
    }

    pub fn load(kind: ModelKind, path: &Path) -> Result<Self> {
        let spec = kind.spec();
        let classifier = OnnxClassifier::load(path, &spec)?;
        Ok(Self::new(kind, Arc::new(classifier)))
    }

    pub fn predict(&self, img: &DynamicImage) -> Result<Prediction> {
        let input = preprocess::to_input_tensor(img, &self.spec);
        let scores = self.classifier.infer(input)?;
        tracing::debug!("{} scores: {:?}", self.spec.kind.display_name(), scores);

        let (class_index, confidence) =
            argmax(&scores).ok_or_else(|| AppError::inference("model returned no scores"))?;
        let label = labels::label(self.spec.labels, class_index).ok_or(AppError::UnknownClass {
            index: class_index,
            classes: self.spec.labels.len(),
        })?;

        Ok(Prediction {
            class_index,
            label,
            confidence,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedScores(Vec<f32>);

    impl Classifier for FixedScores {
        fn infer(&self, input: Array4<f32>) -> Result<Vec<f32>> {
            assert_eq!(input.shape(), &[1, 150, 150, 3]);
            Ok(self.0.clone())
        }
    }

    fn predictor(kind: ModelKind, scores: Vec<f32>) -> Predictor {
        Predictor::new(kind, Arc::new(FixedScores(scores)))
    }

    #[test]
    fn argmax_picks_highest() {
        assert_eq!(argmax(&[0.1, 0.7, 0.2]), Some((1, 0.7)));
    }

    #[test]
    fn argmax_prefers_first_on_tie() {
        assert_eq!(argmax(&[0.4, 0.4, 0.2]), Some((0, 0.4)));
    }

    #[test]
    fn argmax_skips_nan_and_handles_empty() {
        assert_eq!(argmax(&[f32::NAN, 0.3, 0.1]), Some((1, 0.3)));
        assert_eq!(argmax(&[f32::NAN]), None);
        assert_eq!(argmax(&[]), None);
    }

    #[test]
    fn predicts_ct_label() {
        let img = DynamicImage::new_rgb8(64, 64);
        let p = predictor(ModelKind::CtScan, vec![0.05, 0.15, 0.8])
            .predict(&img)
            .unwrap();
        assert_eq!(p.class_index, 2);
        assert_eq!(p.label, "Squamous Cell Carcinoma");
    }

    #[test]
    fn predicts_histopathology_none_class() {
        let img = DynamicImage::new_rgb8(64, 64);
        let p = predictor(ModelKind::Histopathology, vec![0.1, 0.1, 0.1, 0.7])
            .predict(&img)
            .unwrap();
        assert_eq!(p.label, "none");
    }

    #[test]
    fn out_of_table_index_is_an_error() {
        let img = DynamicImage::new_rgb8(16, 16);
        let err = predictor(ModelKind::CtScan, vec![0.0, 0.0, 0.0, 1.0])
            .predict(&img)
            .unwrap_err();
        assert!(matches!(err, AppError::UnknownClass { index: 3, classes: 3 }));
    }

    #[test]
    fn missing_model_file_fails_to_load() {
        let err = Predictor::load(ModelKind::CtScan, Path::new("does/not/exist.onnx"))
            .err()
            .unwrap();
        assert!(matches!(err, AppError::ModelLoad { .. }));
    }
}
