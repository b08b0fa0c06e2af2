use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, SentimentError};

/// Declarative description of a voting ensemble.
///
/// Loaded from JSON; `classifiers` keeps the declared order, which is also
/// the tie-break order of the vote.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct EnsembleConfig {
    /// Train sub-classifiers concurrently on the rayon pool.
    pub parallel_training: bool,
    pub classifiers: Vec<ClassifierSpec>,
}

impl Default for EnsembleConfig {
    fn default() -> Self {
        Self {
            parallel_training: true,
            classifiers: vec![
                ClassifierSpec::new("multinomial_nb", ModelType::MultinomialNb(Default::default())),
                ClassifierSpec::new("gaussian_nb", ModelType::GaussianNb(Default::default())),
                ClassifierSpec::new("svm", ModelType::Svm(Default::default())),
                ClassifierSpec::new("decision_tree", ModelType::DecisionTree(Default::default())),
                ClassifierSpec::new("gbdt", ModelType::Gbdt(Default::default())),
            ],
        }
    }
}

impl EnsembleConfig {
    pub fn new(classifiers: Vec<ClassifierSpec>) -> Self {
        Self {
            parallel_training: true,
            classifiers,
        }
    }

    /// Load and validate a configuration from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            SentimentError::config(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_json_str(&content)
            .map_err(|e| SentimentError::config(format!("{}: {}", path.display(), e)))
    }

    /// Parse and validate a configuration from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: EnsembleConfig =
            serde_json::from_str(json).map_err(|e| SentimentError::config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| SentimentError::config(e.to_string()))
    }

    /// Check name uniqueness and weights.
    pub fn validate(&self) -> Result<()> {
        let mut names = HashSet::new();
        for spec in &self.classifiers {
            spec.validate()?;
            if !names.insert(spec.name.as_str()) {
                return Err(SentimentError::config(format!(
                    "duplicate classifier name '{}'",
                    spec.name
                )));
            }
        }
        Ok(())
    }

    /// Keep only the classifiers whose name is in `names`, in declared order.
    pub fn retain_named(&mut self, names: &[String]) {
        self.classifiers.retain(|c| names.iter().any(|n| n == &c.name));
    }
}

/// One sub-classifier entry: a unique name, a voting weight and a typed
/// model description.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(try_from = "RawClassifierSpec", into = "RawClassifierSpec")]
pub struct ClassifierSpec {
    pub name: String,
    pub weight: f64,
    pub model: ModelType,
}

impl ClassifierSpec {
    pub fn new<S: Into<String>>(name: S, model: ModelType) -> Self {
        Self {
            name: name.into(),
            weight: 1.0,
            model,
        }
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(SentimentError::config("classifier name must not be empty"));
        }
        if !self.weight.is_finite() || self.weight <= 0.0 {
            return Err(SentimentError::config(format!(
                "classifier '{}' has invalid weight {}; weights must be positive",
                self.name, self.weight
            )));
        }
        self.model
            .validate()
            .map_err(|msg| SentimentError::config(format!("classifier '{}': {}", self.name, msg)))
    }
}

/// On-disk shape of a classifier entry; `params` stays untyped only until
/// it is converted by [`ModelType::from_parts`].
#[derive(Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
struct RawClassifierSpec {
    name: String,
    kind: String,
    #[serde(default = "default_weight")]
    weight: f64,
    #[serde(default)]
    params: Value,
}

fn default_weight() -> f64 {
    1.0
}

impl TryFrom<RawClassifierSpec> for ClassifierSpec {
    type Error = SentimentError;

    fn try_from(raw: RawClassifierSpec) -> Result<Self> {
        let model = ModelType::from_parts(&raw.kind, raw.params).map_err(|e| match e {
            SentimentError::Config(msg) => {
                SentimentError::config(format!("classifier '{}': {}", raw.name, msg))
            }
            other => other,
        })?;
        Ok(Self {
            name: raw.name,
            weight: raw.weight,
            model,
        })
    }
}

impl From<ClassifierSpec> for RawClassifierSpec {
    fn from(spec: ClassifierSpec) -> Self {
        Self {
            kind: spec.model.kind().to_string(),
            params: spec.model.params_json(),
            name: spec.name,
            weight: spec.weight,
        }
    }
}

/// Supported learning algorithms and their hyper-parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelType {
    MultinomialNb(MultinomialNbParams),
    GaussianNb(GaussianNbParams),
    Svm(SvmParams),
    DecisionTree(DecisionTreeParams),
    Gbdt(GbdtParams),
    NearestMatch,
}

impl Default for ModelType {
    fn default() -> Self {
        ModelType::MultinomialNb(MultinomialNbParams::default())
    }
}

impl ModelType {
    pub const KINDS: [&'static str; 6] = [
        "multinomial_nb",
        "gaussian_nb",
        "svm",
        "decision_tree",
        "gbdt",
        "nearest_match",
    ];

    /// Configuration name of the algorithm.
    pub fn kind(&self) -> &'static str {
        match self {
            ModelType::MultinomialNb(_) => "multinomial_nb",
            ModelType::GaussianNb(_) => "gaussian_nb",
            ModelType::Svm(_) => "svm",
            ModelType::DecisionTree(_) => "decision_tree",
            ModelType::Gbdt(_) => "gbdt",
            ModelType::NearestMatch => "nearest_match",
        }
    }

    /// Build a typed model description from a kind and its JSON parameters.
    /// `null` parameters select the defaults of that kind.
    pub fn from_parts(kind: &str, params: Value) -> Result<Self> {
        fn typed<T>(params: Value) -> Result<T>
        where
            T: Default + serde::de::DeserializeOwned,
        {
            if params.is_null() {
                return Ok(T::default());
            }
            serde_json::from_value(params)
                .map_err(|e| SentimentError::config(format!("invalid params: {}", e)))
        }

        let model = match kind.to_lowercase().as_str() {
            "multinomial_nb" => ModelType::MultinomialNb(typed(params)?),
            "gaussian_nb" => ModelType::GaussianNb(typed(params)?),
            "svm" => ModelType::Svm(typed(params)?),
            "decision_tree" => ModelType::DecisionTree(typed(params)?),
            "gbdt" => ModelType::Gbdt(typed(params)?),
            "nearest_match" => {
                let empty = params.is_null()
                    || params.as_object().map(|o| o.is_empty()).unwrap_or(false);
                if !empty {
                    return Err(SentimentError::config(
                        "nearest_match takes no params",
                    ));
                }
                ModelType::NearestMatch
            }
            _ => {
                return Err(SentimentError::config(format!(
                    "unknown algorithm kind '{}'; expected one of: {}",
                    kind,
                    Self::KINDS.join(", ")
                )))
            }
        };
        Ok(model)
    }

    fn params_json(&self) -> Value {
        match self {
            ModelType::MultinomialNb(p) => serde_json::to_value(p),
            ModelType::GaussianNb(p) => serde_json::to_value(p),
            ModelType::Svm(p) => serde_json::to_value(p),
            ModelType::DecisionTree(p) => serde_json::to_value(p),
            ModelType::Gbdt(p) => serde_json::to_value(p),
            ModelType::NearestMatch => Ok(Value::Null),
        }
        .unwrap_or_else(|e| {
            log::warn!("Could not serialize {} parameters: {}", self.kind(), e);
            Value::Null
        })
    }

    /// Range checks the deserializer cannot express.
    fn validate(&self) -> std::result::Result<(), String> {
        match self {
            ModelType::MultinomialNb(p) if !(p.alpha > 0.0) => {
                Err(format!("alpha must be positive, got {}", p.alpha))
            }
            ModelType::GaussianNb(p) if !(p.var_smoothing >= 0.0) => Err(format!(
                "var_smoothing must not be negative, got {}",
                p.var_smoothing
            )),
            ModelType::Svm(p) if !(p.eps > 0.0) => {
                Err(format!("eps must be positive, got {}", p.eps))
            }
            ModelType::Svm(p) if !(p.c.0 > 0.0 && p.c.1 > 0.0) => {
                Err(format!("c weights must be positive, got {:?}", p.c))
            }
            ModelType::DecisionTree(p) if p.max_depth == Some(0) => {
                Err("max_depth must be at least 1".to_string())
            }
            ModelType::Gbdt(p) if p.num_boost_round == 0 || p.max_depth == 0 => {
                Err("num_boost_round and max_depth must be at least 1".to_string())
            }
            ModelType::Gbdt(p) if !(p.learning_rate > 0.0) => {
                Err(format!("learning_rate must be positive, got {}", p.learning_rate))
            }
            _ => Ok(()),
        }
    }
}

impl fmt::Display for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind())
    }
}

impl FromStr for ModelType {
    type Err = String;

    /// Parse a kind name into a model with default parameters.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        ModelType::from_parts(s, Value::Null).map_err(|e| match e {
            SentimentError::Config(msg) => msg,
            other => other.to_string(),
        })
    }
}

/// Multinomial naive Bayes.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct MultinomialNbParams {
    /// Additive (Laplace) smoothing.
    pub alpha: f64,
}

impl Default for MultinomialNbParams {
    fn default() -> Self {
        Self { alpha: 1.0 }
    }
}

/// Gaussian naive Bayes.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct GaussianNbParams {
    pub var_smoothing: f64,
}

impl Default for GaussianNbParams {
    fn default() -> Self {
        Self { var_smoothing: 1e-9 }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq)]
#[serde(rename_all = "lowercase", tag = "type")]
pub enum SvmKernel {
    Linear,
    Gauss { eps: f64 },
    Poly { constant: f64, degree: f64 },
}

/// Support vector machine with Platt-scaled outputs, one model per label.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SvmParams {
    pub eps: f64,
    /// Positive / negative class weights.
    pub c: (f64, f64),
    pub kernel: SvmKernel,
}

impl Default for SvmParams {
    fn default() -> Self {
        Self {
            eps: 0.1,
            c: (1.0, 1.0),
            kernel: SvmKernel::Linear,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SplitCriterion {
    Gini,
    Entropy,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct DecisionTreeParams {
    pub split_quality: SplitCriterion,
    pub max_depth: Option<usize>,
    pub min_weight_split: f32,
    pub min_weight_leaf: f32,
}

impl Default for DecisionTreeParams {
    fn default() -> Self {
        Self {
            split_quality: SplitCriterion::Gini,
            max_depth: None,
            min_weight_split: 2.0,
            min_weight_leaf: 1.0,
        }
    }
}

/// Gradient boosted decision trees, one binary model per label.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct GbdtParams {
    pub learning_rate: f32,
    pub max_depth: u32,
    pub num_boost_round: u32,
    pub debug: bool,
    pub training_optimization_level: u8,
}

impl Default for GbdtParams {
    fn default() -> Self {
        Self {
            learning_rate: 0.1,
            max_depth: 6,
            num_boost_round: 50,
            debug: false,
            training_optimization_level: 2,
        }
    }
}
