use serde::{Deserialize, Serialize};
use std::fmt;

/// 單一商品的營養成分（每 100 g）
///
/// `calories == 0.0` 表示熱量無法判定，篩選時視為不限制。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NutritionRecord {
    pub protein: f64,
    pub fat: f64,
    pub carbs: f64,
    pub calories: f64,
}

impl NutritionRecord {
    pub fn new(protein: f64, fat: f64, carbs: f64, calories: f64) -> Self {
        Self {
            protein,
            fat,
            carbs,
            calories,
        }
    }

    pub fn has_calories(&self) -> bool {
        self.calories > 0.0
    }

    pub fn is_protein_dominant(&self) -> bool {
        self.protein > self.fat
    }
}

/// 快取項目：營養資料 + 寫入時間（epoch 毫秒）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    #[serde(flatten)]
    pub record: NutritionRecord,
    #[serde(rename = "writtenAt", alias = "timestamp")]
    pub written_at: i64,
}

/// 比較運算子
///
/// 無法辨識的字串會變成 `Any`，對該欄位永遠成立。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Operator {
    Less,
    LessOrEqual,
    Equal,
    GreaterOrEqual,
    Greater,
    Any(String),
}

impl Operator {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Less => "<",
            Self::LessOrEqual => "<=",
            Self::Equal => "=",
            Self::GreaterOrEqual => ">=",
            Self::Greater => ">",
            Self::Any(raw) => raw,
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, Self::Any(_))
    }
}

impl From<&str> for Operator {
    fn from(raw: &str) -> Self {
        match raw.trim() {
            "<" => Self::Less,
            "<=" => Self::LessOrEqual,
            "=" => Self::Equal,
            ">=" => Self::GreaterOrEqual,
            ">" => Self::Greater,
            other => Self::Any(other.to_string()),
        }
    }
}

impl From<String> for Operator {
    fn from(raw: String) -> Self {
        Self::from(raw.as_str())
    }
}

impl From<Operator> for String {
    fn from(op: Operator) -> Self {
        op.as_str().to_string()
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldFilter {
    pub op: Operator,
    pub threshold: f64,
}

impl FieldFilter {
    pub fn new(op: impl Into<Operator>, threshold: f64) -> Self {
        Self {
            op: op.into(),
            threshold,
        }
    }
}

/// 篩選條件，每次執行時由外部提供
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    pub protein: FieldFilter,
    pub fat: FieldFilter,
    pub carbs: FieldFilter,
    pub calories: FieldFilter,
    pub protein_dominant_only: bool,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            protein: FieldFilter::new(">=", 10.0),
            fat: FieldFilter::new("<=", 10.0),
            carbs: FieldFilter::new("<=", 20.0),
            calories: FieldFilter::new("<=", 200.0),
            protein_dominant_only: false,
        }
    }
}

/// 各欄位的比對結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldBreakdown {
    pub protein: bool,
    pub fat: bool,
    pub carbs: bool,
    pub calories: bool,
    pub protein_dominant: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Evaluation {
    pub matched: bool,
    pub breakdown: FieldBreakdown,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EvaluationOutcome {
    Matched {
        record: NutritionRecord,
        breakdown: FieldBreakdown,
    },
    NotMatched {
        record: NutritionRecord,
        breakdown: FieldBreakdown,
    },
    Unavailable,
}

impl EvaluationOutcome {
    pub fn from_evaluation(record: NutritionRecord, evaluation: Evaluation) -> Self {
        if evaluation.matched {
            Self::Matched {
                record,
                breakdown: evaluation.breakdown,
            }
        } else {
            Self::NotMatched {
                record,
                breakdown: evaluation.breakdown,
            }
        }
    }

    pub fn record(&self) -> Option<&NutritionRecord> {
        match self {
            Self::Matched { record, .. } | Self::NotMatched { record, .. } => Some(record),
            Self::Unavailable => None,
        }
    }

    pub fn breakdown(&self) -> Option<&FieldBreakdown> {
        match self {
            Self::Matched { breakdown, .. } | Self::NotMatched { breakdown, .. } => Some(breakdown),
            Self::Unavailable => None,
        }
    }

    pub fn is_matched(&self) -> bool {
        matches!(self, Self::Matched { .. })
    }
}

/// 批次執行的累計結果
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchResult {
    pub processed: usize,
    pub matched: usize,
    pub unmatched: usize,
    pub unavailable: usize,
    pub cancelled: bool,
}

impl BatchResult {
    pub fn record(&mut self, outcome: &EvaluationOutcome) {
        self.processed += 1;
        match outcome {
            EvaluationOutcome::Matched { .. } => self.matched += 1,
            EvaluationOutcome::NotMatched { .. } => self.unmatched += 1,
            EvaluationOutcome::Unavailable => self.unavailable += 1,
        }
    }
}
