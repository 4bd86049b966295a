use crate::domain::model::{BatchResult, EvaluationOutcome};
use serde::{Deserialize, Serialize};

/// 熱量不超過此值時加上 🔥
pub const LOW_CALORIE_THRESHOLD: f64 = 100.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayOptions {
    pub hide_without_nutrition: bool,
    pub hide_non_matching: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Green,
    Red,
    Yellow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Presentation {
    pub tone: Tone,
    pub hidden: bool,
}

pub fn present(
    outcome: &EvaluationOutcome,
    options: &DisplayOptions,
    protein_dominant_only: bool,
) -> Presentation {
    match outcome {
        EvaluationOutcome::Unavailable => Presentation {
            tone: Tone::Yellow,
            hidden: options.hide_without_nutrition,
        },
        EvaluationOutcome::Matched { .. } => Presentation {
            tone: Tone::Green,
            hidden: false,
        },
        EvaluationOutcome::NotMatched { breakdown, .. } => {
            let hide_by_dominance = protein_dominant_only && !breakdown.protein_dominant;
            Presentation {
                tone: Tone::Red,
                hidden: options.hide_non_matching || hide_by_dominance,
            }
        }
    }
}

/// 商品卡片下方的徽章文字
pub fn badge_text(outcome: &EvaluationOutcome) -> String {
    let Some(record) = outcome.record() else {
        return "⚠️ Немає даних про БЖВ".to_string();
    };

    let mut parts = vec![
        format!("Б: {}г", record.protein),
        format!("Ж: {}г", record.fat),
        format!("В: {}г", record.carbs),
    ];

    if record.has_calories() {
        let marker = match (outcome.is_matched(), record.calories <= LOW_CALORIE_THRESHOLD) {
            (true, true) => "🔥 ",
            (true, false) => "👍 ",
            (false, _) => "",
        };
        parts.push(format!("{}{} ккал", marker, record.calories));
    }

    if record.is_protein_dominant() {
        parts.push("💪".to_string());
    }

    parts.join(" ")
}

/// 批次結束時的狀態列
///
/// 「не підходить」只算不符合的商品；沒有資料的商品只有在被隱藏時才計入。
pub fn status_line(result: &BatchResult, hidden: usize, options: &DisplayOptions) -> String {
    let hidden_unavailable = if options.hide_without_nutrition {
        result.unavailable
    } else {
        0
    };
    let not_matching = result.unmatched + hidden_unavailable;
    if result.cancelled {
        format!(
            "⛔ Зупинено. Перевірено: {}, підходить: {}, приховано: {}",
            result.processed, result.matched, hidden
        )
    } else if options.hide_non_matching {
        format!("✅ Готово! Показано: {}, приховано: {}", result.matched, hidden)
    } else {
        format!(
            "✅ Готово! Підходить: {}, не підходить: {}",
            result.matched, not_matching
        )
    }
}
