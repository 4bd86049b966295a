use crate::domain::model::{Evaluation, FieldBreakdown, FilterConfig, NutritionRecord, Operator};

/// `=` 的容許誤差（克），來源資料常有四捨五入
pub const EQUALITY_TOLERANCE: f64 = 0.1;

pub fn compare(actual: f64, op: &Operator, threshold: f64) -> bool {
    match op {
        Operator::Less => actual < threshold,
        Operator::LessOrEqual => actual <= threshold,
        Operator::Equal => (actual - threshold).abs() < EQUALITY_TOLERANCE,
        Operator::GreaterOrEqual => actual >= threshold,
        Operator::Greater => actual > threshold,
        Operator::Any(_) => true,
    }
}

/// 純函式：相同輸入永遠得到相同結果
pub fn evaluate(record: &NutritionRecord, config: &FilterConfig) -> Evaluation {
    let protein = compare(record.protein, &config.protein.op, config.protein.threshold);
    let fat = compare(record.fat, &config.fat.op, config.fat.threshold);
    let carbs = compare(record.carbs, &config.carbs.op, config.carbs.threshold);
    // 熱量未知 (0) 時不限制
    let calories = !record.has_calories()
        || compare(record.calories, &config.calories.op, config.calories.threshold);
    let protein_dominant = record.is_protein_dominant();

    let matched = protein
        && fat
        && carbs
        && calories
        && (!config.protein_dominant_only || protein_dominant);

    Evaluation {
        matched,
        breakdown: FieldBreakdown {
            protein,
            fat,
            carbs,
            calories,
            protein_dominant,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::FieldFilter;

    fn permissive_config() -> FilterConfig {
        FilterConfig {
            protein: FieldFilter::new(">=", 0.0),
            fat: FieldFilter::new(">=", 0.0),
            carbs: FieldFilter::new(">=", 0.0),
            calories: FieldFilter::new(">=", 0.0),
            protein_dominant_only: false,
        }
    }

    #[test]
    fn test_compare_operators() {
        assert!(compare(5.0, &Operator::Less, 6.0));
        assert!(!compare(6.0, &Operator::Less, 6.0));
        assert!(compare(6.0, &Operator::LessOrEqual, 6.0));
        assert!(compare(6.0, &Operator::GreaterOrEqual, 6.0));
        assert!(!compare(6.0, &Operator::Greater, 6.0));
        assert!(compare(6.1, &Operator::Greater, 6.0));
    }

    #[test]
    fn test_compare_equality_tolerance() {
        assert!(compare(10.05, &Operator::Equal, 10.0));
        assert!(compare(9.95, &Operator::Equal, 10.0));
        assert!(!compare(10.2, &Operator::Equal, 10.0));
    }

    #[test]
    fn test_unknown_operator_always_matches() {
        let op = Operator::from("!=");
        assert!(compare(0.0, &op, 100.0));
        assert!(compare(1000.0, &op, 0.0));
    }

    #[test]
    fn test_default_config_matches_lean_high_protein() {
        let record = NutritionRecord::new(10.3, 2.0, 3.6, 73.0);
        let evaluation = evaluate(&record, &FilterConfig::default());

        assert!(evaluation.matched);
        assert!(evaluation.breakdown.protein_dominant);
    }

    #[test]
    fn test_zero_calories_ignores_calorie_filter() {
        let record = NutritionRecord::new(12.0, 1.0, 1.0, 0.0);
        let mut config = permissive_config();
        config.calories = FieldFilter::new("=", 500.0);

        let evaluation = evaluate(&record, &config);
        assert!(evaluation.matched);
        assert!(evaluation.breakdown.calories);

        let with_calories = NutritionRecord::new(12.0, 1.0, 1.0, 60.0);
        let evaluation = evaluate(&with_calories, &config);
        assert!(!evaluation.matched);
        assert!(!evaluation.breakdown.calories);
    }

    #[test]
    fn test_protein_dominance_gate() {
        let mut config = permissive_config();
        config.protein_dominant_only = true;

        let dominant = NutritionRecord::new(12.0, 8.0, 5.0, 150.0);
        assert!(evaluate(&dominant, &config).matched);

        let fatty = NutritionRecord::new(5.0, 8.0, 5.0, 150.0);
        let evaluation = evaluate(&fatty, &config);
        assert!(!evaluation.matched);
        assert!(evaluation.breakdown.protein);
        assert!(evaluation.breakdown.fat);
        assert!(evaluation.breakdown.carbs);
        assert!(evaluation.breakdown.calories);
        assert!(!evaluation.breakdown.protein_dominant);
    }

    #[test]
    fn test_protein_dominance_reported_without_gate() {
        let fatty = NutritionRecord::new(5.0, 8.0, 5.0, 150.0);
        let evaluation = evaluate(&fatty, &permissive_config());

        assert!(evaluation.matched);
        assert!(!evaluation.breakdown.protein_dominant);
    }

    #[test]
    fn test_evaluate_is_idempotent() {
        let record = NutritionRecord::new(7.0, 7.0, 30.0, 250.0);
        let config = FilterConfig::default();

        assert_eq!(evaluate(&record, &config), evaluate(&record, &config));
    }
}
