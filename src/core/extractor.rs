//! 從商品頁面 HTML 擷取營養成分。
//!
//! 兩階段：先掃描包含「Харчова цінність」標題與蛋白質欄位的區塊（由小到大），
//! 若蛋白質、脂肪、碳水仍有缺漏，再依文件順序掃描所有節點。

use crate::domain::model::NutritionRecord;
use crate::utils::error::Result;
use regex::Regex;
use scraper::{ElementRef, Html};

pub const NUTRITION_HEADER: &str = "Харчова цінність";
pub const PROTEIN_LABEL: &str = "Білки";
pub const FAT_LABEL: &str = "Жири";
pub const CARBS_LABEL: &str = "Вуглеводи";
pub const GRAM_UNIT: &str = "(г)";

/// kJ ≈ 4.184 × kcal，所以較大的數字落在 (1, 10) 倍之間時視為 kJ
pub const KJ_RATIO_MIN: f64 = 1.0;
pub const KJ_RATIO_MAX: f64 = 10.0;

const NUMBER: &str = r"([0-9]+[.,]?[0-9]*)";
const CALORIE_PAIR: &str = r"([0-9]+(?:[.,][0-9]+)?)\s*/\s*([0-9]+(?:[.,][0-9]+)?)?";

/// 判斷「a / b」哪一個是 kcal
///
/// 兩個比例都不成立時回傳 `None`，不做猜測。
pub fn resolve_calories(first: f64, second: Option<f64>) -> Option<f64> {
    match second {
        None => Some(first),
        Some(second) if second > first * KJ_RATIO_MIN && second < first * KJ_RATIO_MAX => {
            Some(first)
        }
        Some(second) if first > second * KJ_RATIO_MIN && first < second * KJ_RATIO_MAX => {
            Some(second)
        }
        Some(_) => None,
    }
}

/// 小數點可能是逗號
fn parse_number(raw: &str) -> Option<f64> {
    raw.replacen(',', ".", 1).trim_end_matches('.').parse().ok()
}

/// 帶有文件順序的文字節點
#[derive(Debug, Clone, PartialEq)]
pub struct TextNode {
    pub position: usize,
    pub text: String,
}

/// 依文件順序列出每個元素及其完整文字內容
pub fn text_nodes(document: &Html) -> Vec<TextNode> {
    document
        .root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .enumerate()
        .map(|(position, element)| TextNode {
            position,
            text: element.text().collect(),
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Protein,
    Fat,
    Carbs,
}

#[derive(Debug, Default, Clone, Copy)]
struct PartialRecord {
    protein: Option<f64>,
    fat: Option<f64>,
    carbs: Option<f64>,
    calories: Option<f64>,
}

impl PartialRecord {
    fn has_required(&self) -> bool {
        self.protein.is_some() && self.fat.is_some() && self.carbs.is_some()
    }

    fn is_complete(&self) -> bool {
        self.has_required() && self.calories.is_some()
    }

    fn into_record(self) -> Option<NutritionRecord> {
        Some(NutritionRecord {
            protein: self.protein?,
            fat: self.fat?,
            carbs: self.carbs?,
            calories: self.calories.unwrap_or(0.0),
        })
    }
}

pub struct NutritionExtractor {
    protein: Regex,
    fat: Regex,
    carbs: Regex,
    calories: Regex,
    header: String,
}

impl NutritionExtractor {
    pub fn new() -> Result<Self> {
        Ok(Self {
            protein: Self::field_pattern(PROTEIN_LABEL)?,
            fat: Self::field_pattern(FAT_LABEL)?,
            carbs: Self::field_pattern(CARBS_LABEL)?,
            calories: Regex::new(CALORIE_PAIR)?,
            header: NUTRITION_HEADER.to_lowercase(),
        })
    }

    /// 標籤、克單位，接著第一個數字
    fn field_pattern(label: &str) -> Result<Regex> {
        let pattern = format!(
            r"(?i){}[^0-9]*?{}[^0-9]*{}",
            regex::escape(label),
            regex::escape(GRAM_UNIT),
            NUMBER
        );
        Ok(Regex::new(&pattern)?)
    }

    pub fn extract(&self, markup: &str) -> Option<NutritionRecord> {
        let document = Html::parse_document(markup);
        let nodes = text_nodes(&document);
        self.extract_from_nodes(&nodes)
    }

    pub fn extract_from_nodes(&self, nodes: &[TextNode]) -> Option<NutritionRecord> {
        let mut partial = PartialRecord::default();

        let sections = self.candidate_sections(nodes);
        tracing::trace!("Found {} candidate nutrition sections", sections.len());
        for section in sections {
            self.fill(&mut partial, &section.text);
            if partial.is_complete() {
                break;
            }
        }

        if !partial.has_required() {
            tracing::trace!("Nutrition section incomplete, scanning whole document");
            for node in nodes {
                self.fill(&mut partial, &node.text);
                if partial.is_complete() {
                    break;
                }
            }
        }

        partial.into_record()
    }

    /// 同時包含標題（不分大小寫）與蛋白質標籤的節點，最短的在前
    fn candidate_sections<'a>(&self, nodes: &'a [TextNode]) -> Vec<&'a TextNode> {
        let mut sections: Vec<&TextNode> = nodes
            .iter()
            .filter(|node| {
                node.text.contains(PROTEIN_LABEL) && node.text.to_lowercase().contains(&self.header)
            })
            .collect();
        sections.sort_by_key(|node| node.text.chars().count());
        sections
    }

    fn fill(&self, partial: &mut PartialRecord, text: &str) {
        if partial.calories.is_none() {
            partial.calories = self.calories_value(text);
        }
        if partial.protein.is_none() {
            partial.protein = self.field_value(Field::Protein, text);
        }
        if partial.fat.is_none() {
            partial.fat = self.field_value(Field::Fat, text);
        }
        if partial.carbs.is_none() {
            partial.carbs = self.field_value(Field::Carbs, text);
        }
    }

    pub fn field_value(&self, field: Field, text: &str) -> Option<f64> {
        let pattern = match field {
            Field::Protein => &self.protein,
            Field::Fat => &self.fat,
            Field::Carbs => &self.carbs,
        };
        let captures = pattern.captures(text)?;
        parse_number(captures.get(1)?.as_str())
    }

    pub fn calories_value(&self, text: &str) -> Option<f64> {
        let captures = self.calories.captures(text)?;
        let first = parse_number(captures.get(1)?.as_str())?;
        let second = match captures.get(2) {
            Some(m) => Some(parse_number(m.as_str())?),
            None => None,
        };
        resolve_calories(first, second)
    }
}
