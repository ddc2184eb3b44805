use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub mod bulk;
pub mod catalog;
pub mod cli;
pub mod recommendation;
pub mod report;
pub mod session;

pub use bulk::{read_bulk, BulkRow};
pub use catalog::{Catalog, Question, Score, Section, QUESTIONS};
pub use recommendation::{
    lookup_recommendation, lookup_recommendation_by_label, RecommendationTable, TableVariant,
    FALLBACK_RECOMMENDATION,
};
pub use report::{render_json, render_text, Gauge, GaugeColor};
pub use session::{evaluate, Assessment, AssessmentResult, Phase};

/// 回答の下限と上限
pub const MIN_SCORE: u8 = 1;
pub const MAX_SCORE: u8 = 5;

/// 設問カテゴリ
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Stress,
    Performance,
}

impl Category {
    /// 回答する順番
    pub const ALL: [Category; 2] = [Category::Stress, Category::Performance];
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Stress => write!(f, "stress"),
            Category::Performance => write!(f, "performance"),
        }
    }
}

/// 平均点から求める5段階評価
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Level {
    #[serde(rename = "Very Low")]
    VeryLow,
    Low,
    Moderate,
    High,
    #[serde(rename = "Very High")]
    VeryHigh,
}

impl Level {
    pub const ALL: [Level; 5] = [
        Level::VeryLow,
        Level::Low,
        Level::Moderate,
        Level::High,
        Level::VeryHigh,
    ];

    /// 閾値表
    ///
    /// 平均点がこの値以下であれば該当する段階になる。Very High に上限はない。
    pub fn upper_bound(&self) -> f64 {
        match self {
            Level::VeryLow => 1.5,
            Level::Low => 2.5,
            Level::Moderate => 3.5,
            Level::High => 4.5,
            Level::VeryHigh => f64::INFINITY,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Level::VeryLow => "Very Low",
            Level::Low => "Low",
            Level::Moderate => "Moderate",
            Level::High => "High",
            Level::VeryHigh => "Very High",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Level {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Level::ALL
            .into_iter()
            .find(|level| level.label() == s.trim())
            .ok_or_else(|| Error::IllegalLevel(s.to_string()))
    }
}

/// ストレスは平均点が高いほど悪い
const STRESS_LEVELS: [Level; 5] = [
    Level::VeryLow,
    Level::Low,
    Level::Moderate,
    Level::High,
    Level::VeryHigh,
];

/// パフォーマンスは問題の少なさで評価するので、平均点が低いほど高評価になる
const PERFORMANCE_LEVELS: [Level; 5] = [
    Level::VeryHigh,
    Level::High,
    Level::Moderate,
    Level::Low,
    Level::VeryLow,
];

/// 閾値表を昇順に当てはめ、何番目の区間に入るかを返す
///
/// 範囲外の値もそのまま当てはめる。NaN はどの閾値にも該当せず最後の区間になる。
fn bucket(mean: f64) -> usize {
    Level::ALL
        .iter()
        .position(|level| mean <= level.upper_bound())
        .unwrap_or(Level::ALL.len() - 1)
}

pub fn classify_stress_level(mean: f64) -> Level {
    STRESS_LEVELS[bucket(mean)]
}

pub fn classify_performance_level(mean: f64) -> Level {
    PERFORMANCE_LEVELS[bucket(mean)]
}

/// カテゴリごとの回答
///
/// 期待する設問番号は作成時に決まり、それ以外の設問への回答は受け付けない。
#[derive(Debug, Clone, PartialEq)]
pub struct AnswerSet {
    category: Category,
    keys: Vec<String>,
    values: BTreeMap<String, u8>,
}

impl AnswerSet {
    pub fn new<I, K>(category: Category, keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        let mut unique = Vec::new();
        for key in keys.into_iter().map(Into::into) {
            if !unique.contains(&key) {
                unique.push(key);
            }
        }
        Self {
            category,
            keys: unique,
            values: BTreeMap::new(),
        }
    }

    /// 回答を格納する
    /// 1〜5の回答以外は認めない。同じ設問への再回答は上書きする。
    pub fn insert(&mut self, key: &str, score: u8) -> Result<(), Error> {
        if !self.keys.iter().any(|k| k == key) {
            return Err(Error::IllegalQuestion(key.to_string()));
        }
        if !(MIN_SCORE..=MAX_SCORE).contains(&score) {
            return Err(Error::IllegalAnswer(score.to_string()));
        }
        self.values.insert(key.to_string(), score);
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<u8> {
        self.values.get(key).copied()
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn expected_count(&self) -> usize {
        self.keys.len()
    }

    /// 設問が1つもない回答は完了扱いにしない
    pub fn is_complete(&self) -> bool {
        !self.keys.is_empty() && self.values.len() == self.keys.len()
    }

    /// 未回答の設問番号
    pub fn missing(&self) -> impl Iterator<Item = &str> {
        self.keys
            .iter()
            .filter(|key| !self.values.contains_key(key.as_str()))
            .map(String::as_str)
    }

    pub fn values(&self) -> impl Iterator<Item = u8> + '_ {
        self.values.values().copied()
    }

    pub fn ensure_complete(&self) -> Result<(), Error> {
        if self.is_complete() {
            Ok(())
        } else {
            Err(Error::IncompleteAnswerSet {
                category: self.category,
                answered: self.len(),
                expected: self.expected_count(),
            })
        }
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }
}

/// 平均点を算出する
///
/// 全設問に回答していなければ算出しない。
pub fn compute_mean(answers: &AnswerSet) -> Result<f64, Error> {
    answers.ensure_complete()?;
    let sum: u32 = answers.values().map(u32::from).sum();
    Ok(f64::from(sum) / answers.len() as f64)
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// 想定外の設問
    #[error("question {0:?} is not part of this assessment")]
    IllegalQuestion(String),
    /// 回答選択肢が違反
    #[error("answer {0:?} is not a number from 1 to 5")]
    IllegalAnswer(String),
    /// 回答欠落
    #[error("{category} assessment is incomplete: {answered} of {expected} questions answered")]
    IncompleteAnswerSet {
        category: Category,
        answered: usize,
        expected: usize,
    },
    #[error("unknown level {0:?}")]
    IllegalLevel(String),
    /// 現在の段階では行えない操作
    #[error("cannot {action} while {phase}")]
    WrongPhase { action: &'static str, phase: Phase },
    #[error("invalid question catalog: {0}")]
    InvalidCatalog(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod test {
    use super::*;

    fn stress_answers(scores: [u8; 5]) -> AnswerSet {
        let mut answers = AnswerSet::new(Category::Stress, ["q1", "q2", "q3", "q4", "q5"]);
        for (index, score) in scores.into_iter().enumerate() {
            answers.insert(&format!("q{}", index + 1), score).unwrap();
        }
        answers
    }

    #[test]
    fn test_stress_very_low_range() {
        for mean in [1.0, 1.2, 1.4999, 1.5] {
            assert_eq!(classify_stress_level(mean), Level::VeryLow);
        }
        assert_eq!(classify_stress_level(1.5001), Level::Low);
    }

    #[test]
    fn test_stress_thresholds() {
        assert_eq!(classify_stress_level(2.5), Level::Low);
        assert_eq!(classify_stress_level(2.6), Level::Moderate);
        assert_eq!(classify_stress_level(3.5), Level::Moderate);
        assert_eq!(classify_stress_level(4.5), Level::High);
        assert_eq!(classify_stress_level(4.51), Level::VeryHigh);
        assert_eq!(classify_stress_level(5.0), Level::VeryHigh);
    }

    #[test]
    fn test_out_of_range_is_not_clamped() {
        assert_eq!(classify_stress_level(0.0), Level::VeryLow);
        assert_eq!(classify_stress_level(-3.0), Level::VeryLow);
        assert_eq!(classify_stress_level(9.0), Level::VeryHigh);
        assert_eq!(classify_performance_level(9.0), Level::VeryLow);
        assert_eq!(classify_stress_level(f64::NAN), Level::VeryHigh);
    }

    #[test]
    fn test_performance_is_inverted() {
        assert_eq!(classify_stress_level(1.0), Level::VeryLow);
        assert_eq!(classify_performance_level(1.0), Level::VeryHigh);
        assert_eq!(classify_performance_level(2.0), Level::High);
        assert_eq!(classify_performance_level(3.0), Level::Moderate);
        assert_eq!(classify_performance_level(4.0), Level::Low);
        assert_eq!(classify_performance_level(5.0), Level::VeryLow);
    }

    #[test]
    fn test_level_labels() {
        assert_eq!(Level::VeryHigh.to_string(), "Very High");
        assert_eq!("Very Low".parse::<Level>().unwrap(), Level::VeryLow);
        assert_eq!(" Moderate ".parse::<Level>().unwrap(), Level::Moderate);
        assert!("Extreme".parse::<Level>().is_err());
        assert_eq!(
            serde_json::to_string(&Level::VeryLow).unwrap(),
            "\"Very Low\""
        );
    }

    #[test]
    fn test_compute_mean() {
        assert_eq!(compute_mean(&stress_answers([1, 2, 3, 4, 5])).unwrap(), 3.0);
        assert_eq!(compute_mean(&stress_answers([1, 1, 1, 1, 2])).unwrap(), 1.2);
    }

    #[test]
    fn test_compute_mean_incomplete() {
        let mut answers = AnswerSet::new(Category::Stress, ["q1", "q2", "q3", "q4", "q5"]);
        for key in ["q1", "q2", "q3", "q4"] {
            answers.insert(key, 3).unwrap();
        }
        assert_eq!(answers.missing().collect::<Vec<_>>(), vec!["q5"]);
        match compute_mean(&answers) {
            Err(Error::IncompleteAnswerSet {
                category,
                answered,
                expected,
            }) => {
                assert_eq!(category, Category::Stress);
                assert_eq!(answered, 4);
                assert_eq!(expected, 5);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_insert() {
        let mut answers = AnswerSet::new(Category::Performance, ["q6", "q7"]);
        assert!(answers.insert("q1", 1).is_err());
        assert!(answers.insert("q6", 0).is_err());
        assert!(answers.insert("q6", 6).is_err());
        assert!(answers.insert("q6", 5).is_ok());
        assert!(answers.insert("q6", 2).is_ok());
        assert_eq!(answers.get("q6"), Some(2));
        assert_eq!(answers.len(), 1);
        assert!(!answers.is_complete());
        assert!(answers.insert("q7", 4).is_ok());
        assert!(answers.is_complete());
        answers.clear();
        assert!(answers.is_empty());
    }

    #[test]
    fn test_empty_answer_set_has_no_mean() {
        let answers = AnswerSet::new(Category::Stress, Vec::<String>::new());
        assert_eq!(answers.expected_count(), 0);
        assert!(!answers.is_complete());
        assert!(matches!(
            compute_mean(&answers),
            Err(Error::IncompleteAnswerSet {
                answered: 0,
                expected: 0,
                ..
            })
        ));
    }

    #[test]
    fn test_duplicate_keys_are_merged() {
        let mut answers = AnswerSet::new(Category::Stress, ["q1", "q1", "q2"]);
        assert_eq!(answers.expected_count(), 2);
        answers.insert("q1", 3).unwrap();
        answers.insert("q2", 5).unwrap();
        assert!(answers.is_complete());
        assert_eq!(compute_mean(&answers).unwrap(), 4.0);
    }
}
