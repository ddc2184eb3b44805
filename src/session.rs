use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::recommendation::RecommendationTable;
use crate::{
    classify_performance_level, classify_stress_level, compute_mean, AnswerSet, Catalog,
    Category, Error, Gauge, Level,
};

/// 診断結果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssessmentResult {
    pub stress_mean: f64,
    pub stress_level: Level,
    pub performance_mean: f64,
    pub performance_level: Level,
    pub recommendation: String,
    pub stress_gauge: Gauge,
    pub performance_gauge: Gauge,
}

/// 平均点の算出、段階の判定、推奨文の取得をまとめて行う
pub fn evaluate(
    stress: &AnswerSet,
    performance: &AnswerSet,
    table: &RecommendationTable,
) -> Result<AssessmentResult, Error> {
    let stress_mean = compute_mean(stress)?;
    let performance_mean = compute_mean(performance)?;
    let stress_level = classify_stress_level(stress_mean);
    let performance_level = classify_performance_level(performance_mean);
    let recommendation = table.lookup(stress_level, performance_level).to_string();
    debug!(
        stress_mean,
        %stress_level,
        performance_mean,
        %performance_level,
        "evaluated assessment"
    );
    Ok(AssessmentResult {
        stress_mean,
        stress_level,
        performance_mean,
        performance_level,
        recommendation,
        stress_gauge: Gauge::for_mean(stress_mean),
        performance_gauge: Gauge::for_mean(performance_mean),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    CollectingStress,
    CollectingPerformance,
    ShowingResults,
}

impl Phase {
    /// この段階で回答を受け付けるカテゴリ
    pub fn category(&self) -> Option<Category> {
        match self {
            Phase::CollectingStress => Some(Category::Stress),
            Phase::CollectingPerformance => Some(Category::Performance),
            Phase::ShowingResults => None,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::CollectingStress => write!(f, "collecting stress answers"),
            Phase::CollectingPerformance => write!(f, "collecting performance answers"),
            Phase::ShowingResults => write!(f, "showing results"),
        }
    }
}

/// 1回分の診断
///
/// ストレス設問、パフォーマンス設問、結果表示の順に進む。`reset` でいつでも最初に戻る。
#[derive(Debug, Clone)]
pub struct Assessment<'a> {
    catalog: &'a Catalog,
    table: &'a RecommendationTable,
    phase: Phase,
    stress: AnswerSet,
    performance: AnswerSet,
    result: Option<AssessmentResult>,
}

impl<'a> Assessment<'a> {
    pub fn new(catalog: &'a Catalog, table: &'a RecommendationTable) -> Self {
        Self {
            catalog,
            table,
            phase: Phase::CollectingStress,
            stress: catalog.empty_answer_set(Category::Stress),
            performance: catalog.empty_answer_set(Category::Performance),
            result: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn stress_answers(&self) -> &AnswerSet {
        &self.stress
    }

    pub fn performance_answers(&self) -> &AnswerSet {
        &self.performance
    }

    pub fn result(&self) -> Option<&AssessmentResult> {
        self.result.as_ref()
    }

    /// 現在の段階のカテゴリに回答を格納する
    pub fn answer(&mut self, key: &str, score: u8) -> Result<(), Error> {
        match self.phase {
            Phase::CollectingStress => self.stress.insert(key, score),
            Phase::CollectingPerformance => self.performance.insert(key, score),
            Phase::ShowingResults => Err(Error::WrongPhase {
                action: "answer",
                phase: self.phase,
            }),
        }
    }

    pub fn continue_to_performance(&mut self) -> Result<(), Error> {
        if self.phase != Phase::CollectingStress {
            return Err(Error::WrongPhase {
                action: "continue to performance",
                phase: self.phase,
            });
        }
        self.stress.ensure_complete()?;
        debug!(answers = self.stress.len(), "stress assessment complete");
        self.phase = Phase::CollectingPerformance;
        Ok(())
    }

    pub fn calculate_results(&mut self) -> Result<&AssessmentResult, Error> {
        if self.phase != Phase::CollectingPerformance {
            return Err(Error::WrongPhase {
                action: "calculate results",
                phase: self.phase,
            });
        }
        self.performance.ensure_complete()?;
        let result = evaluate(&self.stress, &self.performance, self.table)?;
        self.phase = Phase::ShowingResults;
        Ok(&*self.result.insert(result))
    }

    /// 回答を破棄して最初からやり直す
    pub fn reset(&mut self) {
        debug!(phase = %self.phase, "assessment reset");
        self.stress = self.catalog.empty_answer_set(Category::Stress);
        self.performance = self.catalog.empty_answer_set(Category::Performance);
        self.result = None;
        self.phase = Phase::CollectingStress;
    }
}
