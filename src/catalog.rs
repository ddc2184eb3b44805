use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use once_cell::sync::Lazy;
use serde::Deserialize;

use crate::{AnswerSet, Category, Error, MAX_SCORE, MIN_SCORE};

/// 組み込みの設問マスタ
pub static QUESTIONS: Lazy<Catalog> = Lazy::new(|| {
    Catalog::from_json(include_str!("../resources/questions.json"))
        .expect("embedded question catalog is valid")
});

/// 回答選択肢
#[derive(Debug, Clone, Deserialize)]
pub struct Score {
    pub score: u8,
    pub text: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Question {
    pub id: String,
    pub text: String,
    pub scores: Vec<Score>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Section {
    pub category: Category,
    /// 教示文
    pub theme: String,
    pub questions: Vec<Question>,
}

/// ストレス・パフォーマンス設問のマスタ表現
#[derive(Debug, Clone, Deserialize)]
pub struct Catalog {
    pub sections: Vec<Section>,
}

impl Catalog {
    pub fn from_json(json: &str) -> Result<Self, Error> {
        let catalog: Catalog = serde_json::from_str(json)?;
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, Error> {
        let catalog: Catalog = serde_json::from_reader(reader)?;
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        Self::from_reader(BufReader::new(File::open(path)?))
    }

    fn validate(&self) -> Result<(), Error> {
        for category in Category::ALL {
            if self.expected_count(category) == 0 {
                return Err(Error::InvalidCatalog(format!(
                    "no {} questions defined",
                    category
                )));
            }
        }
        let mut seen = HashSet::new();
        for question in self.sections.iter().flat_map(|section| &section.questions) {
            if !seen.insert(question.id.as_str()) {
                return Err(Error::InvalidCatalog(format!(
                    "duplicate question id {:?}",
                    question.id
                )));
            }
            if let Some(score) = question
                .scores
                .iter()
                .find(|score| !(MIN_SCORE..=MAX_SCORE).contains(&score.score))
            {
                return Err(Error::InvalidCatalog(format!(
                    "question {:?} offers choice {} outside 1-5",
                    question.id, score.score
                )));
            }
        }
        Ok(())
    }

    pub fn sections(&self, category: Category) -> impl Iterator<Item = &Section> {
        self.sections
            .iter()
            .filter(move |section| section.category == category)
    }

    pub fn questions(&self, category: Category) -> impl Iterator<Item = &Question> {
        self.sections(category)
            .flat_map(|section| section.questions.iter())
    }

    /// 設問番号を指定して設問を取得する
    pub fn question(&self, id: &str) -> Option<&Question> {
        self.sections
            .iter()
            .flat_map(|section| section.questions.iter())
            .find(|question| question.id == id)
    }

    pub fn category_of(&self, id: &str) -> Option<Category> {
        self.sections
            .iter()
            .find(|section| section.questions.iter().any(|question| question.id == id))
            .map(|section| section.category)
    }

    pub fn expected_count(&self, category: Category) -> usize {
        self.questions(category).count()
    }

    /// カテゴリの設問で空の回答を作る
    pub fn empty_answer_set(&self, category: Category) -> AnswerSet {
        AnswerSet::new(
            category,
            self.questions(category).map(|question| question.id.clone()),
        )
    }
}
