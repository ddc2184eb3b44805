use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use once_cell::sync::Lazy;
use tracing::warn;

use crate::Level::{High, Low, Moderate, VeryHigh, VeryLow};
use crate::{Error, Level};

pub const FALLBACK_RECOMMENDATION: &str =
    "No specific recommendation found. Please review scores.";

/// (ストレス, パフォーマンス) ごとの推奨文
///
/// High/Very High ストレスの行には、パフォーマンスが
/// Low/Very Low でも "performance is good/excellent" となっている項目がある。
const LITERAL_ENTRIES: [(Level, Level, &str); 25] = [
    (VeryLow, VeryHigh, "Mental health is excellent and performance is excellent"),
    (VeryLow, High, "Mental health is excellent, but performance needs training"),
    (VeryLow, Moderate, "Mental health is excellent, but performance needs monitoring"),
    (VeryLow, Low, "Mental health is excellent, but performance needs monitoring"),
    (VeryLow, VeryLow, "Mental health is excellent, but performance needs monitoring"),
    (Low, VeryHigh, "Mental health is good and performance is excellent"),
    (Low, High, "Mental health is good, but performance needs training"),
    (Low, Moderate, "Mental health is good, but performance needs monitoring"),
    (Low, Low, "Mental health is good, but performance needs monitoring"),
    (Low, VeryLow, "Mental health is good, but performance needs monitoring"),
    (Moderate, VeryHigh, "Mental health needs monitoring, but performance is excellent"),
    (Moderate, High, "Mental health needs monitoring and performance needs training"),
    (Moderate, Moderate, "Mental health and performance need monitoring"),
    (Moderate, Low, "Mental health and performance need monitoring"),
    (Moderate, VeryLow, "Mental health and performance need monitoring"),
    (High, VeryHigh, "Mental health needs counseling, but performance is excellent"),
    (High, High, "Mental health needs counseling and performance needs training"),
    (High, Moderate, "Mental health needs counseling and performance needs monitoring"),
    (High, Low, "Mental health needs counseling, but performance is good"),
    (High, VeryLow, "Mental health needs counseling, but performance is excellent"),
    (VeryHigh, VeryHigh, "Mental health needs counseling, but performance is excellent"),
    (VeryHigh, High, "Mental health needs counseling and performance needs training"),
    (VeryHigh, Moderate, "Mental health needs counseling and performance needs monitoring"),
    (VeryHigh, Low, "Mental health needs counseling, but performance is good"),
    (VeryHigh, VeryLow, "Mental health needs counseling and performance is excellent"),
];

/// 低パフォーマンスを "good/excellent" と表示していた4項目の差し替え
const CORRECTIONS: [(Level, Level, &str); 4] = [
    (High, Low, "Mental health needs counseling and performance needs monitoring"),
    (High, VeryLow, "Mental health needs counseling and performance needs monitoring"),
    (VeryHigh, Low, "Mental health needs counseling and performance needs monitoring"),
    (VeryHigh, VeryLow, "Mental health needs counseling and performance needs monitoring"),
];

pub static LITERAL_TABLE: Lazy<RecommendationTable> =
    Lazy::new(|| RecommendationTable::from_entries(LITERAL_ENTRIES));

pub static CORRECTED_TABLE: Lazy<RecommendationTable> = Lazy::new(|| {
    RecommendationTable::from_entries(LITERAL_ENTRIES.into_iter().chain(CORRECTIONS))
});

/// 組み込みの推奨文表
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum TableVariant {
    /// 無修正の表
    #[default]
    Literal,
    /// 低パフォーマンス時の記述を修正した表
    Corrected,
}

impl TableVariant {
    pub fn table(self) -> &'static RecommendationTable {
        match self {
            TableVariant::Literal => &LITERAL_TABLE,
            TableVariant::Corrected => &CORRECTED_TABLE,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecommendationTable {
    entries: HashMap<(Level, Level), String>,
}

impl RecommendationTable {
    /// 後から現れた組み合わせが優先される
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (Level, Level, S)>,
        S: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(stress, performance, text)| ((stress, performance), text.into()))
                .collect(),
        }
    }

    /// `"<ストレス>_<パフォーマンス>"` をキーとする JSON オブジェクトから読み込む
    ///
    /// 25通りすべてを定義する必要はない。
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, Error> {
        let raw: BTreeMap<String, String> = serde_json::from_reader(reader)?;
        let mut entries = HashMap::with_capacity(raw.len());
        for (key, text) in raw {
            let (stress, performance) = key
                .split_once('_')
                .ok_or_else(|| Error::IllegalLevel(key.clone()))?;
            let stress = stress.parse::<Level>()?;
            let performance = performance.parse::<Level>()?;
            entries.insert((stress, performance), text);
        }
        Ok(Self { entries })
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        Self::from_reader(BufReader::new(File::open(path)?))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn lookup(&self, stress: Level, performance: Level) -> &str {
        match self.entries.get(&(stress, performance)) {
            Some(text) => text,
            None => {
                warn!(%stress, %performance, "no recommendation for level pair");
                FALLBACK_RECOMMENDATION
            }
        }
    }

    /// 未知の段階名も既定の推奨文に置き換え、エラーにはしない
    pub fn lookup_by_label(&self, stress: &str, performance: &str) -> &str {
        match (stress.parse::<Level>(), performance.parse::<Level>()) {
            (Ok(stress), Ok(performance)) => self.lookup(stress, performance),
            _ => {
                warn!(stress, performance, "unknown level label");
                FALLBACK_RECOMMENDATION
            }
        }
    }
}

pub fn lookup_recommendation(stress: Level, performance: Level) -> &'static str {
    LITERAL_TABLE.lookup(stress, performance)
}

pub fn lookup_recommendation_by_label(stress: &str, performance: &str) -> &'static str {
    LITERAL_TABLE.lookup_by_label(stress, performance)
}
