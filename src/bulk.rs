use std::io::Read;

use csv::{StringRecord, StringRecordsIntoIter};

use crate::{AnswerSet, Catalog, Category, Error};

/// CSVの1行分の回答
#[derive(Debug, Clone)]
pub struct BulkRow {
    pub id: String,
    pub stress: AnswerSet,
    pub performance: AnswerSet,
}

/// 一括回答CSVを読み込む
///
/// 1列目は回答者ID、2列目以降は見出しを設問番号とする。
///
/// ```text
/// id,q1,q2,q3,q4,q5,q6,q7,q8,q9,q10
/// 001,3,3,3,3,3,2,2,1,2,2
/// ```
///
/// 空欄は未回答として扱う。
pub fn read_bulk<R: Read>(reader: R, catalog: &Catalog) -> Result<BulkReader<'_, R>, Error> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = reader.headers()?.clone();
    for key in headers.iter().skip(1) {
        if catalog.category_of(key).is_none() {
            return Err(Error::IllegalQuestion(key.to_string()));
        }
    }
    Ok(BulkReader {
        catalog,
        headers,
        records: reader.into_records(),
    })
}

pub struct BulkReader<'a, R> {
    catalog: &'a Catalog,
    headers: StringRecord,
    records: StringRecordsIntoIter<R>,
}

impl<R: Read> BulkReader<'_, R> {
    fn parse(&self, record: StringRecord) -> Result<BulkRow, Error> {
        let mut stress = self.catalog.empty_answer_set(Category::Stress);
        let mut performance = self.catalog.empty_answer_set(Category::Performance);
        let id = record.get(0).unwrap_or_default().to_string();
        for (key, value) in self.headers.iter().zip(record.iter()).skip(1) {
            if value.is_empty() {
                continue;
            }
            let score = value
                .parse::<u8>()
                .map_err(|_| Error::IllegalAnswer(value.to_string()))?;
            match self.catalog.category_of(key) {
                Some(Category::Stress) => stress.insert(key, score)?,
                Some(Category::Performance) => performance.insert(key, score)?,
                None => return Err(Error::IllegalQuestion(key.to_string())),
            }
        }
        Ok(BulkRow {
            id,
            stress,
            performance,
        })
    }
}

impl<R: Read> Iterator for BulkReader<'_, R> {
    type Item = Result<BulkRow, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        let record = self.records.next()?;
        Some(record.map_err(Error::from).and_then(|record| self.parse(record)))
    }
}
