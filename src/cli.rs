use std::borrow::Cow;
use std::path::PathBuf;

use clap::Args;
use tracing_subscriber::EnvFilter;

use crate::{Catalog, Error, RecommendationTable, TableVariant, QUESTIONS};

/// 各コマンド共通のオプション
#[derive(Debug, Clone, Args)]
pub struct EngineOptions {
    /// Question catalog (JSON) to use instead of the built-in one
    #[arg(long)]
    pub questions: Option<PathBuf>,
    /// Built-in recommendation table
    #[arg(long, value_enum, default_value_t = TableVariant::Literal)]
    pub table: TableVariant,
    /// Recommendation table (JSON) keyed by "<stress level>_<performance level>"; overrides --table
    #[arg(long)]
    pub recommendations: Option<PathBuf>,
    /// Print results as JSON
    #[arg(long)]
    pub json: bool,
}

impl EngineOptions {
    pub fn catalog(&self) -> Result<Cow<'static, Catalog>, Error> {
        match self.questions {
            Some(ref path) => Ok(Cow::Owned(Catalog::open(path)?)),
            None => Ok(Cow::Borrowed(&*QUESTIONS)),
        }
    }

    pub fn table(&self) -> Result<Cow<'static, RecommendationTable>, Error> {
        match self.recommendations {
            Some(ref path) => Ok(Cow::Owned(RecommendationTable::open(path)?)),
            None => Ok(Cow::Borrowed(self.table.table())),
        }
    }
}

/// `RUST_LOG` が未設定なら warn 以上を標準エラーに出す
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[cfg(test)]
mod test {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestArgs {
        #[command(flatten)]
        engine: EngineOptions,
    }

    #[test]
    fn test_defaults() {
        let args = TestArgs::parse_from(["test"]);
        assert_eq!(args.engine.table, TableVariant::Literal);
        assert!(!args.engine.json);
        assert!(matches!(args.engine.catalog().unwrap(), Cow::Borrowed(_)));
        assert_eq!(args.engine.table().unwrap().len(), 25);
    }

    #[test]
    fn test_corrected_table_option() {
        let args = TestArgs::parse_from(["test", "--table", "corrected", "--json"]);
        assert_eq!(args.engine.table, TableVariant::Corrected);
        assert!(args.engine.json);
    }

    #[test]
    fn test_missing_files() {
        let args = TestArgs::parse_from([
            "test",
            "--questions",
            "/nonexistent/questions.json",
            "--recommendations",
            "/nonexistent/table.json",
        ]);
        assert!(matches!(args.engine.catalog(), Err(Error::Io(_))));
        assert!(matches!(args.engine.table(), Err(Error::Io(_))));
    }
}
