use clap::Parser;
use std::fs::File;
use std::io::BufReader;
use stress_performance_check::cli::{init_tracing, EngineOptions};
use stress_performance_check::{evaluate, read_bulk, Error};
use tracing::error;

/// Score a CSV of completed assessments (header: id,q1,q2,...)
#[derive(Parser)]
struct Args {
    path: String,
    #[command(flatten)]
    engine: EngineOptions,
}

fn main() -> Result<(), Error> {
    init_tracing();
    let args = Args::parse();
    let catalog = args.engine.catalog()?;
    let table = args.engine.table()?;
    let reader = BufReader::new(File::open(&args.path)?);
    for row in read_bulk(reader, &catalog)? {
        match row {
            Ok(row) => match evaluate(&row.stress, &row.performance, &table) {
                Ok(result) if args.engine.json => {
                    println!("{}", serde_json::json!({ "id": row.id, "result": result }));
                }
                Ok(result) => {
                    println!(
                        "id = {}, stress = {} ({:.2}), performance = {} ({:.2}), recommendation = {}",
                        row.id,
                        result.stress_level,
                        result.stress_mean,
                        result.performance_level,
                        result.performance_mean,
                        result.recommendation
                    );
                }
                Err(e) => {
                    error!(id = %row.id, "{}", e);
                }
            },
            Err(e) => {
                error!("{}", e);
            }
        }
    }
    Ok(())
}
