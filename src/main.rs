use std::io::{stdin, ErrorKind};

use clap::Parser;
use stress_performance_check::cli::{init_tracing, EngineOptions};
use stress_performance_check::{render_json, render_text, Assessment, Error, Phase};

/// Stress and performance self-assessment
#[derive(Parser)]
#[command(version)]
struct Args {
    #[command(flatten)]
    engine: EngineOptions,
}

fn main() -> Result<(), Error> {
    init_tracing();
    let args = Args::parse();
    let catalog = args.engine.catalog()?;
    let table = args.engine.table()?;
    let mut assessment = Assessment::new(&catalog, &table);
    let mut buffer = String::new();

    while let Some(category) = assessment.phase().category() {
        for section in catalog.sections(category) {
            println!("{}", section.theme);
            for question in &section.questions {
                println!("{}", question.text);
                for score in &question.scores {
                    print!("  {} => {}", score.score, score.text);
                }
                loop {
                    println!();
                    buffer.clear();
                    if stdin().read_line(&mut buffer)? == 0 {
                        return Err(Error::Io(ErrorKind::UnexpectedEof.into()));
                    }
                    match store_answer(buffer.trim(), &question.id, &mut assessment) {
                        Ok(()) => break,
                        Err(e) => println!("{} Please answer with a number from 1 to 5.", e),
                    }
                }
                println!();
            }
        }
        match assessment.phase() {
            Phase::CollectingStress => assessment.continue_to_performance()?,
            Phase::CollectingPerformance => {
                let result = assessment.calculate_results()?;
                if args.engine.json {
                    println!("{}", render_json(result)?);
                } else {
                    print!("{}", render_text(result));
                }
            }
            Phase::ShowingResults => {}
        }
    }

    Ok(())
}

fn store_answer(value: &str, id: &str, assessment: &mut Assessment) -> Result<(), Error> {
    let value = value
        .parse::<u8>()
        .map_err(|_| Error::IllegalAnswer(value.to_string()))?;
    assessment.answer(id, value)?;
    Ok(())
}
