use chrono::NaiveDate;
use lottoscope::application::PredictionService;
use lottoscope::application::strategies::{FrequencyStrategy, OverdueStrategy, StrategyRegistry};
use lottoscope::domain::lottery::{Draw, LotteryConfig, is_valid_selection};
use lottoscope::domain::repositories::{DrawRepository, StrategyWeightRepository};
use lottoscope::infrastructure::csv_import::{parse_draws, retain_valid};
use lottoscope::infrastructure::persistence::{
    Database, SqliteDrawRepository, SqliteStrategyWeightRepository,
};
use lottoscope::infrastructure::simulation::SyntheticDrawGenerator;
use std::sync::Arc;

async fn sqlite_repos() -> (Arc<SqliteDrawRepository>, Arc<SqliteStrategyWeightRepository>) {
    let db = Database::in_memory().await.unwrap();
    (
        Arc::new(SqliteDrawRepository::new(db.clone())),
        Arc::new(SqliteStrategyWeightRepository::new(db)),
    )
}

#[tokio::test]
async fn test_csv_import_into_sqlite() {
    let (draws, _) = sqlite_repos().await;
    let csv = "\
concurso,date,numbers
1,1996-03-11,04-05-30-33-41-52
2,1996-03-18,09-37-39-41-43-49
3,1996-03-25,10-11-29-30-36-47
4,1996-04-01,01-05-04-3-2-61
";
    let config = LotteryConfig::mega_sena();
    let imported = retain_valid(parse_draws(csv.as_bytes()).unwrap(), &config);
    assert_eq!(imported.len(), 3);

    for draw in &imported {
        draws.save("megasena", draw).await.unwrap();
    }
    // Re-import replaces rather than duplicates
    for draw in &imported {
        draws.save("megasena", draw).await.unwrap();
    }

    assert_eq!(draws.count("megasena").await.unwrap(), 3);
    assert_eq!(draws.count("quina").await.unwrap(), 0);

    let recent = draws.find_recent("megasena", 2).await.unwrap();
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[0].concurso, 3);
    assert_eq!(recent[0].date, NaiveDate::from_ymd_opt(1996, 3, 25).unwrap());
    assert_eq!(recent[1].numbers(), &[9, 37, 39, 41, 43, 49]);
}

#[tokio::test]
async fn test_service_over_sqlite_learns_weights() {
    let (draws, weights) = sqlite_repos().await;
    for draw in SyntheticDrawGenerator::new(6, 1, 60).with_seed(17).generate(90) {
        draws.save("megasena", &draw).await.unwrap();
    }
    let registry = StrategyRegistry::builder()
        .register(Arc::new(FrequencyStrategy::default()))
        .register(Arc::new(OverdueStrategy::default()))
        .build();
    let service = PredictionService::new(draws.clone(), weights.clone(), registry)
        .with_seed(Some(12));
    let config = LotteryConfig::mega_sena();

    let before = service.predict(&config).await.unwrap();
    assert!(is_valid_selection(&before, &config));

    let actual = Draw::new(
        91,
        NaiveDate::from_ymd_opt(2031, 5, 2).unwrap(),
        vec![3, 14, 15, 26, 35, 58],
    );
    let updated = service.record_draw(&config, actual).await.unwrap();
    assert_eq!(updated.len(), 2);

    let stored = weights.find_all("megasena").await.unwrap();
    assert_eq!(stored.len(), 2);
    assert!(stored.iter().all(|w| w.samples == 1));
    assert!(stored.iter().all(|w| (0.1..=3.0).contains(&w.weight)));
    assert_eq!(draws.count("megasena").await.unwrap(), 91);

    let result = service.predict_with_consensus(&config).await.unwrap();
    assert_eq!(result.participants, 2);
    for contribution in &result.top_contributors {
        let persisted = stored
            .iter()
            .find(|w| w.strategy == contribution.strategy)
            .unwrap();
        assert_eq!(contribution.weight, persisted.weight);
    }
}
