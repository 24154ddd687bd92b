use std::fs;
use std::path::Path;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use titanic_pipeline::data::loader::read_passengers;
use titanic_pipeline::data::model::RawDataset;
use titanic_pipeline::feature::{
    CacheFormat, DatasetAssembler, Feature, FeatureCache, FeatureGenerator, FeatureRegistry,
};
use titanic_pipeline::model::{to_matrix, LogisticParams, LogisticRegression, Runner};
use titanic_pipeline::Error;

const TRAIN: &str = "\
PassengerId,Survived,Pclass,Name,Sex,Age,SibSp,Parch,Ticket,Fare,Cabin,Embarked
1,0,3,\"Braund, Mr. Owen Harris\",male,22,1,0,A/5 21171,7.25,,S
2,1,1,\"Cumings, Mrs. John Bradley (Florence Briggs Thayer)\",female,38,1,0,PC 17599,71.2833,C85,C
3,1,3,\"Heikkinen, Miss. Laina\",female,26,0,0,STON/O2. 3101282,7.925,,S
4,1,1,\"Futrelle, Mrs. Jacques Heath (Lily May Peel)\",female,35,1,0,113803,53.1,C123,S
5,0,3,\"Allen, Mr. William Henry\",male,35,0,0,373450,8.05,,S
6,0,3,\"Moran, Mr. James\",male,,0,0,330877,8.4583,,Q
7,0,1,\"McCarthy, Mr. Timothy J\",male,54,0,0,17463,51.8625,E46,S
8,0,3,\"Palsson, Master. Gosta Leonard\",male,2,3,1,349909,21.075,,S
9,1,3,\"Johnson, Mrs. Oscar W (Elisabeth Vilhelmina Berg)\",female,27,0,2,347742,11.1333,,S
10,1,2,\"Nasser, Mrs. Nicholas (Adele Achem)\",female,14,1,0,237736,30.0708,,C
11,1,3,\"Sandstrom, Miss. Marguerite Rut\",female,4,1,1,PP 9549,16.7,G6,S
12,1,1,\"Bonnell, Miss. Elizabeth\",female,58,0,0,113783,26.55,C103,S
13,0,3,\"Saundercock, Mr. William Henry\",male,20,0,0,A/5. 2151,8.05,,S
14,0,3,\"Andersson, Mr. Anders Johan\",male,39,1,5,347082,31.275,,S
15,0,3,\"Vestrom, Miss. Hulda Amanda Adolfina\",female,14,0,0,350406,7.8542,,S
16,1,2,\"Hewlett, Mrs. (Mary D Kingcome) \",female,55,0,0,248706,16,,S
17,0,3,\"Rice, Master. Eugene\",male,2,4,1,382652,29.125,,Q
18,1,2,\"Williams, Mr. Charles Eugene\",male,,0,0,244373,13,,S
19,0,3,\"Vander Planke, Mrs. Julius (Emelia Maria Vandemoortele)\",female,31,1,0,345763,18,,S
20,1,3,\"Masselmani, Mrs. Fatima\",female,,0,0,2649,7.225,,C
";

const TEST: &str = "\
PassengerId,Pclass,Name,Sex,Age,SibSp,Parch,Ticket,Fare,Cabin,Embarked
892,3,\"Kelly, Mr. James\",male,34.5,0,0,330911,7.8292,,Q
893,3,\"Wilkes, Mrs. James (Ellen Needs)\",female,47,1,0,363272,7,,S
894,2,\"Myles, Mr. Thomas Francis\",male,62,0,0,240276,9.6875,,Q
895,3,\"Wirz, Mr. Albert\",male,27,0,0,315154,8.6625,,S
896,3,\"Hirvonen, Mrs. Alexander (Helga E Lindqvist)\",female,22,1,1,3101298,12.2875,,S
897,3,\"Svensson, Mr. Johan Cervin\",male,14,0,0,7538,9.225,,S
898,3,\"Connolly, Miss. Kate\",female,30,0,0,330972,7.6292,,Q
899,2,\"Caldwell, Mr. Albert Francis\",male,26,1,1,248738,29,,S
900,3,\"Abrahim, Mrs. Joseph (Sophie Halaut Easu)\",female,18,0,0,2657,7.2292,,C
901,3,\"Davies, Mr. John Samuel\",male,21,2,0,A/4 48871,24.15,,S
1044,3,\"Storey, Mr. Thomas\",male,60.5,0,0,3701,,,S
";

fn raw() -> RawDataset {
    RawDataset::new(
        read_passengers(csv::Reader::from_reader(TRAIN.as_bytes())).unwrap(),
        read_passengers(csv::Reader::from_reader(TEST.as_bytes())).unwrap(),
    )
}

fn snapshot(dir: &Path) -> Vec<(String, Vec<u8>)> {
    let mut files: Vec<(String, Vec<u8>)> = fs::read_dir(dir)
        .unwrap()
        .map(|e| {
            let path = e.unwrap().path();
            let name = path.file_name().unwrap().to_string_lossy().into_owned();
            (name, fs::read(&path).unwrap())
        })
        .collect();
    files.sort();
    files
}

#[test]
fn second_generation_is_all_cache_hits() {
    let dir = tempfile::tempdir().unwrap();
    let raw = raw();
    let registry = FeatureRegistry::titanic();
    let cache = FeatureCache::new(dir.path(), CacheFormat::Feather);

    let first = FeatureGenerator::new(&registry, &cache, &raw, Some(1))
        .generate_all(false)
        .unwrap();
    assert_eq!(first.computed.len(), 7);
    assert!(first.skipped.is_empty());
    let before = snapshot(dir.path());
    assert_eq!(before.len(), 14);

    let second = FeatureGenerator::new(&registry, &cache, &raw, Some(2))
        .generate_all(false)
        .unwrap();
    assert!(second.computed.is_empty());
    assert_eq!(second.skipped, first.computed);
    assert_eq!(snapshot(dir.path()), before);
}

#[test]
fn overwrite_always_recomputes() {
    let dir = tempfile::tempdir().unwrap();
    let raw = raw();
    let registry = FeatureRegistry::titanic();
    let cache = FeatureCache::new(dir.path(), CacheFormat::Parquet);

    // a stale record under the same name is replaced, not trusted
    let stale = titanic_pipeline::feature::FeaturePair::from_int_columns("Sex", vec![9], vec![9]).unwrap();
    cache.save("sex", &stale).unwrap();

    let report = FeatureGenerator::new(&registry, &cache, &raw, Some(1))
        .generate(&["Sex", "Pclass"], true)
        .unwrap();
    assert_eq!(report.computed, vec!["sex", "pclass"]);

    let sex = cache.load("sex").unwrap();
    assert_eq!(sex.train.num_rows(), 20);
    assert_eq!(sex.test.num_rows(), 11);
}

#[test]
fn unknown_feature_name_fails_before_any_work() {
    let dir = tempfile::tempdir().unwrap();
    let raw = raw();
    let registry = FeatureRegistry::titanic();
    let cache = FeatureCache::new(dir.path(), CacheFormat::Feather);

    let err = FeatureGenerator::new(&registry, &cache, &raw, Some(1))
        .generate(&["cabin"], false)
        .unwrap_err();
    assert!(matches!(err, Error::UnknownFeature(name) if name == "cabin"));
}

#[test]
fn assembled_tables_match_raw_row_counts() {
    let dir = tempfile::tempdir().unwrap();
    let raw = raw();
    let registry = FeatureRegistry::titanic();
    let cache = FeatureCache::new(dir.path(), CacheFormat::Feather);
    FeatureGenerator::new(&registry, &cache, &raw, Some(5))
        .generate_all(false)
        .unwrap();

    let names = ["title", "sex", "familysize", "pclass"];
    let assembled = DatasetAssembler::new(&cache).assemble(&names).unwrap();
    assert_eq!(assembled.column_names(), vec!["Title", "Sex", "FamilySize", "Pclass"]);
    assert_eq!(assembled.train.num_rows(), raw.train.len());
    assert_eq!(assembled.test.num_rows(), raw.test.len());

    let x = to_matrix(&assembled.train).unwrap();
    // Braund, Mr. Owen Harris: Mr, male, SibSp 1 + Parch 0 + 1, third class
    assert_eq!(x.row(0).to_vec(), vec![1.0, 0.0, 2.0, 3.0]);
    // Palsson, Master.
    assert_eq!(x[[7, 0]], 4.0);
}

#[test]
fn assembled_features_train_and_predict() {
    let dir = tempfile::tempdir().unwrap();
    let raw = raw();
    let registry = FeatureRegistry::titanic();
    let cache = FeatureCache::new(dir.path(), CacheFormat::Feather);
    FeatureGenerator::new(&registry, &cache, &raw, Some(5))
        .generate(&["pclass", "sex", "familysize", "embarked", "title"], false)
        .unwrap();

    let features = DatasetAssembler::new(&cache)
        .assemble(&["pclass", "sex", "familysize", "embarked", "title"])
        .unwrap();
    let label = raw.labels().unwrap();

    let model = LogisticRegression::new(LogisticParams::default());
    let mut runner = Runner::new("integration", model, 3, 42);
    assert!(matches!(
        runner.predict(&to_matrix(&features.test).unwrap()),
        Err(Error::NotFitted)
    ));

    let report = runner.run_cv(&to_matrix(&features.train).unwrap(), &label).unwrap();
    assert_eq!(report.fold_scores.len(), 3);
    assert!((0.0..=1.0).contains(&report.mean));

    let pred = runner.predict(&to_matrix(&features.test).unwrap()).unwrap();
    assert_eq!(pred.len(), raw.test.len());
    assert!(pred.iter().all(|&p| p == 0.0 || p == 1.0));
}

#[test]
fn every_feature_survives_the_cache_in_both_formats() {
    let raw = raw();
    let registry = FeatureRegistry::titanic();

    for format in [CacheFormat::Feather, CacheFormat::Parquet] {
        let dir = tempfile::tempdir().unwrap();
        let cache = FeatureCache::new(dir.path(), format);
        let mut rng = ChaCha8Rng::seed_from_u64(11);

        for name in registry.names() {
            let pair = registry
                .build(name)
                .unwrap()
                .create_features(&raw, &mut rng)
                .unwrap();
            cache.save(name, &pair).unwrap();

            let loaded = cache.load(name).unwrap();
            assert_eq!(loaded.column_names(), pair.column_names(), "{name} {format:?}");
            assert_eq!(loaded.train.columns(), pair.train.columns(), "{name} {format:?}");
            assert_eq!(loaded.test.columns(), pair.test.columns(), "{name} {format:?}");
            assert_eq!(loaded.train.num_rows(), raw.train.len());
            assert_eq!(loaded.test.num_rows(), raw.test.len());
        }
    }
}
