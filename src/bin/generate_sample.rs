//! Writes a synthetic `train.csv` / `test.csv` pair in the Kaggle Titanic
//! schema so the pipeline can run without the competition download.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const SURNAMES: [&str; 8] = [
    "Braund", "Cumings", "Heikkinen", "Futrelle", "Allen", "Moran", "McCarthy", "Palsson",
];
const GIVEN: [&str; 6] = ["Owen", "John", "Laina", "Jacques", "William", "James"];
const TITLES: [(&str, &str); 8] = [
    ("Mr", "male"),
    ("Mr", "male"),
    ("Mrs", "female"),
    ("Miss", "female"),
    ("Master", "male"),
    ("Dr", "male"),
    ("Mlle", "female"),
    ("Rev", "male"),
];

struct Row {
    id: usize,
    pclass: u8,
    name: String,
    sex: &'static str,
    age: Option<f64>,
    sib_sp: u8,
    parch: u8,
    fare: Option<f64>,
    embarked: Option<&'static str>,
    survived: u8,
}

fn generate_row(id: usize, rng: &mut ChaCha8Rng) -> Row {
    let pclass: u8 = *[1, 2, 3, 3, 3].choose(rng).unwrap_or(&3);
    let (title, sex) = *TITLES.choose(rng).unwrap_or(&TITLES[0]);
    let name = format!(
        "{}, {}. {}",
        SURNAMES.choose(rng).unwrap_or(&SURNAMES[0]),
        title,
        GIVEN.choose(rng).unwrap_or(&GIVEN[0])
    );
    let age = (!rng.gen_bool(0.2)).then(|| rng.gen_range(1..75) as f64);
    let fare = (!rng.gen_bool(0.01)).then(|| {
        let base = match pclass {
            1 => 80.0,
            2 => 20.0,
            _ => 8.0,
        };
        ((base * rng.gen_range(0.5..2.0)) * 10_000.0_f64).round() / 10_000.0
    });
    let embarked = if rng.gen_bool(0.01) {
        None
    } else {
        Some(*["S", "S", "S", "C", "Q"].choose(rng).unwrap_or(&"S"))
    };

    // survival odds favour women, children and first class
    let mut p: f64 = if sex == "female" { 0.7 } else { 0.2 };
    if age.is_some_and(|a| a < 12.0) {
        p += 0.2;
    }
    p += (3 - pclass) as f64 * 0.1;
    let survived = rng.gen_bool(p.min(0.95)) as u8;

    Row {
        id,
        pclass,
        name,
        sex,
        age,
        sib_sp: rng.gen_range(0..3),
        parch: rng.gen_range(0..3),
        fare,
        embarked,
        survived,
    }
}

fn write_csv(path: &Path, rows: &[Row], with_label: bool) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).with_context(|| format!("creating {}", path.display()))?;
    let mut header = vec!["PassengerId"];
    if with_label {
        header.push("Survived");
    }
    header.extend([
        "Pclass", "Name", "Sex", "Age", "SibSp", "Parch", "Ticket", "Fare", "Cabin", "Embarked",
    ]);
    writer.write_record(&header)?;

    let opt = |v: Option<f64>| v.map(|v| v.to_string()).unwrap_or_default();
    for row in rows {
        let mut record = vec![row.id.to_string()];
        if with_label {
            record.push(row.survived.to_string());
        }
        record.extend([
            row.pclass.to_string(),
            row.name.clone(),
            row.sex.to_string(),
            opt(row.age),
            row.sib_sp.to_string(),
            row.parch.to_string(),
            format!("T{}", 10_000 + row.id),
            opt(row.fare),
            String::new(),
            row.embarked.unwrap_or_default().to_string(),
        ]);
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    let out_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("data/input"));
    std::fs::create_dir_all(&out_dir)?;

    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let train: Vec<Row> = (1..=891).map(|id| generate_row(id, &mut rng)).collect();
    let test: Vec<Row> = (892..=1309).map(|id| generate_row(id, &mut rng)).collect();

    write_csv(&out_dir.join("train.csv"), &train, true)?;
    write_csv(&out_dir.join("test.csv"), &test, false)?;

    println!(
        "Wrote {} train and {} test passengers to {}",
        train.len(),
        test.len(),
        out_dir.display()
    );
    Ok(())
}
