use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use clap::Parser;
use parquet::arrow::ArrowWriter;

/// Write a deterministic students-performance dataset for trying the explorer.
#[derive(Debug, Parser)]
#[command(about)]
struct Args {
    /// Output file; a `.parquet` extension writes Parquet, anything else CSV.
    #[arg(default_value = "students_performance.csv")]
    output: PathBuf,

    #[arg(long, default_value_t = 1000)]
    rows: usize,

    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Share of score cells left empty.
    #[arg(long, default_value_t = 0.01)]
    missing: f64,
}

const GENDERS: [&str; 2] = ["female", "male"];
const GROUPS: [&str; 5] = ["group A", "group B", "group C", "group D", "group E"];
const EDUCATION: [(&str, f64); 6] = [
    ("some high school", -4.0),
    ("high school", -3.0),
    ("some college", 0.0),
    ("associate's degree", 1.5),
    ("bachelor's degree", 3.0),
    ("master's degree", 4.0),
];
const SCORE_COLUMNS: [&str; 3] = ["math score", "reading score", "writing score"];

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn below(&mut self, n: usize) -> usize {
        (self.next_f64() * n as f64) as usize % n
    }

    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

struct Student {
    gender: &'static str,
    group: &'static str,
    education: &'static str,
    lunch: &'static str,
    preparation: &'static str,
    /// math, reading, writing
    scores: [Option<f64>; 3],
}

fn generate(args: &Args) -> Vec<Student> {
    let mut rng = SimpleRng::new(args.seed);
    (0..args.rows)
        .map(|_| {
            let gender = GENDERS[rng.below(GENDERS.len())];
            let group_idx = rng.below(GROUPS.len());
            let (education, education_effect) = EDUCATION[rng.below(EDUCATION.len())];
            let standard_lunch = rng.chance(0.65);
            let prepared = rng.chance(0.35);

            let ability = rng.gauss(66.0, 12.0)
                + education_effect
                + group_idx as f64 * 1.5
                + if standard_lunch { 5.0 } else { -6.0 };
            let literacy_boost = if prepared { 7.0 } else { 0.0 };
            let female = gender == "female";

            let math = ability + if female { -3.0 } else { 4.0 } + if prepared { 5.0 } else { 0.0 };
            let reading = ability + if female { 4.0 } else { -3.0 } + literacy_boost;
            let writing = reading + rng.gauss(0.0, 4.0) + if female { 1.5 } else { -1.5 };

            let mut scores = [None; 3];
            for (slot, mean) in scores.iter_mut().zip([math, reading, writing]) {
                if !rng.chance(args.missing) {
                    *slot = Some((mean + rng.gauss(0.0, 5.0)).round().clamp(0.0, 100.0));
                }
            }

            Student {
                gender,
                group: GROUPS[group_idx],
                education,
                lunch: if standard_lunch { "standard" } else { "free/reduced" },
                preparation: if prepared { "completed" } else { "none" },
                scores,
            }
        })
        .collect()
}

const HEADERS: [&str; 5] = [
    "gender",
    "race/ethnicity",
    "parental level of education",
    "lunch",
    "test preparation course",
];

fn write_csv(path: &Path, students: &[Student]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    writer.write_record(HEADERS.iter().chain(SCORE_COLUMNS.iter()))?;
    for s in students {
        let scores = s
            .scores
            .map(|v| v.map(|v| format!("{v:.0}")).unwrap_or_default());
        writer.write_record(
            [s.gender, s.group, s.education, s.lunch, s.preparation]
                .into_iter()
                .chain(scores.iter().map(String::as_str)),
        )?;
    }
    writer.flush()?;
    Ok(())
}

fn write_parquet(path: &Path, students: &[Student]) -> Result<()> {
    let text_column = |f: fn(&Student) -> &'static str| -> ArrayRef {
        Arc::new(StringArray::from(students.iter().map(f).collect::<Vec<_>>()))
    };
    let score_column = |i: usize| -> ArrayRef {
        Arc::new(Float64Array::from(
            students.iter().map(|s| s.scores[i]).collect::<Vec<_>>(),
        ))
    };

    let fields: Vec<Field> = HEADERS
        .iter()
        .map(|name| Field::new(*name, DataType::Utf8, false))
        .chain(
            SCORE_COLUMNS
                .iter()
                .map(|name| Field::new(*name, DataType::Float64, true)),
        )
        .collect();
    let schema = Arc::new(Schema::new(fields));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            text_column(|s| s.gender),
            text_column(|s| s.group),
            text_column(|s| s.education),
            text_column(|s| s.lunch),
            text_column(|s| s.preparation),
            score_column(0),
            score_column(1),
            score_column(2),
        ],
    )
    .context("failed to create record batch")?;

    let file = std::fs::File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    let students = generate(&args);

    let is_parquet = args
        .output
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("parquet"));
    if is_parquet {
        write_parquet(&args.output, &students)?;
    } else {
        write_csv(&args.output, &students)?;
    }

    println!(
        "Wrote {} students to {}",
        students.len(),
        args.output.display()
    );
    Ok(())
}
