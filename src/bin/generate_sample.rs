//! Writes a synthetic bird observation table as CSV and Parquet, using the
//! same column names the dashboard reads.

use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{BooleanArray, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

const ROWS: usize = 2_000;
const CSV_PATH: &str = "cleaned_bird_observation_data.csv";
const PARQUET_PATH: &str = "cleaned_bird_observation_data.parquet";

const HEADER: [&str; 13] = [
    "Year",
    "Month",
    "Season",
    "Habitat",
    "Site_Name",
    "Observer",
    "common_name",
    "scientific_name",
    "watchlist_status",
    "Temperature",
    "Humidity",
    "Sky",
    "Wind",
];

const HABITATS: [(&str, &[&str]); 3] = [
    ("Forest", &["MABI 01", "MABI 02", "ANTI 07", "CATO 12"]),
    ("Grassland", &["MONO 03", "HAFE 05", "NACE 09"]),
    ("Wetland", &["PRWI 04", "CHOH 11"]),
];

const OBSERVERS: [&str; 6] = [
    "Elizabeth Oswald",
    "Kimberly Serno",
    "Brian Swimelar",
    "Sarah Wong",
    "Jamie Ruiz",
    "Priya Natarajan",
];

/// (common name, scientific name, on the conservation watchlist)
const SPECIES: [(&str, &str, bool); 14] = [
    ("Northern Cardinal", "Cardinalis cardinalis", false),
    ("Carolina Wren", "Thryothorus ludovicianus", false),
    ("Eastern Towhee", "Pipilo erythrophthalmus", false),
    ("Red-eyed Vireo", "Vireo olivaceus", false),
    ("Wood Thrush", "Hylocichla mustelina", true),
    ("Kentucky Warbler", "Geothlypis formosa", true),
    ("Field Sparrow", "Spizella pusilla", false),
    ("Eastern Meadowlark", "Sturnella magna", true),
    ("Indigo Bunting", "Passerina cyanea", false),
    ("Great Blue Heron", "Ardea herodias", false),
    ("Prothonotary Warbler", "Protonotaria citrea", true),
    ("Red-winged Blackbird", "Agelaius phoeniceus", false),
    ("American Robin", "Turdus migratorius", false),
    ("Blue Jay", "Cyanocitta cristata", false),
];

const SKY: [&str; 5] = ["Clear or Few Clouds", "Partly Cloudy", "Cloudy/Overcast", "Fog", "Mist/Drizzle"];

const WIND: [&str; 4] = [
    "Calm (< 1 mph) smoke rises vertically",
    "Light Air Movement (1-3 mph) smoke drifts",
    "Light Breeze (4-7 mph) wind felt on face",
    "Gentle Breeze (8-12 mph), leaves in motion",
];

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
        (self.next_u64() % n as u64) as usize
    }

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[self.below(items.len())]
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

struct Row {
    year: i64,
    month: i64,
    season: &'static str,
    habitat: &'static str,
    site: &'static str,
    observer: &'static str,
    common: &'static str,
    scientific: &'static str,
    watchlist: bool,
    temperature: Option<f64>,
    humidity: Option<f64>,
    sky: &'static str,
    wind: &'static str,
}

fn season_of(month: i64) -> (&'static str, f64) {
    // (season, mean temperature °C)
    match month {
        12 | 1 | 2 => ("Winter", 2.0),
        3..=5 => ("Spring", 14.0),
        6..=8 => ("Summer", 26.0),
        _ => ("Fall", 15.0),
    }
}

fn generate(rng: &mut SimpleRng) -> Vec<Row> {
    (0..ROWS)
        .map(|_| {
            let year = 2018 + rng.below(6) as i64;
            let month = 1 + rng.below(12) as i64;
            let (season, mean_temp) = season_of(month);
            let (habitat, sites) = *rng.pick(&HABITATS);
            let (common, scientific, watchlist) = *rng.pick(&SPECIES);

            // A few readings are missing, as in the field data.
            let temperature =
                (rng.next_f64() > 0.03).then(|| (rng.gauss(mean_temp, 4.0) * 10.0).round() / 10.0);
            let humidity = (rng.next_f64() > 0.03)
                .then(|| (rng.gauss(72.0, 12.0).clamp(15.0, 100.0) * 10.0).round() / 10.0);

            Row {
                year,
                month,
                season,
                habitat,
                site: *rng.pick(sites),
                observer: *rng.pick(&OBSERVERS),
                common,
                scientific,
                watchlist,
                temperature,
                humidity,
                sky: *rng.pick(&SKY),
                wind: *rng.pick(&WIND),
            }
        })
        .collect()
}

fn write_csv(rows: &[Row]) -> Result<()> {
    let mut writer = csv::Writer::from_path(CSV_PATH).context("creating CSV output")?;
    writer.write_record(HEADER)?;
    for r in rows {
        let fmt_opt = |v: Option<f64>| v.map(|x| x.to_string()).unwrap_or_default();
        writer.write_record([
            r.year.to_string(),
            r.month.to_string(),
            r.season.to_string(),
            r.habitat.to_string(),
            r.site.to_string(),
            r.observer.to_string(),
            r.common.to_string(),
            r.scientific.to_string(),
            if r.watchlist { "True" } else { "False" }.to_string(),
            fmt_opt(r.temperature),
            fmt_opt(r.humidity),
            r.sky.to_string(),
            r.wind.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn write_parquet(rows: &[Row]) -> Result<()> {
    let text = |f: fn(&Row) -> &'static str| StringArray::from(rows.iter().map(f).collect::<Vec<_>>());

    let schema = Arc::new(Schema::new(vec![
        Field::new(HEADER[0], DataType::Int64, false),
        Field::new(HEADER[1], DataType::Int64, false),
        Field::new(HEADER[2], DataType::Utf8, false),
        Field::new(HEADER[3], DataType::Utf8, false),
        Field::new(HEADER[4], DataType::Utf8, false),
        Field::new(HEADER[5], DataType::Utf8, false),
        Field::new(HEADER[6], DataType::Utf8, false),
        Field::new(HEADER[7], DataType::Utf8, false),
        Field::new(HEADER[8], DataType::Boolean, false),
        Field::new(HEADER[9], DataType::Float64, true),
        Field::new(HEADER[10], DataType::Float64, true),
        Field::new(HEADER[11], DataType::Utf8, false),
        Field::new(HEADER[12], DataType::Utf8, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(Int64Array::from(rows.iter().map(|r| r.year).collect::<Vec<_>>())),
            Arc::new(Int64Array::from(rows.iter().map(|r| r.month).collect::<Vec<_>>())),
            Arc::new(text(|r| r.season)),
            Arc::new(text(|r| r.habitat)),
            Arc::new(text(|r| r.site)),
            Arc::new(text(|r| r.observer)),
            Arc::new(text(|r| r.common)),
            Arc::new(text(|r| r.scientific)),
            Arc::new(BooleanArray::from(rows.iter().map(|r| r.watchlist).collect::<Vec<_>>())),
            Arc::new(Float64Array::from(rows.iter().map(|r| r.temperature).collect::<Vec<_>>())),
            Arc::new(Float64Array::from(rows.iter().map(|r| r.humidity).collect::<Vec<_>>())),
            Arc::new(text(|r| r.sky)),
            Arc::new(text(|r| r.wind)),
        ],
    )
    .context("building record batch")?;

    let file = std::fs::File::create(PARQUET_PATH).context("creating parquet output")?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let rows = generate(&mut rng);

    write_csv(&rows)?;
    write_parquet(&rows)?;

    let watchlisted = rows.iter().filter(|r| r.watchlist).count();
    println!(
        "Wrote {} observations ({watchlisted} of watchlist species) to {CSV_PATH} and {PARQUET_PATH}",
        rows.len()
    );
    Ok(())
}
