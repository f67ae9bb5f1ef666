use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use arrow::array::{Array, ArrayRef, AsArray, BooleanArray, Float64Array, Int64Array, StringArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Float64Type, Int64Type};
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use super::error::LoadError;
use super::model::{columns, non_blank, Dataset, Observation};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load an observation dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row plus one observation per line (recommended)
/// * `.json`    – `[{ "Year": 2020, "Habitat": "Forest", ... }, ...]`
/// * `.parquet` – one row per observation, columns named as in the CSV
pub fn load_file(path: &Path) -> Result<Dataset, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let dataset = match ext.as_str() {
        "csv" => load_csv(open(path)?)?,
        "json" => load_json(open(path)?)?,
        "parquet" | "pq" => load_parquet(open(path)?)?,
        other => return Err(LoadError::UnsupportedExtension(other.to_string())),
    };

    log::info!(
        "Loaded {} observations ({} years, {} habitats, {} observers) from {}",
        dataset.len(),
        dataset.years.len(),
        dataset.habitats.len(),
        dataset.observers.len(),
        path.display()
    );
    Ok(dataset)
}

fn open(path: &Path) -> Result<File, LoadError> {
    File::open(path).map_err(|e| LoadError::io(path, e))
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with the column names listed in
/// [`columns`], any order, extra columns ignored.
///
/// ```text
/// Year,Month,Season,Habitat,Site_Name,Observer,common_name,scientific_name,watchlist_status,Temperature,Humidity,Sky,Wind
/// 2018,5,Spring,Forest,MABI 01,Elizabeth Oswald,Eastern Towhee,Pipilo erythrophthalmus,False,19.9,79.6,Cloudy/Overcast,Calm (< 1 mph) smoke rises vertically
/// ```
pub fn load_csv<R: Read>(reader: R) -> Result<Dataset, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut observations = Vec::new();
    for (row_no, result) in reader.deserialize::<Observation>().enumerate() {
        let observation = result.map_err(|source| LoadError::Csv {
            row: row_no as u64 + 1,
            source,
        })?;
        observations.push(observation);
    }

    Ok(Dataset::from_observations(observations))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "Year": 2018, "Month": 5, "Season": "Spring", "Habitat": "Forest", ... },
///   ...
/// ]
/// ```
pub fn load_json<R: Read>(reader: R) -> Result<Dataset, LoadError> {
    let observations: Vec<Observation> = serde_json::from_reader(BufReader::new(reader))?;
    Ok(Dataset::from_observations(observations))
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file containing one observation per row.
///
/// Column types are coerced through Arrow casts, so integer columns may be
/// any width, floats may be Float32/Float64, and `watchlist_status` may be
/// Boolean or text.  Works with files written by both **Pandas**
/// (`df.to_parquet()`) and **Polars** (`df.write_parquet()`).
pub fn load_parquet(file: File) -> Result<Dataset, LoadError> {
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)?.build()?;

    let mut observations = Vec::new();
    for batch_result in reader {
        let batch = batch_result?;
        read_batch(&batch, &mut observations)?;
    }

    Ok(Dataset::from_observations(observations))
}

/// Typed views over the columns of one record batch.
struct BatchColumns {
    year: Int64Array,
    month: Int64Array,
    season: StringArray,
    habitat: StringArray,
    site_name: StringArray,
    observer: StringArray,
    common_name: StringArray,
    scientific_name: StringArray,
    watchlist_status: BooleanArray,
    temperature: Option<Float64Array>,
    humidity: Option<Float64Array>,
    sky: Option<StringArray>,
    wind: Option<StringArray>,
}

impl BatchColumns {
    fn new(batch: &RecordBatch) -> Result<Self, LoadError> {
        Ok(Self {
            year: required(batch, columns::YEAR, &DataType::Int64)?
                .as_primitive::<Int64Type>()
                .clone(),
            month: required(batch, columns::MONTH, &DataType::Int64)?
                .as_primitive::<Int64Type>()
                .clone(),
            season: required_text(batch, columns::SEASON)?,
            habitat: required_text(batch, columns::HABITAT)?,
            site_name: required_text(batch, columns::SITE_NAME)?,
            observer: required_text(batch, columns::OBSERVER)?,
            common_name: required_text(batch, columns::COMMON_NAME)?,
            scientific_name: required_text(batch, columns::SCIENTIFIC_NAME)?,
            watchlist_status: required(batch, columns::WATCHLIST_STATUS, &DataType::Boolean)?
                .as_boolean()
                .clone(),
            temperature: optional(batch, columns::TEMPERATURE, &DataType::Float64)?
                .map(|a| a.as_primitive::<Float64Type>().clone()),
            humidity: optional(batch, columns::HUMIDITY, &DataType::Float64)?
                .map(|a| a.as_primitive::<Float64Type>().clone()),
            sky: optional(batch, columns::SKY, &DataType::Utf8)?.map(|a| a.as_string::<i32>().clone()),
            wind: optional(batch, columns::WIND, &DataType::Utf8)?.map(|a| a.as_string::<i32>().clone()),
        })
    }
}

/// Cells that are null, or that the cast could not convert, read as absent.
fn read_batch(batch: &RecordBatch, out: &mut Vec<Observation>) -> Result<(), LoadError> {
    let cols = BatchColumns::new(batch)?;

    for row in 0..batch.num_rows() {
        let year = int_at(&cols.year, row).and_then(|v| i32::try_from(v).ok());
        let month = int_at(&cols.month, row).and_then(|v| u32::try_from(v).ok());
        let season = text_at(&cols.season, row).parse().ok();

        out.push(Observation {
            year,
            month,
            season,
            habitat: text_at(&cols.habitat, row),
            site_name: text_at(&cols.site_name, row),
            observer: text_at(&cols.observer, row),
            common_name: text_at(&cols.common_name, row),
            scientific_name: text_at(&cols.scientific_name, row),
            watchlist_status: !cols.watchlist_status.is_null(row)
                && cols.watchlist_status.value(row),
            temperature: opt_float_at(cols.temperature.as_ref(), row),
            humidity: opt_float_at(cols.humidity.as_ref(), row),
            sky: opt_text_at(cols.sky.as_ref(), row),
            wind: opt_text_at(cols.wind.as_ref(), row),
        });
    }
    Ok(())
}

// -- Parquet / Arrow helpers --

/// Find a column by any of its accepted names and cast it to `ty`.
fn optional(
    batch: &RecordBatch,
    names: &'static [&'static str],
    ty: &DataType,
) -> Result<Option<ArrayRef>, LoadError> {
    match names.iter().find_map(|name| batch.column_by_name(name)) {
        Some(col) => Ok(Some(cast(col.as_ref(), ty)?)),
        None => Ok(None),
    }
}

fn required(
    batch: &RecordBatch,
    names: &'static [&'static str],
    ty: &DataType,
) -> Result<ArrayRef, LoadError> {
    optional(batch, names, ty)?.ok_or(LoadError::MissingColumn(names[0]))
}

fn required_text(batch: &RecordBatch, names: &'static [&'static str]) -> Result<StringArray, LoadError> {
    Ok(required(batch, names, &DataType::Utf8)?.as_string::<i32>().clone())
}

fn int_at(arr: &Int64Array, row: usize) -> Option<i64> {
    (!arr.is_null(row)).then(|| arr.value(row))
}

/// Null text cells read as empty strings, like an empty CSV cell.
fn text_at(arr: &StringArray, row: usize) -> String {
    if arr.is_null(row) {
        String::new()
    } else {
        arr.value(row).to_string()
    }
}

fn opt_text_at(arr: Option<&StringArray>, row: usize) -> Option<String> {
    let arr = arr?;
    if arr.is_null(row) {
        return None;
    }
    non_blank(arr.value(row))
}

fn opt_float_at(arr: Option<&Float64Array>, row: usize) -> Option<f64> {
    let arr = arr?;
    (!arr.is_null(row)).then(|| arr.value(row))
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Arc;

    use arrow::array::{BooleanArray, Float64Array, Int32Array, StringArray};
    use arrow::datatypes::{Field, Schema};
    use parquet::arrow::ArrowWriter;

    use super::*;
    use crate::data::model::Season;

    const HEADER: &str = "Year,Month,Season,Habitat,Site_Name,Observer,common_name,scientific_name,watchlist_status,Temperature,Humidity,Sky,Wind";

    fn csv_text(rows: &[&str]) -> String {
        let mut text = String::from(HEADER);
        for row in rows {
            text.push('\n');
            text.push_str(row);
        }
        text
    }

    #[test]
    fn csv_reads_typed_rows() {
        let text = csv_text(&[
            "2020,4,Spring,Forest,S1,A,Robin,Turdus migratorius,False,12.5,60.0,Clear,Calm",
            "2021,10,Fall,Wetland,S2,B,Heron,Ardea herodias,TRUE,,,,",
        ]);
        let ds = load_csv(text.as_bytes()).unwrap();

        assert_eq!(ds.len(), 2);
        let first = &ds.observations[0];
        assert_eq!(first.year, Some(2020));
        assert_eq!(first.month, Some(4));
        assert_eq!(first.season, Some(Season::Spring));
        assert_eq!(first.temperature, Some(12.5));
        assert_eq!(first.sky.as_deref(), Some("Clear"));
        assert!(!first.watchlist_status);

        let second = &ds.observations[1];
        assert!(second.watchlist_status);
        assert_eq!(second.temperature, None);
        assert_eq!(second.humidity, None);
        assert_eq!(second.wind, None);
    }

    #[test]
    fn csv_without_weather_columns_loads() {
        let text = "year,month,season,habitat,site_name,observer,common_name,scientific_name,watchlist_status\n\
                    2019,1,winter,Grassland,S9,C,Crow,Corvus brachyrhynchos,0\n";
        let ds = load_csv(text.as_bytes()).unwrap();
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.observations[0].season, Some(Season::Winter));
        assert_eq!(ds.observations[0].temperature, None);
        assert_eq!(ds.observations[0].sky, None);
    }

    #[test]
    fn csv_keeps_out_of_range_values() {
        let text = csv_text(&["2020,13,Summer,Forest,S1,A,Robin,Turdus migratorius,false,-99,250,,"]);
        let ds = load_csv(text.as_bytes()).unwrap();
        assert_eq!(ds.observations[0].month, Some(13));
        assert_eq!(ds.observations[0].humidity, Some(250.0));
    }

    #[test]
    fn csv_empty_month_or_season_keeps_the_row() {
        let text = csv_text(&[
            "2020,4,Spring,Forest,S1,A,Robin,Turdus migratorius,False,,,,",
            "2020,,Spring,Forest,S1,A,Robin,Turdus migratorius,False,,,,",
            "2020,4,,Forest,S1,A,Robin,Turdus migratorius,False,,,,",
        ]);
        let ds = load_csv(text.as_bytes()).unwrap();

        assert_eq!(ds.len(), 3);
        assert_eq!(ds.observations[1].month, None);
        assert_eq!(ds.observations[1].season, Some(Season::Spring));
        assert_eq!(ds.observations[2].month, Some(4));
        assert_eq!(ds.observations[2].season, None);
    }

    #[test]
    fn csv_unreadable_cells_become_absent() {
        let text = csv_text(&[
            "twenty,4.5,Monsoon,Forest,S1,A,Robin,Turdus migratorius,false,warm,n/a,,",
            "2021.0,11,Fall,Forest,S1,A,Robin,Turdus migratorius,false,,,,",
        ]);
        let ds = load_csv(text.as_bytes()).unwrap();

        let bad = &ds.observations[0];
        assert_eq!(bad.year, None);
        assert_eq!(bad.month, None);
        assert_eq!(bad.season, None);
        assert_eq!(bad.temperature, None);
        assert_eq!(bad.humidity, None);
        assert_eq!(ds.observations[1].year, Some(2021));
        assert_eq!(ds.years, vec![2021]);
    }

    #[test]
    fn csv_bad_flag_reports_row() {
        let text = csv_text(&[
            "2020,4,Spring,Forest,S1,A,Robin,Turdus migratorius,false,,,,",
            "2020,4,Spring,Forest,S1,A,Robin,Turdus migratorius,maybe,,,,",
        ]);
        match load_csv(text.as_bytes()) {
            Err(LoadError::Csv { row, .. }) => assert_eq!(row, 2),
            other => panic!("expected CSV error, got {other:?}"),
        }
    }

    #[test]
    fn csv_missing_required_column_is_an_error() {
        let text = "Year,Season,Habitat,Site_Name,Observer,common_name,scientific_name,watchlist_status
                    2020,Spring,Forest,S1,A,Robin,Turdus migratorius,false
";
        assert!(matches!(load_csv(text.as_bytes()), Err(LoadError::Csv { row: 1, .. })));
    }

    #[test]
    fn json_records_load() {
        let text = r#"[
            {"Year": 2020, "Month": 4, "Season": "Spring", "Habitat": "Forest",
             "Site_Name": "S1", "Observer": "A", "common_name": "Robin",
             "scientific_name": "Turdus migratorius", "watchlist_status": true,
             "Temperature": 10.5, "Humidity": null}
        ]"#;
        let ds = load_json(text.as_bytes()).unwrap();
        assert_eq!(ds.len(), 1);
        assert!(ds.observations[0].watchlist_status);
        assert_eq!(ds.observations[0].temperature, Some(10.5));
        assert_eq!(ds.observations[0].humidity, None);
    }

    #[test]
    fn json_blank_conditions_match_csv() {
        let json = r#"[
            {"Year": 2020, "Month": 4, "Season": "Spring", "Habitat": "Forest",
             "Site_Name": "S1", "Observer": "A", "common_name": "Robin",
             "scientific_name": "Turdus migratorius", "watchlist_status": false,
             "Sky": "", "Wind": "  "}
        ]"#;
        let from_json = load_json(json.as_bytes()).unwrap();
        let from_csv =
            load_csv(csv_text(&["2020,4,Spring,Forest,S1,A,Robin,Turdus migratorius,false,,,,"]).as_bytes())
                .unwrap();

        assert_eq!(from_json.observations[0].sky, None);
        assert_eq!(from_json.observations[0].wind, None);
        assert_eq!(from_json.observations, from_csv.observations);
    }

    #[test]
    fn json_null_and_text_cells_are_tolerated() {
        let text = r#"[
            {"Year": 2021.0, "Month": null, "Season": "Dry", "Habitat": "Forest",
             "Site_Name": "S1", "Observer": null, "common_name": "Robin",
             "scientific_name": "Turdus migratorius", "watchlist_status": "False"}
        ]"#;
        let ds = load_json(text.as_bytes()).unwrap();
        let row = &ds.observations[0];
        assert_eq!(row.year, Some(2021));
        assert_eq!(row.month, None);
        assert_eq!(row.season, None);
        assert_eq!(row.observer, "");
        assert!(ds.observers.is_empty());
    }

    #[test]
    fn json_must_be_an_array() {
        assert!(matches!(load_json(&b"{\"Year\": 2020}"[..]), Err(LoadError::Json(_))));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_file(Path::new("/definitely/not/here/birds.csv")).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        let err = load_file(Path::new("birds.xlsx")).unwrap_err();
        assert!(matches!(err, LoadError::UnsupportedExtension(ref ext) if ext == "xlsx"));
    }

    #[test]
    fn csv_file_loads_by_extension() {
        let mut tmp = tempfile::Builder::new().suffix(".CSV").tempfile().unwrap();
        write!(
            tmp,
            "{}",
            csv_text(&["2020,4,Spring,Forest,S1,A,Robin,Turdus migratorius,false,,,,"])
        )
        .unwrap();
        let ds = load_file(tmp.path()).unwrap();
        assert_eq!(ds.len(), 1);
    }

    fn write_parquet(path: &Path, batch: &RecordBatch) {
        let file = File::create(path).unwrap();
        let mut writer = ArrowWriter::try_new(file, batch.schema(), None).unwrap();
        writer.write(batch).unwrap();
        writer.close().unwrap();
    }

    fn sample_batch(season: &str) -> RecordBatch {
        let schema = Arc::new(Schema::new(vec![
            Field::new("Year", DataType::Int32, false),
            Field::new("Month", DataType::Int32, false),
            Field::new("Season", DataType::Utf8, false),
            Field::new("Habitat", DataType::Utf8, false),
            Field::new("Site_Name", DataType::Utf8, false),
            Field::new("Observer", DataType::Utf8, false),
            Field::new("common_name", DataType::Utf8, false),
            Field::new("scientific_name", DataType::Utf8, false),
            Field::new("watchlist_status", DataType::Boolean, true),
            Field::new("Temperature", DataType::Float64, true),
        ]));
        RecordBatch::try_new(
            schema,
            vec![
                Arc::new(Int32Array::from(vec![2020, 2021])),
                Arc::new(Int32Array::from(vec![4, 10])),
                Arc::new(StringArray::from(vec!["Spring", season])),
                Arc::new(StringArray::from(vec!["Forest", "Wetland"])),
                Arc::new(StringArray::from(vec!["S1", "S2"])),
                Arc::new(StringArray::from(vec!["A", "B"])),
                Arc::new(StringArray::from(vec!["Robin", "Heron"])),
                Arc::new(StringArray::from(vec!["Turdus migratorius", "Ardea herodias"])),
                Arc::new(BooleanArray::from(vec![Some(false), None])),
                Arc::new(Float64Array::from(vec![Some(21.0), None])),
            ],
        )
        .unwrap()
    }

    #[test]
    fn parquet_rows_are_coerced() {
        let tmp = tempfile::Builder::new().suffix(".parquet").tempfile().unwrap();
        write_parquet(tmp.path(), &sample_batch("Fall"));

        let ds = load_file(tmp.path()).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.years, vec![2020, 2021]);
        let heron = &ds.observations[1];
        assert_eq!(heron.season, Some(Season::Fall));
        assert_eq!(heron.habitat, "Wetland");
        assert!(!heron.watchlist_status);
        assert_eq!(heron.temperature, None);
        assert_eq!(ds.observations[0].temperature, Some(21.0));
        // Humidity / Sky / Wind columns are absent entirely.
        assert_eq!(heron.humidity, None);
        assert_eq!(heron.sky, None);
    }

    #[test]
    fn parquet_unknown_season_keeps_the_row() {
        let tmp = tempfile::Builder::new().suffix(".pq").tempfile().unwrap();
        write_parquet(tmp.path(), &sample_batch("Dry"));

        let ds = load_file(tmp.path()).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.observations[0].season, Some(Season::Spring));
        assert_eq!(ds.observations[1].season, None);
        assert_eq!(ds.observations[1].year, Some(2021));
    }

    #[test]
    fn parquet_missing_column_is_reported() {
        let schema = Arc::new(Schema::new(vec![Field::new("Year", DataType::Int32, false)]));
        let batch =
            RecordBatch::try_new(schema, vec![Arc::new(Int32Array::from(vec![2020]))]).unwrap();
        let tmp = tempfile::Builder::new().suffix(".parquet").tempfile().unwrap();
        write_parquet(tmp.path(), &batch);

        assert!(matches!(
            load_file(tmp.path()),
            Err(LoadError::MissingColumn("Month"))
        ));
    }
}
