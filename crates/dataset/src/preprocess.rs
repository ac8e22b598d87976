//! Dataset preprocessors
//!
//! Turn a raw, source-specific table (Ames, California Housing, or an
//! arbitrary CSV) into the canonical six-feature-plus-price table the model
//! trains on. Column detection is heuristic by design; callers are expected
//! to validate the output when they care about alignment.

use std::path::Path;

use crate::error::DatasetError;
use crate::table::{Cell, Table};

/// Canonical output column order
pub const CANONICAL_COLUMNS: [&str; 7] = [
    "area",
    "bedrooms",
    "bathrooms",
    "floors",
    "year_built",
    "location_score",
    "Price",
];

/// Target-column keywords, in priority order
const TARGET_KEYWORDS: [&str; 4] = ["price", "value", "target", "y"];

/// Square feet to square meters
const SQFT_TO_SQM: f64 = 0.0929;

/// California Housing target rescale: hundreds of thousands of USD to VND
const CALIFORNIA_TARGET_SCALE: f64 = 100_000.0 * 24_000.0;

/// Known dataset flavors, sniffed from the file path
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DatasetKind {
    Ames,
    California,
    Generic,
}

impl DatasetKind {
    pub fn detect(path: &Path) -> Self {
        // Sniff the whole path, not just the file name, so directory names
        // like data/ames/ count too.
        let name = path.to_string_lossy().to_lowercase();

        if name.contains("train.csv") || name.contains("ames") {
            DatasetKind::Ames
        } else if name.contains("california") {
            DatasetKind::California
        } else {
            DatasetKind::Generic
        }
    }
}

/// Preprocess a table according to its detected kind
pub fn preprocess(kind: DatasetKind, table: &Table) -> Result<Table, DatasetError> {
    match kind {
        DatasetKind::Ames => preprocess_ames(table),
        DatasetKind::California => preprocess_california(table),
        DatasetKind::Generic => preprocess_generic(table, None),
    }
}

/// Map an arbitrary table onto the canonical schema
///
/// Target detection (when `target_column` is not given) searches column names
/// case-insensitively for `price`, `value`, `target`, `y` in that order and
/// falls back to the last column.
pub fn preprocess_generic(
    table: &Table,
    target_column: Option<&str>,
) -> Result<Table, DatasetError> {
    if table.n_rows() == 0 {
        return Err(DatasetError::Empty);
    }

    let target_idx = match target_column {
        Some(name) => table
            .column_index(name)
            .ok_or_else(|| DatasetError::MissingColumn(name.to_string()))?,
        None => detect_target(table),
    };
    tracing::info!("using target column: {}", table.columns[target_idx]);

    let targets: Vec<Cell> = table.column(target_idx).cloned().collect();
    let mut x = drop_column(table, target_idx);
    x.impute_and_encode();

    let area = alias_column(
        &x,
        &[
            "area",
            "LotArea",
            "GrLivArea",
            "TotalBsmtSF",
            "1stFlrSF",
            "LotFrontage",
        ],
    )
    .or_else(|| {
        // Derived fallbacks before giving up on the data entirely
        match (values(&x, "TotalBsmtSF"), values(&x, "1stFlrSF")) {
            (Some(bsmt), Some(first)) => Some(
                bsmt.iter()
                    .zip(&first)
                    .map(|(a, b)| a + b)
                    .collect(),
            ),
            _ => None,
        }
    })
    .or_else(|| {
        if x.n_cols() > 0 {
            tracing::warn!("no area column found, using the first column");
            Some(x.column(0).filter_map(Cell::as_num).collect())
        } else {
            None
        }
    })
    .unwrap_or_else(|| vec![100.0; x.n_rows()]);

    let bedrooms = alias_column(&x, &["bedrooms", "BedroomAbvGr", "Bedrooms", "BR"])
        .unwrap_or_else(|| vec![3.0; x.n_rows()]);

    let bathrooms = bathrooms_column(&x).unwrap_or_else(|| vec![2.0; x.n_rows()]);

    let floors = values(&x, "floors")
        .or_else(|| values(&x, "2ndFlrSF").map(|v| second_floor_to_count(&v)))
        .unwrap_or_else(|| vec![1.0; x.n_rows()]);

    let year_built = alias_column(&x, &["year_built", "YearBuilt", "YearRemodAdd", "YrBuilt"])
        .unwrap_or_else(|| vec![2000.0; x.n_rows()]);

    let location_score = values(&x, "location_score")
        .or_else(|| values(&x, "OverallQual").map(|v| scale(&v, 0.1)))
        .or_else(|| values(&x, "OverallCond").map(|v| scale(&v, 0.1)))
        .unwrap_or_else(|| vec![5.0; x.n_rows()]);

    Ok(assemble_canonical(
        area,
        bedrooms,
        bathrooms,
        floors,
        year_built,
        location_score,
        targets,
    ))
}

/// Ames Housing: `SalePrice` target, square footage converted to m²
pub fn preprocess_ames(table: &Table) -> Result<Table, DatasetError> {
    if table.n_rows() == 0 {
        return Err(DatasetError::Empty);
    }

    let target_idx = table
        .column_index("SalePrice")
        .ok_or_else(|| DatasetError::MissingColumn("SalePrice".to_string()))?;

    let targets: Vec<Cell> = table.column(target_idx).cloned().collect();
    let mut x = drop_column(table, target_idx);
    x.impute_and_encode();

    let area = values(&x, "GrLivArea")
        .or_else(|| values(&x, "LotArea"))
        .or_else(
            || match (values(&x, "TotalBsmtSF"), values(&x, "1stFlrSF")) {
                (Some(bsmt), Some(first)) => {
                    Some(bsmt.iter().zip(&first).map(|(a, b)| a + b).collect())
                }
                _ => None,
            },
        )
        .map(|v| scale(&v, SQFT_TO_SQM))
        .unwrap_or_else(|| vec![100.0; x.n_rows()]);

    let bedrooms =
        values(&x, "BedroomAbvGr").unwrap_or_else(|| vec![3.0; x.n_rows()]);

    let bathrooms = full_half_bathrooms(&x, "FullBath", "HalfBath")
        .unwrap_or_else(|| vec![2.0; x.n_rows()]);

    let floors = values(&x, "2ndFlrSF")
        .map(|v| second_floor_to_count(&v))
        .unwrap_or_else(|| vec![1.0; x.n_rows()]);

    let year_built = values(&x, "YearBuilt").unwrap_or_else(|| vec![2000.0; x.n_rows()]);

    let location_score = values(&x, "OverallQual")
        .map(|v| scale(&v, 0.1))
        .unwrap_or_else(|| vec![5.0; x.n_rows()]);

    Ok(assemble_canonical(
        area,
        bedrooms,
        bathrooms,
        floors,
        year_built,
        location_score,
        targets,
    ))
}

/// California Housing: rename the target, drop incomplete rows, rescale the
/// target from hundreds of thousands of USD. The feature columns keep their
/// native schema; prediction-time mapping handles the rest.
pub fn preprocess_california(table: &Table) -> Result<Table, DatasetError> {
    if table.n_rows() == 0 {
        return Err(DatasetError::Empty);
    }

    let mut out = table.clone();
    let target_idx = out
        .column_index("MedHouseVal")
        .or_else(|| out.column_index("Price"))
        .ok_or_else(|| DatasetError::MissingColumn("MedHouseVal".to_string()))?;
    out.columns[target_idx] = "Price".to_string();

    out.rows.retain(|row| !row.iter().any(Cell::is_null));
    if out.n_rows() == 0 {
        return Err(DatasetError::Empty);
    }

    for row in &mut out.rows {
        if let Cell::Num(v) = &mut row[target_idx] {
            *v *= CALIFORNIA_TARGET_SCALE;
        }
    }

    tracing::info!(
        "california: {} rows, {} feature columns",
        out.n_rows(),
        out.n_cols() - 1
    );
    Ok(out)
}

fn detect_target(table: &Table) -> usize {
    for keyword in TARGET_KEYWORDS {
        if let Some(idx) = table
            .columns
            .iter()
            .position(|c| c.to_lowercase().contains(keyword))
        {
            return idx;
        }
    }
    tracing::warn!("no target keyword matched, falling back to the last column");
    table.n_cols() - 1
}

fn drop_column(table: &Table, idx: usize) -> Table {
    let mut columns = table.columns.clone();
    columns.remove(idx);

    let rows = table
        .rows
        .iter()
        .map(|row| {
            let mut row = row.clone();
            row.remove(idx);
            row
        })
        .collect();

    Table { columns, rows }
}

/// Numeric values of a column, if it exists (post-encode: always numeric)
fn values(table: &Table, name: &str) -> Option<Vec<f64>> {
    let idx = table.column_index(name)?;
    Some(
        table
            .column(idx)
            .map(|cell| cell.as_num().unwrap_or(0.0))
            .collect(),
    )
}

/// First alias present wins
fn alias_column(table: &Table, aliases: &[&str]) -> Option<Vec<f64>> {
    for alias in aliases {
        if let Some(v) = values(table, alias) {
            tracing::debug!("mapped {} onto canonical column", alias);
            return Some(v);
        }
    }
    None
}

fn bathrooms_column(table: &Table) -> Option<Vec<f64>> {
    values(table, "bathrooms")
        .or_else(|| full_half_bathrooms(table, "FullBath", "HalfBath"))
        .or_else(|| full_half_bathrooms(table, "BsmtFullBath", "BsmtHalfBath"))
}

fn full_half_bathrooms(table: &Table, full: &str, half: &str) -> Option<Vec<f64>> {
    let full = values(table, full)?;
    match values(table, half) {
        Some(half) => Some(full.iter().zip(&half).map(|(f, h)| f + 0.5 * h).collect()),
        None => Some(full),
    }
}

/// 2ndFlrSF > 0 means a second storey exists
fn second_floor_to_count(second_floor_sqft: &[f64]) -> Vec<f64> {
    second_floor_sqft
        .iter()
        .map(|&v| if v > 0.0 { 2.0 } else { 1.0 })
        .collect()
}

fn scale(v: &[f64], factor: f64) -> Vec<f64> {
    v.iter().map(|x| x * factor).collect()
}

fn assemble_canonical(
    area: Vec<f64>,
    bedrooms: Vec<f64>,
    bathrooms: Vec<f64>,
    floors: Vec<f64>,
    year_built: Vec<f64>,
    location_score: Vec<f64>,
    targets: Vec<Cell>,
) -> Table {
    let columns = CANONICAL_COLUMNS.iter().map(|c| c.to_string()).collect();
    let mut rows = Vec::with_capacity(targets.len());

    for i in 0..targets.len() {
        rows.push(vec![
            Cell::Num(area[i]),
            Cell::Num(bedrooms[i]),
            Cell::Num(bathrooms[i]),
            Cell::Num(floors[i]),
            Cell::Num(year_built[i]),
            Cell::Num(location_score[i]),
            targets[i].clone(),
        ]);
    }

    Table { columns, rows }
}
