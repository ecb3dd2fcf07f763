//! Resolution of a concrete header row against a [`SheetLayout`].

use std::collections::{BTreeMap, HashMap};

use mpow_model::{MeasurementType, Slot};

use crate::config::{MeasureSpec, SheetLayout};
use crate::error::SchemaError;
use crate::header::normalize_key;

/// A header column carrying one measurement type at one slot.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasureColumn {
    /// Zero-based position in the header row.
    pub index: usize,
    /// Header text as written in the sheet.
    pub name: String,
    pub measurement_type: MeasurementType,
    pub slot: Slot,
    pub unit: String,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl MeasureColumn {
    pub fn accepts(&self, value: f64) -> bool {
        self.min.is_none_or(|min| value >= min) && self.max.is_none_or(|max| value <= max)
    }
}

/// Validated column grid of a pivoted sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetSchema {
    pub subject_index: usize,
    pub subject_name: String,
    pub date_index: usize,
    pub date_name: String,
    /// Number of header columns.
    pub width: usize,
    /// Measurement columns in output order: layout measure order, then
    /// ascending slot, then the daily-only column.
    pub measure_columns: Vec<MeasureColumn>,
    pub ignored_columns: Vec<String>,
}

struct Located<'a> {
    spec: &'a MeasureSpec,
    slot: Slot,
}

impl SheetSchema {
    /// Checks `headers` against `layout` and builds the column grid.
    ///
    /// Every measure that has intraday columns must cover the same
    /// contiguous slot range `1..=N`; measures recorded only once per day
    /// (a `<prefix>_daily` column) are exempt.
    pub fn resolve(layout: &SheetLayout, headers: &[String]) -> Result<Self, SchemaError> {
        let subject_key = normalize_key(&layout.subject_column);
        let date_key = normalize_key(&layout.date_column);
        let ignored_keys: Vec<String> = layout
            .ignored_columns
            .iter()
            .map(|name| normalize_key(name))
            .collect();

        let mut seen_keys: HashMap<String, &str> = HashMap::new();
        let mut seen_cells: HashMap<(MeasurementType, Slot), &str> = HashMap::new();
        let mut subject = None;
        let mut date = None;
        let mut ignored = Vec::new();
        let mut found: Vec<MeasureColumn> = Vec::new();

        for (index, raw) in headers.iter().enumerate() {
            let key = normalize_key(raw);
            if key.is_empty() {
                return Err(SchemaError::UnrecognizedColumn {
                    column: format!("<blank column {}>", index + 1),
                });
            }
            if let Some(first) = seen_keys.get(key.as_str()) {
                return Err(SchemaError::DuplicateColumn {
                    column: raw.clone(),
                    first: (*first).to_string(),
                });
            }
            seen_keys.insert(key.clone(), raw.as_str());

            if key == subject_key {
                subject = Some(index);
                continue;
            }
            if key == date_key {
                date = Some(index);
                continue;
            }
            if ignored_keys.contains(&key) {
                ignored.push(raw.clone());
                continue;
            }

            let located = locate_measure(layout, &key, raw)?;
            let cell = (located.spec.kind, located.slot);
            if let Some(first) = seen_cells.get(&cell) {
                return Err(SchemaError::DuplicateColumn {
                    column: raw.clone(),
                    first: (*first).to_string(),
                });
            }
            seen_cells.insert(cell, raw.as_str());
            found.push(MeasureColumn {
                index,
                name: raw.clone(),
                measurement_type: located.spec.kind,
                slot: located.slot,
                unit: located.spec.unit.clone(),
                min: located.spec.min,
                max: located.spec.max,
            });
        }

        let subject_index = subject.ok_or_else(|| SchemaError::MissingColumn {
            column: layout.subject_column.clone(),
        })?;
        let date_index = date.ok_or_else(|| SchemaError::MissingColumn {
            column: layout.date_column.clone(),
        })?;
        if found.is_empty() {
            return Err(SchemaError::NoMeasurements);
        }

        check_slot_grid(layout, &found)?;
        found.sort_by_key(|column| (measure_position(layout, column.measurement_type), column.slot));

        let schema = SheetSchema {
            subject_index,
            subject_name: headers[subject_index].clone(),
            date_index,
            date_name: headers[date_index].clone(),
            width: headers.len(),
            measure_columns: found,
            ignored_columns: ignored,
        };
        tracing::debug!(
            measure_columns = schema.measure_columns.len(),
            slots = schema.slot_count(),
            ignored = schema.ignored_columns.len(),
            "resolved sheet schema"
        );
        Ok(schema)
    }

    /// Number of intraday slots per subject-day.
    pub fn slot_count(&self) -> u32 {
        self.measure_columns
            .iter()
            .filter_map(|column| column.slot.index())
            .max()
            .unwrap_or(0)
    }

    /// Measurement types present in the header, in output order.
    pub fn measurement_types(&self) -> Vec<MeasurementType> {
        let mut types: Vec<MeasurementType> = Vec::new();
        for column in &self.measure_columns {
            if !types.contains(&column.measurement_type) {
                types.push(column.measurement_type);
            }
        }
        types
    }

    /// Number of measurements produced per input row.
    pub fn cells_per_row(&self) -> usize {
        self.measure_columns.len()
    }

    pub fn columns_for(&self, kind: MeasurementType) -> impl Iterator<Item = &MeasureColumn> {
        self.measure_columns
            .iter()
            .filter(move |column| column.measurement_type == kind)
    }
}

fn measure_position(layout: &SheetLayout, kind: MeasurementType) -> usize {
    layout
        .measures
        .iter()
        .position(|measure| measure.kind == kind)
        .unwrap_or(usize::MAX)
}

fn locate_measure<'a>(
    layout: &'a SheetLayout,
    key: &str,
    raw: &str,
) -> Result<Located<'a>, SchemaError> {
    let slot_marker = normalize_key(&layout.slot_marker);
    let daily_marker = normalize_key(&layout.daily_marker);

    // Longest prefix first so that `pain` never shadows `pain_rest`.
    let mut specs: Vec<(&MeasureSpec, String)> = layout
        .measures
        .iter()
        .map(|spec| (spec, normalize_key(&spec.prefix)))
        .collect();
    specs.sort_by(|a, b| b.1.len().cmp(&a.1.len()));

    for (spec, prefix) in specs {
        let Some(rest) = key
            .strip_prefix(prefix.as_str())
            .and_then(|rest| rest.strip_prefix('_'))
        else {
            continue;
        };
        if rest == daily_marker {
            return Ok(Located {
                spec,
                slot: Slot::Daily,
            });
        }
        let Some(number) = rest.strip_prefix(slot_marker.as_str()) else {
            continue;
        };
        let number = number.strip_prefix('_').unwrap_or(number);
        if number.is_empty() || !number.bytes().all(|b| b.is_ascii_digit()) {
            continue;
        }
        let Ok(slot) = number.parse::<u32>() else {
            continue;
        };
        if slot == 0 {
            return Err(SchemaError::ZeroSlot {
                column: raw.to_string(),
            });
        }
        return Ok(Located {
            spec,
            slot: Slot::Intraday(slot),
        });
    }

    Err(SchemaError::UnrecognizedColumn {
        column: raw.to_string(),
    })
}

fn check_slot_grid(layout: &SheetLayout, found: &[MeasureColumn]) -> Result<(), SchemaError> {
    let mut slots_by_kind: BTreeMap<MeasurementType, BTreeMap<u32, &str>> = BTreeMap::new();
    for column in found {
        if let Slot::Intraday(slot) = column.slot {
            slots_by_kind
                .entry(column.measurement_type)
                .or_default()
                .insert(slot, column.name.as_str());
        }
    }
    let Some(max_slot) = slots_by_kind
        .values()
        .filter_map(|slots| slots.keys().next_back().copied())
        .max()
    else {
        return Ok(());
    };

    for slot in 1..=max_slot {
        for spec in &layout.measures {
            let Some(slots) = slots_by_kind.get(&spec.kind) else {
                continue;
            };
            if slots.contains_key(&slot) {
                continue;
            }
            let reason = slots_by_kind
                .iter()
                .find_map(|(_, other)| other.get(&slot))
                .map(|present| format!("{present} is present"))
                .unwrap_or_else(|| format!("slots must run contiguously up to {max_slot}"));
            return Err(SchemaError::MissingSlot {
                column: format!(
                    "{}_{}{}",
                    normalize_key(&spec.prefix),
                    normalize_key(&layout.slot_marker),
                    slot
                ),
                reason,
            });
        }
    }
    Ok(())
}
