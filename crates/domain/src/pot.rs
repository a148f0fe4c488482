//! Pot — a plant container with geometry, a care schedule, and history.

use serde::{Deserialize, Serialize};

use crate::error::{FieldIssue, ValidationError};
use crate::history::{HistoryEntry, MoistureReading};
use crate::id::{PotId, UserId};
use crate::time::{Timestamp, now};

/// Pot shape tag. Determines which dimension fields apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    Cuboid,
    Cylinder,
}

/// Shape-dependent measurements.
///
/// `height` applies to every shape. `width`/`depth` apply only to
/// [`Shape::Cuboid`], `diameter` only to [`Shape::Cylinder`]; inapplicable
/// fields are cleared whenever the pot is constructed or merged, so a
/// stored pot never carries stale measurements from a previous shape.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dimensions {
    pub height: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depth: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diameter: Option<f64>,
}

impl Dimensions {
    /// Cuboid measurements.
    #[must_use]
    pub fn cuboid(height: f64, width: f64, depth: f64) -> Self {
        Self {
            height,
            width: Some(width),
            depth: Some(depth),
            diameter: None,
        }
    }

    /// Cylinder measurements.
    #[must_use]
    pub fn cylinder(height: f64, diameter: f64) -> Self {
        Self {
            height,
            width: None,
            depth: None,
            diameter: Some(diameter),
        }
    }

    /// Issues for the fields the given shape requires.
    fn shape_issues(&self, shape: Shape) -> Vec<FieldIssue> {
        let mut issues = Vec::new();
        match shape {
            Shape::Cuboid => {
                required_positive("dimensions.width", self.width, &mut issues);
                required_positive("dimensions.depth", self.depth, &mut issues);
            }
            Shape::Cylinder => {
                required_positive("dimensions.diameter", self.diameter, &mut issues);
            }
        }
        issues
    }

    /// Drop measurements the given shape does not use.
    fn clear_inapplicable(&mut self, shape: Shape) {
        match shape {
            Shape::Cuboid => self.diameter = None,
            Shape::Cylinder => {
                self.width = None;
                self.depth = None;
            }
        }
    }
}

fn required_positive(field: &'static str, value: Option<f64>, issues: &mut Vec<FieldIssue>) {
    match value {
        None => issues.push(FieldIssue::Missing(field)),
        Some(v) if v <= 0.0 => issues.push(FieldIssue::NotPositive(field)),
        Some(_) => {}
    }
}

/// Free-form care metadata. Not validated beyond its shape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OtherParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sunlight: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub soil_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<String>,
}

/// The primary entity: a physical plant container and its care configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pot {
    pub id: PotId,
    /// Owning user — immutable after creation.
    pub owner: UserId,
    pub pot_name: String,
    pub flower_name: String,
    pub water_amount: f64,
    /// Days between waterings.
    pub watering_frequency: u32,
    /// Free-text size descriptor ("small", "12cm", …).
    pub pot_size: String,
    pub shape: Shape,
    pub dimensions: Dimensions,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub other_params: Option<OtherParams>,
    /// Append-only; insertion order is the append order, which is not
    /// necessarily sorted by event date.
    #[serde(default)]
    pub watering_history: Vec<HistoryEntry>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Pot {
    /// Check every invariant, collecting all failures in one pass.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] enumerating every missing or invalid
    /// field, never just the first.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();
        required_text("potName", &self.pot_name, &mut issues);
        required_text("flowerName", &self.flower_name, &mut issues);
        if self.water_amount <= 0.0 {
            issues.push(FieldIssue::NotPositive("waterAmount"));
        }
        if self.watering_frequency == 0 {
            issues.push(FieldIssue::NotPositive("wateringFrequency"));
        }
        required_text("potSize", &self.pot_size, &mut issues);
        if self.dimensions.height <= 0.0 {
            issues.push(FieldIssue::NotPositive("dimensions.height"));
        }
        issues.extend(self.dimensions.shape_issues(self.shape));

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::new(issues))
        }
    }

    /// Merge a partial update into this pot.
    ///
    /// Every provided field replaces the stored one; dimensions merge
    /// per-field. Inapplicable measurements for the (possibly changed)
    /// shape are cleared. The caller re-validates the merged record —
    /// a patch is never trusted on its own.
    pub fn apply(&mut self, patch: PotPatch) {
        if let Some(value) = patch.pot_name {
            self.pot_name = value;
        }
        if let Some(value) = patch.flower_name {
            self.flower_name = value;
        }
        if let Some(value) = patch.water_amount {
            self.water_amount = value;
        }
        if let Some(value) = patch.watering_frequency {
            self.watering_frequency = value;
        }
        if let Some(value) = patch.pot_size {
            self.pot_size = value;
        }
        if let Some(value) = patch.shape {
            self.shape = value;
        }
        if let Some(spec) = patch.dimensions {
            if let Some(height) = spec.height {
                self.dimensions.height = height;
            }
            if let Some(width) = spec.width {
                self.dimensions.width = Some(width);
            }
            if let Some(depth) = spec.depth {
                self.dimensions.depth = Some(depth);
            }
            if let Some(diameter) = spec.diameter {
                self.dimensions.diameter = Some(diameter);
            }
        }
        if let Some(params) = patch.other_params {
            self.other_params = Some(params);
        }
        self.dimensions.clear_inapplicable(self.shape);
    }

    /// Latest soil-moisture reading: among entries carrying a reading,
    /// the maximum by `date`; equal dates break toward the later
    /// insertion, so the result is deterministic regardless of append
    /// order.
    #[must_use]
    pub fn latest_moisture(&self) -> Option<MoistureReading> {
        self.watering_history
            .iter()
            .enumerate()
            .filter_map(|(idx, entry)| {
                entry.soil_moisture.map(|value| (idx, entry.date, value))
            })
            .max_by(|(ia, da, _), (ib, db, _)| da.cmp(db).then(ia.cmp(ib)))
            .map(|(_, date, soil_moisture)| MoistureReading {
                soil_moisture,
                date,
            })
    }
}

fn required_text(field: &'static str, value: &str, issues: &mut Vec<FieldIssue>) {
    if value.trim().is_empty() {
        issues.push(FieldIssue::Missing(field));
    }
}

/// Dimension fields as supplied by a client — everything optional, so a
/// half-filled form produces field issues instead of a decode error.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DimensionsSpec {
    pub height: Option<f64>,
    pub width: Option<f64>,
    pub depth: Option<f64>,
    pub diameter: Option<f64>,
}

/// Client-supplied fields for creating a pot.
///
/// All fields are optional at the decode layer; [`PotDraft::into_pot`]
/// reports every absence in one validation pass.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PotDraft {
    pub pot_name: Option<String>,
    pub flower_name: Option<String>,
    pub water_amount: Option<f64>,
    pub watering_frequency: Option<u32>,
    pub pot_size: Option<String>,
    pub shape: Option<Shape>,
    pub dimensions: Option<DimensionsSpec>,
    pub other_params: Option<OtherParams>,
}

impl PotDraft {
    /// Validate the draft and produce a [`Pot`] owned by `owner`.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] listing every missing or non-positive
    /// field at once.
    pub fn into_pot(self, owner: UserId) -> Result<Pot, ValidationError> {
        let mut issues = Vec::new();

        let pot_name = required_draft_text("potName", self.pot_name, &mut issues);
        let flower_name = required_draft_text("flowerName", self.flower_name, &mut issues);
        let pot_size = required_draft_text("potSize", self.pot_size, &mut issues);

        let water_amount = match self.water_amount {
            None => {
                issues.push(FieldIssue::Missing("waterAmount"));
                0.0
            }
            Some(value) if value <= 0.0 => {
                issues.push(FieldIssue::NotPositive("waterAmount"));
                value
            }
            Some(value) => value,
        };
        let watering_frequency = match self.watering_frequency {
            None => {
                issues.push(FieldIssue::Missing("wateringFrequency"));
                0
            }
            Some(0) => {
                issues.push(FieldIssue::NotPositive("wateringFrequency"));
                0
            }
            Some(value) => value,
        };

        if self.shape.is_none() {
            issues.push(FieldIssue::Missing("shape"));
        }
        let spec = self.dimensions.unwrap_or_default();
        let height = match spec.height {
            None => {
                issues.push(FieldIssue::Missing("dimensions.height"));
                0.0
            }
            Some(value) if value <= 0.0 => {
                issues.push(FieldIssue::NotPositive("dimensions.height"));
                value
            }
            Some(value) => value,
        };
        let mut dimensions = Dimensions {
            height,
            width: spec.width,
            depth: spec.depth,
            diameter: spec.diameter,
        };
        if let Some(shape) = self.shape {
            issues.extend(dimensions.shape_issues(shape));
            dimensions.clear_inapplicable(shape);
        }

        if !issues.is_empty() {
            return Err(ValidationError::new(issues));
        }
        // issues is empty, so shape was present.
        let Some(shape) = self.shape else {
            return Err(ValidationError::new(vec![FieldIssue::Missing("shape")]));
        };

        let ts = now();
        Ok(Pot {
            id: PotId::new(),
            owner,
            pot_name,
            flower_name,
            water_amount,
            watering_frequency,
            pot_size,
            shape,
            dimensions,
            other_params: self.other_params,
            watering_history: Vec::new(),
            created_at: ts,
            updated_at: ts,
        })
    }
}

fn required_draft_text(
    field: &'static str,
    value: Option<String>,
    issues: &mut Vec<FieldIssue>,
) -> String {
    match value {
        Some(text) if !text.trim().is_empty() => text,
        _ => {
            issues.push(FieldIssue::Missing(field));
            String::new()
        }
    }
}

/// Partial update payload — every provided field replaces the stored one.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PotPatch {
    pub pot_name: Option<String>,
    pub flower_name: Option<String>,
    pub water_amount: Option<f64>,
    pub watering_frequency: Option<u32>,
    pub pot_size: Option<String>,
    pub shape: Option<Shape>,
    pub dimensions: Option<DimensionsSpec>,
    pub other_params: Option<OtherParams>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn cuboid_draft() -> PotDraft {
        PotDraft {
            pot_name: Some("Balcony".to_string()),
            flower_name: Some("Basil".to_string()),
            water_amount: Some(250.0),
            watering_frequency: Some(3),
            pot_size: Some("medium".to_string()),
            shape: Some(Shape::Cuboid),
            dimensions: Some(DimensionsSpec {
                height: Some(20.0),
                width: Some(30.0),
                depth: Some(15.0),
                diameter: None,
            }),
            other_params: None,
        }
    }

    fn cylinder_draft() -> PotDraft {
        PotDraft {
            shape: Some(Shape::Cylinder),
            dimensions: Some(DimensionsSpec {
                height: Some(25.0),
                diameter: Some(18.0),
                ..DimensionsSpec::default()
            }),
            ..cuboid_draft()
        }
    }

    fn ts(secs: i64) -> Timestamp {
        chrono::Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn should_create_cuboid_when_all_dimensions_present() {
        let pot = cuboid_draft().into_pot(UserId::new()).unwrap();
        assert_eq!(pot.shape, Shape::Cuboid);
        assert_eq!(pot.dimensions.width, Some(30.0));
        assert!(pot.dimensions.diameter.is_none());
        assert!(pot.watering_history.is_empty());
    }

    #[test]
    fn should_create_cylinder_when_height_and_diameter_present() {
        let pot = cylinder_draft().into_pot(UserId::new()).unwrap();
        assert_eq!(pot.shape, Shape::Cylinder);
        assert_eq!(pot.dimensions.diameter, Some(18.0));
        assert!(pot.dimensions.width.is_none());
    }

    #[test]
    fn should_reject_cuboid_missing_width_and_depth() {
        let mut draft = cuboid_draft();
        draft.dimensions = Some(DimensionsSpec {
            height: Some(20.0),
            ..DimensionsSpec::default()
        });
        let err = draft.into_pot(UserId::new()).unwrap_err();
        assert!(err.issues.contains(&FieldIssue::Missing("dimensions.width")));
        assert!(err.issues.contains(&FieldIssue::Missing("dimensions.depth")));
    }

    #[test]
    fn should_reject_cylinder_missing_diameter() {
        let mut draft = cylinder_draft();
        draft.dimensions = Some(DimensionsSpec {
            height: Some(25.0),
            ..DimensionsSpec::default()
        });
        let err = draft.into_pot(UserId::new()).unwrap_err();
        assert_eq!(
            err.issues,
            vec![FieldIssue::Missing("dimensions.diameter")]
        );
    }

    #[test]
    fn should_reject_non_positive_measurements() {
        let mut draft = cuboid_draft();
        draft.water_amount = Some(0.0);
        draft.dimensions = Some(DimensionsSpec {
            height: Some(-1.0),
            width: Some(0.0),
            depth: Some(15.0),
            diameter: None,
        });
        let err = draft.into_pot(UserId::new()).unwrap_err();
        assert!(err.issues.contains(&FieldIssue::NotPositive("waterAmount")));
        assert!(
            err.issues
                .contains(&FieldIssue::NotPositive("dimensions.height"))
        );
        assert!(
            err.issues
                .contains(&FieldIssue::NotPositive("dimensions.width"))
        );
    }

    #[test]
    fn should_report_every_missing_field_in_one_pass() {
        let err = PotDraft::default().into_pot(UserId::new()).unwrap_err();
        let fields: Vec<_> = err.issues.iter().map(FieldIssue::field).collect();
        for expected in [
            "potName",
            "flowerName",
            "potSize",
            "waterAmount",
            "wateringFrequency",
            "shape",
            "dimensions.height",
        ] {
            assert!(fields.contains(&expected), "missing issue for {expected}");
        }
    }

    #[test]
    fn should_treat_blank_text_as_missing() {
        let mut draft = cuboid_draft();
        draft.pot_name = Some("   ".to_string());
        let err = draft.into_pot(UserId::new()).unwrap_err();
        assert_eq!(err.issues, vec![FieldIssue::Missing("potName")]);
    }

    #[test]
    fn should_clear_inapplicable_dimensions_on_create() {
        let mut draft = cylinder_draft();
        draft.dimensions = Some(DimensionsSpec {
            height: Some(25.0),
            width: Some(99.0),
            depth: Some(99.0),
            diameter: Some(18.0),
        });
        let pot = draft.into_pot(UserId::new()).unwrap();
        assert!(pot.dimensions.width.is_none());
        assert!(pot.dimensions.depth.is_none());
    }

    #[test]
    fn should_pick_latest_reading_by_date_not_append_order() {
        let mut pot = cuboid_draft().into_pot(UserId::new()).unwrap();
        pot.watering_history = vec![
            HistoryEntry::watering(250.0, ts(100)),
            HistoryEntry::moisture(30.0, ts(300)),
            // appended later but observed earlier
            HistoryEntry::moisture(45.0, ts(200)),
        ];
        let reading = pot.latest_moisture().unwrap();
        assert_eq!(reading.soil_moisture, 30.0);
        assert_eq!(reading.date, ts(300));
    }

    #[test]
    fn should_break_date_ties_toward_later_insertion() {
        let mut pot = cuboid_draft().into_pot(UserId::new()).unwrap();
        pot.watering_history = vec![
            HistoryEntry::moisture(10.0, ts(200)),
            HistoryEntry::moisture(20.0, ts(200)),
        ];
        assert_eq!(pot.latest_moisture().unwrap().soil_moisture, 20.0);
    }

    #[test]
    fn should_return_none_when_no_entry_carries_a_reading() {
        let mut pot = cuboid_draft().into_pot(UserId::new()).unwrap();
        pot.watering_history = vec![HistoryEntry::watering(250.0, ts(100))];
        assert!(pot.latest_moisture().is_none());
    }

    #[test]
    fn should_merge_patch_and_keep_unmentioned_fields() {
        let mut pot = cuboid_draft().into_pot(UserId::new()).unwrap();
        pot.apply(PotPatch {
            flower_name: Some("Mint".to_string()),
            ..PotPatch::default()
        });
        assert_eq!(pot.flower_name, "Mint");
        assert_eq!(pot.pot_name, "Balcony");
        assert!(pot.validate().is_ok());
    }

    #[test]
    fn should_fail_validation_when_shape_switch_leaves_gaps() {
        let mut pot = cylinder_draft().into_pot(UserId::new()).unwrap();
        pot.apply(PotPatch {
            shape: Some(Shape::Cuboid),
            ..PotPatch::default()
        });
        let err = pot.validate().unwrap_err();
        assert!(err.issues.contains(&FieldIssue::Missing("dimensions.width")));
        assert!(err.issues.contains(&FieldIssue::Missing("dimensions.depth")));
        // the stale diameter is gone regardless
        assert!(pot.dimensions.diameter.is_none());
    }

    #[test]
    fn should_switch_shape_cleanly_when_patch_provides_new_dimensions() {
        let mut pot = cylinder_draft().into_pot(UserId::new()).unwrap();
        pot.apply(PotPatch {
            shape: Some(Shape::Cuboid),
            dimensions: Some(DimensionsSpec {
                width: Some(12.0),
                depth: Some(14.0),
                ..DimensionsSpec::default()
            }),
            ..PotPatch::default()
        });
        assert!(pot.validate().is_ok());
        assert_eq!(pot.dimensions.height, 25.0);
        assert!(pot.dimensions.diameter.is_none());
    }

    #[test]
    fn should_serialize_with_camel_case_wire_names() {
        let pot = cuboid_draft().into_pot(UserId::new()).unwrap();
        let json = serde_json::to_value(&pot).unwrap();
        assert!(json.get("potName").is_some());
        assert!(json.get("wateringFrequency").is_some());
        assert_eq!(json["shape"], "cuboid");
        assert!(json.get("wateringHistory").is_some());
    }

    #[test]
    fn should_deserialize_draft_from_wire_json() {
        let draft: PotDraft = serde_json::from_str(
            r#"{
                "potName": "Kitchen",
                "flowerName": "Chives",
                "waterAmount": 150,
                "wateringFrequency": 2,
                "potSize": "small",
                "shape": "cylinder",
                "dimensions": {"height": 10, "diameter": 8},
                "otherParams": {"sunlight": "partial"}
            }"#,
        )
        .unwrap();
        let pot = draft.into_pot(UserId::new()).unwrap();
        assert_eq!(pot.shape, Shape::Cylinder);
        assert_eq!(
            pot.other_params.unwrap().sunlight.as_deref(),
            Some("partial")
        );
    }
}
