use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Report identifier as stored by the backend. Kept in its wire form so it
/// round-trips unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReportId {
    Number(i64),
    Text(String),
}

impl Display for ReportId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportId::Number(n) => write!(f, "{}", n),
            ReportId::Text(s) => write!(f, "{}", s),
        }
    }
}

/// One soil-analysis record: source image plus the extracted payload
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Report {
    pub id: ReportId,
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    /// Stored as received: extraction may leave it null or not an object
    #[serde(default)]
    pub ocr_json: Value,
}

impl Report {
    /// Working copy of the payload; anything but an object is an empty one
    pub fn payload(&self) -> Payload {
        match &self.ocr_json {
            Value::Object(map) => Payload(map.clone()),
            _ => Payload::default(),
        }
    }
}

// JSON deserialization of `created_at`: RFC 3339, or a naive timestamp read
// as UTC. Anything else is dropped rather than failing the whole row.
fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Value> = Option::deserialize(deserializer)?;
    let Some(Value::String(s)) = raw else {
        return Ok(None);
    };

    Ok(DateTime::parse_from_rfc3339(&s)
        .map(|at| at.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(&s, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|at| at.and_utc())
        }))
}

/// The four fixed sections of an extracted payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Group {
    Metadata,
    Chemistry,
    Micronutrients,
    Calculated,
}

impl Group {
    pub const ALL: [Group; 4] = [
        Group::Metadata,
        Group::Chemistry,
        Group::Micronutrients,
        Group::Calculated,
    ];

    /// Key of the group inside `ocr_json`
    pub fn key(&self) -> &'static str {
        match self {
            Group::Metadata => "metadados",
            Group::Chemistry => "quimica",
            Group::Micronutrients => "micronutrientes",
            Group::Calculated => "calculados",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Group::Metadata => "Sample",
            Group::Chemistry => "Chemistry (macronutrients)",
            Group::Micronutrients => "Micronutrients",
            Group::Calculated => "Calculated indices",
        }
    }

    /// Editable fields as (key, label) pairs, in display order
    pub fn fields(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            Group::Metadata => &[
                ("numero_amostra", "Sample no."),
                ("profundidade", "Depth"),
                ("data_analise", "Analysis date"),
            ],
            Group::Chemistry => &[
                ("ph_agua", "pH (water)"),
                ("ph_cacl2", "pH (CaCl2)"),
                ("indice_smp", "SMP index"),
                ("fosforo_p", "Phosphorus (P)"),
                ("potassio_k", "Potassium (K)"),
                ("calcio_ca", "Calcium (Ca)"),
                ("magnesio_mg", "Magnesium (Mg)"),
                ("enxofre_s", "Sulfur (S)"),
                ("materia_organica", "Organic matter"),
                ("aluminio_al", "Aluminium (Al)"),
                ("h_mais_al", "H + Al"),
            ],
            Group::Micronutrients => &[
                ("zinco_zn", "Zinc (Zn)"),
                ("manganes_mn", "Manganese (Mn)"),
                ("ferro_fe", "Iron (Fe)"),
                ("cobre_cu", "Copper (Cu)"),
                ("boro_b", "Boron (B)"),
            ],
            Group::Calculated => &[
                ("soma_bases_sb", "Sum of bases (SB)"),
                ("ctc_ph7", "CEC pH 7"),
                ("saturacao_v_percent", "Base saturation V%"),
                ("saturacao_al_m_percent", "Al saturation m%"),
            ],
        }
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.fields().iter().any(|(key, _)| *key == field)
    }
}

impl FromStr for Group {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Group::ALL
            .into_iter()
            .find(|group| group.key() == s)
            .ok_or_else(|| format!("unknown group '{}'", s))
    }
}

/// `group.field` address of an editable leaf
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath {
    pub group: Group,
    pub field: String,
}

impl FromStr for FieldPath {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (group, field) = s
            .split_once('.')
            .ok_or_else(|| format!("expected <group>.<field>, got '{}'", s))?;
        let group: Group = group.parse()?;

        if !group.has_field(field) {
            return Err(format!("unknown field '{}' in group '{}'", field, group.key()));
        }

        Ok(FieldPath {
            group,
            field: field.to_string(),
        })
    }
}

/// Extracted data (`ocr_json`). Held as a raw JSON object: leaves are
/// free-form and keys the editor does not know about are carried along.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Payload(Map<String, Value>);

impl Payload {
    pub fn get(&self, group: Group, field: &str) -> Option<&Value> {
        self.0.get(group.key())?.get(field)
    }

    /// Leaf rendered for an input box: null and missing render empty
    pub fn display(&self, group: Group, field: &str) -> String {
        match self.get(group, field) {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        }
    }

    /// Writes one leaf as a string. A group that is missing or not an
    /// object is replaced by a fresh object.
    pub fn set(&mut self, group: Group, field: &str, value: impl Into<String>) {
        let entry = self
            .0
            .entry(group.key())
            .or_insert_with(|| Value::Object(Map::new()));

        if !entry.is_object() {
            *entry = Value::Object(Map::new());
        }

        if let Value::Object(fields) = entry {
            fields.insert(field.to_string(), Value::String(value.into()));
        }
    }

    pub fn as_value(&self) -> Value {
        Value::Object(self.0.clone())
    }
}
