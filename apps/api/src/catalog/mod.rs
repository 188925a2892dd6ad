//! Static Career Catalog: read-only index over the two bundled career datasets.
//!
//! Class 10 data is `bucket -> [career]` (buckets are streams plus the
//! `diploma` / `iti` plans). Class 12 data is `stream -> sub-bucket -> [career]`.
//! Loaded once by the composition root and shared by reference; never mutated.

use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use crate::models::career::CareerRecord;
use crate::models::profile::{After10th, Qualification, Stream, UserProfile};

pub const CLASS10_FILE: &str = "class10Careers.json";
pub const CLASS12_FILE: &str = "class12Careers.json";

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("unexpected dataset shape: {0}")]
    Shape(String),
}

#[derive(Debug, Clone)]
struct Bucket {
    name: String,
    careers: Vec<CareerRecord>,
}

#[derive(Debug, Clone)]
struct StreamGroup {
    name: String,
    buckets: Vec<Bucket>,
}

/// Both datasets, in file order.
#[derive(Debug, Clone, Default)]
pub struct StaticCareerCatalog {
    class10: Vec<Bucket>,
    class12: Vec<StreamGroup>,
}

impl StaticCareerCatalog {
    /// Reads `class10Careers.json` and `class12Careers.json` from `dir`.
    pub fn load(dir: &Path) -> Result<Self, CatalogError> {
        let class10 = read_json(&dir.join(CLASS10_FILE))?;
        let class12 = read_json(&dir.join(CLASS12_FILE))?;
        let catalog = Self::from_values(&class10, &class12)?;

        info!(
            "Career catalog loaded from {}: {} careers",
            dir.display(),
            catalog.all_records().count()
        );
        Ok(catalog)
    }

    /// Builds the catalog from already parsed documents. Entries that are not
    /// usable careers (no title, description or path type) are skipped.
    pub fn from_values(class10: &Value, class12: &Value) -> Result<Self, CatalogError> {
        let class10_root = class10
            .as_object()
            .ok_or_else(|| CatalogError::Shape("class 10 dataset must be an object".to_string()))?;
        let class12_root = class12
            .as_object()
            .ok_or_else(|| CatalogError::Shape("class 12 dataset must be an object".to_string()))?;

        let class10 = class10_root
            .iter()
            .filter_map(|(name, careers)| parse_bucket(name, careers))
            .collect();

        let class12 = class12_root
            .iter()
            .filter_map(|(stream, groups)| {
                let groups = groups.as_object()?;
                Some(StreamGroup {
                    name: stream.clone(),
                    buckets: groups
                        .iter()
                        .filter_map(|(name, careers)| parse_bucket(name, careers))
                        .collect(),
                })
            })
            .collect();

        Ok(Self { class10, class12 })
    }

    /// Careers for the profile's qualification / stream / subject bucket.
    ///
    /// - Class 10: the stream's bucket, replaced by the `diploma` / `iti`
    ///   bucket when that is the plan and the bucket is non-empty
    /// - Class 12 Science: `PCB` when subjects mention PCB, else `PCM`
    /// - Class 12 Commerce: `With Mathematics` when subjects mention Mathematics,
    ///   else `Without Mathematics`
    /// - Class 12 Arts: `Fine Arts` when subjects mention Fine Arts, else `Humanities`
    ///
    /// Unknown qualifications, streams or buckets yield an empty slice.
    pub fn bucket(&self, profile: &UserProfile) -> &[CareerRecord] {
        match profile.qualification {
            Qualification::Class10 => self.class10_bucket(profile),
            Qualification::Class12 => self.class12_bucket(profile),
            Qualification::Unknown => &[],
        }
    }

    fn class10_bucket(&self, profile: &UserProfile) -> &[CareerRecord] {
        let mut careers = profile
            .stream
            .as_ref()
            .and_then(|stream| find_bucket(&self.class10, stream.as_str()))
            .unwrap_or(&[]);

        if let Some(plan @ (After10th::Diploma | After10th::Iti)) = &profile.after_10th {
            if let Some(plan_careers) = find_bucket(&self.class10, plan.as_str()) {
                if !plan_careers.is_empty() {
                    careers = plan_careers;
                }
            }
        }

        careers
    }

    fn class12_bucket(&self, profile: &UserProfile) -> &[CareerRecord] {
        let Some(stream) = &profile.stream else {
            return &[];
        };
        let Some(group) = self.class12.iter().find(|g| g.name == stream.as_str()) else {
            return &[];
        };

        let subjects = profile.subjects.as_str();
        let bucket_name = match stream {
            Stream::Science if subjects.contains("PCB") => "PCB",
            Stream::Science => "PCM",
            Stream::Commerce if subjects.contains("Mathematics") => "With Mathematics",
            Stream::Commerce => "Without Mathematics",
            Stream::Arts if subjects.contains("Fine Arts") => "Fine Arts",
            Stream::Arts => "Humanities",
            Stream::Other(_) => return &[],
        };

        find_bucket(&group.buckets, bucket_name).unwrap_or(&[])
    }

    /// Every career in both datasets, Class 10 first, in file order.
    /// Titles may repeat across buckets.
    pub fn all_records(&self) -> impl Iterator<Item = &CareerRecord> + '_ {
        let class10 = self.class10.iter().flat_map(|b| b.careers.iter());
        let class12 = self
            .class12
            .iter()
            .flat_map(|g| g.buckets.iter())
            .flat_map(|b| b.careers.iter());
        class10.chain(class12)
    }
}

fn read_json(path: &Path) -> Result<Value, CatalogError> {
    let raw = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| CatalogError::Json {
        path: path.to_path_buf(),
        source,
    })
}

fn parse_bucket(name: &str, careers: &Value) -> Option<Bucket> {
    let entries = careers.as_array()?;
    let careers: Vec<CareerRecord> = entries
        .iter()
        .filter_map(|entry| CareerRecord::from_loose(entry, None))
        .collect();

    let skipped = entries.len() - careers.len();
    if skipped > 0 {
        warn!("Skipped {skipped} unusable career entries in bucket '{name}'");
    }

    Some(Bucket {
        name: name.to_string(),
        careers,
    })
}

fn find_bucket<'a>(buckets: &'a [Bucket], name: &str) -> Option<&'a [CareerRecord]> {
    buckets
        .iter()
        .find(|b| b.name == name)
        .map(|b| b.careers.as_slice())
}

#[cfg(test)]
pub(crate) mod fixtures {
    use serde_json::{json, Value};

    use super::StaticCareerCatalog;

    pub fn career(title: &str, path_type: &str, salary_max: i64) -> Value {
        json!({
            "title": title,
            "description": format!("{title} description"),
            "requirements": "Relevant certificate",
            "skills": ["Communication"],
            "salary_range": "₹10,000 - ₹30,000",
            "salary_min": 10000,
            "salary_max": salary_max,
            "path_type": path_type
        })
    }

    pub fn class10() -> Value {
        json!({
            "Science": [
                career("Lab Assistant", "immediate", 18000),
                career("Pharmacy Assistant", "immediate", 22000),
                career("Engineering Aspirant", "higher_education", 60000)
            ],
            "Commerce": [career("Accounts Clerk", "immediate", 20000)],
            "diploma": [career("Diploma in Civil Engineering", "higher_education", 35000)],
            "iti": []
        })
    }

    pub fn class12() -> Value {
        json!({
            "Science": {
                "PCM": [career("Software Developer", "higher_education", 80000)],
                "PCB": [career("Staff Nurse", "higher_education", 40000)]
            },
            "Commerce": {
                "With Mathematics": [career("Chartered Accountant", "higher_education", 90000)],
                "Without Mathematics": [career("Retail Manager", "immediate", 30000)]
            },
            "Arts": {
                "Humanities": [career("Civil Services Aspirant", "higher_education", 70000)],
                "Fine Arts": [career("Graphic Designer", "immediate", 35000)]
            }
        })
    }

    pub fn catalog() -> StaticCareerCatalog {
        StaticCareerCatalog::from_values(&class10(), &class12()).unwrap()
    }
}
