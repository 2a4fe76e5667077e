// src/utils/id_generator.rs
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IdType {
    Driver,
    Vehicle,
    Ride,
    Audit,
}

impl IdType {
    pub fn to_prefix(&self) -> &'static str {
        match self {
            IdType::Driver => "drv",
            IdType::Vehicle => "veh",
            IdType::Ride => "rid",
            IdType::Audit => "aud",
        }
    }
}

impl fmt::Display for IdType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_prefix())
    }
}

pub struct IdGenerator;

impl IdGenerator {
    /// Generate a unique ID with format: {prefix}-{YYMMDD}-{random_suffix}
    pub fn generate(id_type: IdType) -> String {
        Self::generate_with_timestamp(id_type, Utc::now())
    }

    /// Generate an ID with a specific timestamp (useful for testing)
    pub fn generate_with_timestamp(id_type: IdType, timestamp: DateTime<Utc>) -> String {
        let date_part = timestamp.format("%y%m%d").to_string();
        let random_suffix = Self::generate_suffix(5);

        format!("{}-{}-{}", id_type.to_prefix(), date_part, random_suffix)
    }

    fn generate_suffix(n: usize) -> String {
        use rand::Rng;
        const CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

        let mut rng = rand::thread_rng();
        (0..n)
            .map(|_| {
                let idx = rng.gen_range(0..CHARS.len());
                CHARS[idx] as char
            })
            .collect()
    }

    /// Parse an ID to extract its components
    pub fn parse_id(id: &str) -> Option<ParsedId> {
        let parts: Vec<&str> = id.split('-').collect();
        if parts.len() != 3 {
            return None;
        }

        let prefix = parts[0];
        let date_part = parts[1];
        let random_suffix = parts[2];

        if date_part.len() != 6 || random_suffix.len() != 5 {
            return None;
        }

        let id_type = match prefix {
            "drv" => IdType::Driver,
            "veh" => IdType::Vehicle,
            "rid" => IdType::Ride,
            "aud" => IdType::Audit,
            _ => return None,
        };

        let year = format!("20{}", &date_part[0..2]).parse::<i32>().ok()?;
        let month = date_part[2..4].parse::<u32>().ok()?;
        let day = date_part[4..6].parse::<u32>().ok()?;

        if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
            return None;
        }

        Some(ParsedId {
            id_type,
            year,
            month,
            day,
            random_suffix: random_suffix.to_string(),
        })
    }

    /// Validate that an ID matches the expected format and type
    pub fn validate_id(id: &str, expected_type: Option<IdType>) -> bool {
        match Self::parse_id(id) {
            Some(parsed) => match expected_type {
                Some(expected) => parsed.id_type == expected,
                None => true,
            },
            None => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedId {
    pub id_type: IdType,
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub random_suffix: String,
}

impl ParsedId {
    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        Utc.with_ymd_and_hms(self.year, self.month, self.day, 0, 0, 0)
            .single()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_generation() {
        let driver_id = IdGenerator::generate(IdType::Driver);
        assert!(driver_id.starts_with("drv-"));
        assert_eq!(driver_id.split('-').count(), 3);

        let ride_id = IdGenerator::generate(IdType::Ride);
        assert!(ride_id.starts_with("rid-"));
    }

    #[test]
    fn test_id_parsing() {
        let test_date = Utc.with_ymd_and_hms(2025, 12, 7, 0, 0, 0).unwrap();
        let id = IdGenerator::generate_with_timestamp(IdType::Vehicle, test_date);

        let parsed = IdGenerator::parse_id(&id).unwrap();
        assert_eq!(parsed.id_type, IdType::Vehicle);
        assert_eq!(parsed.year, 2025);
        assert_eq!(parsed.month, 12);
        assert_eq!(parsed.day, 7);
        assert_eq!(parsed.random_suffix.len(), 5);
    }

    #[test]
    fn test_validation() {
        let valid_id = "drv-251207-a1b2c";
        assert!(IdGenerator::validate_id(valid_id, Some(IdType::Driver)));
        assert!(!IdGenerator::validate_id(valid_id, Some(IdType::Vehicle)));

        assert!(!IdGenerator::validate_id("invalid-format", None));
        assert!(!IdGenerator::validate_id("drv-9999-aaaaa", None));
    }
}
