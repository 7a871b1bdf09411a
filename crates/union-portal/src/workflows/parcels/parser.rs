use std::io::Read;

use serde::{Deserialize, Deserializer};

use super::domain::{MemberMatchRow, ParcelRecord, Pnu};

/// Read member rows from an exported spreadsheet. Korean and English
/// headers are both accepted.
pub fn parse_member_rows<R: Read>(reader: R) -> Result<Vec<MemberMatchRow>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut rows = Vec::new();

    for record in csv_reader.deserialize::<MemberSheetRow>() {
        let row = record?;
        rows.push(MemberMatchRow {
            name: row.name,
            property_address: row.property_address,
            dong: row.dong,
            ho: row.ho,
            phone: row.phone,
            birth_date: row.birth_date,
        });
    }

    Ok(rows)
}

/// Read a parcel table export (`pnu`, lot address, optional road address).
pub fn parse_parcel_rows<R: Read>(reader: R) -> Result<Vec<ParcelRecord>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut parcels = Vec::new();

    for record in csv_reader.deserialize::<ParcelSheetRow>() {
        let row = record?;
        parcels.push(ParcelRecord {
            pnu: Pnu(row.pnu),
            lot_address: row.lot_address,
            road_address: row.road_address,
        });
    }

    Ok(parcels)
}

#[derive(Debug, Deserialize)]
struct MemberSheetRow {
    #[serde(rename = "name", alias = "이름", alias = "성명")]
    name: String,
    #[serde(
        rename = "property_address",
        alias = "물건지주소",
        alias = "주소",
        alias = "소재지"
    )]
    property_address: String,
    #[serde(
        rename = "dong",
        alias = "동",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    dong: Option<String>,
    #[serde(
        rename = "ho",
        alias = "호",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    ho: Option<String>,
    #[serde(
        rename = "phone",
        alias = "연락처",
        alias = "전화번호",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    phone: Option<String>,
    #[serde(
        rename = "birth_date",
        alias = "생년월일",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    birth_date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ParcelSheetRow {
    #[serde(rename = "pnu", alias = "PNU")]
    pnu: String,
    #[serde(rename = "lot_address", alias = "지번주소")]
    lot_address: String,
    #[serde(
        rename = "road_address",
        alias = "도로명주소",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    road_address: Option<String>,
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
