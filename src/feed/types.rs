use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// One IPO listing as published by the upstream feed.
///
/// Numeric display fields (`units`, `totalAmount`, ...) show up as JSON strings on some
/// pages and as JSON numbers on others, so they are kept as text.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IpoEntry {
    pub ipo_id: u64,
    #[serde(default, deserialize_with = "loose_string")]
    pub company_name: String,
    #[serde(default, deserialize_with = "loose_string")]
    pub stock_symbol: String,
    #[serde(default, deserialize_with = "loose_string")]
    pub sector_name: String,
    #[serde(default, deserialize_with = "loose_string")]
    pub share_type: String,
    #[serde(default, deserialize_with = "loose_opt_string")]
    pub rating: Option<String>,
    #[serde(default, deserialize_with = "loose_string")]
    pub status: String,
    #[serde(default, deserialize_with = "loose_string")]
    pub price_per_unit: String,
    #[serde(default, deserialize_with = "loose_string")]
    pub units: String,
    #[serde(default, deserialize_with = "loose_string")]
    pub min_units: String,
    #[serde(default, deserialize_with = "loose_string")]
    pub max_units: String,
    #[serde(rename = "openingDateAD", default, deserialize_with = "loose_string")]
    pub opening_date_ad: String,
    #[serde(rename = "openingDateBS", default, deserialize_with = "loose_string")]
    pub opening_date_bs: String,
    #[serde(rename = "closingDateAD", default, deserialize_with = "loose_string")]
    pub closing_date_ad: String,
    #[serde(rename = "closingDateBS", default, deserialize_with = "loose_string")]
    pub closing_date_bs: String,
    #[serde(default, deserialize_with = "loose_string")]
    pub closing_date_closing_time: String,
    #[serde(default, deserialize_with = "loose_string")]
    pub share_registrar: String,
    #[serde(default, deserialize_with = "loose_string")]
    pub total_amount: String,
}

/// Top-level listing response: `{ "statusCode": 200, "result": { "data": [...] } }`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListingResponse {
    status_code: Option<i64>,
    result: Option<ListingResult>,
}

#[derive(Debug, Deserialize)]
struct ListingResult {
    #[serde(default)]
    data: Vec<IpoEntry>,
}

/// Validate the shape of a fetched listing body and pull out its entries.
///
/// Returns `None` for anything that is not a 200 response with a non-empty
/// `result.data` array of decodable entries.
pub fn extract_entries(body: &Value) -> Option<Vec<IpoEntry>> {
    let parsed = match ListingResponse::deserialize(body) {
        Ok(p) => p,
        Err(e) => {
            tracing::warn!(error = %e, "listing response does not match the expected shape");
            return None;
        }
    };

    if parsed.status_code != Some(200) {
        tracing::warn!(status_code = ?parsed.status_code, "listing response reported a non-200 status");
        return None;
    }

    parsed
        .result
        .map(|r| r.data)
        .filter(|data| !data.is_empty())
}

fn loose_string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

// Empty strings count as absent, same as null.
fn loose_opt_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    let s = loose_string(d)?;
    Ok(if s.is_empty() { None } else { Some(s) })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry_json(id: u64) -> Value {
        json!({
            "ipoId": id,
            "companyName": "Himal Hydropower Ltd.",
            "stockSymbol": "HHL",
            "sectorName": "Hydro Power",
            "shareType": "ordinary",
            "rating": null,
            "status": "Open",
            "pricePerUnit": "100",
            "units": 1234567,
            "minUnits": "10",
            "maxUnits": "5000",
            "openingDateAD": "2026-10-19",
            "openingDateBS": "2083-07-02",
            "closingDateAD": "2026-10-23",
            "closingDateBS": "2083-07-06",
            "closingDateClosingTime": "5:00 PM",
            "shareRegistrar": "NIBL Ace Capital",
            "totalAmount": "123456700"
        })
    }

    #[test]
    fn test_extracts_entries_from_valid_listing() {
        let body = json!({
            "statusCode": 200,
            "result": { "data": [entry_json(101), entry_json(102)] }
        });
        let entries = extract_entries(&body).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].ipo_id, 101);
        assert_eq!(entries[0].units, "1234567");
        assert_eq!(entries[0].opening_date_ad, "2026-10-19");
        assert_eq!(entries[0].rating, None);
    }

    #[test]
    fn test_non_200_status_code_is_not_usable() {
        let body = json!({ "statusCode": 500, "result": { "data": [entry_json(1)] } });
        assert!(extract_entries(&body).is_none());
    }

    #[test]
    fn test_empty_or_missing_data_is_not_usable() {
        assert!(extract_entries(&json!({ "statusCode": 200, "result": { "data": [] } })).is_none());
        assert!(extract_entries(&json!({ "statusCode": 200, "result": {} })).is_none());
        assert!(extract_entries(&json!({ "statusCode": 200 })).is_none());
        assert!(extract_entries(&json!([1, 2, 3])).is_none());
    }

    #[test]
    fn test_entry_missing_id_is_not_usable() {
        let mut broken = entry_json(1);
        broken.as_object_mut().unwrap().remove("ipoId");
        let body = json!({ "statusCode": 200, "result": { "data": [broken] } });
        assert!(extract_entries(&body).is_none());
    }

    #[test]
    fn test_empty_rating_is_treated_as_absent() {
        let mut e = entry_json(1);
        e["rating"] = json!("");
        let entry: IpoEntry = serde_json::from_value(e).unwrap();
        assert_eq!(entry.rating, None);
    }

    #[test]
    fn test_null_name_and_numeric_symbol_do_not_drop_the_page() {
        let mut odd = entry_json(102);
        odd["companyName"] = Value::Null;
        odd["stockSymbol"] = json!(4321);
        let body = json!({
            "statusCode": 200,
            "result": { "data": [entry_json(101), odd] }
        });

        let entries = extract_entries(&body).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].company_name, "");
        assert_eq!(entries[1].stock_symbol, "4321");
    }
}
