//! Conversion between Notion page properties and staysync records.

use chrono::NaiveDate;
use serde_json::{Map, Value, json};
use staysync_core::constants::UNKNOWN_GUEST;
use staysync_core::stay::{ExistingStay, GuestIdentity, NewStay};
use tracing::warn;

use super::Page;

pub const NAME: &str = "Name";
pub const DATE: &str = "Date";
pub const GUEST: &str = "Guest";
pub const GUEST_NAME: &str = "Guest name";
pub const GCAL_ID: &str = "GCal ID";
pub const PAID: &str = "Paid";

type Properties = Map<String, Value>;

/// Title property as plain text, or `None` if it has no text.
pub fn title(props: &Properties, key: &str) -> Option<String> {
    let parts = props.get(key)?.get("title")?.as_array()?;
    let text = parts
        .iter()
        .filter_map(|part| part.get("plain_text").and_then(Value::as_str))
        .collect::<Vec<_>>()
        .join(" ");

    if text.trim().is_empty() { None } else { Some(text) }
}

/// First rich text fragment of a property, or `None` if empty.
pub fn rich_text(props: &Properties, key: &str) -> Option<String> {
    props
        .get(key)?
        .get("rich_text")?
        .get(0)?
        .get("plain_text")?
        .as_str()
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Title of the first page in a rollup of a relation.
pub fn rollup_title(props: &Properties, key: &str) -> Option<String> {
    props
        .get(key)?
        .get("rollup")?
        .get("array")?
        .get(0)?
        .get("title")?
        .get(0)?
        .get("plain_text")?
        .as_str()
        .map(str::to_string)
}

pub fn checkbox(props: &Properties, key: &str) -> bool {
    props
        .get(key)
        .and_then(|p| p.get("checkbox"))
        .and_then(Value::as_bool)
        .unwrap_or(false)
}

/// Start and end of a date property. Both must be set.
pub fn date_range(props: &Properties, key: &str) -> Option<(NaiveDate, NaiveDate)> {
    let date = props.get(key)?.get("date")?;
    let start = parse_date(date.get("start")?.as_str()?)?;
    let end = parse_date(date.get("end")?.as_str()?)?;
    Some((start, end))
}

/// Parse `YYYY-MM-DD`, ignoring any time part Notion appends.
fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.get(..10)?, "%Y-%m-%d").ok()
}

/// Read a stay row. Rows without a date range are skipped; other missing
/// fields are defaulted. Each problem is logged.
pub fn stay_from_page(page: &Page) -> Option<ExistingStay> {
    let props = &page.properties;

    let name = title(props, NAME);
    if name.is_none() {
        warn!("Notion: No name found for {}", page.id);
    }
    let label = name.clone().unwrap_or_else(|| page.id.clone());

    let Some((start, end)) = date_range(props, DATE) else {
        warn!("Notion: No date found for {}", label);
        return None;
    };

    let guest_text = rollup_title(props, GUEST_NAME).unwrap_or_else(|| {
        warn!("Notion: No guest name found for {}", label);
        UNKNOWN_GUEST.to_string()
    });

    let external_id = rich_text(props, GCAL_ID);
    if external_id.is_none() {
        warn!("Notion: No GCal ID found for {}", label);
    }

    Some(ExistingStay {
        record_id: page.id.clone(),
        paid: checkbox(props, PAID),
        start,
        end,
        guest_text,
        name,
        external_id,
    })
}

/// Read a guest row. Rows without a name are skipped.
pub fn guest_from_page(page: &Page) -> Option<GuestIdentity> {
    let Some(display_name) = title(&page.properties, NAME) else {
        warn!("Notion: No name found for {}", page.id);
        return None;
    };

    Some(GuestIdentity {
        record_id: page.id.clone(),
        display_name,
    })
}

pub fn guest_properties(display_name: &str) -> Value {
    json!({
        NAME: { "title": [{ "text": { "content": display_name } }] },
    })
}

/// Properties of a new stay page. Dates are already in Notion's inclusive
/// convention.
pub fn stay_properties(stay: &NewStay) -> Value {
    let mut properties = json!({
        NAME: { "title": [{ "text": { "content": stay.summary } }] },
        DATE: {
            "date": {
                "start": stay.start.format("%Y-%m-%d").to_string(),
                "end": stay.end.format("%Y-%m-%d").to_string(),
            }
        },
        GCAL_ID: { "rich_text": [{ "text": { "content": stay.external_id } }] },
    });

    if let Some(guest_id) = &stay.guest_record_id {
        properties[GUEST] = json!({ "relation": [{ "id": guest_id }] });
    }

    properties
}
