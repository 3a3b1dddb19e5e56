//! Variant-specific request payloads and their validation.
//!
//! Callers submit a [`RequestDraft`]: a loose JSON object as received from
//! a form. [`RequestDraft::validate`] turns it into a typed
//! [`RequestPayload`], reporting the first missing or invalid field in the
//! variant's declared field order. Field names are snake_case; camelCase
//! spellings are accepted as aliases.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::validation::{optional_text, required_text};
use super::{ServiceKind, ValidationError};

/// Outing (leave campus) request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutingDetails {
    /// Local date and time of departure.
    pub outing_date: NaiveDateTime,
    /// Local date and time of return.
    pub return_date: NaiveDateTime,
    /// Purpose of the outing.
    pub reason: String,
    /// Free-form details.
    pub details: Option<String>,
    /// Contact number while away.
    pub emergency_contact: String,
    /// Whether a parent has been told.
    #[serde(default)]
    pub parent_notified: bool,
    /// Whether campus security has been told.
    #[serde(default)]
    pub security_notified: bool,
}

/// Printing order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct XeroxOrder {
    /// Print type, e.g. black and white or colour.
    pub service_type: String,
    /// Page count.
    pub pages: u32,
    /// Where to deliver the prints.
    pub delivery_location: String,
    /// Extra instructions.
    pub instructions: Option<String>,
    /// Number the shop should call.
    pub contact_number: String,
}

/// Mess meal booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessBooking {
    /// Meal slot, e.g. lunch.
    pub meal_type: String,
    /// Day of the meal.
    pub meal_date: NaiveDate,
    /// Plates requested.
    pub quantity: u32,
    /// Dietary or serving requests.
    pub special_requests: Option<String>,
}

/// Menu order used by the restaurant and the stationery shop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemOrder {
    /// Menu or catalogue section.
    pub category: String,
    /// Item name.
    pub item: String,
    /// Units requested.
    pub quantity: u32,
    /// Pickup or delivery choice.
    pub delivery_option: String,
    /// Extra instructions.
    pub instructions: Option<String>,
    /// Number the vendor should call.
    pub contact_number: String,
}

/// Coffee shop order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CafeOrder {
    /// Menu section.
    pub category: String,
    /// Item name.
    pub item: String,
    /// Units requested.
    pub quantity: u32,
    /// Cup size.
    pub size: String,
    /// Extra instructions.
    pub instructions: Option<String>,
    /// Number the vendor should call.
    pub contact_number: String,
}

/// Typed payload of a request; the variant doubles as its [`ServiceKind`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestPayload {
    /// Outing request.
    Outing(OutingDetails),
    /// Xerox order.
    Xerox(XeroxOrder),
    /// Mess booking.
    Mess(MessBooking),
    /// Fivestar order.
    Fivestar(ItemOrder),
    /// CCD order.
    Ccd(CafeOrder),
    /// Stationery order.
    Stationary(ItemOrder),
}

impl RequestPayload {
    /// Variant tag of the payload.
    #[must_use]
    pub fn kind(&self) -> ServiceKind {
        match self {
            Self::Outing(_) => ServiceKind::Outing,
            Self::Xerox(_) => ServiceKind::Xerox,
            Self::Mess(_) => ServiceKind::Mess,
            Self::Fivestar(_) => ServiceKind::Fivestar,
            Self::Ccd(_) => ServiceKind::Ccd,
            Self::Stationary(_) => ServiceKind::Stationary,
        }
    }

    /// Contact number supplied with the request, if the variant has one.
    #[must_use]
    pub fn contact_number(&self) -> Option<&str> {
        match self {
            Self::Outing(details) => Some(details.emergency_contact.as_str()),
            Self::Xerox(order) => Some(order.contact_number.as_str()),
            Self::Mess(_) => None,
            Self::Fivestar(order) | Self::Stationary(order) => Some(order.contact_number.as_str()),
            Self::Ccd(order) => Some(order.contact_number.as_str()),
        }
    }

    /// One-line description used in notifications.
    #[must_use]
    pub fn summary(&self) -> String {
        match self {
            Self::Outing(details) => format!(
                "outing {} to {}: {}",
                details.outing_date.format("%Y-%m-%d %H:%M"),
                details.return_date.format("%Y-%m-%d %H:%M"),
                details.reason
            ),
            Self::Xerox(order) => format!(
                "{} pages ({}) to {}",
                order.pages, order.service_type, order.delivery_location
            ),
            Self::Mess(booking) => format!(
                "{} x {} on {}",
                booking.quantity, booking.meal_type, booking.meal_date
            ),
            Self::Fivestar(order) | Self::Stationary(order) => format!(
                "{} x {} ({})",
                order.quantity, order.item, order.delivery_option
            ),
            Self::Ccd(order) => format!("{} x {} ({})", order.quantity, order.item, order.size),
        }
    }

    /// Encode the inner payload as a JSON object for storage or display.
    pub fn to_value(&self) -> Result<Value, serde_json::Error> {
        match self {
            Self::Outing(details) => serde_json::to_value(details),
            Self::Xerox(order) => serde_json::to_value(order),
            Self::Mess(booking) => serde_json::to_value(booking),
            Self::Fivestar(order) | Self::Stationary(order) => serde_json::to_value(order),
            Self::Ccd(order) => serde_json::to_value(order),
        }
    }

    /// Decode a payload previously produced by [`RequestPayload::to_value`].
    pub fn from_value(kind: ServiceKind, value: Value) -> Result<Self, serde_json::Error> {
        Ok(match kind {
            ServiceKind::Outing => Self::Outing(serde_json::from_value(value)?),
            ServiceKind::Xerox => Self::Xerox(serde_json::from_value(value)?),
            ServiceKind::Mess => Self::Mess(serde_json::from_value(value)?),
            ServiceKind::Fivestar => Self::Fivestar(serde_json::from_value(value)?),
            ServiceKind::Ccd => Self::Ccd(serde_json::from_value(value)?),
            ServiceKind::Stationary => Self::Stationary(serde_json::from_value(value)?),
        })
    }
}

/// Unvalidated request fields as submitted by a client.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct RequestDraft {
    fields: Map<String, Value>,
}

impl RequestDraft {
    /// Wrap a JSON object of submitted fields.
    #[must_use]
    pub fn new(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Build a draft from a JSON value; non-objects yield an empty draft.
    #[must_use]
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(fields) => Self { fields },
            _ => Self::default(),
        }
    }

    /// Validate the draft for `kind`.
    ///
    /// # Examples
    /// ```
    /// use campus_portal::domain::{RequestDraft, RequestPayload, ServiceKind};
    /// use serde_json::json;
    ///
    /// let draft = RequestDraft::from_value(json!({
    ///     "service_type": "b&w",
    ///     "pages": 10,
    ///     "delivery_location": "hostel-A",
    ///     "contact_number": "9999999999",
    /// }));
    /// let payload = draft.validate(ServiceKind::Xerox).unwrap();
    /// assert!(matches!(payload, RequestPayload::Xerox(order) if order.pages == 10));
    /// ```
    pub fn validate(&self, kind: ServiceKind) -> Result<RequestPayload, ValidationError> {
        let fields = FieldReader(&self.fields);
        Ok(match kind {
            ServiceKind::Outing => RequestPayload::Outing(fields.outing()?),
            ServiceKind::Xerox => RequestPayload::Xerox(XeroxOrder {
                service_type: fields.text("service_type")?,
                pages: fields.count("pages")?,
                delivery_location: fields.text("delivery_location")?,
                contact_number: fields.text("contact_number")?,
                instructions: fields.optional_text("instructions"),
            }),
            ServiceKind::Mess => RequestPayload::Mess(MessBooking {
                meal_type: fields.text("meal_type")?,
                meal_date: fields.date("meal_date")?,
                quantity: fields.count_or("quantity", 1)?,
                special_requests: fields.optional_text("special_requests"),
            }),
            ServiceKind::Fivestar => RequestPayload::Fivestar(fields.item_order()?),
            ServiceKind::Ccd => RequestPayload::Ccd(CafeOrder {
                category: fields.text("category")?,
                item: fields.text("item")?,
                quantity: fields.count_or("quantity", 1)?,
                size: fields.text("size")?,
                contact_number: fields.text("contact_number")?,
                instructions: fields.optional_text("instructions"),
            }),
            ServiceKind::Stationary => RequestPayload::Stationary(fields.item_order()?),
        })
    }
}

struct FieldReader<'a>(&'a Map<String, Value>);

impl FieldReader<'_> {
    fn outing(&self) -> Result<OutingDetails, ValidationError> {
        let outing_date = self.date_time("outing_date")?;
        let return_date = self.date_time("return_date")?;
        if return_date < outing_date {
            return Err(ValidationError::invalid(
                "return_date",
                "must not be before outing_date",
            ));
        }
        Ok(OutingDetails {
            outing_date,
            return_date,
            reason: self.text("reason")?,
            emergency_contact: self.text("emergency_contact")?,
            details: self.optional_text("details"),
            parent_notified: false,
            security_notified: false,
        })
    }

    fn item_order(&self) -> Result<ItemOrder, ValidationError> {
        Ok(ItemOrder {
            category: self.text("category")?,
            item: self.text("item")?,
            quantity: self.count_or("quantity", 1)?,
            delivery_option: self.text("delivery_option")?,
            contact_number: self.text("contact_number")?,
            instructions: self.optional_text("instructions"),
        })
    }

    fn get(&self, field: &str) -> Option<&Value> {
        self.0
            .get(field)
            .or_else(|| self.0.get(&camel_case(field)))
            .filter(|value| !value.is_null())
    }

    fn text(&self, field: &'static str) -> Result<String, ValidationError> {
        match self.get(field) {
            None => Err(ValidationError::missing(field)),
            Some(Value::String(text)) => required_text(field, Some(text.as_str())),
            Some(Value::Number(number)) => Ok(number.to_string()),
            Some(_) => Err(ValidationError::invalid(field, "must be text")),
        }
    }

    fn optional_text(&self, field: &'static str) -> Option<String> {
        match self.get(field) {
            Some(Value::String(text)) => optional_text(Some(text.as_str())),
            Some(Value::Number(number)) => Some(number.to_string()),
            _ => None,
        }
    }

    fn count(&self, field: &'static str) -> Result<u32, ValidationError> {
        let value = self
            .get(field)
            .ok_or_else(|| ValidationError::missing(field))?;
        let parsed = match value {
            Value::Number(number) => number.as_u64(),
            Value::String(text) if text.trim().is_empty() => {
                return Err(ValidationError::missing(field));
            }
            Value::String(text) => text.trim().parse::<u64>().ok(),
            _ => None,
        };
        parsed
            .filter(|count| *count > 0)
            .and_then(|count| u32::try_from(count).ok())
            .ok_or_else(|| ValidationError::invalid(field, "must be a positive integer"))
    }

    fn count_or(&self, field: &'static str, default: u32) -> Result<u32, ValidationError> {
        match self.count(field) {
            Err(ValidationError::Missing { .. }) => Ok(default),
            other => other,
        }
    }

    fn raw_text(&self, field: &'static str) -> Result<&str, ValidationError> {
        match self.get(field) {
            None => Err(ValidationError::missing(field)),
            Some(Value::String(text)) if text.trim().is_empty() => {
                Err(ValidationError::missing(field))
            }
            Some(Value::String(text)) => Ok(text.trim()),
            Some(_) => Err(ValidationError::invalid(field, "must be an ISO-8601 string")),
        }
    }

    fn date_time(&self, field: &'static str) -> Result<NaiveDateTime, ValidationError> {
        let raw = self.raw_text(field)?;
        parse_local_date_time(raw)
            .ok_or_else(|| ValidationError::invalid(field, "must be an ISO-8601 date-time"))
    }

    fn date(&self, field: &'static str) -> Result<NaiveDate, ValidationError> {
        let raw = self.raw_text(field)?;
        parse_local_date_time(raw)
            .map(|value| value.date())
            .ok_or_else(|| ValidationError::invalid(field, "must be an ISO-8601 date"))
    }
}

fn parse_local_date_time(raw: &str) -> Option<NaiveDateTime> {
    const FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
    ];
    FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .map(|date| date.and_time(NaiveTime::MIN))
        })
}

fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for ch in field.chars() {
        if ch == '_' {
            upper = true;
        } else if upper {
            out.push(ch.to_ascii_uppercase());
            upper = false;
        } else {
            out.push(ch);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    //! Regression coverage for payload validation.
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn draft(value: Value) -> RequestDraft {
        RequestDraft::from_value(value)
    }

    #[test]
    fn xerox_draft_validates() {
        let payload = draft(json!({
            "service_type": "b&w",
            "pages": 10,
            "delivery_location": "hostel-A",
            "contact_number": "9999999999",
        }))
        .validate(ServiceKind::Xerox)
        .expect("valid xerox order");
        assert_eq!(
            payload,
            RequestPayload::Xerox(XeroxOrder {
                service_type: "b&w".to_owned(),
                pages: 10,
                delivery_location: "hostel-A".to_owned(),
                instructions: None,
                contact_number: "9999999999".to_owned(),
            })
        );
    }

    #[rstest]
    #[case::outing(ServiceKind::Outing, "outing_date")]
    #[case::xerox(ServiceKind::Xerox, "service_type")]
    #[case::mess(ServiceKind::Mess, "meal_type")]
    #[case::fivestar(ServiceKind::Fivestar, "category")]
    #[case::ccd(ServiceKind::Ccd, "category")]
    #[case::stationary(ServiceKind::Stationary, "category")]
    fn empty_draft_reports_first_required_field(#[case] kind: ServiceKind, #[case] field: &str) {
        let err = RequestDraft::default().validate(kind).expect_err("empty draft");
        assert!(matches!(err, ValidationError::Missing { .. }));
        assert_eq!(err.field(), field);
    }

    #[test]
    fn ccd_reports_missing_size_before_contact_number() {
        let err = draft(json!({ "category": "hot", "item": "latte", "quantity": 2 }))
            .validate(ServiceKind::Ccd)
            .expect_err("missing size");
        assert_eq!(err.field(), "size");
    }

    #[rstest]
    #[case(json!(0))]
    #[case(json!(-3))]
    #[case(json!("many"))]
    #[case(json!(2.5))]
    fn pages_must_be_positive_integer(#[case] pages: Value) {
        let err = draft(json!({ "service_type": "colour", "pages": pages }))
            .validate(ServiceKind::Xerox)
            .expect_err("invalid pages");
        assert_eq!(err, ValidationError::invalid("pages", "must be a positive integer"));
    }

    #[test]
    fn numeric_strings_and_camel_case_aliases_are_accepted() {
        let payload = draft(json!({
            "category": "pens",
            "item": "gel pen",
            "quantity": " 3 ",
            "deliveryOption": "pickup",
            "contactNumber": "12345",
        }))
        .validate(ServiceKind::Stationary)
        .expect("valid order");
        let RequestPayload::Stationary(order) = payload else {
            panic!("expected stationary payload");
        };
        assert_eq!(order.quantity, 3);
        assert_eq!(order.delivery_option, "pickup");
    }

    #[test]
    fn mess_quantity_defaults_to_one() {
        let payload = draft(json!({ "meal_type": "lunch", "meal_date": "2026-10-20" }))
            .validate(ServiceKind::Mess)
            .expect("valid booking");
        let RequestPayload::Mess(booking) = payload else {
            panic!("expected mess payload");
        };
        assert_eq!(booking.quantity, 1);
        assert_eq!(
            booking.meal_date,
            NaiveDate::from_ymd_opt(2026, 10, 20).expect("valid date")
        );
    }

    #[rstest]
    #[case::fivestar(ServiceKind::Fivestar, json!({
        "category": "mains", "item": "biryani",
        "delivery_option": "pickup", "contact_number": "1",
    }))]
    #[case::ccd(ServiceKind::Ccd, json!({
        "category": "hot", "item": "latte", "size": "large", "contact_number": "1",
    }))]
    #[case::stationary(ServiceKind::Stationary, json!({
        "category": "pens", "item": "gel pen",
        "delivery_option": "pickup", "contact_number": "1",
    }))]
    fn order_quantity_defaults_to_one(#[case] kind: ServiceKind, #[case] fields: Value) {
        let payload = draft(fields).validate(kind).expect("valid order");
        let quantity = match payload {
            RequestPayload::Fivestar(order) | RequestPayload::Stationary(order) => order.quantity,
            RequestPayload::Ccd(order) => order.quantity,
            other => panic!("unexpected payload {other:?}"),
        };
        assert_eq!(quantity, 1);
    }

    #[test]
    fn stored_value_uses_snake_case_keys() {
        let payload = draft(json!({
            "serviceType": "b&w",
            "pages": 10,
            "deliveryLocation": "hostel-A",
            "contactNumber": "9999999999",
        }))
        .validate(ServiceKind::Xerox)
        .expect("valid xerox order");
        let stored = payload.to_value().expect("encode");
        assert_eq!(stored["service_type"], "b&w");
        assert_eq!(stored["delivery_location"], "hostel-A");
        assert_eq!(stored["contact_number"], "9999999999");
        assert!(stored.get("deliveryLocation").is_none());
    }

    #[test]
    fn outing_flags_are_stored_in_snake_case() {
        let payload = draft(json!({
            "outing_date": "2026-10-20T09:30",
            "return_date": "2026-10-20T18:00",
            "reason": "family visit",
            "emergency_contact": "8888888888",
        }))
        .validate(ServiceKind::Outing)
        .expect("valid outing");
        let stored = payload.to_value().expect("encode");
        assert_eq!(stored["parent_notified"], false);
        assert_eq!(stored["security_notified"], false);
    }

    #[rstest]
    #[case("2026-10-20T09:30")]
    #[case("2026-10-20T09:30:00")]
    #[case("2026-10-20 09:30")]
    fn outing_accepts_form_date_times(#[case] outing_date: &str) {
        let payload = draft(json!({
            "outing_date": outing_date,
            "return_date": "2026-10-20T18:00",
            "reason": "family visit",
            "emergency_contact": "8888888888",
        }))
        .validate(ServiceKind::Outing)
        .expect("valid outing");
        let RequestPayload::Outing(details) = payload else {
            panic!("expected outing payload");
        };
        assert!(!details.parent_notified);
        assert!(!details.security_notified);
        assert_eq!(details.outing_date.format("%H:%M").to_string(), "09:30");
    }

    #[test]
    fn outing_return_must_not_precede_departure() {
        let err = draft(json!({
            "outing_date": "2026-10-21T09:00",
            "return_date": "2026-10-20T09:00",
            "reason": "trip",
            "emergency_contact": "1",
        }))
        .validate(ServiceKind::Outing)
        .expect_err("return before departure");
        assert_eq!(err.field(), "return_date");
    }

    #[test]
    fn payload_value_round_trip_keeps_variant() {
        let payload = draft(json!({
            "category": "hot",
            "item": "latte",
            "quantity": 1,
            "size": "large",
            "contact_number": "1",
        }))
        .validate(ServiceKind::Ccd)
        .expect("valid order");
        let stored = payload.to_value().expect("encode");
        assert_eq!(stored["size"], "large");
        let decoded = RequestPayload::from_value(ServiceKind::Ccd, stored).expect("decode");
        assert_eq!(decoded, payload);
    }
}
