use burnban::resolution::{BurnVerdict, Resolution};

pub(crate) const INVALID_ZIP_REPLY: &str = "Please send a valid U.S. ZIP Code (example: 78701).";
pub(crate) const UNRESOLVED_COUNTY_REPLY: &str =
    "Could not determine the county for this ZIP Code.";

/// Human readable answer for a resolution. Each verdict gets its own wording.
pub(crate) fn render_reply(resolution: &Resolution) -> String {
    let Some(county) = resolution.county.as_deref() else {
        return UNRESOLVED_COUNTY_REPLY.to_string();
    };

    let outcome = &resolution.outcome;
    match outcome.verdict {
        BurnVerdict::Allowed => {
            format!("County: {county}\nThis location is not under a burn ban.")
        }
        BurnVerdict::Banned if outcome.start_date.is_empty() => {
            format!("County: {county}\nThis location is under a burn ban.")
        }
        BurnVerdict::Banned => format!(
            "County: {county}\nThis location is under a burn ban.\nBan started on {}.",
            outcome.start_date
        ),
        BurnVerdict::Unknown => format!("County: {county}\nUnable to determine burn status."),
    }
}

/// Minimal TwiML envelope carrying a single SMS reply.
pub(crate) fn twiml(message: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?><Response><Message>{}</Message></Response>",
        escape_xml(message)
    )
}

fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            other => escaped.push(other),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use burnban::resolution::{Outcome, ZipCode};

    fn resolution(county: Option<&str>, outcome: Outcome) -> Resolution {
        Resolution {
            zip: ZipCode::parse("78701").expect("zip"),
            county: county.map(str::to_string),
            outcome,
        }
    }

    #[test]
    fn each_verdict_has_distinct_reply() {
        let allowed = render_reply(&resolution(Some("Harris"), Outcome::allowed()));
        let banned = render_reply(&resolution(Some("Travis"), Outcome::banned("03/01/2024")));
        let unknown = render_reply(&resolution(
            Some("Travis"),
            Outcome::unknown("Unexpected status"),
        ));

        assert_eq!(allowed, "County: Harris\nThis location is not under a burn ban.");
        assert_eq!(
            banned,
            "County: Travis\nThis location is under a burn ban.\nBan started on 03/01/2024."
        );
        assert_eq!(unknown, "County: Travis\nUnable to determine burn status.");
    }

    #[test]
    fn ban_without_start_date_omits_date_line() {
        let reply = render_reply(&resolution(Some("Llano"), Outcome::banned("")));
        assert!(!reply.contains("started"));
    }

    #[test]
    fn missing_county_uses_unresolved_reply() {
        let reply = render_reply(&resolution(None, Outcome::unknown("Could not determine county")));
        assert_eq!(reply, UNRESOLVED_COUNTY_REPLY);
    }

    #[test]
    fn twiml_escapes_markup() {
        assert_eq!(
            twiml("A & <B>"),
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?><Response><Message>A &amp; &lt;B&gt;</Message></Response>"
        );
    }
}
