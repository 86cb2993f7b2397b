//! Human-readable log and SOTA summary rendering.

use crate::{
    qso::{TimedContact, TimedLog},
    types::Report,
};

const NO_REPORT: &str = "---";

fn report_or_dash(report: Option<Report>) -> String {
    report.map_or_else(|| NO_REPORT.to_string(), |r| r.to_string())
}

fn contact_line(date: &str, contact: &TimedContact) -> String {
    let rec = &contact.record;
    let mut items = vec![
        date.to_string(),
        contact.zulu.to_string(),
        rec.their_call.to_string(),
        report_or_dash(rec.reports.map(|r| r.theirs)),
        report_or_dash(rec.reports.map(|r| r.mine)),
        rec.frequency.map(|f| f.to_string()).unwrap_or_default(),
        rec.mode.map(|m| m.to_string()).unwrap_or_default(),
    ];
    if let Some(reference) = &rec.their_reference {
        items.push(format!("S2S {reference}"));
    }
    if let Some(comments) = &rec.comments {
        items.push(comments.clone());
    }
    items.join(" ")
}

/// Header, one line per contact, footer.
pub fn activation_log_lines(log: &TimedLog) -> Vec<String> {
    let date = log.preamble.date.format("%Y-%m-%d").to_string();
    let mut out = Vec::with_capacity(log.contacts.len() + 2);
    out.push(format!("SOTA activation on {}", log.preamble.my_reference));
    out.extend(log.contacts.iter().map(|c| contact_line(&date, c)));
    out.push("end of activation".to_string());
    out
}

/// One `V2` summary row per contact.
pub fn summary_lines(log: &TimedLog) -> Vec<String> {
    let p = &log.preamble;
    let date = p.date.format("%d/%m/%Y").to_string();
    log.contacts
        .iter()
        .map(|c| {
            let rec = &c.record;
            [
                "V2".to_string(),
                p.my_call.to_string(),
                p.my_reference.to_string(),
                date.clone(),
                c.zulu.to_string(),
                rec.frequency.map(|f| format!("{f}MHz")).unwrap_or_default(),
                rec.mode.map(|m| m.to_string()).unwrap_or_default(),
                rec.their_call.to_string(),
                rec.their_reference.as_ref().map(|r| r.to_string()).unwrap_or_default(),
            ]
            .join(",")
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::convert;

    const LOG: &str = "my_call w1aw
my_reference W1/AA-001
2024-06-01
utc -4
14.300 ssb
K1ABC 59 59 1200z
K2XYZ s2s g/ld-001 # portable
K3DEF 599 579 1210z 7.032 cw
";

    #[test]
    fn activation_log_layout() {
        let log = convert(LOG).expect("convert");
        assert_eq!(
            activation_log_lines(&log),
            vec![
                "SOTA activation on W1/AA-001",
                "2024-06-01 1200 K1ABC 59 59 14.3 SSB",
                "2024-06-01 1205 K2XYZ --- --- 14.3 SSB S2S G/LD-001 portable",
                "2024-06-01 1210 K3DEF 599 579 7.032 CW",
                "end of activation",
            ]
        );
    }

    #[test]
    fn summary_layout() {
        let log = convert(LOG).expect("convert");
        assert_eq!(
            summary_lines(&log),
            vec![
                "V2,W1AW,W1/AA-001,01/06/2024,1200,14.3MHz,SSB,K1ABC,",
                "V2,W1AW,W1/AA-001,01/06/2024,1205,14.3MHz,SSB,K2XYZ,G/LD-001",
                "V2,W1AW,W1/AA-001,01/06/2024,1210,7.032MHz,CW,K3DEF,",
            ]
        );
    }

    #[test]
    fn empty_body_renders_header_and_footer() {
        let log = convert("my_call W1AW\nmy_reference W1/AA-001\n2024-06-01\n").expect("convert");
        assert_eq!(
            activation_log_lines(&log),
            vec!["SOTA activation on W1/AA-001", "end of activation"]
        );
        assert!(summary_lines(&log).is_empty());
    }
}
