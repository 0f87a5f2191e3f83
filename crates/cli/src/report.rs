// crates/cli/src/report.rs
//! Plain-text rendering of a decoded summary for the terminal.

use std::fmt::Write as _;

use podsum_types::{JobStatus, SummaryData};

/// Status marker matching the startup-line glyphs.
pub fn status_glyph(status: JobStatus) -> &'static str {
    match status {
        JobStatus::Completed => "\u{2713}",
        JobStatus::Failed => "\u{2717}",
        JobStatus::Pending | JobStatus::Processing => "\u{2192}",
    }
}

/// Epoch-millisecond creation time as a UTC timestamp, `None` if out of range.
pub fn format_created_at(millis: i64) -> Option<String> {
    chrono::DateTime::from_timestamp_millis(millis)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
}

/// Renders every populated section of the summary, in a fixed order. An
/// entirely empty summary renders a single placeholder line.
pub fn render_summary(data: &SummaryData) -> String {
    let mut out = String::new();

    if let Some(summary) = &data.summary {
        section(&mut out, "Summary");
        line(&mut out, summary);
    }

    if let Some(points) = &data.bullet_points {
        if !points.is_empty() {
            section(&mut out, "Bullet Points");
            for point in points {
                line(&mut out, &format!("\u{2022} {point}"));
            }
        }
    }

    if let Some(topics) = &data.topic_identification {
        if !topics.is_empty() {
            section(&mut out, "Key Topics");
            line(&mut out, &topics.join(", "));
        }
    }

    if let Some(quotes) = &data.quote_extraction {
        if !quotes.is_empty() {
            section(&mut out, "Notable Quotes");
            for quote in quotes {
                line(&mut out, &format!("\u{201c}{quote}\u{201d}"));
            }
        }
    }

    if let Some(characters) = &data.character_identification {
        if !characters.is_empty() {
            section(&mut out, "Characters");
            line(&mut out, &characters.join(", "));
        }
    }

    if let Some(sentiment) = &data.sentiment_analysis {
        if sentiment.sentiment.is_some() || sentiment.description.is_some() {
            section(&mut out, "Sentiment");
            match (&sentiment.sentiment, &sentiment.description) {
                (Some(label), Some(desc)) => line(&mut out, &format!("{label} \u{2014} {desc}")),
                (Some(label), None) => line(&mut out, label),
                (None, Some(desc)) => line(&mut out, desc),
                (None, None) => unreachable!(),
            }
        }
    }

    if let Some(qna) = &data.qna {
        if !qna.is_empty() {
            section(&mut out, "Q&A");
            for item in qna {
                if let Some(question) = &item.question {
                    line(&mut out, &format!("Q: {question}"));
                }
                if let Some(answer) = &item.answer {
                    line(&mut out, &format!("A: {answer}"));
                }
            }
        }
    }

    if let Some(entities) = &data.named_entities {
        if !entities.is_empty() {
            section(&mut out, "Named Entities");
            if !entities.people.is_empty() {
                line(&mut out, &format!("People: {}", entities.people.join(", ")));
            }
            if !entities.places.is_empty() {
                line(&mut out, &format!("Places: {}", entities.places.join(", ")));
            }
            if !entities.organizations.is_empty() {
                line(
                    &mut out,
                    &format!("Organizations: {}", entities.organizations.join(", ")),
                );
            }
        }
    }

    if let Some(class) = &data.content_classification {
        if class.kind.is_some() || !class.characteristics.is_empty() {
            section(&mut out, "Classification");
            if let Some(kind) = &class.kind {
                line(&mut out, &format!("Type: {kind}"));
            }
            if !class.characteristics.is_empty() {
                line(&mut out, &class.characteristics.join(", "));
            }
        }
    }

    if out.is_empty() {
        out.push_str("  (summary has no structured sections)\n");
    }
    out
}

fn section(out: &mut String, title: &str) {
    if !out.is_empty() {
        out.push('\n');
    }
    let _ = writeln!(out, "{title}");
}

fn line(out: &mut String, text: &str) {
    let _ = writeln!(out, "  {text}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use podsum_types::{ContentClassification, NamedEntities, QnaItem, SentimentAnalysis};
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_summary_renders_placeholder() {
        let text = render_summary(&SummaryData::default());
        assert_eq!(text, "  (summary has no structured sections)\n");
    }

    #[test]
    fn sections_render_in_fixed_order() {
        let data = SummaryData {
            summary: Some("Ferries, mostly.".to_string()),
            bullet_points: Some(vec!["tides".to_string(), "timetables".to_string()]),
            topic_identification: Some(vec!["transport".to_string()]),
            sentiment_analysis: Some(SentimentAnalysis {
                sentiment: Some("neutral".to_string()),
                description: Some("calm".to_string()),
            }),
            qna: Some(vec![QnaItem {
                question: Some("when?".to_string()),
                answer: Some("noon".to_string()),
            }]),
            named_entities: Some(NamedEntities {
                people: vec!["Ada".to_string()],
                places: vec![],
                organizations: vec!["Ferry Co".to_string()],
            }),
            content_classification: Some(ContentClassification {
                kind: Some("interview".to_string()),
                characteristics: vec!["two hosts".to_string()],
            }),
            ..SummaryData::default()
        };

        let text = render_summary(&data);
        let summary_at = text.find("Summary").unwrap();
        let bullets_at = text.find("Bullet Points").unwrap();
        let topics_at = text.find("Key Topics").unwrap();
        let sentiment_at = text.find("Sentiment").unwrap();
        let qna_at = text.find("Q&A").unwrap();
        let entities_at = text.find("Named Entities").unwrap();
        let class_at = text.find("Classification").unwrap();
        assert!(summary_at < bullets_at);
        assert!(bullets_at < topics_at);
        assert!(topics_at < sentiment_at);
        assert!(sentiment_at < qna_at);
        assert!(qna_at < entities_at);
        assert!(entities_at < class_at);

        assert!(text.contains("\u{2022} tides"));
        assert!(text.contains("neutral \u{2014} calm"));
        assert!(text.contains("Q: when?"));
        assert!(text.contains("A: noon"));
        assert!(text.contains("People: Ada"));
        assert!(text.contains("Organizations: Ferry Co"));
        assert!(text.contains("Type: interview"));
        assert!(!text.contains("Places:"), "empty groups are skipped");
    }

    #[test]
    fn sparse_sections_are_skipped() {
        let data = SummaryData {
            bullet_points: Some(vec![]),
            quote_extraction: Some(vec!["all aboard".to_string()]),
            ..SummaryData::default()
        };
        let text = render_summary(&data);
        assert!(!text.contains("Bullet Points"), "empty list renders nothing");
        assert!(text.contains("Notable Quotes"));
        assert!(text.contains("\u{201c}all aboard\u{201d}"));
        assert!(!text.contains("Summary\n"));
    }

    #[test]
    fn glyphs_match_terminal_vocabulary() {
        assert_eq!(status_glyph(JobStatus::Completed), "\u{2713}");
        assert_eq!(status_glyph(JobStatus::Failed), "\u{2717}");
        assert_eq!(status_glyph(JobStatus::Pending), "\u{2192}");
        assert_eq!(status_glyph(JobStatus::Processing), "\u{2192}");
    }

    #[test]
    fn created_at_renders_utc() {
        assert_eq!(
            format_created_at(1_700_000_000_000).as_deref(),
            Some("2023-11-14 22:13:20 UTC")
        );
        assert!(format_created_at(i64::MAX).is_none());
    }
}
