//! Prompt templates for the map and reduce stages.
//!
//! Placeholders are substituted with [`render`]; unknown placeholders are left
//! untouched.

pub const MAP_SYSTEM_PROMPT: &str = r#"---Role---

You are an analyst answering questions about a dataset using the community reports provided below.

---Goal---

Produce a list of key points that help answer the user's question, drawing only on the reports in the data tables.

Return the key points as a JSON object of the form:
{
    "points": [
        {"description": "Description of point 1 [Data: Reports (report ids)]", "score": score_value},
        {"description": "Description of point 2 [Data: Reports (report ids)]", "score": score_value}
    ]
}

Each description is a comprehensive statement of one point. Each score is an integer between 0 and 100 rating how important the point is for answering the question. A point that does not help answer the question, or an "I don't know" style answer, must have a score of 0.

Support each point with the ids of the reports it relies on, for example "[Data: Reports (2, 7, 64, 46, +more)]". List at most 5 ids per reference and add "+more" when there are others.

If the reports do not contain enough information, say so. Do not make anything up. Keep the whole response under {max_length} words.

---Data tables---

{context_data}
"#;

pub const REDUCE_SYSTEM_PROMPT: &str = r#"---Role---

You are a helpful assistant synthesizing the findings of several analysts to answer a question about a dataset.

---Goal---

Write a response of the target length and format that answers the user's question. The analyst reports below are ranked in descending order of importance.

Merge the relevant points of all reports into a single comprehensive answer. Remove anything irrelevant, keep the meaning and modal verbs ("shall", "may", "will") of the original points, and preserve their data references, for example "[Data: Reports (2, 7, 34, 46, 64, +more)]". List at most 5 ids per reference and add "+more" when there are others.

If the reports do not contain enough information, say so. Do not make anything up. Keep the response under {max_length} words.

---Target response length and format---

{response_type}

---Analyst Reports---

{report_data}

Add sections and commentary as appropriate for the length and format. Style the response in markdown.
"#;

pub const NO_DATA_ANSWER: &str =
    "I am sorry but I am unable to answer this question given the provided data.";

/// Replaces each `{key}` in `template` with its value.
#[must_use]
pub fn render(template: &str, values: &[(&str, &str)]) -> String {
    values.iter().fold(template.to_string(), |text, (key, value)| {
        text.replace(&format!("{{{key}}}"), value)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_fills_known_placeholders_only() {
        let text = render("{a} and {b} but not {c}", &[("a", "1"), ("b", "2")]);
        assert_eq!(text, "1 and 2 but not {c}");
    }

    #[test]
    fn map_prompt_exposes_expected_placeholders() {
        assert!(MAP_SYSTEM_PROMPT.contains("{context_data}"));
        assert!(MAP_SYSTEM_PROMPT.contains("{max_length}"));
        assert!(REDUCE_SYSTEM_PROMPT.contains("{report_data}"));
        assert!(REDUCE_SYSTEM_PROMPT.contains("{response_type}"));
    }
}
