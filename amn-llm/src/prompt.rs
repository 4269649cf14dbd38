//! Prompt templates for AMN LLM operations.
//!
//! Every prompt is a versioned, testable artifact. Placeholders are written
//! `{name}` and filled by [`render`]; literal braces in JSON examples are
//! doubled (`{{`, `}}`) and collapsed during rendering.

/// Cognitive appraisal system prompt.
pub const APPRAISAL_SYSTEM: &str = r"You are an appraisal rater for a conversational memory system.
You read one message and rate how the speaker appraises the situation it describes.

RULES:
- Rate only what the message expresses; do not invent context.
- Every value is a number between 0.0 and 1.0, except goal_relevance which may range from -1.0 to 1.0.
- Your response must be a single valid JSON object and nothing else.";

/// Cognitive appraisal user prompt.
pub const APPRAISAL_USER: &str = r#"Message: "{text}"

Lexicon estimate of the emotional tone: valence {valence}, arousal {arousal}, dominance {dominance}.

Rate the message on these dimensions:
- goal_relevance: how much it matters to the speaker's goals (negative if it obstructs them)
- agency: how much the speaker caused it
- certainty: how sure the speaker is about what happens next
- novelty: how unexpected it is
- pleasantness: how pleasant it is in itself
- control: how much the speaker can still influence it

Return JSON:
{{"goal_relevance": <float>, "agency": <float>, "certainty": <float>, "novelty": <float>, "pleasantness": <float>, "control": <float>}}"#;

/// Empathetic reply system prompt.
pub const RESPONSE_SYSTEM: &str = "You maintain emotional continuity across conversations.";

/// Empathetic reply user prompt; `{memories}` is rendered by
/// [`amn_core::format_context`].
pub const RESPONSE_USER: &str = r"You are an emotionally aware agent. Use these memories to respond empathetically:

MEMORIES:
{memories}

CURRENT: {input}

Respond naturally, referencing relevant past emotions/experiences when helpful. Be concise.";

/// Simple template interpolation for prompts.
///
/// Scans the template once: `{{` and `}}` become literal braces and a
/// `{key}` found in `vars` is replaced by its value. Values are inserted
/// verbatim and never rescanned, so braces or placeholder-like text inside
/// user content survive untouched. Unknown placeholders are left as they are.
#[must_use]
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(pos) = rest.find(['{', '}']) {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        if tail.starts_with("{{") || tail.starts_with("}}") {
            out.push_str(&tail[..1]);
            rest = &tail[2..];
            continue;
        }
        if tail.starts_with('{') {
            let value = tail[1..].find(['{', '}']).and_then(|end| {
                let key = &tail[1..=end];
                let closed = tail[1 + end..].starts_with('}');
                closed
                    .then(|| vars.iter().find(|(k, _)| *k == key))
                    .flatten()
                    .map(|(_, v)| (*v, end + 2))
            });
            if let Some((value, consumed)) = value {
                out.push_str(value);
                rest = &tail[consumed..];
                continue;
            }
        }
        out.push_str(&tail[..1]);
        rest = &tail[1..];
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_rendering_works() {
        let rendered = render("Hello {name}, you feel {mood}.", &[("name", "Ada"), ("mood", "calm")]);
        assert_eq!(rendered, "Hello Ada, you feel calm.");
    }

    #[test]
    fn template_handles_missing_vars() {
        assert_eq!(render("Hello {name}", &[]), "Hello {name}");
    }

    #[test]
    fn escaped_braces_collapse() {
        let rendered = render(APPRAISAL_USER, &[
            ("text", "I lost my keys"),
            ("valence", "-0.40"),
            ("arousal", "0.55"),
            ("dominance", "0.30"),
        ]);
        assert!(rendered.contains(r#"{"goal_relevance": <float>"#));
        assert!(!rendered.contains("{{"));
        assert!(rendered.contains("I lost my keys"));
    }

    #[test]
    fn values_are_inserted_verbatim() {
        let rendered = render("say {text} at {mood}", &[
            ("text", r#"{{"a": 1}} and {mood}"#),
            ("mood", "dawn"),
        ]);
        assert_eq!(rendered, r#"say {{"a": 1}} and {mood} at dawn"#);
    }

    #[test]
    fn stray_braces_pass_through() {
        assert_eq!(render("a } b { c {x", &[("x", "y")]), "a } b { c {x");
        assert_eq!(render("{{x}}", &[("x", "y")]), "{x}");
        assert_eq!(render("{{{x}}}", &[("x", "y")]), "{y}");
    }
}
