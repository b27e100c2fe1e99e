/// Build a deterministic summary prompt for a transcript.
///
/// The reply layout is parsed by `summary::parse_sections`, so the section
/// labels here must stay in sync with it.
pub fn build_summary_prompt(transcript: &str) -> String {
    format!(
        "Analyze this transcript and provide:\n\
1. A concise summary (2-3 sentences)\n\
2. Main topics discussed (comma-separated list)\n\
3. Key insights or takeaways (bullet points)\n\
\n\
Format your response exactly as:\n\
SUMMARY: [your summary here]\n\
TOPICS: [topic1, topic2, topic3]\n\
INSIGHTS:\n\
- [insight 1]\n\
- [insight 2]\n\
- [insight 3]\n\
\n\
Transcript:\n\
{transcript}"
    )
}
