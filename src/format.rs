use std::time::Duration;

/// Marker used wherever an empty tag list is displayed.
pub const NO_TAGS: &str = "N/A";

/// Human-readable tag list: `a, b`, or `N/A` when empty.
pub fn tag_list(tags: &[String]) -> String {
    if tags.is_empty() {
        NO_TAGS.to_string()
    } else {
        tags.join(", ")
    }
}

/// Description body sent to platforms that accept free-text tagging.
pub fn description_with_tags(description: &str, tags: &[String]) -> String {
    let tag_line = format!("Tags: {}", tag_list(tags));
    if description.trim().is_empty() {
        tag_line
    } else {
        format!("{}\n\n{}", description.trim_end(), tag_line)
    }
}

/// Format an elapsed duration as `4.2s` or `3m 5s`.
pub fn format_duration(d: Duration) -> String {
    let secs = d.as_secs_f64();
    if secs < 60.0 {
        format!("{:.1}s", secs)
    } else {
        format!("{}m {}s", d.as_secs() / 60, d.as_secs() % 60)
    }
}
