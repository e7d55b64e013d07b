use chrono::NaiveDate;

pub(crate) fn format_date(date: NaiveDate) -> String {
    date.format("%Y/%m/%d").to_string()
}

pub(crate) fn truncate(s: &str, max: usize) -> String {
    let mut out = s.to_string();
    if out.chars().count() > max {
        out = out.chars().take(max.saturating_sub(3)).collect::<String>() + "...";
    }
    out
}
