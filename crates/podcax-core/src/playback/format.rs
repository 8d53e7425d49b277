/// Render a play head as `m:ss`. Zero or negative input renders `0:00`.
pub fn format_millis(millis: i64) -> String {
    if millis <= 0 {
        return "0:00".to_string();
    }
    let total_seconds = millis / 1000;
    format!("{}:{:02}", total_seconds / 60, total_seconds % 60)
}
