use super::types::Task;

/// Largest id handed out or kept. Ids are millisecond timestamps, and this is the
/// largest integer a JSON consumer can hold exactly (2^53 - 1).
pub const MAX_TASK_ID: i64 = (1 << 53) - 1;

pub fn find_task(tasks: &[Task], id: i64) -> Option<&Task> {
    tasks.iter().find(|task| task.id == id)
}

pub fn find_task_mut(tasks: &mut [Task], id: i64) -> Option<&mut Task> {
    tasks.iter_mut().find(|task| task.id == id)
}

/// Current wall-clock time in milliseconds since the UNIX epoch.
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Hands out a timestamp id strictly greater than every id handed out before.
pub fn allocate_task_id(last_task_id: &mut i64) -> i64 {
    let id = now_ms().max(last_task_id.saturating_add(1));
    *last_task_id = id;
    id
}

/// Truncates task text for notices, appending `...` when cut.
pub fn preview(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        let truncated: String = text.chars().take(max_chars).collect();
        format!("{}...", truncated)
    } else {
        text.to_string()
    }
}
