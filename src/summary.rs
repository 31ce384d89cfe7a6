//! Header lines and progress shown above the two lists.

fn plural(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}

pub fn pending_summary(pending: usize, completed: usize) -> String {
    if pending > 0 {
        format!(
            "You have {pending} task{} · {completed} completed",
            plural(pending)
        )
    } else if completed > 0 {
        format!("All clear! {completed} completed · add something sweet")
    } else {
        "No tasks yet · start planting ideas".to_string()
    }
}

pub fn completed_summary(completed: usize) -> String {
    if completed > 0 {
        format!("You've completed {completed} task{} ✨", plural(completed))
    } else {
        "No completed tasks yet. Finish one to see it bloom here!".to_string()
    }
}

/// Share of tasks completed, rounded to the nearest percent.
pub fn progress_percent(pending: usize, completed: usize) -> u16 {
    let total = pending + completed;
    if total == 0 {
        return 0;
    }
    ((completed as f64 / total as f64) * 100.0).round() as u16
}
