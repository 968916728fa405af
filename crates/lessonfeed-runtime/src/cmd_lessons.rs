//! `lessonfeed lessons`: paged listing and lesson creation.

use lessonfeed_lessons::{Lesson, LessonPage, LessonsClient, NewLesson};

use crate::cli::AddOpts;

/// Entry point for `lessonfeed lessons list`.
pub async fn cmd_list(origin: &str, page: u32, use_color: bool) -> anyhow::Result<()> {
    let client = LessonsClient::new(origin)?;
    let lessons = client.list(page).await?;
    println!("{}", format_page(&lessons, use_color));
    Ok(())
}

/// Entry point for `lessonfeed lessons add`. Returns the process exit code.
pub async fn cmd_add(origin: &str, opts: AddOpts, use_color: bool) -> anyhow::Result<i32> {
    let client = LessonsClient::new(origin)?;
    if let Some(cookie) = opts.cookie.as_deref() {
        client.add_cookie(cookie);
    }
    let lesson = NewLesson {
        title: opts.title,
        description: opts.description,
        start_time: opts.start_time,
        end_time: opts.end_time.filter(|e| !e.is_empty()),
        status: opts.status,
    };

    match client.create(&lesson).await {
        Ok(()) => {
            println!("{}", paint("Lesson saved", "32", use_color));
            let first = client.list(1).await?;
            println!("{}", format_page(&first, use_color));
            Ok(0)
        }
        Err(e) => {
            tracing::warn!("lesson creation failed: {e}");
            eprintln!("{}", paint(&format!("Error: {e}"), "31", use_color));
            Ok(1)
        }
    }
}

fn paint(text: &str, code: &str, use_color: bool) -> String {
    if use_color {
        format!("\x1b[{code}m{text}\x1b[0m")
    } else {
        text.to_owned()
    }
}

fn format_lesson(lesson: &Lesson, use_color: bool) -> String {
    let when = match lesson.end_time.as_deref() {
        Some(end) if !end.is_empty() => format!("{} - {end}", lesson.start_time),
        _ => lesson.start_time.clone(),
    };
    let title = paint(&lesson.title, "1", use_color);
    let status = paint(&format!("[{}]", lesson.status_label()), "36", use_color);
    let meta = paint(&when, "2", use_color);
    format!(
        "{title}  {status}\n  {}\n  {meta}",
        lesson.description_or_default()
    )
}

/// Render one page of lessons followed by the pagination footer.
pub fn format_page(page: &LessonPage, use_color: bool) -> String {
    let mut out = String::new();
    if page.items.is_empty() {
        out.push_str("No lessons\n");
    }
    for lesson in &page.items {
        out.push_str(&format_lesson(lesson, use_color));
        out.push('\n');
    }

    let p = &page.pagination;
    let prev = if p.has_prev { "< prev" } else { "" };
    let next = if p.has_next { "next >" } else { "" };
    let footer = format!("Page {} of {}", p.page, p.pages.max(1));
    out.push('\n');
    out.push_str(
        [prev, footer.as_str(), next]
            .iter()
            .filter(|s| !s.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join("  ")
            .as_str(),
    );
    out
}
