//! Weekly chore overview: one section per weekday, Monday to Sunday.

use choreplan_core::{dates, ChoreStatus, ChoreStore, Config, SessionStore};

pub fn run(date: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let cfg = Config::load_or_default();
    let api = super::api_client(&cfg)?;
    let mut chores = ChoreStore::new(api, SessionStore::new());

    let anchor = match date {
        Some(s) => dates::parse_date(&s)?,
        None => dates::today(),
    };
    let today = dates::today();

    for day_date in dates::week_of(anchor) {
        let day = dates::day_of_week(day_date);
        let marker = if day_date == today { " <- today" } else { "" };
        println!("{day} ({}){marker}", dates::format_date(day_date));

        match chores.list(Some(day)) {
            Ok(listed) if listed.is_empty() => println!("  (no chores)"),
            Ok(listed) => {
                for chore in listed {
                    let done = if chore.status == ChoreStatus::Completed {
                        "[x]"
                    } else {
                        "[ ]"
                    };
                    println!(
                        "  {done} {} ({:?}) {} {}%",
                        chore.name,
                        chore.priority,
                        chore.time.as_deref().unwrap_or("--:--"),
                        chore.progress,
                    );
                }
            }
            // One bad day must not sink the rest of the overview.
            Err(e) => println!("  error: {e}"),
        }
    }

    Ok(())
}
